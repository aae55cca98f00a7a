use chrono::Utc;
use clap::Args;
use flowstate_core::Config;

use super::{print_json, CmdResult, Workspace};

#[derive(Args)]
pub struct PressureArgs {
    /// Expectation window in days (defaults to pressure.horizon_days)
    #[arg(long)]
    horizon: Option<u32>,
    /// Output as JSON
    #[arg(long)]
    json: bool,
}

pub fn run(args: PressureArgs) -> CmdResult {
    let ws = Workspace::open()?;
    let horizon = args
        .horizon
        .unwrap_or_else(|| Config::load_or_default().pressure.horizon_days);
    let report = ws.tracker.pressures(Utc::now(), horizon);

    if args.json {
        print_json(&report)?;
        return Ok(());
    }

    if report.goals.is_empty() {
        println!("No goals.");
        return Ok(());
    }
    for g in &report.goals {
        println!(
            "{:<11} {:>5.1}  {:>4}d left  {:>3}%  {}",
            g.urgency.as_str(), g.pressure, g.days_left, g.progress_pct, g.title
        );
    }
    println!("overall     {:>5.1}", report.overall);

    let priority = ws
        .tracker
        .board()
        .priority_goal()
        .and_then(|p| report.goals.iter().find(|g| g.goal_id == p.id));
    if let Some(g) = priority {
        println!("{}", g.message());
    }
    Ok(())
}
