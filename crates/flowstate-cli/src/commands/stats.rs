use clap::Subcommand;
use serde::Serialize;

use super::{print_json, CmdResult, Workspace};

#[derive(Subcommand)]
pub enum StatsAction {
    /// XP, level and focus totals
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Serialize)]
struct StatsView {
    xp: u64,
    level: u32,
    level_progress: u64,
    xp_for_next_level: u64,
    sessions_completed: u64,
    total_time_min: u64,
    open_tasks: usize,
    completed_tasks: usize,
}

pub fn run(action: StatsAction) -> CmdResult {
    let ws = Workspace::open()?;
    let profile = ws.tracker.machine().profile();
    let tasks = ws.tracker.board().tasks();
    let completed_tasks = tasks.iter().filter(|t| t.completed).count();

    let view = StatsView {
        xp: profile.xp(),
        level: profile.level(),
        level_progress: profile.level_progress(),
        xp_for_next_level: profile.xp_for_next_level(),
        sessions_completed: profile.sessions_completed(),
        total_time_min: profile.total_time_min(),
        open_tasks: tasks.len() - completed_tasks,
        completed_tasks,
    };

    match action {
        StatsAction::Show { json: true } => print_json(&view)?,
        StatsAction::Show { json: false } => {
            println!("Level {}  ({} XP, {}/500 to next)", view.level, view.xp, view.level_progress);
            println!(
                "Focus: {} sessions, {}h {}m",
                view.sessions_completed,
                view.total_time_min / 60,
                view.total_time_min % 60
            );
            println!("Tasks: {} open, {} done", view.open_tasks, view.completed_tasks);
        }
    }
    Ok(())
}
