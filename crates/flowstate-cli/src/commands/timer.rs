use std::time::Duration;

use clap::Subcommand;
use flowstate_core::timer::{format_clock, preset, PRESETS};
use flowstate_core::{Config, Event, SessionConfig};

use super::{print_json, runtime, CmdResult, Workspace};

#[derive(Subcommand)]
pub enum TimerAction {
    /// Set work/break lengths and set count (only while in setup)
    Configure {
        /// Work phase length in minutes
        #[arg(long, value_name = "MIN")]
        work: Option<u32>,
        /// Break length in minutes
        #[arg(long = "break", value_name = "MIN")]
        brk: Option<u32>,
        /// Number of work/break sets
        #[arg(long)]
        sets: Option<u32>,
        /// Quick pick, e.g. "45/15/3"
        #[arg(long, conflicts_with_all = ["work", "brk", "sets"])]
        preset: Option<String>,
    },
    /// List quick-pick presets
    Presets,
    /// Leave setup and begin the first work phase
    StartSession,
    /// Resume a paused timer
    Start,
    /// Pause the countdown
    Pause,
    /// Back to setup, keeping the configuration
    Reset,
    /// Jump to the next phase without rewards
    Skip,
    /// Advance the countdown by N seconds
    Tick {
        #[arg(default_value = "1")]
        count: u32,
    },
    /// Bind a task to the work phase
    Focus { task_id: String },
    /// Unbind the current task
    Unfocus,
    /// Print current timer state as JSON
    Status,
    /// Drive the timer in the foreground until the session ends or Ctrl-C
    Run,
}

fn resolve_config(
    work: Option<u32>,
    brk: Option<u32>,
    sets: Option<u32>,
    preset_name: Option<String>,
) -> Result<SessionConfig, Box<dyn std::error::Error>> {
    if let Some(name) = preset_name {
        return preset(&name).ok_or_else(|| format!("unknown preset: {name}").into());
    }
    let defaults = Config::load_or_default().timer;
    Ok(SessionConfig::from_minutes(
        work.unwrap_or(defaults.work_minutes),
        brk.unwrap_or(defaults.break_minutes),
        sets.unwrap_or(defaults.sets),
    )?)
}

/// Print the event, or the unchanged state when the command was a no-op.
fn emit(ws: &Workspace, event: Option<Event>) -> CmdResult {
    match event {
        Some(event) => print_json(&event)?,
        None => print_snapshot(ws)?,
    }
    Ok(())
}

fn print_snapshot(ws: &Workspace) -> Result<(), serde_json::Error> {
    print_json(&Event::StateSnapshot(ws.tracker.machine().snapshot()))
}

fn tick_once(ws: &mut Workspace) -> Option<Event> {
    let outcome = ws.tracker.tick();
    ws.apply(&outcome.effects);
    outcome.event
}

pub fn run(action: TimerAction) -> CmdResult {
    let mut ws = Workspace::open()?;

    match action {
        TimerAction::Configure {
            work,
            brk,
            sets,
            preset,
        } => {
            let config = resolve_config(work, brk, sets, preset)?;
            let event = ws.tracker.configure(config)?;
            print_json(&event)?;
        }
        TimerAction::Presets => {
            for p in PRESETS {
                println!(
                    "{:<8} work {:>2}m  break {:>2}m  {} sets",
                    p.name,
                    p.config.work_secs / 60,
                    p.config.break_secs / 60,
                    p.config.total_sets
                );
            }
            return Ok(());
        }
        TimerAction::StartSession => {
            let event = ws.tracker.start_session();
            emit(&ws, event)?;
        }
        TimerAction::Start => {
            let event = ws.tracker.start();
            emit(&ws, event)?;
        }
        TimerAction::Pause => {
            let event = ws.tracker.pause();
            emit(&ws, event)?;
        }
        TimerAction::Reset => {
            let event = ws.tracker.reset();
            emit(&ws, event)?;
        }
        TimerAction::Skip => {
            let event = ws.tracker.skip_phase();
            emit(&ws, event)?;
        }
        TimerAction::Tick { count } => {
            for _ in 0..count {
                if let Some(event) = tick_once(&mut ws) {
                    print_json(&event)?;
                }
            }
            print_snapshot(&ws)?;
        }
        TimerAction::Focus { task_id } => {
            let event = ws.tracker.focus_task(&task_id)?;
            emit(&ws, event)?;
        }
        TimerAction::Unfocus => {
            ws.tracker.unfocus();
            print_snapshot(&ws)?;
        }
        TimerAction::Status => {
            print_snapshot(&ws)?;
            ws.tracker.acknowledge_completion();
        }
        TimerAction::Run => {
            runtime()?.block_on(drive(&mut ws))?;
        }
    }

    ws.save()?;
    Ok(())
}

/// One tick per second until the session returns to setup or the user
/// interrupts, in which case the timer is paused and saved.
async fn drive(ws: &mut Workspace) -> CmdResult {
    let (in_setup, active) = {
        let machine = ws.tracker.machine();
        (machine.is_setup_mode(), machine.is_active())
    };
    let kickoff = if in_setup {
        ws.tracker.start_session()
    } else if !active {
        ws.tracker.start()
    } else {
        None
    };
    if let Some(event) = kickoff {
        print_json(&event)?;
    }

    let mut interval = tokio::time::interval(Duration::from_secs(1));
    // First tick completes immediately.
    interval.tick().await;
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = interval.tick() => {
                if let Some(event) = tick_once(ws) {
                    eprintln!();
                    print_json(&event)?;
                    ws.save()?;
                }
                let machine = ws.tracker.machine();
                if machine.is_setup_mode() {
                    break;
                }
                eprint!(
                    "\r[{}/{}] {} {:<24}",
                    machine.current_set(),
                    machine.total_sets(),
                    format_clock(machine.time_left()),
                    machine.phase_label()
                );
            }
            _ = &mut ctrl_c => {
                eprintln!();
                if let Some(event) = ws.tracker.pause() {
                    print_json(&event)?;
                }
                break;
            }
        }
    }

    tracing::debug!(state = ?ws.tracker.machine().state(), "foreground timer stopped");
    Ok(())
}
