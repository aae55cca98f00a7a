//! Goal management commands for CLI.

use chrono::NaiveDate;
use clap::Subcommand;

use super::{print_json, CmdResult, Workspace};

#[derive(Subcommand)]
pub enum GoalAction {
    /// Create a goal with a deadline
    Add {
        /// Goal title
        title: String,
        /// Due date (YYYY-MM-DD)
        #[arg(long)]
        deadline: NaiveDate,
        /// Number of chapters (units of progress)
        #[arg(long, default_value_t = 1)]
        chapters: u32,
        /// Display color, e.g. "#6366f1"
        #[arg(long)]
        color: Option<String>,
    },
    /// List goals, nearest deadline first
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Record chapter progress
    Progress {
        /// Goal ID
        id: String,
        /// Chapters completed
        completed: u32,
        /// Change the chapter total as well
        #[arg(long)]
        total: Option<u32>,
    },
    /// Delete a goal and its tasks
    Delete {
        /// Goal ID
        id: String,
    },
}

pub fn run(action: GoalAction) -> CmdResult {
    let mut ws = Workspace::open()?;

    match action {
        GoalAction::Add {
            title,
            deadline,
            chapters,
            color,
        } => {
            let (goal, effects) = ws.tracker.add_goal(&title, deadline, color.as_deref())?;
            ws.apply(&effects);
            if chapters != goal.total_chapters {
                let effects = ws.tracker.update_progress(&goal.id, 0, chapters);
                ws.apply(&effects);
            }
            if let Some(goal) = ws.tracker.board().goal(&goal.id) {
                print_json(goal)?;
            }
        }
        GoalAction::List { json } => {
            let goals = ws.tracker.board().goals_by_deadline();
            if json {
                print_json(&goals)?;
            } else if goals.is_empty() {
                println!("No goals.");
            } else {
                for goal in goals {
                    println!(
                        "{}  {:<28} due {}  {}/{}",
                        goal.id,
                        goal.title,
                        goal.deadline.format("%Y-%m-%d"),
                        goal.completed_chapters,
                        goal.total_chapters
                    );
                }
            }
        }
        GoalAction::Progress {
            id,
            completed,
            total,
        } => {
            let current_total = ws
                .tracker
                .board()
                .goal(&id)
                .map(|g| g.total_chapters)
                .ok_or_else(|| format!("no goal with id {id}"))?;
            let effects = ws
                .tracker
                .update_progress(&id, completed, total.unwrap_or(current_total));
            ws.apply(&effects);
            if let Some(goal) = ws.tracker.board().goal(&id) {
                print_json(goal)?;
            }
        }
        GoalAction::Delete { id } => {
            ws.require_goal(&id)?;
            let effects = ws.tracker.delete_goal(&id);
            ws.apply(&effects);
            println!("Goal deleted: {id}");
        }
    }

    ws.save()?;
    Ok(())
}
