//! Task management commands for CLI.

use std::io::Read;
use std::path::PathBuf;

use clap::Subcommand;
use flowstate_core::{Config, GeminiSplitter, LineSplitter, TaskSplitter};

use super::{print_json, runtime, CmdResult, Workspace};

#[derive(Subcommand)]
pub enum TaskAction {
    /// Create a new task
    Add {
        /// Task title
        title: String,
        /// Goal ID to file the task under
        #[arg(long)]
        goal: Option<String>,
    },
    /// List tasks
    List {
        /// Only tasks under this goal
        #[arg(long)]
        goal: Option<String>,
        /// Only tasks without a goal
        #[arg(long, conflicts_with = "goal")]
        general: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Flip a task between open and done
    Toggle {
        /// Task ID
        id: String,
    },
    /// Delete a task
    Delete {
        /// Task ID
        id: String,
    },
    /// Split pasted text (e.g. a syllabus) into tasks
    Import {
        /// Text to split; read from --file or stdin when omitted
        text: Option<String>,
        /// Read the text from a file
        #[arg(long, conflicts_with = "text")]
        file: Option<PathBuf>,
        /// Goal ID to file the tasks under
        #[arg(long)]
        goal: Option<String>,
        /// One task per line instead of asking the model
        #[arg(long)]
        offline: bool,
    },
}

fn read_input(text: Option<String>, file: Option<PathBuf>) -> std::io::Result<String> {
    if let Some(text) = text {
        return Ok(text);
    }
    if let Some(path) = file {
        return std::fs::read_to_string(path);
    }
    let mut buf = String::new();
    std::io::stdin().read_to_string(&mut buf)?;
    Ok(buf)
}

pub fn run(action: TaskAction) -> CmdResult {
    let mut ws = Workspace::open()?;

    match action {
        TaskAction::Add { title, goal } => {
            if let Some(goal_id) = &goal {
                ws.require_goal(goal_id)?;
            }
            let (task, effects) = ws.tracker.add_task(&title, goal.as_deref())?;
            ws.apply(&effects);
            println!("Task created: {}", task.id);
        }
        TaskAction::List {
            goal,
            general,
            json,
        } => {
            let board = ws.tracker.board();
            let tasks: Vec<_> = if general || goal.is_some() {
                board.tasks_for_goal(goal.as_deref())
            } else {
                board.tasks().iter().collect()
            };
            if json {
                print_json(&tasks)?;
            } else if tasks.is_empty() {
                println!("No tasks.");
            } else {
                for task in tasks {
                    let mark = if task.completed { "x" } else { " " };
                    let filed = task
                        .goal_id
                        .as_deref()
                        .and_then(|id| board.goal(id))
                        .map(|g| g.title.as_str())
                        .unwrap_or("General");
                    println!("[{mark}] {}  {}  ({filed})", task.id, task.title);
                }
            }
        }
        TaskAction::Toggle { id } => {
            let effects = ws.tracker.toggle_task(&id);
            if effects.is_empty() {
                return Err(format!("no task with id {id}").into());
            }
            ws.apply(&effects);
            if let Some(task) = ws.tracker.board().task(&id) {
                print_json(task)?;
            }
        }
        TaskAction::Delete { id } => {
            let effects = ws.tracker.delete_task(&id);
            if effects.is_empty() {
                return Err(format!("no task with id {id}").into());
            }
            ws.apply(&effects);
            println!("Task deleted: {id}");
        }
        TaskAction::Import {
            text,
            file,
            goal,
            offline,
        } => {
            if let Some(goal_id) = &goal {
                ws.require_goal(goal_id)?;
            }
            let input = read_input(text, file)?;
            let rt = runtime()?;
            let titles = if offline {
                rt.block_on(LineSplitter.split(&input))?
            } else {
                let splitter = GeminiSplitter::from_config(&Config::load_or_default().importer)?;
                rt.block_on(splitter.split(&input))?
            };
            let (tasks, effects) = ws.tracker.import_tasks(&titles, goal.as_deref());
            ws.apply(&effects);
            tracing::info!(count = tasks.len(), "tasks imported");
            print_json(&tasks)?;
        }
    }

    ws.save()?;
    Ok(())
}
