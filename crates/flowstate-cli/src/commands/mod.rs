pub mod config;
pub mod goal;
pub mod pressure;
pub mod stats;
pub mod task;
pub mod timer;

use flowstate_core::{dispatch, CoreError, Database, Effect, Tracker};
use serde::Serialize;

pub type CmdResult = Result<(), Box<dyn std::error::Error>>;

/// Study state loaded for one command invocation.
pub struct Workspace {
    pub db: Database,
    pub tracker: Tracker,
}

impl Workspace {
    pub fn open() -> Result<Self, CoreError> {
        let db = Database::open()?;
        let tracker = Tracker::new(db.load_machine()?, db.load_board()?);
        Ok(Self { db, tracker })
    }

    /// Apply effects to the database. Failures are logged by `dispatch` and
    /// never abort the command.
    pub fn apply(&self, effects: &[Effect]) {
        let report = dispatch(&self.db, effects);
        if report.failed > 0 {
            eprintln!("warning: {} change(s) could not be saved", report.failed);
        }
    }

    pub fn save(&self) -> Result<(), CoreError> {
        self.db.save_machine(self.tracker.machine())
    }

    pub fn require_goal(&self, goal_id: &str) -> Result<(), String> {
        match self.tracker.board().goal(goal_id) {
            Some(_) => Ok(()),
            None => Err(format!("no goal with id {goal_id}")),
        }
    }
}

pub fn print_json<T: Serialize>(value: &T) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Blocking runtime for the few async commands.
pub fn runtime() -> std::io::Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
}
