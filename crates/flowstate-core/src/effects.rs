//! Side effects produced by state transitions.
//!
//! Transitions in the session machine and the board never touch storage
//! directly. They return a list of [`Effect`]s; the host hands them to
//! [`dispatch`], which applies each one at most once against the stores.
//! A failed write is logged and skipped: in-memory state stays the source of
//! truth until the next full reload.

use serde::{Deserialize, Serialize};

use crate::board::{Goal, Task};
use crate::error::Result;
use crate::gamification::ProfileStats;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Effect {
    /// A bound task finished with its work phase.
    MarkTaskCompleted { task_id: String },
    /// Manual completion toggle.
    SetTaskCompleted { task_id: String, completed: bool },
    PersistStats { stats: ProfileStats },
    PersistProgress {
        goal_id: String,
        completed: u32,
        total: u32,
    },
    InsertGoal { goal: Goal },
    /// Deletes the goal and every task referencing it.
    DeleteGoal { goal_id: String },
    InsertTask { task: Task },
    DeleteTask { task_id: String },
}

/// Task persistence consumed by the core.
pub trait TaskStore {
    /// Idempotent.
    fn mark_completed(&self, task_id: &str) -> Result<()>;
    fn set_completed(&self, task_id: &str, completed: bool) -> Result<()>;
    fn insert_task(&self, task: &Task) -> Result<()>;
    fn delete_task(&self, task_id: &str) -> Result<()>;
}

/// Profile persistence consumed by the core.
pub trait ProfileStore {
    fn persist_stats(&self, stats: &ProfileStats) -> Result<()>;
}

/// Goal persistence consumed by the core.
pub trait GoalStore {
    fn persist_progress(&self, goal_id: &str, completed: u32, total: u32) -> Result<()>;
    fn insert_goal(&self, goal: &Goal) -> Result<()>;
    fn delete_goal(&self, goal_id: &str) -> Result<()>;
}

/// Outcome counts of a [`dispatch`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DispatchReport {
    pub applied: usize,
    pub failed: usize,
}

/// Apply effects in order. Never retries and never returns an error.
pub fn dispatch<S>(store: &S, effects: &[Effect]) -> DispatchReport
where
    S: TaskStore + ProfileStore + GoalStore + ?Sized,
{
    let mut report = DispatchReport::default();
    for effect in effects {
        match apply(store, effect) {
            Ok(()) => report.applied += 1,
            Err(e) => {
                tracing::warn!(?effect, error = %e, "dropping failed persistence effect");
                report.failed += 1;
            }
        }
    }
    report
}

fn apply<S>(store: &S, effect: &Effect) -> Result<()>
where
    S: TaskStore + ProfileStore + GoalStore + ?Sized,
{
    match effect {
        Effect::MarkTaskCompleted { task_id } => store.mark_completed(task_id),
        Effect::SetTaskCompleted { task_id, completed } => {
            store.set_completed(task_id, *completed)
        }
        Effect::PersistStats { stats } => store.persist_stats(stats),
        Effect::PersistProgress {
            goal_id,
            completed,
            total,
        } => store.persist_progress(goal_id, *completed, *total),
        Effect::InsertGoal { goal } => store.insert_goal(goal),
        Effect::DeleteGoal { goal_id } => store.delete_goal(goal_id),
        Effect::InsertTask { task } => store.insert_task(task),
        Effect::DeleteTask { task_id } => store.delete_task(task_id),
    }
}
