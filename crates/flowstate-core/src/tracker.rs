//! The whole study state as one explicit value.
//!
//! `Tracker` pairs the session machine with the goal/task board and keeps the
//! cross-cutting rules in one place: a finished work phase completes its bound
//! task on the board, toggling a task moves XP on the machine's profile, and
//! deleting the bound task unbinds it.

use chrono::{DateTime, NaiveDate, Utc};

use crate::board::{Board, Goal, Task};
use crate::effects::Effect;
use crate::error::ValidationError;
use crate::events::Event;
use crate::pressure::{calculate_all_pressures, PressureReport};
use crate::timer::{Outcome, SessionConfig, SessionMachine};

#[derive(Debug, Clone, Default)]
pub struct Tracker {
    machine: SessionMachine,
    board: Board,
}

impl Tracker {
    pub fn new(machine: SessionMachine, board: Board) -> Self {
        Self { machine, board }
    }

    pub fn machine(&self) -> &SessionMachine {
        &self.machine
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn into_parts(self) -> (SessionMachine, Board) {
        (self.machine, self.board)
    }

    // ── Session ──────────────────────────────────────────────────────

    pub fn configure(&mut self, config: SessionConfig) -> Result<Event, ValidationError> {
        self.machine.configure(config)
    }

    pub fn start_session(&mut self) -> Option<Event> {
        self.machine.start_session()
    }

    pub fn start(&mut self) -> Option<Event> {
        self.machine.start()
    }

    pub fn pause(&mut self) -> Option<Event> {
        self.machine.pause()
    }

    pub fn reset(&mut self) -> Option<Event> {
        self.machine.reset()
    }

    pub fn skip_phase(&mut self) -> Option<Event> {
        self.machine.skip_phase()
    }

    pub fn unfocus(&mut self) -> bool {
        self.machine.clear_active_task().is_some()
    }

    /// Consume the one-shot "session finished" flag.
    pub fn acknowledge_completion(&mut self) -> bool {
        self.machine.take_session_completed()
    }

    pub fn tick(&mut self) -> Outcome {
        let outcome = self.machine.tick();
        for effect in &outcome.effects {
            if let Effect::MarkTaskCompleted { task_id } = effect {
                self.board.mark_completed(task_id);
            }
        }
        outcome
    }

    /// Bind a board task to the work phase. Unknown or finished tasks are
    /// rejected.
    pub fn focus_task(&mut self, task_id: &str) -> Result<Option<Event>, ValidationError> {
        let task = self
            .board
            .task(task_id)
            .ok_or_else(|| ValidationError::invalid("task_id", format!("no task {task_id}")))?;
        if task.completed {
            return Err(ValidationError::invalid("task_id", "task is already completed"));
        }
        let title = task.title.clone();
        Ok(self.machine.set_active_task(task_id, title))
    }

    // ── Board ────────────────────────────────────────────────────────

    pub fn add_goal(
        &mut self,
        title: &str,
        deadline: NaiveDate,
        color: Option<&str>,
    ) -> Result<(Goal, Vec<Effect>), ValidationError> {
        self.board.add_goal(title, deadline, color)
    }

    pub fn update_progress(&mut self, goal_id: &str, completed: u32, total: u32) -> Vec<Effect> {
        self.board.update_progress(goal_id, completed, total)
    }

    pub fn delete_goal(&mut self, goal_id: &str) -> Vec<Effect> {
        let effects = self.board.delete_goal(goal_id);
        self.unbind_missing_task();
        effects
    }

    pub fn add_task(
        &mut self,
        title: &str,
        goal_id: Option<&str>,
    ) -> Result<(Task, Vec<Effect>), ValidationError> {
        self.board.add_task(title, goal_id)
    }

    pub fn import_tasks<S: AsRef<str>>(
        &mut self,
        titles: &[S],
        goal_id: Option<&str>,
    ) -> (Vec<Task>, Vec<Effect>) {
        self.board.import_tasks(titles, goal_id)
    }

    /// Completing the focused task by hand unbinds it, so the work phase
    /// does not pay the task bonus again.
    pub fn toggle_task(&mut self, task_id: &str) -> Vec<Effect> {
        let effects = self.board.toggle_task(task_id, self.machine.profile_mut());
        let now_done = self.board.task(task_id).is_some_and(|t| t.completed);
        let focused = self.machine.active_task().is_some_and(|t| t.id == task_id);
        if now_done && focused {
            self.machine.clear_active_task();
        }
        effects
    }

    pub fn delete_task(&mut self, task_id: &str) -> Vec<Effect> {
        let effects = self.board.delete_task(task_id);
        self.unbind_missing_task();
        effects
    }

    pub fn pressures(&self, now: DateTime<Utc>, horizon_days: u32) -> PressureReport {
        calculate_all_pressures(self.board.goals(), now, horizon_days)
    }

    fn unbind_missing_task(&mut self) {
        let missing = self
            .machine
            .active_task()
            .is_some_and(|t| self.board.task(&t.id).is_none());
        if missing {
            self.machine.clear_active_task();
        }
    }
}
