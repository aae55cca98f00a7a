//! Goals, tasks, and the operations that edit them.
//!
//! The board is plain in-memory state. Every mutating operation returns the
//! [`Effect`]s the host must dispatch to keep the stores in step. Operations
//! on unknown ids are no-ops and produce no effects.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::effects::Effect;
use crate::error::ValidationError;
use crate::gamification::{Profile, TASK_COMPLETION_XP};

pub const DEFAULT_GOAL_COLOR: &str = "#10b981";

fn default_total_chapters() -> u32 {
    1
}

fn default_color() -> String {
    DEFAULT_GOAL_COLOR.to_string()
}

/// A deadline with chapter-based progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Goal {
    pub id: String,
    pub title: String,
    /// Midnight UTC of the due date.
    pub deadline: DateTime<Utc>,
    #[serde(default)]
    pub completed_chapters: u32,
    #[serde(default = "default_total_chapters")]
    pub total_chapters: u32,
    #[serde(default = "default_color")]
    pub color: String,
    pub created_at: DateTime<Utc>,
}

impl Goal {
    pub fn new(title: impl Into<String>, deadline: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: title.into(),
            deadline: deadline_at_midnight(deadline),
            completed_chapters: 0,
            total_chapters: default_total_chapters(),
            color: default_color(),
            created_at: Utc::now(),
        }
    }
}

/// Date-only deadlines are pinned to the start of the day in UTC.
pub fn deadline_at_midnight(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(chrono::NaiveTime::MIN).and_utc()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub completed: bool,
    /// `None` files the task under "General".
    #[serde(default)]
    pub goal_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Task {
    pub fn new(title: impl Into<String>, goal_id: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: title.into(),
            completed: false,
            goal_id,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Board {
    goals: Vec<Goal>,
    tasks: Vec<Task>,
}

impl Board {
    pub fn new(goals: Vec<Goal>, tasks: Vec<Task>) -> Self {
        Self { goals, tasks }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn goals(&self) -> &[Goal] {
        &self.goals
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn goal(&self, id: &str) -> Option<&Goal> {
        self.goals.iter().find(|g| g.id == id)
    }

    pub fn task(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Tasks filed under `goal_id`, or the general tasks when `None`.
    pub fn tasks_for_goal(&self, goal_id: Option<&str>) -> Vec<&Task> {
        self.tasks
            .iter()
            .filter(|t| t.goal_id.as_deref() == goal_id)
            .collect()
    }

    /// Goals ordered by deadline, soonest first.
    pub fn goals_by_deadline(&self) -> Vec<&Goal> {
        let mut sorted: Vec<&Goal> = self.goals.iter().collect();
        sorted.sort_by_key(|g| g.deadline);
        sorted
    }

    /// The goal with the closest deadline.
    pub fn priority_goal(&self) -> Option<&Goal> {
        self.goals.iter().min_by_key(|g| g.deadline)
    }

    // ── Goal commands ────────────────────────────────────────────────

    pub fn add_goal(
        &mut self,
        title: &str,
        deadline: NaiveDate,
        color: Option<&str>,
    ) -> Result<(Goal, Vec<Effect>), ValidationError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(ValidationError::Empty("goal title"));
        }
        let mut goal = Goal::new(title, deadline);
        if let Some(color) = color {
            goal.color = color.to_string();
        }
        self.goals.push(goal.clone());
        let effects = vec![Effect::InsertGoal { goal: goal.clone() }];
        Ok((goal, effects))
    }

    pub fn update_progress(&mut self, goal_id: &str, completed: u32, total: u32) -> Vec<Effect> {
        let Some(goal) = self.goals.iter_mut().find(|g| g.id == goal_id) else {
            return Vec::new();
        };
        goal.completed_chapters = completed;
        goal.total_chapters = total;
        vec![Effect::PersistProgress {
            goal_id: goal_id.to_string(),
            completed,
            total,
        }]
    }

    /// Removes the goal and every task filed under it.
    pub fn delete_goal(&mut self, goal_id: &str) -> Vec<Effect> {
        let before = self.goals.len();
        self.goals.retain(|g| g.id != goal_id);
        if self.goals.len() == before {
            return Vec::new();
        }
        self.tasks.retain(|t| t.goal_id.as_deref() != Some(goal_id));
        vec![Effect::DeleteGoal {
            goal_id: goal_id.to_string(),
        }]
    }

    // ── Task commands ────────────────────────────────────────────────

    pub fn add_task(
        &mut self,
        title: &str,
        goal_id: Option<&str>,
    ) -> Result<(Task, Vec<Effect>), ValidationError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(ValidationError::Empty("task title"));
        }
        let task = Task::new(title, goal_id.map(str::to_string));
        self.tasks.push(task.clone());
        let effects = vec![Effect::InsertTask { task: task.clone() }];
        Ok((task, effects))
    }

    /// Creates one task per non-blank title, preserving order.
    pub fn import_tasks<S: AsRef<str>>(
        &mut self,
        titles: &[S],
        goal_id: Option<&str>,
    ) -> (Vec<Task>, Vec<Effect>) {
        let mut created = Vec::new();
        let mut effects = Vec::new();
        for title in titles {
            if let Ok((task, mut fx)) = self.add_task(title.as_ref(), goal_id) {
                created.push(task);
                effects.append(&mut fx);
            }
        }
        (created, effects)
    }

    /// Flips completion and moves XP by the task bonus in the same direction.
    pub fn toggle_task(&mut self, task_id: &str, profile: &mut Profile) -> Vec<Effect> {
        let Some(task) = self.tasks.iter_mut().find(|t| t.id == task_id) else {
            return Vec::new();
        };
        task.completed = !task.completed;
        if task.completed {
            profile.award(TASK_COMPLETION_XP);
        } else {
            profile.revoke(TASK_COMPLETION_XP);
        }
        vec![
            Effect::SetTaskCompleted {
                task_id: task_id.to_string(),
                completed: task.completed,
            },
            Effect::PersistStats {
                stats: profile.stats(),
            },
        ]
    }

    /// Completion from a finished work phase. No XP here; the machine already
    /// counted the bonus.
    pub(crate) fn mark_completed(&mut self, task_id: &str) {
        if let Some(task) = self.tasks.iter_mut().find(|t| t.id == task_id) {
            task.completed = true;
        }
    }

    pub fn delete_task(&mut self, task_id: &str) -> Vec<Effect> {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.id != task_id);
        if self.tasks.len() == before {
            return Vec::new();
        }
        vec![Effect::DeleteTask {
            task_id: task_id.to_string(),
        }]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn new_goal_defaults() {
        let goal = Goal::new("Robotics Final", date(2026, 12, 1));
        assert_eq!(goal.total_chapters, 1);
        assert_eq!(goal.completed_chapters, 0);
        assert_eq!(goal.color, DEFAULT_GOAL_COLOR);
        assert_eq!(goal.deadline.to_rfc3339(), "2026-12-01T00:00:00+00:00");
    }

    #[test]
    fn blank_titles_are_rejected() {
        let mut board = Board::default();
        assert_eq!(
            board.add_task("   ", None).unwrap_err(),
            ValidationError::Empty("task title")
        );
        assert!(board.add_goal("", date(2026, 1, 1), None).is_err());
        assert!(board.tasks().is_empty());
    }

    #[test]
    fn toggle_is_reversible_for_xp() {
        let mut board = Board::default();
        let mut profile = Profile::new(320, 0, 0);
        let (task, _) = board.add_task("Read chapter 4", None).unwrap();

        let effects = board.toggle_task(&task.id, &mut profile);
        assert_eq!(profile.xp(), 370);
        assert!(board.task(&task.id).unwrap().completed);
        assert_eq!(
            effects[0],
            Effect::SetTaskCompleted {
                task_id: task.id.clone(),
                completed: true
            }
        );

        board.toggle_task(&task.id, &mut profile);
        assert_eq!(profile.xp(), 320);
        assert!(!board.task(&task.id).unwrap().completed);
    }

    #[test]
    fn toggle_unknown_task_is_noop() {
        let mut board = Board::default();
        let mut profile = Profile::default();
        assert!(board.toggle_task("missing", &mut profile).is_empty());
        assert_eq!(profile.xp(), 0);
    }

    #[test]
    fn delete_goal_cascades_to_tasks() {
        let mut board = Board::default();
        let (goal, _) = board.add_goal("Finals", date(2026, 6, 1), None).unwrap();
        board.add_task("Ch 1", Some(&goal.id)).unwrap();
        board.add_task("Ch 2", Some(&goal.id)).unwrap();
        board.add_task("Laundry", None).unwrap();

        let effects = board.delete_goal(&goal.id);

        assert_eq!(
            effects,
            vec![Effect::DeleteGoal {
                goal_id: goal.id.clone()
            }]
        );
        assert!(board.goals().is_empty());
        assert_eq!(board.tasks().len(), 1);
        assert_eq!(board.tasks()[0].title, "Laundry");
        assert!(board.delete_goal(&goal.id).is_empty());
    }

    #[test]
    fn import_skips_blank_entries() {
        let mut board = Board::default();
        let (goal, _) = board.add_goal("AI", date(2026, 5, 1), None).unwrap();
        let (created, effects) =
            board.import_tasks(&["Intro to AI", " ", "Sensors", ""], Some(&goal.id));

        assert_eq!(created.len(), 2);
        assert_eq!(effects.len(), 2);
        let titles: Vec<_> = board
            .tasks_for_goal(Some(&goal.id))
            .iter()
            .map(|t| t.title.as_str())
            .collect();
        assert_eq!(titles, vec!["Intro to AI", "Sensors"]);
        assert!(board.tasks_for_goal(None).is_empty());
    }

    #[test]
    fn priority_goal_is_closest_deadline() {
        let mut board = Board::default();
        board.add_goal("Later", date(2027, 1, 1), None).unwrap();
        board.add_goal("Sooner", date(2026, 11, 1), Some("#ff0000")).unwrap();

        let priority = board.priority_goal().unwrap();
        assert_eq!(priority.title, "Sooner");
        assert_eq!(priority.color, "#ff0000");
        assert_eq!(board.goals_by_deadline()[1].title, "Later");
    }

    #[test]
    fn update_progress_on_missing_goal_is_noop() {
        let mut board = Board::default();
        assert!(board.update_progress("nope", 1, 2).is_empty());
    }
}
