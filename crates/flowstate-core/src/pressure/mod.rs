//! Pressure engine.
//!
//! Measures how far behind (or ahead of) schedule each goal is and buckets
//! the result into an [`Urgency`] for display. Everything here is a pure
//! function of its inputs; callers pass `now` explicitly.
//!
//! ## Model
//!
//! ```text
//! expected = 1 - days_left / total_days
//! actual   = completed / total
//! pressure = clamp(50 + (expected - actual) * 100, 0, 100)
//! ```
//!
//! 50 means exactly on pace. `total_days` is a synthetic trailing window that
//! ends at the deadline ([`DEFAULT_HORIZON_DAYS`]), not the goal's real age.

mod urgency;

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::board::Goal;

pub use urgency::{motivational_message, urgency_tag, Urgency};

/// Length of the expectation window ending at each deadline.
pub const DEFAULT_HORIZON_DAYS: u32 = 365;

const MS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// Whole days until `deadline`, rounded up. Past deadlines report 0.
pub fn days_remaining(deadline: DateTime<Utc>, now: DateTime<Utc>) -> u32 {
    let diff_ms = (deadline - now).num_milliseconds();
    if diff_ms <= 0 {
        return 0;
    }
    let days = (diff_ms + MS_PER_DAY - 1) / MS_PER_DAY;
    u32::try_from(days).unwrap_or(u32::MAX)
}

/// Returns a value in `[0, 100]`; 0 when `total` or `total_days` is zero.
pub fn pressure_index(completed: u32, total: u32, days_left: u32, total_days: u32) -> f64 {
    if total == 0 || total_days == 0 {
        return 0.0;
    }
    let expected = 1.0 - f64::from(days_left) / f64::from(total_days);
    let actual = f64::from(completed) / f64::from(total);
    let gap = expected - actual;
    (50.0 + gap * 100.0).clamp(0.0, 100.0)
}

/// `round(100 * completed / total)`, capped at 100.
pub fn progress_percentage(completed: u32, total: u32) -> u8 {
    if total == 0 {
        return 0;
    }
    let pct = (f64::from(completed) / f64::from(total) * 100.0).round();
    pct.min(100.0) as u8
}

/// Arithmetic mean; 0 for an empty slice. Not rounded: rounding is left to
/// presentation.
pub fn overall_pressure(pressures: &[f64]) -> f64 {
    if pressures.is_empty() {
        return 0.0;
    }
    pressures.iter().sum::<f64>() / pressures.len() as f64
}

/// Per-goal reading used by the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GoalPressure {
    pub goal_id: String,
    pub title: String,
    pub days_left: u32,
    pub pressure: f64,
    pub urgency: Urgency,
    pub progress_pct: u8,
}

impl GoalPressure {
    pub fn for_goal(goal: &Goal, now: DateTime<Utc>, horizon_days: u32) -> Self {
        let days_left = days_remaining(goal.deadline, now);
        let pressure = pressure_index(
            goal.completed_chapters,
            goal.total_chapters,
            days_left,
            horizon_days,
        );
        Self {
            goal_id: goal.id.clone(),
            title: goal.title.clone(),
            days_left,
            pressure,
            urgency: urgency_tag(pressure, days_left),
            progress_pct: progress_percentage(goal.completed_chapters, goal.total_chapters),
        }
    }

    pub fn message(&self) -> &'static str {
        motivational_message(self.pressure, self.days_left)
    }
}

/// Wholesale pressure computation over every goal.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PressureReport {
    pub pressure: BTreeMap<String, f64>,
    pub urgency: BTreeMap<String, Urgency>,
    pub overall: f64,
    pub goals: Vec<GoalPressure>,
}

/// Recomputes every goal from scratch; nothing is cached between calls.
pub fn calculate_all_pressures(goals: &[Goal], now: DateTime<Utc>, horizon_days: u32) -> PressureReport {
    let readings: Vec<GoalPressure> = goals
        .iter()
        .map(|g| GoalPressure::for_goal(g, now, horizon_days))
        .collect();

    let values: Vec<f64> = readings.iter().map(|r| r.pressure).collect();
    PressureReport {
        pressure: readings
            .iter()
            .map(|r| (r.goal_id.clone(), r.pressure))
            .collect(),
        urgency: readings
            .iter()
            .map(|r| (r.goal_id.clone(), r.urgency))
            .collect(),
        overall: overall_pressure(&values),
        goals: readings,
    }
}
