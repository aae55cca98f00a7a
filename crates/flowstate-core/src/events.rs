use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::{Phase, Snapshot};

/// Every state change in the session machine produces an Event.
/// The CLI prints them; hosts may forward them to notifications.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    SessionConfigured {
        work_secs: u32,
        break_secs: u32,
        total_sets: u32,
        at: DateTime<Utc>,
    },
    SessionStarted {
        work_secs: u32,
        break_secs: u32,
        total_sets: u32,
        at: DateTime<Utc>,
    },
    TimerStarted {
        phase: Phase,
        time_left: u32,
        at: DateTime<Utc>,
    },
    TimerPaused {
        phase: Phase,
        time_left: u32,
        at: DateTime<Utc>,
    },
    TimerReset {
        at: DateTime<Utc>,
    },
    ActiveTaskSet {
        task_id: String,
        title: String,
        at: DateTime<Utc>,
    },
    /// A work phase ran to zero and was rewarded.
    PhaseCompleted {
        phase: Phase,
        set: u32,
        xp_awarded: u64,
        completed_task: Option<String>,
        at: DateTime<Utc>,
    },
    /// User override; no rewards.
    PhaseSkipped {
        from: Phase,
        set: u32,
        to_setup: bool,
        at: DateTime<Utc>,
    },
    /// A break ended and the next work phase began.
    SetAdvanced {
        set: u32,
        total_sets: u32,
        at: DateTime<Utc>,
    },
    /// The final break ended; the machine is back in setup.
    SessionCompleted {
        total_sets: u32,
        at: DateTime<Utc>,
    },
    StateSnapshot(Snapshot),
}
