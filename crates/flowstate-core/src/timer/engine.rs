//! Session state machine.
//!
//! Like the rest of the core, the machine has no internal thread or clock.
//! The host calls `tick()` once per second while the timer is active and
//! dispatches whatever [`Effect`]s come back.
//!
//! ## State Transitions
//!
//! ```text
//! Setup -> Running(Work, k) <-> Paused(Work, k)
//!       -> Running(Break, k) <-> Paused(Break, k)
//!       -> Running(Work, k+1)          if k < total_sets
//!       -> Setup (session completed)   if k == total_sets
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut machine = SessionMachine::new();
//! machine.configure(SessionConfig::new(1500, 300, 4)?)?;
//! machine.start_session();
//! // Once per second while active:
//! let outcome = machine.tick();
//! dispatch(&db, &outcome.effects);
//! ```

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::preset::SessionConfig;
use crate::effects::Effect;
use crate::error::ValidationError;
use crate::events::Event;
use crate::gamification::{Profile, TASK_COMPLETION_XP, WORK_PHASE_XP};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Work,
    Break,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MachineState {
    /// Awaiting configuration.
    Setup,
    Running,
    Paused,
}

/// Task bound to the current or upcoming work phase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveTask {
    pub id: String,
    pub title: String,
}

/// Result of a time-advancing transition.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Outcome {
    pub event: Option<Event>,
    pub effects: Vec<Effect>,
}

impl Outcome {
    fn none() -> Self {
        Self::default()
    }
}

/// Presentation read model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub state: MachineState,
    pub phase: Phase,
    pub phase_label: String,
    pub time_left: u32,
    pub clock: String,
    pub is_active: bool,
    pub is_break: bool,
    pub current_set: u32,
    pub total_sets: u32,
    pub work_secs: u32,
    pub break_secs: u32,
    pub active_task: Option<ActiveTask>,
    pub session_just_completed: bool,
    pub xp: u64,
    pub level: u32,
    pub level_progress: u64,
    pub sessions_completed: u64,
    pub total_time_min: u64,
}

/// Timer, set cycling, and reward bookkeeping for one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionMachine {
    config: SessionConfig,
    /// Seconds remaining in the current phase.
    time_left: u32,
    is_active: bool,
    is_break: bool,
    /// 1-indexed.
    current_set: u32,
    is_setup_mode: bool,
    #[serde(default)]
    active_task: Option<ActiveTask>,
    #[serde(default)]
    session_just_completed: bool,
    #[serde(default)]
    profile: Profile,
}

impl Default for SessionMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionMachine {
    /// A machine in setup with the default 25/5/4 configuration.
    pub fn new() -> Self {
        Self::with_profile(SessionConfig::default(), Profile::default())
    }

    pub fn with_profile(config: SessionConfig, profile: Profile) -> Self {
        Self {
            config,
            time_left: config.work_secs,
            is_active: false,
            is_break: false,
            current_set: 1,
            is_setup_mode: true,
            active_task: None,
            session_just_completed: false,
            profile,
        }
    }

    /// Swap in a profile loaded from the profile store.
    pub fn with_restored_profile(mut self, profile: Profile) -> Self {
        self.profile = profile;
        self
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> MachineState {
        if self.is_setup_mode {
            MachineState::Setup
        } else if self.is_active {
            MachineState::Running
        } else {
            MachineState::Paused
        }
    }

    pub fn phase(&self) -> Phase {
        if self.is_break {
            Phase::Break
        } else {
            Phase::Work
        }
    }

    pub fn config(&self) -> SessionConfig {
        self.config
    }

    pub fn time_left(&self) -> u32 {
        self.time_left
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn is_break(&self) -> bool {
        self.is_break
    }

    pub fn is_setup_mode(&self) -> bool {
        self.is_setup_mode
    }

    pub fn current_set(&self) -> u32 {
        self.current_set
    }

    pub fn total_sets(&self) -> u32 {
        self.config.total_sets
    }

    pub fn active_task(&self) -> Option<&ActiveTask> {
        self.active_task.as_ref()
    }

    pub fn session_just_completed(&self) -> bool {
        self.session_just_completed
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    pub(crate) fn profile_mut(&mut self) -> &mut Profile {
        &mut self.profile
    }

    /// Reads and clears the one-shot completion flag.
    pub fn take_session_completed(&mut self) -> bool {
        std::mem::take(&mut self.session_just_completed)
    }

    pub fn phase_label(&self) -> String {
        if self.is_break {
            "Rest & Recover".to_string()
        } else {
            self.active_task
                .as_ref()
                .map(|t| t.title.clone())
                .unwrap_or_else(|| "Deep Work".to_string())
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            state: self.state(),
            phase: self.phase(),
            phase_label: self.phase_label(),
            time_left: self.time_left,
            clock: format_clock(self.time_left),
            is_active: self.is_active,
            is_break: self.is_break,
            current_set: self.current_set,
            total_sets: self.config.total_sets,
            work_secs: self.config.work_secs,
            break_secs: self.config.break_secs,
            active_task: self.active_task.clone(),
            session_just_completed: self.session_just_completed,
            xp: self.profile.xp(),
            level: self.profile.level(),
            level_progress: self.profile.level_progress(),
            sessions_completed: self.profile.sessions_completed(),
            total_time_min: self.profile.total_time_min(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Store a new configuration. Only allowed from setup.
    pub fn configure(&mut self, config: SessionConfig) -> Result<Event, ValidationError> {
        if !self.is_setup_mode {
            return Err(ValidationError::InvalidState {
                operation: "configure",
                state: "a session is in progress",
            });
        }
        config.validate()?;
        self.config = config;
        self.time_left = config.work_secs;
        Ok(Event::SessionConfigured {
            work_secs: config.work_secs,
            break_secs: config.break_secs,
            total_sets: config.total_sets,
            at: Utc::now(),
        })
    }

    /// Leave setup and begin the first work phase.
    pub fn start_session(&mut self) -> Option<Event> {
        if !self.is_setup_mode {
            return None;
        }
        self.is_setup_mode = false;
        self.is_active = true;
        self.is_break = false;
        self.current_set = 1;
        self.time_left = self.config.work_secs;
        self.session_just_completed = false;
        tracing::debug!(sets = self.config.total_sets, "session started");
        Some(Event::SessionStarted {
            work_secs: self.config.work_secs,
            break_secs: self.config.break_secs,
            total_sets: self.config.total_sets,
            at: Utc::now(),
        })
    }

    pub fn start(&mut self) -> Option<Event> {
        if self.is_setup_mode || self.is_active {
            return None;
        }
        self.is_active = true;
        Some(Event::TimerStarted {
            phase: self.phase(),
            time_left: self.time_left,
            at: Utc::now(),
        })
    }

    pub fn pause(&mut self) -> Option<Event> {
        if self.is_setup_mode || !self.is_active {
            return None;
        }
        self.is_active = false;
        Some(Event::TimerPaused {
            phase: self.phase(),
            time_left: self.time_left,
            at: Utc::now(),
        })
    }

    /// Back to setup. The configuration is kept for the next session.
    pub fn reset(&mut self) -> Option<Event> {
        self.is_setup_mode = true;
        self.is_active = false;
        self.is_break = false;
        self.current_set = 1;
        self.time_left = self.config.work_secs;
        self.session_just_completed = false;
        Some(Event::TimerReset { at: Utc::now() })
    }

    /// Bind a task to the work phase. Ignored during a break.
    pub fn set_active_task(&mut self, id: impl Into<String>, title: impl Into<String>) -> Option<Event> {
        if self.is_break {
            return None;
        }
        let task = ActiveTask {
            id: id.into(),
            title: title.into(),
        };
        let event = Event::ActiveTaskSet {
            task_id: task.id.clone(),
            title: task.title.clone(),
            at: Utc::now(),
        };
        self.active_task = Some(task);
        Some(event)
    }

    pub fn clear_active_task(&mut self) -> Option<ActiveTask> {
        self.active_task.take()
    }

    /// Advance one second. No-op unless the timer is running.
    pub fn tick(&mut self) -> Outcome {
        if self.is_setup_mode || !self.is_active {
            return Outcome::none();
        }
        if self.time_left > 0 {
            self.time_left -= 1;
            return Outcome::none();
        }
        if self.is_break {
            Outcome {
                event: Some(self.end_break()),
                effects: Vec::new(),
            }
        } else {
            self.complete_work_phase()
        }
    }

    /// Jump to the next phase boundary. Grants no XP, no focus credit, and
    /// leaves the bound task open.
    pub fn skip_phase(&mut self) -> Option<Event> {
        if self.is_setup_mode {
            return None;
        }
        let from = self.phase();
        let set = self.current_set;
        if self.is_break {
            self.end_break();
        } else {
            self.enter_break();
        }
        Some(Event::PhaseSkipped {
            from,
            set,
            to_setup: self.is_setup_mode,
            at: Utc::now(),
        })
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn complete_work_phase(&mut self) -> Outcome {
        let mut effects = Vec::new();
        let mut xp = WORK_PHASE_XP;
        let completed_task = self.active_task.take().map(|t| t.id);
        if let Some(task_id) = &completed_task {
            xp += TASK_COMPLETION_XP;
            effects.push(Effect::MarkTaskCompleted {
                task_id: task_id.clone(),
            });
        }
        self.profile.award(xp);
        self.profile.record_work_phase(self.config.work_minutes());
        effects.push(Effect::PersistStats {
            stats: self.profile.stats(),
        });

        tracing::info!(
            set = self.current_set,
            xp_awarded = xp,
            level = self.profile.level(),
            "work phase completed"
        );

        let event = Event::PhaseCompleted {
            phase: Phase::Work,
            set: self.current_set,
            xp_awarded: xp,
            completed_task,
            at: Utc::now(),
        };
        self.enter_break();
        Outcome {
            event: Some(event),
            effects,
        }
    }

    fn enter_break(&mut self) {
        self.is_break = true;
        self.is_active = true;
        self.time_left = self.config.break_secs;
    }

    fn end_break(&mut self) -> Event {
        self.is_break = false;
        if self.current_set < self.config.total_sets {
            self.current_set += 1;
            self.is_active = true;
            self.time_left = self.config.work_secs;
            Event::SetAdvanced {
                set: self.current_set,
                total_sets: self.config.total_sets,
                at: Utc::now(),
            }
        } else {
            self.is_setup_mode = true;
            self.is_active = false;
            self.current_set = 1;
            self.time_left = self.config.work_secs;
            self.session_just_completed = true;
            tracing::info!(sets = self.config.total_sets, "session completed");
            Event::SessionCompleted {
                total_sets: self.config.total_sets,
                at: Utc::now(),
            }
        }
    }
}

/// `MM:SS`, minutes unbounded.
pub fn format_clock(secs: u32) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}
