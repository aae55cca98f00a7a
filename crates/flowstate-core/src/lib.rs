//! # FlowState Core Library
//!
//! Core business logic for the FlowState study tracker. Everything is
//! available through the standalone `flowstate-cli` binary; any other front
//! end is a thin layer over this crate.
//!
//! ## Architecture
//!
//! - **Session machine**: a tick-driven Pomodoro state machine with sets,
//!   task binding and XP. The caller drives it by invoking `tick()` once per
//!   elapsed second.
//! - **Pressure engine**: pure functions rating how far behind schedule each
//!   goal is.
//! - **Board**: goals and tasks, with the XP side of completing a task.
//! - **Effects**: every persistent change is returned as an [`Effect`] and
//!   applied by [`dispatch`] against the store traits.
//! - **Storage**: SQLite persistence and TOML configuration.
//!
//! ## Key Components
//!
//! - [`SessionMachine`]: session state machine
//! - [`Tracker`]: machine and board kept consistent with each other
//! - [`calculate_all_pressures`]: pressure, urgency and overall average
//! - [`Database`]: goal, task, profile and session persistence
//! - [`Config`]: application configuration management

pub mod board;
pub mod effects;
pub mod error;
pub mod events;
pub mod gamification;
pub mod importer;
pub mod pressure;
pub mod storage;
pub mod timer;
pub mod tracker;

pub use board::{Board, Goal, Task};
pub use effects::{dispatch, DispatchReport, Effect, GoalStore, ProfileStore, TaskStore};
pub use error::{ConfigError, CoreError, DatabaseError, ImportError, ValidationError};
pub use events::Event;
pub use gamification::{level_for_xp, Profile, ProfileStats};
pub use importer::{parse_subtasks, GeminiSplitter, LineSplitter, TaskSplitter};
pub use pressure::{calculate_all_pressures, GoalPressure, PressureReport, Urgency};
pub use storage::{Config, Database};
pub use timer::{MachineState, Outcome, Phase, SessionConfig, SessionMachine, Snapshot};
pub use tracker::Tracker;
