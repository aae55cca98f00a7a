mod engine;
mod preset;

pub use engine::{format_clock, ActiveTask, MachineState, Outcome, Phase, SessionMachine, Snapshot};
pub use preset::{preset, Preset, SessionConfig, PRESETS};
