use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Work/break lengths and set count for one session.
///
/// Fixed while a session runs; only [`super::SessionMachine::configure`]
/// changes it, and only from setup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    pub work_secs: u32,
    pub break_secs: u32,
    pub total_sets: u32,
}

impl SessionConfig {
    pub fn new(work_secs: u32, break_secs: u32, total_sets: u32) -> Result<Self, ValidationError> {
        let config = Self {
            work_secs,
            break_secs,
            total_sets,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn from_minutes(work_min: u32, break_min: u32, total_sets: u32) -> Result<Self, ValidationError> {
        Self::new(
            work_min.saturating_mul(60),
            break_min.saturating_mul(60),
            total_sets,
        )
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.work_secs == 0 {
            return Err(ValidationError::invalid("work_secs", "must be greater than zero"));
        }
        if self.break_secs == 0 {
            return Err(ValidationError::invalid("break_secs", "must be greater than zero"));
        }
        if self.total_sets == 0 {
            return Err(ValidationError::invalid("total_sets", "at least one set is required"));
        }
        Ok(())
    }

    /// Whole focus minutes credited per completed work phase.
    pub fn work_minutes(&self) -> u64 {
        u64::from(self.work_secs / 60)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            work_secs: 25 * 60,
            break_secs: 5 * 60,
            total_sets: 4,
        }
    }
}

/// A named quick-pick configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Preset {
    pub name: &'static str,
    pub config: SessionConfig,
}

pub const PRESETS: [Preset; 3] = [
    Preset {
        name: "25/5/4",
        config: SessionConfig {
            work_secs: 25 * 60,
            break_secs: 5 * 60,
            total_sets: 4,
        },
    },
    Preset {
        name: "45/15/3",
        config: SessionConfig {
            work_secs: 45 * 60,
            break_secs: 15 * 60,
            total_sets: 3,
        },
    },
    Preset {
        name: "15/3/5",
        config: SessionConfig {
            work_secs: 15 * 60,
            break_secs: 3 * 60,
            total_sets: 5,
        },
    },
];

pub fn preset(name: &str) -> Option<SessionConfig> {
    PRESETS.iter().find(|p| p.name == name).map(|p| p.config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_positive_values() {
        assert!(SessionConfig::new(0, 300, 1).is_err());
        assert!(SessionConfig::new(1500, 0, 1).is_err());
        let err = SessionConfig::new(1500, 300, 0).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidValue { ref field, .. } if field == "total_sets"));
    }

    #[test]
    fn presets_are_valid() {
        for p in PRESETS {
            assert!(p.config.validate().is_ok(), "preset {} invalid", p.name);
        }
        assert_eq!(preset("45/15/3").unwrap().total_sets, 3);
        assert!(preset("60/10/2").is_none());
    }

    #[test]
    fn work_minutes_floor() {
        let cfg = SessionConfig::new(90, 30, 1).unwrap();
        assert_eq!(cfg.work_minutes(), 1);
    }
}
