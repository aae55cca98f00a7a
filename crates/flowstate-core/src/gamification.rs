//! XP, levels, and lifetime focus counters.
//!
//! `level` is never stored: it is always derived from `xp` so the two cannot
//! drift apart across serialization boundaries.

use serde::{Deserialize, Serialize};

/// XP awarded when a work phase runs to completion.
pub const WORK_PHASE_XP: u64 = 100;
/// Extra XP when a task is completed (bound task at phase end, or manual toggle).
pub const TASK_COMPLETION_XP: u64 = 50;
/// XP span of a single level.
pub const XP_PER_LEVEL: u64 = 500;

/// `floor(xp / 500) + 1`.
pub fn level_for_xp(xp: u64) -> u32 {
    u32::try_from(xp / XP_PER_LEVEL)
        .unwrap_or(u32::MAX)
        .saturating_add(1)
}

/// Gamification state carried alongside the session machine.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    xp: u64,
    sessions_completed: u64,
    /// Accumulated focus minutes.
    total_time_min: u64,
}

/// Flattened stats as written to the profile store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileStats {
    pub xp: u64,
    pub level: u32,
    pub sessions_completed: u64,
    pub total_time_min: u64,
}

impl Profile {
    pub fn new(xp: u64, sessions_completed: u64, total_time_min: u64) -> Self {
        Self {
            xp,
            sessions_completed,
            total_time_min,
        }
    }

    pub fn xp(&self) -> u64 {
        self.xp
    }

    pub fn level(&self) -> u32 {
        level_for_xp(self.xp)
    }

    pub fn sessions_completed(&self) -> u64 {
        self.sessions_completed
    }

    pub fn total_time_min(&self) -> u64 {
        self.total_time_min
    }

    /// XP earned inside the current level (0..500).
    pub fn level_progress(&self) -> u64 {
        self.xp % XP_PER_LEVEL
    }

    pub fn xp_for_next_level(&self) -> u64 {
        XP_PER_LEVEL
    }

    pub fn stats(&self) -> ProfileStats {
        ProfileStats {
            xp: self.xp,
            level: self.level(),
            sessions_completed: self.sessions_completed,
            total_time_min: self.total_time_min,
        }
    }

    pub(crate) fn award(&mut self, amount: u64) {
        self.xp = self.xp.saturating_add(amount);
    }

    /// Floors at zero; XP never goes negative.
    pub(crate) fn revoke(&mut self, amount: u64) {
        self.xp = self.xp.saturating_sub(amount);
    }

    pub(crate) fn record_work_phase(&mut self, minutes: u64) {
        self.sessions_completed += 1;
        self.total_time_min += minutes;
    }
}

impl From<ProfileStats> for Profile {
    fn from(stats: ProfileStats) -> Self {
        // The stored level is ignored; it is re-derived from xp.
        Profile::new(stats.xp, stats.sessions_completed, stats.total_time_min)
    }
}
