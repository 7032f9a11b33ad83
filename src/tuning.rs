//! Data-driven game balance
//!
//! Every timer the simulation counts in ticks lives here so a host can
//! override them from JSON without touching the engine.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::consts::*;

/// Timer and cadence values (all counts are simulation ticks unless noted)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Ticks an extinguished fire stays out
    pub fire_relight_ticks: u32,
    /// Ticks between cactus spike toggles
    pub spike_cycle_ticks: u32,
    /// Ticks between cherry teleports
    pub teleport_interval_ticks: u32,
    /// Blocked ticks before a squid breaks the ice in front of it
    pub break_delay_ticks: u32,
    /// Patrol moves every N ticks
    pub patrol_move_interval: u32,
    /// Pursuer moves every N ticks
    pub pursuer_move_interval: u32,
    /// Breaker moves every N ticks
    pub breaker_move_interval: u32,
    /// Random cells tried per teleport
    pub teleport_attempts: u32,
    /// Level time limit (seconds)
    pub level_time_secs: u32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            fire_relight_ticks: FIRE_RELIGHT_TICKS,
            spike_cycle_ticks: SPIKE_CYCLE_TICKS,
            teleport_interval_ticks: TELEPORT_INTERVAL_TICKS,
            break_delay_ticks: BREAK_DELAY_TICKS,
            patrol_move_interval: 1,
            pursuer_move_interval: POT_MOVE_INTERVAL,
            breaker_move_interval: 1,
            teleport_attempts: TELEPORT_ATTEMPTS,
            level_time_secs: LEVEL_TIME_SECS,
        }
    }
}

/// Configuration errors
#[derive(Debug)]
pub enum TuningError {
    Parse(serde_json::Error),
    ZeroInterval { field: &'static str },
}

impl fmt::Display for TuningError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(e) => write!(f, "invalid tuning json: {e}"),
            Self::ZeroInterval { field } => write!(f, "tuning field `{field}` must be at least 1"),
        }
    }
}

impl std::error::Error for TuningError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Parse(e) => Some(e),
            Self::ZeroInterval { .. } => None,
        }
    }
}

impl From<serde_json::Error> for TuningError {
    fn from(e: serde_json::Error) -> Self {
        Self::Parse(e)
    }
}

impl Tuning {
    /// Parse (possibly partial) overrides; missing fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    pub fn to_json(&self) -> String {
        // Plain struct of integers; serialization cannot fail
        serde_json::to_string_pretty(self).unwrap_or_default()
    }

    /// Reject values that would divide time into nothing
    pub fn validate(&self) -> Result<(), TuningError> {
        let intervals = [
            ("fire_relight_ticks", self.fire_relight_ticks),
            ("spike_cycle_ticks", self.spike_cycle_ticks),
            ("teleport_interval_ticks", self.teleport_interval_ticks),
            ("break_delay_ticks", self.break_delay_ticks),
            ("patrol_move_interval", self.patrol_move_interval),
            ("pursuer_move_interval", self.pursuer_move_interval),
            ("breaker_move_interval", self.breaker_move_interval),
        ];
        for (field, value) in intervals {
            if value == 0 {
                return Err(TuningError::ZeroInterval { field });
            }
        }
        Ok(())
    }
}
