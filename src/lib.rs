//! Frost Arena - grid simulation core for an ice-and-fruit arcade game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (grid, ice protocol, enemies, fruits, collisions)
//! - `persistence`: Flat snapshot export/import
//! - `tuning`: Data-driven timers and balance
//! - `settings`: Host-facing preferences (players, flavors, level, seed)

pub mod persistence;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use settings::Settings;
pub use tuning::Tuning;

use glam::IVec2;
use serde::{Deserialize, Serialize};

/// Game configuration constants
pub mod consts {
    /// Simulation ticks per second (one tick every 100 ms)
    pub const TICKS_PER_SECOND: u32 = 10;

    /// Default map dimensions
    pub const DEFAULT_MAP_WIDTH: i32 = 20;
    pub const DEFAULT_MAP_HEIGHT: i32 = 15;

    /// Extinguished fire relights after 10 seconds
    pub const FIRE_RELIGHT_TICKS: u32 = 10 * TICKS_PER_SECOND;
    /// Cactus toggles its spikes every 30 seconds
    pub const SPIKE_CYCLE_TICKS: u32 = 30 * TICKS_PER_SECOND;
    /// Cherry jumps every 5 seconds
    pub const TELEPORT_INTERVAL_TICKS: u32 = 5 * TICKS_PER_SECOND;
    /// Squid chews through ice after this many blocked ticks
    pub const BREAK_DELAY_TICKS: u32 = 10;
    /// Pot moves once every 1.5 seconds
    pub const POT_MOVE_INTERVAL: u32 = 15;
    /// Random cells tried before a teleport gives up
    pub const TELEPORT_ATTEMPTS: u32 = 100;

    /// Time limit per level (3 minutes)
    pub const LEVEL_TIME_SECS: u32 = 180;

    /// Fruit point values
    pub const GRAPE_POINTS: u32 = 50;
    pub const BANANA_POINTS: u32 = 100;
    pub const PINEAPPLE_POINTS: u32 = 120;
    pub const CHERRY_POINTS: u32 = 150;
    pub const CACTUS_POINTS: u32 = 250;

    /// Default igloo footprint
    pub const IGLOO_SIZE: i32 = 2;
}

/// Integer cell coordinate on the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct GridPos {
    pub row: i32,
    pub col: i32,
}

impl GridPos {
    #[inline]
    pub const fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    /// Neighbouring cell along a direction vector (x = columns, y = rows)
    #[inline]
    pub fn offset(self, dir: IVec2) -> Self {
        Self {
            row: self.row + dir.y,
            col: self.col + dir.x,
        }
    }

    /// Manhattan distance between two cells
    #[inline]
    pub fn manhattan(self, other: GridPos) -> i32 {
        (self.row - other.row).abs() + (self.col - other.col).abs()
    }
}

/// True for the four unit directions (one axis zero, magnitude 1)
#[inline]
pub fn is_unit_direction(dir: IVec2) -> bool {
    dir.x.abs() + dir.y.abs() == 1
}

/// Single-axis step toward a signed delta (zero stays zero)
#[inline]
pub fn axis_step(delta: i32) -> i32 {
    delta.signum()
}
