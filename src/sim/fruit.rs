//! Collectible fruits
//!
//! A fruit only mutates its own timers. Anything that needs the map (picking a
//! teleport cell, checking a roaming step) is returned as a `FruitUpdate` for
//! the tick driver to resolve.

use glam::IVec2;
use serde::{Deserialize, Serialize};

use crate::GridPos;
use crate::consts::*;
use crate::tuning::Tuning;

/// Fruit kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FruitKind {
    Grape,
    Banana,
    Pineapple,
    Cherry,
    Cactus,
}

impl FruitKind {
    pub fn points(&self) -> u32 {
        match self {
            FruitKind::Grape => GRAPE_POINTS,
            FruitKind::Banana => BANANA_POINTS,
            FruitKind::Pineapple => PINEAPPLE_POINTS,
            FruitKind::Cherry => CHERRY_POINTS,
            FruitKind::Cactus => CACTUS_POINTS,
        }
    }

    /// Stable tag used by snapshots
    pub fn as_str(&self) -> &'static str {
        match self {
            FruitKind::Grape => "Grape",
            FruitKind::Banana => "Banana",
            FruitKind::Pineapple => "Pineapple",
            FruitKind::Cherry => "Cherry",
            FruitKind::Cactus => "Cactus",
        }
    }

    pub fn from_tag(s: &str) -> Option<Self> {
        match s {
            "Grape" => Some(FruitKind::Grape),
            "Banana" => Some(FruitKind::Banana),
            "Pineapple" => Some(FruitKind::Pineapple),
            "Cherry" => Some(FruitKind::Cherry),
            "Cactus" => Some(FruitKind::Cactus),
            _ => None,
        }
    }
}

/// Kind-specific timers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FruitBehavior {
    Static,
    Teleporting { ticks: u32 },
    Roaming { dir: IVec2 },
    HazardCycling { ticks: u32, spiked: bool },
}

/// Work a fruit asks the driver to do after its tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FruitUpdate {
    Idle,
    /// Pick a random walkable cell and call `Fruit::finish_teleport`
    Teleport,
    /// Try to step one cell along this direction
    Roam(IVec2),
    /// Spikes just toggled to this value
    SpikesChanged(bool),
}

/// A collectible fruit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fruit {
    pub kind: FruitKind,
    pub pos: GridPos,
    pub behavior: FruitBehavior,
    points: u32,
    collected: bool,
}

impl Fruit {
    pub fn new(kind: FruitKind, pos: GridPos) -> Self {
        let behavior = match kind {
            FruitKind::Grape | FruitKind::Banana => FruitBehavior::Static,
            FruitKind::Cherry => FruitBehavior::Teleporting { ticks: 0 },
            FruitKind::Pineapple => FruitBehavior::Roaming { dir: IVec2::new(1, 0) },
            FruitKind::Cactus => FruitBehavior::HazardCycling {
                ticks: 0,
                spiked: false,
            },
        };
        Self {
            kind,
            pos,
            behavior,
            points: kind.points(),
            collected: false,
        }
    }

    /// Rebuild a fruit mid-run (snapshot restore)
    pub(crate) fn restore(kind: FruitKind, pos: GridPos, behavior: FruitBehavior, collected: bool) -> Self {
        Self {
            kind,
            pos,
            behavior,
            points: kind.points(),
            collected,
        }
    }

    #[inline]
    pub fn points(&self) -> u32 {
        self.points
    }

    #[inline]
    pub fn is_collected(&self) -> bool {
        self.collected
    }

    /// Mark collected; there is no way back
    pub fn collect(&mut self) {
        self.collected = true;
    }

    /// Spiked cacti kill on touch
    pub fn is_spiked(&self) -> bool {
        matches!(self.behavior, FruitBehavior::HazardCycling { spiked: true, .. })
    }

    /// Advance one tick
    pub fn update(&mut self, tuning: &Tuning) -> FruitUpdate {
        if self.collected {
            return FruitUpdate::Idle;
        }
        match &mut self.behavior {
            FruitBehavior::Static => FruitUpdate::Idle,
            FruitBehavior::Teleporting { ticks } => {
                *ticks += 1;
                if *ticks >= tuning.teleport_interval_ticks {
                    FruitUpdate::Teleport
                } else {
                    FruitUpdate::Idle
                }
            }
            FruitBehavior::Roaming { dir } => FruitUpdate::Roam(*dir),
            FruitBehavior::HazardCycling { ticks, spiked } => {
                *ticks += 1;
                if *ticks >= tuning.spike_cycle_ticks {
                    *spiked = !*spiked;
                    *ticks = 0;
                    FruitUpdate::SpikesChanged(*spiked)
                } else {
                    FruitUpdate::Idle
                }
            }
        }
    }

    /// Relocate after a teleport request (or stay put if no cell was found);
    /// the countdown restarts either way
    pub fn finish_teleport(&mut self, target: Option<GridPos>) {
        if let Some(pos) = target {
            self.pos = pos;
        }
        if let FruitBehavior::Teleporting { ticks } = &mut self.behavior {
            *ticks = 0;
        }
    }

    /// Roaming fruit hit something: turn around
    pub fn reverse_direction(&mut self) {
        if let FruitBehavior::Roaming { dir } = &mut self.behavior {
            *dir = -*dir;
        }
    }
}
