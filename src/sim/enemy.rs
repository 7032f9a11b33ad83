//! Enemy behaviors
//!
//! Every enemy shares one record (position, direction, move cadence) and
//! carries a kind-specific payload. `Enemy::step` dispatches on the payload.

use glam::IVec2;
use serde::{Deserialize, Serialize};

use super::grid::{GridMap, IceOutcome};
use crate::tuning::Tuning;
use crate::{GridPos, axis_step};

/// Enemy kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyKind {
    /// Troll: walks back and forth
    Patrol,
    /// Pot: slowly chases the nearest player
    Pursuer,
    /// Orange squid: chases and chews through ice
    PursuerBreaker,
}

impl EnemyKind {
    /// Stable tag used by snapshots
    pub fn as_str(&self) -> &'static str {
        match self {
            EnemyKind::Patrol => "Troll",
            EnemyKind::Pursuer => "Pot",
            EnemyKind::PursuerBreaker => "OrangeSquid",
        }
    }

    pub fn from_tag(s: &str) -> Option<Self> {
        match s {
            "Troll" => Some(EnemyKind::Patrol),
            "Pot" => Some(EnemyKind::Pursuer),
            "OrangeSquid" => Some(EnemyKind::PursuerBreaker),
            _ => None,
        }
    }

    /// Ticks between moves for this kind
    pub fn move_interval(&self, tuning: &Tuning) -> u32 {
        match self {
            EnemyKind::Patrol => tuning.patrol_move_interval,
            EnemyKind::Pursuer => tuning.pursuer_move_interval,
            EnemyKind::PursuerBreaker => tuning.breaker_move_interval,
        }
    }
}

/// Kind-specific state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnemyBehavior {
    Patrol,
    Pursuer,
    PursuerBreaker {
        /// Ticks spent pushing against the same ice
        break_cooldown: u32,
    },
}

/// What happened during one enemy step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EnemyStep {
    pub moved: bool,
    pub reversed: bool,
    pub broke_ice: Option<GridPos>,
}

/// An autonomous enemy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Enemy {
    pub pos: GridPos,
    /// Current heading; patrols follow it, pursuers record their last step
    pub dir: IVec2,
    /// Ticks since the last move opportunity
    pub move_cooldown: u32,
    pub behavior: EnemyBehavior,
}

impl Enemy {
    /// New enemy heading east
    pub fn new(kind: EnemyKind, pos: GridPos) -> Self {
        let behavior = match kind {
            EnemyKind::Patrol => EnemyBehavior::Patrol,
            EnemyKind::Pursuer => EnemyBehavior::Pursuer,
            EnemyKind::PursuerBreaker => EnemyBehavior::PursuerBreaker { break_cooldown: 0 },
        };
        Self {
            pos,
            dir: IVec2::new(1, 0),
            move_cooldown: 0,
            behavior,
        }
    }

    pub fn with_direction(mut self, dir: IVec2) -> Self {
        self.dir = dir;
        self
    }

    pub fn kind(&self) -> EnemyKind {
        match self.behavior {
            EnemyBehavior::Patrol => EnemyKind::Patrol,
            EnemyBehavior::Pursuer => EnemyKind::Pursuer,
            EnemyBehavior::PursuerBreaker { .. } => EnemyKind::PursuerBreaker,
        }
    }

    pub fn reverse_direction(&mut self) {
        self.dir = -self.dir;
    }

    /// Count one tick toward the next move; true when the enemy may act
    fn ready(&mut self, interval: u32) -> bool {
        self.move_cooldown += 1;
        if self.move_cooldown >= interval {
            self.move_cooldown = 0;
            return true;
        }
        false
    }

    /// Advance one tick toward `target` (the nearest player, if any)
    pub fn step(&mut self, map: &mut GridMap, target: Option<GridPos>, tuning: &Tuning) -> EnemyStep {
        if !self.ready(self.kind().move_interval(tuning)) {
            return EnemyStep::default();
        }
        match self.behavior {
            EnemyBehavior::Patrol => self.patrol(map),
            EnemyBehavior::Pursuer => match target {
                Some(target) => self.pursue(map, target),
                None => EnemyStep::default(),
            },
            EnemyBehavior::PursuerBreaker { .. } => match target {
                Some(target) => self.pursue_breaking(map, target, tuning.break_delay_ticks),
                None => EnemyStep::default(),
            },
        }
    }

    fn patrol(&mut self, map: &GridMap) -> EnemyStep {
        let next = self.pos.offset(self.dir);
        if map.is_walkable(next) {
            self.pos = next;
            EnemyStep {
                moved: true,
                ..Default::default()
            }
        } else {
            self.reverse_direction();
            EnemyStep {
                reversed: true,
                ..Default::default()
            }
        }
    }

    fn pursue(&mut self, map: &GridMap, target: GridPos) -> EnemyStep {
        for step in pursuit_steps(self.pos, target) {
            let next = self.pos.offset(step);
            if map.is_walkable(next) {
                self.pos = next;
                self.dir = step;
                return EnemyStep {
                    moved: true,
                    ..Default::default()
                };
            }
        }
        EnemyStep::default()
    }

    fn pursue_breaking(&mut self, map: &mut GridMap, target: GridPos, break_delay: u32) -> EnemyStep {
        let EnemyBehavior::PursuerBreaker { mut break_cooldown } = self.behavior else {
            return EnemyStep::default();
        };
        let mut result = EnemyStep::default();

        for step in pursuit_steps(self.pos, target) {
            let next = self.pos.offset(step);
            if map.is_walkable(next) {
                self.pos = next;
                self.dir = step;
                break_cooldown = 0;
                result.moved = true;
                break;
            }
            if map.has_ice(next) {
                // Ice ahead: chew on it instead of trying the other axis
                self.dir = step;
                break_cooldown += 1;
                if break_cooldown >= break_delay {
                    if map.toggle_ice(next) == IceOutcome::Removed {
                        log::debug!("Squid at {:?} broke ice at {:?}", self.pos, next);
                        result.broke_ice = Some(next);
                    }
                    break_cooldown = 0;
                }
                break;
            }
        }

        self.behavior = EnemyBehavior::PursuerBreaker { break_cooldown };
        result
    }
}

/// Preferred then fallback unit steps toward `to`; the axis with the larger
/// distance goes first (ties go horizontal). Zero steps are dropped.
fn pursuit_steps(from: GridPos, to: GridPos) -> impl Iterator<Item = IVec2> {
    let d_row = to.row - from.row;
    let d_col = to.col - from.col;
    let vertical = IVec2::new(0, axis_step(d_row));
    let horizontal = IVec2::new(axis_step(d_col), 0);
    let order = if d_row.abs() > d_col.abs() {
        [vertical, horizontal]
    } else {
        [horizontal, vertical]
    };
    order.into_iter().filter(|step| *step != IVec2::ZERO)
}
