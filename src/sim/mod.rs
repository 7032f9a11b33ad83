//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only (100 ms ticks, 1 s clock)
//! - Seeded RNG only
//! - Stable iteration order (storage order for enemies and fruits)
//! - No rendering or platform dependencies

pub mod collision;
pub mod enemy;
pub mod fruit;
pub mod grid;
pub mod level;
pub mod player;
pub mod state;
pub mod tick;

pub use enemy::{Enemy, EnemyBehavior, EnemyKind, EnemyStep};
pub use fruit::{Fruit, FruitBehavior, FruitKind, FruitUpdate};
pub use grid::{FireHazard, GridMap, HeatTile, IceLine, IceOutcome, LineMode, SolidStructure};
pub use level::{LEVEL_COUNT, LevelLayout, build_level, parse_layout};
pub use player::{Flavor, Player};
pub use state::{GameEvent, GamePhase, GameState, LossCause, RunState, SimRng};
pub use tick::{
    PlayerInput, TickInput, advance_second, advance_tick, move_player, shoot_ice,
    shoot_ice_facing, tick,
};
