use glam::IVec2;
use serde::{Deserialize, Serialize};

use super::LoadError;
use crate::settings::MAX_PLAYERS;
use crate::sim::{
    Enemy, EnemyBehavior, EnemyKind, FireHazard, Flavor, Fruit, FruitBehavior, FruitKind,
    GameState, GridMap, LevelLayout, Player, RunState, SimRng, SolidStructure,
};
use crate::tuning::Tuning;
use crate::{GridPos, is_unit_direction};

/// Current snapshot format version
pub const SNAPSHOT_VERSION: u32 = 1;

/// One player as stored in a snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerRecord {
    pub index: u8,
    pub pos: GridPos,
    pub facing: IVec2,
    pub score: u32,
    pub flavor: String,
}

/// One enemy; `break_cooldown` is only meaningful for breakers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnemyRecord {
    pub kind: String,
    pub pos: GridPos,
    pub dir: IVec2,
    pub move_cooldown: u32,
    #[serde(default)]
    pub break_cooldown: u32,
}

/// One fruit. `ticks` is the teleport or spike timer, `dir` the roaming
/// heading; unused fields are zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FruitRecord {
    pub kind: String,
    pub pos: GridPos,
    pub collected: bool,
    #[serde(default)]
    pub ticks: u32,
    #[serde(default)]
    pub dir: IVec2,
    #[serde(default)]
    pub spiked: bool,
}

/// Grid dimensions, ice flags and obstacle states
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapRecord {
    pub width: i32,
    pub height: i32,
    /// Row-major ice flags, `width * height` long
    pub ice: Vec<bool>,
    pub fires: Vec<FireHazard>,
    pub heat_tiles: Vec<GridPos>,
    pub structures: Vec<SolidStructure>,
}

/// The layout a level started from, kept so a restored run can reset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutRecord {
    pub level: u32,
    pub map: MapRecord,
    pub players: Vec<PlayerRecord>,
    pub enemies: Vec<EnemyRecord>,
    pub fruits: Vec<FruitRecord>,
}

/// Flat, versioned picture of a whole run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub version: u32,
    pub map: MapRecord,
    pub players: Vec<PlayerRecord>,
    pub enemies: Vec<EnemyRecord>,
    pub fruits: Vec<FruitRecord>,
    pub run: RunState,
    #[serde(default)]
    pub tuning: Tuning,
    pub rng_seed: u64,
    pub rng_draws: u64,
    pub start: LayoutRecord,
}

impl Snapshot {
    pub fn to_json(&self) -> String {
        // Plain records with string keys only; serialization cannot fail
        serde_json::to_string(self).unwrap_or_default()
    }

    /// Parse only; call `GameState::restore` to validate
    pub fn from_json(json: &str) -> Result<Self, LoadError> {
        Ok(serde_json::from_str(json)?)
    }
}

impl GameState {
    /// Export the full run as a flat snapshot (pending events are not kept)
    pub fn snapshot(&self) -> Snapshot {
        let start = self.start_layout();
        Snapshot {
            version: SNAPSHOT_VERSION,
            map: map_record(&self.map),
            players: self.players.iter().map(player_record).collect(),
            enemies: self.enemies.iter().map(enemy_record).collect(),
            fruits: self.fruits.iter().map(fruit_record).collect(),
            run: self.run.clone(),
            tuning: self.tuning.clone(),
            rng_seed: self.rng.seed(),
            rng_draws: self.rng.draws(),
            start: LayoutRecord {
                level: start.level,
                map: map_record(&start.map),
                players: start.players.iter().map(player_record).collect(),
                enemies: start.enemies.iter().map(enemy_record).collect(),
                fruits: start.fruits.iter().map(fruit_record).collect(),
            },
        }
    }

    /// Rebuild a run from a snapshot. Nothing is partially applied on error.
    pub fn restore(snapshot: &Snapshot) -> Result<GameState, LoadError> {
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(LoadError::UnsupportedVersion {
                found: snapshot.version,
            });
        }
        snapshot
            .tuning
            .validate()
            .map_err(|e| LoadError::InvalidTuning(e.to_string()))?;

        let map = restore_map(&snapshot.map)?;
        let players = restore_players(&map, &snapshot.players)?;
        let enemies = restore_all(&map, &snapshot.enemies, restore_enemy)?;
        let fruits = restore_all(&map, &snapshot.fruits, restore_fruit)?;

        let start = &snapshot.start;
        let start_map = restore_map(&start.map)?;
        let layout = LevelLayout {
            level: start.level,
            players: restore_players(&start_map, &start.players)?,
            enemies: restore_all(&start_map, &start.enemies, restore_enemy)?,
            fruits: restore_all(&start_map, &start.fruits, restore_fruit)?,
            map: start_map,
        };

        log::info!(
            "Restored level {} at tick {} ({} enemies, {} fruits)",
            snapshot.run.level,
            snapshot.run.ticks,
            enemies.len(),
            fruits.len()
        );
        Ok(GameState::from_parts(
            map,
            players,
            enemies,
            fruits,
            snapshot.run.clone(),
            snapshot.tuning.clone(),
            SimRng::restore(snapshot.rng_seed, snapshot.rng_draws),
            layout,
        ))
    }
}

fn map_record(map: &GridMap) -> MapRecord {
    MapRecord {
        width: map.width(),
        height: map.height(),
        ice: map.ice_grid().to_vec(),
        fires: map.fires().to_vec(),
        heat_tiles: map.heat_tiles().iter().map(|tile| tile.pos).collect(),
        structures: map.structures().to_vec(),
    }
}

fn player_record(player: &Player) -> PlayerRecord {
    PlayerRecord {
        index: player.index,
        pos: player.pos,
        facing: player.facing,
        score: player.score,
        flavor: player.flavor.as_str().to_string(),
    }
}

fn enemy_record(enemy: &Enemy) -> EnemyRecord {
    let break_cooldown = match enemy.behavior {
        EnemyBehavior::PursuerBreaker { break_cooldown } => break_cooldown,
        _ => 0,
    };
    EnemyRecord {
        kind: enemy.kind().as_str().to_string(),
        pos: enemy.pos,
        dir: enemy.dir,
        move_cooldown: enemy.move_cooldown,
        break_cooldown,
    }
}

fn fruit_record(fruit: &Fruit) -> FruitRecord {
    let (ticks, dir, spiked) = match fruit.behavior {
        FruitBehavior::Static => (0, IVec2::ZERO, false),
        FruitBehavior::Teleporting { ticks } => (ticks, IVec2::ZERO, false),
        FruitBehavior::Roaming { dir } => (0, dir, false),
        FruitBehavior::HazardCycling { ticks, spiked } => (ticks, IVec2::ZERO, spiked),
    };
    FruitRecord {
        kind: fruit.kind.as_str().to_string(),
        pos: fruit.pos,
        collected: fruit.is_collected(),
        ticks,
        dir,
        spiked,
    }
}

fn check_bounds(map: &GridMap, pos: GridPos) -> Result<(), LoadError> {
    if map.in_bounds(pos) {
        Ok(())
    } else {
        Err(LoadError::PositionOutOfBounds { pos })
    }
}

fn restore_map(record: &MapRecord) -> Result<GridMap, LoadError> {
    let (width, height) = (record.width, record.height);
    let cells = width.checked_mul(height);
    let Some(expected) = cells.filter(|_| width >= 3 && height >= 3) else {
        return Err(LoadError::InvalidDimensions { width, height });
    };
    let expected = expected as usize;
    if record.ice.len() != expected {
        return Err(LoadError::GridSizeMismatch {
            expected,
            actual: record.ice.len(),
        });
    }

    let mut map = GridMap::new(width, height);
    for structure in &record.structures {
        check_bounds(&map, structure.top_left)?;
        if !map.add_structure(*structure) {
            return Err(LoadError::ObstacleConflict {
                pos: structure.top_left,
            });
        }
    }
    for fire in &record.fires {
        check_bounds(&map, fire.pos)?;
        if !map.add_fire_hazard(fire.clone()) {
            return Err(LoadError::ObstacleConflict { pos: fire.pos });
        }
    }
    for &pos in &record.heat_tiles {
        check_bounds(&map, pos)?;
        if !map.add_heat_tile(pos) {
            return Err(LoadError::ObstacleConflict { pos });
        }
    }
    map.load_ice(&record.ice);
    Ok(map)
}

/// Players sorted by index; indices must be 1..=MAX_PLAYERS and unique
fn restore_players(map: &GridMap, records: &[PlayerRecord]) -> Result<Vec<Player>, LoadError> {
    let mut players: Vec<Player> = Vec::with_capacity(records.len());
    for record in records {
        let valid_index = (1..=MAX_PLAYERS as u8).contains(&record.index);
        if !valid_index || players.iter().any(|p| p.index == record.index) {
            return Err(LoadError::InvalidPlayerIndex { index: record.index });
        }
        check_bounds(map, record.pos)?;
        let flavor = Flavor::from_tag(&record.flavor)
            .ok_or_else(|| LoadError::UnknownFlavor(record.flavor.clone()))?;
        let mut player = Player::new(record.pos, flavor, record.index);
        if is_unit_direction(record.facing) {
            player.face(record.facing);
        }
        player.score = record.score;
        players.push(player);
    }
    players.sort_by_key(|p| p.index);
    Ok(players)
}

fn restore_all<R, T>(
    map: &GridMap,
    records: &[R],
    restore: fn(&GridMap, &R) -> Result<T, LoadError>,
) -> Result<Vec<T>, LoadError> {
    records.iter().map(|record| restore(map, record)).collect()
}

fn restore_enemy(map: &GridMap, record: &EnemyRecord) -> Result<Enemy, LoadError> {
    let kind = EnemyKind::from_tag(&record.kind)
        .ok_or_else(|| LoadError::UnknownEnemyKind(record.kind.clone()))?;
    check_bounds(map, record.pos)?;
    let mut enemy = Enemy::new(kind, record.pos);
    if is_unit_direction(record.dir) {
        enemy = enemy.with_direction(record.dir);
    }
    enemy.move_cooldown = record.move_cooldown;
    if let EnemyBehavior::PursuerBreaker { break_cooldown } = &mut enemy.behavior {
        *break_cooldown = record.break_cooldown;
    }
    Ok(enemy)
}

fn restore_fruit(map: &GridMap, record: &FruitRecord) -> Result<Fruit, LoadError> {
    let kind = FruitKind::from_tag(&record.kind)
        .ok_or_else(|| LoadError::UnknownFruitKind(record.kind.clone()))?;
    check_bounds(map, record.pos)?;
    let behavior = match kind {
        FruitKind::Grape | FruitKind::Banana => FruitBehavior::Static,
        FruitKind::Cherry => FruitBehavior::Teleporting { ticks: record.ticks },
        FruitKind::Pineapple => FruitBehavior::Roaming {
            dir: if is_unit_direction(record.dir) {
                record.dir
            } else {
                IVec2::new(1, 0)
            },
        },
        FruitKind::Cactus => FruitBehavior::HazardCycling {
            ticks: record.ticks,
            spiked: record.spiked,
        },
    };
    Ok(Fruit::restore(kind, record.pos, behavior, record.collected))
}
