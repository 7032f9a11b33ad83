//! Game state and core simulation types
//!
//! Everything a host needs to draw a frame or save a run is reachable from
//! `GameState`.

use rand::{RngCore, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::enemy::Enemy;
use super::fruit::{Fruit, FruitKind};
use super::grid::GridMap;
use super::level::{LevelLayout, build_level};
use super::player::Player;
use crate::GridPos;
use crate::settings::Settings;
use crate::tuning::Tuning;

/// Current phase of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Active gameplay
    Playing,
    /// Frozen until unpaused
    Paused,
    /// Every fruit collected
    Won,
    /// Run ended
    Lost { cause: LossCause },
}

/// Which terminal condition ended the run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LossCause {
    Enemy,
    Fire,
    Spikes,
    TimeUp,
}

/// Notifications for UI/audio collaborators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    FruitCollected { player: u8, kind: FruitKind, points: u32 },
    IceCreated { cells: usize },
    IceDestroyed { cells: usize },
    IceBroken { pos: GridPos },
    FireExtinguished { pos: GridPos },
    FireRelit { pos: GridPos },
    SpikesChanged { pos: GridPos, spiked: bool },
    FruitTeleported { from: GridPos, to: GridPos },
    PlayerKilled { player: u8, cause: LossCause },
    LevelWon,
    TimeUp,
}

/// Run-wide counters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunState {
    /// Level number (1-based)
    pub level: u32,
    pub score: u32,
    /// Seconds left on the level clock
    pub time_remaining: u32,
    pub fruits_collected: u32,
    pub total_fruits: u32,
    /// Simulation tick counter
    pub ticks: u64,
    pub phase: GamePhase,
}

impl RunState {
    pub fn new(level: u32, total_fruits: u32, time_limit: u32) -> Self {
        Self {
            level,
            score: 0,
            time_remaining: time_limit,
            fruits_collected: 0,
            total_fruits,
            ticks: 0,
            phase: GamePhase::Playing,
        }
    }

    pub fn add_score(&mut self, points: u32) {
        self.score += points;
    }

    pub fn collect_fruit(&mut self) {
        self.fruits_collected += 1;
    }

    /// One second off the clock, never below zero
    pub fn decrement_time(&mut self) {
        self.time_remaining = self.time_remaining.saturating_sub(1);
    }

    pub fn is_level_complete(&self) -> bool {
        self.fruits_collected >= self.total_fruits
    }

    pub fn is_time_up(&self) -> bool {
        self.time_remaining == 0
    }

    /// `MM:SS`
    pub fn formatted_time(&self) -> String {
        format!("{:02}:{:02}", self.time_remaining / 60, self.time_remaining % 60)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self.phase, GamePhase::Won | GamePhase::Lost { .. })
    }

    pub fn loss_cause(&self) -> Option<LossCause> {
        match self.phase {
            GamePhase::Lost { cause } => Some(cause),
            _ => None,
        }
    }
}

/// Seeded RNG that counts its raw draws so a snapshot can replay it
#[derive(Debug, Clone)]
pub struct SimRng {
    seed: u64,
    draws: u64,
    inner: Pcg32,
}

impl SimRng {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            draws: 0,
            inner: Pcg32::seed_from_u64(seed),
        }
    }

    /// Rebuild the generator at the same point in its sequence. Every draw is
    /// one PCG step, so this jumps ahead in O(log draws).
    pub fn restore(seed: u64, draws: u64) -> Self {
        let mut inner = Pcg32::seed_from_u64(seed);
        inner.advance(draws);
        Self { seed, draws, inner }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn draws(&self) -> u64 {
        self.draws
    }
}

impl RngCore for SimRng {
    fn next_u32(&mut self) -> u32 {
        self.draws = self.draws.wrapping_add(1);
        self.inner.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        let lo = self.next_u32() as u64;
        let hi = self.next_u32() as u64;
        (hi << 32) | lo
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for chunk in dest.chunks_mut(4) {
            let bytes = self.next_u32().to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }
}

/// Complete game state (deterministic for a given seed and input sequence)
#[derive(Debug, Clone)]
pub struct GameState {
    pub map: GridMap,
    /// Sorted by player index
    pub players: Vec<Player>,
    pub enemies: Vec<Enemy>,
    pub fruits: Vec<Fruit>,
    pub run: RunState,
    pub tuning: Tuning,
    pub(crate) rng: SimRng,
    pub(crate) events: Vec<GameEvent>,
    /// Layout the level started from (for resets)
    start: LevelLayout,
}

impl GameState {
    /// Start a level from a layout
    pub fn new(layout: LevelLayout, tuning: Tuning, seed: u64) -> Self {
        let LevelLayout {
            level,
            map,
            mut players,
            enemies,
            fruits,
        } = layout.clone();
        players.sort_by_key(|p| p.index);
        let total_fruits = fruits.len() as u32;
        log::info!(
            "Level {} start: {}x{} map, {} players, {} enemies, {} fruits",
            level,
            map.width(),
            map.height(),
            players.len(),
            enemies.len(),
            total_fruits
        );
        Self {
            map,
            players,
            enemies,
            fruits,
            run: RunState::new(level, total_fruits, tuning.level_time_secs),
            tuning,
            rng: SimRng::new(seed),
            events: Vec::new(),
            start: layout,
        }
    }

    /// Build a built-in level from settings
    pub fn from_settings(settings: &Settings, tuning: Tuning) -> Option<Self> {
        let layout = build_level(settings.starting_level, settings)?;
        Some(Self::new(layout, tuning, settings.seed))
    }

    /// Reassemble a state from already-validated parts (snapshot restore)
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn from_parts(
        map: GridMap,
        players: Vec<Player>,
        enemies: Vec<Enemy>,
        fruits: Vec<Fruit>,
        run: RunState,
        tuning: Tuning,
        rng: SimRng,
        start: LevelLayout,
    ) -> Self {
        Self {
            map,
            players,
            enemies,
            fruits,
            run,
            tuning,
            rng,
            events: Vec::new(),
            start,
        }
    }

    // --- Queries ---

    /// Accepting moves, shots and ticks
    pub fn is_running(&self) -> bool {
        self.run.phase == GamePhase::Playing
    }

    pub fn is_terminal(&self) -> bool {
        self.run.is_terminal()
    }

    pub fn phase(&self) -> GamePhase {
        self.run.phase
    }

    pub fn player(&self, index: u8) -> Option<&Player> {
        self.players.iter().find(|p| p.index == index)
    }

    pub(crate) fn player_slot(&self, index: u8) -> Option<usize> {
        self.players.iter().position(|p| p.index == index)
    }

    /// Closest player by Manhattan distance; ties go to the lower index
    pub fn nearest_player(&self, from: GridPos) -> Option<GridPos> {
        nearest_player_pos(&self.players, from)
    }

    pub fn enemy_at(&self, pos: GridPos) -> Option<&Enemy> {
        self.enemies.iter().find(|e| e.pos == pos)
    }

    /// First uncollected fruit on a cell
    pub fn fruit_at(&self, pos: GridPos) -> Option<&Fruit> {
        self.fruits.iter().find(|f| f.pos == pos && !f.is_collected())
    }

    pub fn remaining_fruits(&self) -> usize {
        self.fruits.iter().filter(|f| !f.is_collected()).count()
    }

    /// Take every event raised since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn seed(&self) -> u64 {
        self.rng.seed()
    }

    /// Layout `reset_level` goes back to
    pub fn start_layout(&self) -> &LevelLayout {
        &self.start
    }

    // --- Phase control ---

    pub(crate) fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Toggle pause; terminal runs stay terminal
    pub fn toggle_pause(&mut self) {
        self.run.phase = match self.run.phase {
            GamePhase::Playing => GamePhase::Paused,
            GamePhase::Paused => GamePhase::Playing,
            other => other,
        };
    }

    pub(crate) fn win(&mut self) {
        if self.is_terminal() {
            return;
        }
        log::info!("Level {} won with {} points", self.run.level, self.run.score);
        self.run.phase = GamePhase::Won;
        self.emit(GameEvent::LevelWon);
    }

    pub(crate) fn lose(&mut self, player: Option<u8>, cause: LossCause) {
        if self.is_terminal() {
            return;
        }
        log::info!("Level {} lost: {:?} (player {:?})", self.run.level, cause, player);
        self.run.phase = GamePhase::Lost { cause };
        match player {
            Some(player) => self.emit(GameEvent::PlayerKilled { player, cause }),
            None => self.emit(GameEvent::TimeUp),
        }
    }

    /// Restart the current level from its starting layout
    pub fn reset_level(&mut self) {
        let seed = self.rng.seed();
        let tuning = self.tuning.clone();
        *self = Self::new(self.start.clone(), tuning, seed);
    }

    /// Move on to the next built-in level; false if there is none
    pub fn advance_level(&mut self) -> bool {
        let next = self.run.level + 1;
        let settings = settings_for(&self.players, self.rng.seed(), next);
        match build_level(next, &settings) {
            Some(layout) => {
                let tuning = self.tuning.clone();
                *self = Self::new(layout, tuning, settings.seed);
                true
            }
            None => false,
        }
    }
}

/// Closest player position by Manhattan distance (stable on ties)
pub(crate) fn nearest_player_pos(players: &[Player], from: GridPos) -> Option<GridPos> {
    players
        .iter()
        .min_by_key(|p| (p.pos.manhattan(from), p.index))
        .map(|p| p.pos)
}

/// Settings that reproduce the current roster on another level
fn settings_for(players: &[Player], seed: u64, level: u32) -> Settings {
    let mut settings = Settings {
        player_count: players.len().max(1) as u8,
        starting_level: level,
        seed,
        ..Settings::default()
    };
    for player in players {
        let slot = (player.index.max(1) as usize - 1).min(settings.flavors.len() - 1);
        settings.flavors[slot] = player.flavor;
    }
    settings
}
