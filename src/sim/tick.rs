//! Requests and the fixed-cadence tick
//!
//! Hosts call `move_player` / `shoot_ice` as input arrives, `advance_tick`
//! every 100 ms and `advance_second` once a second. `tick` bundles a frame's
//! worth of input with one tick for hosts that batch.

use glam::IVec2;
use rand::Rng;

use super::collision;
use super::fruit::FruitUpdate;
use super::grid::{GridMap, IceLine, LineMode};
use super::state::{GameEvent, GameState, LossCause, SimRng, nearest_player_pos};
use crate::{GridPos, is_unit_direction};

/// Input for one player during a single tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlayerInput {
    /// Unit step to attempt
    pub step: Option<IVec2>,
    /// Shoot in the facing direction (after stepping)
    pub shoot: bool,
}

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Indexed by player slot (player 1 first)
    pub players: [PlayerInput; 2],
    /// Pause toggle
    pub pause: bool,
}

/// Apply one tick's input, then advance the simulation one tick
pub fn tick(state: &mut GameState, input: &TickInput) {
    if input.pause {
        state.toggle_pause();
    }
    for (slot, player_input) in input.players.iter().enumerate() {
        let Some(index) = state.players.get(slot).map(|p| p.index) else {
            continue;
        };
        if let Some(step) = player_input.step {
            move_player(state, index, step);
        }
        if player_input.shoot {
            shoot_ice_facing(state, index);
        }
    }
    advance_tick(state);
}

/// Try to move a player one cell. Returns false (state untouched) if the run
/// is not active, the player doesn't exist, the direction isn't a unit step,
/// or the target cell isn't walkable.
pub fn move_player(state: &mut GameState, index: u8, dir: IVec2) -> bool {
    if !state.is_running() || !is_unit_direction(dir) {
        return false;
    }
    let Some(slot) = state.player_slot(index) else {
        return false;
    };
    let target = state.players[slot].pos.offset(dir);
    if !state.map.is_walkable(target) {
        return false;
    }
    state.players[slot].move_to(target, dir);
    collision::resolve_player(state, slot);
    true
}

/// Shoot an ice line from a player. `None` when the request is rejected.
pub fn shoot_ice(state: &mut GameState, index: u8, dir: IVec2) -> Option<IceLine> {
    if !state.is_running() {
        return None;
    }
    let origin = state.player(index)?.pos;
    let line = state.map.shoot_ice_line(origin, dir)?;

    let cells = line.changed.len();
    match line.mode {
        LineMode::Create if cells > 0 => state.emit(GameEvent::IceCreated { cells }),
        LineMode::Destroy if cells > 0 => state.emit(GameEvent::IceDestroyed { cells }),
        _ => {}
    }
    for &pos in &line.extinguished {
        state.emit(GameEvent::FireExtinguished { pos });
    }
    Some(line)
}

/// Shoot along the player's facing direction
pub fn shoot_ice_facing(state: &mut GameState, index: u8) -> Option<IceLine> {
    let facing = state.player(index)?.facing;
    shoot_ice(state, index, facing)
}

/// Advance one simulation tick: fires, then enemies, then fruits, then
/// collisions. Each stage finishes before the next starts.
pub fn advance_tick(state: &mut GameState) {
    if !state.is_running() {
        return;
    }
    state.run.ticks += 1;

    // Fires
    for pos in state.map.update_obstacles(state.tuning.fire_relight_ticks) {
        log::debug!("Fire relit at {pos:?}");
        state.emit(GameEvent::FireRelit { pos });
    }

    // Enemies, in storage order
    for i in 0..state.enemies.len() {
        let target = nearest_player_pos(&state.players, state.enemies[i].pos);
        let step = state.enemies[i].step(&mut state.map, target, &state.tuning);
        if let Some(pos) = step.broke_ice {
            state.emit(GameEvent::IceBroken { pos });
        }
    }
    collision::check_all_enemy_contacts(state);
    if !state.is_running() {
        return;
    }

    // Fruits, in storage order
    for i in 0..state.fruits.len() {
        match state.fruits[i].update(&state.tuning) {
            FruitUpdate::Idle => {}
            FruitUpdate::Teleport => {
                let from = state.fruits[i].pos;
                let target = random_walkable_cell(&state.map, &mut state.rng, state.tuning.teleport_attempts);
                state.fruits[i].finish_teleport(target);
                match target {
                    Some(to) => {
                        log::debug!("Fruit teleported {from:?} -> {to:?}");
                        state.emit(GameEvent::FruitTeleported { from, to });
                    }
                    None => log::debug!("Teleport from {from:?} found no free cell"),
                }
            }
            FruitUpdate::Roam(dir) => {
                let next = state.fruits[i].pos.offset(dir);
                if state.map.is_walkable(next) {
                    state.fruits[i].pos = next;
                } else {
                    state.fruits[i].reverse_direction();
                }
            }
            FruitUpdate::SpikesChanged(spiked) => {
                let pos = state.fruits[i].pos;
                state.emit(GameEvent::SpikesChanged { pos, spiked });
            }
        }
    }

    // Relit fires, roaming and teleporting fruit may have landed on players
    collision::resolve_all(state);
}

/// Take one second off the clock; running out is a loss
pub fn advance_second(state: &mut GameState) {
    if !state.is_running() {
        return;
    }
    state.run.decrement_time();
    if state.run.is_time_up() {
        state.lose(None, LossCause::TimeUp);
    }
}

/// Random walkable cell, or `None` after `attempts` misses
fn random_walkable_cell(map: &GridMap, rng: &mut SimRng, attempts: u32) -> Option<GridPos> {
    for _ in 0..attempts {
        let pos = GridPos::new(rng.random_range(0..map.height()), rng.random_range(0..map.width()));
        if map.is_walkable(pos) {
            return Some(pos);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Settings;
    use crate::sim::enemy::{EnemyBehavior, EnemyKind};
    use crate::sim::fruit::{FruitBehavior, FruitKind};
    use crate::sim::grid::{FireHazard, SolidStructure};
    use crate::sim::level::LevelLayout;
    use crate::sim::player::Flavor;
    use crate::sim::state::GamePhase;
    use crate::tuning::Tuning;

    const EAST: IVec2 = IVec2::new(1, 0);
    const WEST: IVec2 = IVec2::new(-1, 0);
    const SOUTH: IVec2 = IVec2::new(0, 1);

    fn layout() -> LevelLayout {
        LevelLayout::new(1, GridMap::new(20, 15)).with_player(GridPos::new(5, 5), Flavor::Vanilla)
    }

    fn start(layout: LevelLayout) -> GameState {
        GameState::new(layout, Tuning::default(), 77)
    }

    #[test]
    fn test_move_player_updates_position_and_facing() {
        let mut state = start(layout().with_fruit(FruitKind::Grape, GridPos::new(1, 1)));
        assert!(move_player(&mut state, 1, WEST));
        let player = state.player(1).unwrap();
        assert_eq!(player.pos, GridPos::new(5, 4));
        assert_eq!(player.facing, WEST);
    }

    #[test]
    fn test_blocked_move_leaves_state_untouched() {
        let mut state = start(layout().with_fruit(FruitKind::Grape, GridPos::new(1, 1)));
        state.map.toggle_ice(GridPos::new(5, 6));
        let before = state.player(1).unwrap().clone();
        assert!(!move_player(&mut state, 1, EAST));
        assert_eq!(state.player(1).unwrap(), &before);
        assert!(!move_player(&mut state, 1, IVec2::new(1, 1)));
        assert!(!move_player(&mut state, 2, EAST));
        assert!(state.drain_events().is_empty());
    }

    #[test]
    fn test_structure_blocks_movement() {
        let mut state = start(layout());
        state.map.add_structure(SolidStructure::igloo(GridPos::new(5, 6)));
        assert!(!move_player(&mut state, 1, EAST));
    }

    #[test]
    fn test_collecting_everything_wins_and_freezes() {
        let layout = layout()
            .with_fruit(FruitKind::Grape, GridPos::new(5, 6))
            .with_fruit(FruitKind::Banana, GridPos::new(5, 7));
        let mut state = start(layout);
        assert!(move_player(&mut state, 1, EAST));
        assert!(state.is_running());
        assert!(move_player(&mut state, 1, EAST));
        assert_eq!(state.phase(), GamePhase::Won);
        assert_eq!(state.run.score, 150);
        assert_eq!(state.run.fruits_collected, 2);

        let pos = state.player(1).unwrap().pos;
        assert!(!move_player(&mut state, 1, EAST));
        assert!(shoot_ice(&mut state, 1, EAST).is_none());
        advance_tick(&mut state);
        advance_second(&mut state);
        assert_eq!(state.player(1).unwrap().pos, pos);
        assert_eq!(state.run.ticks, 0);
        assert_eq!(state.run.time_remaining, 180);
    }

    #[test]
    fn test_walking_into_enemy_loses() {
        let layout = layout()
            .with_enemy(EnemyKind::Pursuer, GridPos::new(5, 6))
            .with_fruit(FruitKind::Grape, GridPos::new(1, 1));
        let mut state = start(layout);
        assert!(move_player(&mut state, 1, EAST));
        assert_eq!(state.run.loss_cause(), Some(LossCause::Enemy));
    }

    #[test]
    fn test_enemy_walking_into_player_loses() {
        let layout = layout()
            .with_enemy(EnemyKind::Patrol, GridPos::new(5, 4))
            .with_fruit(FruitKind::Grape, GridPos::new(1, 1));
        let mut state = start(layout);
        advance_tick(&mut state);
        assert_eq!(state.run.loss_cause(), Some(LossCause::Enemy));
        assert!(
            state
                .drain_events()
                .contains(&GameEvent::PlayerKilled { player: 1, cause: LossCause::Enemy })
        );
    }

    #[test]
    fn test_patrol_scenario() {
        let layout = LevelLayout::new(1, GridMap::new(20, 15))
            .with_player(GridPos::new(12, 10), Flavor::Vanilla)
            .with_enemy(EnemyKind::Patrol, GridPos::new(2, 2))
            .with_fruit(FruitKind::Grape, GridPos::new(12, 12));
        let mut state = start(layout);
        advance_tick(&mut state);
        assert_eq!(state.enemies[0].pos, GridPos::new(2, 3));

        // Walk to column 18, then bump the border once
        for _ in 0..15 {
            advance_tick(&mut state);
        }
        assert_eq!(state.enemies[0].pos, GridPos::new(2, 18));
        assert_eq!(state.enemies[0].dir, EAST);
        advance_tick(&mut state);
        assert_eq!(state.enemies[0].pos, GridPos::new(2, 18));
        assert_eq!(state.enemies[0].dir, WEST);
        advance_tick(&mut state);
        assert_eq!(state.enemies[0].pos, GridPos::new(2, 17));
        assert_eq!(state.enemies[0].dir, WEST);
    }

    #[test]
    fn test_shoot_scenario_east() {
        let mut state = start(layout().with_fruit(FruitKind::Grape, GridPos::new(1, 1)));
        state.map.toggle_ice(GridPos::new(5, 9));
        let line = shoot_ice(&mut state, 1, EAST).unwrap();
        assert_eq!(line.changed, vec![GridPos::new(5, 6), GridPos::new(5, 7), GridPos::new(5, 8)]);
        assert_eq!(state.drain_events(), vec![GameEvent::IceCreated { cells: 3 }]);

        let line = shoot_ice(&mut state, 1, EAST).unwrap();
        assert_eq!(line.mode, LineMode::Destroy);
        assert_eq!(line.changed.len(), 4);
        assert_eq!(state.drain_events(), vec![GameEvent::IceDestroyed { cells: 4 }]);
    }

    #[test]
    fn test_shoot_facing_uses_last_move() {
        let mut state = start(layout().with_fruit(FruitKind::Grape, GridPos::new(1, 1)));
        // Default facing is south
        let line = shoot_ice_facing(&mut state, 1).unwrap();
        assert_eq!(line.changed.first(), Some(&GridPos::new(6, 5)));

        move_player(&mut state, 1, WEST);
        let line = shoot_ice_facing(&mut state, 1).unwrap();
        assert_eq!(line.changed.first(), Some(&GridPos::new(5, 3)));
    }

    #[test]
    fn test_shoot_extinguishes_fire() {
        let mut state = start(layout().with_fruit(FruitKind::Grape, GridPos::new(1, 1)));
        state.map.add_fire_hazard(FireHazard::new(GridPos::new(5, 6)));
        shoot_ice(&mut state, 1, EAST);
        assert!(!state.map.fire_at(GridPos::new(5, 6)).unwrap().lit);
        assert!(
            state
                .drain_events()
                .contains(&GameEvent::FireExtinguished { pos: GridPos::new(5, 6) })
        );
        // Now safe to walk through
        assert!(move_player(&mut state, 1, EAST));
        assert!(state.is_running());
    }

    #[test]
    fn test_fire_relights_under_player() {
        let tuning = Tuning {
            fire_relight_ticks: 3,
            ..Default::default()
        };
        let mut map = GridMap::new(20, 15);
        map.add_fire_hazard(FireHazard::new(GridPos::new(5, 6)));
        let layout = LevelLayout::new(1, map)
            .with_player(GridPos::new(5, 5), Flavor::Vanilla)
            .with_fruit(FruitKind::Grape, GridPos::new(1, 1));
        let mut state = GameState::new(layout, tuning, 1);
        shoot_ice(&mut state, 1, EAST);
        assert!(move_player(&mut state, 1, EAST));
        advance_tick(&mut state);
        advance_tick(&mut state);
        assert!(state.is_running());
        advance_tick(&mut state);
        assert_eq!(state.run.loss_cause(), Some(LossCause::Fire));
    }

    #[test]
    fn test_walking_onto_lit_fire_loses() {
        let mut state = start(layout().with_fruit(FruitKind::Grape, GridPos::new(1, 1)));
        state.map.add_fire_hazard(FireHazard::new(GridPos::new(6, 5)));
        assert!(move_player(&mut state, 1, SOUTH));
        assert_eq!(state.run.loss_cause(), Some(LossCause::Fire));
    }

    #[test]
    fn test_cherry_teleports_to_walkable_cell() {
        let layout = layout().with_fruit(FruitKind::Cherry, GridPos::new(10, 10));
        let mut state = start(layout);
        for _ in 0..50 {
            advance_tick(&mut state);
        }
        let cherry = &state.fruits[0];
        assert_eq!(cherry.behavior, FruitBehavior::Teleporting { ticks: 0 });
        assert!(state.map.is_walkable(cherry.pos));
        assert!(
            state
                .drain_events()
                .iter()
                .any(|e| matches!(e, GameEvent::FruitTeleported { .. }))
        );
    }

    #[test]
    fn test_teleport_gives_up_on_full_map() {
        let mut map = GridMap::new(4, 4);
        map.place_ice(GridPos::new(1, 2));
        map.place_ice(GridPos::new(2, 1));
        map.place_ice(GridPos::new(2, 2));
        let layout = LevelLayout::new(1, map)
            .with_player(GridPos::new(1, 1), Flavor::Vanilla)
            .with_fruit(FruitKind::Cherry, GridPos::new(2, 2));
        let tuning = Tuning {
            teleport_interval_ticks: 1,
            ..Default::default()
        };
        let mut state = GameState::new(layout, tuning, 5);
        // Close the last open cell
        state.map.toggle_ice(GridPos::new(1, 1));
        advance_tick(&mut state);
        assert_eq!(state.fruits[0].pos, GridPos::new(2, 2));
        assert_eq!(state.fruits[0].behavior, FruitBehavior::Teleporting { ticks: 0 });
    }

    #[test]
    fn test_teleport_is_deterministic_per_seed() {
        let run = |seed| {
            let mut state = GameState::new(
                layout().with_fruit(FruitKind::Cherry, GridPos::new(10, 10)),
                Tuning::default(),
                seed,
            );
            for _ in 0..200 {
                advance_tick(&mut state);
            }
            state.fruits[0].pos
        };
        assert_eq!(run(11), run(11));
    }

    #[test]
    fn test_pineapple_roams_and_bounces() {
        let layout = layout().with_fruit(FruitKind::Pineapple, GridPos::new(10, 16));
        let mut state = start(layout);
        advance_tick(&mut state);
        assert_eq!(state.fruits[0].pos, GridPos::new(10, 17));
        advance_tick(&mut state);
        assert_eq!(state.fruits[0].pos, GridPos::new(10, 18));
        advance_tick(&mut state);
        assert_eq!(state.fruits[0].pos, GridPos::new(10, 18));
        assert_eq!(state.fruits[0].behavior, FruitBehavior::Roaming { dir: WEST });
        advance_tick(&mut state);
        assert_eq!(state.fruits[0].pos, GridPos::new(10, 17));
    }

    #[test]
    fn test_roaming_fruit_is_collected_when_it_reaches_player() {
        let layout = layout()
            .with_fruit(FruitKind::Pineapple, GridPos::new(5, 4))
            .with_fruit(FruitKind::Grape, GridPos::new(1, 1));
        let mut state = start(layout);
        advance_tick(&mut state);
        assert!(state.fruits[0].is_collected());
        assert_eq!(state.players[0].score, 120);
    }

    #[test]
    fn test_cactus_spikes_while_standing_still() {
        let tuning = Tuning {
            spike_cycle_ticks: 2,
            ..Default::default()
        };
        let layout = layout()
            .with_fruit(FruitKind::Cactus, GridPos::new(5, 6))
            .with_fruit(FruitKind::Grape, GridPos::new(1, 1));
        let mut state = GameState::new(layout, tuning, 1);
        advance_tick(&mut state);
        advance_tick(&mut state);
        assert!(state.fruits[0].is_spiked());
        assert!(move_player(&mut state, 1, EAST));
        assert_eq!(state.run.loss_cause(), Some(LossCause::Spikes));
    }

    #[test]
    fn test_squid_breaks_players_wall() {
        let layout = layout()
            .with_enemy(EnemyKind::PursuerBreaker, GridPos::new(5, 9))
            .with_fruit(FruitKind::Grape, GridPos::new(1, 1));
        let mut state = start(layout);
        state.map.toggle_ice(GridPos::new(5, 8));
        for _ in 0..10 {
            advance_tick(&mut state);
        }
        assert!(!state.map.has_ice(GridPos::new(5, 8)));
        assert_eq!(
            state.enemies[0].behavior,
            EnemyBehavior::PursuerBreaker { break_cooldown: 0 }
        );
        assert!(state.drain_events().contains(&GameEvent::IceBroken { pos: GridPos::new(5, 8) }));
    }

    #[test]
    fn test_time_up_loses() {
        let tuning = Tuning {
            level_time_secs: 2,
            ..Default::default()
        };
        let mut state = GameState::new(layout().with_fruit(FruitKind::Grape, GridPos::new(1, 1)), tuning, 1);
        advance_second(&mut state);
        assert!(state.is_running());
        advance_second(&mut state);
        assert_eq!(state.run.loss_cause(), Some(LossCause::TimeUp));
        assert_eq!(state.drain_events(), vec![GameEvent::TimeUp]);
    }

    #[test]
    fn test_pause_freezes_everything() {
        let layout = layout()
            .with_enemy(EnemyKind::Patrol, GridPos::new(2, 2))
            .with_fruit(FruitKind::Grape, GridPos::new(1, 1));
        let mut state = start(layout);
        tick(
            &mut state,
            &TickInput {
                pause: true,
                ..Default::default()
            },
        );
        assert!(!move_player(&mut state, 1, EAST));
        advance_second(&mut state);
        advance_tick(&mut state);
        assert_eq!(state.enemies[0].pos, GridPos::new(2, 2));
        assert_eq!(state.run.time_remaining, 180);
    }

    #[test]
    fn test_tick_input_moves_then_shoots() {
        let settings = Settings::two_player(Flavor::Vanilla, Flavor::Chocolate);
        let mut state = GameState::from_settings(&settings, Tuning::default()).unwrap();
        let p1 = state.player(1).unwrap().pos;
        let mut input = TickInput::default();
        input.players[0] = PlayerInput {
            step: Some(SOUTH),
            shoot: true,
        };
        tick(&mut state, &input);
        assert_eq!(state.player(1).unwrap().pos, p1.offset(SOUTH));
        assert!(state.map.has_ice(p1.offset(SOUTH).offset(SOUTH)));
        assert_eq!(state.run.ticks, 1);
    }

    #[test]
    fn test_determinism() {
        // Two states with same seed and inputs end identical
        let settings = Settings {
            starting_level: 3,
            ..Default::default()
        };
        let mut a = GameState::from_settings(&settings, Tuning::default()).unwrap();
        let mut b = GameState::from_settings(&settings, Tuning::default()).unwrap();
        let steps = [EAST, SOUTH, WEST, SOUTH, EAST, EAST];
        for i in 0..300 {
            let mut input = TickInput::default();
            input.players[0].step = Some(steps[i % steps.len()]);
            input.players[0].shoot = i % 7 == 0;
            tick(&mut a, &input);
            tick(&mut b, &input);
        }
        assert_eq!(a.players, b.players);
        assert_eq!(a.enemies, b.enemies);
        assert_eq!(a.fruits, b.fruits);
        assert_eq!(a.run, b.run);
        assert_eq!(a.map.ice_grid(), b.map.ice_grid());
    }
}
