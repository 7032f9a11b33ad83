//! Collision resolution
//!
//! All overlaps are exact cell matches. Each check is a no-op once the run is
//! terminal, so the first condition to fire decides the outcome.

use super::state::{GameEvent, GameState, LossCause};

/// Resolve everything on one player's cell: fruit, then fire, then enemies
pub fn resolve_player(state: &mut GameState, slot: usize) {
    collect_fruits(state, slot);
    check_fire(state, slot);
    check_enemy_contact(state, slot);
}

/// Resolve every player (after a tick)
pub fn resolve_all(state: &mut GameState) {
    for slot in 0..state.players.len() {
        resolve_player(state, slot);
    }
}

/// Recheck player/enemy overlaps for every player (enemies walk into players)
pub fn check_all_enemy_contacts(state: &mut GameState) {
    for slot in 0..state.players.len() {
        check_enemy_contact(state, slot);
    }
}

/// Collect every uncollected fruit on the player's cell. A spiked cactus is
/// lethal instead.
fn collect_fruits(state: &mut GameState, slot: usize) {
    let Some(player) = state.players.get(slot) else {
        return;
    };
    let (pos, index) = (player.pos, player.index);

    for i in 0..state.fruits.len() {
        if state.is_terminal() {
            return;
        }
        let fruit = &state.fruits[i];
        if fruit.pos != pos || fruit.is_collected() {
            continue;
        }
        if fruit.is_spiked() {
            state.lose(Some(index), LossCause::Spikes);
            return;
        }

        let (kind, points) = (fruit.kind, fruit.points());
        state.fruits[i].collect();
        state.players[slot].add_score(points);
        state.run.add_score(points);
        state.run.collect_fruit();
        log::debug!("Player {index} collected {kind:?} for {points} points");
        state.emit(GameEvent::FruitCollected {
            player: index,
            kind,
            points,
        });

        if state.run.is_level_complete() {
            state.win();
        }
    }
}

fn check_fire(state: &mut GameState, slot: usize) {
    let Some(player) = state.players.get(slot) else {
        return;
    };
    if !state.map.is_safe_for_player(player.pos) {
        let index = player.index;
        state.lose(Some(index), LossCause::Fire);
    }
}

fn check_enemy_contact(state: &mut GameState, slot: usize) {
    let Some(player) = state.players.get(slot) else {
        return;
    };
    if state.enemy_at(player.pos).is_some() {
        let index = player.index;
        state.lose(Some(index), LossCause::Enemy);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::GridPos;
    use crate::sim::enemy::EnemyKind;
    use crate::sim::fruit::{FruitBehavior, FruitKind};
    use crate::sim::grid::{FireHazard, GridMap};
    use crate::sim::level::LevelLayout;
    use crate::sim::player::Flavor;
    use crate::sim::state::GamePhase;
    use crate::tuning::Tuning;

    fn state_with(layout: LevelLayout) -> GameState {
        GameState::new(layout, Tuning::default(), 3)
    }

    fn base() -> LevelLayout {
        LevelLayout::new(1, GridMap::new(20, 15)).with_player(GridPos::new(5, 5), Flavor::Vanilla)
    }

    #[test]
    fn test_collect_scores_player_and_run() {
        let layout = base()
            .with_fruit(FruitKind::Banana, GridPos::new(5, 5))
            .with_fruit(FruitKind::Grape, GridPos::new(9, 9));
        let mut state = state_with(layout);
        resolve_player(&mut state, 0);

        assert!(state.fruits[0].is_collected());
        assert_eq!(state.players[0].score, 100);
        assert_eq!(state.run.score, 100);
        assert_eq!(state.run.fruits_collected, 1);
        assert!(state.is_running());
        assert_eq!(
            state.drain_events(),
            vec![GameEvent::FruitCollected {
                player: 1,
                kind: FruitKind::Banana,
                points: 100
            }]
        );

        // Already collected fruit is not scored twice
        resolve_player(&mut state, 0);
        assert_eq!(state.run.score, 100);
    }

    #[test]
    fn test_last_fruit_wins() {
        let layout = base().with_fruit(FruitKind::Cherry, GridPos::new(5, 5));
        let mut state = state_with(layout);
        resolve_player(&mut state, 0);
        assert_eq!(state.phase(), GamePhase::Won);
    }

    #[test]
    fn test_spiked_cactus_kills() {
        let layout = base().with_fruit(FruitKind::Cactus, GridPos::new(5, 5));
        let mut state = state_with(layout);
        state.fruits[0].behavior = FruitBehavior::HazardCycling {
            ticks: 0,
            spiked: true,
        };
        resolve_player(&mut state, 0);
        assert_eq!(state.run.loss_cause(), Some(LossCause::Spikes));
        assert!(!state.fruits[0].is_collected());
        assert_eq!(state.run.score, 0);
    }

    #[test]
    fn test_lit_fire_kills_unlit_does_not() {
        let mut map = GridMap::new(20, 15);
        map.add_fire_hazard(FireHazard::new(GridPos::new(5, 5)));
        let layout = LevelLayout::new(1, map).with_player(GridPos::new(5, 5), Flavor::Vanilla);
        let mut state = state_with(layout.clone());
        resolve_player(&mut state, 0);
        assert_eq!(state.run.loss_cause(), Some(LossCause::Fire));

        let mut state = state_with(layout);
        state.map.toggle_ice(GridPos::new(5, 5));
        resolve_player(&mut state, 0);
        assert!(state.is_running());
    }

    #[test]
    fn test_enemy_contact_kills() {
        let layout = base().with_enemy(EnemyKind::Patrol, GridPos::new(5, 5));
        let mut state = state_with(layout);
        check_all_enemy_contacts(&mut state);
        assert_eq!(state.run.loss_cause(), Some(LossCause::Enemy));
    }

    #[test]
    fn test_win_takes_precedence_over_later_checks() {
        let layout = base()
            .with_fruit(FruitKind::Grape, GridPos::new(5, 5))
            .with_enemy(EnemyKind::Pursuer, GridPos::new(5, 5));
        let mut state = state_with(layout);
        resolve_player(&mut state, 0);
        assert_eq!(state.phase(), GamePhase::Won);
    }

    #[test]
    fn test_second_player_collects_for_shared_run() {
        let layout = base()
            .with_player(GridPos::new(7, 7), Flavor::Strawberry)
            .with_fruit(FruitKind::Pineapple, GridPos::new(7, 7))
            .with_fruit(FruitKind::Grape, GridPos::new(1, 1));
        let mut state = state_with(layout);
        resolve_all(&mut state);
        assert_eq!(state.players[0].score, 0);
        assert_eq!(state.players[1].score, 120);
        assert_eq!(state.run.score, 120);
    }
}
