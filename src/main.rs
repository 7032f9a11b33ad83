//! Frost Arena entry point
//!
//! Runs a level headless with a greedy autoplayer and logs what happens.
//! Pass a settings JSON file as the first argument to override defaults.

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use frost_arena::consts::TICKS_PER_SECOND;
    use frost_arena::sim::{GameState, advance_second, advance_tick};
    use frost_arena::{Settings, Tuning};

    env_logger::init();
    log::info!("Frost Arena (native) starting...");

    let settings = match std::env::args().nth(1) {
        Some(path) => match std::fs::read_to_string(&path) {
            Ok(json) => Settings::from_json(&json),
            Err(e) => {
                log::warn!("Could not read settings {path}: {e}");
                Settings::default()
            }
        },
        None => Settings::default(),
    };

    let Some(mut state) = GameState::from_settings(&settings, Tuning::default()) else {
        log::error!("No built-in level {}", settings.starting_level);
        return;
    };

    let max_ticks = state.tuning.level_time_secs as u64 * TICKS_PER_SECOND as u64;
    while !state.is_terminal() && state.run.ticks < max_ticks {
        autoplay::act(&mut state);
        advance_tick(&mut state);
        if state.run.ticks % TICKS_PER_SECOND as u64 == 0 {
            advance_second(&mut state);
        }
        for event in state.drain_events() {
            log::debug!("[{}] {:?}", state.run.formatted_time(), event);
        }
    }

    println!(
        "Level {}: {:?} | score {} | fruits {}/{} | time left {}",
        state.run.level,
        state.phase(),
        state.run.score,
        state.run.fruits_collected,
        state.run.total_fruits,
        state.run.formatted_time()
    );
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The library is driven by the host page; nothing to run here
}

/// Greedy one-step lookahead: walk toward the nearest fruit, shoot open any
/// ice in the way, and never step next to danger when there is a choice.
#[cfg(not(target_arch = "wasm32"))]
mod autoplay {
    use frost_arena::GridPos;
    use frost_arena::sim::{GameState, move_player, shoot_ice};
    use glam::IVec2;

    const DIRECTIONS: [IVec2; 4] = [
        IVec2::new(1, 0),
        IVec2::new(-1, 0),
        IVec2::new(0, 1),
        IVec2::new(0, -1),
    ];

    enum Action {
        Idle,
        Step(IVec2),
        Shoot(IVec2),
    }

    /// Issue this tick's requests for every player
    pub fn act(state: &mut GameState) {
        let roster: Vec<(u8, GridPos)> = state.players.iter().map(|p| (p.index, p.pos)).collect();
        for (index, pos) in roster {
            match choose(state, pos) {
                Action::Idle => {}
                Action::Step(dir) => {
                    move_player(state, index, dir);
                }
                Action::Shoot(dir) => {
                    shoot_ice(state, index, dir);
                }
            }
        }
    }

    fn choose(state: &GameState, pos: GridPos) -> Action {
        let Some(goal) = state
            .fruits
            .iter()
            .filter(|f| !f.is_collected() && !f.is_spiked())
            .map(|f| f.pos)
            .min_by_key(|p| p.manhattan(pos))
        else {
            return Action::Idle;
        };

        let mut best: Option<(i32, IVec2)> = None;
        for dir in DIRECTIONS {
            let next = pos.offset(dir);
            if !state.map.is_walkable(next) || is_dangerous(state, next) {
                continue;
            }
            let distance = next.manhattan(goal);
            if best.is_none_or(|(d, _)| distance < d) {
                best = Some((distance, dir));
            }
        }

        match best {
            Some((distance, dir)) if distance < pos.manhattan(goal) => Action::Step(dir),
            _ => {
                let toward = direct_step(pos, goal);
                let ahead = pos.offset(toward);
                if state.map.has_ice(ahead) && !state.map.is_border(ahead) {
                    Action::Shoot(toward)
                } else {
                    best.map_or(Action::Idle, |(_, dir)| Action::Step(dir))
                }
            }
        }
    }

    fn is_dangerous(state: &GameState, pos: GridPos) -> bool {
        !state.map.is_safe_for_player(pos)
            || state.fruits.iter().any(|f| f.pos == pos && f.is_spiked() && !f.is_collected())
            || state.enemies.iter().any(|e| e.pos.manhattan(pos) <= 1)
    }

    fn direct_step(from: GridPos, to: GridPos) -> IVec2 {
        let d_row = to.row - from.row;
        let d_col = to.col - from.col;
        if d_col.abs() >= d_row.abs() {
            IVec2::new(d_col.signum(), 0)
        } else {
            IVec2::new(0, d_row.signum())
        }
    }
}
