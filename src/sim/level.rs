//! Level layouts
//!
//! A `LevelLayout` is the plain data a level starts from. The engine accepts
//! any layout; the built-in levels are drawn as character maps:
//!
//! | char | meaning              | char | meaning           |
//! |------|----------------------|------|-------------------|
//! | `#`  | ice                  | `g`  | grape             |
//! | `P`  | player 1 spawn       | `b`  | banana            |
//! | `Q`  | player 2 spawn       | `p`  | pineapple         |
//! | `T`  | troll (patrol)       | `c`  | cherry            |
//! | `O`  | pot (pursuer)        | `k`  | cactus            |
//! | `S`  | squid (breaker)      | `F`  | fire pit          |
//! | `H`  | heat tile            | `I`  | igloo top-left    |
//!
//! `i` marks the rest of an igloo footprint and is otherwise ignored.

use super::enemy::{Enemy, EnemyKind};
use super::fruit::{Fruit, FruitKind};
use super::grid::{FireHazard, GridMap, SolidStructure};
use super::player::{Flavor, Player};
use crate::GridPos;
use crate::settings::Settings;

/// Initial map and entity set for one level
#[derive(Debug, Clone)]
pub struct LevelLayout {
    pub level: u32,
    pub map: GridMap,
    pub players: Vec<Player>,
    pub enemies: Vec<Enemy>,
    pub fruits: Vec<Fruit>,
}

impl LevelLayout {
    pub fn new(level: u32, map: GridMap) -> Self {
        Self {
            level,
            map,
            players: Vec::new(),
            enemies: Vec::new(),
            fruits: Vec::new(),
        }
    }

    /// Add the next player (indices are handed out 1, 2, ...)
    pub fn with_player(mut self, pos: GridPos, flavor: Flavor) -> Self {
        let index = self.players.len() as u8 + 1;
        self.players.push(Player::new(pos, flavor, index));
        self
    }

    pub fn with_enemy(mut self, kind: EnemyKind, pos: GridPos) -> Self {
        self.enemies.push(Enemy::new(kind, pos));
        self
    }

    pub fn with_fruit(mut self, kind: FruitKind, pos: GridPos) -> Self {
        self.fruits.push(Fruit::new(kind, pos));
        self
    }
}

/// Number of built-in levels
pub const LEVEL_COUNT: u32 = 3;

const LEVEL_1: [&str; 15] = [
    "####################",
    "#g......#..#......g#",
    "#..####......####..#",
    "#..#b....gg....b#..#",
    "#..#..g......g..#..#",
    "#T.......##.......T#",
    "#....b........b....#",
    "#.......P..Q.......#",
    "#..................#",
    "#......g....g......#",
    "#..#............#..#",
    "#..#b..........b#..#",
    "#..####......####..#",
    "#g......#..#......g#",
    "####################",
];

const LEVEL_2: [&str; 15] = [
    "####################",
    "#p.......b........p#",
    "#.######....######.#",
    "#.#g...F....F...g#.#",
    "#.#..............#.#",
    "#......O....O......#",
    "#..b............b..#",
    "#.......P..Q.......#",
    "#.........g........#",
    "#T.................#",
    "#.#..............#.#",
    "#.#g...F....F...g#.#",
    "#.######....######.#",
    "#p................p#",
    "####################",
];

const LEVEL_3: [&str; 15] = [
    "####################",
    "#c.......##.......c#",
    "#..H...........H...#",
    "#....k.......k.....#",
    "#.......Ii.........#",
    "#..g....ii.....g...#",
    "#S.................#",
    "#.......P..Q.......#",
    "#.................S#",
    "#..g...........g...#",
    "#....###...###.....#",
    "#....k.......k.....#",
    "#..H...........H...#",
    "#c................c#",
    "####################",
];

/// Built-in layout for a level number, with players from settings
pub fn build_level(level: u32, settings: &Settings) -> Option<LevelLayout> {
    let art: &[&str] = match level {
        1 => &LEVEL_1,
        2 => &LEVEL_2,
        3 => &LEVEL_3,
        _ => return None,
    };
    Some(parse_layout(level, art, settings))
}

/// Parse a character map. The map takes the size of the art; the outer ring
/// is always ice whatever the art says.
pub fn parse_layout(level: u32, art: &[&str], settings: &Settings) -> LevelLayout {
    let height = art.len() as i32;
    let width = art.iter().map(|row| row.chars().count()).max().unwrap_or(0) as i32;
    let mut map = GridMap::new(width, height);
    let mut spawns: [Option<GridPos>; 2] = [None, None];
    let mut enemies = Vec::new();
    let mut fruits = Vec::new();

    for (row, line) in art.iter().enumerate() {
        for (col, ch) in line.chars().enumerate() {
            let pos = GridPos::new(row as i32, col as i32);
            if map.is_border(pos) {
                continue;
            }
            let placed = match ch {
                '.' | 'i' => true,
                '#' => map.place_ice(pos),
                'P' => {
                    spawns[0] = Some(pos);
                    true
                }
                'Q' => {
                    spawns[1] = Some(pos);
                    true
                }
                'T' => push(&mut enemies, Enemy::new(EnemyKind::Patrol, pos)),
                'O' => push(&mut enemies, Enemy::new(EnemyKind::Pursuer, pos)),
                'S' => push(&mut enemies, Enemy::new(EnemyKind::PursuerBreaker, pos)),
                'g' => push(&mut fruits, Fruit::new(FruitKind::Grape, pos)),
                'b' => push(&mut fruits, Fruit::new(FruitKind::Banana, pos)),
                'p' => push(&mut fruits, Fruit::new(FruitKind::Pineapple, pos)),
                'c' => push(&mut fruits, Fruit::new(FruitKind::Cherry, pos)),
                'k' => push(&mut fruits, Fruit::new(FruitKind::Cactus, pos)),
                'F' => map.add_fire_hazard(FireHazard::new(pos)),
                'H' => map.add_heat_tile(pos),
                'I' => map.add_structure(SolidStructure::igloo(pos)),
                _ => false,
            };
            if !placed {
                log::warn!("Level {level}: ignored '{ch}' at {pos:?}");
            }
        }
    }

    let center = GridPos::new(height / 2, width / 2);
    let mut layout = LevelLayout {
        level,
        map,
        players: Vec::new(),
        enemies,
        fruits,
    };
    for index in 1..=settings.effective_player_count() as u8 {
        let slot = index as usize - 1;
        let pos = spawns[slot].or(spawns[0]).unwrap_or(center);
        layout = layout.with_player(pos, settings.flavor_for(index));
    }
    layout
}

fn push<T>(list: &mut Vec<T>, item: T) -> bool {
    list.push(item);
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_fruit_counts() {
        let settings = Settings::default();
        let counts: Vec<usize> = (1..=LEVEL_COUNT)
            .map(|level| build_level(level, &settings).unwrap().fruits.len())
            .collect();
        assert_eq!(counts, vec![16, 12, 12]);
        assert!(build_level(0, &settings).is_none());
        assert!(build_level(LEVEL_COUNT + 1, &settings).is_none());
    }

    #[test]
    fn test_builtin_levels_are_consistent() {
        let settings = Settings::two_player(Flavor::Vanilla, Flavor::Chocolate);
        for level in 1..=LEVEL_COUNT {
            let layout = build_level(level, &settings).unwrap();
            assert_eq!(layout.map.width(), 20);
            assert_eq!(layout.map.height(), 15);
            for player in &layout.players {
                assert!(layout.map.is_walkable(player.pos), "level {level} player");
            }
            for enemy in &layout.enemies {
                assert!(layout.map.is_walkable(enemy.pos), "level {level} enemy");
            }
            for fruit in &layout.fruits {
                assert!(layout.map.is_walkable(fruit.pos), "level {level} fruit");
            }
        }
    }

    #[test]
    fn test_player_count_follows_settings() {
        let one = build_level(1, &Settings::default()).unwrap();
        assert_eq!(one.players.len(), 1);
        assert_eq!(one.players[0].pos, GridPos::new(7, 8));

        let two = build_level(1, &Settings::two_player(Flavor::Strawberry, Flavor::Chocolate)).unwrap();
        assert_eq!(two.players.len(), 2);
        assert_eq!(two.players[1].index, 2);
        assert_eq!(two.players[1].pos, GridPos::new(7, 11));
        assert_eq!(two.players[1].flavor, Flavor::Chocolate);
    }

    #[test]
    fn test_obstacles_parsed() {
        let settings = Settings::default();
        let two = build_level(2, &settings).unwrap();
        assert_eq!(two.map.fires().len(), 4);
        assert!(two.map.fires().iter().all(|f| f.lit));

        let three = build_level(3, &settings).unwrap();
        assert_eq!(three.map.heat_tiles().len(), 4);
        assert_eq!(three.map.structures().len(), 1);
        let igloo = three.map.structures()[0];
        assert!(igloo.covers(GridPos::new(5, 9)));
        assert!(!three.map.is_walkable(GridPos::new(5, 9)));
    }

    #[test]
    fn test_art_border_is_forced() {
        let art = ["....", ".P..", "....", "...."];
        let layout = parse_layout(9, &art, &Settings::default());
        assert!(layout.map.has_ice(GridPos::new(0, 0)));
        assert!(layout.map.has_ice(GridPos::new(3, 2)));
        assert_eq!(layout.players[0].pos, GridPos::new(1, 1));
    }

    #[test]
    fn test_missing_spawn_falls_back() {
        let art = ["#####", "#...#", "#...#", "#####"];
        let layout = parse_layout(9, &art, &Settings::two_player(Flavor::Vanilla, Flavor::Vanilla));
        assert_eq!(layout.players[0].pos, GridPos::new(2, 2));
        assert_eq!(layout.players[1].pos, GridPos::new(2, 2));
    }
}
