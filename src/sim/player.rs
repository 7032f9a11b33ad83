//! Player avatars

use glam::IVec2;
use serde::{Deserialize, Serialize};

use crate::GridPos;

/// Ice cream flavor (cosmetic, chosen on the menu)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Flavor {
    #[default]
    Vanilla,
    Strawberry,
    Chocolate,
}

impl Flavor {
    pub fn as_str(&self) -> &'static str {
        match self {
            Flavor::Vanilla => "Vanilla",
            Flavor::Strawberry => "Strawberry",
            Flavor::Chocolate => "Chocolate",
        }
    }

    pub fn from_tag(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "vanilla" => Some(Flavor::Vanilla),
            "strawberry" => Some(Flavor::Strawberry),
            "chocolate" => Some(Flavor::Chocolate),
            _ => None,
        }
    }
}

/// A player-controlled avatar
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    /// 1 or 2
    pub index: u8,
    pub pos: GridPos,
    /// Last nonzero movement vector; shots default to this direction
    pub facing: IVec2,
    /// Points this player collected
    pub score: u32,
    pub flavor: Flavor,
}

impl Player {
    pub fn new(pos: GridPos, flavor: Flavor, index: u8) -> Self {
        Self {
            index,
            pos,
            facing: IVec2::new(0, 1),
            score: 0,
            flavor,
        }
    }

    /// Relocate and face the direction of travel
    pub fn move_to(&mut self, pos: GridPos, dir: IVec2) {
        self.pos = pos;
        self.face(dir);
    }

    /// Update facing without moving (zero vectors are ignored)
    pub fn face(&mut self, dir: IVec2) {
        if dir != IVec2::ZERO {
            self.facing = dir;
        }
    }

    pub fn add_score(&mut self, points: u32) {
        self.score += points;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_defaults() {
        let p = Player::new(GridPos::new(5, 5), Flavor::default(), 1);
        assert_eq!(p.flavor, Flavor::Vanilla);
        assert_eq!(p.index, 1);
        assert_eq!(p.score, 0);
        assert_eq!(p.facing, IVec2::new(0, 1));
    }

    #[test]
    fn test_move_updates_facing() {
        let mut p = Player::new(GridPos::new(5, 5), Flavor::Strawberry, 2);
        p.move_to(GridPos::new(5, 4), IVec2::new(-1, 0));
        assert_eq!(p.pos, GridPos::new(5, 4));
        assert_eq!(p.facing, IVec2::new(-1, 0));
        p.face(IVec2::ZERO);
        assert_eq!(p.facing, IVec2::new(-1, 0));
    }

    #[test]
    fn test_score_accumulates() {
        let mut p = Player::new(GridPos::new(1, 1), Flavor::Chocolate, 1);
        p.add_score(50);
        p.add_score(100);
        assert_eq!(p.score, 150);
    }

    #[test]
    fn test_flavor_labels() {
        for flavor in [Flavor::Vanilla, Flavor::Strawberry, Flavor::Chocolate] {
            assert_eq!(Flavor::from_tag(flavor.as_str()), Some(flavor));
        }
        assert_eq!(Flavor::from_tag("CHOCOLATE"), Some(Flavor::Chocolate));
        assert_eq!(Flavor::from_tag("mint"), None);
    }
}
