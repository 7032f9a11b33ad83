//! Game settings and preferences
//!
//! Chosen on the menu screens and handed to the level factory. The core never
//! reads input devices or files; the host passes these in.

use serde::{Deserialize, Serialize};

use crate::sim::Flavor;

/// Number of players the engine supports
pub const MAX_PLAYERS: usize = 2;

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// 1 or 2 local players
    pub player_count: u8,
    /// Flavor per player slot (slot 0 = player 1)
    pub flavors: [Flavor; MAX_PLAYERS],
    /// Level to start on (1-based)
    pub starting_level: u32,
    /// Run seed for teleport placement
    pub seed: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            player_count: 1,
            flavors: [Flavor::Vanilla, Flavor::Strawberry],
            starting_level: 1,
            seed: 0x1CE_C0DE,
        }
    }
}

impl Settings {
    /// Two-player settings with the given flavors
    pub fn two_player(first: Flavor, second: Flavor) -> Self {
        Self {
            player_count: 2,
            flavors: [first, second],
            ..Self::default()
        }
    }

    /// Player count clamped to what the engine supports
    pub fn effective_player_count(&self) -> usize {
        (self.player_count as usize).clamp(1, MAX_PLAYERS)
    }

    /// Flavor for a 1-based player index
    pub fn flavor_for(&self, index: u8) -> Flavor {
        let slot = (index.max(1) as usize - 1).min(MAX_PLAYERS - 1);
        self.flavors[slot]
    }

    /// Load settings from JSON, falling back to defaults on bad input
    pub fn from_json(json: &str) -> Self {
        match serde_json::from_str(json) {
            Ok(settings) => {
                log::info!("Loaded settings");
                settings
            }
            Err(e) => {
                log::warn!("Using default settings ({e})");
                Self::default()
            }
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}
