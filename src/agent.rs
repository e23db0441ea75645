use serde::{Deserialize, Serialize};

use super::*;

fn default_weight() -> Weight {
    1
}

/// A player as described in the game configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Player {
    /// Display name, not used by the value engine.
    pub name: String,
    pub clue: String,
    #[serde(default = "default_weight")]
    pub weight: Weight,
}

impl Player {
    pub fn new(name: impl Into<String>, clue: impl Into<String>, weight: Weight) -> Self {
        Player {
            name: name.into(),
            clue: clue.into(),
            weight,
        }
    }

    /// First letter of the name, uppercased, or `?` for an empty name.
    pub fn short_name(&self) -> String {
        short_name(&self.name)
    }
}

fn short_name(name: &str) -> String {
    match name.chars().next() {
        Some(c) => c.to_uppercase().collect(),
        None => "?".to_string(),
    }
}

/// A player bound to a game: stable id plus the region compiled from its clue.
#[derive(Clone, Debug, PartialEq)]
pub struct Agent {
    pub id: AgentId,
    pub name: String,
    pub clue: String,
    pub weight: Weight,
    region: Region,
}

impl Agent {
    /// Compiles the player's clue with the standard rule table.
    pub fn new(id: AgentId, player: &Player, grid_size: usize) -> Self {
        Self::bind(id, player, clue::compile(&player.clue, grid_size))
    }

    pub fn with_compiler(id: AgentId, player: &Player, grid_size: usize, compiler: &ClueCompiler) -> Self {
        Self::bind(id, player, compiler.compile(&player.clue, grid_size))
    }

    fn bind(id: AgentId, player: &Player, region: Region) -> Self {
        Agent {
            id,
            name: player.name.clone(),
            clue: player.clue.clone(),
            weight: player.weight,
            region,
        }
    }

    /// Agent whose region is given directly instead of compiled from a clue.
    pub fn with_region(id: AgentId, name: impl Into<String>, weight: Weight, region: Region) -> Self {
        Agent {
            id,
            name: name.into(),
            clue: String::new(),
            weight,
            region,
        }
    }

    pub fn region(&self) -> &Region {
        &self.region
    }

    pub fn short_name(&self) -> String {
        short_name(&self.name)
    }

    /// Compiles every player, assigning ids in order.
    pub fn from_players(players: &[Player], grid_size: usize, compiler: &ClueCompiler) -> Vec<Agent> {
        players
            .iter()
            .enumerate()
            .map(|(id, p)| Agent::with_compiler(id, p, grid_size, compiler))
            .collect()
    }
}
