use std::path::Path;

use serde::{Deserialize, Serialize};

use super::*;

fn default_grid_size() -> usize {
    10
}

fn default_samples() -> usize {
    DEFAULT_SAMPLES
}

fn default_max_agents() -> usize {
    DEFAULT_MAX_AGENTS
}

/// Game description as read from a `clues.json` style file.
///
/// ```json
/// { "grid_size": 10, "players": [ { "name": "Ann", "clue": "The row is 3", "weight": 2 } ] }
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    #[serde(default = "default_grid_size")]
    pub grid_size: usize,
    #[serde(default = "default_samples")]
    pub samples: usize,
    /// Seed for the sampler; a fresh one is drawn when absent.
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default = "default_max_agents")]
    pub max_agents: usize,
    pub players: Vec<Player>,
}

impl GameConfig {
    pub fn new(players: Vec<Player>) -> Self {
        GameConfig {
            grid_size: default_grid_size(),
            samples: default_samples(),
            seed: None,
            max_agents: default_max_agents(),
            players,
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: GameConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_json_str(&std::fs::read_to_string(path)?)
    }

    pub fn validate(&self) -> Result<()> {
        if self.grid_size == 0 {
            return Err(PayoutError::EmptyGrid);
        }
        if self.samples == 0 {
            return Err(PayoutError::InvalidSamples);
        }
        if self.max_agents > COALITION_CAPACITY {
            return Err(PayoutError::Config(format!(
                "max_agents {} exceeds the coalition capacity {}",
                self.max_agents, COALITION_CAPACITY
            )));
        }
        if let Some((agent, p)) = self.players.iter().enumerate().find(|(_, p)| p.weight == 0) {
            return Err(PayoutError::InvalidWeight { agent, weight: p.weight });
        }
        Ok(())
    }

    pub fn weights(&self) -> Vec<Weight> {
        self.players.iter().map(|p| p.weight).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = GameConfig::from_json_str(r#"{"players": [{"name": "Ann", "clue": "prime"}]}"#).unwrap();
        assert_eq!(config.grid_size, 10);
        assert_eq!(config.samples, 10_000);
        assert_eq!(config.seed, None);
        assert_eq!(config.max_agents, 20);
        assert_eq!(config.weights(), [1]);
        assert_eq!(config, GameConfig::new(vec![Player::new("Ann", "prime", 1)]));
    }

    #[test]
    fn test_full() {
        let config = GameConfig::from_json_str(
            r#"{"grid_size": 5, "samples": 200, "seed": 9, "max_agents": 6,
                "players": [{"name": "Ann", "clue": "row is 1", "weight": 3}, {"name": "Bo", "clue": "x"}]}"#,
        )
        .unwrap();
        assert_eq!(config.grid_size, 5);
        assert_eq!(config.seed, Some(9));
        assert_eq!(config.weights(), [3, 1]);
    }

    #[test]
    fn test_invalid() {
        assert!(matches!(
            GameConfig::from_json_str(r#"{"grid_size": 0, "players": []}"#),
            Err(PayoutError::EmptyGrid)
        ));
        assert!(matches!(
            GameConfig::from_json_str(r#"{"samples": 0, "players": []}"#),
            Err(PayoutError::InvalidSamples)
        ));
        assert!(matches!(
            GameConfig::from_json_str(r#"{"players": [{"name": "A", "clue": "", "weight": 0}]}"#),
            Err(PayoutError::InvalidWeight { agent: 0, weight: 0 })
        ));
        assert!(matches!(
            GameConfig::from_json_str(r#"{"max_agents": 64, "players": []}"#),
            Err(PayoutError::Config(_))
        ));
        assert!(matches!(GameConfig::from_json_str(r#"{"grid_size": 4}"#), Err(PayoutError::Config(_))));
        assert!(matches!(GameConfig::from_path("/nonexistent/clues.json"), Err(PayoutError::Io(_))));
    }
}
