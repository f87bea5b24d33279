//! Battle configuration with documented constants
//!
//! Every tunable number the turn loop and the decision engine read at run
//! time lives here. Authoring data (moves, fighters, narrative pools) is
//! loaded separately by the `content` module.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::core::error::{ChronicleError, Result};

/// Fixed weights used to combine per-move component scores
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreWeights {
    /// Multiplier for expected damage (power weighted by accuracy)
    pub damage: f32,
    /// Multiplier for hit probability (0.0 - 1.0)
    ///
    /// At 10.0 a 100%-accuracy move gains 10 points over a coin flip's 5,
    /// roughly the expected damage of a weak strike.
    pub accuracy: f32,
    /// Multiplier subtracted for risk (miss chance plus safety-margin penalty)
    pub risk: f32,
    /// Multiplier for tag-driven strategic bonuses
    pub strategic: f32,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            damage: 1.0,
            accuracy: 10.0,
            risk: 15.0,
            strategic: 1.0,
        }
    }
}

/// Configuration for one battle session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BattleConfig {
    // === TERMINATION ===
    /// Hard cap on ticks; reaching it ends the battle as a stalemate
    ///
    /// This is the only runaway guard. It is checked after every tick,
    /// even when every move in play deals zero damage.
    pub max_turns: u32,

    /// Consecutive ticks without any HP change before a stalemate is called
    pub stalemate_window: u32,

    // === RANDOMNESS ===
    /// Seed for the combat and narrative RNG streams
    pub seed: u64,

    // === RESOURCES ===
    /// Chi regained by each living fighter at the end of every tick
    pub chi_regen: u32,

    // === DAMAGE ===
    /// Probability (0.0 - 1.0) that a landed hit is critical
    pub crit_chance: f32,

    /// Damage multiplier on critical hits
    pub crit_multiplier: f32,

    /// Maximum fraction shaved off base power by the damage roll
    ///
    /// At 0.15 a landed hit deals between 85% and 100% of its power.
    pub damage_variance: f32,

    // === AI ===
    /// Fraction of max HP the AI tries to stay above when paying recoil
    pub safety_hp_fraction: f32,

    /// Component weights for move scoring
    pub weights: ScoreWeights,
}

impl Default for BattleConfig {
    fn default() -> Self {
        Self {
            max_turns: 50,
            stalemate_window: 6,
            seed: 42,
            chi_regen: 2,
            crit_chance: 0.1,
            crit_multiplier: 1.5,
            damage_variance: 0.15,
            safety_hp_fraction: 0.2,
            weights: ScoreWeights::default(),
        }
    }
}

impl BattleConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Same config with a different seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Parse a config from TOML; missing keys fall back to defaults
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: BattleConfig = toml::from_str(content)?;
        config.validate().map_err(ChronicleError::InvalidConfig)?;
        Ok(config)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.max_turns == 0 {
            return Err("max_turns must be at least 1".into());
        }

        if self.stalemate_window == 0 {
            return Err("stalemate_window must be at least 1".into());
        }

        if !(0.0..=1.0).contains(&self.crit_chance) {
            return Err(format!("crit_chance ({}) must be within 0.0..=1.0", self.crit_chance));
        }

        if self.crit_multiplier < 1.0 {
            return Err(format!(
                "crit_multiplier ({}) should be >= 1.0",
                self.crit_multiplier
            ));
        }

        if !(0.0..1.0).contains(&self.damage_variance) {
            return Err(format!(
                "damage_variance ({}) must be within 0.0..1.0",
                self.damage_variance
            ));
        }

        if !(0.0..=1.0).contains(&self.safety_hp_fraction) {
            return Err(format!(
                "safety_hp_fraction ({}) must be within 0.0..=1.0",
                self.safety_hp_fraction
            ));
        }

        Ok(())
    }
}

/// Load a battle config from a TOML file
pub fn load_config(path: &Path) -> Result<BattleConfig> {
    let contents = fs::read_to_string(path)?;
    BattleConfig::from_toml_str(&contents)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(BattleConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = BattleConfig::from_toml_str("max_turns = 12\n[weights]\nrisk = 3.0\n")
            .expect("partial config should parse");
        assert_eq!(config.max_turns, 12);
        assert_eq!(config.weights.risk, 3.0);
        assert_eq!(config.weights.damage, 1.0);
        assert_eq!(config.stalemate_window, 6);
    }

    #[test]
    fn test_rejects_zero_max_turns() {
        let err = BattleConfig::from_toml_str("max_turns = 0").unwrap_err();
        assert!(matches!(err, ChronicleError::InvalidConfig(_)));
    }

    #[test]
    fn test_rejects_crit_chance_out_of_range() {
        let config = BattleConfig {
            crit_chance: 1.5,
            ..BattleConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
