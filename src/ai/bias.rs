//! Per-character AI bias loaded from TOML
//!
//! A bias nudges objective move scoring for one character. Each field
//! scales exactly one weighted scoring term; absent fields are zero.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::core::error::Result;
use crate::core::types::FighterId;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AiBias {
    /// Extra weight on the expected-damage term
    pub overkill: f32,
    /// Extra penalty on the risk term
    pub self_preservation: f32,
    /// Extra weight on the strategic term
    pub betrayal_risk: f32,
    /// Discount on the accuracy term (flashy fighters care less about landing)
    pub showboating: f32,
}

/// Explicit character -> bias mapping handed to the decision engine
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BiasTable {
    pub characters: AHashMap<FighterId, AiBias>,
}

impl BiasTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn insert(&mut self, id: FighterId, bias: AiBias) {
        self.characters.insert(id, bias);
    }

    /// Bias for a character; all-zero when the character has no entry
    pub fn bias_for(&self, id: &FighterId) -> AiBias {
        self.characters.get(id).copied().unwrap_or_default()
    }
}
