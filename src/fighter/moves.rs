//! Moves and the shared move table
//!
//! Moves are immutable once loaded. Fighters reference them by id and the
//! table is shared read-only by every session built from the same content.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::core::error::{ChronicleError, Result};
use crate::core::types::MoveId;

/// Tags with scoring or effect semantics
pub mod tags {
    pub const MELEE_RANGE: &str = "melee_range";
    pub const RANGED: &str = "ranged";
    pub const DEBUFF_DISABLE: &str = "debuff_disable";
    pub const DEFENSE: &str = "defense";
    pub const DESPERATION: &str = "desperation";
    pub const TERRAIN: &str = "terrain";
    pub const FLASHY: &str = "flashy";
}

/// A single move a fighter can perform
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Move {
    pub id: MoveId,
    pub name: String,
    /// Base damage before variance and critical multiplier
    pub power: u32,
    /// Hit chance in percent (0 - 100)
    pub accuracy: u32,
    #[serde(default)]
    pub energy_cost: u32,
    /// HP the user loses when performing the move
    #[serde(default)]
    pub recoil: u32,
    #[serde(default)]
    pub tags: BTreeSet<String>,
}

impl Move {
    pub fn new(id: &str, name: &str, power: u32, accuracy: u32, energy_cost: u32) -> Self {
        Self {
            id: MoveId::new(id),
            name: name.to_string(),
            power,
            accuracy: accuracy.min(100),
            energy_cost,
            recoil: 0,
            tags: BTreeSet::new(),
        }
    }

    pub fn with_tags(mut self, tags: &[&str]) -> Self {
        self.tags.extend(tags.iter().map(|t| t.to_string()));
        self
    }

    pub fn with_recoil(mut self, recoil: u32) -> Self {
        self.recoil = recoil;
        self
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    /// Hit probability as a fraction, clamped to 0.0 - 1.0
    pub fn hit_chance(&self) -> f32 {
        self.accuracy.min(100) as f32 / 100.0
    }
}

/// Shared, read-only move lookup
#[derive(Debug, Clone, Default)]
pub struct MoveTable {
    moves: AHashMap<MoveId, Move>,
}

impl MoveTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_moves(moves: impl IntoIterator<Item = Move>) -> Self {
        let mut table = Self::new();
        for m in moves {
            table.insert(m);
        }
        table
    }

    pub fn insert(&mut self, m: Move) {
        self.moves.insert(m.id.clone(), m);
    }

    pub fn get(&self, id: &MoveId) -> Option<&Move> {
        self.moves.get(id)
    }

    /// Lookup that treats a missing move as an error
    pub fn require(&self, id: &MoveId) -> Result<&Move> {
        self.get(id)
            .ok_or_else(|| ChronicleError::UnknownMove(id.clone()))
    }

    pub fn contains(&self, id: &MoveId) -> bool {
        self.moves.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.moves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }
}
