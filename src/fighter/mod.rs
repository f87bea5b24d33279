//! Fighters, their moves and the arenas they fight in

pub mod environment;
pub mod moves;

pub use environment::Environment;
pub use moves::{tags, Move, MoveTable};

use serde::{Deserialize, Serialize};

use crate::core::error::{ChronicleError, Result};
use crate::core::types::{FighterId, MoveId};

/// Health percentage at or below which a fighter becomes stressed
pub const STRESSED_HP_PERCENT: f32 = 60.0;
/// Health percentage at or below which a fighter breaks
pub const BROKEN_HP_PERCENT: f32 = 25.0;

/// Discrete mental state; only ever degrades during a battle
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum MentalState {
    #[default]
    Stable,
    Stressed,
    Broken,
}

/// Transient per-battle flags
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FighterFlags {
    pub used_desperation: bool,
    /// Halves the next landed hit, then clears
    pub guarding: bool,
    /// Skips the next action, then clears
    pub stunned: bool,
    /// Set when the most recent hit taken was critical
    pub took_critical: bool,
}

/// Accumulated battle statistics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FighterStats {
    pub damage_dealt: u32,
    pub damage_taken: u32,
    pub hits_landed: u32,
    pub misses: u32,
    pub critical_hits: u32,
    pub moves_used: u32,
}

/// Authoring record a fighter is spawned from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FighterTemplate {
    pub id: FighterId,
    pub name: String,
    pub max_health: i32,
    pub max_energy: u32,
    #[serde(default)]
    pub speed: u32,
    /// Key into the pronoun table ("he", "she", "they", ...)
    pub pronouns: String,
    pub moves: Vec<MoveId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fighter {
    pub id: FighterId,
    pub name: String,
    pub health: i32,
    pub max_health: i32,
    pub energy: u32,
    pub max_energy: u32,
    pub speed: u32,
    pub mental_state: MentalState,
    pub pronouns: String,
    pub moves: Vec<MoveId>,
    pub flags: FighterFlags,
    pub stats: FighterStats,
}

impl Fighter {
    pub fn new(id: &str, name: &str, max_health: i32, max_energy: u32) -> Self {
        Self {
            id: FighterId::new(id),
            name: name.to_string(),
            health: max_health,
            max_health,
            energy: max_energy,
            max_energy,
            speed: 0,
            mental_state: MentalState::Stable,
            pronouns: "they".to_string(),
            moves: Vec::new(),
            flags: FighterFlags::default(),
            stats: FighterStats::default(),
        }
    }

    /// Spawn a fresh fighter, checking every move exists in the table
    pub fn from_template(template: &FighterTemplate, table: &MoveTable) -> Result<Self> {
        if template.max_health <= 0 {
            return Err(ChronicleError::InvalidRoster(format!(
                "fighter {} has non-positive max_health",
                template.id
            )));
        }
        if let Some(missing) = template.moves.iter().find(|m| !table.contains(m)) {
            return Err(ChronicleError::UnknownMove(missing.clone()));
        }

        Ok(Self {
            id: template.id.clone(),
            name: template.name.clone(),
            health: template.max_health,
            max_health: template.max_health,
            energy: template.max_energy,
            max_energy: template.max_energy,
            speed: template.speed,
            mental_state: MentalState::Stable,
            pronouns: template.pronouns.clone(),
            moves: template.moves.clone(),
            flags: FighterFlags::default(),
            stats: FighterStats::default(),
        })
    }

    pub fn with_moves(mut self, moves: &[&str]) -> Self {
        self.moves = moves.iter().map(|m| MoveId::new(*m)).collect();
        self
    }

    pub fn with_pronouns(mut self, key: &str) -> Self {
        self.pronouns = key.to_string();
        self
    }

    pub fn with_speed(mut self, speed: u32) -> Self {
        self.speed = speed;
        self
    }

    /// Current health as a percentage of max; 0.0 when max is not positive
    pub fn health_percent(&self) -> f32 {
        if self.max_health <= 0 {
            return 0.0;
        }
        self.health as f32 / self.max_health as f32 * 100.0
    }

    pub fn is_down(&self) -> bool {
        self.health <= 0
    }

    /// Apply incoming damage and record it
    pub fn take_damage(&mut self, amount: u32) {
        self.health = self.health.saturating_sub(amount as i32);
        self.stats.damage_taken += amount;
    }

    /// Pay an energy cost, failing if the fighter cannot afford it
    pub fn spend_energy(&mut self, cost: u32) -> Result<()> {
        if cost > self.energy {
            return Err(ChronicleError::InsufficientEnergy {
                fighter: self.id.clone(),
                cost,
                available: self.energy,
            });
        }
        self.energy -= cost;
        Ok(())
    }

    pub fn regen_energy(&mut self, amount: u32) {
        self.energy = (self.energy + amount).min(self.max_energy);
    }

    /// Degrade the mental state from current health and a critical hit taken
    ///
    /// Never improves the state.
    pub fn update_mental_state(&mut self) {
        let hp = self.health_percent();
        let derived = if hp <= BROKEN_HP_PERCENT {
            MentalState::Broken
        } else if hp <= STRESSED_HP_PERCENT || self.flags.took_critical {
            MentalState::Stressed
        } else {
            MentalState::Stable
        };
        self.mental_state = self.mental_state.max(derived);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_percent() {
        let mut f = Fighter::new("zuko", "Zuko", 80, 20);
        f.health = 20;
        assert_eq!(f.health_percent(), 25.0);
    }

    #[test]
    fn test_health_percent_zero_max() {
        let f = Fighter::new("ghost", "Ghost", 0, 0);
        assert_eq!(f.health_percent(), 0.0);
    }

    #[test]
    fn test_spend_energy_rejects_overdraft() {
        let mut f = Fighter::new("katara", "Katara", 100, 5);
        assert!(matches!(
            f.spend_energy(6),
            Err(ChronicleError::InsufficientEnergy { cost: 6, available: 5, .. })
        ));
        assert_eq!(f.energy, 5);
        assert!(f.spend_energy(5).is_ok());
        assert_eq!(f.energy, 0);
    }

    #[test]
    fn test_regen_caps_at_max() {
        let mut f = Fighter::new("toph", "Toph", 100, 10);
        f.energy = 9;
        f.regen_energy(5);
        assert_eq!(f.energy, 10);
    }

    #[test]
    fn test_mental_state_only_degrades() {
        let mut f = Fighter::new("sokka", "Sokka", 100, 10);
        f.health = 20;
        f.update_mental_state();
        assert_eq!(f.mental_state, MentalState::Broken);

        f.health = 100;
        f.update_mental_state();
        assert_eq!(f.mental_state, MentalState::Broken);
    }

    #[test]
    fn test_critical_hit_stresses_healthy_fighter() {
        let mut f = Fighter::new("mai", "Mai", 100, 10);
        f.flags.took_critical = true;
        f.update_mental_state();
        assert_eq!(f.mental_state, MentalState::Stressed);
    }

    #[test]
    fn test_from_template_rejects_unknown_move() {
        let table = MoveTable::from_moves([Move::new("jab", "Jab", 5, 95, 0)]);
        let template = FighterTemplate {
            id: FighterId::new("ty_lee"),
            name: "Ty Lee".into(),
            max_health: 90,
            max_energy: 12,
            speed: 9,
            pronouns: "she".into(),
            moves: vec![MoveId::new("jab"), MoveId::new("cartwheel")],
        };
        let err = Fighter::from_template(&template, &table).unwrap_err();
        assert!(matches!(err, ChronicleError::UnknownMove(id) if id.as_str() == "cartwheel"));
    }
}
