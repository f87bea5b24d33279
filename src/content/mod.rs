//! Authoring content - roster, bias table, narrative pools, pronouns
//!
//! Content arrives pre-validated by an external schema checker. Loading
//! only reports IO/parse failures and dangling references.

pub mod loader;

pub use loader::{load_bias_table, load_narrative, load_resources, load_roster};

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::ai::bias::BiasTable;
use crate::core::error::{ChronicleError, Result};
use crate::core::types::FighterId;
use crate::fighter::{Environment, Fighter, FighterTemplate, Move, MoveTable};
use crate::narrative::{NarrativeLibrary, PronounTable};

/// Raw roster file contents
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Roster {
    pub moves: Vec<Move>,
    pub fighters: Vec<FighterTemplate>,
    pub environments: Vec<Environment>,
}

impl Roster {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }
}

/// Immutable bundle shared by every session built from the same content
#[derive(Debug, Clone, Default)]
pub struct BattleResources {
    pub moves: MoveTable,
    pub fighters: AHashMap<FighterId, FighterTemplate>,
    pub environments: AHashMap<String, Environment>,
    pub biases: BiasTable,
    pub narrative: NarrativeLibrary,
    pub pronouns: PronounTable,
}

impl BattleResources {
    /// Index a roster, checking that every fighter's moves exist
    pub fn from_parts(
        roster: Roster,
        biases: BiasTable,
        narrative: NarrativeLibrary,
        pronouns: PronounTable,
    ) -> Result<Self> {
        let moves = MoveTable::from_moves(roster.moves);

        let mut fighters = AHashMap::new();
        for template in roster.fighters {
            if let Some(missing) = template.moves.iter().find(|m| !moves.contains(m)) {
                return Err(ChronicleError::InvalidRoster(format!(
                    "fighter {} references unknown move {}",
                    template.id, missing
                )));
            }
            fighters.insert(template.id.clone(), template);
        }

        let environments = roster
            .environments
            .into_iter()
            .map(|env| (env.id.clone(), env))
            .collect();

        Ok(Self {
            moves,
            fighters,
            environments,
            biases,
            narrative,
            pronouns,
        })
    }

    pub fn spawn_fighter(&self, id: &FighterId) -> Result<Fighter> {
        let template = self
            .fighters
            .get(id)
            .ok_or_else(|| ChronicleError::UnknownFighter(id.clone()))?;
        Fighter::from_template(template, &self.moves)
    }

    pub fn environment(&self, id: &str) -> Result<Environment> {
        self.environments
            .get(id)
            .cloned()
            .ok_or_else(|| ChronicleError::UnknownEnvironment(id.to_string()))
    }

    /// Fighter ids sorted for stable listing
    pub fn fighter_ids(&self) -> Vec<&FighterId> {
        let mut ids: Vec<&FighterId> = self.fighters.keys().collect();
        ids.sort();
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROSTER: &str = r#"
        [[moves]]
        id = "air_blast"
        name = "Air Blast"
        power = 14
        accuracy = 90
        energy_cost = 3
        tags = ["ranged"]

        [[fighters]]
        id = "aang"
        name = "Aang"
        max_health = 100
        max_energy = 20
        speed = 12
        pronouns = "he"
        moves = ["air_blast"]

        [[environments]]
        id = "air_temple"
        name = "the Southern Air Temple"
        tags = ["air", "heights"]
        terrain_features = ["crumbling balcony"]
    "#;

    fn resources() -> BattleResources {
        BattleResources::from_parts(
            Roster::from_toml_str(ROSTER).unwrap(),
            BiasTable::new(),
            NarrativeLibrary::new(),
            PronounTable::default(),
        )
        .expect("roster should index")
    }

    #[test]
    fn test_spawn_fighter_from_template() {
        let res = resources();
        let aang = res.spawn_fighter(&FighterId::new("aang")).unwrap();
        assert_eq!(aang.health, 100);
        assert_eq!(aang.speed, 12);
        assert_eq!(aang.moves.len(), 1);
    }

    #[test]
    fn test_unknown_lookups_are_errors() {
        let res = resources();
        assert!(matches!(
            res.spawn_fighter(&FighterId::new("kyoshi")),
            Err(ChronicleError::UnknownFighter(_))
        ));
        assert!(matches!(
            res.environment("ba_sing_se"),
            Err(ChronicleError::UnknownEnvironment(_))
        ));
        assert_eq!(res.environment("air_temple").unwrap().tags.len(), 2);
    }

    #[test]
    fn test_dangling_move_reference_rejected() {
        let mut roster = Roster::from_toml_str(ROSTER).unwrap();
        roster.moves.clear();
        let result = BattleResources::from_parts(
            roster,
            BiasTable::new(),
            NarrativeLibrary::new(),
            PronounTable::default(),
        );
        assert!(matches!(result, Err(ChronicleError::InvalidRoster(_))));
    }
}
