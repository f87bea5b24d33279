//! Narrative beats, variants and the per-beat variant library

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::narrative::context::{strict_tags, NarrativePhase};

/// One narrative moment category; each owns its own variant pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Beat {
    Opening,
    AdvantageAttack,
    DisadvantageAttack,
    TerrainInteraction,
    FinishingMove,
}

impl Beat {
    pub const ALL: [Beat; 5] = [
        Beat::Opening,
        Beat::AdvantageAttack,
        Beat::DisadvantageAttack,
        Beat::TerrainInteraction,
        Beat::FinishingMove,
    ];
}

/// One candidate template for a beat
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NarrativeVariant {
    pub template: String,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    #[serde(default)]
    pub environment_tags: BTreeSet<String>,
}

impl NarrativeVariant {
    pub fn new(template: &str) -> Self {
        Self {
            template: template.to_string(),
            tags: BTreeSet::new(),
            environment_tags: BTreeSet::new(),
        }
    }

    pub fn with_tags(mut self, tags: &[&str]) -> Self {
        self.tags.extend(tags.iter().map(|t| t.to_string()));
        self
    }

    pub fn with_environment_tags(mut self, tags: &[&str]) -> Self {
        self.environment_tags
            .extend(tags.iter().map(|t| t.to_string()));
        self
    }

    /// Deliberately untargeted prose
    pub fn is_untagged(&self) -> bool {
        self.tags.is_empty() && self.environment_tags.is_empty()
    }

    /// Prose written for an attack that did not land
    pub fn describes_miss(&self) -> bool {
        self.tags.contains(strict_tags::MISS)
    }

    /// Strict-context tags this variant carries
    pub fn strict_tags(&self) -> impl Iterator<Item = &str> {
        self.tags
            .iter()
            .map(String::as_str)
            .filter(|t| strict_tags::ALL.iter().any(|s| s == t))
    }

    pub fn applies_to_phase(&self, phase: NarrativePhase) -> bool {
        self.tags.contains(phase.tag())
    }
}

/// Static, read-only variant pools keyed by beat
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NarrativeLibrary {
    pub opening: Vec<NarrativeVariant>,
    pub advantage_attack: Vec<NarrativeVariant>,
    pub disadvantage_attack: Vec<NarrativeVariant>,
    pub terrain_interaction: Vec<NarrativeVariant>,
    pub finishing_move: Vec<NarrativeVariant>,
}

impl NarrativeLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_toml_str(content: &str) -> crate::core::error::Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn pool(&self, beat: Beat) -> &[NarrativeVariant] {
        match beat {
            Beat::Opening => &self.opening,
            Beat::AdvantageAttack => &self.advantage_attack,
            Beat::DisadvantageAttack => &self.disadvantage_attack,
            Beat::TerrainInteraction => &self.terrain_interaction,
            Beat::FinishingMove => &self.finishing_move,
        }
    }

    pub fn pool_mut(&mut self, beat: Beat) -> &mut Vec<NarrativeVariant> {
        match beat {
            Beat::Opening => &mut self.opening,
            Beat::AdvantageAttack => &mut self.advantage_attack,
            Beat::DisadvantageAttack => &mut self.disadvantage_attack,
            Beat::TerrainInteraction => &mut self.terrain_interaction,
            Beat::FinishingMove => &mut self.finishing_move,
        }
    }

    pub fn variant_count(&self) -> usize {
        Beat::ALL.iter().map(|b| self.pool(*b).len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_parses_per_beat_arrays() {
        let lib = NarrativeLibrary::from_toml_str(
            r#"
            [[opening]]
            template = "{actor} squares off against {target}."

            [[finishing_move]]
            template = "{actor} ends it with {move}."
            tags = ["late"]
            "#,
        )
        .expect("library should parse");
        assert_eq!(lib.pool(Beat::Opening).len(), 1);
        assert_eq!(lib.pool(Beat::FinishingMove).len(), 1);
        assert!(lib.pool(Beat::AdvantageAttack).is_empty());
        assert_eq!(lib.variant_count(), 2);
    }

    #[test]
    fn test_untagged_requires_both_sets_empty() {
        assert!(NarrativeVariant::new("plain").is_untagged());
        assert!(!NarrativeVariant::new("x")
            .with_environment_tags(&["ice"])
            .is_untagged());
    }
}
