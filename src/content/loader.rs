//! Load authoring content from TOML files
//!
//! Expected layout of a data directory:
//! - `roster.toml`    moves, fighter templates, environments (required)
//! - `narrative.toml` variant pools, one array per beat (required)
//! - `ai_bias.toml`   per-character bias (optional, empty when absent)
//! - `pronouns.toml`  extra pronoun sets (optional, merged over defaults)

use std::fs;
use std::path::Path;

use tracing::{debug, info};

use crate::ai::bias::BiasTable;
use crate::content::{BattleResources, Roster};
use crate::core::error::Result;
use crate::narrative::{NarrativeLibrary, PronounSet, PronounTable};

pub fn load_roster(path: &Path) -> Result<Roster> {
    let content = fs::read_to_string(path)?;
    Roster::from_toml_str(&content)
}

pub fn load_narrative(path: &Path) -> Result<NarrativeLibrary> {
    let content = fs::read_to_string(path)?;
    NarrativeLibrary::from_toml_str(&content)
}

pub fn load_bias_table(path: &Path) -> Result<BiasTable> {
    let content = fs::read_to_string(path)?;
    BiasTable::from_toml_str(&content)
}

fn load_pronouns(path: &Path) -> Result<PronounTable> {
    let mut table = PronounTable::default();
    if path.exists() {
        let content = fs::read_to_string(path)?;
        let extra: ahash::AHashMap<String, PronounSet> = toml::from_str(&content)?;
        for (key, set) in extra {
            table.insert(&key, set);
        }
    }
    Ok(table)
}

/// Load every content file from a data directory
pub fn load_resources(data_dir: &Path) -> Result<BattleResources> {
    let roster = load_roster(&data_dir.join("roster.toml"))?;
    let narrative = load_narrative(&data_dir.join("narrative.toml"))?;

    let bias_path = data_dir.join("ai_bias.toml");
    let biases = if bias_path.exists() {
        load_bias_table(&bias_path)?
    } else {
        debug!("no bias table at {}", bias_path.display());
        BiasTable::new()
    };

    let pronouns = load_pronouns(&data_dir.join("pronouns.toml"))?;

    let resources = BattleResources::from_parts(roster, biases, narrative, pronouns)?;
    info!(
        "Loaded {} moves, {} fighters, {} environments, {} narrative variants from {}",
        resources.moves.len(),
        resources.fighters.len(),
        resources.environments.len(),
        resources.narrative.variant_count(),
        data_dir.display()
    );
    Ok(resources)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn data_dir() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data")
    }

    #[test]
    fn test_load_bundled_data() {
        let resources = load_resources(&data_dir()).expect("bundled data should load");
        assert!(resources.fighters.len() >= 2);
        assert!(!resources.environments.is_empty());
        assert!(resources.narrative.variant_count() > 0);
    }

    #[test]
    fn test_missing_roster_is_io_error() {
        let result = load_resources(Path::new("/nonexistent/duel-data"));
        assert!(matches!(
            result,
            Err(crate::core::error::ChronicleError::IoError(_))
        ));
    }
}
