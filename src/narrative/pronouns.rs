//! Pronoun sets keyed by a fighter's pronoun identifier

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PronounSet {
    pub subject: String,
    pub object: String,
    pub possessive: String,
    pub reflexive: String,
}

impl PronounSet {
    pub fn new(subject: &str, object: &str, possessive: &str, reflexive: &str) -> Self {
        Self {
            subject: subject.to_string(),
            object: object.to_string(),
            possessive: possessive.to_string(),
            reflexive: reflexive.to_string(),
        }
    }

    /// Look up a placeholder field name
    pub fn field(&self, name: &str) -> Option<&str> {
        match name {
            "subject" => Some(&self.subject),
            "object" => Some(&self.object),
            "possessive" => Some(&self.possessive),
            "reflexive" => Some(&self.reflexive),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PronounTable {
    sets: AHashMap<String, PronounSet>,
}

impl Default for PronounTable {
    fn default() -> Self {
        let mut sets = AHashMap::new();
        sets.insert("he".into(), PronounSet::new("he", "him", "his", "himself"));
        sets.insert("she".into(), PronounSet::new("she", "her", "her", "herself"));
        sets.insert("they".into(), PronounSet::new("they", "them", "their", "themselves"));
        sets.insert("it".into(), PronounSet::new("it", "it", "its", "itself"));
        Self { sets }
    }
}

impl PronounTable {
    /// Table with no sets at all
    pub fn empty() -> Self {
        Self {
            sets: AHashMap::new(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&PronounSet> {
        self.sets.get(key)
    }

    pub fn insert(&mut self, key: &str, set: PronounSet) {
        self.sets.insert(key.to_string(), set);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_table_has_common_sets() {
        let table = PronounTable::default();
        assert_eq!(table.get("she").unwrap().object, "her");
        assert_eq!(table.get("they").unwrap().reflexive, "themselves");
        assert!(table.get("xe").is_none());
    }

    #[test]
    fn test_field_lookup() {
        let set = PronounSet::new("he", "him", "his", "himself");
        assert_eq!(set.field("possessive"), Some("his"));
        assert_eq!(set.field("plural"), None);
    }
}
