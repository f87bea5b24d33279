//! Battle environments

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Environment {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    /// Free-form descriptors of terrain features ("rocky ledge", "frozen pond")
    #[serde(default)]
    pub terrain_features: Vec<String>,
}

impl Environment {
    pub fn new(id: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            tags: BTreeSet::new(),
            terrain_features: Vec::new(),
        }
    }

    pub fn with_tags(mut self, tags: &[&str]) -> Self {
        self.tags.extend(tags.iter().map(|t| t.to_string()));
        self
    }

    pub fn with_features(mut self, features: &[&str]) -> Self {
        self.terrain_features
            .extend(features.iter().map(|f| f.to_string()));
        self
    }

    /// Does any of the given tags appear in this environment?
    pub fn shares_tag<'a>(&self, tags: impl IntoIterator<Item = &'a String>) -> bool {
        tags.into_iter().any(|t| self.tags.contains(t))
    }
}
