use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Java version → image tags known to run on it
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompatibilityTable(BTreeMap<String, BTreeSet<String>>);

impl CompatibilityTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries<'a, I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a [&'a str])>,
    {
        let mut table = Self::new();
        for (version, tags) in entries {
            for tag in tags {
                table.insert(version, tag);
            }
        }
        table
    }

    pub fn insert(&mut self, version: &str, tag: &str) {
        self.0
            .entry(version.to_string())
            .or_default()
            .insert(tag.to_string());
    }

    /// Candidates for an exact version string; no normalization is applied
    pub fn candidates(&self, version: &str) -> Option<&BTreeSet<String>> {
        self.0.get(version).filter(|tags| !tags.is_empty())
    }

    /// Lexicographically smallest candidate
    pub fn smallest(&self, version: &str) -> Option<&str> {
        self.candidates(version)
            .and_then(|tags| tags.iter().next())
            .map(String::as_str)
    }

    /// Lexicographically largest candidate
    pub fn largest(&self, version: &str) -> Option<&str> {
        self.candidates(version)
            .and_then(|tags| tags.iter().next_back())
            .map(String::as_str)
    }

    pub fn versions(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
