//! Loteca team identity → set of BetExplorer team identities.
//!
//! A key with several values is real ambiguity on the BetExplorer side and
//! is kept as-is for a human to review. Within a run entries are only added.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AliasDictionary {
    entries: BTreeMap<String, BTreeSet<String>>,
}

impl AliasDictionary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&BTreeSet<String>> {
        self.entries.get(key)
    }

    pub fn contains(&self, key: &str, value: &str) -> bool {
        self.entries.get(key).is_some_and(|values| values.contains(value))
    }

    /// Make sure `key` exists, even with no known aliases.
    pub fn touch(&mut self, key: &str) {
        self.entries.entry(key.to_string()).or_default();
    }

    /// Returns true when the pair was not known yet.
    pub fn insert(&mut self, key: &str, value: &str) -> bool {
        self.entries
            .entry(key.to_string())
            .or_default()
            .insert(value.to_string())
    }

    /// Union `other` into `self`, returning how many pairs were new.
    pub fn merge(&mut self, other: &AliasDictionary) -> usize {
        let mut added = 0;
        for (key, values) in &other.entries {
            self.touch(key);
            for value in values {
                if self.insert(key, value) {
                    added += 1;
                }
            }
        }
        added
    }

    /// True when every pair of `other` is also in `self`.
    pub fn is_superset_of(&self, other: &AliasDictionary) -> bool {
        other
            .entries
            .iter()
            .all(|(key, values)| values.iter().all(|value| self.contains(key, value)))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &BTreeSet<String>)> {
        self.entries.iter()
    }

    /// Keys that resolve to more than one value.
    pub fn ambiguous(&self) -> impl Iterator<Item = (&String, &BTreeSet<String>)> {
        self.entries.iter().filter(|(_, values)| values.len() > 1)
    }

    /// Number of keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of (key, value) pairs.
    pub fn pair_count(&self) -> usize {
        self.entries.values().map(BTreeSet::len).sum()
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read alias dictionary {:?}", path))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse alias dictionary {:?}", path))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {:?}", parent))?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write alias dictionary {:?}", path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_reports_novelty() {
        let mut d = AliasDictionary::new();
        assert!(d.insert("vasco da gama", "vasco"));
        assert!(!d.insert("vasco da gama", "vasco"));
        assert!(d.insert("vasco da gama", "vasco da gama"));
        assert_eq!(d.len(), 1);
        assert_eq!(d.pair_count(), 2);
        assert_eq!(d.ambiguous().count(), 1);
    }

    #[test]
    fn touched_key_stays_empty() {
        let mut d = AliasDictionary::new();
        d.touch("cfz");
        assert_eq!(d.get("cfz").map(BTreeSet::len), Some(0));
        assert!(!d.contains("cfz", "cfz"));
    }

    #[test]
    fn merge_only_grows() {
        let mut seed = AliasDictionary::new();
        seed.insert("flamengo", "flamengo");
        let before = seed.clone();

        let mut found = AliasDictionary::new();
        found.insert("flamengo", "flamengo");
        found.insert("santos", "santos");

        assert_eq!(seed.merge(&found), 1);
        assert!(seed.is_superset_of(&before));
        assert!(seed.is_superset_of(&found));
        assert!(!before.is_superset_of(&seed));
    }

    #[test]
    fn json_is_a_plain_map() {
        let mut d = AliasDictionary::new();
        d.insert("flamengo", "flamengo");
        d.touch("cfz");
        let json = serde_json::to_string(&d).unwrap();
        assert_eq!(json, r#"{"cfz":[],"flamengo":["flamengo"]}"#);
        let back: AliasDictionary = serde_json::from_str(&json).unwrap();
        assert_eq!(back, d);
    }

    #[test]
    fn save_reports_an_unusable_directory() {
        let blocker = std::env::temp_dir().join(format!("loteca-linker-{}-blocker", std::process::id()));
        std::fs::write(&blocker, "not a directory").unwrap();
        let err = AliasDictionary::new()
            .save(&blocker.join("aliases.json"))
            .unwrap_err();
        assert!(format!("{err:#}").contains("Failed to create directory"));
        std::fs::remove_file(&blocker).unwrap();
    }
}
