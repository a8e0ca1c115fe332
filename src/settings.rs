use std::path::PathBuf;

use anyhow::{Context, Result};
use config::{Config, Environment};
use serde::Deserialize;

/// First Loteca round with prize information.
pub const DEFAULT_START_ROUND: u32 = 366;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Settings {
    pub db_path: PathBuf,
    /// Curated seed dictionary; only the `seed` command writes it.
    pub aliases_path: PathBuf,
    /// Where `link` writes the seed plus the aliases its passes learned.
    pub grown_aliases_path: PathBuf,
    pub countries_pt: PathBuf,
    pub countries_en: PathBuf,
    pub start_round: u32,
}

impl Settings {
    /// Defaults overridden by `LOTECA_*` environment variables
    /// (`LOTECA_DB_PATH`, `LOTECA_START_ROUND`, ...).
    pub fn load() -> Result<Self> {
        Self::from_builder(Config::builder().add_source(Environment::with_prefix("LOTECA")))
    }

    fn from_builder(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<Self> {
        builder
            .set_default("db_path", "data/loteca.sqlite")?
            .set_default("aliases_path", "data/aliases.json")?
            .set_default("grown_aliases_path", "data/aliases_grown.json")?
            .set_default("countries_pt", "data/countries_pt_BR.json")?
            .set_default("countries_en", "data/countries_en.json")?
            .set_default("start_round", DEFAULT_START_ROUND)?
            .build()
            .context("Failed to read settings")?
            .try_deserialize()
            .context("Invalid settings")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply() {
        let s = Settings::from_builder(Config::builder()).unwrap();
        assert_eq!(s.db_path, PathBuf::from("data/loteca.sqlite"));
        assert_eq!(s.start_round, DEFAULT_START_ROUND);
        assert_eq!(s.grown_aliases_path, PathBuf::from("data/aliases_grown.json"));
        assert_ne!(s.grown_aliases_path, s.aliases_path);
    }

    #[test]
    fn sources_override_defaults() {
        let builder = Config::builder()
            .set_override("start_round", 500)
            .unwrap()
            .set_override("aliases_path", "/tmp/aliases.json")
            .unwrap();
        let s = Settings::from_builder(builder).unwrap();
        assert_eq!(s.start_round, 500);
        assert_eq!(s.aliases_path, PathBuf::from("/tmp/aliases.json"));
        assert_eq!(s.countries_en, PathBuf::from("data/countries_en.json"));
    }
}
