//! Loteca → BetExplorer country names.
//!
//! Built from two locale files in the umpirsky/country-list JSON format
//! (`{"BR": "Brasil", ...}`), one Portuguese and one English, joined on the
//! ISO code.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::{debug, warn};

use super::format::fold_ascii;
use crate::error::LinkError;

/// Loteca names with no literal counterpart in the English list.
const MANUAL_TRANSLATIONS: &[(&str, &str)] = &[
    ("bosnia herzegovina", "bosnia & herzegovina"),
    ("camaroes", "cameroon"),
    ("costa do marfim", "ivory coast"),
    ("escocia", "scotland"),
    ("estados unidos", "usa"),
    ("inglaterra", "england"),
    ("irlanda do norte", "northern ireland"),
    ("pais de gales", "wales"),
    ("rep.tcheca", "czech republic"),
    ("republica tcheca", "czech republic"),
    ("servia e montenegro", "serbia and montenegro"),
    ("taiti", "tahiti"),
];

#[derive(Debug, Clone, Default)]
pub struct CountryTable {
    translations: HashMap<String, String>,
}

impl CountryTable {
    pub fn from_locales(
        portuguese: &HashMap<String, String>,
        english: &HashMap<String, String>,
    ) -> Self {
        let mut translations = HashMap::new();
        for (code, pt_name) in portuguese {
            match english.get(code) {
                Some(en_name) => {
                    translations.insert(standardize(pt_name), standardize(en_name));
                }
                None => warn!(code = code.as_str(), "country missing from english locale"),
            }
        }
        for (pt_name, en_name) in MANUAL_TRANSLATIONS {
            translations.insert(pt_name.to_string(), en_name.to_string());
        }
        debug!(countries = translations.len(), "country table ready");
        CountryTable { translations }
    }

    pub fn load(portuguese: &Path, english: &Path) -> Result<Self> {
        let pt = read_locale(portuguese)?;
        let en = read_locale(english)?;
        Ok(Self::from_locales(&pt, &en))
    }

    /// BetExplorer fname for a Loteca country fname.
    pub fn translate(&self, fname: &str) -> Result<&str, LinkError> {
        self.translations
            .get(fname)
            .map(String::as_str)
            .ok_or_else(|| LinkError::MissingTranslation {
                country: fname.to_string(),
            })
    }

    pub fn len(&self) -> usize {
        self.translations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.translations.is_empty()
    }
}

fn read_locale(path: &Path) -> Result<HashMap<String, String>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read country list {:?}", path))?;
    serde_json::from_str(&raw).with_context(|| format!("Failed to parse country list {:?}", path))
}

fn standardize(country: &str) -> String {
    fold_ascii(country).to_lowercase()
}
