//! Label grammars: how each source encodes tokens inside a team label.
//!
//! Loteca:      `F FLAMENGO/RJ SUB-20`, `VASCO/RJ`, `ATLÉTICO MADRID/ESP`, `BRASIL`
//! BetExplorer: `Flamengo U20 W`, `AIK (Swe)`, `Ypiranga (Am)`

use std::sync::LazyLock;

use regex::Regex;

use super::format::{self, re_strip};
use super::{State, Tokens};
use crate::error::LinkError;

static LOTECA_SUB20_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bSUB[ \-]?20\b").unwrap());
static LOTECA_JUNIOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bJ[ÚU]NIOR\b").unwrap());
static LOTECA_WOMEN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)^F\b").unwrap());

static BETEXP_AMATEUR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\(Am\)").unwrap());
static BETEXP_WOMEN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\bW\b").unwrap());
static BETEXP_UNDER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\bU(\d{2})\b").unwrap());
static BETEXP_COUNTRY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(([a-zA-Z]{3})\)").unwrap());

/// Loteca only ever marks one age bracket.
const LOTECA_YOUTH_AGE: u8 = 20;
const MAX_UNDER_AGE: u32 = 25;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LabelGrammar {
    Loteca,
    Betexplorer,
}

impl LabelGrammar {
    /// Split a raw label into its plain name and tokens.
    pub fn parse(self, label: &str) -> Result<(String, Tokens), LinkError> {
        let mut tokens = Tokens::default();
        let rest = self.strip_amateur(label, &mut tokens);
        let rest = self.strip_gender(&rest, &mut tokens);
        let rest = self.strip_age(label, &rest, &mut tokens)?;
        let name = self.strip_locality(label, &rest, &mut tokens)?;
        Ok((re_strip(&name).to_string(), tokens))
    }

    pub fn corrections(self) -> &'static [(&'static str, &'static str)] {
        match self {
            LabelGrammar::Loteca => format::LOTECA_CORRECTIONS,
            LabelGrammar::Betexplorer => format::BETEXPLORER_CORRECTIONS,
        }
    }

    pub fn format_name(self, plain_name: &str) -> String {
        format::format_name(plain_name, self.corrections())
    }

    fn strip_amateur(self, s: &str, tokens: &mut Tokens) -> String {
        match self {
            LabelGrammar::Loteca => s.to_string(),
            LabelGrammar::Betexplorer => {
                tokens.amateur = BETEXP_AMATEUR_RE.is_match(s);
                BETEXP_AMATEUR_RE.replace_all(s, "").into_owned()
            }
        }
    }

    fn strip_gender(self, s: &str, tokens: &mut Tokens) -> String {
        let re = match self {
            LabelGrammar::Loteca => &*LOTECA_WOMEN_RE,
            LabelGrammar::Betexplorer => &*BETEXP_WOMEN_RE,
        };
        tokens.women = re.is_match(s);
        re.replace_all(s, "").into_owned()
    }

    fn strip_age(self, label: &str, s: &str, tokens: &mut Tokens) -> Result<String, LinkError> {
        match self {
            LabelGrammar::Loteca => {
                let youth = LOTECA_SUB20_RE.is_match(s) || LOTECA_JUNIOR_RE.is_match(s);
                if youth {
                    tokens.under_age = LOTECA_YOUTH_AGE;
                }
                let s = LOTECA_SUB20_RE.replace_all(s, "");
                Ok(LOTECA_JUNIOR_RE.replace_all(&s, "").into_owned())
            }
            LabelGrammar::Betexplorer => {
                if let Some(caps) = BETEXP_UNDER_RE.captures(s) {
                    let age: u32 = caps[1].parse().unwrap_or(u32::MAX);
                    if age > MAX_UNDER_AGE {
                        return Err(LinkError::AgeOutOfRange {
                            label: label.to_string(),
                            age,
                        });
                    }
                    tokens.under_age = age as u8;
                }
                Ok(BETEXP_UNDER_RE.replace_all(s, "").into_owned())
            }
        }
    }

    fn strip_locality(self, label: &str, s: &str, tokens: &mut Tokens) -> Result<String, LinkError> {
        match self {
            LabelGrammar::Loteca => {
                let s = re_strip(s);
                let Some((name, suffix)) = s.rsplit_once('/') else {
                    return Ok(s.to_string());
                };
                let suffix = re_strip(suffix);
                match suffix.chars().count() {
                    2 => tokens.state = Some(State::Code(suffix.to_uppercase())),
                    3 => tokens.country = Some(suffix.to_uppercase()),
                    _ => {
                        return Err(LinkError::MalformedLabel {
                            label: label.to_string(),
                            suffix: suffix.to_string(),
                        })
                    }
                }
                Ok(re_strip(name).to_string())
            }
            LabelGrammar::Betexplorer => {
                if let Some(caps) = BETEXP_COUNTRY_RE.captures(s) {
                    tokens.country = Some(caps[1].to_uppercase());
                }
                Ok(BETEXP_COUNTRY_RE.replace_all(s, "").into_owned())
            }
        }
    }
}

/// Render a team identity the way BetExplorer would write it, minus the
/// country: `"flamengo U20 W"`. Used for both keys and values of the alias
/// dictionary so the two sides compare on equal terms.
pub fn render_identity(fname: &str, tokens: &Tokens) -> String {
    let mut out = fname.to_string();
    if tokens.under_age > 0 {
        out.push_str(&format!(" U{}", tokens.under_age));
    }
    if tokens.women {
        out.push_str(" W");
    }
    out
}
