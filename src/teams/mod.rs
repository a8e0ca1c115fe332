pub mod country;
pub mod format;
pub mod grammar;
pub mod registry;
pub mod seed;

use std::fmt;
use std::sync::{LazyLock, OnceLock};

use regex::Regex;

use crate::error::LinkError;
use format::re_strip;
use grammar::{render_identity, LabelGrammar};

static TRAILING_STATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b([a-z]{2})\W*$").unwrap());

/// Brazilian state of a team.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum State {
    /// Two-letter code, uppercase.
    Code(String),
    /// The team showed up in leagues of more than one state.
    Ambiguous,
}

impl State {
    pub fn code(&self) -> Option<&str> {
        match self {
            State::Code(code) => Some(code),
            State::Ambiguous => None,
        }
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            State::Code(code) => f.write_str(code),
            State::Ambiguous => f.write_str("ambiguous"),
        }
    }
}

/// Everything in a label that is not the team's name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Tokens {
    pub state: Option<State>,
    /// Three-letter code, uppercase.
    pub country: Option<String>,
    pub amateur: bool,
    /// 0 means no age restriction.
    pub under_age: u8,
    pub women: bool,
}

/// One distinct team label as seen in one source.
#[derive(Debug, Clone)]
pub struct Team {
    pub raw: String,
    pub plain_name: String,
    pub fname: String,
    pub tokens: Tokens,
    fname_without_state: OnceLock<String>,
}

impl Team {
    pub fn new(raw: String, plain_name: String, fname: String, tokens: Tokens) -> Self {
        Team {
            raw,
            plain_name,
            fname,
            tokens,
            fname_without_state: OnceLock::new(),
        }
    }

    /// Parse and format a raw label with the grammar of its source.
    pub fn parse(grammar: LabelGrammar, raw: &str) -> Result<Self, LinkError> {
        let (plain_name, tokens) = grammar.parse(raw)?;
        let fname = grammar.format_name(&plain_name);
        Ok(Team::new(raw.to_string(), plain_name, fname, tokens))
    }

    /// Same team with `state` replacing whatever the label said.
    pub fn with_state(self, state: Option<State>) -> Self {
        let tokens = Tokens { state, ..self.tokens };
        Team::new(self.raw, self.plain_name, self.fname, tokens)
    }

    /// fname without a trailing state code ("america mg" → "america").
    pub fn fname_without_state(&self) -> &str {
        self.fname_without_state.get_or_init(|| {
            match self.tokens.state.as_ref().and_then(State::code) {
                Some(code) => strip_state(&self.fname, code),
                None => self.fname.clone(),
            }
        })
    }

    /// Key under which this team lives in the alias dictionary.
    pub fn identity(&self) -> String {
        render_identity(&self.fname, &self.tokens)
    }
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

fn strip_state(fname: &str, code: &str) -> String {
    match TRAILING_STATE_RE.captures(fname) {
        Some(caps) if caps[1].eq_ignore_ascii_case(code) => {
            let start = caps.get(0).map_or(fname.len(), |m| m.start());
            re_strip(&fname[..start]).to_string()
        }
        _ => fname.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_loteca_team() {
        let team = Team::parse(LabelGrammar::Loteca, "BOA ESPORTE/MG").unwrap();
        assert_eq!(team.plain_name, "BOA ESPORTE");
        assert_eq!(team.fname, "boa esporte clube");
        assert_eq!(team.tokens.state, Some(State::Code("MG".into())));
        assert_eq!(team.to_string(), "BOA ESPORTE/MG");
    }

    #[test]
    fn strips_trailing_state() {
        let team = Team::parse(LabelGrammar::Betexplorer, "America MG")
            .unwrap()
            .with_state(Some(State::Code("MG".into())));
        assert_eq!(team.fname, "america mg");
        assert_eq!(team.fname_without_state(), "america");

        let team = Team::parse(LabelGrammar::Betexplorer, "Atletico-PR")
            .unwrap()
            .with_state(Some(State::Code("PR".into())));
        assert_eq!(team.fname_without_state(), "atletico");
    }

    #[test]
    fn keeps_name_when_suffix_is_another_state() {
        let team = Team::parse(LabelGrammar::Betexplorer, "America RN")
            .unwrap()
            .with_state(Some(State::Code("MG".into())));
        assert_eq!(team.fname_without_state(), "america rn");
    }

    #[test]
    fn keeps_name_without_state() {
        let team = Team::parse(LabelGrammar::Betexplorer, "Flamengo").unwrap();
        assert_eq!(team.fname_without_state(), "flamengo");

        let team = team.with_state(Some(State::Ambiguous));
        assert_eq!(team.fname_without_state(), "flamengo");
    }

    #[test]
    fn identity_includes_age_and_gender() {
        let team = Team::parse(LabelGrammar::Loteca, "F SANTOS/SP SUB-20").unwrap();
        assert_eq!(team.identity(), "santos U20 W");
    }
}
