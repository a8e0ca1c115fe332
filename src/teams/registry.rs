use std::collections::{BTreeMap, BTreeSet};

use rayon::prelude::*;
use tracing::{debug, warn};

use super::grammar::LabelGrammar;
use super::{State, Team};
use crate::error::LinkError;

/// State leagues on BetExplorer and the state they are played in.
pub const LEAGUE_STATES: &[(&str, &str)] = &[
    ("Campeonato Alagoano", "AL"),
    ("Campeonato Baiano", "BA"),
    ("Campeonato Brasiliense", "DF"),
    ("Campeonato Carioca", "RJ"),
    ("Campeonato Catarinense", "SC"),
    ("Campeonato Cearense", "CE"),
    ("Campeonato Gaucho", "RS"),
    ("Campeonato Goiano", "GO"),
    ("Campeonato Matogrossense", "MT"),
    ("Campeonato Mineiro", "MG"),
    ("Campeonato Paraense", "PA"),
    ("Campeonato Paranaense", "PR"),
    ("Campeonato Paulista", "SP"),
    ("Campeonato Pernambucano", "PE"),
    ("Campeonato Potiguar", "RN"),
    ("Campeonato Sergipano", "SE"),
    ("Campeonato Sul-Matogrossense", "MS"),
    ("Campeonato Paraibano", "PB"),
    ("Campeonato Maranhense", "MA"),
    ("Campeonato Piauiense", "PI"),
];

pub fn league_state(league_name: &str) -> Option<&'static str> {
    LEAGUE_STATES
        .iter()
        .find(|(league, _)| *league == league_name)
        .map(|(_, state)| *state)
}

/// Guess the state of a team from the leagues it played in.
///
/// No state league → unknown. One → that state. More → `State::Ambiguous`.
pub fn infer_state<'a, I>(label: &str, leagues: I) -> Option<State>
where
    I: IntoIterator<Item = &'a str>,
{
    let states: BTreeSet<&str> = leagues.into_iter().filter_map(league_state).collect();
    match states.len() {
        0 => None,
        1 => states.first().map(|s| State::Code(s.to_string())),
        _ => {
            warn!(team = label, ?states, "team played in leagues of several states");
            Some(State::Ambiguous)
        }
    }
}

/// Every distinct team label of one source, parsed once.
#[derive(Debug, Clone)]
pub struct TeamRegistry {
    teams: BTreeMap<String, Team>,
}

impl TeamRegistry {
    /// Build from bare labels; used for Loteca, whose labels carry their state.
    pub fn from_labels<I, S>(grammar: LabelGrammar, labels: I) -> Result<Self, LinkError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let distinct: BTreeSet<String> = labels.into_iter().map(|s| s.as_ref().to_string()).collect();
        let teams = distinct
            .into_par_iter()
            .map(|raw| Team::parse(grammar, &raw).map(|team| (raw, team)))
            .collect::<Result<BTreeMap<_, _>, _>>()?;
        debug!(?grammar, teams = teams.len(), "team registry built");
        Ok(TeamRegistry { teams })
    }

    /// Build from (label, league name) appearances, inferring each team's
    /// state from the state leagues it played in.
    pub fn from_appearances<'a, I>(grammar: LabelGrammar, appearances: I) -> Result<Self, LinkError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut leagues: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
        for (label, league) in appearances {
            leagues.entry(label).or_default().insert(league);
        }

        let mut teams = BTreeMap::new();
        for (raw, team) in Self::from_labels(grammar, leagues.keys())?.teams {
            let team = if team.tokens.country.is_none() && team.tokens.state.is_none() {
                let state = infer_state(&raw, leagues[raw.as_str()].iter().copied());
                team.with_state(state)
            } else {
                team
            };
            teams.insert(raw, team);
        }
        Ok(TeamRegistry { teams })
    }

    pub fn get(&self, raw: &str) -> Option<&Team> {
        self.teams.get(raw)
    }

    /// Look a label up, failing for this one record if it is unknown.
    pub fn require(&self, raw: &str) -> Result<&Team, LinkError> {
        self.get(raw).ok_or_else(|| LinkError::UnknownTeam {
            label: raw.to_string(),
        })
    }

    pub fn teams(&self) -> impl Iterator<Item = &Team> {
        self.teams.values()
    }

    pub fn len(&self) -> usize {
        self.teams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.teams.is_empty()
    }
}
