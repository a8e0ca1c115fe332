//! Rigid seeding of the alias dictionary.
//!
//! Only exact, rule-based equalities count here. A Loteca team is one of:
//! - national team: no state, no country. Its name goes through the
//!   country table and must equal a BetExplorer fname.
//! - domestic team: has a state. Same state on BetExplorer, and same fname
//!   once the trailing state code is dropped on both sides.
//! - international club: has a country. BetExplorer team without a state
//!   and with the same fname.

use std::collections::{BTreeSet, HashMap};

use tracing::{debug, info, warn};

use super::country::CountryTable;
use super::grammar::render_identity;
use super::registry::TeamRegistry;
use super::{State, Team};
use crate::alias::AliasDictionary;

/// Pairs the rules cannot find, as (Loteca identity, BetExplorer identity).
const MANUAL_ALIASES: &[(&str, &str)] = &[("atletico madrid", "atl. madrid")];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TeamKind {
    National,
    Domestic,
    International,
}

pub fn classify(team: &Team) -> TeamKind {
    if team.tokens.state.is_some() {
        TeamKind::Domestic
    } else if team.tokens.country.is_some() {
        TeamKind::International
    } else {
        TeamKind::National
    }
}

/// BetExplorer teams indexed the ways the three rules look them up.
struct BetexpIndex<'a> {
    by_fname: HashMap<&'a str, Vec<&'a Team>>,
    by_state: HashMap<(String, String), Vec<&'a Team>>,
}

impl<'a> BetexpIndex<'a> {
    fn new(betexp: &'a TeamRegistry) -> Self {
        let mut by_fname: HashMap<&str, Vec<&Team>> = HashMap::new();
        let mut by_state: HashMap<(String, String), Vec<&Team>> = HashMap::new();
        for team in betexp.teams() {
            by_fname.entry(team.fname.as_str()).or_default().push(team);
            if let Some(code) = team.tokens.state.as_ref().and_then(State::code) {
                by_state
                    .entry((code.to_string(), team.fname_without_state().to_string()))
                    .or_default()
                    .push(team);
            }
        }
        BetexpIndex { by_fname, by_state }
    }

    fn same_base_team(&self, team: &Team, countries: &CountryTable) -> Vec<&'a Team> {
        match classify(team) {
            TeamKind::National => match countries.translate(&team.fname) {
                Ok(translated) => self.by_fname.get(translated).cloned().unwrap_or_default(),
                Err(err) => {
                    debug!(team = %team, %err, "national team without translation");
                    Vec::new()
                }
            },
            TeamKind::Domestic => team
                .tokens
                .state
                .as_ref()
                .and_then(State::code)
                .and_then(|code| {
                    let key = (code.to_string(), team.fname_without_state().to_string());
                    self.by_state.get(&key)
                })
                .cloned()
                .unwrap_or_default(),
            TeamKind::International => self
                .by_fname
                .get(team.fname.as_str())
                .map(|teams| {
                    teams
                        .iter()
                        .copied()
                        .filter(|b| b.tokens.state.is_none())
                        .collect()
                })
                .unwrap_or_default(),
        }
    }
}

/// Build the seed dictionary. Every Loteca team gets an entry, possibly
/// empty; values render the BetExplorer fname with the Loteca team's own
/// age and gender tokens.
pub fn build_seed(
    loteca: &TeamRegistry,
    betexp: &TeamRegistry,
    countries: &CountryTable,
) -> AliasDictionary {
    let index = BetexpIndex::new(betexp);
    let mut aliases = AliasDictionary::new();

    for team in loteca.teams() {
        let key = team.identity();
        let found: BTreeSet<String> = index
            .same_base_team(team, countries)
            .into_iter()
            .map(|b| render_identity(&b.fname, &team.tokens))
            .collect();

        aliases.touch(&key);
        for value in &found {
            aliases.insert(&key, value);
        }

        match found.len() {
            0 => info!(team = %team, "-> NOTFOUND"),
            1 => info!(team = %team, alias = ?found, "-> found"),
            _ => warn!(team = %team, aliases = ?found, "-> several BetExplorer teams"),
        }
    }

    for (key, value) in MANUAL_ALIASES {
        aliases.insert(key, value);
    }
    aliases
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::teams::grammar::LabelGrammar;

    fn countries() -> CountryTable {
        let pt = HashMap::from([
            ("BR".to_string(), "Brasil".to_string()),
            ("DE".to_string(), "Alemanha".to_string()),
        ]);
        let en = HashMap::from([
            ("BR".to_string(), "Brazil".to_string()),
            ("DE".to_string(), "Germany".to_string()),
        ]);
        CountryTable::from_locales(&pt, &en)
    }

    fn betexp() -> TeamRegistry {
        TeamRegistry::from_appearances(
            LabelGrammar::Betexplorer,
            [
                ("Brazil", "World Cup"),
                ("Germany", "World Cup"),
                ("Flamengo", "Campeonato Carioca"),
                ("Vasco da Gama", "Campeonato Carioca"),
                ("America MG", "Campeonato Mineiro"),
                ("America RN", "Campeonato Potiguar"),
                ("Boa Esporte Clube", "Campeonato Mineiro"),
                ("Juventus (Ita)", "Serie A"),
                ("Botafogo", "Campeonato Carioca"),
                ("Botafogo", "Campeonato Paulista"),
                ("Nacional (Uru)", "Primera Division"),
                ("Nacional", "Campeonato Paulista"),
                ("Nacional (Por)", "Primeira Liga"),
            ],
        )
        .unwrap()
    }

    fn loteca(labels: &[&str]) -> TeamRegistry {
        TeamRegistry::from_labels(LabelGrammar::Loteca, labels).unwrap()
    }

    #[test]
    fn classifies_teams() {
        let reg = loteca(&["BRASIL", "FLAMENGO/RJ", "JUVENTUS/ITA"]);
        assert_eq!(classify(reg.get("BRASIL").unwrap()), TeamKind::National);
        assert_eq!(classify(reg.get("FLAMENGO/RJ").unwrap()), TeamKind::Domestic);
        assert_eq!(classify(reg.get("JUVENTUS/ITA").unwrap()), TeamKind::International);
    }

    #[test]
    fn national_teams_go_through_translation() {
        let d = build_seed(&loteca(&["BRASIL", "ALEMANHA", "ATLANTIDA"]), &betexp(), &countries());
        assert!(d.contains("brasil", "brazil"));
        assert!(d.contains("alemanha", "germany"));
        assert_eq!(d.get("atlantida").map(BTreeSet::len), Some(0));
    }

    #[test]
    fn domestic_teams_need_same_state() {
        let d = build_seed(
            &loteca(&["FLAMENGO/RJ", "VASCO/RJ", "AMERICA/MG", "BOA ESPORTE/MG", "BOTAFOGO/RJ"]),
            &betexp(),
            &countries(),
        );
        assert!(d.contains("flamengo", "flamengo"));
        assert!(d.contains("vasco da gama", "vasco da gama"));
        assert_eq!(d.get("america").unwrap().len(), 1);
        assert!(d.contains("america", "america mg"));
        assert!(d.contains("boa esporte clube", "boa esporte clube"));
        // ambiguous state never equals a concrete one
        assert!(d.get("botafogo").unwrap().is_empty());
    }

    #[test]
    fn international_clubs_skip_teams_with_state() {
        let d = build_seed(&loteca(&["JUVENTUS/ITA", "NACIONAL/URU"]), &betexp(), &countries());
        assert!(d.contains("juventus", "juventus"));
        // "Nacional" (SP) has a state; both foreign Nacionals share the fname
        assert_eq!(d.get("nacional").unwrap().len(), 1);
        assert!(d.contains("nacional", "nacional"));
    }

    #[test]
    fn values_carry_loteca_tokens() {
        let d = build_seed(&loteca(&["F FLAMENGO/RJ SUB-20"]), &betexp(), &countries());
        assert!(d.contains("flamengo U20 W", "flamengo U20 W"));
    }

    #[test]
    fn manual_aliases_are_added() {
        let d = build_seed(&loteca(&["ATLÉTICO MADRID/ESP"]), &betexp(), &countries());
        assert!(d.contains("atletico madrid", "atl. madrid"));
    }

    // The same three rules, written pairwise.
    fn is_same_base_team(loteca: &Team, betexp: &Team, countries: &CountryTable) -> bool {
        match classify(loteca) {
            TeamKind::National => countries
                .translate(&loteca.fname)
                .is_ok_and(|translated| translated == betexp.fname),
            TeamKind::Domestic => {
                loteca.tokens.state.as_ref().and_then(State::code).is_some()
                    && loteca.tokens.state == betexp.tokens.state
                    && loteca.fname_without_state() == betexp.fname_without_state()
            }
            TeamKind::International => betexp.tokens.state.is_none() && loteca.fname == betexp.fname,
        }
    }

    #[test]
    fn pairwise_rule_agrees_with_index() {
        let be = betexp();
        let lt = loteca(&["BRASIL", "FLAMENGO/RJ", "AMERICA/MG", "JUVENTUS/ITA"]);
        let table = countries();
        let d = build_seed(&lt, &be, &table);
        for a in lt.teams() {
            for b in be.teams() {
                let value = render_identity(&b.fname, &a.tokens);
                assert_eq!(
                    is_same_base_team(a, b, &table),
                    d.contains(&a.identity(), &value),
                    "{a} vs {b}"
                );
            }
        }
    }
}
