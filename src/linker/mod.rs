//! Record linker: Loteca match id → BetExplorer match id.
//!
//! Runs a fixed list of passes from strict to loose. Each pass only sees the
//! Loteca matches still unlinked; the BetExplorer pool never shrinks. A link
//! is committed only when exactly one candidate survives, and every link
//! teaches the alias dictionary the team names it confirmed.

pub mod compare;
pub mod index;

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, info, warn};

use crate::alias::AliasDictionary;
use crate::matches::Match;
use crate::metrics::PassTracker;
use compare::TeamPoints;
use index::CandidateIndex;

/// Tolerances and thresholds of one pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PassConfig {
    pub name: &'static str,
    /// Summed goal difference allowed; `None` ignores the score.
    pub score_tolerance: Option<u32>,
    /// Calendar days allowed either way.
    pub date_tolerance: u32,
    pub min_rigid_points: u8,
    pub min_flex_points: u8,
}

/// The order matters: confident links first, so they leave the pool and
/// feed new aliases to the looser passes.
///
/// A pass with rigid 0 / flex 1 is left out on purpose: it links far too
/// many wrong matches.
pub const PASSES: &[PassConfig] = &[
    PassConfig {
        name: "a_rigid2_flex2",
        score_tolerance: Some(0),
        date_tolerance: 1,
        min_rigid_points: 2,
        min_flex_points: 2,
    },
    PassConfig {
        name: "b_rigid1_flex2",
        score_tolerance: Some(0),
        date_tolerance: 1,
        min_rigid_points: 1,
        min_flex_points: 2,
    },
    PassConfig {
        name: "c_rigid1_flex1",
        score_tolerance: Some(0),
        date_tolerance: 1,
        min_rigid_points: 1,
        min_flex_points: 1,
    },
    PassConfig {
        name: "d_rigid0_flex2",
        score_tolerance: Some(0),
        date_tolerance: 1,
        min_rigid_points: 0,
        min_flex_points: 2,
    },
    PassConfig {
        name: "e_rigid2_flex2_any_score",
        score_tolerance: None,
        date_tolerance: 1,
        min_rigid_points: 2,
        min_flex_points: 2,
    },
    PassConfig {
        name: "f_rigid0_flex2_any_score",
        score_tolerance: None,
        date_tolerance: 1,
        min_rigid_points: 0,
        min_flex_points: 2,
    },
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub betexp_id: String,
    pub pass: &'static str,
}

/// What one pass did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PassReport {
    pub name: String,
    /// Loteca matches still unlinked when the pass started.
    pub pool: usize,
    pub linked: usize,
    pub ambiguous: usize,
    pub not_found: usize,
    pub new_aliases: usize,
}

/// Result of a whole run. Partial by nature.
#[derive(Debug, Clone)]
pub struct LinkReport {
    pub links: BTreeMap<String, Link>,
    /// Loteca ids no pass could link, in input order.
    pub unmatched: Vec<String>,
    pub aliases: AliasDictionary,
}

impl LinkReport {
    pub fn matched_count(&self) -> usize {
        self.links.len()
    }

    pub fn unmatched_count(&self) -> usize {
        self.unmatched.len()
    }
}

enum Outcome {
    NotFound,
    Linked(usize),
    Ambiguous(usize),
}

pub struct Linker<'p> {
    passes: &'p [PassConfig],
}

impl Default for Linker<'static> {
    fn default() -> Self {
        Linker { passes: PASSES }
    }
}

impl<'p> Linker<'p> {
    pub fn new(passes: &'p [PassConfig]) -> Self {
        Linker { passes }
    }

    /// Link happened Loteca matches to BetExplorer matches, starting from
    /// `seed`. Both pools are read-only; the grown dictionary comes back in
    /// the report.
    pub fn link(
        &self,
        loteca: &[Match],
        betexp: &[Match],
        seed: AliasDictionary,
        tracker: &mut PassTracker,
    ) -> LinkReport {
        let mut aliases = seed;
        let mut links: BTreeMap<String, Link> = BTreeMap::new();
        let mut pool: Vec<&Match> = loteca.iter().collect();

        for pass in self.passes {
            let report = run_pass(pass, &mut pool, betexp, &mut aliases, &mut links);
            tracker.record(&report);
        }

        let unmatched: Vec<String> = pool.iter().map(|m| m.id.clone()).collect();
        info!(
            matched = links.len(),
            unmatched = unmatched.len(),
            aliases = aliases.pair_count(),
            "linking finished"
        );
        LinkReport {
            links,
            unmatched,
            aliases,
        }
    }
}

fn run_pass(
    pass: &PassConfig,
    pool: &mut Vec<&Match>,
    betexp: &[Match],
    aliases: &mut AliasDictionary,
    links: &mut BTreeMap<String, Link>,
) -> PassReport {
    let index = CandidateIndex::build(betexp);
    let mut report = PassReport {
        name: pass.name.to_string(),
        pool: pool.len(),
        ..PassReport::default()
    };
    let mut found = AliasDictionary::new();
    let mut linked: BTreeSet<&str> = BTreeSet::new();

    for &loteca in pool.iter() {
        match resolve(pass, loteca, betexp, &index, aliases) {
            Outcome::NotFound => {
                debug!(pass = pass.name, id = loteca.id.as_str(), "no candidate");
                report.not_found += 1;
            }
            Outcome::Ambiguous(n) => {
                warn!(
                    pass = pass.name,
                    id = loteca.id.as_str(),
                    home = loteca.home.raw.as_str(),
                    away = loteca.away.raw.as_str(),
                    candidates = n,
                    "several candidates; left unresolved"
                );
                report.ambiguous += 1;
            }
            Outcome::Linked(i) => {
                let betexp = &betexp[i];
                debug!(
                    pass = pass.name,
                    id = loteca.id.as_str(),
                    betexp_id = betexp.id.as_str(),
                    "linked"
                );
                for (a, b) in [(&loteca.home, &betexp.home), (&loteca.away, &betexp.away)] {
                    if !aliases.contains(&a.identity, &b.identity) {
                        found.insert(&a.identity, &b.identity);
                    }
                }
                links.insert(
                    loteca.id.clone(),
                    Link {
                        betexp_id: betexp.id.clone(),
                        pass: pass.name,
                    },
                );
                linked.insert(loteca.id.as_str());
                report.linked += 1;
            }
        }
    }

    report.new_aliases = aliases.merge(&found);
    pool.retain(|m| !linked.contains(m.id.as_str()));
    info!(
        pass = pass.name,
        pool = report.pool,
        linked = report.linked,
        ambiguous = report.ambiguous,
        not_found = report.not_found,
        new_aliases = report.new_aliases,
        "pass done"
    );
    report
}

fn resolve(
    pass: &PassConfig,
    loteca: &Match,
    betexp: &[Match],
    index: &CandidateIndex,
    aliases: &AliasDictionary,
) -> Outcome {
    let survivors: Vec<usize> = index
        .candidates(loteca, pass.score_tolerance, pass.date_tolerance)
        .into_iter()
        .filter(|&i| {
            TeamPoints::score(loteca, &betexp[i], aliases)
                .meets(pass.min_rigid_points, pass.min_flex_points)
        })
        .collect();
    match survivors.as_slice() {
        [] => Outcome::NotFound,
        [only] => Outcome::Linked(*only),
        many => Outcome::Ambiguous(many.len()),
    }
}
