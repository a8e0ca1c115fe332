//! Reverse indexes over the BetExplorer pool, rebuilt once per pass.

use std::collections::{BTreeSet, HashMap};

use chrono::{Days, NaiveDate};
use itertools::Itertools;

use crate::matches::{Match, Score};

pub struct CandidateIndex {
    by_date: HashMap<NaiveDate, Vec<usize>>,
    by_score: HashMap<Score, Vec<usize>>,
}

impl CandidateIndex {
    pub fn build(pool: &[Match]) -> Self {
        let mut by_date: HashMap<NaiveDate, Vec<usize>> = HashMap::new();
        let mut by_score: HashMap<Score, Vec<usize>> = HashMap::new();
        for (i, m) in pool.iter().enumerate() {
            by_date.entry(m.date).or_default().push(i);
            if let Some(score) = m.score {
                by_score.entry(score).or_default().push(i);
            }
        }
        CandidateIndex { by_date, by_score }
    }

    /// Pool positions within `date_tolerance` days and, when a tolerance is
    /// given, within `score_tolerance` goals of `target`. Ascending order.
    pub fn candidates(
        &self,
        target: &Match,
        score_tolerance: Option<u32>,
        date_tolerance: u32,
    ) -> Vec<usize> {
        let by_date: BTreeSet<usize> = dates_around(target.date, date_tolerance)
            .filter_map(|d| self.by_date.get(&d))
            .flatten()
            .copied()
            .collect();

        let (Some(tolerance), Some(score)) = (score_tolerance, target.score) else {
            return by_date.into_iter().collect();
        };
        let by_score: BTreeSet<usize> = scores_around(score, tolerance)
            .iter()
            .filter_map(|s| self.by_score.get(s))
            .flatten()
            .copied()
            .collect();
        by_date.intersection(&by_score).copied().collect()
    }
}

fn dates_around(date: NaiveDate, tolerance: u32) -> impl Iterator<Item = NaiveDate> {
    let days = Days::new(u64::from(tolerance));
    let first = date.checked_sub_days(days).unwrap_or(date);
    let last = date.checked_add_days(days).unwrap_or(date);
    first.iter_days().take_while(move |d| *d <= last)
}

/// Every score whose summed goal difference from `score` is at most `tolerance`.
fn scores_around(score: Score, tolerance: u32) -> Vec<Score> {
    let by = u8::try_from(tolerance).unwrap_or(u8::MAX);
    let spread = |goals: u8| goals.saturating_sub(by)..=goals.saturating_add(by);
    spread(score.home)
        .cartesian_product(spread(score.away))
        .map(|(home, away)| Score::new(home, away))
        .filter(|s| s.distance(&score) <= tolerance)
        .collect()
}
