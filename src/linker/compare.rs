//! Team-side comparison between a Loteca and a BetExplorer match.

use std::collections::BTreeSet;

use crate::alias::AliasDictionary;
use crate::matches::{Match, Side};
use crate::teams::format::is_word_char;

/// Pieces this short are organisational noise ("ec", "fc", "sc").
const MIN_PIECE_LEN: usize = 3;

/// Rigid: the pair is already a confirmed alias.
pub fn rigid_match(loteca: &Side, betexp: &Side, aliases: &AliasDictionary) -> bool {
    aliases.contains(&loteca.identity, &betexp.identity)
}

/// Flex: one name's word pieces contain the other's. Age and gender must
/// agree exactly before names are even looked at.
pub fn flex_match(a: &Side, b: &Side) -> bool {
    if a.tokens.under_age != b.tokens.under_age || a.tokens.women != b.tokens.women {
        return false;
    }
    let (pa, pb) = (pieces(&a.fname), pieces(&b.fname));
    !pa.is_empty() && !pb.is_empty() && (pa.is_subset(&pb) || pb.is_subset(&pa))
}

fn pieces(fname: &str) -> BTreeSet<&str> {
    fname
        .split(|c: char| !is_word_char(c))
        .filter(|p| p.chars().count() >= MIN_PIECE_LEN)
        .collect()
}

/// Evidence that two matches were played by the same teams.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TeamPoints {
    pub rigid: u8,
    pub flex: u8,
}

impl TeamPoints {
    pub fn score(loteca: &Match, betexp: &Match, aliases: &AliasDictionary) -> Self {
        let mut points = TeamPoints::default();
        for (a, b) in [(&loteca.home, &betexp.home), (&loteca.away, &betexp.away)] {
            if rigid_match(a, b, aliases) {
                points.rigid += 1;
                points.flex += 1;
            } else if flex_match(a, b) {
                points.flex += 1;
            }
        }
        points
    }

    pub fn meets(&self, min_rigid: u8, min_flex: u8) -> bool {
        self.rigid >= min_rigid && self.flex >= min_flex
    }
}
