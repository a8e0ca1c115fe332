//! Raw rows from both sources and their normalized form.

use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::error::LinkError;
use crate::teams::registry::TeamRegistry;
use crate::teams::{Team, Tokens};

const LOTECA_DATE_FORMAT: &str = "%Y-%m-%d";
const BETEXP_DATE_FORMATS: &[&str] = &["%d.%m.%Y", "%d/%m/%Y"];

/// One Loteca fixture as stored by the lottery scraper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LotecaRow {
    pub id: String,
    pub round: u32,
    pub game: u32,
    /// "2017-05-03"; missing when the match did not happen.
    pub date: Option<String>,
    pub team_home: String,
    pub team_away: String,
    pub goals_home: Option<u8>,
    pub goals_away: Option<u8>,
}

impl LotecaRow {
    pub fn happened(&self) -> bool {
        self.date.is_some() && self.goals_home.is_some() && self.goals_away.is_some()
    }
}

/// One BetExplorer fixture as stored by the site scraper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BetexpRow {
    pub id: String,
    pub league_category: String,
    pub league_name: String,
    /// Day first: "03.05.2017".
    pub date: String,
    pub team_home: String,
    pub team_away: String,
    /// "H:A", blank when not played.
    pub score: String,
    /// "ABN.", "POSTP.", "WO." ... or blank.
    pub score_modifier: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Score {
    pub home: u8,
    pub away: u8,
}

impl Score {
    pub fn new(home: u8, away: u8) -> Self {
        Score { home, away }
    }

    /// Goal difference summed over both teams.
    pub fn distance(&self, other: &Score) -> u32 {
        u32::from(self.home.abs_diff(other.home)) + u32::from(self.away.abs_diff(other.away))
    }

    pub fn parse(s: &str) -> Option<Self> {
        let (home, away) = s.trim().split_once(':')?;
        Some(Score {
            home: home.trim().parse().ok()?,
            away: away.trim().parse().ok()?,
        })
    }
}

/// One side of a normalized match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Side {
    pub raw: String,
    pub fname: String,
    pub tokens: Tokens,
    /// Alias dictionary identity.
    pub identity: String,
}

impl From<&Team> for Side {
    fn from(team: &Team) -> Self {
        Side {
            raw: team.raw.clone(),
            fname: team.fname.clone(),
            tokens: team.tokens.clone(),
            identity: team.identity(),
        }
    }
}

/// Source-independent match record consumed by the linker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
    pub id: String,
    pub date: NaiveDate,
    pub score: Option<Score>,
    pub home: Side,
    pub away: Side,
    pub score_modifier: Option<String>,
}

/// Normalize Loteca rows. Matches that did not happen are left out; rows
/// with an unknown team are skipped with a warning.
pub fn normalize_loteca(rows: &[LotecaRow], teams: &TeamRegistry) -> Vec<Match> {
    rows.iter()
        .filter(|row| {
            let happened = row.happened();
            if !happened {
                debug!(id = row.id.as_str(), "match did not happen; skipped");
            }
            happened
        })
        .filter_map(|row| match loteca_match(row, teams) {
            Ok(m) => Some(m),
            Err(err) => {
                warn!(id = row.id.as_str(), %err, "skipping Loteca row");
                None
            }
        })
        .collect()
}

fn loteca_match(row: &LotecaRow, teams: &TeamRegistry) -> Result<Match, LinkError> {
    let (Some(raw_date), Some(home), Some(away)) = (&row.date, row.goals_home, row.goals_away)
    else {
        return Err(LinkError::BadScore {
            id: row.id.clone(),
            score: String::new(),
        });
    };
    let date = NaiveDate::parse_from_str(raw_date.trim(), LOTECA_DATE_FORMAT).map_err(|_| {
        LinkError::BadDate {
            id: row.id.clone(),
            date: raw_date.clone(),
        }
    })?;
    Ok(Match {
        id: row.id.clone(),
        date,
        score: Some(Score::new(home, away)),
        home: Side::from(teams.require(&row.team_home)?),
        away: Side::from(teams.require(&row.team_away)?),
        score_modifier: None,
    })
}

/// Normalize BetExplorer rows, played or not. Unreadable rows are skipped
/// with a warning.
pub fn normalize_betexp(rows: &[BetexpRow], teams: &TeamRegistry) -> Vec<Match> {
    rows.iter()
        .filter_map(|row| match betexp_match(row, teams) {
            Ok(m) => Some(m),
            Err(err) => {
                warn!(id = row.id.as_str(), %err, "skipping BetExplorer row");
                None
            }
        })
        .collect()
}

fn betexp_match(row: &BetexpRow, teams: &TeamRegistry) -> Result<Match, LinkError> {
    let date = parse_betexp_date(&row.date).ok_or_else(|| LinkError::BadDate {
        id: row.id.clone(),
        date: row.date.clone(),
    })?;
    let score = match row.score.trim() {
        "" => None,
        s => Some(Score::parse(s).ok_or_else(|| LinkError::BadScore {
            id: row.id.clone(),
            score: row.score.clone(),
        })?),
    };
    let modifier = row.score_modifier.trim();
    Ok(Match {
        id: row.id.clone(),
        date,
        score,
        home: Side::from(teams.require(&row.team_home)?),
        away: Side::from(teams.require(&row.team_away)?),
        score_modifier: (!modifier.is_empty()).then(|| modifier.to_string()),
    })
}

fn parse_betexp_date(s: &str) -> Option<NaiveDate> {
    BETEXP_DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s.trim(), fmt).ok())
}
