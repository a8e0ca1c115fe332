//! Command bodies shared by the CLI: load rows, seed aliases, link.

use anyhow::{ensure, Result};
use rusqlite::Connection;
use tracing::info;

use crate::alias::AliasDictionary;
use crate::db;
use crate::linker::{LinkReport, Linker, PassReport};
use crate::matches::{normalize_betexp, normalize_loteca, BetexpRow, LotecaRow};
use crate::metrics::{new_run_id, PassTracker};
use crate::settings::Settings;
use crate::teams::country::CountryTable;
use crate::teams::grammar::LabelGrammar;
use crate::teams::registry::TeamRegistry;
use crate::teams::seed::build_seed;

pub struct Inputs {
    pub loteca_rows: Vec<LotecaRow>,
    pub betexp_rows: Vec<BetexpRow>,
    pub loteca_teams: TeamRegistry,
    pub betexp_teams: TeamRegistry,
}

pub fn load_inputs(conn: &Connection, start_round: u32) -> Result<Inputs> {
    let loteca_rows = db::fetch_loteca(conn, start_round)?;
    let betexp_rows = db::fetch_betexp(conn)?;

    let loteca_teams = TeamRegistry::from_labels(
        LabelGrammar::Loteca,
        loteca_rows
            .iter()
            .flat_map(|r| [r.team_home.as_str(), r.team_away.as_str()]),
    )?;
    let betexp_teams = TeamRegistry::from_appearances(
        LabelGrammar::Betexplorer,
        betexp_rows.iter().flat_map(|r| {
            [
                (r.team_home.as_str(), r.league_name.as_str()),
                (r.team_away.as_str(), r.league_name.as_str()),
            ]
        }),
    )?;
    info!(
        loteca_rows = loteca_rows.len(),
        betexp_rows = betexp_rows.len(),
        loteca_teams = loteca_teams.len(),
        betexp_teams = betexp_teams.len(),
        start_round,
        "inputs loaded"
    );
    Ok(Inputs {
        loteca_rows,
        betexp_rows,
        loteca_teams,
        betexp_teams,
    })
}

pub fn build_seed_dictionary(settings: &Settings, inputs: &Inputs) -> Result<AliasDictionary> {
    let countries = CountryTable::load(&settings.countries_pt, &settings.countries_en)?;
    Ok(build_seed(&inputs.loteca_teams, &inputs.betexp_teams, &countries))
}

pub struct LinkRun {
    pub run_id: String,
    pub loteca: usize,
    pub betexp: usize,
    pub passes: Vec<PassReport>,
    pub report: LinkReport,
    pub saved: usize,
}

/// Run every pass and store links, pass metrics and the grown dictionary.
///
/// The seed is read from `aliases_path` (or built fresh when missing or
/// `reseed` is set) and is never written here, so two runs over the same
/// rows start from the same dictionary.
pub fn link(conn: &Connection, settings: &Settings, reseed: bool) -> Result<LinkRun> {
    ensure!(
        settings.grown_aliases_path != settings.aliases_path,
        "grown aliases path must differ from the seed path {:?}",
        settings.aliases_path
    );

    let inputs = load_inputs(conn, settings.start_round)?;
    let seed = if reseed || !settings.aliases_path.exists() {
        build_seed_dictionary(settings, &inputs)?
    } else {
        AliasDictionary::load(&settings.aliases_path)?
    };

    let loteca = normalize_loteca(&inputs.loteca_rows, &inputs.loteca_teams);
    let betexp = normalize_betexp(&inputs.betexp_rows, &inputs.betexp_teams);

    let mut tracker = PassTracker::new(new_run_id());
    let report = Linker::default().link(&loteca, &betexp, seed, &mut tracker);

    let saved = db::save_links(conn, tracker.run_id(), &report.links)?;
    tracker.persist(conn)?;
    report.aliases.save(&settings.grown_aliases_path)?;
    info!(path = ?settings.grown_aliases_path, pairs = report.aliases.pair_count(), "grown aliases saved");

    Ok(LinkRun {
        run_id: tracker.run_id().to_string(),
        loteca: loteca.len(),
        betexp: betexp.len(),
        passes: tracker.metrics().to_vec(),
        report,
        saved,
    })
}
