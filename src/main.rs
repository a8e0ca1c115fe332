use std::path::PathBuf;
use std::time::Instant;

use anyhow::Result;
use clap::{Parser, Subcommand};
use itertools::Itertools;
use tracing::info;

use loteca_linker::alias::AliasDictionary;
use loteca_linker::db;
use loteca_linker::pipeline::{self, build_seed_dictionary, load_inputs, Inputs};
use loteca_linker::settings::Settings;

#[derive(Parser)]
#[command(name = "loteca_linker", about = "Link Loteca fixtures to BetExplorer matches")]
struct Cli {
    /// SQLite database (default: LOTECA_DB_PATH or data/loteca.sqlite)
    #[arg(long, global = true)]
    db: Option<PathBuf>,
    /// First Loteca round to consider
    #[arg(long, global = true)]
    start_round: Option<u32>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the rule-based alias dictionary and save it
    Seed,
    /// Run all linking passes and store links, grown aliases and pass metrics
    Link {
        /// Start from a fresh seed instead of the saved one (the saved seed is left as is)
        #[arg(long)]
        reseed: bool,
    },
    /// Show stored link counts
    Stats,
}

fn seed(settings: &Settings, inputs: &Inputs) -> Result<AliasDictionary> {
    let aliases = build_seed_dictionary(settings, inputs)?;
    let empty = aliases.iter().filter(|(_, values)| values.is_empty()).count();
    println!(
        "Seeded {} teams: {} aliases, {} not found, {} ambiguous",
        aliases.len(),
        aliases.pair_count(),
        empty,
        aliases.ambiguous().count()
    );
    for (key, values) in aliases.ambiguous() {
        println!("  {}: {}", key, values.iter().join(" | "));
    }
    Ok(aliases)
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .try_init();
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let mut settings = Settings::load()?;
    if let Some(db) = cli.db {
        settings.db_path = db;
    }
    if let Some(round) = cli.start_round {
        settings.start_round = round;
    }
    info!(?settings, "settings loaded");

    let t0 = Instant::now();
    let conn = db::connect(&settings.db_path)?;

    match cli.command {
        Commands::Seed => {
            let inputs = load_inputs(&conn, settings.start_round)?;
            println!(
                "Loaded {} Loteca rows (round >= {}) and {} BetExplorer rows",
                inputs.loteca_rows.len(),
                settings.start_round,
                inputs.betexp_rows.len()
            );
            let aliases = seed(&settings, &inputs)?;
            aliases.save(&settings.aliases_path)?;
            println!("Saved alias dictionary to {:?}", settings.aliases_path);
        }
        Commands::Link { reseed } => {
            let run = pipeline::link(&conn, &settings, reseed)?;
            println!(
                "Linked {} played Loteca matches against {} BetExplorer matches",
                run.loteca, run.betexp
            );
            for pass in &run.passes {
                println!(
                    "  {:<26} pool {:>6} | linked {:>6} | ambiguous {:>5} | not found {:>6} | new aliases {:>4}",
                    pass.name, pass.pool, pass.linked, pass.ambiguous, pass.not_found, pass.new_aliases
                );
            }
            println!(
                "Run {}: {} matched, {} unmatched ({} links saved)",
                run.run_id,
                run.report.matched_count(),
                run.report.unmatched_count(),
                run.saved
            );
            println!("Saved grown aliases to {:?}", settings.grown_aliases_path);
        }
        Commands::Stats => {
            let s = db::get_stats(&conn, settings.start_round)?;
            println!("Loteca:      {} ({} played)", s.loteca, s.happened);
            println!("BetExplorer: {}", s.betexp);
            println!("Linked:      {}", s.linked);
            println!("Unlinked:    {}", s.happened.saturating_sub(s.linked));
            println!("Last run:    {}", s.last_run.as_deref().unwrap_or("-"));
            if !s.per_pass.is_empty() {
                println!(
                    "Per pass:    {}",
                    s.per_pass.iter().map(|(pass, n)| format!("{pass}={n}")).join(", ")
                );
            }
        }
    }

    info!(elapsed_ms = t0.elapsed().as_millis() as u64, "done");
    Ok(())
}
