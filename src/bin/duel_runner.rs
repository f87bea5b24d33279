//! Headless Duel Runner
//!
//! Runs AI vs AI duels from a data directory and prints the result as JSON
//! or text. `--batch N` runs N seeds in parallel and prints a tally.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use serde::Serialize;

use duel_chronicle::battle::{
    run_batch, BatchReport, BatchSpec, BattleEvent, BattleSession, BattleSummary,
};
use duel_chronicle::content::load_resources;
use duel_chronicle::core::{load_config, BattleConfig, ChronicleError, FighterId, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Json,
    Text,
}

/// Headless Duel Runner - AI vs AI duels with narrated logs
#[derive(Parser, Debug)]
#[command(name = "duel_runner")]
#[command(about = "Run AI vs AI duels and print the narrated result")]
struct Args {
    /// Directory holding roster.toml, narrative.toml and friends
    #[arg(long, default_value = "data")]
    data_dir: PathBuf,

    /// Battle config file (defaults to <data-dir>/battle.toml when present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Left fighter id
    #[arg(long, default_value = "zuko")]
    left: String,

    /// Right fighter id
    #[arg(long, default_value = "azula")]
    right: String,

    /// Environment id
    #[arg(long, default_value = "agni_kai_courtyard")]
    environment: String,

    /// Random seed for deterministic runs (overrides the config)
    #[arg(long)]
    seed: Option<u64>,

    /// Turn limit (overrides the config)
    #[arg(long)]
    max_turns: Option<u32>,

    /// Run this many battles on consecutive seeds and print a tally
    #[arg(long)]
    batch: Option<usize>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    format: OutputFormat,

    /// Print the narrated log to stderr and enable debug logging
    #[arg(long, short = 'v')]
    verbose: bool,
}

/// JSON output for a single battle
#[derive(Serialize)]
struct DuelOutput<'a> {
    summary: &'a BattleSummary,
    log: &'a [BattleEvent],
}

/// JSON output for a batch
#[derive(Serialize)]
struct BatchOutput {
    report: BatchReport,
    summaries: Vec<BattleSummary>,
    errors: Vec<String>,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let level = if args.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("duel_runner failed: {}", e);
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn resolve_config(args: &Args) -> Result<BattleConfig> {
    let default_path = args.data_dir.join("battle.toml");
    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None if default_path.exists() => load_config(&default_path)?,
        None => BattleConfig::default(),
    };

    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if let Some(max_turns) = args.max_turns {
        config.max_turns = max_turns;
    }
    config.validate().map_err(ChronicleError::InvalidConfig)?;
    Ok(config)
}

fn run(args: &Args) -> Result<()> {
    let resources = load_resources(Path::new(&args.data_dir))?;
    let config = resolve_config(args)?;
    let left = FighterId::new(args.left.as_str());
    let right = FighterId::new(args.right.as_str());

    if let Some(count) = args.batch {
        let spec = BatchSpec {
            left,
            right,
            environment: args.environment.clone(),
            seeds: (0..count as u64).map(|i| config.seed.wrapping_add(i)).collect(),
            config,
        };
        let results = run_batch(&resources, &spec);
        let report = BatchReport::tally(&spec, &results);
        let mut summaries = Vec::new();
        let mut errors = Vec::new();
        for result in results {
            match result {
                Ok(summary) => summaries.push(summary),
                Err(e) => errors.push(e.to_string()),
            }
        }
        return print_batch(args.format, &spec, BatchOutput { report, summaries, errors });
    }

    let mut session =
        BattleSession::from_roster(&resources, config, &left, &right, &args.environment)?;
    let summary = session
        .run_to_completion()?
        .with_seed(session.config().seed);
    let log = &session.state().log;

    if args.verbose {
        for event in log {
            eprintln!("  [{}] {:?}: {}", event.turn, event.kind, event.narrative);
        }
    }

    match args.format {
        OutputFormat::Json => {
            let output = DuelOutput {
                summary: &summary,
                log,
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Text => print_duel_text(&summary, log),
    }
    Ok(())
}

fn print_duel_text(summary: &BattleSummary, log: &[BattleEvent]) {
    println!("Duel Result");
    println!("===========");
    for event in log {
        println!("[turn {:>2}] {}", event.turn, event.narrative);
    }
    println!();
    println!("Outcome: {:?}", summary.outcome);
    if let (Some(winner), Some(loser)) = (&summary.winner, &summary.loser) {
        println!("Winner: {} (over {})", winner, loser);
    }
    if let Some(reason) = summary.stalemate_reason {
        println!("Stalemate: {:?}", reason);
    }
    println!("Turns: {}", summary.turns);
    for fighter in &summary.fighters {
        println!(
            "  {}: {}/{} HP, {} chi, {:?}, {} dealt / {} taken",
            fighter.name,
            fighter.health,
            fighter.max_health,
            fighter.energy,
            fighter.mental_state,
            fighter.stats.damage_dealt,
            fighter.stats.damage_taken
        );
    }
    for error in &summary.errors {
        println!("Error: {}", error);
    }
    if let Some(seed) = summary.seed {
        println!("Seed: {}", seed);
    }
}

fn print_batch(format: OutputFormat, spec: &BatchSpec, output: BatchOutput) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&output)?),
        OutputFormat::Text => {
            let r = &output.report;
            println!("Batch Result: {} vs {} at {}", spec.left, spec.right, spec.environment);
            println!("============");
            println!("Battles: {}", r.battles);
            println!("{} wins: {}", spec.left, r.left_wins);
            println!("{} wins: {}", spec.right, r.right_wins);
            println!("Draws: {}", r.draws);
            println!("Stalemates: {}", r.stalemates);
            println!("Aborted: {}", r.aborted);
            println!("Failed to start: {}", r.failed_to_start);
            println!("Average turns: {:.1}", r.average_turns);
            for error in &output.errors {
                println!("Error: {}", error);
            }
        }
    }
    Ok(())
}
