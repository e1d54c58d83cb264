//! Tournament CLI
//!
//! Run round-robin tournaments between UCI engines and track Elo ratings.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use uci_client::{ApplicationKind, EngineConfig, EngineSession, SearchMode};

use tournament::{
    time_search, time_searches, GameLog, MatchRunner, RoundRobin, StandingsStore, TournamentFile,
};

#[derive(Parser, Debug)]
#[command(name = "tournament", about = "Round-robin tournaments between UCI engines")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Play the tournament described in a TOML file
    Run(RunArgs),
    /// Print the standings report
    Standings {
        #[arg(long, default_value = "standings.csv")]
        standings: PathBuf,
    },
    /// Check that engines answer and time one search each
    Check(CheckArgs),
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Tournament description
    #[arg(long, short)]
    config: PathBuf,

    /// Override the number of runs
    #[arg(long)]
    runs: Option<u32>,

    /// Override the standings report path
    #[arg(long)]
    standings: Option<PathBuf>,

    /// Write every game as a JSON line to this file
    #[arg(long)]
    games_log: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct CheckArgs {
    /// Engine command line, can be repeated
    #[arg(long = "engine", required = true, num_args = 1)]
    engines: Vec<String>,

    /// Run the engines as jars
    #[arg(long)]
    jar: bool,

    /// Search depth
    #[arg(long, default_value_t = 10)]
    depth: u32,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Run(args) => run_tournament(args),
        Command::Standings { standings } => show_standings(standings),
        Command::Check(args) => check_engines(args),
    }
}

fn run_tournament(args: RunArgs) -> Result<()> {
    let mut file = TournamentFile::load(&args.config)
        .with_context(|| format!("failed to load {}", args.config.display()))?;
    if let Some(runs) = args.runs {
        file.tournament.runs = runs;
    }
    if let Some(standings) = args.standings {
        file.tournament.standings = standings;
    }
    if args.games_log.is_some() {
        file.tournament.games_log = args.games_log;
    }

    let reference = if file.needs_calibration() {
        let mut session = file
            .calibration_session()
            .context("variants use movetime_percent but no [calibration] engine is configured")?;
        let elapsed = time_search(&mut session).context("calibration search failed")?;
        println!("Calibration: {} ms for {}", elapsed.as_millis(), session.mode());
        Some(elapsed)
    } else {
        None
    };

    let sessions = file.build_sessions(reference)?;
    if sessions.len() < 2 {
        bail!("a tournament needs at least two engines, found {}", sessions.len());
    }

    let standings_path = file.tournament.standings.clone();
    let standings = StandingsStore::load_or_default(&standings_path)
        .with_context(|| format!("failed to read standings {}", standings_path.display()))?;

    let mut tournament: RoundRobin = RoundRobin::new(MatchRunner::new(file.match_config()), standings);
    tournament.set_number_of_runs(file.tournament.runs);
    if file.tournament.shuffle {
        tournament = tournament.with_shuffle(file.tournament.seed.unwrap_or_else(rand::random));
    }
    for session in sessions {
        tournament.add_participant(session);
    }

    let mut games_log = match &file.tournament.games_log {
        Some(path) => Some(GameLog::open(path).with_context(|| format!("failed to open {}", path.display()))?),
        None => None,
    };

    let pairings = tournament.next_matches();
    let total = pairings.games_per_run() * file.tournament.runs as usize;
    println!(
        "=== Round robin: {} engines, {} runs, {} games ===",
        tournament.participants().len(),
        file.tournament.runs,
        total
    );

    for (played, game) in pairings.enumerate() {
        let record = tournament.play(&game)?;
        println!(
            "[{}/{}] {} vs {}: {} ({:?})",
            played + 1,
            total,
            record.white,
            record.black,
            record.result.as_pgn(),
            record.termination
        );

        if let Some(log) = games_log.as_mut() {
            log.append(&record)?;
        }
        tournament
            .standings()
            .save(&standings_path)
            .with_context(|| format!("failed to write standings {}", standings_path.display()))?;
    }

    let standings = tournament.into_standings();
    println!();
    print!("{}", standings.render_table());
    Ok(())
}

fn show_standings(path: PathBuf) -> Result<()> {
    if !path.exists() {
        println!("No tournament data found. Run some matches first!");
        return Ok(());
    }
    let standings = StandingsStore::load(&path)
        .with_context(|| format!("failed to read standings {}", path.display()))?;
    print!("{}", standings.render_table());
    Ok(())
}

fn check_engines(args: CheckArgs) -> Result<()> {
    let kind = if args.jar {
        ApplicationKind::Jar
    } else {
        ApplicationKind::Native
    };
    let mut sessions: Vec<_> = args
        .engines
        .iter()
        .map(|command| {
            let config = EngineConfig::new(command.as_str())
                .with_kind(kind)
                .with_mode(SearchMode::Depth(args.depth))
                .without_output_log();
            EngineSession::new(config)
        })
        .collect();

    println!("Checking {} engine(s) at depth {}", sessions.len(), args.depth);
    let results = time_searches(&mut sessions);

    let mut failed = 0;
    for (session, result) in sessions.iter().zip(results) {
        match result {
            Ok(elapsed) => println!("  {:<40} {:>8} ms", session.name(), elapsed.as_millis()),
            Err(e) => {
                failed += 1;
                println!("  {:<40} FAILED: {}", session.name(), e);
            }
        }
    }
    if failed > 0 {
        bail!("{} engine(s) did not answer", failed);
    }
    Ok(())
}
