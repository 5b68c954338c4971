// fplsquad entry point.
//
// Startup sequence:
// 1. Parse arguments
// 2. Initialize tracing (log to file under the platform data directory)
// 3. Load config, copying defaults on first run
// 4. Run the selection and print the result

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use fplsquad_app::config;
use fplsquad_app::run::{run, RunOptions};
use fplsquad_core::cache::PoolCache;
use tracing::info;

#[derive(Parser)]
#[command(name = "fplsquad")]
#[command(about = "Pick a Fantasy Premier League squad, lineup and transfers")]
#[command(version)]
struct Args {
    /// Gameweek to select for
    #[arg(short, long)]
    gameweek: u32,

    /// Squad saved from the previous gameweek; enables the transfer scan
    #[arg(long)]
    current_squad: Option<PathBuf>,

    /// Free transfers available (overrides config)
    #[arg(long)]
    free_transfers: Option<usize>,

    /// Prediction method identifier (overrides config)
    #[arg(long)]
    prediction_method: Option<String>,

    /// Where to write the selected squad (overrides config)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    init_tracing()?;
    info!("fplsquad starting for gameweek {}", args.gameweek);

    let config = config::load_config().context("failed to load configuration")?;
    let base_dir = std::env::current_dir()?;

    let options = RunOptions {
        gameweek: args.gameweek,
        current_squad: args.current_squad,
        free_transfers: args.free_transfers,
        prediction_method: args.prediction_method,
        output: args.output,
    };
    let summary = run(&base_dir, &config, &options, &PoolCache::new())?;

    let squad = &summary.selection.squad;
    println!(
        "Gameweek {}: expected score {:.2}",
        summary.gameweek,
        summary.selection.total_score()
    );
    if let Some(substitutions) = summary.substitutions() {
        println!(
            "Transfers: {} (scanned up to {} substitutions, penalty {:.1})",
            squad.transfers.unwrap_or(0),
            substitutions,
            squad.penalty
        );
    }
    if let (Some(c), Some(vc)) = (squad.captain(), squad.vice_captain()) {
        println!(
            "Captain: {}  Vice-captain: {}",
            summary.player_label(c.id),
            summary.player_label(vc.id)
        );
    }
    println!("Squad written to {}", summary.output.display());

    info!("fplsquad finished");
    Ok(())
}

/// Initialize tracing to log to a file under the platform data directory.
fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let log_dir = match directories::ProjectDirs::from("", "", "fplsquad") {
        Some(dirs) => dirs.data_dir().join("logs"),
        None => std::env::current_dir()?.join("logs"),
    };
    std::fs::create_dir_all(&log_dir)
        .with_context(|| format!("failed to create log directory {}", log_dir.display()))?;

    let log_file = std::fs::File::create(log_dir.join("fplsquad.log"))?;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                EnvFilter::new("fplsquad=info,fplsquad_core=info,fplsquad_app=info,warn")
            }),
        )
        .with_writer(log_file)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
