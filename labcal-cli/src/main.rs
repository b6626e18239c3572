mod commands;
mod render;
mod utils;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::commands::add::AddArgs;

#[derive(Parser)]
#[command(name = "labcal")]
#[command(about = "Schedule lab experiments on shared equipment and sync them to a remote calendar")]
struct Cli {
    /// Show debug logs and every event in diffs
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Schedule a new experiment with the highest priority
    Add {
        /// Unique experiment label
        #[arg(short, long)]
        label: Option<String>,

        /// Consecutive days of daily measurements
        #[arg(long)]
        days: Option<usize>,

        /// Weekly measurements after the daily run
        #[arg(long)]
        weeks: Option<usize>,

        /// Monthly measurements after the weekly run (a number, or "end")
        #[arg(long)]
        months: Option<String>,

        /// Start date (dd/mm/yy, defaults to today)
        #[arg(short, long)]
        start: Option<String>,

        /// Single measurement on the start date
        #[arg(long, conflicts_with_all = ["days", "weeks", "months"])]
        once: bool,

        /// Do not push the new schedule to the remote
        #[arg(long)]
        no_sync: bool,
    },
    /// Remove an experiment and its remote events
    Delete {
        label: Option<String>,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        force: bool,

        /// Do not push the new schedule to the remote
        #[arg(long)]
        no_sync: bool,
    },
    /// Show experiments in priority order
    List,
    /// Push the schedule to the configured remote calendar
    Sync {
        /// Delete every synced event and upload the schedule again
        #[arg(long)]
        rebuild: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    match cli.command {
        Commands::Add {
            label,
            days,
            weeks,
            months,
            start,
            once,
            no_sync,
        } => {
            let args = AddArgs {
                label,
                days,
                weeks,
                months,
                start,
                once,
                no_sync,
            };
            commands::add::run(args, cli.verbose).await
        }
        Commands::Delete {
            label,
            force,
            no_sync,
        } => commands::delete::run(label, force, no_sync, cli.verbose).await,
        Commands::List => commands::list::run(cli.verbose),
        Commands::Sync { rebuild } => commands::sync::run(rebuild, cli.verbose).await,
    }
}
