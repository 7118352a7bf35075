use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "solofit", version, about = "SoloFit CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the configured workout
    Workout(commands::session::SessionArgs),
    /// Run the fitness evaluation
    Evaluate(commands::session::SessionArgs),
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Local profile
    Profile {
        #[command(subcommand)]
        action: commands::profile::ProfileAction,
    },
    /// Workout history, newest first
    History(commands::history::HistoryArgs),
    /// Progress statistics
    Stats(commands::stats::StatsArgs),
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("SOLOFIT_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    init_tracing();
    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Workout(args) => commands::session::run_workout(args),
        Commands::Evaluate(args) => commands::session::run_evaluation(args),
        Commands::Config { action } => commands::config::run(action),
        Commands::Profile { action } => commands::profile::run(action),
        Commands::History(args) => commands::history::run(args),
        Commands::Stats(args) => commands::stats::run(args),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
