use clap::{Parser, Subcommand};
use tasktrack_core::Config;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "tasktrack", version, about = "Tasktrack CLI")]
struct Cli {
    /// User to act as (defaults to config `user.default_id`)
    #[arg(long, global = true)]
    user: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Task management
    Task {
        #[command(subcommand)]
        action: commands::task::TaskAction,
    },
    /// Completion streak
    Streak {
        #[command(subcommand)]
        action: commands::streak::StreakAction,
    },
    /// Productivity and task statistics
    Stats {
        #[command(subcommand)]
        action: commands::stats::StatsAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

/// Log to stderr so stdout stays machine-readable. `TASKTRACK_LOG` overrides
/// the configured level.
fn init_logging(config: &Config) {
    let filter = std::env::var("TASKTRACK_LOG")
        .ok()
        .and_then(|directive| EnvFilter::try_new(directive).ok())
        .or_else(|| EnvFilter::try_new(&config.logging.level).ok())
        .unwrap_or_else(|| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    let config = Config::load_or_default();
    init_logging(&config);

    let ctx = commands::Context {
        user: cli.user.unwrap_or_else(|| config.user.default_id.clone()),
        config,
    };

    let result = match cli.command {
        Commands::Task { action } => commands::task::run(action, &ctx),
        Commands::Streak { action } => commands::streak::run(action, &ctx),
        Commands::Stats { action } => commands::stats::run(action, &ctx),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        tracing::debug!(error = ?e, "command failed");
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
