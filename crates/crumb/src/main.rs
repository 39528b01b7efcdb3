//! Crumb - cookie-keyed session store server
//!
//! Main entry point for the Crumb CLI.

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;

use commands::{config, start};

// ─────────────────────────────────────────────────────────────────────────────
// CLI Structure
// ─────────────────────────────────────────────────────────────────────────────

/// Crumb - cookie-keyed session store server
#[derive(Parser)]
#[command(name = "crumb")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output as JSON (for scripting)
    #[arg(long, global = true)]
    pub json: bool,

    /// Config directory (overrides CRUMB_CONFIG_DIR and the platform default)
    #[arg(long, global = true)]
    pub config_dir: Option<std::path::PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the session server
    Start(start::StartArgs),

    /// Configuration management
    Config(config::ConfigArgs),
}

// ─────────────────────────────────────────────────────────────────────────────
// Main
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let loaded = crumb_config::load_config_with_options(None, cli.config_dir.as_deref())?;

    // Console output plus an optional daily JSON log file
    let filter = if cli.verbose {
        "crumb=debug,crumb_session=debug,crumb_server=debug,crumb_config=debug,tower_http=debug,info"
    } else {
        "crumb=info,crumb_session=info,crumb_server=info,warn"
    };

    let logging = loaded.config.logging();
    let log_dir = logging
        .dir
        .clone()
        .or_else(|| {
            cli.config_dir
                .clone()
                .or_else(crumb_config::xdg_config_dir)
                .map(|d| d.join("logs"))
        })
        .unwrap_or_else(|| std::path::PathBuf::from("logs"));

    use tracing_subscriber::prelude::*;
    let (file_layer, _guard) = if logging.file {
        let file_appender = tracing_appender::rolling::daily(&log_dir, "crumb.log");
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
        let layer = tracing_subscriber::fmt::layer()
            .json()
            .with_writer(non_blocking)
            .with_filter(tracing_subscriber::EnvFilter::new(
                "crumb=trace,crumb_session=debug,crumb_server=trace,crumb_config=trace,info",
            ));
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_filter(tracing_subscriber::EnvFilter::new(filter)),
        )
        .with(file_layer)
        .init();

    for warning in &loaded.warnings {
        tracing::warn!("{}", warning);
    }

    let ctx = commands::Context {
        json_output: cli.json,
        verbose: cli.verbose,
        config_dir: cli.config_dir,
        loaded,
    };

    match cli.command {
        Commands::Start(args) => start::run(args, &ctx).await,
        Commands::Config(args) => config::run(args, &ctx).await,
    }
}
