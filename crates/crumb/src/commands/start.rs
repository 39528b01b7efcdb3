//! Start command - launches the Crumb session server.

use std::net::SocketAddr;

use anyhow::{Context as _, Result};
use clap::Args;

use crumb_config::{SessionConfig, UnknownSession};
use crumb_server::{Server, ServerConfig};
use crumb_session::Manager;

use super::Context;

/// Arguments for the start command.
///
/// CLI arguments override config file values.
#[derive(Args, Debug, Default)]
pub struct StartArgs {
    /// Port to listen on (overrides config)
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Address to bind to (overrides config)
    #[arg(short, long)]
    pub bind: Option<String>,

    /// Session cookie name (overrides config)
    #[arg(long)]
    pub cookie_name: Option<String>,

    /// Idle session lifetime in seconds (overrides config)
    #[arg(long)]
    pub max_age_secs: Option<u64>,

    /// Adopt unknown session identifiers on write instead of rejecting them
    #[arg(long)]
    pub adopt_unknown: bool,
}

/// Run the start command.
pub async fn run(args: StartArgs, ctx: &Context) -> Result<()> {
    let config = &ctx.loaded.config;

    let session = apply_session_overrides(config.session(), &args);
    let manager_config = session
        .to_manager_config()
        .context("Invalid [session] configuration")?;

    let server_section = config.server();
    let bind = args.bind.as_deref().unwrap_or(&server_section.bind);
    let port = args.port.unwrap_or(server_section.port);
    let addr = parse_bind_address(bind, port)?;

    if ctx.verbose {
        eprintln!("Bind address: {}", addr);
        eprintln!("Cookie name: {}", manager_config.cookie_name);
        eprintln!("Max age: {}s", manager_config.max_age.as_secs());
        eprintln!(
            "Sweep interval: {}s",
            manager_config.effective_sweep_interval().as_secs_f64()
        );
    }

    let manager = Manager::with_config(manager_config);
    let server_config = ServerConfig::new()
        .with_bind_address(addr)
        .with_request_logging(server_section.request_logging)
        .with_max_body_size(server_section.max_body_size);

    if ctx.json_output {
        println!(
            "{}",
            serde_json::json!({
                "status": "starting",
                "addr": addr.to_string(),
                "cookie_name": manager.config().cookie_name,
            })
        );
    } else {
        println!("Crumb listening on http://{}", addr);
    }

    Server::new(manager, server_config)
        .run_on(addr, shutdown_signal())
        .await?;

    Ok(())
}

/// Layer command-line overrides on top of the `[session]` section.
fn apply_session_overrides(mut session: SessionConfig, args: &StartArgs) -> SessionConfig {
    if let Some(ref name) = args.cookie_name {
        session.cookie_name = name.clone();
    }
    if let Some(secs) = args.max_age_secs {
        session.max_age_secs = secs;
    }
    if args.adopt_unknown {
        session.unknown_session = UnknownSession::Adopt;
    }
    session
}

fn parse_bind_address(bind: &str, port: u16) -> Result<SocketAddr> {
    format!("{}:{}", bind, port)
        .parse()
        .with_context(|| format!("Invalid bind address '{}:{}'", bind, port))
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Shutdown signal received"),
        Err(e) => {
            tracing::error!(error = %e, "Failed to listen for shutdown signal");
            std::future::pending::<()>().await;
        }
    }
}
