//! `limwatch`: terminal dashboard for a rate-limiting service.
//!
//! Built on [ratatui](https://ratatui.rs) with live data polled from the
//! limiter's telemetry API via `limwatch-core`. Screens are navigable
//! via number keys (1-4): Overview, Top Clients, Blocked IPs, and Config.
//!
//! Logs are written to a file (default `/tmp/limwatch.log`) to avoid
//! corrupting the terminal UI.
//!
//! Entry point: CLI argument parsing, tracing setup, panic hooks, and app launch.

mod action;
mod app;
mod component;
mod event;
mod poll_bridge;
mod screen;
mod screens;
mod theme;
mod tui;

use std::path::PathBuf;

use clap::Parser;
use color_eyre::eyre::{Result, eyre};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use limwatch_api::LimiterClient;

use crate::app::App;

/// Terminal dashboard for monitoring and managing a rate limiter.
#[derive(Parser, Debug)]
#[command(name = "limwatch", version, about)]
struct Cli {
    /// Limiter base URL (e.g., http://192.168.1.1:5000)
    #[arg(short = 'u', long, env = "LIMWATCH_API_URL")]
    api_url: Option<String>,

    /// Log file path (defaults to /tmp/limwatch.log)
    #[arg(long, default_value = "/tmp/limwatch.log")]
    log_file: PathBuf,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Set up file-based tracing. We MUST NOT log to stdout/stderr; that would
/// corrupt the TUI output. Returns a guard that must be held for the
/// lifetime of the application to ensure logs are flushed.
fn setup_tracing(cli: &Cli) -> WorkerGuard {
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "limwatch={log_level},limwatch_core={log_level},limwatch_api={log_level}"
        ))
    });

    let log_dir = cli
        .log_file
        .parent()
        .unwrap_or(std::path::Path::new("/tmp"));
    let log_filename = cli
        .log_file
        .file_name()
        .unwrap_or(std::ffi::OsStr::new("limwatch.log"));

    let file_appender = tracing_appender::rolling::never(log_dir, log_filename);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true),
        )
        .init();

    guard
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Install panic/error hooks BEFORE entering the terminal
    tui::install_hooks()?;

    // Tracing to file; hold the guard so logs flush on exit
    let _log_guard = setup_tracing(&cli);

    // Config file + env, with the CLI flag taking priority
    let mut config = limwatch_config::load_config_or_default();
    if let Some(api_url) = &cli.api_url {
        config.api_url.clone_from(api_url);
    }

    let base_url = config
        .base_url()
        .map_err(|e| eyre!("invalid limiter URL: {e}"))?;
    let client = LimiterClient::new(base_url, &config.transport())
        .map_err(|e| eyre!("failed to build API client: {e}"))?;

    info!(url = %config.api_url, "starting limwatch");

    let mut app = App::new(client, config);
    app.run().await?;

    Ok(())
}
