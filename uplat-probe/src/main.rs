// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  uplat-probe — WebSocket smoke client
//
//  Connects, sends a greeting, prints every frame until the peer
//  closes or Ctrl-C.
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{info, warn};
use uplat_probe::config::ProbeConfig;

#[derive(Parser, Debug)]
#[command(name = "uplat-probe", version, about = "Connect to a WebSocket endpoint and print what it sends")]
struct Cli {
    /// Path to configuration file (optional; defaults apply when absent)
    #[arg(short, long, default_value = "uplat-probe.yaml")]
    config: PathBuf,

    /// WebSocket URL (ws:// or wss://)
    #[arg(short, long)]
    url: Option<String>,

    #[arg(long)]
    session_id: Option<String>,

    #[arg(long)]
    token: Option<String>,

    /// First message sent after connecting; empty disables it
    #[arg(long)]
    greeting: Option<String>,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // ── Tracing ──
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level)),
        )
        .with_target(false)
        .init();

    // ── Config ──
    if cli.config.exists() {
        info!(path = %cli.config.display(), "Loading config file");
    } else {
        info!(path = %cli.config.display(), "No config file found, using defaults");
    }
    let config = match ProbeConfig::load(&cli.config) {
        Ok(c) => c,
        Err(e) => {
            println!("ERR {e:#}");
            return ExitCode::FAILURE;
        }
    };
    let config = apply_overrides(config, cli);

    let mut stdout = std::io::stdout();
    match uplat_probe::run(&config, &mut stdout, ctrl_c()).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            println!("ERR {e}");
            ExitCode::FAILURE
        }
    }
}

/// Resolves on Ctrl-C. If the handler cannot be installed, never resolves.
async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Ctrl-C handler unavailable");
        std::future::pending::<()>().await;
    }
}

fn apply_overrides(mut config: ProbeConfig, cli: Cli) -> ProbeConfig {
    if let Some(url) = cli.url {
        config.url = url;
    }
    if cli.session_id.is_some() {
        config.session_id = cli.session_id;
    }
    if cli.token.is_some() {
        config.token = cli.token;
    }
    if let Some(greeting) = cli.greeting {
        config.greeting = greeting;
    }
    config
}
