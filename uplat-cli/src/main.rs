// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  uplat — upstream latency charts from JSON access logs
//
//  Input:   every <prefix>* file in a directory, one JSON record per line
//  Output:  scatter_plot.html + line_plot.html, self-contained
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};
use uplat_chart::{ChartError, RenderOutcome};
use uplat_core::config::UplatConfig;
use uplat_core::error::UplatError;
use uplat_core::reader::LogReader;

#[derive(Parser, Debug)]
#[command(name = "uplat", version, about = "Plot upstream response times from JSON access logs")]
struct Cli {
    /// Path to configuration file (optional; defaults apply when absent)
    #[arg(short, long, default_value = "uplat.yaml")]
    config: PathBuf,

    /// Directory holding the access logs
    #[arg(short, long)]
    dir: Option<PathBuf>,

    /// Directory the charts are written to (defaults to the log directory)
    #[arg(short, long)]
    out_dir: Option<PathBuf>,

    /// File name prefix of the access logs
    #[arg(short, long)]
    prefix: Option<String>,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // ── Tracing ──
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level)),
        )
        .with_target(false)
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %format!("{e:#}"), "uplat failed");
            ExitCode::from(exit_code(&e))
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    // ── Config ──
    if cli.config.exists() {
        info!(path = %cli.config.display(), "Loading config file");
    } else {
        info!(path = %cli.config.display(), "No config file found, using defaults");
    }
    let mut config = UplatConfig::load(&cli.config)?;
    apply_overrides(&mut config, &cli);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        dir = %config.input.dir.display(),
        prefix = %config.input.prefix,
        "Reading access logs"
    );

    // ── Parse ──
    let report = LogReader::from_config(&config).read_dir(&config.input.dir)?;
    let stats = &report.stats;
    info!(
        files = stats.files_read,
        skipped_files = report.skipped_files.len(),
        lines = stats.lines_read,
        samples = stats.samples,
        malformed = stats.malformed,
        incomplete = stats.incomplete,
        "Parse complete"
    );

    // ── Render ──
    let size = (config.output.width, config.output.height);
    let outcome = uplat_chart::render_all(&report.samples, config.output_dir(), size)?;
    for line in outcome_lines(&outcome) {
        println!("{line}");
    }
    Ok(())
}

/// Console lines for a render outcome. Printed unconditionally so the log
/// level never hides them.
fn outcome_lines(outcome: &RenderOutcome) -> Vec<String> {
    match outcome {
        RenderOutcome::NoData => vec!["No data to plot".to_string()],
        RenderOutcome::Written { scatter, line } => vec![
            format!("Scatter plot saved to: {}", scatter.display()),
            format!("Line plot saved to: {}", line.display()),
        ],
    }
}

/// Command-line flags win over the config file and environment.
fn apply_overrides(config: &mut UplatConfig, cli: &Cli) {
    if let Some(dir) = &cli.dir {
        config.input.dir = dir.clone();
    }
    if let Some(out) = &cli.out_dir {
        config.output.dir = Some(out.clone());
    }
    if let Some(prefix) = &cli.prefix {
        config.input.prefix = prefix.clone();
    }
}

/// 1 for config and input failures, 2 when a chart cannot be written.
fn exit_code(e: &anyhow::Error) -> u8 {
    if let Some(chart) = e.downcast_ref::<ChartError>() {
        chart.exit_code() as u8
    } else if let Some(input) = e.downcast_ref::<UplatError>() {
        input.exit_code() as u8
    } else {
        1
    }
}
