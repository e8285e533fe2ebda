use std::{fs, path::Path};

use anyhow::{Context, Result};
use bharat_osint::cli::{
    commands::run,
    flags::{Cli, Command},
};
use clap::Parser;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const LOG_ROTATE_BYTES: u64 = 1_000_000;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let console_mode = matches!(cli.command, Command::Console { .. });
    init_tracing(&cli, console_mode)?;
    run(cli).await
}

fn init_tracing(cli: &Cli, console_mode: bool) -> Result<()> {
    let level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let log_path = Path::new(&cli.log_file);
    if let Some(parent) = log_path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating log directory {}", parent.display()))?;
    }
    if let Ok(meta) = fs::metadata(log_path) {
        if meta.len() > LOG_ROTATE_BYTES {
            let rotated = log_path.with_extension("log.1");
            let _ = fs::rename(log_path, rotated);
        }
    }
    let file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)
        .with_context(|| format!("opening log file {}", log_path.display()))?;

    let file_layer = fmt::layer()
        .with_writer(file)
        .with_ansi(false)
        .with_target(false);

    // stdout carries JSON results; the console owns the terminal.
    let stderr_layer = (!console_mode).then(|| {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(stderr_layer)
        .try_init()
        .context("initialising tracing")
}
