use std::{fs::File, io, path::Path, sync::Mutex};

use anyhow::Context as _;
use tracing::Level;
use tracing_subscriber::{filter::LevelFilter, fmt, prelude::*};

fn level_from_verbosity(verbose: u8) -> Level {
    match verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

/// Sends logs to stderr, keeping stdout for program output.
pub(crate) fn init_stderr(verbose: u8) -> anyhow::Result<()> {
    let level = level_from_verbosity(verbose);
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(io::stderr))
        .with(LevelFilter::from_level(level))
        .try_init()
        .context("Failed to initialize logging")?;
    Ok(())
}

/// Sends logs to a file. Used by the terminal UI, which owns the screen.
pub(crate) fn init_file(path: &Path, verbose: u8) -> anyhow::Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create log file: {}", path.display()))?;
    let level = level_from_verbosity(verbose);
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
        .with(LevelFilter::from_level(level))
        .try_init()
        .context("Failed to initialize logging")?;
    tracing::info!(level = %level, "logging initialized");
    Ok(())
}
