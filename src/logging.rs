use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::sync::Mutex;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Route `tracing` events to the file named by `FEED_DASH_LOG`.
///
/// The terminal belongs to the UI, so nothing is installed when the variable
/// is unset. `FEED_DASH_LOG_LEVEL` takes an `EnvFilter` directive (default
/// `info`).
pub fn init_logging() -> Result<()> {
    let Ok(path) = std::env::var("FEED_DASH_LOG") else {
        return Ok(());
    };
    if path.trim().is_empty() {
        return Ok(());
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("opening log file {path}"))?;
    let filter = EnvFilter::try_from_env("FEED_DASH_LOG_LEVEL")
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
        .try_init()
        .with_context(|| "installing tracing subscriber")?;
    tracing::info!(log = %path, "logging initialised");
    Ok(())
}
