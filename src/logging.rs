use crate::store;
use anyhow::{Context, Result};
use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

const LOG_FILE: &str = "picam-tui.log";

/// Sends tracing output to a log file. The terminal belongs to the editor, so
/// nothing is written to stdout or stderr.
pub fn init_logging(log_file: Option<PathBuf>, verbose: u8) -> Result<PathBuf> {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("picam_tui={level},warn")));

    let path = match log_file {
        Some(path) => path,
        None => store::data_dir()?.join(LOG_FILE),
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed creating log directory {}", parent.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("failed opening log file {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .try_init()
        .map_err(|err| anyhow::anyhow!("failed installing log subscriber: {err}"))?;
    Ok(path)
}
