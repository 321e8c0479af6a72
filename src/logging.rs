use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter directives are read from this variable (e.g. `RX_LOG=repo_explorer=debug`)
pub const LOG_ENV: &str = "RX_LOG";

/// `<cache dir>/rx/rx.log`, or `./rx.log` when there is no cache dir
pub fn default_log_path() -> PathBuf {
    dirs::cache_dir()
        .map(|d| d.join("rx"))
        .unwrap_or_default()
        .join("rx.log")
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Log to a file; the terminal belongs to the UI.
pub fn init_tracing(path: Option<&Path>) -> Result<PathBuf> {
    let log_path = path.map(Path::to_path_buf).unwrap_or_else(default_log_path);
    if let Some(dir) = log_path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
    }
    let file = File::options()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("Failed to open log file {}", log_path.display()))?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_target(false)
                .with_writer(Mutex::new(file)),
        )
        .with(env_filter())
        .try_init()
        .map_err(|e| anyhow::anyhow!(e))?;

    Ok(log_path)
}
