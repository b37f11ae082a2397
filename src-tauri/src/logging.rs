use std::{
    fs::{self, OpenOptions},
    path::{Path, PathBuf},
    sync::Mutex,
};

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::DESKTOP_ROOT_DIR_NAME;

pub fn default_desktop_root_dir() -> Option<PathBuf> {
    home::home_dir().map(|home| home.join(DESKTOP_ROOT_DIR_NAME))
}

pub fn resolve_desktop_log_path(root_dir: Option<PathBuf>, file_name: &str) -> PathBuf {
    root_dir
        .unwrap_or_else(std::env::temp_dir)
        .join("logs")
        .join(file_name)
}

/// Installs the global subscriber: stderr plus an append-only desktop log.
///
/// A log file that cannot be opened leaves the stderr layer in place.
pub fn init_logging(log_path: &Path) -> Result<(), String> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let file_layer = match open_log_file(log_path) {
        Ok(file) => Some(
            fmt::layer()
                .with_ansi(false)
                .with_target(true)
                .with_writer(Mutex::new(file)),
        ),
        Err(error) => {
            eprintln!("desktop log unavailable, logging to stderr only: {error}");
            None
        }
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true))
        .with(file_layer)
        .try_init()
        .map_err(|error| format!("Failed to install log subscriber: {error}"))
}

fn open_log_file(log_path: &Path) -> Result<fs::File, String> {
    if let Some(parent) = log_path.parent() {
        fs::create_dir_all(parent).map_err(|error| {
            format!(
                "Failed to create log directory {}: {}",
                parent.display(),
                error
            )
        })?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)
        .map_err(|error| format!("Failed to open log {}: {}", log_path.display(), error))
}

pub fn append_desktop_log(message: &str) {
    tracing::info!(target: "desktop", "{message}");
}

pub fn append_startup_log(message: &str) {
    tracing::info!(target: "startup", "{message}");
}

pub fn append_poll_log(message: &str) {
    tracing::info!(target: "poll", "{message}");
}

pub fn append_shutdown_log(message: &str) {
    tracing::info!(target: "shutdown", "{message}");
}
