//! Log setup shared by the add-in and the CLI.
//!
//! WPS gives the add-in no console, so the daily rolling file under the
//! per-user log directory is always written; stdout is mirrored only when
//! `logging.stdout` is set.

use crate::{config::LoggingConfig, paths::AppDirs, VERSION};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use thiserror::Error;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::writer::{BoxMakeWriter, MakeWriterExt};
use tracing_subscriber::{fmt, EnvFilter};

const DEFAULT_LOG_FILE: &str = "wps-zotero.log";

/// Environment variable that replaces the configured level with a full
/// filter directive, e.g. `WPS_ZOTERO_LOG=wps_zotero_addin=trace`.
pub const LOG_ENV_VAR: &str = "WPS_ZOTERO_LOG";

/// Keeps the non-blocking file writer flushing; hold it for the whole session.
pub struct LoggingGuard {
    _file_guard: WorkerGuard,
    log_dir: PathBuf,
    installed: bool,
}

impl LoggingGuard {
    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }

    /// `false` when an earlier load in this process already owns the global
    /// subscriber; events then keep flowing to that one.
    pub fn is_installed(&self) -> bool {
        self.installed
    }
}

pub fn init_logging(config: &LoggingConfig, dirs: &AppDirs) -> Result<LoggingGuard, LoggingError> {
    let log_dir = dirs.log_dir().to_path_buf();
    fs::create_dir_all(&log_dir).map_err(|source| LoggingError::CreateDirectory {
        path: log_dir.clone(),
        source,
    })?;

    let filter = build_filter(config)?;
    let file_stem = config
        .file_name
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .unwrap_or(DEFAULT_LOG_FILE);
    prune_rotated_logs(&log_dir, file_stem, config.max_log_files.max(1))?;

    let (file_writer, file_guard) =
        tracing_appender::non_blocking(tracing_appender::rolling::daily(&log_dir, file_stem));
    let writer = if config.stdout {
        BoxMakeWriter::new(std::io::stdout.and(file_writer))
    } else {
        BoxMakeWriter::new(file_writer)
    };

    let installed = match fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(config.stdout)
        .with_writer(writer)
        .try_init()
    {
        Ok(()) => true,
        Err(err) => {
            tracing::debug!(error = %err, "Tracing subscriber already installed");
            false
        }
    };

    tracing::info!(
        version = VERSION,
        log_dir = %log_dir.display(),
        file = file_stem,
        "Logging initialised"
    );

    Ok(LoggingGuard {
        _file_guard: file_guard,
        log_dir,
        installed,
    })
}

fn build_filter(config: &LoggingConfig) -> Result<EnvFilter, LoggingError> {
    let directive = match std::env::var(LOG_ENV_VAR) {
        Ok(value) if !value.trim().is_empty() => value,
        _ => config.level.as_filter_directive().to_string(),
    };
    EnvFilter::try_new(&directive).map_err(|source| LoggingError::ParseLevel {
        level: directive,
        source,
    })
}

/// Delete the oldest `<file_stem>*` files so at most `keep` remain.
fn prune_rotated_logs(dir: &Path, file_stem: &str, keep: usize) -> Result<(), LoggingError> {
    let listing = fs::read_dir(dir).map_err(|source| LoggingError::ReadDir {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut logs: Vec<(SystemTime, PathBuf)> = Vec::new();
    for entry in listing.flatten() {
        if !entry.file_name().to_string_lossy().starts_with(file_stem) {
            continue;
        }
        if let Ok(modified) = entry.metadata().and_then(|meta| meta.modified()) {
            logs.push((modified, entry.path()));
        }
    }

    // Newest first; everything past `keep` goes.
    logs.sort_by(|a, b| b.0.cmp(&a.0));
    for (_, path) in logs.into_iter().skip(keep) {
        fs::remove_file(&path).map_err(|source| LoggingError::Cleanup { path, source })?;
    }
    Ok(())
}

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("failed to create log directory {path}: {source}")]
    CreateDirectory {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid log filter {level}: {source}")]
    ParseLevel {
        level: String,
        source: tracing_subscriber::filter::ParseError,
    },
    #[error("failed to list log directory {path}: {source}")]
    ReadDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to remove old log file {path}: {source}")]
    Cleanup {
        path: PathBuf,
        source: std::io::Error,
    },
}
