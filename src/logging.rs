//! Logging
//!
//! tracing-subscriber setup. Console output goes to stderr and is disabled
//! while the terminal UI owns the screen; file output rotates daily under
//! `~/.vtrade/logs/`.

use anyhow::{Context, Result};
use chrono::{DateTime, TimeDelta, Utc};
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

const LOG_FILE_PREFIX: &str = "vtrade";

#[derive(Debug, Clone)]
pub struct LogConfig {
    pub level: String,
    pub debug_mode: bool,
    pub console: bool,
    pub log_dir: PathBuf,
    /// Write to this file instead of the rolling directory
    pub log_file: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl LogConfig {
    pub fn new() -> Self {
        Self {
            level: "info".to_string(),
            debug_mode: false,
            console: true,
            log_dir: default_log_dir(),
            log_file: None,
        }
    }

    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }

    pub fn with_debug_mode(mut self, debug: bool) -> Self {
        self.debug_mode = debug;
        self
    }

    pub fn with_console(mut self, console: bool) -> Self {
        self.console = console;
        self
    }

    pub fn with_log_dir(mut self, dir: PathBuf) -> Self {
        self.log_dir = dir;
        self
    }

    pub fn with_log_file(mut self, file: Option<PathBuf>) -> Self {
        self.log_file = file;
        self
    }

    fn writes_file(&self) -> bool {
        self.debug_mode || self.log_file.is_some()
    }

    fn filter(&self) -> String {
        if self.debug_mode {
            "debug,vtrade_onboard=trace".to_string()
        } else {
            self.level.clone()
        }
    }
}

pub fn default_log_dir() -> PathBuf {
    crate::config::vtrade_home().join("logs")
}

/// Install the global subscriber. The returned guard flushes the file
/// writer on drop and must live as long as the program.
pub fn init_logging(config: LogConfig) -> Result<Option<WorkerGuard>> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(config.filter()));

    let (file_layer, guard) = if config.writes_file() {
        let appender = match &config.log_file {
            Some(file) => {
                let dir = file
                    .parent()
                    .filter(|p| !p.as_os_str().is_empty())
                    .unwrap_or_else(|| Path::new("."));
                std::fs::create_dir_all(dir)
                    .with_context(|| format!("Failed to create log directory: {:?}", dir))?;
                let name = file
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| format!("{LOG_FILE_PREFIX}.log"));
                tracing_appender::rolling::never(dir, name)
            }
            None => {
                std::fs::create_dir_all(&config.log_dir).with_context(|| {
                    format!("Failed to create log directory: {:?}", config.log_dir)
                })?;
                tracing_appender::rolling::daily(&config.log_dir, LOG_FILE_PREFIX)
            }
        };
        let (writer, guard) = tracing_appender::non_blocking(appender);
        let layer = fmt::layer()
            .with_target(true)
            .with_ansi(false)
            .with_writer(writer);
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    let console_layer = config.console.then(|| {
        fmt::layer()
            .with_target(false)
            .compact()
            .with_writer(std::io::stderr)
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(console_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {e}"))?;

    Ok(guard)
}

/// Remove rotated log files older than `days`. Returns how many were deleted.
pub fn cleanup_old_logs(days: u64) -> Result<usize> {
    cleanup_logs_in(&default_log_dir(), days, Utc::now())
}

fn cleanup_logs_in(dir: &Path, days: u64, now: DateTime<Utc>) -> Result<usize> {
    if !dir.exists() {
        return Ok(0);
    }

    let cutoff = i64::try_from(days)
        .ok()
        .and_then(TimeDelta::try_days)
        .and_then(|age| now.checked_sub_signed(age));
    let Some(cutoff) = cutoff else {
        return Ok(0);
    };
    let mut removed = 0;

    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if !name.starts_with(LOG_FILE_PREFIX) {
            continue;
        }

        let modified: DateTime<Utc> = entry.metadata()?.modified()?.into();
        if modified < cutoff {
            std::fs::remove_file(entry.path())?;
            removed += 1;
        }
    }

    if removed > 0 {
        tracing::debug!("Removed {} log file(s) from {:?}", removed, dir);
    }
    Ok(removed)
}

/// Log files in the rolling directory, newest first.
pub fn list_logs(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_name().to_string_lossy().starts_with(LOG_FILE_PREFIX) {
            let modified = entry.metadata()?.modified()?;
            files.push((modified, entry.path()));
        }
    }
    files.sort_by(|a, b| b.0.cmp(&a.0));
    Ok(files.into_iter().map(|(_, p)| p).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_builder() {
        let config = LogConfig::new()
            .with_debug_mode(true)
            .with_console(false)
            .with_log_dir(PathBuf::from("/tmp/x"));
        assert!(config.writes_file());
        assert!(!config.console);
        assert!(config.filter().starts_with("debug"));

        let plain = LogConfig::new().with_level("warn");
        assert!(!plain.writes_file());
        assert_eq!(plain.filter(), "warn");
    }

    #[test]
    fn test_cleanup_missing_dir() {
        let dir = TempDir::new().unwrap();
        assert_eq!(
            cleanup_logs_in(&dir.path().join("none"), 7, Utc::now()).unwrap(),
            0
        );
    }

    #[test]
    fn test_cleanup_respects_age_and_prefix() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("vtrade.2026-01-01"), "old").unwrap();
        std::fs::write(dir.path().join("other.log"), "keep").unwrap();

        // Nothing is older than 7 days yet
        assert_eq!(cleanup_logs_in(dir.path(), 7, Utc::now()).unwrap(), 0);

        // Pretend a month has passed
        let later = Utc::now() + TimeDelta::days(30);
        assert_eq!(cleanup_logs_in(dir.path(), 7, later).unwrap(), 1);
        assert!(dir.path().join("other.log").exists());
        assert!(!dir.path().join("vtrade.2026-01-01").exists());
    }

    #[test]
    fn test_list_logs_filters_prefix() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("vtrade.2026-10-01"), "a").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "b").unwrap();
        let logs = list_logs(dir.path()).unwrap();
        assert_eq!(logs.len(), 1);
        assert!(logs[0].ends_with("vtrade.2026-10-01"));
    }
}
