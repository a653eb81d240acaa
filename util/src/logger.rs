//! Tracing subscriber setup.
//!
//! Binaries embedding the grading engine call [`init_logging_from_config`] once at
//! startup and hold on to the returned guard; dropping it flushes the file appender.

use std::{fs, io, path::Path};

use tracing::{Subscriber, info};
use tracing_appender::{non_blocking::WorkerGuard, rolling};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::config;

const DEFAULT_FILTER: &str = "exam_marker=info";

/// Parses `log_level` as an `EnvFilter` directive, falling back to `exam_marker=info`.
fn env_filter(log_level: &str) -> EnvFilter {
    EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Builds, without installing, a subscriber with a daily-rolling file layer in
/// `log_dir` plus stdout when `log_to_stdout` is set.
pub fn build_subscriber(
    log_dir: &Path,
    log_file: &str,
    log_level: &str,
    log_to_stdout: bool,
) -> io::Result<(impl Subscriber + Send + Sync + 'static + use<>, WorkerGuard)> {
    fs::create_dir_all(log_dir)?;

    let file_appender = rolling::daily(log_dir, log_file);
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = fmt::layer()
        .with_writer(file_writer)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true);

    let stdout_layer = log_to_stdout.then(|| {
        fmt::layer()
            .with_writer(io::stdout)
            .with_ansi(true)
            .with_target(true)
    });

    let subscriber = tracing_subscriber::registry()
        .with(env_filter(log_level))
        .with(file_layer)
        .with(stdout_layer);

    Ok((subscriber, guard))
}

/// Installs the global subscriber. Fails if one is already set.
pub fn init_logging(
    log_dir: &Path,
    log_file: &str,
    log_level: &str,
    log_to_stdout: bool,
) -> io::Result<WorkerGuard> {
    let (subscriber, guard) = build_subscriber(log_dir, log_file, log_level, log_to_stdout)?;
    subscriber
        .try_init()
        .map_err(|e| io::Error::other(e.to_string()))?;
    Ok(guard)
}

/// [`build_subscriber`] with file name, filter and stdout switch read from [`config`].
pub fn subscriber_from_config(
    log_dir: &Path,
) -> io::Result<(impl Subscriber + Send + Sync + 'static + use<>, WorkerGuard)> {
    build_subscriber(
        log_dir,
        &config::log_file(),
        &config::log_level(),
        config::log_to_stdout(),
    )
}

/// Installs the global subscriber from [`config`] and logs the project name.
pub fn init_logging_from_config(log_dir: &Path) -> io::Result<WorkerGuard> {
    let guard = init_logging(
        log_dir,
        &config::log_file(),
        &config::log_level(),
        config::log_to_stdout(),
    )?;
    info!(project = %config::project_name(), "logging initialised");
    Ok(guard)
}

/// Routes events to the test harness' captured output. Safe to call from every test.
pub fn init_test_logging() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use serial_test::serial;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn log_files(dir: &Path) -> Vec<PathBuf> {
        fs::read_dir(dir)
            .unwrap()
            .map(|entry| entry.unwrap().path())
            .collect()
    }

    #[test]
    fn test_logging_init_is_idempotent() {
        init_test_logging();
        init_test_logging();
        tracing::debug!("logger initialised twice without panicking");
    }

    #[test]
    fn test_subscriber_creates_dir_and_writes_file() {
        let tmp = TempDir::new().unwrap();
        let log_dir = tmp.path().join("logs");
        let (subscriber, guard) = build_subscriber(&log_dir, "marker.log", "info", false).unwrap();
        assert!(log_dir.is_dir());

        tracing::subscriber::with_default(subscriber, || {
            tracing::info!("exam 3 opened");
            tracing::debug!("below the configured level");
        });
        drop(guard);

        let files = log_files(&log_dir);
        assert_eq!(files.len(), 1);
        let name = files[0].file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("marker.log"));
        let contents = fs::read_to_string(&files[0]).unwrap();
        assert!(contents.contains("exam 3 opened"));
        assert!(!contents.contains("below the configured level"));
    }

    #[test]
    #[serial]
    fn test_subscriber_from_config_uses_configured_file_and_level() {
        let tmp = TempDir::new().unwrap();
        AppConfig::set_log_file("grading.log");
        AppConfig::set_log_level("warn");

        let (subscriber, guard) = subscriber_from_config(tmp.path()).unwrap();
        tracing::subscriber::with_default(subscriber, || {
            tracing::warn!("stale label in stored record");
            tracing::info!("routine save");
        });
        drop(guard);
        AppConfig::reset();

        let files = log_files(tmp.path());
        assert_eq!(files.len(), 1);
        let name = files[0].file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("grading.log"));
        let contents = fs::read_to_string(&files[0]).unwrap();
        assert!(contents.contains("stale label in stored record"));
        assert!(!contents.contains("routine save"));
    }
}
