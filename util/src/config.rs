//! Global application configuration manager.
//!
//! `AppConfig` is a lazily initialized, globally accessible singleton containing
//! runtime configuration values loaded from `.env` and environment variables.
//! It provides thread-safe access, plus mutation for tests and runtime overrides.

use std::env;
use std::sync::{OnceLock, RwLock, RwLockReadGuard};

/// Complete process configuration for the grading engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub project_name: String,
    pub log_level: String,
    pub log_file: String,
    pub log_to_stdout: bool,
    pub storage_root: String,
}

static CONFIG_INSTANCE: OnceLock<RwLock<AppConfig>> = OnceLock::new();

impl AppConfig {
    /// Loads the configuration from `.env` and environment variables.
    ///
    /// Every field has a default, so loading never fails.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            project_name: env::var("PROJECT_NAME").unwrap_or_else(|_| "exam-marker".into()),
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "exam_marker=info".into()),
            log_file: env::var("LOG_FILE").unwrap_or_else(|_| "marker.log".into()),
            log_to_stdout: env::var("LOG_TO_STDOUT")
                .map(|v| v.eq_ignore_ascii_case("true"))
                .unwrap_or(false),
            storage_root: env::var("STORAGE_ROOT").unwrap_or_else(|_| "data".into()),
        }
    }

    fn lock() -> &'static RwLock<AppConfig> {
        CONFIG_INSTANCE.get_or_init(|| RwLock::new(AppConfig::from_env()))
    }

    /// Returns a shared reference to the global configuration.
    pub fn global() -> RwLockReadGuard<'static, AppConfig> {
        Self::lock().read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Reloads the configuration from the environment, dropping any overrides.
    pub fn reset() {
        let mut guard = Self::lock()
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = AppConfig::from_env();
    }

    fn set_field<F>(setter: F)
    where
        F: FnOnce(&mut AppConfig),
    {
        let mut guard = Self::lock()
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        setter(&mut guard);
    }

    pub fn set_project_name(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.project_name = value.into());
    }

    pub fn set_log_level(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.log_level = value.into());
    }

    pub fn set_log_file(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.log_file = value.into());
    }

    pub fn set_log_to_stdout(value: bool) {
        AppConfig::set_field(|cfg| cfg.log_to_stdout = value);
    }

    pub fn set_storage_root(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.storage_root = value.into());
    }
}

// --- Free accessors ---

pub fn project_name() -> String {
    AppConfig::global().project_name.clone()
}

pub fn log_level() -> String {
    AppConfig::global().log_level.clone()
}

pub fn log_file() -> String {
    AppConfig::global().log_file.clone()
}

pub fn log_to_stdout() -> bool {
    AppConfig::global().log_to_stdout
}

pub fn storage_root() -> String {
    AppConfig::global().storage_root.clone()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn setters_override_and_reset_restores() {
        AppConfig::set_storage_root("/tmp/override-root");
        AppConfig::set_log_to_stdout(true);
        assert_eq!(storage_root(), "/tmp/override-root");
        assert!(log_to_stdout());

        unsafe {
            env::remove_var("STORAGE_ROOT");
            env::remove_var("LOG_TO_STDOUT");
        }
        AppConfig::reset();
        assert_eq!(storage_root(), "data");
        assert!(!log_to_stdout());
    }

    #[test]
    #[serial]
    fn storage_root_read_from_env_on_reset() {
        unsafe {
            env::set_var("STORAGE_ROOT", "/srv/marks");
        }
        AppConfig::reset();
        assert_eq!(storage_root(), "/srv/marks");

        unsafe {
            env::remove_var("STORAGE_ROOT");
        }
        AppConfig::reset();
    }
}
