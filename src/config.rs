// src/config.rs
//! Configuration (C8): `Settings`, ambient process-wide configuration
//! distinct from the per-run `IngestionConfig` (§3, §4.8). Loaded once at
//! CLI startup: defaults, then an optional TOML file, then environment
//! overrides.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, instrument, trace, warn};

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, Default)]
pub enum ConfigSource {
    #[default]
    Default,
    ConfigFile,
    Environment,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    /// Path to the SQLite database file.
    #[serde(default = "default_db_url")]
    pub db_url: String,

    /// Default worker pool size for `import` when not overridden on the
    /// command line.
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Default logging verbosity (debug-flag count, §4.10).
    #[serde(default)]
    pub verbosity: u8,

    #[serde(skip)]
    pub config_source: ConfigSource,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            db_url: default_db_url(),
            workers: default_workers(),
            verbosity: 0,
            config_source: ConfigSource::Default,
        }
    }
}

fn default_workers() -> usize {
    5
}

fn default_db_url() -> String {
    let db_dir = match dirs::home_dir() {
        Some(home) => home.join(".config/bkmr-ingest"),
        None => match dirs::data_local_dir() {
            Some(data_dir) => data_dir.join("bkmr-ingest"),
            None => std::env::current_dir()
                .unwrap_or_else(|_| PathBuf::from("."))
                .join(".bkmr-ingest"),
        },
    };

    std::fs::create_dir_all(&db_dir).ok();

    db_dir
        .join("bookmarks.db")
        .to_str()
        .unwrap_or("./bookmarks.db")
        .to_string()
}

/// Default config file search path: `~/.config/bkmr-ingest/config.toml`.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|p| p.join(".config/bkmr-ingest/config.toml"))
}

#[instrument(level = "debug")]
pub fn load_settings(config_file: Option<&Path>) -> Settings {
    trace!("loading settings");
    let mut settings = Settings::default();

    let explicit_path = config_file.map(PathBuf::from);
    let candidate_path = explicit_path.or_else(default_config_path);

    if let Some(path) = candidate_path {
        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(text) => match toml::from_str::<Settings>(&text) {
                    Ok(mut file_settings) => {
                        file_settings.config_source = ConfigSource::ConfigFile;
                        settings = file_settings;
                    }
                    Err(e) => warn!(error = %e, path = %path.display(), "failed to parse config file"),
                },
                Err(e) => warn!(error = %e, path = %path.display(), "failed to read config file"),
            }
        } else if config_file.is_some() {
            warn!(path = %path.display(), "specified config file does not exist");
        }
    }

    apply_env_overrides(&mut settings);

    if settings.config_source == ConfigSource::Default {
        debug!("no configuration file or environment variables found, using defaults");
    }
    settings
}

fn apply_env_overrides(settings: &mut Settings) {
    let mut used_env = false;

    if let Ok(db_url) = std::env::var("BKMR_INGEST_DB_URL") {
        settings.db_url = db_url;
        used_env = true;
    }

    if let Ok(workers) = std::env::var("BKMR_INGEST_WORKERS") {
        if let Ok(workers) = workers.parse::<usize>() {
            settings.workers = workers;
            used_env = true;
        }
    }

    if let Ok(verbosity) = std::env::var("BKMR_INGEST_VERBOSITY") {
        if let Ok(verbosity) = verbosity.parse::<u8>() {
            settings.verbosity = verbosity;
            used_env = true;
        }
    }

    if used_env && settings.config_source == ConfigSource::Default {
        settings.config_source = ConfigSource::Environment;
    }
}

pub fn generate_default_config() -> String {
    toml::to_string_pretty(&Settings::default())
        .unwrap_or_else(|_| "# error generating default configuration".to_string())
}
