//! Configuration management with layered hierarchy

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Database file used when nothing else is configured
pub const DEFAULT_DATABASE: &str = "company.db";

/// Directory holding the per-directory config file
pub const LOCAL_CONFIG_DIR: &str = ".corpdb";

/// corpdb configuration with layered hierarchy
#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// SQLite database file
    pub database: Option<PathBuf>,

    /// Default output format
    pub default_format: Option<String>,

    /// Hours added to UTC when showing last-modified times
    pub utc_offset_hours: Option<i32>,
}

impl Config {
    /// Load configuration from all sources, merging in priority order
    pub fn load() -> Self {
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self::load_layers(
            Self::global_config_path().as_deref(),
            &cwd,
            |key| std::env::var(key).ok(),
        )
    }

    /// Merge the file and environment layers given explicit locations
    pub fn load_layers<F>(global_path: Option<&Path>, working_dir: &Path, env: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        // 1. Built-in defaults (already in Default impl)
        let mut config = Config::default();

        // 2. Global user config (~/.config/corpdb/config.yaml)
        if let Some(global) = global_path.and_then(Self::read_file) {
            config.merge(global);
        }

        // 3. Local config (.corpdb/config.yaml)
        let local_path = working_dir.join(LOCAL_CONFIG_DIR).join("config.yaml");
        if let Some(local) = Self::read_file(&local_path) {
            config.merge(local);
        }

        // 4. Environment variables
        if let Some(database) = env("CORPDB_DATABASE").filter(|s| !s.trim().is_empty()) {
            config.database = Some(PathBuf::from(database));
        }
        if let Some(offset) = env("CORPDB_UTC_OFFSET") {
            match offset.trim().parse::<i32>() {
                Ok(hours) => config.utc_offset_hours = Some(hours),
                Err(_) => tracing::warn!(value = %offset, "ignoring invalid CORPDB_UTC_OFFSET"),
            }
        }

        config
    }

    /// Get the path to the global config file
    fn global_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "corpdb")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    fn read_file(path: &Path) -> Option<Config> {
        if !path.exists() {
            return None;
        }
        let contents = std::fs::read_to_string(path).ok()?;
        match serde_yml::from_str::<Config>(&contents) {
            Ok(config) => Some(config),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable config");
                None
            }
        }
    }

    /// Merge another config into this one (other takes precedence)
    fn merge(&mut self, other: Config) {
        if other.database.is_some() {
            self.database = other.database;
        }
        if other.default_format.is_some() {
            self.default_format = other.default_format;
        }
        if other.utc_offset_hours.is_some() {
            self.utc_offset_hours = other.utc_offset_hours;
        }
    }

    /// Database file, falling back to `company.db` in the working directory
    pub fn database(&self) -> PathBuf {
        self.database
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATABASE))
    }

    pub fn utc_offset_hours(&self) -> i32 {
        self.utc_offset_hours.unwrap_or(0)
    }
}
