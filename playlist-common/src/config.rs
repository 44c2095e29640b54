//! Configuration loading
//!
//! Each setting resolves in priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, warn};

use crate::{Error, Result};

/// Environment variable naming the database file
pub const DB_PATH_ENV: &str = "DB_PATH";
/// Environment variable naming the playlist JSON file
pub const DATA_PATH_ENV: &str = "PLAYLIST_DATA_PATH";
/// Environment variable naming the listen port
pub const PORT_ENV: &str = "PLAYLIST_PORT";

pub const DEFAULT_DB_PATH: &str = "songs.db";
pub const DEFAULT_DATA_PATH: &str = "data/playlist.json";
pub const DEFAULT_PORT: u16 = 5000;

/// Contents of `config.toml`; every key is optional
#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
pub struct TomlConfig {
    pub db_path: Option<PathBuf>,
    pub data_path: Option<PathBuf>,
    pub port: Option<u16>,
}

/// Values given on the command line
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    pub db_path: Option<PathBuf>,
    pub data_path: Option<PathBuf>,
    pub port: Option<u16>,
    /// Explicit config file; must exist when given
    pub config_file: Option<PathBuf>,
}

/// Fully resolved service configuration
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceConfig {
    /// SQLite database file backing the store
    pub db_path: PathBuf,
    /// Playlist JSON loaded by reloads
    pub data_path: PathBuf,
    pub port: u16,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            port: DEFAULT_PORT,
        }
    }
}

impl ServiceConfig {
    /// Resolve every setting from CLI, environment, TOML file and defaults
    pub fn resolve(cli: CliOverrides) -> Result<Self> {
        let toml = match &cli.config_file {
            Some(path) => load_toml_config(path)?,
            None => match default_config_file() {
                Some(path) => load_toml_config(&path).unwrap_or_else(|e| {
                    warn!("Ignoring config file {}: {}", path.display(), e);
                    TomlConfig::default()
                }),
                None => TomlConfig::default(),
            },
        };

        let defaults = ServiceConfig::default();

        let port = match cli.port {
            Some(port) => port,
            None => match std::env::var(PORT_ENV) {
                Ok(value) => value.parse().map_err(|_| {
                    Error::Config(format!("{} must be a port number, got '{}'", PORT_ENV, value))
                })?,
                Err(_) => toml.port.unwrap_or(defaults.port),
            },
        };

        let config = ServiceConfig {
            db_path: cli
                .db_path
                .or_else(|| env_path(DB_PATH_ENV))
                .or(toml.db_path)
                .unwrap_or(defaults.db_path),
            data_path: cli
                .data_path
                .or_else(|| env_path(DATA_PATH_ENV))
                .or(toml.data_path)
                .unwrap_or(defaults.data_path),
            port,
        };

        debug!(?config, "Resolved configuration");
        Ok(config)
    }
}

/// Parse a TOML config file
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::Config(format!("Cannot read config file {}: {}", path.display(), e))
    })?;
    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Invalid config file {}: {}", path.display(), e)))
}

/// `<config dir>/playlist/config.toml`, if it exists
fn default_config_file() -> Option<PathBuf> {
    dirs::config_dir()
        .map(|d| d.join("playlist").join("config.toml"))
        .filter(|p| p.exists())
}

fn env_path(name: &str) -> Option<PathBuf> {
    std::env::var_os(name)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}
