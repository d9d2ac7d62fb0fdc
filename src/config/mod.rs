//! Configuration management for gator.
//!
//! Configuration is read from `~/.config/gator/config.toml` (or the path given
//! with `--config`). If the file doesn't exist, a default configuration with
//! comments is created. `login` and `register` write the current user back.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Main configuration struct.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// SQLite database file (default: `<data dir>/gator/gator.db`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub db_path: Option<PathBuf>,

    /// Name of the logged-in user
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_user: Option<String>,

    pub http: HttpConfig,

    /// File this configuration was loaded from
    #[serde(skip)]
    source: Option<PathBuf>,
}

/// Settings for the feed fetcher.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// User-Agent header sent with every feed request
    pub user_agent: String,

    /// Request timeout in seconds (default: 10)
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: format!("gator/{}", env!("CARGO_PKG_VERSION")),
            timeout_secs: 10,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: None,
            current_user: None,
            http: HttpConfig::default(),
            source: None,
        }
    }
}

impl Config {
    /// Load configuration from `path`, or from the default path when `None`.
    ///
    /// If the config file doesn't exist, creates a default one with comments.
    /// Missing fields in the config file use default values.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::default_config_path()?,
        };

        if !config_path.exists() {
            Self::create_default_config(&config_path)?;
            return Ok(Self {
                source: Some(config_path),
                ..Self::default()
            });
        }

        let content = fs::read_to_string(&config_path).map_err(|e| ConfigError::Io {
            path: config_path.clone(),
            source: e,
        })?;

        let mut config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: config_path.clone(),
            source: e,
        })?;
        config.source = Some(config_path);

        Ok(config)
    }

    /// Get the default config file path: `~/.config/gator/config.toml`
    pub fn default_config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join("gator").join("config.toml"))
    }

    /// Resolve the database file, creating its parent directory.
    pub fn database_path(&self) -> Result<PathBuf, ConfigError> {
        let path = match &self.db_path {
            Some(p) => p.clone(),
            None => dirs::data_dir()
                .ok_or(ConfigError::NoDataDir)?
                .join("gator")
                .join("gator.db"),
        };

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| ConfigError::Io {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
            }
        }

        Ok(path)
    }

    /// Record `name` as the current user and persist the file.
    pub fn set_current_user(&mut self, name: &str) -> Result<(), ConfigError> {
        self.current_user = Some(name.to_string());
        self.save()
    }

    /// Write the configuration back to the file it was loaded from.
    pub fn save(&self) -> Result<(), ConfigError> {
        let path = match &self.source {
            Some(p) => p.clone(),
            None => Self::default_config_path()?,
        };

        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content).map_err(|e| ConfigError::Io { path, source: e })
    }

    fn create_default_config(path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let mut file = fs::File::create(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        file.write_all(Self::default_config_content().as_bytes())
            .map_err(|e| ConfigError::Io {
                path: path.to_path_buf(),
                source: e,
            })?;

        Ok(())
    }

    fn default_config_content() -> String {
        r##"# gator configuration
#
# SQLite database location (default: <data dir>/gator/gator.db)
# db_path = "/home/me/.local/share/gator/gator.db"
#
# Set by `gator login` / `gator register`
# current_user = "alice"

[http]
# User-Agent sent when fetching feeds
user_agent = "gator/0.1.0"

# Request timeout in seconds
timeout_secs = 10
"##
        .to_string()
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Could not determine data directory")]
    NoDataDir,

    #[error("Failed to read/write config file at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}
