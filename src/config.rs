//! Configuration system using TOML files.
//!
//! Config is stored in the OS-standard config directory:
//! - Windows: %APPDATA%\ultrascrap\config.toml
//! - macOS: ~/Library/Application Support/ultrascrap/config.toml
//! - Linux: ~/.config/ultrascrap/config.toml
//!
//! The config file is human-readable and editable. Missing keys fall
//! back to defaults, so a partial file keeps working across upgrades.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::usdb::DEFAULT_BASE_URL;

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Song database endpoint settings
    pub usdb: UsdbConfig,

    /// Download behavior settings
    pub download: DownloadConfig,
}

/// Song database endpoint settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UsdbConfig {
    /// Base URL of the song database
    pub base_url: String,
}

impl Default for UsdbConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

/// Download behavior settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DownloadConfig {
    /// Where song folders land (default: ./songs under the working dir)
    pub songs_dir: Option<PathBuf>,

    /// Search page size, capped server-side at 100
    pub page_size: u32,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            songs_dir: None,
            page_size: 100,
        }
    }
}

impl Config {
    /// Resolve the songs directory: the configured path, or `songs`
    /// under the current working directory.
    pub fn songs_dir(&self) -> PathBuf {
        self.download
            .songs_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("songs"))
    }
}

// ============================================================================
// Config File Operations
// ============================================================================

/// Get the config directory path
pub fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("ultrascrap"))
}

/// Get the full path to the config file
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|d| d.join("config.toml"))
}

/// Load configuration from disk
///
/// Returns default config if file doesn't exist or can't be parsed.
/// Logs warnings but doesn't fail - we always return a usable config.
pub fn load() -> Config {
    let Some(path) = config_path() else {
        tracing::warn!("Could not determine config directory, using defaults");
        return Config::default();
    };

    if !path.exists() {
        tracing::info!("No config file found at {:?}, using defaults", path);
        return Config::default();
    }

    match std::fs::read_to_string(&path) {
        Ok(contents) => match toml::from_str(&contents) {
            Ok(config) => {
                tracing::info!("Loaded config from {:?}", path);
                config
            }
            Err(e) => {
                tracing::error!("Failed to parse config file {:?}: {}", path, e);
                tracing::warn!("Using default configuration");
                Config::default()
            }
        },
        Err(e) => {
            tracing::error!("Failed to read config file {:?}: {}", path, e);
            Config::default()
        }
    }
}

/// Save configuration to disk
///
/// Creates the config directory if it doesn't exist.
pub fn save(config: &Config) -> Result<(), ConfigError> {
    let dir = config_dir().ok_or(ConfigError::NoConfigDir)?;
    let path = dir.join("config.toml");

    // Ensure directory exists
    std::fs::create_dir_all(&dir).map_err(|e| ConfigError::CreateDir(dir.clone(), e))?;

    // Serialize to pretty TOML
    let contents = toml::to_string_pretty(config).map_err(ConfigError::Serialize)?;

    // Write atomically (write to temp, then rename)
    let temp_path = path.with_extension("toml.tmp");
    std::fs::write(&temp_path, &contents).map_err(|e| ConfigError::Write(temp_path.clone(), e))?;
    std::fs::rename(&temp_path, &path)
        .map_err(|e| ConfigError::Rename(temp_path, path.clone(), e))?;

    tracing::info!("Saved config to {:?}", path);
    Ok(())
}

/// Load the config, writing the defaults out on first run so the file
/// exists for the user to edit.
pub fn load_or_init() -> Config {
    let config = load();
    if let Some(path) = config_path()
        && !path.exists()
        && let Err(e) = save(&config)
    {
        tracing::warn!("Failed to write initial config: {}", e);
    }
    config
}

// ============================================================================
// Error Types
// ============================================================================

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Failed to create config directory {0}: {1}")]
    CreateDir(PathBuf, std::io::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(toml::ser::Error),

    #[error("Failed to write config to {0}: {1}")]
    Write(PathBuf, std::io::Error),

    #[error("Failed to rename temp file {0} to {1}: {2}")]
    Rename(PathBuf, PathBuf, std::io::Error),
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_serializes() {
        let config = Config::default();
        let toml = toml::to_string_pretty(&config).unwrap();
        assert!(toml.contains("[usdb]"));
        assert!(toml.contains("[download]"));
        assert!(toml.contains(DEFAULT_BASE_URL));
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: Config = toml::from_str("[download]\npage_size = 25\n").unwrap();
        assert_eq!(config.download.page_size, 25);
        assert_eq!(config.usdb.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.download.songs_dir, None);
    }

    #[test]
    fn test_empty_config_is_default() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.download.page_size, 100);
    }

    #[test]
    fn test_songs_dir_default() {
        let config = Config::default();
        assert_eq!(config.songs_dir(), PathBuf::from("songs"));

        let mut config = Config::default();
        config.download.songs_dir = Some(PathBuf::from("/music/karaoke"));
        assert_eq!(config.songs_dir(), PathBuf::from("/music/karaoke"));
    }
}
