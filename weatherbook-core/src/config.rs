use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

pub const DEFAULT_GEOCODING_URL: &str = "https://nominatim.openstreetmap.org/search";
pub const DEFAULT_REVERSE_GEOCODING_URL: &str = "https://nominatim.openstreetmap.org/reverse";
pub const DEFAULT_FORECAST_URL: &str = "https://api.open-meteo.com/v1/forecast";
pub const DEFAULT_USER_AGENT: &str = concat!("weatherbook/", env!("CARGO_PKG_VERSION"));

/// Key under which favorites live in the preferences file.
pub const FAVORITES_KEY: &str = "favoriteLocations";
const PREFERENCES_FILE: &str = "preferences.json";
const SNAPSHOTS_FILE: &str = "weather_snapshots.json";

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// forecast_url = "https://api.open-meteo.com/v1/forecast"
/// data_dir = "/home/me/.weatherbook"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub geocoding_url: String,
    pub reverse_geocoding_url: String,
    pub forecast_url: String,
    /// Sent with every request; the public Nominatim instance rejects anonymous clients.
    pub user_agent: String,
    /// Overrides the platform data directory.
    pub data_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            geocoding_url: DEFAULT_GEOCODING_URL.to_string(),
            reverse_geocoding_url: DEFAULT_REVERSE_GEOCODING_URL.to_string(),
            forecast_url: DEFAULT_FORECAST_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            data_dir: None,
        }
    }
}

impl Config {
    /// Load config from disk, or return defaults if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file, use defaults.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_file_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        Ok(project_dirs()?.config_dir().join("config.toml"))
    }

    /// Directory holding favorites and snapshots.
    pub fn data_dir(&self) -> Result<PathBuf> {
        match &self.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(project_dirs()?.data_dir().to_path_buf()),
        }
    }

    pub fn preferences_path(&self) -> Result<PathBuf> {
        Ok(self.data_dir()?.join(PREFERENCES_FILE))
    }

    pub fn snapshots_path(&self) -> Result<PathBuf> {
        Ok(self.data_dir()?.join(SNAPSHOTS_FILE))
    }
}

fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("dev", "weatherbook", "weatherbook")
        .ok_or_else(|| anyhow!("Could not determine platform config directory"))
}
