//! Application configuration.
//!
//! Values are layered: built-in defaults, then `config.toml` in the user's
//! config directory, then `GAMEHUB__*` environment variables
//! (`GAMEHUB__FEATURES__CAROUSEL=false`).

use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{Context, Result};
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};

use crate::{carousel, catalog::CatalogLocation};

/// Directory name under the platform config/data directories.
pub const APP_DIR: &str = "gamehub";

const DEFAULT_CONFIG: &str = r#"# Game Hub configuration

# Catalog document: an http(s) URL or a path to a local JSON file.
catalog = "./game_links.json"

# Seconds before the catalog request is abandoned and the built-in list is used.
catalog_timeout_secs = 10

# Seconds between automatic carousel slides.
carousel_interval_secs = 5

[features]
carousel = true
theme_toggle = true

[player]
# Pause before a game address is handed to the player.
load_delay_ms = 100
# Seconds allowed for confirming that a game address responds.
probe_timeout_secs = 10
# Command used to open games, e.g. "firefox". Defaults to the system opener.
# open_command = "xdg-open"
"#;

/// Optional portal capabilities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Features {
    /// Featured carousel above the catalog.
    #[serde(default = "enabled")]
    pub carousel: bool,
    /// Dark/light theme switch.
    #[serde(default = "enabled")]
    pub theme_toggle: bool,
}

impl Default for Features {
    fn default() -> Self {
        Self {
            carousel: true,
            theme_toggle: true,
        }
    }
}

/// Settings of the game player.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerConfig {
    /// Pause before the game address is assigned.
    #[serde(default = "default_load_delay_ms")]
    pub load_delay_ms: u64,
    /// Timeout for confirming a game address.
    #[serde(default = "default_timeout_secs")]
    pub probe_timeout_secs: u64,
    /// Command used to open games; the platform opener when unset.
    #[serde(default)]
    pub open_command: Option<String>,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            load_delay_ms: default_load_delay_ms(),
            probe_timeout_secs: default_timeout_secs(),
            open_command: None,
        }
    }
}

impl PlayerConfig {
    /// Delay before assigning the game address.
    pub fn load_delay(&self) -> Duration {
        Duration::from_millis(self.load_delay_ms)
    }

    /// Probe timeout.
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs.max(1))
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Catalog location, URL or path.
    #[serde(default = "default_catalog")]
    pub catalog: String,
    /// Catalog request timeout.
    #[serde(default = "default_timeout_secs")]
    pub catalog_timeout_secs: u64,
    /// Directory for persisted slots and logs.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Seconds between carousel slides.
    #[serde(default = "default_carousel_interval")]
    pub carousel_interval_secs: u64,
    /// Optional capabilities.
    #[serde(default)]
    pub features: Features,
    /// Player settings.
    #[serde(default)]
    pub player: PlayerConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            catalog: default_catalog(),
            catalog_timeout_secs: default_timeout_secs(),
            data_dir: default_data_dir(),
            carousel_interval_secs: default_carousel_interval(),
            features: Features::default(),
            player: PlayerConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load from the default config file and the environment.
    pub fn load() -> Result<Self> {
        Self::load_from(config_path())
    }

    /// Load from `path` (optional) and the environment.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let settings = Config::builder()
            .add_source(File::from(path).format(FileFormat::Toml).required(false))
            .add_source(Environment::with_prefix("GAMEHUB").separator("__"))
            .build()
            .with_context(|| format!("failed to read configuration {}", path.display()))?;
        settings
            .try_deserialize()
            .with_context(|| format!("invalid configuration in {}", path.display()))
    }

    /// Parsed catalog location.
    pub fn catalog_location(&self) -> CatalogLocation {
        CatalogLocation::parse(&self.catalog)
    }

    /// Catalog request timeout.
    pub fn catalog_timeout(&self) -> Duration {
        Duration::from_secs(self.catalog_timeout_secs.max(1))
    }

    /// Auto-advance interval of the carousel.
    pub fn carousel_interval(&self) -> Duration {
        if self.carousel_interval_secs == 0 {
            carousel::DEFAULT_INTERVAL
        } else {
            Duration::from_secs(self.carousel_interval_secs)
        }
    }

    /// Directory holding the persisted slots.
    pub fn store_dir(&self) -> PathBuf {
        self.data_dir.join("store")
    }

    /// Directory holding log files.
    pub fn log_dir(&self) -> PathBuf {
        self.data_dir.join("logs")
    }
}

/// Location of the user's config file.
pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
        .join("config.toml")
}

/// Write the commented default config file if none exists yet.
pub fn ensure_default_config() -> Result<()> {
    write_default_config(config_path())
}

fn write_default_config(path: PathBuf) -> Result<()> {
    if path.exists() {
        return Ok(());
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create config directory {}", parent.display()))?;
    }
    fs::write(&path, DEFAULT_CONFIG)
        .with_context(|| format!("failed to write default config {}", path.display()))
}

fn enabled() -> bool {
    true
}

fn default_catalog() -> String {
    "./game_links.json".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_load_delay_ms() -> u64 {
    100
}

fn default_carousel_interval() -> u64 {
    carousel::DEFAULT_INTERVAL.as_secs()
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn default_file_round_trips() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("gamehub/config.toml");
        write_default_config(path.clone())?;
        assert!(path.is_file());

        let config = AppConfig::load_from(&path)?;
        assert_eq!(config.catalog, "./game_links.json");
        assert_eq!(config.features, Features::default());
        assert_eq!(config.player.load_delay(), Duration::from_millis(100));
        assert_eq!(config.carousel_interval(), Duration::from_secs(5));
        Ok(())
    }

    #[test]
    fn missing_file_uses_defaults() -> Result<()> {
        let dir = tempdir()?;
        let config = AppConfig::load_from(dir.path().join("absent.toml"))?;
        assert_eq!(config.catalog_timeout(), Duration::from_secs(10));
        assert!(config.player.open_command.is_none());
        Ok(())
    }

    #[test]
    fn file_overrides_features() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "catalog = \"https://example.com/game_links.json\"\n[features]\ncarousel = false\n",
        )?;
        let config = AppConfig::load_from(&path)?;
        assert!(!config.features.carousel);
        assert!(config.features.theme_toggle);
        assert!(matches!(
            config.catalog_location(),
            CatalogLocation::Remote(_)
        ));
        Ok(())
    }
}
