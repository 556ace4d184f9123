//! User configuration file handling
//!
//! Manages settings from ~/.config/notodiff/settings.json

use crate::fonts::DEFAULT_REFERENCE_FONT;
use crate::github::client::DEFAULT_API_URL;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub const DEFAULT_FONTS_DIR: &str = "android/system/system/fonts";
pub const DEFAULT_MANIFEST: &str = "notofonts.github.io/docs/noto.json";
pub const DEFAULT_UPSTREAM_ROOT: &str = "notofonts.github.io";
pub const DEFAULT_OWNER: &str = "notofonts";

/// User configuration from ~/.config/notodiff/settings.json
///
/// These settings override built-in defaults but are overridden by CLI arguments
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ConfigFile {
    pub fonts_dir: Option<PathBuf>,
    pub manifest: Option<PathBuf>,
    pub upstream_root: Option<PathBuf>,
    pub reference_font: Option<String>,
    pub owner: Option<String>,
    pub api_url: Option<String>,
}

/// Fully resolved settings for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub fonts_dir: PathBuf,
    pub manifest: PathBuf,
    pub upstream_root: PathBuf,
    pub reference_font: String,
    pub owner: String,
    pub api_url: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            fonts_dir: PathBuf::from(DEFAULT_FONTS_DIR),
            manifest: PathBuf::from(DEFAULT_MANIFEST),
            upstream_root: PathBuf::from(DEFAULT_UPSTREAM_ROOT),
            reference_font: DEFAULT_REFERENCE_FONT.to_string(),
            owner: DEFAULT_OWNER.to_string(),
            api_url: DEFAULT_API_URL.to_string(),
        }
    }
}

impl From<&Settings> for ConfigFile {
    fn from(settings: &Settings) -> Self {
        Self {
            fonts_dir: Some(settings.fonts_dir.clone()),
            manifest: Some(settings.manifest.clone()),
            upstream_root: Some(settings.upstream_root.clone()),
            reference_font: Some(settings.reference_font.clone()),
            owner: Some(settings.owner.clone()),
            api_url: Some(settings.api_url.clone()),
        }
    }
}

impl ConfigFile {
    /// Get the path to the notodiff config directory
    pub fn config_dir() -> PathBuf {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")));
        config_dir.join("notodiff")
    }

    /// Get the path to the user config file
    pub fn config_path() -> PathBuf {
        Self::config_dir().join("settings.json")
    }

    /// Load configuration from the user config file
    pub fn load() -> Option<Self> {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(path: &Path) -> Option<Self> {
        if !path.exists() {
            return None;
        }

        match fs::read_to_string(path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(config) => {
                    debug!("Loaded user settings from {:?}", path);
                    Some(config)
                }
                Err(e) => {
                    warn!("Failed to parse {}: {}", path.display(), e);
                    None
                }
            },
            Err(e) => {
                warn!("Failed to read {}: {}", path.display(), e);
                None
            }
        }
    }

    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        // Create parent directory if it doesn't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = serde_json::to_string_pretty(self)?;
        fs::write(path, contents)?;

        debug!("Saved settings to {:?}", path);
        Ok(())
    }

    /// Write a settings file holding the built-in defaults.
    ///
    /// Returns `false` when a settings file is already there.
    pub fn initialize(path: &Path) -> anyhow::Result<bool> {
        if path.exists() {
            return Ok(false);
        }
        ConfigFile::from(&Settings::default()).save_to(path)?;
        Ok(true)
    }
}
