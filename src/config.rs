use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{ConnectionManagerError, Result};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "CONNECTION_MANAGER_CONFIG";
const CONFIG_FILE_NAME: &str = "config.yaml";
const HOME_CONFIG_DIR: &str = ".connectionmanager";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub keybindings: KeybindingConfig,
    pub layout: LayoutConfig,
    pub ui: UiConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeybindingConfig {
    pub quit: char,
    pub confirm: char,
    pub cancel: char,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub module_bar_height: u16,
    pub status_bar_height: u16,
    pub confirm_width: u16,
    pub confirm_height: u16,
    /// Share of the main panel given to the tree pane
    pub tree_pane_percent: u16,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    pub tick_rate_ms: u64,
    /// Simulated time a connect/disconnect takes in the worker
    pub activation_delay_ms: u64,
}

impl Default for KeybindingConfig {
    fn default() -> Self {
        Self {
            quit: 'q',
            confirm: 'y',
            cancel: 'n',
        }
    }
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            module_bar_height: 3,
            status_bar_height: 3,
            confirm_width: 40,
            confirm_height: 7,
            tree_pane_percent: 55,
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            tick_rate_ms: 250,
            activation_delay_ms: 400,
        }
    }
}

impl Config {
    /// Load the first config file found, or defaults when there is none.
    /// A file that exists but cannot be read or parsed is an error.
    pub fn load() -> Result<Self> {
        match Self::discover() {
            Some(path) => {
                log::info!("Loading config from {}", path.display());
                Self::load_from(&path)
            }
            None => {
                log::debug!("No config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Config file search order: explicit env var, working directory, home
    pub fn discover() -> Option<PathBuf> {
        if let Ok(explicit) = std::env::var(CONFIG_ENV_VAR) {
            if !explicit.is_empty() {
                // Returned even when missing so the read reports it
                return Some(PathBuf::from(explicit));
            }
        }

        let local = PathBuf::from(CONFIG_FILE_NAME);
        if local.is_file() {
            return Some(local);
        }

        dirs::home_dir()
            .map(|home| home.join(HOME_CONFIG_DIR).join(CONFIG_FILE_NAME))
            .filter(|path| path.is_file())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content).map_err(|source| ConnectionManagerError::Config {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_yaml(content: &str) -> std::result::Result<Self, serde_yaml::Error> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content)
    }
}
