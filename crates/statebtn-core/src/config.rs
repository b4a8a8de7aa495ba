use crate::state::Mode;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub button: ButtonConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ButtonConfig {
    /// Selects the trigger branch out of idle and the completion source.
    #[serde(default)]
    pub mode: Mode,
    /// How long success/error feedback stays visible before the widget
    /// returns to idle.
    #[serde(default = "ButtonConfig::default_idle_return")]
    pub idle_return_ms: u64,
}

impl ButtonConfig {
    fn default_idle_return() -> u64 {
        1500
    }
}

impl Default for ButtonConfig {
    fn default() -> Self {
        Self {
            mode: Mode::Spinner,
            idle_return_ms: 1500,
        }
    }
}

impl Config {
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("/etc"))
            .join("statebtn")
    }

    pub fn config_path() -> PathBuf {
        // STATEBTN_CONFIG env var overrides for tests and embedding hosts.
        if let Ok(path) = std::env::var("STATEBTN_CONFIG") {
            return PathBuf::from(path);
        }
        Self::config_dir().join("config.toml")
    }

    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        toml::from_str(&contents).with_context(|| "parsing config TOML")
    }

    /// Configuration for a single instance of the given mode, with defaults
    /// for everything else.
    pub fn for_mode(mode: Mode) -> Self {
        Self {
            button: ButtonConfig {
                mode,
                ..ButtonConfig::default()
            },
        }
    }
}
