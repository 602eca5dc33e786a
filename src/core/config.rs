//! Persisted session defaults
//!
//! Stored at `<config dir>/burn-session/session_defaults.json`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::flags::BurnFlags;

/// Defaults applied to every new session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionDefaults {
    /// Where scratch files go; `None` means the system temp directory
    #[serde(default)]
    pub tmpdir: Option<PathBuf>,
    #[serde(default)]
    pub flags: BurnFlags,
    /// Treat plugins that misreport their capabilities as unusable
    #[serde(default = "default_strict_checks")]
    pub strict_checks: bool,
    #[serde(default = "default_num_copies")]
    pub num_copies: u32,
}

fn default_strict_checks() -> bool {
    true
}

fn default_num_copies() -> u32 {
    1
}

impl Default for SessionDefaults {
    fn default() -> Self {
        Self {
            tmpdir: None,
            flags: BurnFlags::empty(),
            strict_checks: default_strict_checks(),
            num_copies: default_num_copies(),
        }
    }
}

impl SessionDefaults {
    const SETTINGS_FILE: &'static str = "session_defaults.json";

    /// Get the config directory (~/.config/burn-session/ on Linux)
    fn get_config_dir() -> Result<PathBuf, String> {
        let config_dir =
            dirs::config_dir().ok_or_else(|| "Could not determine config directory".to_string())?;

        let app_dir = config_dir.join("burn-session");

        if !app_dir.exists() {
            std::fs::create_dir_all(&app_dir)
                .map_err(|e| format!("Failed to create config directory: {}", e))?;
        }

        Ok(app_dir)
    }

    /// Load defaults from disk, or return built-in defaults if not found
    pub fn load() -> Self {
        let loaded = Self::get_config_dir()
            .and_then(|dir| Self::load_from(&dir.join(Self::SETTINGS_FILE)));
        match loaded {
            Ok(defaults) => {
                log::debug!("Loaded session defaults from disk");
                defaults
            }
            Err(e) => {
                log::debug!("Using built-in session defaults: {}", e);
                Self::default()
            }
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, String> {
        if !path.exists() {
            return Err("Settings file not found".to_string());
        }

        let contents = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read settings: {}", e))?;

        serde_json::from_str(&contents).map_err(|e| format!("Failed to parse settings: {}", e))
    }

    /// Save defaults to the config directory
    pub fn save(&self) -> Result<(), String> {
        let app_dir = Self::get_config_dir()?;
        self.save_to(&app_dir.join(Self::SETTINGS_FILE))
    }

    pub fn save_to(&self, path: &Path) -> Result<(), String> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| format!("Failed to serialize settings: {}", e))?;

        std::fs::write(path, json).map_err(|e| format!("Failed to write settings: {}", e))?;

        log::debug!("Saved session defaults to {:?}", path);
        Ok(())
    }
}
