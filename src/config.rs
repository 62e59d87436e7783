use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Persisted client configuration: camera source strings plus the
/// backend endpoint and upload base directory. Loaded once at startup;
/// saved whenever the user edits camera settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub base_url: String,
    pub project_location: String,
    pub front_camera: String,
    pub back_camera: String,
    pub board_camera: String,
    /// User-editable base directory joined with uploaded file names.
    pub upload_base_dir: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8001".to_string(),
            project_location: "storage/".to_string(),
            front_camera: String::new(),
            back_camera: String::new(),
            board_camera: String::new(),
            upload_base_dir: "C:\\Users\\Default\\Videos\\".to_string(),
        }
    }
}

impl AppConfig {
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("lectern").join("config.json"))
    }

    /// Missing or unreadable config falls back to defaults; startup
    /// must not fail on a corrupt settings file.
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            return Self::default();
        };
        match std::fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(config) => config,
                Err(e) => {
                    warn!("ignoring malformed config {}: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(_) => Self::default(),
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path().context("no config directory on this platform")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, contents).with_context(|| format!("writing {}", path.display()))?;
        Ok(())
    }
}
