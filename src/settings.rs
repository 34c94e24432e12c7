//! Player preferences
//!
//! Persisted as JSON next to the high score. Missing fields take defaults so
//! older files keep loading.

use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::highscores::StoreError;

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Show the crosshair (only once it has been bought)
    pub show_crosshair: bool,
    /// Developer mode: guaranteed drops, coin and power-up cheats
    pub dev_mode: bool,
    /// Longest frame fed to the simulation, in seconds
    pub max_frame_dt: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            show_crosshair: false,
            dev_mode: false,
            max_frame_dt: 0.1,
        }
    }
}

impl Settings {
    /// Load from `path`; a missing file yields the defaults
    pub fn load(path: &Path) -> Result<Self, StoreError> {
        match fs::read_to_string(path) {
            Ok(json) => {
                let settings = serde_json::from_str(&json)?;
                log::info!("Loaded settings from {}", path.display());
                Ok(settings)
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                log::info!("Using default settings");
                Ok(Self::default())
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Load, falling back to defaults on any error
    pub fn load_or_default(path: &Path) -> Self {
        Self::load(path).unwrap_or_else(|err| {
            log::warn!("Settings at {} unreadable ({}), using defaults", path.display(), err);
            Self::default()
        })
    }

    pub fn save(&self, path: &Path) -> Result<(), StoreError> {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        log::info!("Settings saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_round_trip_through_disk() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        let settings = Settings {
            show_crosshair: true,
            dev_mode: true,
            max_frame_dt: 0.05,
        };
        settings.save(&path).unwrap();
        assert_eq!(Settings::load(&path).unwrap(), settings);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{ "dev_mode": true }"#).unwrap();

        let settings = Settings::load(&path).unwrap();
        assert!(settings.dev_mode);
        assert!(!settings.show_crosshair);
        assert_eq!(settings.max_frame_dt, 0.1);
    }

    #[test]
    fn test_bad_file_falls_back() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "{").unwrap();

        assert!(Settings::load(&path).is_err());
        assert_eq!(Settings::load_or_default(&path), Settings::default());
    }
}
