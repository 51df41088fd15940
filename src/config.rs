//! Persisted application settings (lives in the OS config directory).

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::model::{ColorBy, TimelineViewport};
use crate::schedule::drag::DEFAULT_DRAG_THRESHOLD;
use crate::schedule::layout::LayoutOptions;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Dataset to open at start-up; `None` uses the default data file.
    pub data_file: Option<PathBuf>,
    /// Name written to the activity log.
    pub changed_by: String,
    pub base_day_width: f32,
    pub zoom: f32,
    pub drag_threshold: f32,
    pub lane_height: f32,
    pub color_by: ColorBy,
    pub dark_mode: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_file: None,
            changed_by: "User".into(),
            base_day_width: 480.0,
            zoom: 1.0,
            drag_threshold: DEFAULT_DRAG_THRESHOLD,
            lane_height: LayoutOptions::default().lane_height,
            color_by: ColorBy::default(),
            dark_mode: true,
        }
    }
}

impl AppConfig {
    /// Read settings from `path`. Missing or unreadable files give defaults.
    pub fn load(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }
        match std::fs::read_to_string(path)
            .map_err(crate::Error::from)
            .and_then(|json| serde_json::from_str::<AppConfig>(&json).map_err(crate::Error::from))
        {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable settings");
                Self::default()
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn viewport(&self) -> TimelineViewport {
        TimelineViewport::new(self.base_day_width).with_zoom(self.zoom)
    }

    pub fn layout_options(&self) -> LayoutOptions {
        LayoutOptions {
            lane_height: self.lane_height,
            ..LayoutOptions::default()
        }
    }

    /// The configured dataset, or the default one under `paths`.
    pub fn data_file(&self, paths: &ConfigPaths) -> PathBuf {
        self.data_file
            .clone()
            .unwrap_or_else(|| paths.data_dir.join("flights.json"))
    }
}

/// Where settings and data live on this machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigPaths {
    pub config_dir: PathBuf,
    pub data_dir: PathBuf,
}

impl ConfigPaths {
    pub fn resolve() -> Self {
        if let Some(proj_dirs) = directories::ProjectDirs::from("", "", "FlightGantt") {
            Self {
                config_dir: proj_dirs.config_dir().to_path_buf(),
                data_dir: proj_dirs.data_dir().to_path_buf(),
            }
        } else {
            // Fallback
            let dir = PathBuf::from(".");
            Self {
                config_dir: dir.clone(),
                data_dir: dir,
            }
        }
    }

    pub fn settings_file(&self) -> PathBuf {
        self.config_dir.join("settings.json")
    }

    pub fn colors_file(&self) -> PathBuf {
        self.config_dir.join("colors.json")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir() -> PathBuf {
        std::env::temp_dir().join(format!("flight-gantt-{}", uuid::Uuid::new_v4()))
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.changed_by, "User");
        assert_eq!(config.drag_threshold, 5.0);
        assert_eq!(config.viewport().day_width(), 480.0);
        assert_eq!(config.layout_options().lane_height, 24.0);
    }

    #[test]
    fn test_missing_and_corrupt_files_fall_back() {
        let dir = temp_dir();
        let path = dir.join("settings.json");
        assert_eq!(AppConfig::load(&path), AppConfig::default());

        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(&path, "{ not json").unwrap();
        assert_eq!(AppConfig::load(&path), AppConfig::default());
    }

    #[test]
    fn test_save_and_partial_load() {
        let path = temp_dir().join("nested").join("settings.json");
        let config = AppConfig {
            changed_by: "ops-desk".into(),
            zoom: 1.44,
            color_by: ColorBy::FlightType,
            ..Default::default()
        };
        config.save(&path).unwrap();
        assert_eq!(AppConfig::load(&path), config);

        std::fs::write(&path, r#"{ "changed_by": "night shift" }"#).unwrap();
        let loaded = AppConfig::load(&path);
        assert_eq!(loaded.changed_by, "night shift");
        assert_eq!(loaded.lane_height, 24.0);
    }

    #[test]
    fn test_data_file_defaults_under_data_dir() {
        let paths = ConfigPaths {
            config_dir: PathBuf::from("/cfg"),
            data_dir: PathBuf::from("/data"),
        };
        assert_eq!(
            AppConfig::default().data_file(&paths),
            PathBuf::from("/data/flights.json")
        );
        assert_eq!(paths.colors_file(), PathBuf::from("/cfg/colors.json"));
    }
}
