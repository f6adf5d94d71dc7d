use anyhow::{Context, Result};
use dirs::config_dir;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::geometry::{Grid, DEFAULT_GRID_SIZE};

const APP_NAME: &str = "timeboard";
const CONFIG_FILE: &str = "config.json";
/// Overrides the configured grid size.
pub const GRID_SIZE_ENV: &str = "TIMEBOARD_GRID_SIZE";
/// Project name used when a document is saved without one.
pub const DEFAULT_PROJECT_NAME: &str = "Untitled TimeLine";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Cell size of the snapping grid
    pub grid_size: f64,
    /// Opacity of the drawn grid lines (0.0 to 1.0)
    pub grid_opacity: f64,
    /// Name given to new projects
    pub default_project_name: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            grid_size: DEFAULT_GRID_SIZE,
            grid_opacity: 0.3,
            default_project_name: DEFAULT_PROJECT_NAME.to_string(),
        }
    }
}

impl EditorConfig {
    /// Load configuration from the user's config directory.
    /// Returns default config if file doesn't exist or fails to parse.
    pub fn load() -> Self {
        let config = match get_config_path().and_then(|path| Self::try_load(&path)) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Failed to load config, using defaults: {:#}", e);
                Self::default()
            }
        };
        config.with_env_overrides()
    }

    /// Load from an explicit path. A missing file yields the defaults.
    pub fn try_load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).context("Failed to read config file")?;

        let config = serde_json::from_str(&content).context("Failed to parse config file")?;

        Ok(config)
    }

    /// Apply `TIMEBOARD_GRID_SIZE` if it holds a positive number.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(value) = std::env::var(GRID_SIZE_ENV) {
            match value.parse::<f64>() {
                Ok(size) if size > 0.0 => self.grid_size = size,
                _ => tracing::warn!("Ignoring {}={:?}: not a positive number", GRID_SIZE_ENV, value),
            }
        }
        self
    }

    pub fn grid(&self) -> Grid {
        Grid::new(self.grid_size)
    }

    /// Save the current configuration to disk.
    pub fn save(&self) -> Result<()> {
        self.save_to(&get_config_path()?)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let content = serde_json::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(config_path, content).context("Failed to write config file")?;

        Ok(())
    }
}

fn get_config_path() -> Result<PathBuf> {
    let mut path =
        config_dir().ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
    path.push(APP_NAME);
    path.push(CONFIG_FILE);
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = EditorConfig::try_load(&dir.path().join("none.json")).unwrap();
        assert_eq!(config, EditorConfig::default());
    }

    #[test]
    fn test_save_and_load_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(CONFIG_FILE);

        let config = EditorConfig {
            grid_size: 25.0,
            ..EditorConfig::default()
        };
        config.save_to(&path).unwrap();

        assert_eq!(EditorConfig::try_load(&path).unwrap(), config);
    }

    #[test]
    fn test_partial_file_fills_in_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, r#"{"grid_size": 20.0}"#).unwrap();

        let config = EditorConfig::try_load(&path).unwrap();
        assert_eq!(config.grid_size, 20.0);
        assert_eq!(config.default_project_name, DEFAULT_PROJECT_NAME);
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "not json").unwrap();

        assert!(EditorConfig::try_load(&path).is_err());
    }
}
