use color_eyre::eyre::eyre;
use color_eyre::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Manages config directory and config file operations
#[derive(Clone)]
pub struct ConfigManager {
    pub(crate) config_dir: PathBuf,
}

impl ConfigManager {
    /// Create a ConfigManager with a custom config directory (primarily for testing)
    pub fn with_dir(config_dir: PathBuf) -> Self {
        Self { config_dir }
    }

    /// Create a new ConfigManager for the given app name
    pub fn new(app_name: &str) -> Result<Self> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| eyre!("Could not determine config directory"))?
            .join(app_name);

        Ok(Self { config_dir })
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Get path to a specific config file or subdirectory
    pub fn config_path(&self, path: &str) -> PathBuf {
        self.config_dir.join(path)
    }

    /// Ensure the config directory exists
    pub fn ensure_config_dir(&self) -> Result<()> {
        if !self.config_dir.exists() {
            std::fs::create_dir_all(&self.config_dir)?;
        }
        Ok(())
    }
}

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub file_loading: FileLoadingConfig,
    pub display: DisplayConfig,
    pub dataset: DatasetConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct FileLoadingConfig {
    pub delimiter: Option<u8>,
    pub has_header: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Number of tracks on the first page of results.
    pub page_size: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetConfig {
    /// Column holding the embeddable track identifier.
    pub id_column: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            file_loading: FileLoadingConfig::default(),
            display: DisplayConfig::default(),
            dataset: DatasetConfig::default(),
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self { page_size: 5 }
    }
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            id_column: crate::dataset::TRACK_ID_COLUMN.to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration, falling back to defaults when no file exists.
    pub fn load(app_name: &str) -> Result<Self> {
        let config_manager = ConfigManager::new(app_name)?;
        Self::load_from(&config_manager)
    }

    /// Load configuration from the given manager's `config.toml`.
    pub fn load_from(config_manager: &ConfigManager) -> Result<Self> {
        let config_path = config_manager.config_path("config.toml");

        if !config_path.exists() {
            return Ok(AppConfig::default());
        }

        let content = std::fs::read_to_string(&config_path).map_err(|e| {
            eyre!(
                "Failed to read config file at {}: {}",
                config_path.display(),
                e
            )
        })?;

        let config: AppConfig = toml::from_str(&content).map_err(|e| {
            eyre!(
                "Failed to parse config file at {}: {}",
                config_path.display(),
                e
            )
        })?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.dataset.id_column.is_empty() {
            return Err(eyre!("dataset.id_column must not be empty"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.display.page_size, 5);
        assert_eq!(config.dataset.id_column, "track_uri");
        assert!(config.file_loading.delimiter.is_none());
        assert!(config.file_loading.has_header.is_none());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            [display]
            page_size = 10
            "#,
        )
        .unwrap();
        assert_eq!(config.display.page_size, 10);
        assert_eq!(config.dataset.id_column, "track_uri");
    }

    #[test]
    fn test_load_from_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let manager = ConfigManager::with_dir(dir.path().to_path_buf());
        let config = AppConfig::load_from(&manager).unwrap();
        assert_eq!(config.display.page_size, 5);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let manager = ConfigManager::with_dir(dir.path().to_path_buf());
        std::fs::write(
            manager.config_path("config.toml"),
            "[dataset]\nid_column = \"uri\"\n\n[file_loading]\ndelimiter = 59\n",
        )
        .unwrap();
        let config = AppConfig::load_from(&manager).unwrap();
        assert_eq!(config.dataset.id_column, "uri");
        assert_eq!(config.file_loading.delimiter, Some(b';'));
    }

    #[test]
    fn test_empty_id_column_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let manager = ConfigManager::with_dir(dir.path().to_path_buf());
        std::fs::write(
            manager.config_path("config.toml"),
            "[dataset]\nid_column = \"\"\n",
        )
        .unwrap();
        assert!(AppConfig::load_from(&manager).is_err());
    }
}
