//! Configuration management for packserve

pub mod schema;

pub use schema::Config;

use crate::error::{PackserveError, PackserveResult};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

/// Configuration manager
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Create a new config manager with default path
    pub fn new() -> Self {
        Self {
            config_path: Self::default_config_path(),
        }
    }

    /// Create a config manager with a custom path
    pub fn with_path(path: PathBuf) -> Self {
        Self { config_path: path }
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("packserve")
            .join("config.toml")
    }

    /// Load configuration, using defaults if not exists
    pub async fn load(&self) -> PackserveResult<Config> {
        if !self.config_path.exists() {
            debug!("Config file not found, using defaults");
            return Ok(Config::default());
        }

        self.load_from_file(&self.config_path).await
    }

    /// Load configuration from a specific file
    pub async fn load_from_file(&self, path: &Path) -> PackserveResult<Config> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| PackserveError::io(format!("reading config from {}", path.display()), e))?;

        toml::from_str(&content).map_err(|e| PackserveError::ConfigInvalid {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Save configuration to file
    pub async fn save(&self, config: &Config) -> PackserveResult<()> {
        self.ensure_config_dir().await?;

        let content = toml::to_string_pretty(config)?;
        fs::write(&self.config_path, content).await.map_err(|e| {
            PackserveError::io(
                format!("writing config to {}", self.config_path.display()),
                e,
            )
        })?;

        info!("Configuration saved to {}", self.config_path.display());
        Ok(())
    }

    /// Ensure the data and cache directories exist
    pub async fn ensure_storage_dirs(config: &Config) -> PackserveResult<()> {
        for dir in [&config.storage.data_dir, &config.storage.cache_dir] {
            fs::create_dir_all(dir)
                .await
                .map_err(|e| PackserveError::io(format!("creating directory {}", dir.display()), e))?;
        }
        Ok(())
    }

    async fn ensure_config_dir(&self) -> PackserveResult<()> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| PackserveError::io(format!("creating {}", parent.display()), e))?;
        }
        Ok(())
    }

    /// Get the config file path
    pub fn path(&self) -> &Path {
        &self.config_path
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}
