//! Configuration service implementation.
//!
//! This module provides a ConfigService that loads the application
//! configuration from the configuration file (~/.config/portachat/config.toml).

use crate::paths::PortachatPaths;
use crate::storage::AtomicTomlFile;
use portachat_core::config::PortachatConfig;
use portachat_core::error::{PortachatError, Result};
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

/// Configuration service that loads and caches the application configuration.
///
/// A missing config file is created with default values on first load.
#[derive(Clone)]
pub struct ConfigService {
    file: Arc<AtomicTomlFile<PortachatConfig>>,
    /// Cached configuration loaded from file.
    config: Arc<RwLock<Option<PortachatConfig>>>,
}

impl ConfigService {
    /// Creates a service for `<base>/config.toml`, or the platform default when
    /// `base_path` is `None`. Nothing is read until the first access.
    pub fn new(base_path: Option<&Path>) -> Result<Self> {
        let path = PortachatPaths::new(base_path)
            .config_file()
            .map_err(|e| PortachatError::config(format!("Failed to get config path: {}", e)))?;
        Ok(Self::with_path(path))
    }

    pub fn with_path(path: PathBuf) -> Self {
        Self {
            file: Arc::new(AtomicTomlFile::new(path)),
            config: Arc::new(RwLock::new(None)),
        }
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Gets the configuration, loading from file if not cached.
    pub fn get_config(&self) -> Result<PortachatConfig> {
        if let Some(cached) = self.read_cache()? {
            return Ok(cached);
        }

        let loaded = match self.file.load()? {
            Some(config) => config,
            None => {
                let default_config = PortachatConfig::default();
                self.file.save(&default_config)?;
                tracing::info!(
                    "[Config] Created default config at {}",
                    self.file.path().display()
                );
                default_config
            }
        };

        self.write_cache(Some(loaded.clone()))?;
        Ok(loaded)
    }

    /// Applies `f` to the stored configuration and refreshes the cache.
    pub fn update<F>(&self, f: F) -> Result<PortachatConfig>
    where
        F: FnOnce(&mut PortachatConfig),
    {
        self.file.update(PortachatConfig::default(), |config| {
            f(config);
            Ok(())
        })?;
        self.invalidate_cache()?;
        self.get_config()
    }

    /// Invalidates the cache, forcing a reload on next access.
    pub fn invalidate_cache(&self) -> Result<()> {
        self.write_cache(None)
    }

    fn read_cache(&self) -> Result<Option<PortachatConfig>> {
        let guard = self
            .config
            .read()
            .map_err(|e| PortachatError::internal(format!("Config cache poisoned: {}", e)))?;
        Ok(guard.clone())
    }

    fn write_cache(&self, value: Option<PortachatConfig>) -> Result<()> {
        let mut guard = self
            .config
            .write()
            .map_err(|e| PortachatError::internal(format!("Config cache poisoned: {}", e)))?;
        *guard = value;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_config_is_created_with_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let service = ConfigService::new(Some(temp_dir.path())).unwrap();

        let config = service.get_config().unwrap();

        assert_eq!(config, PortachatConfig::default());
        assert!(temp_dir.path().join("config.toml").exists());
    }

    #[test]
    fn test_existing_config_is_read() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(
            temp_dir.path().join("config.toml"),
            "model = \"gpt-4o\"\nmax_tokens = 512\n",
        )
        .unwrap();
        let service = ConfigService::new(Some(temp_dir.path())).unwrap();

        let config = service.get_config().unwrap();

        assert_eq!(config.model, "gpt-4o");
        assert_eq!(config.max_tokens, Some(512));
    }

    #[test]
    fn test_update_persists_and_refreshes_cache() {
        let temp_dir = TempDir::new().unwrap();
        let service = ConfigService::new(Some(temp_dir.path())).unwrap();
        service.get_config().unwrap();

        let updated = service
            .update(|config| config.request_timeout_secs = Some(30))
            .unwrap();
        assert_eq!(updated.request_timeout_secs, Some(30));

        let fresh = ConfigService::new(Some(temp_dir.path())).unwrap();
        assert_eq!(fresh.get_config().unwrap().request_timeout_secs, Some(30));
    }

    #[test]
    fn test_invalid_config_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("config.toml"), "model = ").unwrap();
        let service = ConfigService::new(Some(temp_dir.path())).unwrap();

        assert!(service.get_config().unwrap_err().is_serialization());
    }
}
