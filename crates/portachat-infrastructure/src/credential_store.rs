//! File-backed credential store.
//!
//! This module provides the `CredentialStore` implementation that keeps the
//! API key in secret.json.

use crate::paths::PortachatPaths;
use crate::storage::{SecretConfig, SecretStorage, SecretStorageError};
use portachat_core::credential::CredentialStore;
use portachat_core::error::{PortachatError, Result};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Credential store backed by secret.json.
///
/// A missing file, or a file whose `api_key` is blank, means "no credential".
/// An unreadable or unparseable file is an error, never "no credential".
///
/// # Example
///
/// ```ignore
/// use portachat_infrastructure::FileCredentialStore;
/// use portachat_core::credential::CredentialStore;
///
/// let store = FileCredentialStore::new(None)?;
/// let configured = store.exists().await?;
/// ```
#[derive(Clone)]
pub struct FileCredentialStore {
    /// Serializes file access between concurrent callers.
    storage: Arc<Mutex<SecretStorage>>,
}

impl FileCredentialStore {
    /// Creates a store at `<base>/secret.json`, or under the platform config
    /// directory when `base` is `None`.
    pub fn new(base_path: Option<&Path>) -> Result<Self> {
        let file_path = PortachatPaths::new(base_path)
            .secret_file()
            .map_err(|e| PortachatError::config(format!("Failed to get secret path: {}", e)))?;
        Ok(Self::with_storage(SecretStorage::with_path(file_path)))
    }

    pub fn with_storage(storage: SecretStorage) -> Self {
        Self {
            storage: Arc::new(Mutex::new(storage)),
        }
    }

    fn read_config(storage: &SecretStorage) -> Result<Option<SecretConfig>> {
        match storage.load() {
            Ok(config) => Ok(Some(config)),
            Err(SecretStorageError::NotFound(_)) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait::async_trait]
impl CredentialStore for FileCredentialStore {
    async fn exists(&self) -> Result<bool> {
        Ok(self.retrieve().await?.is_some())
    }

    async fn retrieve(&self) -> Result<Option<String>> {
        let storage = self.storage.lock().await;
        let config = Self::read_config(&storage)?;
        Ok(config.and_then(|c| c.usable_api_key().map(str::to_string)))
    }

    async fn persist(&self, value: &str) -> Result<()> {
        let storage = self.storage.lock().await;
        // Keep any fields a newer version may have added
        let mut config = match Self::read_config(&storage) {
            Ok(existing) => existing.unwrap_or_default(),
            Err(e) => {
                tracing::warn!("[Credential] Replacing unreadable secret file: {}", e);
                SecretConfig::default()
            }
        };
        config.api_key = Some(value.to_string());
        storage.save(&config)?;
        tracing::info!("[Credential] Secret file written to {}", storage.path().display());
        Ok(())
    }
}
