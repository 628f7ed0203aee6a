use std::sync::Arc;

use thiserror::Error;
use tokio::sync::RwLock;

use super::{CredentialStatus, CredentialStore};
use crate::error::PortachatError;

/// Failures reported by [`CredentialGate`] operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CredentialError {
    /// The candidate credential was empty or whitespace.
    #[error("The API key cannot be empty.")]
    Validation,
    /// No credential is stored.
    #[error("No API key is configured.")]
    NotConfigured,
    /// The store could not be read or written.
    #[error("Credential store error: {0}")]
    Persistence(#[from] PortachatError),
}

/// Tracks whether a usable credential exists and guards writes to it.
///
/// The gate is the only writer of [`CredentialStatus`]. Status writes are
/// serialized by an async lock; the last completed operation wins.
pub struct CredentialGate {
    store: Arc<dyn CredentialStore>,
    status: RwLock<CredentialStatus>,
}

impl CredentialGate {
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        Self {
            store,
            status: RwLock::new(CredentialStatus::Unconfigured),
        }
    }

    /// Returns the last observed status without touching the store.
    pub async fn status(&self) -> CredentialStatus {
        self.status.read().await.clone()
    }

    /// Asks the store whether a credential exists.
    ///
    /// A store failure yields [`CredentialStatus::Error`], which is distinct
    /// from "nothing stored".
    pub async fn check(&self) -> CredentialStatus {
        let status = match self.store.exists().await {
            Ok(true) => CredentialStatus::Configured,
            Ok(false) => CredentialStatus::Unconfigured,
            Err(e) => {
                tracing::warn!("[Credential] Presence check failed: {}", e);
                CredentialStatus::Error(e.to_string())
            }
        };
        self.set_status(status.clone()).await;
        status
    }

    /// Retrieves the raw credential to pre-fill an edit field.
    ///
    /// The returned value must not be logged or written to the transcript.
    pub async fn load_for_display(&self) -> Result<String, CredentialError> {
        match self.store.retrieve().await {
            Ok(Some(value)) => {
                self.set_status(CredentialStatus::Configured).await;
                Ok(value)
            }
            Ok(None) => {
                self.set_status(CredentialStatus::Unconfigured).await;
                Err(CredentialError::NotConfigured)
            }
            Err(e) => {
                tracing::warn!("[Credential] Failed to load credential: {}", e);
                self.set_status(CredentialStatus::Error(e.to_string())).await;
                Err(CredentialError::Persistence(e))
            }
        }
    }

    /// Validates and stores a new credential.
    ///
    /// Blank candidates are rejected before the store is touched and leave the
    /// status as it was.
    pub async fn save(&self, candidate: &str) -> Result<CredentialStatus, CredentialError> {
        let candidate = candidate.trim();
        if candidate.is_empty() {
            return Err(CredentialError::Validation);
        }

        if let Err(e) = self.store.persist(candidate).await {
            tracing::error!("[Credential] Failed to persist credential: {}", e);
            self.set_status(CredentialStatus::Error(e.to_string())).await;
            return Err(CredentialError::Persistence(e));
        }

        tracing::info!("[Credential] Credential saved");
        self.set_status(CredentialStatus::Configured).await;
        Ok(CredentialStatus::Configured)
    }

    async fn set_status(&self, status: CredentialStatus) {
        let mut guard = self.status.write().await;
        if *guard != status {
            tracing::debug!("[Credential] Status {:?} -> {:?}", *guard, status);
        }
        *guard = status;
    }
}
