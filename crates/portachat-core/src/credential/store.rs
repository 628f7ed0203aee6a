//! Credential persistence trait.
//!
//! Defines the interface the credential gate uses to reach secure storage.

use crate::error::Result;

/// Persistence collaborator for the single API credential.
///
/// "No credential stored" is a successful answer (`false` / `None`), never an
/// error; errors are reserved for the store itself being unusable.
///
/// # Security Note
///
/// Implementations should ensure that:
/// - Secret files have appropriate permissions (e.g., 600 on Unix)
/// - Secrets are never logged or exposed in error messages
#[async_trait::async_trait]
pub trait CredentialStore: Send + Sync {
    /// Reports whether a credential is stored, without reading it out.
    async fn exists(&self) -> Result<bool>;

    /// Reads the stored credential, `None` if there is none.
    async fn retrieve(&self) -> Result<Option<String>>;

    /// Stores `value`, replacing any previous credential.
    async fn persist(&self, value: &str) -> Result<()>;
}
