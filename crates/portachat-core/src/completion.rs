//! Completion request surface.
//!
//! The session controller hands each trimmed prompt to a [`CompletionService`]
//! and turns the outcome into a transcript entry.

use thiserror::Error;

/// Failures reported by a completion backend.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompletionError {
    /// No credential is stored, so no request was sent.
    #[error("API key is not configured")]
    CredentialMissing,
    /// The remote service answered with a non-success status.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },
    /// The request never produced a response (DNS, connect, TLS, timeout).
    #[error("request failed: {0}")]
    Transport(String),
    /// The response body could not be understood.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
    /// The response carried no reply text.
    #[error("no response from the model")]
    EmptyResponse,
}

/// Remote capability that turns a prompt into reply text.
#[async_trait::async_trait]
pub trait CompletionService: Send + Sync {
    /// Sends `prompt` (already trimmed and non-empty) and waits for the reply.
    async fn complete(&self, prompt: &str) -> Result<String, CompletionError>;
}
