//! Core domain of Portachat: a single chat session with a hosted model,
//! gated by one stored API credential.

pub mod completion;
pub mod config;
pub mod credential;
pub mod error;
pub mod render;
pub mod session;

// Re-export common types
pub use completion::{CompletionError, CompletionService};
pub use credential::{CredentialError, CredentialGate, CredentialStatus, CredentialStore};
pub use error::PortachatError;
pub use render::RenderPipeline;
pub use session::{Message, MessageRole, SessionController, SessionEvent, SubmitOutcome};
