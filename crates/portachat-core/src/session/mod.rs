//! Session domain module.
//!
//! This module contains the conversation data model and the controller that
//! drives a single chat session.
//!
//! # Module Structure
//!
//! - `message`: Conversation message types (`Message`, `MessageRole`, `MessageKind`)
//! - `transcript`: Append-only message log (`Transcript`)
//! - `state`: Request lifecycle state (`SessionState`)
//! - `event`: Notifications for the UI layer (`SessionEvent`)
//! - `controller`: Submission and credential orchestration (`SessionController`)

mod controller;
mod event;
mod message;
mod state;
mod transcript;

// Re-export public API
pub use controller::{
    CREDENTIAL_MISSING_REPLY, CREDENTIAL_SETUP_ADVISORY, REQUEST_FAILURE_PREFIX, SessionController,
    SubmitOutcome, failure_text,
};
pub use event::SessionEvent;
pub use message::{Message, MessageKind, MessageRole, RenderedMessage};
pub use state::SessionState;
pub use transcript::Transcript;
