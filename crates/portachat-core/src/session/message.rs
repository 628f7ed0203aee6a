//! Conversation message types.
//!
//! This module contains types for representing messages in a conversation,
//! including roles and message content.

use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

/// Represents the role of a message in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// Message typed by the user.
    User,
    /// Message attributed to the assistant (replies, errors and advisories).
    Assistant,
}

/// What an entry in the transcript stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    /// A real conversation turn (user prompt or model reply).
    Turn,
    /// Informational text produced locally, never sent to or received from the model.
    Advisory,
    /// Surrogate reply describing a failed request.
    Error,
}

/// A single message in a conversation.
///
/// `content` is fixed at construction. The rendered form starts out empty
/// and is filled in exactly once by the render pipeline.
#[derive(Debug, Clone)]
pub struct Message {
    role: MessageRole,
    kind: MessageKind,
    content: String,
    /// Timestamp when the message was created (RFC 3339).
    timestamp: String,
    rendered: OnceLock<String>,
}

impl Message {
    fn new(role: MessageRole, kind: MessageKind, content: impl Into<String>) -> Self {
        Self {
            role,
            kind,
            content: content.into(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            rendered: OnceLock::new(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MessageRole::User, MessageKind::Turn, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(MessageRole::Assistant, MessageKind::Turn, content)
    }

    pub fn advisory(content: impl Into<String>) -> Self {
        Self::new(MessageRole::Assistant, MessageKind::Advisory, content)
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self::new(MessageRole::Assistant, MessageKind::Error, content)
    }

    pub fn role(&self) -> MessageRole {
        self.role
    }

    pub fn kind(&self) -> MessageKind {
        self.kind
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    /// The cached display form, `None` until the message has been rendered.
    pub fn rendered_content(&self) -> Option<&str> {
        self.rendered.get().map(String::as_str)
    }

    pub(crate) fn rendered_cell(&self) -> &OnceLock<String> {
        &self.rendered
    }
}

/// A rendered transcript entry handed to presentation code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedMessage {
    pub role: MessageRole,
    pub kind: MessageKind,
    pub html: String,
    pub timestamp: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors_set_role_and_kind() {
        assert_eq!(Message::user("hi").role(), MessageRole::User);
        assert_eq!(Message::assistant("yo").kind(), MessageKind::Turn);

        let advisory = Message::advisory("configure a key");
        assert_eq!(advisory.role(), MessageRole::Assistant);
        assert_eq!(advisory.kind(), MessageKind::Advisory);

        let error = Message::error("Error: boom");
        assert_eq!(error.role(), MessageRole::Assistant);
        assert_eq!(error.kind(), MessageKind::Error);
    }

    #[test]
    fn test_new_message_is_unrendered() {
        let message = Message::assistant("**hello**");
        assert!(message.rendered_content().is_none());
        assert!(chrono::DateTime::parse_from_rfc3339(message.timestamp()).is_ok());
    }
}
