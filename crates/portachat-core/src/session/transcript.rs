use std::sync::Arc;

use super::message::Message;

/// Append-only, ordered log of the messages in a session.
///
/// Messages are stored behind `Arc` so snapshots handed to the UI share the
/// render cache with the transcript itself.
#[derive(Debug, Default, Clone)]
pub struct Transcript {
    messages: Vec<Arc<Message>>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `message` and returns its position.
    pub fn append(&mut self, message: Message) -> usize {
        self.messages.push(Arc::new(message));
        self.messages.len() - 1
    }

    /// Iterates over the messages in insertion order.
    ///
    /// The iterator is `Clone`, so a caller can walk the view more than once.
    pub fn all(&self) -> std::slice::Iter<'_, Arc<Message>> {
        self.messages.iter()
    }

    pub fn get(&self, index: usize) -> Option<&Arc<Message>> {
        self.messages.get(index)
    }

    pub fn last(&self) -> Option<&Arc<Message>> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

impl<'a> IntoIterator for &'a Transcript {
    type Item = &'a Arc<Message>;
    type IntoIter = std::slice::Iter<'a, Arc<Message>>;

    fn into_iter(self) -> Self::IntoIter {
        self.all()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::MessageRole;

    #[test]
    fn test_append_returns_positions() {
        let mut transcript = Transcript::new();
        assert!(transcript.is_empty());

        assert_eq!(transcript.append(Message::user("one")), 0);
        assert_eq!(transcript.append(Message::assistant("two")), 1);
        assert_eq!(transcript.len(), 2);
        assert_eq!(transcript.last().unwrap().content(), "two");
    }

    #[test]
    fn test_all_preserves_order_and_restarts() {
        let mut transcript = Transcript::new();
        transcript.append(Message::user("a"));
        transcript.append(Message::assistant("b"));
        transcript.append(Message::user("c"));

        let view = transcript.all();
        let first: Vec<&str> = view.clone().map(|m| m.content()).collect();
        let second: Vec<&str> = view.map(|m| m.content()).collect();

        assert_eq!(first, vec!["a", "b", "c"]);
        assert_eq!(first, second);

        let roles: Vec<MessageRole> = (&transcript).into_iter().map(|m| m.role()).collect();
        assert_eq!(
            roles,
            vec![MessageRole::User, MessageRole::Assistant, MessageRole::User]
        );
    }
}
