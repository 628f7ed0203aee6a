use serde::{Deserialize, Serialize};

/// Request lifecycle state of a session.
///
/// `busy` is true exactly while a completion request is outstanding;
/// `pending_user_text` holds the prompt of that request for indicator text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    pub busy: bool,
    pub pending_user_text: Option<String>,
}

impl SessionState {
    pub(crate) fn begin(&mut self, prompt: &str) {
        self.busy = true;
        self.pending_user_text = Some(prompt.to_string());
    }

    pub(crate) fn finish(&mut self) {
        self.busy = false;
        self.pending_user_text = None;
    }
}
