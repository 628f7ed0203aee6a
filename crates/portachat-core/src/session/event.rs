use serde::{Deserialize, Serialize};

use super::MessageRole;
use crate::credential::CredentialStatus;

/// Notifications published by the session controller for its UI layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    /// A message was appended to the transcript at `index`.
    MessageAppended { index: usize, role: MessageRole },
    /// A completion request started (`true`) or resolved (`false`).
    BusyChanged { busy: bool },
    /// The credential gate reported a status.
    CredentialStatusChanged { status: CredentialStatus },
    /// The UI should surface the credential-entry affordance.
    CredentialPromptRequested,
}
