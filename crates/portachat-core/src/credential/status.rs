use serde::{Deserialize, Serialize};

/// Whether a usable credential exists, as last observed by the gate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "message", rename_all = "snake_case")]
pub enum CredentialStatus {
    /// Nothing stored.
    Unconfigured,
    /// A credential is stored.
    Configured,
    /// The store could not be read or written.
    Error(String),
}

impl CredentialStatus {
    pub fn is_configured(&self) -> bool {
        matches!(self, Self::Configured)
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }

    /// Short text for a status line next to the credential-entry affordance.
    pub fn describe(&self) -> String {
        match self {
            Self::Unconfigured => "API key not configured.".to_string(),
            Self::Configured => "API key configured.".to_string(),
            Self::Error(message) => format!("Could not access the API key: {message}"),
        }
    }
}

impl Default for CredentialStatus {
    fn default() -> Self {
        Self::Unconfigured
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_with_tag() {
        let json = serde_json::to_string(&CredentialStatus::Error("disk".into())).unwrap();
        assert_eq!(json, r#"{"state":"error","message":"disk"}"#);

        let json = serde_json::to_string(&CredentialStatus::Configured).unwrap();
        assert_eq!(json, r#"{"state":"configured"}"#);
    }

    #[test]
    fn test_describe_mentions_cause() {
        let status = CredentialStatus::Error("permission denied".into());
        assert!(status.describe().contains("permission denied"));
        assert!(status.is_error());
        assert!(!status.is_configured());
    }
}
