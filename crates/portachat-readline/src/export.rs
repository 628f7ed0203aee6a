use portachat_core::session::{MessageKind, MessageRole, RenderedMessage};

/// Builds an HTML fragment from already-sanitized rendered messages.
pub fn transcript_fragment(messages: &[RenderedMessage]) -> String {
    let mut html = String::from("<div class=\"chat-messages\">\n");
    for message in messages {
        let role = match message.role {
            MessageRole::User => "user",
            MessageRole::Assistant => "ai",
        };
        let kind = match message.kind {
            MessageKind::Turn => "",
            MessageKind::Advisory => " advisory",
            MessageKind::Error => " error",
        };
        html.push_str(&format!(
            "  <div class=\"message {role}-message{kind}\" data-time=\"{}\">{}</div>\n",
            message.timestamp,
            message.html.trim_end()
        ));
    }
    html.push_str("</div>\n");
    html
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fragment_wraps_each_message() {
        let messages = vec![
            RenderedMessage {
                role: MessageRole::User,
                kind: MessageKind::Turn,
                html: "hello".to_string(),
                timestamp: "2026-01-01T00:00:00+00:00".to_string(),
            },
            RenderedMessage {
                role: MessageRole::Assistant,
                kind: MessageKind::Error,
                html: "<p>Error: boom</p>\n".to_string(),
                timestamp: "2026-01-01T00:00:01+00:00".to_string(),
            },
        ];

        let html = transcript_fragment(&messages);

        assert!(html.contains("class=\"message user-message\" data-time=\"2026-01-01T00:00:00+00:00\">hello</div>"));
        assert!(html.contains("class=\"message ai-message error\""));
        assert!(html.contains("<p>Error: boom</p></div>"));
        assert!(html.starts_with("<div class=\"chat-messages\">"));
    }
}
