//! OpenAiCompletionService - Direct REST API implementation for OpenAI chat completions.
//!
//! The API key is read from the credential store on every request, so a key
//! saved mid-session is picked up by the next message.

use async_trait::async_trait;
use portachat_core::completion::{CompletionError, CompletionService};
use portachat_core::config::PortachatConfig;
use portachat_core::credential::CredentialStore;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Completion backend that talks to the OpenAI HTTP API.
#[derive(Clone)]
pub struct OpenAiCompletionService {
    client: Client,
    credentials: Arc<dyn CredentialStore>,
    endpoint: String,
    model: String,
    max_tokens: Option<u32>,
}

impl OpenAiCompletionService {
    /// Creates a service using the model, endpoint and limits from `config`.
    pub fn new(
        credentials: Arc<dyn CredentialStore>,
        config: &PortachatConfig,
    ) -> Result<Self, CompletionError> {
        let mut builder = Client::builder();
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|err| CompletionError::Transport(format!("Failed to build HTTP client: {err}")))?;

        Ok(Self {
            client,
            credentials,
            endpoint: config.api_base_url.clone(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
        })
    }

    async fn api_key(&self) -> Result<String, CompletionError> {
        match self.credentials.retrieve().await {
            Ok(Some(key)) => Ok(key),
            Ok(None) => Err(CompletionError::CredentialMissing),
            Err(err) => {
                tracing::warn!("[OpenAI] Could not read API key: {}", err);
                Err(CompletionError::Transport(format!(
                    "Could not read the stored API key: {err}"
                )))
            }
        }
    }

    async fn send_request(
        &self,
        api_key: &str,
        body: &ChatCompletionRequest,
    ) -> Result<String, CompletionError> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .json(body)
            .send()
            .await
            .map_err(|err| {
                CompletionError::Transport(format!("OpenAI API request failed: {err}"))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read OpenAI error body".to_string());
            return Err(map_http_error(status, &body_text));
        }

        let parsed: ChatCompletionResponse = response.json().await.map_err(|err| {
            CompletionError::InvalidResponse(format!("Failed to parse OpenAI response: {err}"))
        })?;

        extract_text_response(parsed)
    }
}

#[async_trait]
impl CompletionService for OpenAiCompletionService {
    async fn complete(&self, prompt: &str) -> Result<String, CompletionError> {
        let api_key = self.api_key().await?;

        let request = ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            max_tokens: self.max_tokens,
        };

        tracing::debug!("[OpenAI] POST {} model={}", self.endpoint, self.model);
        self.send_request(&api_key, &request).await
    }
}

#[derive(Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

fn extract_text_response(response: ChatCompletionResponse) -> Result<String, CompletionError> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or(CompletionError::EmptyResponse)
}

fn map_http_error(status: StatusCode, body: &str) -> CompletionError {
    let message = serde_json::from_str::<ErrorResponse>(body)
        .map(|wrapper| wrapper.error.message)
        .unwrap_or_else(|_| body.trim().to_string());

    CompletionError::Api {
        status: status.as_u16(),
        message,
    }
}
