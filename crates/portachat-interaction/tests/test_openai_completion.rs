use std::sync::Arc;

use portachat_core::completion::{CompletionError, CompletionService};
use portachat_core::config::PortachatConfig;
use portachat_core::credential::CredentialStore;
use portachat_infrastructure::FileCredentialStore;
use portachat_interaction::OpenAiCompletionService;
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn service_for(server: &MockServer, temp_dir: &TempDir, key: Option<&str>) -> OpenAiCompletionService {
    let store = FileCredentialStore::new(Some(temp_dir.path())).unwrap();
    if let Some(key) = key {
        store.persist(key).await.unwrap();
    }
    let config = PortachatConfig {
        api_base_url: format!("{}/v1/chat/completions", server.uri()),
        ..PortachatConfig::default()
    };
    OpenAiCompletionService::new(Arc::new(store), &config).unwrap()
}

#[tokio::test]
async fn test_successful_completion() {
    let server = MockServer::start().await;
    let temp_dir = TempDir::new().unwrap();

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .and(body_partial_json(json!({
            "model": "gpt-3.5-turbo",
            "messages": [{"role": "user", "content": "hello"}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"role": "assistant", "content": "hi there"}}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let service = service_for(&server, &temp_dir, Some("sk-test")).await;

    assert_eq!(service.complete("hello").await.unwrap(), "hi there");
}

#[tokio::test]
async fn test_missing_key_sends_nothing() {
    let server = MockServer::start().await;
    let temp_dir = TempDir::new().unwrap();

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let service = service_for(&server, &temp_dir, None).await;

    assert_eq!(
        service.complete("hello").await,
        Err(CompletionError::CredentialMissing)
    );
}

#[tokio::test]
async fn test_api_error_message_is_extracted() {
    let server = MockServer::start().await;
    let temp_dir = TempDir::new().unwrap();

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429).set_body_json(json!({
            "error": {"message": "Rate limit reached", "type": "requests"}
        })))
        .mount(&server)
        .await;

    let service = service_for(&server, &temp_dir, Some("sk-test")).await;

    assert_eq!(
        service.complete("hello").await,
        Err(CompletionError::Api {
            status: 429,
            message: "Rate limit reached".to_string()
        })
    );
}

#[tokio::test]
async fn test_malformed_body_is_invalid_response() {
    let server = MockServer::start().await;
    let temp_dir = TempDir::new().unwrap();

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let service = service_for(&server, &temp_dir, Some("sk-test")).await;

    assert!(matches!(
        service.complete("hello").await,
        Err(CompletionError::InvalidResponse(_))
    ));
}

#[tokio::test]
async fn test_unreachable_endpoint_is_transport_error() {
    let temp_dir = TempDir::new().unwrap();
    let store = FileCredentialStore::new(Some(temp_dir.path())).unwrap();
    store.persist("sk-test").await.unwrap();
    let config = PortachatConfig {
        api_base_url: "http://127.0.0.1:9/v1/chat/completions".to_string(),
        request_timeout_secs: Some(5),
        ..PortachatConfig::default()
    };
    let service = OpenAiCompletionService::new(Arc::new(store), &config).unwrap();

    assert!(matches!(
        service.complete("hello").await,
        Err(CompletionError::Transport(_))
    ));
}
