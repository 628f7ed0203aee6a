use std::sync::Arc;

use portachat_core::credential::{CredentialError, CredentialGate, CredentialStatus};
use portachat_infrastructure::FileCredentialStore;
use portachat_infrastructure::storage::SecretStorage;
use tempfile::TempDir;

#[tokio::test]
async fn test_gate_over_secret_file() {
    let temp_dir = TempDir::new().unwrap();
    let store = Arc::new(FileCredentialStore::new(Some(temp_dir.path())).unwrap());
    let gate = CredentialGate::new(store);

    assert_eq!(gate.check().await, CredentialStatus::Unconfigured);
    assert_eq!(gate.save("").await, Err(CredentialError::Validation));
    assert!(!temp_dir.path().join("secret.json").exists());

    assert_eq!(gate.save("sk-abc123").await, Ok(CredentialStatus::Configured));
    assert_eq!(gate.load_for_display().await.unwrap(), "sk-abc123");

    // A second gate over the same directory sees the saved key
    let reopened = CredentialGate::new(Arc::new(
        FileCredentialStore::new(Some(temp_dir.path())).unwrap(),
    ));
    assert_eq!(reopened.check().await, CredentialStatus::Configured);

    let on_disk = SecretStorage::with_path(temp_dir.path().join("secret.json"))
        .load()
        .unwrap();
    assert_eq!(on_disk.usable_api_key(), Some("sk-abc123"));
}

#[tokio::test]
async fn test_gate_reports_unreadable_store_as_error() {
    let temp_dir = TempDir::new().unwrap();
    std::fs::write(temp_dir.path().join("secret.json"), "not json").unwrap();
    let gate = CredentialGate::new(Arc::new(
        FileCredentialStore::new(Some(temp_dir.path())).unwrap(),
    ));

    let status = gate.check().await;
    assert!(status.is_error());
    assert!(matches!(
        gate.load_for_display().await,
        Err(CredentialError::Persistence(_))
    ));

    // A successful save recovers from the error state
    assert_eq!(gate.save("sk-new").await, Ok(CredentialStatus::Configured));
    assert_eq!(gate.check().await, CredentialStatus::Configured);
}
