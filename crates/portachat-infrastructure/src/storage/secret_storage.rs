//! Secret configuration file storage.
//!
//! Reads and writes the API key held in ~/.config/portachat/secret.json.

use super::atomic_file::write_atomic;
use portachat_core::error::PortachatError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Unix permissions for the secret file (user read/write only).
const SECRET_FILE_MODE: u32 = 0o600;

/// On-disk layout of secret.json.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

impl SecretConfig {
    /// The stored key, treating empty or whitespace values as absent.
    pub fn usable_api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }
}

/// Errors that can occur during secret storage operations.
#[derive(Debug)]
pub enum SecretStorageError {
    /// Secret file not found.
    NotFound(PathBuf),
    /// File I/O error.
    IoError(std::io::Error),
    /// JSON parsing error.
    ParseError(serde_json::Error),
    /// Atomic write failed.
    WriteError(PortachatError),
}

impl std::fmt::Display for SecretStorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SecretStorageError::NotFound(path) => {
                write!(f, "Secret file not found at: {}", path.display())
            }
            SecretStorageError::IoError(e) => write!(f, "I/O error: {}", e),
            SecretStorageError::ParseError(e) => write!(f, "JSON parse error: {}", e),
            SecretStorageError::WriteError(e) => write!(f, "Write error: {}", e),
        }
    }
}

impl std::error::Error for SecretStorageError {}

impl From<std::io::Error> for SecretStorageError {
    fn from(e: std::io::Error) -> Self {
        SecretStorageError::IoError(e)
    }
}

impl From<serde_json::Error> for SecretStorageError {
    fn from(e: serde_json::Error) -> Self {
        SecretStorageError::ParseError(e)
    }
}

impl From<SecretStorageError> for PortachatError {
    fn from(e: SecretStorageError) -> Self {
        match e {
            SecretStorageError::NotFound(path) => {
                PortachatError::not_found("secret file", path.display().to_string())
            }
            SecretStorageError::IoError(e) => e.into(),
            SecretStorageError::ParseError(e) => e.into(),
            SecretStorageError::WriteError(e) => e,
        }
    }
}

/// Storage for the secret configuration file (secret.json).
///
/// Responsibilities:
/// - Load secret.json and parse it into `SecretConfig`
/// - Write secret.json atomically with 600 permissions
///
/// Does NOT:
/// - Validate API keys against the provider
/// - Handle encryption (plaintext JSON storage)
pub struct SecretStorage {
    path: PathBuf,
}

impl SecretStorage {
    /// Creates a new SecretStorage with a custom path.
    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    /// Loads the secret configuration from the JSON file.
    ///
    /// # Returns
    ///
    /// - `Ok(SecretConfig)`: Successfully loaded and parsed
    /// - `Err(SecretStorageError::NotFound)`: File doesn't exist
    /// - `Err(SecretStorageError::IoError)`: Failed to read file
    /// - `Err(SecretStorageError::ParseError)`: Invalid JSON format
    pub fn load(&self) -> Result<SecretConfig, SecretStorageError> {
        if !self.path.exists() {
            return Err(SecretStorageError::NotFound(self.path.clone()));
        }

        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(SecretConfig::default());
        }
        let config = serde_json::from_str(&content)?;

        Ok(config)
    }

    /// Writes `config` to the JSON file, replacing any previous content.
    pub fn save(&self, config: &SecretConfig) -> Result<(), SecretStorageError> {
        let json = serde_json::to_string_pretty(config)?;
        write_atomic(&self.path, json.as_bytes(), Some(SECRET_FILE_MODE))
            .map_err(SecretStorageError::WriteError)
    }

    /// Returns the path to the secret file.
    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_nonexistent_file() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("secret.json");
        let storage = SecretStorage::with_path(file_path.clone());

        match storage.load() {
            Err(SecretStorageError::NotFound(path)) => assert_eq!(path, file_path),
            _ => panic!("Expected NotFound error"),
        }
    }

    #[test]
    fn test_load_valid_json() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("secret.json");
        fs::write(&file_path, r#"{ "api_key": "sk-test-123" }"#).unwrap();

        let config = SecretStorage::with_path(file_path).load().unwrap();

        assert_eq!(config.usable_api_key(), Some("sk-test-123"));
    }

    #[test]
    fn test_blank_key_is_not_usable() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("secret.json");
        fs::write(&file_path, r#"{ "api_key": "   " }"#).unwrap();

        let config = SecretStorage::with_path(file_path).load().unwrap();

        assert_eq!(config.usable_api_key(), None);
    }

    #[test]
    fn test_load_invalid_json() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("secret.json");
        fs::write(&file_path, r#"{ invalid json"#).unwrap();

        let result = SecretStorage::with_path(file_path).load();

        assert!(matches!(result, Err(SecretStorageError::ParseError(_))));
    }

    #[test]
    fn test_save_creates_directory_and_round_trips() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("nested").join("secret.json");
        let storage = SecretStorage::with_path(file_path.clone());

        storage
            .save(&SecretConfig {
                api_key: Some("sk-saved".to_string()),
            })
            .unwrap();

        assert!(file_path.exists());
        assert_eq!(storage.load().unwrap().usable_api_key(), Some("sk-saved"));
    }

    #[test]
    fn test_not_found_converts_to_portachat_not_found() {
        let err: PortachatError =
            SecretStorageError::NotFound(PathBuf::from("/nowhere/secret.json")).into();
        assert!(err.is_not_found());
    }
}
