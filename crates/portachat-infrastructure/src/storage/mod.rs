//! Storage layer for atomic file operations.

mod atomic_file;
mod secret_storage;

pub use atomic_file::{AtomicTomlFile, write_atomic};
pub use secret_storage::{SecretConfig, SecretStorage, SecretStorageError};
