//! Unified path management for portachat configuration files.
//!
//! All configuration, secrets and logs live under one base directory so a
//! custom location can be supplied for tests or portable installs.

use std::path::{Path, PathBuf};

/// Name of the application directory under the platform config dir.
const APP_DIR_NAME: &str = "portachat";

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// Platform config directory could not be determined.
    ConfigDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::ConfigDirNotFound => write!(f, "Cannot find config directory"),
        }
    }
}

impl std::error::Error for PathError {}

/// Unified path management for portachat.
///
/// # Directory Structure
///
/// ```text
/// ~/.config/portachat/         # Base directory (or a custom one)
/// ├── config.toml              # Application configuration
/// ├── secret.json              # API key
/// └── logs/                    # Application logs
///     └── portachat.log.YYYY-MM-DD
/// ```
#[derive(Debug, Clone)]
pub struct PortachatPaths {
    base: Option<PathBuf>,
}

impl PortachatPaths {
    /// Creates a resolver rooted at `base`, or at the platform config
    /// directory when `None`.
    pub fn new(base: Option<&Path>) -> Self {
        Self {
            base: base.map(Path::to_path_buf),
        }
    }

    /// Returns the portachat base directory.
    ///
    /// # Returns
    ///
    /// - `Ok(PathBuf)`: Path to the base directory (e.g., `~/.config/portachat/`)
    /// - `Err(PathError::ConfigDirNotFound)`: Could not determine directory
    pub fn config_dir(&self) -> Result<PathBuf, PathError> {
        match &self.base {
            Some(base) => Ok(base.clone()),
            None => dirs::config_dir()
                .map(|dir| dir.join(APP_DIR_NAME))
                .ok_or(PathError::ConfigDirNotFound),
        }
    }

    /// Returns the path to the main configuration file.
    pub fn config_file(&self) -> Result<PathBuf, PathError> {
        Ok(self.config_dir()?.join("config.toml"))
    }

    /// Returns the path to the secrets file.
    ///
    /// # Security Note
    ///
    /// The file is written with 600 permissions on Unix.
    pub fn secret_file(&self) -> Result<PathBuf, PathError> {
        Ok(self.config_dir()?.join("secret.json"))
    }

    /// Returns the directory for rolling log files.
    pub fn logs_dir(&self) -> Result<PathBuf, PathError> {
        Ok(self.config_dir()?.join("logs"))
    }
}

impl Default for PortachatPaths {
    fn default() -> Self {
        Self::new(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_custom_base_paths() {
        let paths = PortachatPaths::new(Some(Path::new("/tmp/portachat-test")));

        assert_eq!(
            paths.config_file().unwrap(),
            PathBuf::from("/tmp/portachat-test/config.toml")
        );
        assert_eq!(
            paths.secret_file().unwrap(),
            PathBuf::from("/tmp/portachat-test/secret.json")
        );
        assert_eq!(
            paths.logs_dir().unwrap(),
            PathBuf::from("/tmp/portachat-test/logs")
        );
    }

    #[test]
    fn test_default_base_ends_with_app_dir() {
        if let Ok(dir) = PortachatPaths::default().config_dir() {
            assert!(dir.ends_with(APP_DIR_NAME));
        }
    }
}
