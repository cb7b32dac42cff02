//! On-disk API key storage.
//!
//! The key lives in `~/.hyperbolic/config.json` as `{"api_key": "..."}`.
//! A `HYPERBOLIC_API_KEY` environment variable, when set, takes precedence
//! over the stored key.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::{CredentialError, HyperbolicError, Result};

/// Environment variable that overrides the stored API key.
pub const API_KEY_ENV: &str = "HYPERBOLIC_API_KEY";

/// Credential directory name under the home directory.
const CONFIG_DIR: &str = ".hyperbolic";

/// Credential file name.
const CONFIG_FILE: &str = "config.json";

/// Persisted credential file contents.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoredCredentials {
    /// Bearer token used for every API call.
    #[serde(default)]
    pub api_key: String,
}

/// File-backed credential source.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    /// Path to the credential file.
    path: PathBuf,
    /// Key taken from the environment, if any.
    env_override: Option<String>,
}

impl CredentialStore {
    /// Creates a store at the default location, honouring the
    /// `HYPERBOLIC_API_KEY` override.
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined.
    pub fn from_env() -> Result<Self> {
        let path = default_credentials_path()?;
        Ok(Self::with_path(path).with_env_override(std::env::var(API_KEY_ENV).ok()))
    }

    /// Creates a store backed by the given file, without any override.
    #[must_use]
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            env_override: None,
        }
    }

    /// Sets an override key. Empty or whitespace-only values are ignored.
    #[must_use]
    pub fn with_env_override(mut self, value: Option<String>) -> Self {
        self.env_override = value
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());
        self
    }

    /// Path of the backing credential file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the API key to use for requests.
    ///
    /// # Errors
    ///
    /// Returns `NotConfigured` if no key has been saved, `EmptyApiKey` if the
    /// stored key is blank, or a read/parse error for a damaged file.
    pub fn api_key(&self) -> Result<String> {
        if let Some(key) = &self.env_override {
            debug!("Using API key from {API_KEY_ENV}");
            return Ok(key.clone());
        }

        let stored = self.load()?;
        let key = stored.api_key.trim();
        if key.is_empty() {
            return Err(CredentialError::EmptyApiKey.into());
        }

        Ok(key.to_string())
    }

    /// Loads the credential file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing, unreadable or not valid JSON.
    pub fn load(&self) -> Result<StoredCredentials> {
        if !self.path.exists() {
            return Err(HyperbolicError::Credential(CredentialError::NotConfigured {
                path: self.path.clone(),
            }));
        }

        debug!("Loading credentials from: {}", self.path.display());

        let content = std::fs::read_to_string(&self.path).map_err(|e| {
            HyperbolicError::Credential(CredentialError::Unreadable {
                path: self.path.clone(),
                message: e.to_string(),
            })
        })?;

        serde_json::from_str(&content).map_err(|e| {
            HyperbolicError::Credential(CredentialError::Corrupted {
                path: self.path.clone(),
                message: e.to_string(),
            })
        })
    }

    /// Saves an API key, creating the credential directory if needed.
    ///
    /// # Errors
    ///
    /// Returns `EmptyApiKey` for a blank key, or a write error.
    pub fn save_api_key(&self, api_key: &str) -> Result<()> {
        let api_key = api_key.trim();
        if api_key.is_empty() {
            return Err(CredentialError::EmptyApiKey.into());
        }

        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir).map_err(|e| self.write_failed(&e))?;
        }

        let content = serde_json::to_string_pretty(&StoredCredentials {
            api_key: api_key.to_string(),
        })
        .map_err(|e| HyperbolicError::internal(format!("Failed to serialize credentials: {e}")))?;

        std::fs::write(&self.path, content).map_err(|e| self.write_failed(&e))?;
        restrict_permissions(&self.path).map_err(|e| self.write_failed(&e))?;

        info!("Saved API key to: {}", self.path.display());
        Ok(())
    }

    fn write_failed(&self, err: &std::io::Error) -> HyperbolicError {
        HyperbolicError::Credential(CredentialError::WriteFailed {
            path: self.path.clone(),
            message: err.to_string(),
        })
    }
}

/// Default credential file location: `~/.hyperbolic/config.json`.
///
/// # Errors
///
/// Returns an error if the home directory cannot be determined.
pub fn default_credentials_path() -> Result<PathBuf> {
    dirs::home_dir()
        .map(|home| home.join(CONFIG_DIR).join(CONFIG_FILE))
        .ok_or_else(|| CredentialError::HomeDirUnavailable.into())
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
}

#[cfg(not(unix))]
#[allow(clippy::unnecessary_wraps)]
fn restrict_permissions(_path: &Path) -> std::io::Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_store() -> (CredentialStore, TempDir) {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let store = CredentialStore::with_path(temp_dir.path().join(CONFIG_DIR).join(CONFIG_FILE));
        (store, temp_dir)
    }

    #[test]
    fn test_save_and_load() {
        let (store, _temp) = create_test_store();

        store.save_api_key("  sk-test-123 \n").expect("Failed to save key");

        assert_eq!(store.api_key().expect("Failed to read key"), "sk-test-123");
    }

    #[test]
    fn test_missing_file_is_not_configured() {
        let (store, _temp) = create_test_store();

        let err = store.api_key().expect_err("key should be missing");
        assert!(matches!(
            err,
            HyperbolicError::Credential(CredentialError::NotConfigured { .. })
        ));
    }

    #[test]
    fn test_empty_stored_key() {
        let (store, _temp) = create_test_store();
        std::fs::create_dir_all(store.path().parent().expect("parent")).expect("mkdir");
        std::fs::write(store.path(), r#"{"api_key": ""}"#).expect("write");

        let err = store.api_key().expect_err("key should be empty");
        assert!(matches!(
            err,
            HyperbolicError::Credential(CredentialError::EmptyApiKey)
        ));
    }

    #[test]
    fn test_corrupted_file() {
        let (store, _temp) = create_test_store();
        std::fs::create_dir_all(store.path().parent().expect("parent")).expect("mkdir");
        std::fs::write(store.path(), "not json").expect("write");

        let err = store.api_key().expect_err("file should be corrupted");
        assert!(matches!(
            err,
            HyperbolicError::Credential(CredentialError::Corrupted { .. })
        ));
    }

    #[test]
    fn test_rejects_blank_key() {
        let (store, _temp) = create_test_store();

        assert!(store.save_api_key("   ").is_err());
        assert!(!store.path().exists());
    }

    #[test]
    fn test_env_override_wins() {
        let (store, _temp) = create_test_store();
        store.save_api_key("stored-key").expect("Failed to save key");

        let store = store.with_env_override(Some(String::from("env-key")));
        assert_eq!(store.api_key().expect("key"), "env-key");

        let store = store.with_env_override(Some(String::from("  ")));
        assert_eq!(store.api_key().expect("key"), "stored-key");
    }

    #[cfg(unix)]
    #[test]
    fn test_file_is_private() {
        use std::os::unix::fs::PermissionsExt;

        let (store, _temp) = create_test_store();
        store.save_api_key("sk-test").expect("Failed to save key");

        let mode = std::fs::metadata(store.path()).expect("metadata").permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
