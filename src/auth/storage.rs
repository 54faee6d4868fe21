//! Durable credential storage
//!
//! File-backed key/value holder for the access/refresh token pair. The
//! store has no business logic: no expiry tracking, no token parsing.
//! Writes are immediately visible to subsequent reads in the same
//! process, and the file survives restarts.

use super::types::{AuthError, Credentials};
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use log::{debug, error, info};
use std::path::{Path, PathBuf};

const APP_NAME: &str = "HRChat";
const CREDENTIALS_FILE: &str = "credentials.dat";

// Simple obfuscation key - not cryptographically secure but prevents casual
// reading of the token file. The trust boundary is the transport layer.
const OBFUSCATION_KEY: &[u8] = b"HRChatCredentialStorage";

/// File-backed store for the bearer credential pair
pub struct TokenStore {
    data_dir: PathBuf,
}

impl TokenStore {
    /// Create a store under the platform data directory
    pub fn new() -> Result<Self, AuthError> {
        let data_dir = dirs::data_local_dir()
            .map(|d| d.join(APP_NAME))
            .ok_or_else(|| {
                AuthError::StorageError("Could not determine data directory".to_string())
            })?;
        Self::with_dir(data_dir)
    }

    /// Create a store rooted at an explicit directory
    pub fn with_dir(dir: impl AsRef<Path>) -> Result<Self, AuthError> {
        let data_dir = dir.as_ref().to_path_buf();

        std::fs::create_dir_all(&data_dir).map_err(|e| {
            AuthError::StorageError(format!("Failed to create data directory: {}", e))
        })?;

        debug!("TokenStore initialized at {}", data_dir.display());

        Ok(Self { data_dir })
    }

    fn credentials_path(&self) -> PathBuf {
        self.data_dir.join(CREDENTIALS_FILE)
    }

    /// Simple XOR obfuscation (symmetric: applying twice recovers the input)
    fn obfuscate(data: &[u8]) -> Vec<u8> {
        data.iter()
            .enumerate()
            .map(|(i, &byte)| byte ^ OBFUSCATION_KEY[i % OBFUSCATION_KEY.len()])
            .collect()
    }

    /// Read the stored credential pair, if any
    ///
    /// A corrupt or unreadable file is deleted and treated as absent;
    /// the session layer then falls back to an anonymous start.
    pub fn get(&self) -> Option<Credentials> {
        let path = self.credentials_path();

        if !path.exists() {
            debug!("No credential file (first run or logged out)");
            return None;
        }

        let encoded = match std::fs::read_to_string(&path) {
            Ok(data) => data,
            Err(e) => {
                error!("Failed to read credential file: {}", e);
                return None;
            }
        };

        let obfuscated = match BASE64.decode(encoded.trim()) {
            Ok(data) => data,
            Err(e) => {
                error!("Failed to decode credential file (base64): {}", e);
                let _ = std::fs::remove_file(&path);
                return None;
            }
        };

        let json_bytes = Self::obfuscate(&obfuscated);
        let json = match String::from_utf8(json_bytes) {
            Ok(s) => s,
            Err(e) => {
                error!("Failed to decode credential file (utf8): {}", e);
                let _ = std::fs::remove_file(&path);
                return None;
            }
        };

        match serde_json::from_str::<Credentials>(&json) {
            Ok(credentials) => {
                debug!("Loaded stored credentials");
                Some(credentials)
            }
            Err(e) => {
                error!("Failed to deserialize credential file: {}", e);
                let _ = std::fs::remove_file(&path);
                None
            }
        }
    }

    /// Persist a credential pair, fully overwriting any previous one
    pub fn set(&self, credentials: &Credentials) -> Result<(), AuthError> {
        let path = self.credentials_path();

        let json = serde_json::to_string(credentials).map_err(|e| {
            AuthError::StorageError(format!("Failed to serialize credentials: {}", e))
        })?;

        let obfuscated = Self::obfuscate(json.as_bytes());
        let encoded = BASE64.encode(&obfuscated);

        std::fs::write(&path, &encoded).map_err(|e| {
            error!("Failed to write credential file: {}", e);
            AuthError::StorageError(format!("Failed to write credential file: {}", e))
        })?;

        info!("Stored credential pair ({} bytes)", encoded.len());
        Ok(())
    }

    /// Remove the stored credential pair; no-op when nothing is stored
    pub fn clear(&self) -> Result<(), AuthError> {
        let path = self.credentials_path();
        if path.exists() {
            std::fs::remove_file(&path).map_err(|e| {
                AuthError::StorageError(format!("Failed to delete credential file: {}", e))
            })?;
            info!("Cleared stored credentials");
        }
        Ok(())
    }

    /// Whether a credential file is present (contents not validated)
    pub fn has_credentials(&self) -> bool {
        self.credentials_path().exists()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn make_credentials() -> Credentials {
        Credentials {
            access_token: "test_access_token_12345".to_string(),
            refresh_token: "test_refresh_token_67890".to_string(),
        }
    }

    #[test]
    fn test_obfuscation_roundtrip() {
        let original = b"Hello, World! This is a test.";
        let obfuscated = TokenStore::obfuscate(original);
        let recovered = TokenStore::obfuscate(&obfuscated);
        assert_eq!(original.as_slice(), recovered.as_slice());
    }

    #[test]
    fn test_storage_roundtrip() {
        let dir = tempdir().unwrap();
        let store = TokenStore::with_dir(dir.path()).unwrap();

        assert!(store.get().is_none());
        assert!(!store.has_credentials());

        let credentials = make_credentials();
        store.set(&credentials).unwrap();
        assert!(store.has_credentials());

        let loaded = store.get().unwrap();
        assert_eq!(loaded, credentials);

        store.clear().unwrap();
        assert!(store.get().is_none());
        assert!(!store.has_credentials());
    }

    #[test]
    fn test_set_overwrites_previous_pair() {
        let dir = tempdir().unwrap();
        let store = TokenStore::with_dir(dir.path()).unwrap();

        store.set(&make_credentials()).unwrap();
        let rotated = Credentials {
            access_token: "A2".to_string(),
            refresh_token: "R2".to_string(),
        };
        store.set(&rotated).unwrap();

        assert_eq!(store.get().unwrap(), rotated);
    }

    #[test]
    fn test_corrupt_file_is_removed_and_treated_as_absent() {
        let dir = tempdir().unwrap();
        let store = TokenStore::with_dir(dir.path()).unwrap();

        std::fs::write(store.credentials_path(), "not base64 at all!!!").unwrap();
        assert!(store.get().is_none());
        // The corrupt file was deleted
        assert!(!store.has_credentials());
    }

    #[test]
    fn test_clear_is_idempotent() {
        let dir = tempdir().unwrap();
        let store = TokenStore::with_dir(dir.path()).unwrap();

        store.clear().unwrap();
        store.set(&make_credentials()).unwrap();
        store.clear().unwrap();
        store.clear().unwrap();
        assert!(store.get().is_none());
    }
}
