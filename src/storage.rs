//! File-backed credential storage.
//!
//! Credentials are kept as JSON in the OS-standard config directory, next
//! to `config.toml`:
//! - Windows: %APPDATA%\ultrascrap\credentials.json
//! - macOS: ~/Library/Application Support/ultrascrap/credentials.json
//! - Linux: ~/.config/ultrascrap/credentials.json
//!
//! Reading is forgiving: a missing or malformed file is treated as "no
//! stored credentials" so the session provider can bootstrap a fresh
//! account instead of failing.

use std::path::PathBuf;

use crate::session::{CredentialStore, Credentials};

const FILE_NAME: &str = "credentials.json";

/// JSON-file credential store.
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store under the OS config directory. `None` when the platform has
    /// no config directory.
    pub fn default_location() -> Option<Self> {
        crate::config::config_dir().map(|dir| Self::new(dir.join(FILE_NAME)))
    }
}

impl CredentialStore for FileCredentialStore {
    fn load(&self) -> std::io::Result<Option<Credentials>> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e),
        };

        match serde_json::from_str::<Credentials>(&contents) {
            Ok(credentials) => Ok(Some(credentials)),
            Err(e) => {
                tracing::warn!(path = ?self.path, "ignoring malformed credentials file: {e}");
                Ok(None)
            }
        }
    }

    fn save(&self, credentials: &Credentials) -> std::io::Result<()> {
        if let Some(dir) = self.path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        let contents =
            serde_json::to_string_pretty(credentials).expect("credentials always serialize");
        std::fs::write(&self.path, contents)?;
        tracing::info!(path = ?self.path, "saved credentials");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn save_then_load_roundtrips() {
        let dir = TempDir::new().unwrap();
        let store = FileCredentialStore::new(dir.path().join("creds.json"));
        let credentials = Credentials {
            user: "user-abc123-0042".to_string(),
            pass: "hunter2hunter2".to_string(),
        };

        store.save(&credentials).unwrap();
        assert_eq!(store.load().unwrap(), Some(credentials));
    }

    #[test]
    fn missing_file_is_none() {
        let dir = TempDir::new().unwrap();
        let store = FileCredentialStore::new(dir.path().join("missing.json"));
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn malformed_file_is_none() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("creds.json");
        std::fs::write(&path, "{not json").unwrap();
        let store = FileCredentialStore::new(path);
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn save_creates_parent_directories() {
        let dir = TempDir::new().unwrap();
        let store = FileCredentialStore::new(dir.path().join("nested/deeper/creds.json"));
        let credentials = Credentials {
            user: "u".to_string(),
            pass: "p".to_string(),
        };
        store.save(&credentials).unwrap();
        assert!(store.load().unwrap().is_some());
    }
}
