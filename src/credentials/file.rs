/// Plaintext `username|password` file store
use log::{debug, warn};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use super::{CredentialStore, Credentials};
use crate::error::{Error, Result};

/// Stores credentials unencrypted, one `username|password` line
///
/// Kept for compatibility with existing `credentials.dat` files. Anyone who
/// can read the file can read the password.
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CredentialStore for FileCredentialStore {
    fn load(&self) -> Result<Option<Credentials>> {
        let data = match fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let parts: Vec<&str> = data.split('|').collect();
        match parts.as_slice() {
            [username, password] => Ok(Some(Credentials::new(*username, *password))),
            _ => {
                warn!("Ignoring malformed credentials file {}", self.path.display());
                Ok(None)
            }
        }
    }

    fn save(&self, credentials: &Credentials) -> Result<()> {
        if credentials.username.contains('|') || credentials.password().contains('|') {
            return Err(Error::Credentials(
                "username and password cannot contain '|'".to_string(),
            ));
        }

        fs::write(
            &self.path,
            format!("{}|{}", credentials.username, credentials.password()),
        )?;
        debug!("Saved credentials to {}", self.path.display());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store() -> (TempDir, FileCredentialStore) {
        let dir = TempDir::new().unwrap();
        let store = FileCredentialStore::new(dir.path().join("credentials.dat"));
        (dir, store)
    }

    #[test]
    fn test_save_load_clear() {
        let (_dir, store) = store();
        assert!(store.load().unwrap().is_none());

        store.save(&Credentials::new("alice", "pw")).unwrap();
        assert_eq!(fs::read_to_string(store.path()).unwrap(), "alice|pw");

        let loaded = store.load().unwrap().unwrap();
        assert_eq!(loaded.username, "alice");
        assert_eq!(loaded.password(), "pw");

        store.clear().unwrap();
        assert!(!store.path().exists());
        store.clear().unwrap();
    }

    #[test]
    fn test_malformed_file_is_empty() {
        let (_dir, store) = store();

        for contents in ["alice", "alice|pw|extra", ""] {
            fs::write(store.path(), contents).unwrap();
            assert!(store.load().unwrap().is_none(), "contents: {:?}", contents);
        }
    }

    #[test]
    fn test_rejects_separator_in_fields() {
        let (_dir, store) = store();
        assert!(store.save(&Credentials::new("al|ice", "pw")).is_err());
        assert!(!store.path().exists());
    }
}
