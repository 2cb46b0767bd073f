//! Saved credentials for auto-login.
//!
//! The session client never touches storage itself; callers pass a
//! [`CredentialStore`] to [`crate::AuthSessionClient::auto_login`] and
//! [`crate::AuthSessionClient::login_and_remember`]. The file store keeps the
//! legacy plaintext format; anything stronger (OS keychain, encrypted file)
//! only has to implement the trait.

mod file;

pub use file::FileCredentialStore;

use secrecy::{ExposeSecret, SecretString};
use std::fmt;
use std::sync::Mutex;

use crate::error::{Error, Result};

/// Username and password remembered between runs.
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: SecretString,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: SecretString::from(password.into()),
        }
    }

    pub fn password(&self) -> &str {
        self.password.expose_secret()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Pluggable secret storage.
pub trait CredentialStore: Send + Sync {
    /// `Ok(None)` when nothing usable is stored.
    fn load(&self) -> Result<Option<Credentials>>;

    fn save(&self, credentials: &Credentials) -> Result<()>;

    /// Clearing an empty store succeeds.
    fn clear(&self) -> Result<()>;
}

/// Process-local store, nothing touches disk.
#[derive(Default)]
pub struct MemoryCredentialStore {
    slot: Mutex<Option<Credentials>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(credentials: Credentials) -> Self {
        Self {
            slot: Mutex::new(Some(credentials)),
        }
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn load(&self) -> Result<Option<Credentials>> {
        let slot = self
            .slot
            .lock()
            .map_err(|_| Error::Credentials("credential store lock poisoned".to_string()))?;
        Ok(slot.clone())
    }

    fn save(&self, credentials: &Credentials) -> Result<()> {
        let mut slot = self
            .slot
            .lock()
            .map_err(|_| Error::Credentials("credential store lock poisoned".to_string()))?;
        *slot = Some(credentials.clone());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        let mut slot = self
            .slot
            .lock()
            .map_err(|_| Error::Credentials("credential store lock poisoned".to_string()))?;
        *slot = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_lifecycle() {
        let store = MemoryCredentialStore::new();
        assert!(store.load().unwrap().is_none());

        store.save(&Credentials::new("alice", "pw")).unwrap();
        let loaded = store.load().unwrap().unwrap();
        assert_eq!(loaded.username, "alice");
        assert_eq!(loaded.password(), "pw");

        store.clear().unwrap();
        assert!(store.load().unwrap().is_none());
        store.clear().unwrap();
    }

    #[test]
    fn test_debug_redacts_password() {
        let debug = format!("{:?}", Credentials::new("alice", "hunter2"));
        assert!(debug.contains("alice"));
        assert!(!debug.contains("hunter2"));
    }
}
