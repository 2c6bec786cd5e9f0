//! API key value type and the stores that persist it between runs.

use std::error::Error;
use std::fmt;
use std::sync::Mutex;

use keyring::Entry;
use tracing::debug;

use crate::core::constants::{KEYRING_ACCOUNT, KEYRING_SERVICE};
use crate::core::keyring::KeyringAccessError;

/// Opaque secret authorizing calls to the generation service.
///
/// Surrounding whitespace is stripped on construction, so a key pasted with a
/// trailing newline compares equal to the clean value. The value never appears
/// in `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(value: impl Into<String>) -> Self {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.len() == value.len() {
            Self(value)
        } else {
            Self(trimmed.to_string())
        }
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            f.write_str("Credential(<empty>)")
        } else {
            f.write_str("Credential(<redacted>)")
        }
    }
}

#[derive(Debug)]
pub enum CredentialStoreError {
    Keyring(KeyringAccessError),
    /// The in-memory store's lock was poisoned by a panicking writer.
    Poisoned,
}

impl fmt::Display for CredentialStoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialStoreError::Keyring(err) => write!(f, "{err}"),
            CredentialStoreError::Poisoned => f.write_str("credential store lock poisoned"),
        }
    }
}

impl Error for CredentialStoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            CredentialStoreError::Keyring(err) => Some(err),
            CredentialStoreError::Poisoned => None,
        }
    }
}

impl From<keyring::Error> for CredentialStoreError {
    fn from(err: keyring::Error) -> Self {
        CredentialStoreError::Keyring(KeyringAccessError::from(err))
    }
}

/// Durable slot for the single active credential.
///
/// Stores never validate; `set` must have persisted the value when it
/// returns `Ok`.
pub trait CredentialStore: Send + Sync {
    fn get(&self) -> Result<Option<Credential>, CredentialStoreError>;
    fn set(&self, credential: &Credential) -> Result<(), CredentialStoreError>;
    fn clear(&self) -> Result<(), CredentialStoreError>;
}

/// Credential kept in the platform keyring.
pub struct KeyringCredentialStore {
    service: String,
    account: String,
}

impl KeyringCredentialStore {
    pub fn new() -> Self {
        Self::with_entry(KEYRING_SERVICE, KEYRING_ACCOUNT)
    }

    pub fn with_entry(service: impl Into<String>, account: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            account: account.into(),
        }
    }

    fn entry(&self) -> Result<Entry, CredentialStoreError> {
        Ok(Entry::new(&self.service, &self.account)?)
    }
}

impl Default for KeyringCredentialStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CredentialStore for KeyringCredentialStore {
    fn get(&self) -> Result<Option<Credential>, CredentialStoreError> {
        match self.entry()?.get_password() {
            Ok(value) => {
                debug!(service = %self.service, "loaded credential from keyring");
                Ok(Some(Credential::new(value)))
            }
            Err(keyring::Error::NoEntry) => {
                debug!(service = %self.service, "no credential in keyring");
                Ok(None)
            }
            Err(err) => Err(err.into()),
        }
    }

    fn set(&self, credential: &Credential) -> Result<(), CredentialStoreError> {
        self.entry()?.set_password(credential.expose())?;
        debug!(service = %self.service, "stored credential in keyring");
        Ok(())
    }

    fn clear(&self) -> Result<(), CredentialStoreError> {
        match self.entry()?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

/// Process-local store used by `--env-only` runs and tests.
#[derive(Default)]
pub struct MemoryCredentialStore {
    value: Mutex<Option<Credential>>,
}

impl MemoryCredentialStore {
    pub fn new(initial: Option<Credential>) -> Self {
        Self {
            value: Mutex::new(initial),
        }
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn get(&self) -> Result<Option<Credential>, CredentialStoreError> {
        let guard = self
            .value
            .lock()
            .map_err(|_| CredentialStoreError::Poisoned)?;
        Ok(guard.clone())
    }

    fn set(&self, credential: &Credential) -> Result<(), CredentialStoreError> {
        let mut guard = self
            .value
            .lock()
            .map_err(|_| CredentialStoreError::Poisoned)?;
        *guard = Some(credential.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), CredentialStoreError> {
        let mut guard = self
            .value
            .lock()
            .map_err(|_| CredentialStoreError::Poisoned)?;
        *guard = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credential_trims_surrounding_whitespace() {
        let credential = Credential::new("  abc123\n");
        assert_eq!(credential.expose(), "abc123");
        assert_eq!(credential, Credential::new("abc123"));
    }

    #[test]
    fn whitespace_only_credential_is_empty() {
        assert!(Credential::new(" \t\n").is_empty());
    }

    #[test]
    fn debug_output_never_contains_secret() {
        let rendered = format!("{:?}", Credential::new("super-secret"));
        assert!(!rendered.contains("super-secret"));
        assert_eq!(format!("{:?}", Credential::new("")), "Credential(<empty>)");
    }

    #[test]
    fn memory_store_round_trips_and_clears() {
        let store = MemoryCredentialStore::default();
        assert!(store.get().unwrap().is_none());

        store.set(&Credential::new("good-key")).unwrap();
        assert_eq!(store.get().unwrap(), Some(Credential::new("good-key")));

        store.clear().unwrap();
        assert!(store.get().unwrap().is_none());
    }
}
