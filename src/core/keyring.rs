use std::error::Error;
use std::fmt;

/// Failure reported by the platform keyring.
///
/// Recoverable errors mean the backend was temporarily unreachable (a locked
/// keychain, a secret service that is not running). Permanent errors carry
/// the underlying cause so it can be reported as-is.
#[derive(Debug)]
pub enum KeyringAccessError {
    Recoverable(keyring::Error),
    Permanent(keyring::Error),
}

impl KeyringAccessError {
    fn inner(&self) -> &keyring::Error {
        match self {
            KeyringAccessError::Recoverable(err) | KeyringAccessError::Permanent(err) => err,
        }
    }

    pub fn is_recoverable(&self) -> bool {
        matches!(self, KeyringAccessError::Recoverable(_))
    }
}

impl From<keyring::Error> for KeyringAccessError {
    fn from(err: keyring::Error) -> Self {
        match err {
            keyring::Error::PlatformFailure(_) | keyring::Error::NoStorageAccess(_) => {
                KeyringAccessError::Recoverable(err)
            }
            other => KeyringAccessError::Permanent(other),
        }
    }
}

impl fmt::Display for KeyringAccessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_recoverable() {
            write!(f, "keyring temporarily unavailable: {}", self.inner())
        } else {
            write!(f, "{}", self.inner())
        }
    }
}

impl Error for KeyringAccessError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(self.inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bad_encoding_is_permanent() {
        let err = KeyringAccessError::from(keyring::Error::BadEncoding(vec![0xff]));
        assert!(!err.is_recoverable());
    }

    #[test]
    fn no_storage_access_is_recoverable() {
        let inner: Box<dyn Error + Send + Sync> = "locked".into();
        let err = KeyringAccessError::from(keyring::Error::NoStorageAccess(inner));
        assert!(err.is_recoverable());
        assert!(err.to_string().starts_with("keyring temporarily unavailable"));
    }
}
