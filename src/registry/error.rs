//! Registry error types

use super::store::StoreError;

/// Error type for registry operations
///
/// The registry holds advisory routing data, not event payloads, so
/// store failures are handed straight back to the caller without retry.
#[derive(Debug)]
pub enum RegistryError {
    /// The backing store failed
    Store(StoreError),
}

impl std::fmt::Display for RegistryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegistryError::Store(err) => write!(f, "registry store operation failed: {}", err),
        }
    }
}

impl std::error::Error for RegistryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RegistryError::Store(err) => Some(err),
        }
    }
}

impl From<StoreError> for RegistryError {
    fn from(err: StoreError) -> Self {
        RegistryError::Store(err)
    }
}
