//! Crate-level error type

use crate::auth::AuthError;
use crate::hub::HubError;
use crate::registry::RegistryError;

/// Top-level error for gateway operations
///
/// No variant is process-fatal; every failure scopes to a single request
/// or a single connection.
#[derive(Debug)]
pub enum Error {
    /// Fanout hub operation failed
    Hub(HubError),
    /// Registry operation failed
    Registry(RegistryError),
    /// Caller could not be authenticated
    Auth(AuthError),
}

/// Result alias for gateway operations
pub type Result<T> = std::result::Result<T, Error>;

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Hub(err) => write!(f, "{}", err),
            Error::Registry(err) => write!(f, "{}", err),
            Error::Auth(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Hub(err) => Some(err),
            Error::Registry(err) => Some(err),
            Error::Auth(err) => Some(err),
        }
    }
}

impl From<HubError> for Error {
    fn from(err: HubError) -> Self {
        Error::Hub(err)
    }
}

impl From<RegistryError> for Error {
    fn from(err: RegistryError) -> Self {
        Error::Registry(err)
    }
}

impl From<AuthError> for Error {
    fn from(err: AuthError) -> Self {
        Error::Auth(err)
    }
}
