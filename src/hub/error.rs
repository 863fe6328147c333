//! Hub error types

use crate::topic::TopicParseError;

/// Error type for hub operations
///
/// Validation failures carry a descriptive message for the caller and are
/// never retried. Delivery failures are not represented here: a failed
/// sink tears down that one connection and the enclosing publish still
/// succeeds.
#[derive(Debug)]
pub enum HubError {
    /// The topic list was missing or invalid
    Topic(TopicParseError),
    /// The event id was missing or blank
    MissingEventId,
    /// The payload source failed while being read
    PayloadRead(std::io::Error),
}

impl std::fmt::Display for HubError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HubError::Topic(err) => write!(f, "{}", err),
            HubError::MissingEventId => write!(f, "event id is required"),
            HubError::PayloadRead(err) => write!(f, "failed to read event payload: {}", err),
        }
    }
}

impl std::error::Error for HubError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            HubError::Topic(err) => Some(err),
            HubError::MissingEventId => None,
            HubError::PayloadRead(err) => Some(err),
        }
    }
}

impl From<TopicParseError> for HubError {
    fn from(err: TopicParseError) -> Self {
        HubError::Topic(err)
    }
}
