//! Error types for the streaming core.

use std::fmt;

/// Contract violations raised by the streaming core.
///
/// Peer disconnects, cancellation and reaching an event limit are normal
/// terminations and never show up here. Every variant of this enum points at
/// a configuration or programming bug that should be fixed rather than
/// retried.
#[derive(Debug)]
pub enum Error {
    /// The stream configuration violates a session invariant
    /// (e.g. a zero increment or a zero event cap).
    Configuration(String),

    /// A structured payload could not be serialized to JSON.
    Encoding(serde_json::Error),

    /// Advancing the counter past `value` would overflow.
    CounterOverflow { value: i64 },

    /// The named session already failed with one of the errors above.
    Aborted(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Configuration(msg) => write!(f, "Invalid stream configuration: {}", msg),
            Error::Encoding(e) => write!(f, "Failed to encode stream payload: {}", e),
            Error::CounterOverflow { value } => {
                write!(f, "Stream counter overflowed after value {}", value)
            }
            Error::Aborted(name) => write!(f, "Stream {} was aborted by an earlier error", name),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Encoding(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Encoding(err)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
