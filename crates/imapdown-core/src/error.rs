//! Error types for the archiving pipeline.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while archiving.
#[derive(Debug, Error)]
pub enum Error {
    /// Could not reach the server.
    #[error("connect to {address}: {source}")]
    Connection {
        /// `host:port` that was dialled.
        address: String,
        /// Underlying protocol error.
        #[source]
        source: imapdown_imap::Error,
    },

    /// The server rejected the credentials.
    #[error("login as {user}: {source}")]
    Auth {
        /// User name that was tried.
        user: String,
        /// Underlying protocol error.
        #[source]
        source: imapdown_imap::Error,
    },

    /// The session failed or reported a failure status.
    #[error("{op}: {message}")]
    Protocol {
        /// Operation that failed.
        op: &'static str,
        /// Failure description.
        message: String,
    },

    /// Store I/O failed.
    #[error("{op} {}: {source}", path.display())]
    Io {
        /// Operation that failed.
        op: &'static str,
        /// Path involved.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A record could not be serialized.
    #[error("{op}: {source}")]
    Encoding {
        /// Operation that failed.
        op: &'static str,
        /// Underlying serializer error.
        #[source]
        source: serde_json::Error,
    },

    /// The run was cancelled.
    #[error("cancelled")]
    Cancelled,

    /// Processing a mailbox failed.
    #[error("mailbox {name:?}: {source}")]
    Mailbox {
        /// Mailbox name.
        name: String,
        /// What went wrong.
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Builds a protocol error for `op`.
    pub(crate) fn protocol(op: &'static str, message: impl std::fmt::Display) -> Self {
        Self::Protocol {
            op,
            message: message.to_string(),
        }
    }

    /// Wraps the error with the mailbox it occurred in.
    #[must_use]
    pub fn in_mailbox(self, name: &str) -> Self {
        Self::Mailbox {
            name: name.to_string(),
            source: Box::new(self),
        }
    }

    /// Returns true if this error, or the error it wraps, is a cancellation.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        match self {
            Self::Cancelled => true,
            Self::Mailbox { source, .. } => source.is_cancelled(),
            _ => false,
        }
    }
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mailbox_wrapping_keeps_cause() {
        let err = Error::protocol("fetch envelopes", "server went away").in_mailbox("INBOX");
        assert_eq!(
            err.to_string(),
            "mailbox \"INBOX\": fetch envelopes: server went away"
        );
        assert!(!err.is_cancelled());
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn cancellation_seen_through_wrapper() {
        assert!(Error::Cancelled.in_mailbox("Sent").is_cancelled());
    }
}
