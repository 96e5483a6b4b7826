//! The mailbox session the pipeline drives.
//!
//! [`Session`] is the narrow capability the archiver needs from a mail
//! server. The two fetches push decoded items into a caller-supplied bounded
//! queue and return their terminal status separately, so the caller can
//! drain the queue before deciding whether the fetch succeeded.

mod imap;

pub use imap::{ImapConnection, ImapSession};

use async_trait::async_trait;
use imapdown_imap::SequenceSet;
use thiserror::Error;
use tokio::io::AsyncRead;
use tokio::sync::mpsc;

use crate::Result;
use crate::message::MailboxMessage;

/// Active read-only selection of one mailbox.
///
/// Sequence numbers collected while scanning are only valid for the
/// selection they were observed in; the scan and the body fetch take the
/// same `Selection`.
#[derive(Debug, PartialEq, Eq)]
pub struct Selection {
    name: String,
    exists: u32,
}

impl Selection {
    /// Records that `name` was opened with `exists` messages.
    #[must_use]
    pub fn new(name: impl Into<String>, exists: u32) -> Self {
        Self {
            name: name.into(),
            exists,
        }
    }

    /// Mailbox name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Message count reported when the mailbox was opened.
    #[must_use]
    pub const fn exists(&self) -> u32 {
        self.exists
    }
}

/// Terminal status of a streaming fetch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// The requested range matched nothing.
    #[error("no matching messages")]
    NoMatchingMessages,
    /// The queue's receiver was dropped before the fetch finished.
    #[error("consumer gone")]
    ConsumerGone,
    /// Any other failure.
    #[error("{0}")]
    Protocol(String),
}

impl FetchError {
    /// Classifies a server failure text.
    #[must_use]
    pub fn from_server_text(text: &str) -> Self {
        if text.to_ascii_lowercase().contains("no matching messages") {
            Self::NoMatchingMessages
        } else {
            Self::Protocol(text.to_string())
        }
    }
}

/// A message with its full body, readable once.
pub struct FetchedBody {
    /// The message the body belongs to.
    pub message: MailboxMessage,
    /// The raw RFC 5322 bytes.
    pub body: Box<dyn AsyncRead + Send + Unpin>,
}

impl FetchedBody {
    /// Pairs a message with an in-memory body.
    #[must_use]
    pub fn from_bytes(message: MailboxMessage, body: Vec<u8>) -> Self {
        Self {
            message,
            body: Box::new(std::io::Cursor::new(body)),
        }
    }
}

impl std::fmt::Debug for FetchedBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FetchedBody")
            .field("message", &self.message)
            .finish_non_exhaustive()
    }
}

/// Mail server operations consumed by the archiver.
#[async_trait]
pub trait Session: Send {
    /// Lists every mailbox, in server order.
    ///
    /// # Errors
    ///
    /// Returns an error if the server rejects the listing.
    async fn list_mailboxes(&mut self) -> Result<Vec<String>>;

    /// Opens `name` read-only.
    ///
    /// # Errors
    ///
    /// Returns an error if the mailbox cannot be opened.
    async fn select_read_only(&mut self, name: &str) -> Result<Selection>;

    /// Streams the envelope of every message in the selection into `tx`.
    ///
    /// # Errors
    ///
    /// Returns the fetch's terminal status when it is not a success.
    async fn fetch_envelopes(
        &mut self,
        selection: &Selection,
        tx: mpsc::Sender<MailboxMessage>,
    ) -> std::result::Result<(), FetchError>;

    /// Streams the envelope and full body of each message in `set` into
    /// `tx`.
    ///
    /// # Errors
    ///
    /// Returns the fetch's terminal status when it is not a success.
    async fn fetch_bodies(
        &mut self,
        selection: &Selection,
        set: &SequenceSet,
        tx: mpsc::Sender<FetchedBody>,
    ) -> std::result::Result<(), FetchError>;

    /// Ends the session.
    ///
    /// # Errors
    ///
    /// Returns an error if the server does not acknowledge the logout.
    async fn logout(&mut self) -> Result<()>;
}
