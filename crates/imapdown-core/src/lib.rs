//! # imapdown-core
//!
//! The archiving pipeline behind `imapdown`: for each mailbox of a
//! [`Session`], scan envelopes, look up each message's [`StoreKey`] in a
//! [`Store`], then fetch and persist only the bodies that are missing.
//!
//! Each message is stored once, in a file named by a key derived from its
//! Message-ID. The file holds a one-line JSON [`Record`], a `---` separator
//! line and the raw message.
//!
//! ```ignore
//! use imapdown_core::{Archiver, Cancel, FsStore, ImapConnection};
//! use imapdown_imap::Config;
//!
//! let store = FsStore::open("/var/mail-archive").await?;
//! let mut session = ImapConnection::connect(&Config::new("imap.example.com"))
//!     .await?
//!     .login("user", "password")
//!     .await?;
//! let summary = Archiver::new(store).run(&mut session, &Cancel::never()).await?;
//! println!("{} new messages", summary.written());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod archiver;
mod error;
pub mod key;
pub mod message;
pub mod persister;
pub mod queue;
pub mod record;
pub mod scanner;
pub mod session;
pub mod store;

pub use archiver::{ArchiveOptions, Archiver, MailboxSummary, Summary, enumerate};
pub use error::{Error, Result};
pub use key::{KEY_LEN, KeyDeriver, KeyParseError, StoreKey};
pub use message::{Envelope, MailboxMessage, Sender, UNKNOWN_DATE, decode_mailbox_name};
pub use queue::{Cancel, CancelHandle, QUEUE_CAPACITY, cancel_pair};
pub use record::{Record, RecordError};
pub use session::{FetchError, FetchedBody, ImapConnection, ImapSession, Selection, Session};
pub use store::{FsStore, MemoryStore, Store};
