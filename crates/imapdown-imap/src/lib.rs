//! # imapdown-imap
//!
//! A small async IMAP client (RFC 9051 `IMAP4rev2`, RFC 3501 `IMAP4rev1`)
//! covering the read-only surface an archiver needs: LOGIN, LIST, EXAMINE,
//! streaming FETCH and LOGOUT.
//!
//! ## Quick Start
//!
//! ```ignore
//! use imapdown_imap::{Client, Config, FetchAttribute, SequenceSet};
//! use tokio::sync::mpsc;
//!
//! #[tokio::main]
//! async fn main() -> imapdown_imap::Result<()> {
//!     let config = Config::new("imap.example.com");
//!     let stream = imapdown_imap::connection::connect(&config).await?;
//!     let client = Client::from_stream(stream).await?;
//!     let mut client = client.login("user@example.com", "password").await?;
//!
//!     for folder in client.list("", "*").await? {
//!         println!("Folder: {}", folder.mailbox);
//!     }
//!
//!     let (mut client, status) = client.examine("INBOX").await?;
//!     println!("Messages: {}", status.exists);
//!
//!     let (tx, mut rx) = mpsc::channel(10);
//!     let items = vec![FetchAttribute::Envelope, FetchAttribute::Uid];
//!     let fetch = client.fetch_streaming(&SequenceSet::all_messages(), &items, tx);
//!     let drain = async { while let Some(message) = rx.recv().await { println!("{}", message.seq); } };
//!     let (result, ()) = tokio::join!(fetch, drain);
//!     result?;
//!
//!     client.logout().await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Connection States
//!
//! ```text
//! NotAuthenticated ── login() ──→ Authenticated ── examine() ──→ Selected
//!                                                                  │  ▲
//!                                                                  └──┘
//!                                                               examine()
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod command;
pub mod connection;
mod error;
pub mod parser;
pub mod types;

pub use command::{Command, FetchAttribute, TagGenerator};
pub use connection::{
    Authenticated, Client, Config, ConfigBuilder, FetchedMessage, FramedStream, ImapStream,
    NotAuthenticated, Security, Selected,
};
pub use error::{Error, Result};
pub use parser::{Address, Envelope, FetchItem, Response, ResponseParser, UntaggedResponse};
pub use types::{
    ListResponse, Mailbox, MailboxAttribute, MailboxStatus, ResponseCode, SeqNum, SequenceSet,
    Status, Tag, Uid, UidValidity,
};
