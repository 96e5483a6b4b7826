//! IMAP command builder.
//!
//! Only the read-only subset an archiving client needs is modelled.

mod serialize;
mod tag_generator;

use crate::types::{Mailbox, SequenceSet, Tag};

pub use tag_generator::TagGenerator;

use serialize::{write_astring, write_fetch_attributes};

/// A single FETCH data item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchAttribute {
    /// `UID`.
    Uid,
    /// `ENVELOPE`.
    Envelope,
    /// `BODY.PEEK[section]`; `None` fetches the whole message without
    /// setting `\Seen`.
    BodyPeek {
        /// Section specifier.
        section: Option<String>,
    },
}

/// IMAP command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// LOGOUT command.
    Logout,
    /// LOGIN command.
    Login {
        /// Username.
        username: String,
        /// Password.
        password: String,
    },
    /// LIST command.
    List {
        /// Reference name.
        reference: String,
        /// Mailbox pattern.
        pattern: String,
    },
    /// EXAMINE command (read-only SELECT).
    Examine {
        /// Mailbox to examine.
        mailbox: Mailbox,
    },
    /// FETCH command.
    Fetch {
        /// Sequence set.
        sequence: SequenceSet,
        /// Items to fetch.
        items: Vec<FetchAttribute>,
    },
}

impl Command {
    /// Serializes the command to bytes with the given tag, including the
    /// trailing CRLF.
    #[must_use]
    pub fn serialize(&self, tag: &Tag) -> Vec<u8> {
        let mut buf = Vec::new();
        buf.extend_from_slice(tag.as_str().as_bytes());
        buf.push(b' ');

        match self {
            Self::Logout => buf.extend_from_slice(b"LOGOUT"),
            Self::Login { username, password } => {
                buf.extend_from_slice(b"LOGIN ");
                write_astring(&mut buf, username);
                buf.push(b' ');
                write_astring(&mut buf, password);
            }
            Self::List { reference, pattern } => {
                buf.extend_from_slice(b"LIST ");
                write_astring(&mut buf, reference);
                buf.push(b' ');
                write_astring(&mut buf, pattern);
            }
            Self::Examine { mailbox } => {
                buf.extend_from_slice(b"EXAMINE ");
                write_astring(&mut buf, mailbox.as_str());
            }
            Self::Fetch { sequence, items } => {
                buf.extend_from_slice(b"FETCH ");
                buf.extend_from_slice(sequence.to_string().as_bytes());
                buf.push(b' ');
                write_fetch_attributes(&mut buf, items);
            }
        }

        buf.extend_from_slice(b"\r\n");
        buf
    }

    /// Returns true if the command carries credentials and must not be
    /// logged verbatim.
    #[must_use]
    pub const fn is_sensitive(&self) -> bool {
        matches!(self, Self::Login { .. })
    }
}
