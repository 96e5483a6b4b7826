//! Core IMAP types.

mod identifiers;
mod mailbox;
mod response_code;
mod sequence;

pub use identifiers::{SeqNum, Tag, Uid, UidValidity};
pub use mailbox::{ListResponse, Mailbox, MailboxAttribute, MailboxStatus};
pub use response_code::{ResponseCode, Status};
pub use sequence::{SeqRange, SequenceSet};
