//! Response data types.

use crate::types::{ListResponse, ResponseCode, SeqNum, Status, Uid};

/// One data item of a FETCH response.
///
/// Items the client never requests are skipped while parsing, except FLAGS,
/// which servers push unsolicited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchItem {
    /// `FLAGS (...)`, verbatim.
    Flags(Vec<String>),
    /// `ENVELOPE (...)`.
    Envelope(Box<Envelope>),
    /// `UID n`.
    Uid(Uid),
    /// `BODY[section]`, `BODY.PEEK[section]` or `RFC822`.
    Body {
        /// Section specifier; `None` for the whole message.
        section: Option<String>,
        /// Body data; `None` when the server returned NIL.
        data: Option<Vec<u8>>,
    },
}

/// Message envelope (RFC 9051 §7.5.2).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Envelope {
    /// Date header, unparsed.
    pub date: Option<String>,
    /// Subject header.
    pub subject: Option<String>,
    /// From addresses.
    pub from: Vec<Address>,
    /// Sender addresses.
    pub sender: Vec<Address>,
    /// Reply-To addresses.
    pub reply_to: Vec<Address>,
    /// To addresses.
    pub to: Vec<Address>,
    /// Cc addresses.
    pub cc: Vec<Address>,
    /// Bcc addresses.
    pub bcc: Vec<Address>,
    /// In-Reply-To header.
    pub in_reply_to: Option<String>,
    /// Message-ID header.
    pub message_id: Option<String>,
}

/// Address structure from an envelope.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Address {
    /// Display name.
    pub name: Option<String>,
    /// Source route (obsolete).
    pub adl: Option<String>,
    /// Mailbox name (local part).
    pub mailbox: Option<String>,
    /// Host name (domain part).
    pub host: Option<String>,
}

/// Untagged response data.
///
/// Only the responses an archiving session reacts to get their own variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UntaggedResponse {
    /// Status condition: `* OK`, `* NO`, `* BAD`, `* PREAUTH` or `* BYE`.
    Condition {
        /// Which condition the server reported.
        status: Status,
        /// Bracketed response code, if any.
        code: Option<ResponseCode>,
        /// Text after the code.
        text: String,
    },
    /// Advertised capabilities.
    Capability(Vec<String>),
    /// One mailbox from LIST.
    List(ListResponse),
    /// Flags defined for the selected mailbox.
    Flags(Vec<String>),
    /// `n EXISTS`.
    Exists(u32),
    /// `n RECENT`.
    Recent(u32),
    /// `n EXPUNGE`.
    Expunge(SeqNum),
    /// `n FETCH (...)`.
    Fetch {
        /// Message sequence number.
        seq: SeqNum,
        /// Returned data items.
        items: Vec<FetchItem>,
    },
    /// Any response this client does not interpret, keyed by its keyword.
    Other(String),
}
