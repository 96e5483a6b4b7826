//! Response status and response codes.

use super::{Uid, UidValidity};

/// Status of a tagged or status response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Command completed successfully.
    Ok,
    /// Command failed (operational error).
    No,
    /// Command failed (protocol/syntax error).
    Bad,
    /// Server greeting (pre-authenticated).
    PreAuth,
    /// Server is closing connection.
    Bye,
}

impl Status {
    /// Returns true if this is a successful status.
    #[must_use]
    pub const fn is_ok(self) -> bool {
        matches!(self, Self::Ok | Self::PreAuth)
    }
}

/// Bracketed response code (`[UIDVALIDITY 3857529045]`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseCode {
    /// Mailbox opened read-only.
    ReadOnly,
    /// Mailbox opened read-write.
    ReadWrite,
    /// Next UID.
    UidNext(Uid),
    /// UIDVALIDITY.
    UidValidity(UidValidity),
    /// Server capabilities.
    Capability(Vec<String>),
    /// Authentication failed (RFC 5530).
    AuthenticationFailed,
    /// The requested item does not exist (RFC 5530).
    Nonexistent,
    /// Any other code, kept verbatim with its arguments dropped.
    Other(String),
}
