//! Command tags and the non-zero numbers IMAP uses to name messages.

use std::num::NonZeroU32;

/// IMAP command tag.
///
/// Each command sent by the client carries a unique tag, and the server's
/// completion response repeats it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Tag(pub String);

impl Tag {
    /// Creates a new tag from a string.
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    /// Returns the tag as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Tag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Declares a non-zero 32-bit protocol number.
macro_rules! nonzero_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(NonZeroU32);

        impl $name {
            /// The value 1.
            pub const MIN: Self = Self(NonZeroU32::MIN);

            /// Wraps `n`, or returns `None` for 0.
            #[must_use]
            pub const fn new(n: u32) -> Option<Self> {
                match NonZeroU32::new(n) {
                    Some(n) => Some(Self(n)),
                    None => None,
                }
            }

            /// Returns the underlying value.
            #[must_use]
            pub const fn get(self) -> u32 {
                self.0.get()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                std::fmt::Display::fmt(&self.0, f)
            }
        }
    };
}

nonzero_id!(
    /// Message sequence number: a 1-based position in the current selection.
    ///
    /// Expunges shift sequence numbers, so one is only meaningful for the
    /// selection it was observed in.
    SeqNum
);

nonzero_id!(
    /// Message UID. Stable across expunges while `UIDVALIDITY` holds.
    Uid
);

nonzero_id!(
    /// UIDVALIDITY of a mailbox.
    UidValidity
);

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn zero_is_rejected() {
        assert!(SeqNum::new(0).is_none());
        assert!(Uid::new(0).is_none());
        assert!(UidValidity::new(0).is_none());
    }

    #[test]
    fn display_matches_wire_form() {
        assert_eq!(SeqNum::new(42).unwrap().to_string(), "42");
        assert_eq!(Uid::new(7).unwrap().to_string(), "7");
        assert_eq!(Tag::new("A0001").to_string(), "A0001");
    }

    #[test]
    fn min_is_one() {
        assert_eq!(SeqNum::MIN.get(), 1);
        assert_eq!(SeqNum::new(1), Some(SeqNum::MIN));
    }

    #[test]
    fn seq_nums_order_numerically() {
        let a = SeqNum::new(2).unwrap();
        let b = SeqNum::new(10).unwrap();
        assert!(a < b);
    }
}
