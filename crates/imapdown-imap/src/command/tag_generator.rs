//! Command tag generator.

use std::sync::atomic::{AtomicU32, Ordering};

use crate::types::Tag;

/// Tag generator for IMAP commands.
///
/// Generates sequential tags in the format `A0000`, `A0001`, and so on.
#[derive(Debug)]
pub struct TagGenerator {
    counter: AtomicU32,
    prefix: char,
}

impl TagGenerator {
    /// Creates a new tag generator with the given prefix.
    #[must_use]
    pub const fn new(prefix: char) -> Self {
        Self {
            counter: AtomicU32::new(0),
            prefix,
        }
    }

    /// Generates the next tag.
    ///
    /// The counter wraps at `u32::MAX`; a session never lives long enough
    /// for an old tag to still be outstanding by then.
    #[must_use]
    pub fn next(&self) -> Tag {
        let n = self.counter.fetch_add(1, Ordering::Relaxed);
        Tag::new(format!("{}{:04}", self.prefix, n))
    }
}

impl Default for TagGenerator {
    fn default() -> Self {
        Self::new('A')
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_are_sequential() {
        let tags = TagGenerator::default();
        assert_eq!(tags.next().as_str(), "A0000");
        assert_eq!(tags.next().as_str(), "A0001");
        assert_eq!(tags.next().as_str(), "A0002");
    }

    #[test]
    fn custom_prefix() {
        let tags = TagGenerator::new('X');
        assert_eq!(tags.next().as_str(), "X0000");
    }
}
