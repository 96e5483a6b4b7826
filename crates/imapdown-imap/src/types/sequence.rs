//! Sequence sets for message ranges.

use super::SeqNum;

/// One element of a sequence set: a single number or an inclusive range.
///
/// An `end` of `None` stands for `*`, the highest number in the mailbox.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeqRange {
    /// First sequence number in the range.
    pub start: SeqNum,
    /// Last sequence number, or `None` for `*`.
    pub end: Option<SeqNum>,
}

impl std::fmt::Display for SeqRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.end {
            Some(end) if end == self.start => write!(f, "{}", self.start),
            Some(end) => write!(f, "{}:{end}", self.start),
            None => write!(f, "{}:*", self.start),
        }
    }
}

/// Sequence set (`1:4,7,9:*`).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SequenceSet {
    ranges: Vec<SeqRange>,
}

impl SequenceSet {
    /// The set `1:*`, every message currently in the mailbox.
    #[must_use]
    pub fn all_messages() -> Self {
        Self {
            ranges: vec![SeqRange {
                start: SeqNum::MIN,
                end: None,
            }],
        }
    }

    /// Builds a compact set from individual sequence numbers.
    ///
    /// Numbers are sorted and de-duplicated; consecutive runs collapse into
    /// ranges, so `[5, 1, 2, 3, 9]` becomes `1:3,5,9`.
    #[must_use]
    pub fn from_seq_nums(nums: impl IntoIterator<Item = SeqNum>) -> Self {
        let mut nums: Vec<SeqNum> = nums.into_iter().collect();
        nums.sort_unstable();
        nums.dedup();

        let mut ranges: Vec<SeqRange> = Vec::new();
        for n in nums {
            if let Some(last) = ranges.last_mut()
                && let Some(end) = last.end
                && end.get().checked_add(1) == Some(n.get())
            {
                last.end = Some(n);
                continue;
            }
            ranges.push(SeqRange {
                start: n,
                end: Some(n),
            });
        }

        Self { ranges }
    }

    /// Returns true if the set selects nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Returns the ranges making up the set.
    #[must_use]
    pub fn ranges(&self) -> &[SeqRange] {
        &self.ranges
    }
}

impl std::fmt::Display for SequenceSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, range) in self.ranges.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{range}")?;
        }
        Ok(())
    }
}
