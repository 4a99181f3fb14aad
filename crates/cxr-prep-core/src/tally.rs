//! Copy/skip counters for a rebuild pass.

use serde::{Deserialize, Serialize};

/// Counters owned by a single rebuild pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunTally {
    /// Files copied into the destination tree.
    pub copied: u64,
    /// Duplicate files left out.
    pub skipped: u64,
    /// Bytes written by the copies.
    pub bytes_copied: u64,
}

impl RunTally {
    /// Create an empty tally.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a completed copy.
    pub fn record_copy(&mut self, bytes: u64) {
        self.copied += 1;
        self.bytes_copied += bytes;
    }

    /// Record a skipped duplicate.
    pub fn record_skip(&mut self) {
        self.skipped += 1;
    }

    /// Total image files seen (copied + skipped).
    pub fn total_seen(&self) -> u64 {
        self.copied + self.skipped
    }

    /// Add another tally into this one.
    pub fn merge(&mut self, other: &RunTally) {
        self.copied += other.copied;
        self.skipped += other.skipped;
        self.bytes_copied += other.bytes_copied;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_and_merge() {
        let mut a = RunTally::new();
        a.record_copy(10);
        a.record_copy(5);
        a.record_skip();

        let mut b = RunTally::new();
        b.record_skip();
        b.merge(&a);

        assert_eq!(b.copied, 2);
        assert_eq!(b.skipped, 2);
        assert_eq!(b.bytes_copied, 15);
        assert_eq!(b.total_seen(), 4);
    }
}
