//! Counters collected while comparing two streams

use crate::types::{ChangeEvent, ChangeKind};
use serde::Serialize;

/// Statistics about one compare call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct DiffSummary {
    /// Data records read from the primary stream
    pub primary_rows: u64,

    /// Data records read from the secondary stream
    pub secondary_rows: u64,

    /// Rows only in primary
    pub creates: u64,

    /// Key matches whose tracked columns differ
    pub updates: u64,

    /// Rows only in secondary
    pub deletes: u64,

    /// Key matches emitted as nothing
    pub unchanged: u64,
}

impl DiffSummary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count an emitted event
    pub fn record_event(&mut self, event: &ChangeEvent) {
        match event.kind() {
            ChangeKind::Create => self.creates += 1,
            ChangeKind::Update => self.updates += 1,
            ChangeKind::Delete => self.deletes += 1,
        }
    }

    pub fn record_unchanged(&mut self) {
        self.unchanged += 1;
    }

    /// Creates + updates + deletes
    ///
    /// # Example
    /// ```
    /// use csvdelta::diff::DiffSummary;
    ///
    /// let summary = DiffSummary {
    ///     creates: 2,
    ///     deletes: 1,
    ///     unchanged: 40,
    ///     ..Default::default()
    /// };
    /// assert_eq!(summary.total_changes(), 3);
    /// assert!(!summary.is_identical());
    /// ```
    pub fn total_changes(&self) -> u64 {
        self.creates + self.updates + self.deletes
    }

    /// No event was emitted
    pub fn is_identical(&self) -> bool {
        self.total_changes() == 0
    }

    /// Rows on both sides paired by key
    pub fn matched(&self) -> u64 {
        self.updates + self.unchanged
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Record;

    #[test]
    fn test_new_summary_is_identical() {
        let summary = DiffSummary::new();
        assert!(summary.is_identical());
        assert_eq!(summary.total_changes(), 0);
    }

    #[test]
    fn test_record_events() {
        let mut summary = DiffSummary::new();

        summary.record_event(&ChangeEvent::Create(Record::from(vec!["1"])));
        summary.record_event(&ChangeEvent::Create(Record::from(vec!["2"])));
        summary.record_event(&ChangeEvent::Update(Record::from(vec!["3"])));
        summary.record_event(&ChangeEvent::Delete(Record::from(vec!["4"])));
        summary.record_unchanged();

        assert_eq!(summary.creates, 2);
        assert_eq!(summary.updates, 1);
        assert_eq!(summary.deletes, 1);
        assert_eq!(summary.unchanged, 1);
        assert_eq!(summary.total_changes(), 4);
        assert_eq!(summary.matched(), 2);
    }

    #[test]
    fn test_serializes_counts() {
        let summary = DiffSummary {
            creates: 1,
            ..Default::default()
        };
        let json = serde_json::to_value(summary).expect("serialize summary");
        assert_eq!(json["creates"], 1);
        assert_eq!(json["deletes"], 0);
    }
}
