//! ChangeEvent - Classifications produced by the compare engine

use super::Record;
use serde::Serialize;
use std::fmt;

/// Kind of change, without the row payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Create,
    Update,
    Delete,
}

impl ChangeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeKind::Create => "create",
            ChangeKind::Update => "update",
            ChangeKind::Delete => "delete",
        }
    }
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Change determined by the compare engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeEvent {
    /// Row exists only in the primary input
    Create(Record),

    /// Key matched and a tracked column differs; carries the primary row
    Update(Record),

    /// Row exists only in the secondary input
    Delete(Record),
}

impl ChangeEvent {
    pub fn kind(&self) -> ChangeKind {
        match self {
            ChangeEvent::Create(_) => ChangeKind::Create,
            ChangeEvent::Update(_) => ChangeKind::Update,
            ChangeEvent::Delete(_) => ChangeKind::Delete,
        }
    }

    pub fn record(&self) -> &Record {
        match self {
            ChangeEvent::Create(record)
            | ChangeEvent::Update(record)
            | ChangeEvent::Delete(record) => record,
        }
    }

    pub fn into_record(self) -> Record {
        match self {
            ChangeEvent::Create(record)
            | ChangeEvent::Update(record)
            | ChangeEvent::Delete(record) => record,
        }
    }

    pub fn is_create(&self) -> bool {
        matches!(self, ChangeEvent::Create(_))
    }

    pub fn is_update(&self) -> bool {
        matches!(self, ChangeEvent::Update(_))
    }

    pub fn is_delete(&self) -> bool {
        matches!(self, ChangeEvent::Delete(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_and_record() {
        let row = Record::from(vec!["1", "a"]);
        let event = ChangeEvent::Update(row.clone());

        assert_eq!(event.kind(), ChangeKind::Update);
        assert_eq!(event.record(), &row);
        assert!(event.is_update());
        assert!(!event.is_create());
        assert_eq!(event.into_record(), row);
    }

    #[test]
    fn test_kind_display_and_serialize() {
        assert_eq!(ChangeKind::Delete.to_string(), "delete");
        assert_eq!(
            serde_json::to_string(&ChangeKind::Create).expect("serialize kind"),
            "\"create\""
        );
    }
}
