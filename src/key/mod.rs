//! Comparators - the ordering contract shared by sort and compare
//!
//! A comparator must be pure: both engines evaluate it repeatedly on the same
//! rows and rely on identical answers.

mod columns;

pub use columns::{KeyColumn, KeyComparator, KeyType};

use crate::types::{CsvDeltaError, KeyedRecord};
use std::cmp::Ordering;

/// Total order over records
pub trait RecordComparator {
    /// Order `a` relative to `b`
    ///
    /// An `Err` aborts the sort or compare call that asked.
    fn compare(&self, a: &KeyedRecord<'_>, b: &KeyedRecord<'_>) -> Result<Ordering, CsvDeltaError>;
}

impl<C: RecordComparator + ?Sized> RecordComparator for &C {
    fn compare(&self, a: &KeyedRecord<'_>, b: &KeyedRecord<'_>) -> Result<Ordering, CsvDeltaError> {
        (**self).compare(a, b)
    }
}

impl<C: RecordComparator + ?Sized> RecordComparator for Box<C> {
    fn compare(&self, a: &KeyedRecord<'_>, b: &KeyedRecord<'_>) -> Result<Ordering, CsvDeltaError> {
        (**self).compare(a, b)
    }
}

/// Comparator backed by an infallible closure, see [`from_fn`]
#[derive(Clone, Copy)]
pub struct FnComparator<F>(F);

/// Comparator backed by a fallible closure, see [`try_from_fn`]
#[derive(Clone, Copy)]
pub struct TryFnComparator<F>(F);

/// Wrap a closure as a comparator
///
/// # Example
/// ```
/// use csvdelta::key::{from_fn, RecordComparator};
/// use csvdelta::types::{Header, KeyedRecord, Record};
///
/// let by_first = from_fn(|a, b| a.field(0).cmp(&b.field(0)));
/// let header = Header::empty();
/// let (x, y) = (Record::from(vec!["a"]), Record::from(vec!["b"]));
/// let ord = by_first
///     .compare(&KeyedRecord::new(&header, &x), &KeyedRecord::new(&header, &y))
///     .unwrap();
/// assert!(ord.is_lt());
/// ```
pub fn from_fn<F>(f: F) -> FnComparator<F>
where
    F: Fn(&KeyedRecord<'_>, &KeyedRecord<'_>) -> Ordering,
{
    FnComparator(f)
}

/// Wrap a closure that may fail as a comparator
pub fn try_from_fn<F>(f: F) -> TryFnComparator<F>
where
    F: Fn(&KeyedRecord<'_>, &KeyedRecord<'_>) -> Result<Ordering, CsvDeltaError>,
{
    TryFnComparator(f)
}

impl<F> RecordComparator for FnComparator<F>
where
    F: Fn(&KeyedRecord<'_>, &KeyedRecord<'_>) -> Ordering,
{
    fn compare(&self, a: &KeyedRecord<'_>, b: &KeyedRecord<'_>) -> Result<Ordering, CsvDeltaError> {
        Ok((self.0)(a, b))
    }
}

impl<F> RecordComparator for TryFnComparator<F>
where
    F: Fn(&KeyedRecord<'_>, &KeyedRecord<'_>) -> Result<Ordering, CsvDeltaError>,
{
    fn compare(&self, a: &KeyedRecord<'_>, b: &KeyedRecord<'_>) -> Result<Ordering, CsvDeltaError> {
        (self.0)(a, b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Header, Record};

    #[test]
    fn test_from_fn_orders_by_closure() {
        let cmp = from_fn(|a, b| b.field(0).cmp(&a.field(0)));
        let header = Header::empty();
        let (x, y) = (Record::from(vec!["1"]), Record::from(vec!["2"]));

        let ord = cmp
            .compare(&KeyedRecord::new(&header, &x), &KeyedRecord::new(&header, &y))
            .unwrap();
        assert_eq!(ord, Ordering::Greater);
    }

    #[test]
    fn test_try_from_fn_propagates_error() {
        let cmp = try_from_fn(|_, _| Err(CsvDeltaError::Comparator("boom".to_string())));
        let header = Header::empty();
        let row = Record::from(vec!["1"]);
        let keyed = KeyedRecord::new(&header, &row);

        assert!(matches!(
            cmp.compare(&keyed, &keyed),
            Err(CsvDeltaError::Comparator(_))
        ));
    }

    #[test]
    fn test_boxed_comparator() {
        let boxed: Box<dyn RecordComparator> = Box::new(from_fn(|a, b| a.field(0).cmp(&b.field(0))));
        let header = Header::empty();
        let row = Record::from(vec!["1"]);
        let keyed = KeyedRecord::new(&header, &row);

        assert_eq!(boxed.compare(&keyed, &keyed).unwrap(), Ordering::Equal);
    }
}
