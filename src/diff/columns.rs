//! Change columns resolved against both headers

use crate::types::{CsvDeltaError, Header, Record, Side};

/// Columns whose values decide whether a key match is an update
///
/// Names are resolved to `(primary, secondary)` positions once; rows are then
/// compared by position only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackedColumns {
    positions: Vec<(usize, usize)>,
}

impl TrackedColumns {
    /// Resolve `names` in both headers
    ///
    /// # Returns
    /// * `Ok(TrackedColumns)` - One position pair per name, in order
    /// * `Err(CsvDeltaError::MissingColumn)` - A name is absent from either header
    pub fn resolve<S: AsRef<str>>(
        names: &[S],
        primary: &Header,
        secondary: &Header,
    ) -> Result<Self, CsvDeltaError> {
        let mut positions = Vec::with_capacity(names.len());
        for name in names {
            let name = name.as_ref();
            let p = primary
                .index_of(name)
                .ok_or_else(|| missing(name, Side::Primary))?;
            let s = secondary
                .index_of(name)
                .ok_or_else(|| missing(name, Side::Secondary))?;
            positions.push((p, s));
        }
        Ok(Self { positions })
    }

    /// No columns tracked: key matches are never updates
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// At least one tracked value differs between the two rows
    pub fn differs(&self, primary: &Record, secondary: &Record) -> bool {
        self.positions
            .iter()
            .any(|&(p, s)| primary.get(p) != secondary.get(s))
    }
}

fn missing(name: &str, side: Side) -> CsvDeltaError {
    CsvDeltaError::MissingColumn {
        column: name.to_string(),
        side,
    }
}
