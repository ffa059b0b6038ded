//! Compare engine - change classification between two key-sorted inputs

mod columns;
mod engine;
mod summary;

pub use columns::TrackedColumns;
pub use engine::{compare, ChangeStream};
pub use summary::DiffSummary;
