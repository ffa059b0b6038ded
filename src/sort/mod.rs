//! External merge sort for delimited files larger than memory
//!
//! Records are partitioned into sorted runs of at most `batch_size` rows,
//! then runs are merged two at a time in FIFO order until one remains. That
//! run is renamed onto the destination.

mod copy;
mod engine;
mod run_store;

pub use copy::copy_file_atomic;
pub use engine::{
    sort, ExternalSorter, SortCallback, SortEvent, SortOptions, SortStats, DEFAULT_BATCH_SIZE,
};
pub use run_store::{FsRunStore, MemoryRunStore, RunId, RunPhase, RunStore};
