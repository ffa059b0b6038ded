//! Terminal output: progress spinner and logger setup

mod logging;
mod progress;

pub use logging::{init_logging, level_filter};
pub use progress::ProgressReporter;
