//! Recognition of test items with the selected word models

mod recognizer;
pub mod report;

pub use recognizer::{recognize, ProbabilityRecord, Recognition};
pub use report::{Mismatch, WordErrorReport};
