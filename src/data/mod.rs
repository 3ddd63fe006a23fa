//! Sequence data structures and CSV loading
//!
//! Provides the per-word sequence containers consumed by model selection
//! and the test set consumed by the recognizer.

mod loader;
mod types;

pub use types::{
    build_xlengths, combine_sequences, TestItem, TestSet, TrainingSet, WordSequences,
    WordXLengths, XLengths,
};
