//! # HMM Sign Recognizer
//!
//! Per-word hidden Markov model selection and isolated-sign recognition.
//!
//! ## Modules
//!
//! - `data` - Word sequences, test sets and the CSV loader
//! - `models` - Trainer/scorer traits and a left-to-right Gaussian HMM
//! - `selection` - Constant, BIC, DIC and cross-validated state-count selection
//! - `recognition` - Arg-max recognizer and word error report
//! - `error` - Typed errors shared by the crate

pub mod data;
pub mod error;
pub mod models;
pub mod recognition;
pub mod selection;

pub use data::{TestSet, TrainingSet, XLengths};
pub use models::{GaussianHmm, SegmentalTrainer, SequenceModel, SequenceModelTrainer};
pub use recognition::{recognize, Recognition, WordErrorReport};
pub use selection::{ModelSelector, SelectionStrategy, SelectorConfig};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::data::{TestItem, TestSet, TrainingSet, WordSequences, WordXLengths, XLengths};
    pub use crate::error::{
        DataError, RecognitionError, ScoringError, SelectionError, TrainingError,
    };
    pub use crate::models::{GaussianHmm, SegmentalTrainer, SequenceModel, SequenceModelTrainer};
    pub use crate::recognition::{recognize, Recognition, WordErrorReport};
    pub use crate::selection::{
        select_all, train_all_words, CancelToken, CandidateModel, ModelSelector, SelectionRun,
        SelectionStrategy, SelectorConfig,
    };
}
