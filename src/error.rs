//! Error types for training, scoring, selection and recognition

use thiserror::Error;

/// Failure to fit a sequence model at a requested state count
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TrainingError {
    #[error("invalid state count: {0}")]
    InvalidStateCount(usize),

    #[error("lengths sum to {lengths_sum} but the observation matrix has {rows} rows")]
    LengthMismatch { lengths_sum: usize, rows: usize },

    #[error("empty sequence in training data")]
    EmptySequence,

    #[error("insufficient data: {0}")]
    InsufficientData(String),

    #[error("training did not converge: {0}")]
    NonConvergence(String),
}

/// Failure to score observations under a trained model
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScoringError {
    #[error("feature dimension mismatch: model has {expected}, data has {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("lengths sum to {lengths_sum} but the observation matrix has {rows} rows")]
    LengthMismatch { lengths_sum: usize, rows: usize },

    #[error("nothing to score")]
    Empty,

    #[error("log-likelihood is not finite")]
    NonFinite,

    #[error("scoring failed: {0}")]
    Other(String),
}

/// Invalid selector configuration
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("min_n_components must be at least 2, got {0}")]
    MinComponentsTooSmall(usize),

    #[error("max_n_components ({max}) is below min_n_components ({min})")]
    EmptyRange { min: usize, max: usize },

    #[error("n_constant must be at least 2, got {0}")]
    ConstantTooSmall(usize),

    #[error("max_folds must be at least 2, got {0}")]
    TooFewFolds(usize),
}

/// Errors surfaced by a model selector
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SelectionError {
    #[error("word not found in training data: {0}")]
    UnknownWord(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(#[from] ConfigError),

    #[error("selection cancelled for word {0}")]
    Cancelled(String),
}

/// Unrecognised selection strategy name
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown strategy '{0}' (expected constant, bic, dic or cv)")]
pub struct ParseStrategyError(pub String);

/// Errors surfaced by the recognizer
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RecognitionError {
    #[error("no word models to recognize with")]
    EmptyVocabulary,
}

/// Errors building sequence containers
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DataError {
    #[error("lengths sum to {lengths_sum} but the observation matrix has {rows} rows")]
    LengthMismatch { lengths_sum: usize, rows: usize },

    #[error("sequences have different feature counts: expected {expected}, got {actual}")]
    FeatureMismatch { expected: usize, actual: usize },

    #[error("shape error: {0}")]
    Shape(String),

    #[error("sequence index {index} out of range for {count} sequences")]
    IndexOutOfRange { index: usize, count: usize },
}
