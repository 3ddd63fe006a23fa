//! Sequence model contracts and the bundled Gaussian HMM
//!
//! Model selection and recognition only talk to the [`SequenceModelTrainer`]
//! and [`SequenceModel`] traits. [`SegmentalTrainer`] is a closed-form
//! implementation of them for left-to-right Gaussian HMMs.

mod algorithms;
mod gaussian;
mod hmm;

pub use algorithms::{forward_log_likelihood, log_sum_exp};
pub use gaussian::DiagonalGaussian;
pub use hmm::{GaussianHmm, SegmentalTrainer};

use crate::data::XLengths;
use crate::error::{ScoringError, TrainingError};
use ndarray::Array2;

/// A trained sequence model that can score observations
pub trait SequenceModel: Send + Sync {
    /// Number of hidden states
    fn n_states(&self) -> usize;

    /// Number of features per frame
    fn n_features(&self) -> usize;

    /// Log-likelihood of the concatenated sequences in `x`
    ///
    /// Deterministic for a fixed model and input.
    fn score(&self, x: &Array2<f64>, lengths: &[usize]) -> Result<f64, ScoringError>;

    /// Score an [`XLengths`] pair
    fn score_xlengths(&self, data: &XLengths) -> Result<f64, ScoringError> {
        self.score(data.x(), data.lengths())
    }
}

impl<M: SequenceModel + ?Sized> SequenceModel for Box<M> {
    fn n_states(&self) -> usize {
        (**self).n_states()
    }

    fn n_features(&self) -> usize {
        (**self).n_features()
    }

    fn score(&self, x: &Array2<f64>, lengths: &[usize]) -> Result<f64, ScoringError> {
        (**self).score(x, lengths)
    }
}

/// Fits a sequence model with a given number of hidden states
pub trait SequenceModelTrainer: Send + Sync {
    type Model: SequenceModel;

    /// Train on the concatenated sequences in `x`
    fn fit(
        &self,
        x: &Array2<f64>,
        lengths: &[usize],
        n_states: usize,
        seed: u64,
    ) -> Result<Self::Model, TrainingError>;
}
