//! Left-to-right Gaussian HMM with a flat-start segmental estimator

use super::algorithms::forward_log_likelihood;
use super::gaussian::DiagonalGaussian;
use super::{SequenceModel, SequenceModelTrainer};
use crate::error::{ScoringError, TrainingError};
use ndarray::{s, Array1, Array2, Axis};

/// Gaussian Hidden Markov Model with diagonal covariances
///
/// Probabilities are stored in log space; impossible transitions are `-inf`.
#[derive(Debug, Clone)]
pub struct GaussianHmm {
    n_features: usize,
    log_start: Array1<f64>,
    log_transition: Array2<f64>,
    emissions: Vec<DiagonalGaussian>,
}

impl GaussianHmm {
    /// Create from probabilities (not logs)
    pub fn new(
        start_probs: Array1<f64>,
        transition_matrix: Array2<f64>,
        emissions: Vec<DiagonalGaussian>,
    ) -> Result<Self, TrainingError> {
        let n = start_probs.len();
        if n == 0 || emissions.len() != n || transition_matrix.dim() != (n, n) {
            return Err(TrainingError::InvalidStateCount(n));
        }
        let n_features = emissions[0].dim();
        if emissions.iter().any(|e| e.dim() != n_features) {
            return Err(TrainingError::InsufficientData(
                "emissions disagree on feature count".to_string(),
            ));
        }

        Ok(Self {
            n_features,
            log_start: start_probs.mapv(f64::ln),
            log_transition: transition_matrix.mapv(f64::ln),
            emissions,
        })
    }

    /// Initial state probabilities
    pub fn start_probs(&self) -> Array1<f64> {
        self.log_start.mapv(f64::exp)
    }

    /// State transition matrix
    pub fn transition_matrix(&self) -> Array2<f64> {
        self.log_transition.mapv(f64::exp)
    }

    /// Emission means for each state
    pub fn emission_means(&self) -> Vec<Array1<f64>> {
        self.emissions.iter().map(|e| e.mean.clone()).collect()
    }
}

impl SequenceModel for GaussianHmm {
    fn n_states(&self) -> usize {
        self.emissions.len()
    }

    fn n_features(&self) -> usize {
        self.n_features
    }

    fn score(&self, x: &Array2<f64>, lengths: &[usize]) -> Result<f64, ScoringError> {
        if x.ncols() != self.n_features {
            return Err(ScoringError::DimensionMismatch {
                expected: self.n_features,
                actual: x.ncols(),
            });
        }
        let lengths_sum: usize = lengths.iter().sum();
        if lengths_sum != x.nrows() {
            return Err(ScoringError::LengthMismatch {
                lengths_sum,
                rows: x.nrows(),
            });
        }
        if lengths.is_empty() || lengths.contains(&0) {
            return Err(ScoringError::Empty);
        }

        let mut offset = 0;
        let mut total = 0.0;
        for &len in lengths {
            let sequence = x.slice(s![offset..offset + len, ..]);
            total += forward_log_likelihood(
                sequence,
                &self.log_start,
                &self.log_transition,
                &self.emissions,
            );
            offset += len;
        }

        if total.is_finite() {
            Ok(total)
        } else {
            Err(ScoringError::NonFinite)
        }
    }
}

/// Flat-start estimator for left-to-right Gaussian HMMs
///
/// Every sequence is cut into `n_states` equal segments; each state's
/// Gaussian is estimated from its frames and the start/transition
/// probabilities are the normalised segment counts. The fit is closed-form,
/// so the seed has no effect on the result.
#[derive(Debug, Clone)]
pub struct SegmentalTrainer {
    /// Variance floor for every emission dimension
    pub min_covar: f64,
}

impl Default for SegmentalTrainer {
    fn default() -> Self {
        Self { min_covar: 1e-3 }
    }
}

impl SegmentalTrainer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set variance floor
    pub fn with_min_covar(mut self, min_covar: f64) -> Self {
        self.min_covar = min_covar;
        self
    }
}

/// State of frame `t` in a sequence of `len` frames split into `n` segments
fn segment_of(t: usize, len: usize, n: usize) -> usize {
    t * n / len
}

/// Row-normalise counts; rows without mass become a self-loop
fn normalise_rows(mut counts: Array2<f64>) -> Array2<f64> {
    for (i, mut row) in counts.axis_iter_mut(Axis(0)).enumerate() {
        let total = row.sum();
        if total > 0.0 {
            row /= total;
        } else {
            row[i] = 1.0;
        }
    }
    counts
}

impl SequenceModelTrainer for SegmentalTrainer {
    type Model = GaussianHmm;

    fn fit(
        &self,
        x: &Array2<f64>,
        lengths: &[usize],
        n_states: usize,
        _seed: u64,
    ) -> Result<GaussianHmm, TrainingError> {
        if n_states == 0 {
            return Err(TrainingError::InvalidStateCount(n_states));
        }
        let lengths_sum: usize = lengths.iter().sum();
        if lengths_sum != x.nrows() {
            return Err(TrainingError::LengthMismatch {
                lengths_sum,
                rows: x.nrows(),
            });
        }
        if lengths.is_empty() {
            return Err(TrainingError::InsufficientData("no sequences".to_string()));
        }
        if lengths.contains(&0) {
            return Err(TrainingError::EmptySequence);
        }

        let mut members: Vec<Vec<usize>> = vec![Vec::new(); n_states];
        let mut start_counts = Array1::<f64>::zeros(n_states);
        let mut transition_counts = Array2::<f64>::zeros((n_states, n_states));

        let mut offset = 0;
        for &len in lengths {
            start_counts[segment_of(0, len, n_states)] += 1.0;
            for t in 0..len {
                let state = segment_of(t, len, n_states);
                members[state].push(offset + t);
                if t + 1 < len {
                    transition_counts[[state, segment_of(t + 1, len, n_states)]] += 1.0;
                }
            }
            offset += len;
        }

        if let Some(empty) = members.iter().position(|m| m.is_empty()) {
            return Err(TrainingError::InsufficientData(format!(
                "state {} of {} received no frames ({} frames, longest sequence {})",
                empty,
                n_states,
                x.nrows(),
                lengths.iter().max().copied().unwrap_or(0)
            )));
        }

        let emissions = members
            .iter()
            .map(|rows| DiagonalGaussian::from_samples(&x.select(Axis(0), rows), self.min_covar))
            .collect();

        let start_probs = &start_counts / start_counts.sum();
        let transition_matrix = normalise_rows(transition_counts);

        tracing::debug!(
            "Segmental fit: {} states, {} sequences, {} frames",
            n_states,
            lengths.len(),
            x.nrows()
        );

        GaussianHmm::new(start_probs, transition_matrix, emissions)
    }
}
