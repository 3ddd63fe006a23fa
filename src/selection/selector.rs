//! Shared state and candidate loop for all selection strategies

use super::cancel::CancelToken;
use super::config::SelectorConfig;
use super::{bic, constant, cv, dic, SelectionStrategy};
use crate::data::{WordSequences, WordXLengths, XLengths};
use crate::error::{ScoringError, SelectionError};
use crate::models::{SequenceModel, SequenceModelTrainer};
use ndarray::Array2;
use rayon::prelude::*;
use std::fmt;

/// A model trained for one word at one state count
#[derive(Debug, Clone)]
pub struct CandidateModel<M> {
    /// Requested number of hidden states
    pub n_states: usize,
    /// Criterion value that won the selection (`None` for the constant strategy)
    pub criterion: Option<f64>,
    /// Trained model
    pub model: M,
}

impl<M: SequenceModel> SequenceModel for CandidateModel<M> {
    fn n_states(&self) -> usize {
        self.n_states
    }

    fn n_features(&self) -> usize {
        self.model.n_features()
    }

    fn score(&self, x: &Array2<f64>, lengths: &[usize]) -> Result<f64, ScoringError> {
        self.model.score(x, lengths)
    }
}

/// Selects the hidden-state count for one word
pub struct ModelSelector<'a, T: SequenceModelTrainer> {
    trainer: &'a T,
    words: &'a WordSequences,
    hwords: &'a WordXLengths,
    this_word: &'a str,
    config: SelectorConfig,
    strategy: SelectionStrategy,
    cancel: CancelToken,
}

impl<'a, T: SequenceModelTrainer> ModelSelector<'a, T> {
    /// Create a selector for `word`
    ///
    /// Fails when the word is missing from either mapping or the
    /// configuration is invalid.
    pub fn new(
        trainer: &'a T,
        words: &'a WordSequences,
        hwords: &'a WordXLengths,
        word: &'a str,
        config: SelectorConfig,
        strategy: SelectionStrategy,
    ) -> Result<Self, SelectionError> {
        config.validate()?;
        if !words.contains_key(word) || !hwords.contains_key(word) {
            return Err(SelectionError::UnknownWord(word.to_string()));
        }

        Ok(Self {
            trainer,
            words,
            hwords,
            this_word: word,
            config,
            strategy,
            cancel: CancelToken::new(),
        })
    }

    /// Attach a cancellation token
    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Run the configured strategy
    ///
    /// `Ok(None)` means no candidate could be trained and scored. The only
    /// error is cancellation, in which case nothing is returned for the word.
    pub fn select(&self) -> Result<Option<CandidateModel<T::Model>>, SelectionError> {
        let selected = match self.strategy {
            SelectionStrategy::Constant => constant::select(self),
            SelectionStrategy::Bic => bic::select(self),
            SelectionStrategy::Dic => dic::select(self),
            SelectionStrategy::Cv => cv::select(self),
        };

        match &selected {
            Ok(Some(candidate)) => tracing::info!(
                "{}: {} selected {} states",
                self.this_word,
                self.strategy,
                candidate.n_states
            ),
            Ok(None) => tracing::warn!(
                "{}: {} found no usable model in {}..={}",
                self.this_word,
                self.strategy,
                self.config.min_n_components,
                self.config.max_n_components
            ),
            Err(e) => tracing::warn!("{}", e),
        }

        selected
    }

    pub fn word(&self) -> &str {
        self.this_word
    }

    pub fn config(&self) -> &SelectorConfig {
        &self.config
    }

    pub fn strategy(&self) -> SelectionStrategy {
        self.strategy
    }

    /// The word's own sequences
    pub(crate) fn sequences(&self) -> &'a [Array2<f64>] {
        self.words
            .get(self.this_word)
            .map(|s| s.as_slice())
            .unwrap_or_default()
    }

    /// The word's own concatenated data
    pub(crate) fn data(&self) -> Option<&'a XLengths> {
        self.hwords.get(self.this_word)
    }

    /// Concatenated data of every other word, in word order
    pub(crate) fn competitors(&self) -> Vec<(&'a str, &'a XLengths)> {
        self.hwords
            .iter()
            .filter(|(word, _)| word.as_str() != self.this_word)
            .map(|(word, data)| (word.as_str(), data))
            .collect()
    }

    pub(crate) fn check_cancelled(&self) -> Result<(), SelectionError> {
        if self.cancel.is_cancelled() {
            Err(SelectionError::Cancelled(self.this_word.to_string()))
        } else {
            Ok(())
        }
    }

    /// Candidate diagnostics; promoted to info level when verbose
    pub(crate) fn trace(&self, message: fmt::Arguments<'_>) {
        if self.config.verbose {
            tracing::info!("{}: {}", self.this_word, message);
        } else {
            tracing::debug!("{}: {}", self.this_word, message);
        }
    }

    /// Train on `data`; failures are logged and yield `None`
    pub(crate) fn fit(&self, data: &XLengths, n_states: usize) -> Option<T::Model> {
        match self
            .trainer
            .fit(data.x(), data.lengths(), n_states, self.config.random_seed)
        {
            Ok(model) => {
                self.trace(format_args!("model created with {} states", n_states));
                Some(model)
            }
            Err(e) => {
                self.trace(format_args!("failure with {} states: {}", n_states, e));
                None
            }
        }
    }

    /// Train on the word's own data
    pub(crate) fn base_model(&self, n_states: usize) -> Option<T::Model> {
        self.fit(self.data()?, n_states)
    }

    /// Score `data`; failures and non-finite values yield `None`
    pub(crate) fn score_on<M: SequenceModel>(&self, model: &M, data: &XLengths) -> Option<f64> {
        match model.score_xlengths(data) {
            Ok(score) if score.is_finite() => Some(score),
            Ok(_) => {
                self.trace(format_args!("non-finite score with {} states", model.n_states()));
                None
            }
            Err(e) => {
                self.trace(format_args!(
                    "scoring failed with {} states: {}",
                    model.n_states(),
                    e
                ));
                None
            }
        }
    }

    /// Evaluate every candidate state count on the worker pool
    ///
    /// Results come back in ascending state-count order, so a serial
    /// reduction afterwards sees the same order as a sequential loop.
    /// Candidates for which `evaluate` yields `None` are dropped.
    pub(crate) fn sweep<F>(&self, evaluate: F) -> Result<Vec<CandidateModel<T::Model>>, SelectionError>
    where
        F: Fn(usize) -> Result<Option<CandidateModel<T::Model>>, SelectionError> + Sync,
    {
        let counts = self.config.state_counts();
        let evaluated: Vec<Result<Option<CandidateModel<T::Model>>, SelectionError>> = counts
            .par_iter()
            .map(|&n_states| {
                self.check_cancelled()?;
                evaluate(n_states)
            })
            .collect();

        let mut candidates = Vec::with_capacity(evaluated.len());
        for result in evaluated {
            if let Some(candidate) = result? {
                candidates.push(candidate);
            }
        }
        Ok(candidates)
    }
}
