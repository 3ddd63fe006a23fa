//! Per-word model selection
//!
//! Chooses the number of hidden states for each word's model with one of
//! four strategies:
//!
//! - **Constant** - always `n_constant` states
//! - **BIC** - lowest Bayesian Information Criterion on the training data
//! - **DIC** - highest Discriminative Information Criterion against the
//!   other words
//! - **CV** - highest mean held-out log-likelihood under k-fold
//!   cross-validation

mod bic;
mod cancel;
mod config;
mod constant;
pub mod criteria;
mod cv;
mod dic;
mod folds;
mod selector;

pub use cancel::CancelToken;
pub use config::SelectorConfig;
pub use folds::{FoldSplit, KFold};
pub use selector::{CandidateModel, ModelSelector};

use crate::data::TrainingSet;
use crate::error::{ParseStrategyError, SelectionError};
use crate::models::SequenceModelTrainer;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Model selection strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionStrategy {
    Constant,
    Bic,
    Dic,
    Cv,
}

impl SelectionStrategy {
    pub const ALL: [SelectionStrategy; 4] = [
        SelectionStrategy::Constant,
        SelectionStrategy::Bic,
        SelectionStrategy::Dic,
        SelectionStrategy::Cv,
    ];
}

impl fmt::Display for SelectionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SelectionStrategy::Constant => "constant",
            SelectionStrategy::Bic => "bic",
            SelectionStrategy::Dic => "dic",
            SelectionStrategy::Cv => "cv",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for SelectionStrategy {
    type Err = ParseStrategyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|strategy| strategy.to_string().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseStrategyError(s.to_string()))
    }
}

/// Outcome of selecting models for many words
#[derive(Debug)]
pub struct SelectionRun<M> {
    /// Committed results; `None` when no candidate could be trained
    pub models: BTreeMap<String, Option<CandidateModel<M>>>,
    /// Words whose selection was cancelled before completing
    pub aborted: Vec<String>,
}

impl<M> SelectionRun<M> {
    /// Words that have no usable model
    pub fn missing(&self) -> Vec<&str> {
        self.models
            .iter()
            .filter(|(_, model)| model.is_none())
            .map(|(word, _)| word.as_str())
            .collect()
    }
}

/// Select a model for every word in `words` on the worker pool
///
/// Each word is selected independently and committed whole. Cancelled words
/// are listed in [`SelectionRun::aborted`] and left out of `models`.
pub fn select_all<T: SequenceModelTrainer>(
    trainer: &T,
    training: &TrainingSet,
    words: &[String],
    config: &SelectorConfig,
    strategy: SelectionStrategy,
    cancel: &CancelToken,
) -> Result<SelectionRun<T::Model>, SelectionError> {
    let selectors = words
        .iter()
        .map(|word| {
            ModelSelector::new(
                trainer,
                training.sequences(),
                training.xlengths(),
                word,
                config.clone(),
                strategy,
            )
            .map(|selector| selector.with_cancel(cancel.clone()))
        })
        .collect::<Result<Vec<_>, _>>()?;

    tracing::info!(
        "Selecting {} models with {} over {}..={} states",
        selectors.len(),
        strategy,
        config.min_n_components,
        config.max_n_components
    );

    let results: Vec<_> = selectors
        .par_iter()
        .map(|selector| (selector.word().to_string(), selector.select()))
        .collect();

    let mut run = SelectionRun {
        models: BTreeMap::new(),
        aborted: Vec::new(),
    };
    for (word, result) in results {
        match result {
            Ok(model) => {
                run.models.insert(word, model);
            }
            Err(SelectionError::Cancelled(_)) => run.aborted.push(word),
            Err(e) => return Err(e),
        }
    }

    if !run.aborted.is_empty() {
        tracing::warn!("Selection cancelled for {} words", run.aborted.len());
    }

    Ok(run)
}

/// Select a model for every word of the training set
pub fn train_all_words<T: SequenceModelTrainer>(
    trainer: &T,
    training: &TrainingSet,
    config: &SelectorConfig,
    strategy: SelectionStrategy,
    cancel: &CancelToken,
) -> Result<SelectionRun<T::Model>, SelectionError> {
    select_all(trainer, training, &training.words(), config, strategy, cancel)
}
