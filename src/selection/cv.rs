//! Cross-validated selection
//!
//! Each candidate is scored by its mean held-out log-likelihood over
//! `k = min(max_folds, sequence_count)` folds of the word's own sequences.
//! The winning candidate keeps the model of its last successfully scored
//! fold, not the last trained one: a fold whose model fits but fails to
//! score never replaces it. A word with a single sequence is scored on its
//! training data.

use super::criteria::{self, Objective};
use super::folds::KFold;
use super::selector::{CandidateModel, ModelSelector};
use crate::data::{combine_sequences, XLengths};
use crate::error::SelectionError;
use crate::models::SequenceModelTrainer;

pub(crate) fn select<T: SequenceModelTrainer>(
    selector: &ModelSelector<'_, T>,
) -> Result<Option<CandidateModel<T::Model>>, SelectionError> {
    let candidates = if selector.sequences().len() > 1 {
        select_k_fold(selector)?
    } else {
        select_in_sample(selector)?
    };

    Ok(criteria::pick_best(candidates, Objective::Maximize))
}

/// Held-in / held-out data for every fold
fn build_folds<T: SequenceModelTrainer>(selector: &ModelSelector<'_, T>) -> Vec<(XLengths, XLengths)> {
    let sequences = selector.sequences();
    let config = selector.config();
    let n_folds = config.max_folds.min(sequences.len());

    let splitter = if config.shuffle_folds {
        KFold::shuffled(config.random_seed)
    } else {
        KFold::new()
    };

    splitter
        .split(sequences.len(), n_folds)
        .into_iter()
        .enumerate()
        .filter_map(|(fold, split)| {
            let combined = combine_sequences(&split.train_indices, sequences).and_then(|train| {
                combine_sequences(&split.test_indices, sequences).map(|test| (train, test))
            });
            match combined {
                Ok(pair) => Some(pair),
                Err(e) => {
                    selector.trace(format_args!("fold {} skipped: {}", fold, e));
                    None
                }
            }
        })
        .collect()
}

fn select_k_fold<T: SequenceModelTrainer>(
    selector: &ModelSelector<'_, T>,
) -> Result<Vec<CandidateModel<T::Model>>, SelectionError> {
    let folds = build_folds(selector);

    selector.sweep(|n_states| {
        let mut scores = Vec::with_capacity(folds.len());
        let mut last_model = None;

        for (train, test) in &folds {
            selector.check_cancelled()?;
            let Some(model) = selector.fit(train, n_states) else {
                continue;
            };
            if let Some(score) = selector.score_on(&model, test) {
                scores.push(score);
                last_model = Some(model);
            }
        }

        // No successful fold means no mean to compare
        let (Some(mean), Some(model)) = (criteria::mean(&scores), last_model) else {
            selector.trace(format_args!("{} states: no fold could be scored", n_states));
            return Ok(None);
        };

        selector.trace(format_args!(
            "{} states: mean held-out logL = {:.4} over {} of {} folds",
            n_states,
            mean,
            scores.len(),
            folds.len()
        ));

        Ok(Some(CandidateModel {
            n_states,
            criterion: Some(mean),
            model,
        }))
    })
}

fn select_in_sample<T: SequenceModelTrainer>(
    selector: &ModelSelector<'_, T>,
) -> Result<Vec<CandidateModel<T::Model>>, SelectionError> {
    let Some(data) = selector.data() else {
        return Ok(Vec::new());
    };

    selector.sweep(|n_states| {
        let Some(model) = selector.fit(data, n_states) else {
            return Ok(None);
        };
        let Some(log_l) = selector.score_on(&model, data) else {
            return Ok(None);
        };

        selector.trace(format_args!(
            "{} states: single sequence, in-sample logL = {:.4}",
            n_states, log_l
        ));

        Ok(Some(CandidateModel {
            n_states,
            criterion: Some(log_l),
            model,
        }))
    })
}
