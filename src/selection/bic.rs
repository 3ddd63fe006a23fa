//! Bayesian Information Criterion selection
//!
//! `BIC = -2 logL + p ln N` with `p = n² + 2nd - 1` free parameters for a
//! diagonal-covariance model with `n` states and `d` features, `N` frames.
//! The lowest score wins.

use super::criteria::{self, Objective};
use super::selector::{CandidateModel, ModelSelector};
use crate::error::SelectionError;
use crate::models::SequenceModelTrainer;

pub(crate) fn select<T: SequenceModelTrainer>(
    selector: &ModelSelector<'_, T>,
) -> Result<Option<CandidateModel<T::Model>>, SelectionError> {
    let Some(data) = selector.data() else {
        return Ok(None);
    };

    let candidates = selector.sweep(|n_states| {
        let Some(model) = selector.fit(data, n_states) else {
            return Ok(None);
        };
        let Some(log_l) = selector.score_on(&model, data) else {
            return Ok(None);
        };

        let score = criteria::bic(log_l, n_states, data.n_features(), data.n_frames());
        selector.trace(format_args!(
            "{} states: logL = {:.4}, BIC = {:.4}",
            n_states, log_l, score
        ));

        Ok(Some(CandidateModel {
            n_states,
            criterion: Some(score),
            model,
        }))
    })?;

    Ok(criteria::pick_best(candidates, Objective::Minimize))
}
