//! Discriminative Information Criterion selection
//!
//! `DIC = logL(word) - mean(logL(other words))` under the same candidate
//! model. Competitors whose data cannot be scored are left out of the mean;
//! a candidate with no scorable competitor cannot win. The highest score wins.

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

    let competitors = selector.competitors();
    if competitors.is_empty() {
        tracing::warn!(
            "{}: DIC needs at least one other word to discriminate against",
            selector.word()
        );
        return Ok(None);
    }

    let candidates = selector.sweep(|n_states| {
        let Some(model) = selector.fit(data, n_states) else {
            return Ok(None);
        };
        let Some(log_l) = selector.score_on(&model, data) else {
            return Ok(None);
        };

        let mut competitor_scores = Vec::with_capacity(competitors.len());
        for (word, other) in &competitors {
            selector.check_cancelled()?;
            match selector.score_on(&model, other) {
                Some(score) => competitor_scores.push(score),
                None => selector.trace(format_args!(
                    "{} states: {} left out of the competitor mean",
                    n_states, word
                )),
            }
        }

        let score = criteria::dic(log_l, &competitor_scores);
        selector.trace(format_args!(
            "{} states: logL = {:.4}, {} of {} competitors scored, DIC = {:?}",
            n_states,
            log_l,
            competitor_scores.len(),
            competitors.len(),
            score
        ));

        Ok(Some(CandidateModel {
            n_states,
            criterion: score,
            model,
        }))
    })?;

    Ok(criteria::pick_best(candidates, Objective::Maximize))
}
