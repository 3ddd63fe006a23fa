//! Fixed state count, no competition between candidates

use super::selector::{CandidateModel, ModelSelector};
use crate::error::SelectionError;
use crate::models::SequenceModelTrainer;

/// Train once at `n_constant` states
pub(crate) fn select<T: SequenceModelTrainer>(
    selector: &ModelSelector<'_, T>,
) -> Result<Option<CandidateModel<T::Model>>, SelectionError> {
    selector.check_cancelled()?;

    let n_states = selector.config().n_constant;
    Ok(selector.base_model(n_states).map(|model| CandidateModel {
        n_states,
        criterion: None,
        model,
    }))
}
