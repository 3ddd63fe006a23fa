//! Scoring criteria and the best-candidate reduction

use super::CandidateModel;

/// Direction in which a criterion improves
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Objective {
    Minimize,
    Maximize,
}

impl Objective {
    /// Strict improvement; ties keep the incumbent
    fn improves(self, candidate: f64, incumbent: f64) -> bool {
        match self {
            Objective::Minimize => candidate < incumbent,
            Objective::Maximize => candidate > incumbent,
        }
    }
}

/// Reduce candidates to the best one in iteration order
///
/// Candidates without a finite criterion never win. The first candidate to
/// reach the optimum is kept.
pub fn pick_best<M, I>(candidates: I, objective: Objective) -> Option<CandidateModel<M>>
where
    I: IntoIterator<Item = CandidateModel<M>>,
{
    candidates
        .into_iter()
        .filter_map(|c| c.criterion.filter(|s| s.is_finite()).map(|s| (s, c)))
        .fold(None, |best: Option<(f64, CandidateModel<M>)>, (score, candidate)| match best {
            Some((best_score, incumbent)) if !objective.improves(score, best_score) => {
                Some((best_score, incumbent))
            }
            _ => Some((score, candidate)),
        })
        .map(|(_, candidate)| candidate)
}

/// Free parameters of a diagonal-covariance Gaussian HMM
///
/// Transition matrix plus per-state means and variances, minus one for the
/// row-sum constraint.
pub fn free_parameters(n_states: usize, n_features: usize) -> usize {
    (n_states * n_states + 2 * n_states * n_features).saturating_sub(1)
}

/// Bayesian Information Criterion: `-2 logL + p ln N` (lower is better)
pub fn bic(log_likelihood: f64, n_states: usize, n_features: usize, n_frames: usize) -> f64 {
    let p = free_parameters(n_states, n_features) as f64;
    -2.0 * log_likelihood + p * (n_frames as f64).ln()
}

/// Discriminative Information Criterion (higher is better)
///
/// `logL` minus the mean log-likelihood of the competing words that could be
/// scored. `None` when there is nothing to compare against.
pub fn dic(log_likelihood: f64, competitor_scores: &[f64]) -> Option<f64> {
    mean(competitor_scores).map(|competitors| log_likelihood - competitors)
}

/// Arithmetic mean; `None` for an empty slice
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn candidate(n_states: usize, criterion: Option<f64>) -> CandidateModel<()> {
        CandidateModel {
            n_states,
            criterion,
            model: (),
        }
    }

    #[test]
    fn test_pick_best_minimize_keeps_first_tie() {
        let best = pick_best(
            vec![
                candidate(2, Some(10.0)),
                candidate(3, Some(5.0)),
                candidate(4, Some(5.0)),
            ],
            Objective::Minimize,
        )
        .unwrap();
        assert_eq!(best.n_states, 3);
    }

    #[test]
    fn test_pick_best_maximize_keeps_first_tie() {
        let best = pick_best(
            vec![
                candidate(2, Some(-3.0)),
                candidate(3, Some(-1.0)),
                candidate(4, Some(-1.0)),
                candidate(5, Some(-2.0)),
            ],
            Objective::Maximize,
        )
        .unwrap();
        assert_eq!(best.n_states, 3);
    }

    #[test]
    fn test_pick_best_skips_non_competitive() {
        let best = pick_best(
            vec![
                candidate(2, None),
                candidate(3, Some(f64::NAN)),
                candidate(4, Some(f64::INFINITY)),
                candidate(5, Some(1.0)),
            ],
            Objective::Minimize,
        )
        .unwrap();
        assert_eq!(best.n_states, 5);

        assert!(pick_best(vec![candidate(2, None)], Objective::Maximize).is_none());
        assert!(pick_best(Vec::<CandidateModel<()>>::new(), Objective::Maximize).is_none());
    }

    #[test]
    fn test_free_parameters() {
        // n = 3, d = 2: 9 + 12 - 1
        assert_eq!(free_parameters(3, 2), 20);
    }

    #[test]
    fn test_bic() {
        let score = bic(-100.0, 3, 2, 50);
        assert_relative_eq!(score, 200.0 + 20.0 * 50f64.ln(), epsilon = 1e-12);
    }

    #[test]
    fn test_dic() {
        assert_relative_eq!(dic(-10.0, &[-40.0, -20.0]).unwrap(), 20.0);
        assert!(dic(-10.0, &[]).is_none());
    }
}
