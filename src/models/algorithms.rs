//! HMM likelihood computation in log space

use super::gaussian::DiagonalGaussian;
use ndarray::{Array1, Array2, ArrayView2};

/// ln(Σ exp(v)) without overflow; `-inf` for an empty or all `-inf` input
pub fn log_sum_exp(values: &[f64]) -> f64 {
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if max == f64::NEG_INFINITY {
        return f64::NEG_INFINITY;
    }
    max + values.iter().map(|v| (v - max).exp()).sum::<f64>().ln()
}

/// Forward algorithm - log P(observations | model) for one sequence
///
/// # Arguments
/// * `observations` - Observation matrix (T x D)
/// * `log_start` - Log initial state probabilities (N)
/// * `log_transition` - Log state transition probabilities (N x N)
/// * `emissions` - Emission distributions for each state
pub fn forward_log_likelihood(
    observations: ArrayView2<f64>,
    log_start: &Array1<f64>,
    log_transition: &Array2<f64>,
    emissions: &[DiagonalGaussian],
) -> f64 {
    let t = observations.nrows();
    let n = log_start.len();

    if t == 0 {
        return 0.0;
    }

    // Initialization (t = 0)
    let obs_0 = observations.row(0);
    let mut alpha: Vec<f64> = (0..n)
        .map(|j| log_start[j] + emissions[j].log_pdf(obs_0))
        .collect();

    // Recursion
    let mut terms = vec![0.0; n];
    for t_idx in 1..t {
        let obs_t = observations.row(t_idx);
        let next: Vec<f64> = (0..n)
            .map(|j| {
                for i in 0..n {
                    terms[i] = alpha[i] + log_transition[[i, j]];
                }
                log_sum_exp(&terms) + emissions[j].log_pdf(obs_t)
            })
            .collect();
        alpha = next;
    }

    // Termination
    log_sum_exp(&alpha)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::{arr2, array};

    fn create_test_hmm() -> (Array1<f64>, Array2<f64>, Vec<DiagonalGaussian>) {
        // 2-state HMM
        let start = array![0.6_f64, 0.4].mapv(f64::ln);
        let transition = arr2(&[[0.7_f64, 0.3], [0.4, 0.6]]).mapv(f64::ln);
        let emissions = vec![
            DiagonalGaussian::with_unit_variance(array![0.0]),
            DiagonalGaussian::with_unit_variance(array![3.0]),
        ];
        (start, transition, emissions)
    }

    #[test]
    fn test_log_sum_exp() {
        assert_relative_eq!(log_sum_exp(&[0.0, 0.0]), 2.0_f64.ln(), epsilon = 1e-12);
        assert_relative_eq!(log_sum_exp(&[-1000.0, -1000.0]), -1000.0 + 2.0_f64.ln());
        assert_eq!(log_sum_exp(&[f64::NEG_INFINITY]), f64::NEG_INFINITY);
        assert_eq!(log_sum_exp(&[]), f64::NEG_INFINITY);
    }

    #[test]
    fn test_forward_matches_path_enumeration() {
        let (start, transition, emissions) = create_test_hmm();
        let obs = arr2(&[[0.1], [2.8], [3.1]]);

        // Sum the joint probability of all 2^3 state paths
        let mut total = 0.0;
        for path in 0..8usize {
            let states: Vec<usize> = (0..3).map(|t| (path >> t) & 1).collect();
            let mut log_p = start[states[0]] + emissions[states[0]].log_pdf(obs.row(0));
            for t in 1..3 {
                log_p += transition[[states[t - 1], states[t]]]
                    + emissions[states[t]].log_pdf(obs.row(t));
            }
            total += log_p.exp();
        }

        let log_ll = forward_log_likelihood(obs.view(), &start, &transition, &emissions);
        assert_relative_eq!(log_ll, total.ln(), epsilon = 1e-9);
    }

    #[test]
    fn test_forward_empty_sequence() {
        let (start, transition, emissions) = create_test_hmm();
        let obs = Array2::<f64>::zeros((0, 1));
        assert_eq!(
            forward_log_likelihood(obs.view(), &start, &transition, &emissions),
            0.0
        );
    }
}
