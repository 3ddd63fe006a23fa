//! K-fold splitting of a word's sequences

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// One train/test partition of sequence indices
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FoldSplit {
    pub train_indices: Vec<usize>,
    pub test_indices: Vec<usize>,
}

/// Deterministic k-fold splitter
///
/// Without a seed the folds are contiguous blocks in index order. The first
/// `n_samples % n_folds` folds get one extra member, so every index lands in
/// exactly one test fold.
#[derive(Debug, Clone, Default)]
pub struct KFold {
    shuffle_seed: Option<u64>,
}

impl KFold {
    /// Contiguous, unshuffled folds
    pub fn new() -> Self {
        Self::default()
    }

    /// Shuffle indices with a seeded RNG before splitting
    pub fn shuffled(seed: u64) -> Self {
        Self {
            shuffle_seed: Some(seed),
        }
    }

    /// Split `n_samples` indices into `n_folds` folds
    ///
    /// Returns no folds when `n_folds < 2` or `n_samples < n_folds`.
    pub fn split(&self, n_samples: usize, n_folds: usize) -> Vec<FoldSplit> {
        if n_folds < 2 || n_samples < n_folds {
            return Vec::new();
        }

        let mut indices: Vec<usize> = (0..n_samples).collect();
        if let Some(seed) = self.shuffle_seed {
            let mut rng = StdRng::seed_from_u64(seed);
            indices.shuffle(&mut rng);
        }

        let base = n_samples / n_folds;
        let extra = n_samples % n_folds;
        let mut splits = Vec::with_capacity(n_folds);
        let mut test_start = 0;

        for i in 0..n_folds {
            let fold_size = base + usize::from(i < extra);
            let test_end = test_start + fold_size;

            let test_indices = indices[test_start..test_end].to_vec();
            let mut train_indices: Vec<usize> = indices[..test_start]
                .iter()
                .chain(indices[test_end..].iter())
                .copied()
                .collect();
            train_indices.sort_unstable();

            splits.push(FoldSplit {
                train_indices,
                test_indices,
            });
            test_start = test_end;
        }

        splits
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_k_fold_sizes() {
        let splits = KFold::new().split(7, 3);
        assert_eq!(splits.len(), 3);
        assert_eq!(splits[0].test_indices, vec![0, 1, 2]);
        assert_eq!(splits[1].test_indices, vec![3, 4]);
        assert_eq!(splits[2].test_indices, vec![5, 6]);
        assert_eq!(splits[1].train_indices, vec![0, 1, 2, 5, 6]);
    }

    #[test]
    fn test_every_index_tested_once() {
        for seed in [None, Some(7)] {
            let kfold = seed.map(KFold::shuffled).unwrap_or_default();
            let splits = kfold.split(10, 3);
            let mut tested: Vec<usize> = splits.iter().flat_map(|s| s.test_indices.clone()).collect();
            tested.sort_unstable();
            assert_eq!(tested, (0..10).collect::<Vec<_>>());

            for split in &splits {
                assert_eq!(split.train_indices.len() + split.test_indices.len(), 10);
                assert!(split.test_indices.iter().all(|i| !split.train_indices.contains(i)));
            }
        }
    }

    #[test]
    fn test_leave_one_out_when_folds_equal_samples() {
        let splits = KFold::new().split(2, 2);
        assert_eq!(splits[0].train_indices, vec![1]);
        assert_eq!(splits[0].test_indices, vec![0]);
        assert_eq!(splits[1].train_indices, vec![0]);
        assert_eq!(splits[1].test_indices, vec![1]);
    }

    #[test]
    fn test_shuffle_is_deterministic() {
        assert_eq!(KFold::shuffled(3).split(9, 3), KFold::shuffled(3).split(9, 3));
    }

    #[test]
    fn test_invalid_requests_yield_no_folds() {
        assert!(KFold::new().split(1, 2).is_empty());
        assert!(KFold::new().split(5, 1).is_empty());
    }
}
