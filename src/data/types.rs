//! Sequence containers shared by selection and recognition

use crate::error::DataError;
use ndarray::{concatenate, Array2, ArrayView2, Axis};
use std::collections::BTreeMap;

/// Word -> ordered observation sequences (frames x features)
pub type WordSequences = BTreeMap<String, Vec<Array2<f64>>>;

/// Word -> concatenated observations with per-sequence lengths
pub type WordXLengths = BTreeMap<String, XLengths>;

/// Concatenated observation matrix plus the length of every sequence in it
///
/// `lengths` always sums to the number of rows in `x`.
#[derive(Debug, Clone, PartialEq)]
pub struct XLengths {
    x: Array2<f64>,
    lengths: Vec<usize>,
}

impl XLengths {
    /// Wrap a matrix and its lengths, checking that they agree
    pub fn new(x: Array2<f64>, lengths: Vec<usize>) -> Result<Self, DataError> {
        let lengths_sum: usize = lengths.iter().sum();
        if lengths_sum != x.nrows() {
            return Err(DataError::LengthMismatch {
                lengths_sum,
                rows: x.nrows(),
            });
        }
        Ok(Self { x, lengths })
    }

    /// Concatenate sequences in order
    pub fn from_sequences(sequences: &[Array2<f64>]) -> Result<Self, DataError> {
        let Some(first) = sequences.first() else {
            return Ok(Self {
                x: Array2::zeros((0, 0)),
                lengths: vec![],
            });
        };

        let n_features = first.ncols();
        if let Some(bad) = sequences.iter().find(|s| s.ncols() != n_features) {
            return Err(DataError::FeatureMismatch {
                expected: n_features,
                actual: bad.ncols(),
            });
        }

        let views: Vec<ArrayView2<f64>> = sequences.iter().map(|s| s.view()).collect();
        let x = concatenate(Axis(0), &views).map_err(|e| DataError::Shape(e.to_string()))?;
        let lengths = sequences.iter().map(|s| s.nrows()).collect();

        Ok(Self { x, lengths })
    }

    /// Observation matrix
    pub fn x(&self) -> &Array2<f64> {
        &self.x
    }

    /// Per-sequence lengths
    pub fn lengths(&self) -> &[usize] {
        &self.lengths
    }

    /// Number of frames (rows)
    pub fn n_frames(&self) -> usize {
        self.x.nrows()
    }

    /// Number of feature columns
    pub fn n_features(&self) -> usize {
        self.x.ncols()
    }

    /// Number of sequences
    pub fn n_sequences(&self) -> usize {
        self.lengths.len()
    }
}

/// Concatenate the sequences picked by `indices` (in index order)
///
/// Used by cross-validation to build held-in and held-out data.
pub fn combine_sequences(indices: &[usize], sequences: &[Array2<f64>]) -> Result<XLengths, DataError> {
    let picked = indices
        .iter()
        .map(|&index| {
            sequences
                .get(index)
                .cloned()
                .ok_or(DataError::IndexOutOfRange {
                    index,
                    count: sequences.len(),
                })
        })
        .collect::<Result<Vec<_>, _>>()?;

    XLengths::from_sequences(&picked)
}

/// Derive the concatenated form of every word's sequences
pub fn build_xlengths(sequences: &WordSequences) -> Result<WordXLengths, DataError> {
    sequences
        .iter()
        .map(|(word, seqs)| Ok((word.clone(), XLengths::from_sequences(seqs)?)))
        .collect()
}

/// Training data for a vocabulary
#[derive(Debug, Clone)]
pub struct TrainingSet {
    /// Selected feature names
    pub features: Vec<String>,
    sequences: WordSequences,
    xlengths: WordXLengths,
}

impl TrainingSet {
    /// Build from per-word sequences, deriving the concatenated view once
    pub fn new(sequences: WordSequences, features: Vec<String>) -> Result<Self, DataError> {
        let xlengths = build_xlengths(&sequences)?;
        Ok(Self {
            features,
            sequences,
            xlengths,
        })
    }

    /// Vocabulary in lexicographic order
    pub fn words(&self) -> Vec<String> {
        self.sequences.keys().cloned().collect()
    }

    pub fn sequences(&self) -> &WordSequences {
        &self.sequences
    }

    pub fn xlengths(&self) -> &WordXLengths {
        &self.xlengths
    }

    pub fn word_sequences(&self, word: &str) -> Option<&[Array2<f64>]> {
        self.sequences.get(word).map(|s| s.as_slice())
    }

    pub fn word_xlengths(&self, word: &str) -> Option<&XLengths> {
        self.xlengths.get(word)
    }

    /// Total number of training sequences
    pub fn num_items(&self) -> usize {
        self.sequences.values().map(|s| s.len()).sum()
    }
}

/// One unlabelled (or labelled) sequence to recognize
#[derive(Debug, Clone)]
pub struct TestItem {
    /// Item id; the test set is ordered by it
    pub id: usize,
    /// True word, when known
    pub word: Option<String>,
    /// Observations of the item
    pub data: XLengths,
}

/// Ordered collection of test items
#[derive(Debug, Clone, Default)]
pub struct TestSet {
    items: Vec<TestItem>,
}

impl TestSet {
    /// Build a test set; items are sorted by id
    pub fn new(mut items: Vec<TestItem>) -> Self {
        items.sort_by_key(|item| item.id);
        Self { items }
    }

    pub fn items(&self) -> &[TestItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// True labels in item order
    pub fn wordlist(&self) -> Vec<Option<&str>> {
        self.items.iter().map(|item| item.word.as_deref()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::arr2;

    fn sequences() -> Vec<Array2<f64>> {
        vec![
            arr2(&[[1.0, 2.0], [3.0, 4.0]]),
            arr2(&[[5.0, 6.0]]),
            arr2(&[[7.0, 8.0], [9.0, 10.0], [11.0, 12.0]]),
        ]
    }

    #[test]
    fn test_xlengths_rejects_bad_lengths() {
        let err = XLengths::new(Array2::zeros((3, 2)), vec![1, 1]).unwrap_err();
        assert_eq!(err, DataError::LengthMismatch { lengths_sum: 2, rows: 3 });
    }

    #[test]
    fn test_from_sequences() {
        let xl = XLengths::from_sequences(&sequences()).unwrap();
        assert_eq!(xl.lengths(), &[2, 1, 3]);
        assert_eq!(xl.n_frames(), 6);
        assert_eq!(xl.n_features(), 2);
        assert_eq!(xl.x()[[5, 1]], 12.0);
    }

    #[test]
    fn test_from_sequences_feature_mismatch() {
        let seqs = vec![Array2::zeros((2, 2)), Array2::zeros((2, 3))];
        assert!(matches!(
            XLengths::from_sequences(&seqs),
            Err(DataError::FeatureMismatch { expected: 2, actual: 3 })
        ));
    }

    #[test]
    fn test_combine_sequences_keeps_index_order() {
        let combined = combine_sequences(&[2, 0], &sequences()).unwrap();
        assert_eq!(combined.lengths(), &[3, 2]);
        assert_eq!(combined.x()[[0, 0]], 7.0);
        assert_eq!(combined.x()[[3, 0]], 1.0);
    }

    #[test]
    fn test_combine_sequences_out_of_range() {
        assert!(combine_sequences(&[5], &sequences()).is_err());
    }

    #[test]
    fn test_test_set_sorted_by_id() {
        let item = |id| TestItem {
            id,
            word: None,
            data: XLengths::from_sequences(&[Array2::zeros((1, 1))]).unwrap(),
        };
        let set = TestSet::new(vec![item(3), item(0), item(1)]);
        let ids: Vec<usize> = set.items().iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![0, 1, 3]);
    }
}
