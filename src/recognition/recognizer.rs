//! Arg-max recognition of test items against per-word models

use crate::data::{TestItem, TestSet};
use crate::error::RecognitionError;
use crate::models::SequenceModel;
use rayon::prelude::*;
use std::collections::BTreeMap;

/// Log-likelihood of one test item under every word model
pub type ProbabilityRecord = BTreeMap<String, f64>;

/// Scores and guesses for a whole test set, in test-set order
#[derive(Debug, Clone, PartialEq)]
pub struct Recognition {
    pub probabilities: Vec<ProbabilityRecord>,
    pub guesses: Vec<String>,
}

impl Recognition {
    pub fn len(&self) -> usize {
        self.guesses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.guesses.is_empty()
    }
}

/// Score every test item under every word model and guess the best word
///
/// A model that is missing, fails to score, or returns a non-finite value
/// contributes `-inf` for that item. Ties go to the lexicographically first
/// word, which is also the guess when every score is `-inf`.
pub fn recognize<M: SequenceModel>(
    models: &BTreeMap<String, Option<M>>,
    test_set: &TestSet,
) -> Result<Recognition, RecognitionError> {
    if models.is_empty() {
        return Err(RecognitionError::EmptyVocabulary);
    }

    let missing = models.values().filter(|m| m.is_none()).count();
    if missing > 0 {
        tracing::warn!("{} of {} words have no model", missing, models.len());
    }

    let scored: Vec<(ProbabilityRecord, String)> = test_set
        .items()
        .par_iter()
        .map(|item| {
            let record = score_item(models, item);
            let guess = best_word(&record);
            (record, guess)
        })
        .collect();

    let (probabilities, guesses): (Vec<_>, Vec<_>) = scored.into_iter().unzip();
    tracing::info!(
        "Recognized {} items against {} word models",
        guesses.len(),
        models.len()
    );

    Ok(Recognition {
        probabilities,
        guesses,
    })
}

fn score_item<M: SequenceModel>(models: &BTreeMap<String, Option<M>>, item: &TestItem) -> ProbabilityRecord {
    models
        .iter()
        .map(|(word, model)| {
            let log_l = match model {
                Some(model) => match model.score_xlengths(&item.data) {
                    Ok(score) if score.is_finite() => score,
                    Ok(score) => {
                        tracing::debug!("item {}: {} scored {}", item.id, word, score);
                        f64::NEG_INFINITY
                    }
                    Err(e) => {
                        tracing::debug!("item {}: {} failed: {}", item.id, word, e);
                        f64::NEG_INFINITY
                    }
                },
                None => f64::NEG_INFINITY,
            };
            (word.clone(), log_l)
        })
        .collect()
}

/// Strict `>` scan in word order
fn best_word(record: &ProbabilityRecord) -> String {
    let mut best: Option<(&String, f64)> = None;
    for (word, &score) in record {
        match best {
            Some((_, best_score)) if score <= best_score => {}
            _ => best = Some((word, score)),
        }
    }
    best.map(|(word, _)| word.clone()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::XLengths;
    use crate::error::ScoringError;
    use ndarray::Array2;

    /// Scores every input with a fixed value, or fails
    #[derive(Debug)]
    struct FixedModel(Option<f64>);

    impl SequenceModel for FixedModel {
        fn n_states(&self) -> usize {
            2
        }

        fn n_features(&self) -> usize {
            1
        }

        fn score(&self, _x: &Array2<f64>, _lengths: &[usize]) -> Result<f64, ScoringError> {
            self.0.ok_or(ScoringError::Other("fixed failure".to_string()))
        }
    }

    fn test_set(n: usize) -> TestSet {
        let items = (0..n)
            .rev()
            .map(|id| TestItem {
                id,
                word: None,
                data: XLengths::from_sequences(&[Array2::zeros((3, 1))]).unwrap(),
            })
            .collect();
        TestSet::new(items)
    }

    fn vocab(entries: &[(&str, Option<FixedModel>)]) -> BTreeMap<String, Option<FixedModel>> {
        let mut models = BTreeMap::new();
        for (word, model) in entries {
            models.insert(word.to_string(), model.as_ref().map(|m| FixedModel(m.0)));
        }
        models
    }

    #[test]
    fn test_fixed_scores_pick_highest() {
        let models = vocab(&[
            ("CAT", Some(FixedModel(Some(-50.0)))),
            ("DOG", Some(FixedModel(Some(-75.0)))),
        ]);
        let result = recognize(&models, &test_set(1)).unwrap();
        assert_eq!(result.guesses, vec!["CAT"]);
        assert_eq!(result.probabilities[0]["CAT"], -50.0);
        assert_eq!(result.probabilities[0]["DOG"], -75.0);

        let models = vocab(&[
            ("CAT", Some(FixedModel(Some(-75.0)))),
            ("DOG", Some(FixedModel(Some(-50.0)))),
        ]);
        let result = recognize(&models, &test_set(1)).unwrap();
        assert_eq!(result.guesses, vec!["DOG"]);
    }

    #[test]
    fn test_failures_record_negative_infinity() {
        let models = vocab(&[
            ("BOOK", Some(FixedModel(None))),
            ("CAT", None),
            ("DOG", Some(FixedModel(Some(-20.0)))),
            ("EMU", Some(FixedModel(Some(f64::NAN)))),
        ]);
        let result = recognize(&models, &test_set(2)).unwrap();

        for record in &result.probabilities {
            assert_eq!(record.len(), 4);
            assert_eq!(record["BOOK"], f64::NEG_INFINITY);
            assert_eq!(record["CAT"], f64::NEG_INFINITY);
            assert_eq!(record["EMU"], f64::NEG_INFINITY);
        }
        assert_eq!(result.guesses, vec!["DOG", "DOG"]);
    }

    /// Fixed score, except for inputs of `fail_rows` frames
    #[derive(Debug)]
    struct LengthSensitiveModel {
        score: f64,
        fail_rows: Option<usize>,
    }

    impl SequenceModel for LengthSensitiveModel {
        fn n_states(&self) -> usize {
            2
        }

        fn n_features(&self) -> usize {
            1
        }

        fn score(&self, x: &Array2<f64>, _lengths: &[usize]) -> Result<f64, ScoringError> {
            if self.fail_rows == Some(x.nrows()) {
                Err(ScoringError::Other(format!("{} frames", x.nrows())))
            } else {
                Ok(self.score)
            }
        }
    }

    #[test]
    fn test_model_failing_on_one_item_still_competes_on_others() {
        let mut models = BTreeMap::new();
        let model = |score, fail_rows| Some(LengthSensitiveModel { score, fail_rows });
        models.insert("A".to_string(), model(-1.0, Some(3)));
        models.insert("B".to_string(), model(-5.0, None));
        models.insert("C".to_string(), model(-9.0, None));

        let items = [(0, 3), (1, 4)]
            .into_iter()
            .map(|(id, rows)| TestItem {
                id,
                word: None,
                data: XLengths::from_sequences(&[Array2::zeros((rows, 1))]).unwrap(),
            })
            .collect();
        let result = recognize(&models, &TestSet::new(items)).unwrap();

        assert_eq!(result.probabilities[0]["A"], f64::NEG_INFINITY);
        assert_eq!(result.probabilities[0]["B"], -5.0);
        assert_eq!(result.probabilities[1]["A"], -1.0);
        assert_eq!(result.probabilities[1]["C"], -9.0);
        assert_eq!(result.guesses, vec!["B", "A"]);
    }

    #[test]
    fn test_ties_and_all_failed_go_to_first_word() {
        let models = vocab(&[
            ("BOOK", Some(FixedModel(Some(-5.0)))),
            ("CAT", Some(FixedModel(Some(-5.0)))),
        ]);
        assert_eq!(recognize(&models, &test_set(1)).unwrap().guesses, vec!["BOOK"]);

        let models = vocab(&[("BOOK", None), ("CAT", Some(FixedModel(None)))]);
        assert_eq!(recognize(&models, &test_set(1)).unwrap().guesses, vec!["BOOK"]);
    }

    #[test]
    fn test_output_follows_test_set() {
        let models = vocab(&[
            ("CAT", Some(FixedModel(Some(-1.0)))),
            ("DOG", Some(FixedModel(Some(-2.0)))),
        ]);
        let tests = test_set(5);
        let result = recognize(&models, &tests).unwrap();

        assert_eq!(result.len(), tests.len());
        assert_eq!(result.probabilities.len(), tests.len());
        for (record, guess) in result.probabilities.iter().zip(&result.guesses) {
            let max = record.values().copied().fold(f64::NEG_INFINITY, f64::max);
            assert_eq!(record[guess], max);
        }
    }

    #[test]
    fn test_empty_inputs() {
        let empty: BTreeMap<String, Option<FixedModel>> = BTreeMap::new();
        assert_eq!(
            recognize(&empty, &test_set(1)),
            Err(RecognitionError::EmptyVocabulary)
        );

        let models = vocab(&[("CAT", Some(FixedModel(Some(-1.0))))]);
        assert!(recognize(&models, &TestSet::default()).unwrap().is_empty());
    }
}
