//! Word error rate of a recognition run

use crate::data::TestSet;
use colored::Colorize;

/// A test item whose guess differs from its label
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mismatch {
    pub id: usize,
    pub expected: String,
    pub guessed: String,
}

/// Comparison of guesses with the test set's true words
#[derive(Debug, Clone, PartialEq)]
pub struct WordErrorReport {
    pub total: usize,
    pub errors: usize,
    pub wer: f64,
    pub mismatches: Vec<Mismatch>,
}

impl WordErrorReport {
    /// Compare `guesses` with the labels of `test_set`, item by item
    ///
    /// Unlabelled items and items without a guess count as errors.
    pub fn evaluate(guesses: &[String], test_set: &TestSet) -> Self {
        let total = test_set.len();
        let mismatches: Vec<Mismatch> = test_set
            .items()
            .iter()
            .enumerate()
            .filter_map(|(i, item)| {
                let guessed = guesses.get(i).map(String::as_str).unwrap_or_default();
                let expected = item.word.as_deref().unwrap_or_default();
                if !expected.is_empty() && expected == guessed {
                    None
                } else {
                    Some(Mismatch {
                        id: item.id,
                        expected: expected.to_string(),
                        guessed: guessed.to_string(),
                    })
                }
            })
            .collect();

        let errors = mismatches.len();
        let wer = if total == 0 {
            0.0
        } else {
            errors as f64 / total as f64
        };

        Self {
            total,
            errors,
            wer,
            mismatches,
        }
    }

    pub fn correct(&self) -> usize {
        self.total - self.errors
    }

    pub fn print_summary(&self) {
        println!("\n{}", "=== Recognition Results ===".bold());
        let wer = format!("{:.2}%", self.wer * 100.0);
        let wer = if self.wer <= 0.5 { wer.green() } else { wer.red() };
        println!("  WER: {}", wer);
        println!("  Correct: {} of {}", self.correct(), self.total);

        if self.mismatches.is_empty() {
            return;
        }

        println!("\n{}", "Mismatches:".yellow());
        println!("  {:>6}  {:<16} {:<16}", "item", "expected", "guessed");
        for m in &self.mismatches {
            println!(
                "  {:>6}  {:<16} {}",
                m.id,
                m.expected,
                m.guessed.red()
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{TestItem, XLengths};
    use approx::assert_relative_eq;
    use ndarray::Array2;

    fn labelled(words: &[&str]) -> TestSet {
        let items = words
            .iter()
            .enumerate()
            .map(|(id, word)| TestItem {
                id,
                word: Some(word.to_string()),
                data: XLengths::from_sequences(&[Array2::zeros((2, 1))]).unwrap(),
            })
            .collect();
        TestSet::new(items)
    }

    #[test]
    fn test_counts_mismatches() {
        let tests = labelled(&["CAT", "DOG", "CAT", "EMU"]);
        let guesses: Vec<String> = ["CAT", "CAT", "CAT", "DOG"].iter().map(|s| s.to_string()).collect();
        let report = WordErrorReport::evaluate(&guesses, &tests);

        assert_eq!(report.total, 4);
        assert_eq!(report.errors, 2);
        assert_eq!(report.correct(), 2);
        assert_relative_eq!(report.wer, 0.5);
        assert_eq!(
            report.mismatches[0],
            Mismatch {
                id: 1,
                expected: "DOG".to_string(),
                guessed: "CAT".to_string(),
            }
        );
        assert_eq!(report.mismatches[1].id, 3);
    }

    #[test]
    fn test_missing_guesses_are_errors() {
        let tests = labelled(&["CAT", "DOG"]);
        let report = WordErrorReport::evaluate(&["CAT".to_string()], &tests);
        assert_eq!(report.errors, 1);
        assert_eq!(report.mismatches[0].guessed, "");
    }

    #[test]
    fn test_empty_test_set() {
        let report = WordErrorReport::evaluate(&[], &TestSet::default());
        assert_eq!(report.total, 0);
        assert_eq!(report.wer, 0.0);
    }
}
