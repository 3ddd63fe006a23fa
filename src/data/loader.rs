//! CSV loading of per-frame feature tables
//!
//! Expected layout (one row per frame):
//!
//! ```text
//! word,item,right-x,right-y,...
//! JOHN,0,12.0,-3.5
//! JOHN,0,13.5,-2.0
//! MARY,1,...
//! ```
//!
//! Consecutive rows sharing an `item` id form one sequence.

use super::types::{TestItem, TestSet, TrainingSet, WordSequences, XLengths};
use anyhow::{bail, Context};
use ndarray::Array2;
use std::collections::BTreeSet;
use std::io::Read;
use std::path::Path;

const WORD_COLUMN: &str = "word";
const ITEM_COLUMN: &str = "item";

/// One sequence as read from the table
#[derive(Debug)]
struct RawItem {
    id: usize,
    word: String,
    frames: Vec<f64>,
    n_frames: usize,
}

impl RawItem {
    fn into_matrix(self, n_features: usize) -> anyhow::Result<(usize, String, Array2<f64>)> {
        let data = Array2::from_shape_vec((self.n_frames, n_features), self.frames)
            .with_context(|| format!("item {} has a ragged feature table", self.id))?;
        Ok((self.id, self.word, data))
    }
}

/// Read items from any CSV source, keeping only `features`
fn read_items<R: Read>(reader: R, features: &[String]) -> anyhow::Result<Vec<RawItem>> {
    if features.is_empty() {
        bail!("No features selected");
    }

    let mut reader = csv::Reader::from_reader(reader);
    let headers = reader.headers()?.clone();

    let column = |name: &str| -> anyhow::Result<usize> {
        headers
            .iter()
            .position(|h| h.trim() == name)
            .with_context(|| format!("missing column '{}'", name))
    };

    let word_idx = column(WORD_COLUMN)?;
    let item_idx = column(ITEM_COLUMN)?;
    let feature_idx = features
        .iter()
        .map(|f| column(f.as_str()))
        .collect::<anyhow::Result<Vec<_>>>()?;

    let mut items: Vec<RawItem> = Vec::new();
    let mut seen = BTreeSet::new();

    for (line, result) in reader.records().enumerate() {
        let record = result?;
        let row = line + 2; // header is row 1

        let word = record
            .get(word_idx)
            .with_context(|| format!("row {}: missing word", row))?
            .trim()
            .to_string();
        let id: usize = record
            .get(item_idx)
            .with_context(|| format!("row {}: missing item", row))?
            .trim()
            .parse()
            .with_context(|| format!("row {}: item id is not an integer", row))?;

        let values = feature_idx
            .iter()
            .zip(features)
            .map(|(&idx, name)| {
                record
                    .get(idx)
                    .with_context(|| format!("row {}: missing '{}'", row, name))?
                    .trim()
                    .parse::<f64>()
                    .with_context(|| format!("row {}: '{}' is not a number", row, name))
            })
            .collect::<anyhow::Result<Vec<_>>>()?;

        match items.last_mut() {
            Some(current) if current.id == id => {
                if current.word != word {
                    bail!(
                        "row {}: item {} labelled both '{}' and '{}'",
                        row,
                        id,
                        current.word,
                        word
                    );
                }
                current.frames.extend(values);
                current.n_frames += 1;
            }
            _ => {
                if !seen.insert(id) {
                    bail!("row {}: item {} is not contiguous", row, id);
                }
                items.push(RawItem {
                    id,
                    word,
                    frames: values,
                    n_frames: 1,
                });
            }
        }
    }

    if items.is_empty() {
        bail!("No rows found");
    }

    items.sort_by_key(|item| item.id);
    Ok(items)
}

impl TrainingSet {
    /// Load training sequences from a CSV file
    pub fn from_csv<P: AsRef<Path>>(path: P, features: &[String]) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)
            .with_context(|| format!("cannot open {}", path.display()))?;
        Self::from_reader(file, features)
    }

    /// Load training sequences from any CSV source
    pub fn from_reader<R: Read>(reader: R, features: &[String]) -> anyhow::Result<Self> {
        let mut sequences = WordSequences::new();
        for item in read_items(reader, features)? {
            let (_, word, data) = item.into_matrix(features.len())?;
            sequences.entry(word).or_default().push(data);
        }

        tracing::info!(
            "Loaded {} words with {} features",
            sequences.len(),
            features.len()
        );

        Ok(Self::new(sequences, features.to_vec())?)
    }
}

impl TestSet {
    /// Load test items from a CSV file
    pub fn from_csv<P: AsRef<Path>>(path: P, features: &[String]) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)
            .with_context(|| format!("cannot open {}", path.display()))?;
        Self::from_reader(file, features)
    }

    /// Load test items from any CSV source
    pub fn from_reader<R: Read>(reader: R, features: &[String]) -> anyhow::Result<Self> {
        let items = read_items(reader, features)?
            .into_iter()
            .map(|item| {
                let (id, word, data) = item.into_matrix(features.len())?;
                let data = XLengths::from_sequences(&[data])?;
                Ok(TestItem {
                    id,
                    word: Some(word),
                    data,
                })
            })
            .collect::<anyhow::Result<Vec<_>>>()?;

        tracing::info!("Loaded {} test items", items.len());

        Ok(TestSet::new(items))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const TABLE: &str = "\
word,item,right-x,right-y,left-x
JOHN,0,1.0,2.0,9.0
JOHN,0,1.5,2.5,9.0
MARY,1,3.0,4.0,9.0
JOHN,2,5.0,6.0,9.0
JOHN,2,5.5,6.5,9.0
JOHN,2,6.0,7.0,9.0
";

    fn features() -> Vec<String> {
        vec!["right-y".to_string(), "right-x".to_string()]
    }

    #[test]
    fn test_training_set_from_csv() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(TABLE.as_bytes()).unwrap();

        let training = TrainingSet::from_csv(file.path(), &features()).unwrap();
        assert_eq!(training.words(), vec!["JOHN".to_string(), "MARY".to_string()]);

        let john = training.word_xlengths("JOHN").unwrap();
        assert_eq!(john.lengths(), &[2, 3]);
        assert_eq!(john.n_features(), 2);
        // Selected columns come out in the requested order
        assert_eq!(john.x()[[0, 0]], 2.0);
        assert_eq!(john.x()[[0, 1]], 1.0);
        assert_eq!(training.num_items(), 3);
    }

    #[test]
    fn test_test_set_from_reader() {
        let test_set = TestSet::from_reader(TABLE.as_bytes(), &features()).unwrap();
        assert_eq!(test_set.len(), 3);
        assert_eq!(
            test_set.wordlist(),
            vec![Some("JOHN"), Some("MARY"), Some("JOHN")]
        );
        assert_eq!(test_set.items()[2].data.lengths(), &[3]);
    }

    #[test]
    fn test_missing_feature_column() {
        let err = TrainingSet::from_reader(TABLE.as_bytes(), &["nose-x".to_string()]).unwrap_err();
        assert!(err.to_string().contains("nose-x"));
    }

    #[test]
    fn test_non_contiguous_item_rejected() {
        let table = "word,item,f\nA,0,1.0\nB,1,2.0\nA,0,3.0\n";
        assert!(TrainingSet::from_reader(table.as_bytes(), &["f".to_string()]).is_err());
    }

    #[test]
    fn test_bad_number_rejected() {
        let table = "word,item,f\nA,0,abc\n";
        assert!(TestSet::from_reader(table.as_bytes(), &["f".to_string()]).is_err());
    }
}
