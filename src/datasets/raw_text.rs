use std::path::Path;

use anyhow::Context;
use burn::data::dataset::{Dataset as _, InMemDataset};
use derive_new::new;
use log::info;
use serde::{Deserialize, Serialize};

use crate::pipelines::text_classification::item::token_count;

use super::DataSource;

/// The name of the raw text dataset
pub static DATASET: &str = "raw-text";

/// A labeled row of `train.csv`
#[derive(Clone, Debug, Serialize, Deserialize, new)]
pub struct Item {
    /// The text for classification
    pub text: String,

    /// 1 for positive, 0 for negative
    pub label: i64,
}

/// A row of `test.csv`
#[derive(Clone, Debug, Serialize, Deserialize, new)]
pub struct TestItem {
    /// The text to predict
    pub text: String,
}

/// Texts held in memory, with the embeddings they are meant to be read with
#[derive(Clone, Debug)]
pub struct RawText {
    texts: Vec<String>,
    labels: Vec<i64>,
    test_texts: Vec<String>,
    max_tok_count: usize,
    embedding_src: String,
}

impl RawText {
    /// Build a source from texts already in memory
    pub fn new(
        texts: Vec<String>,
        labels: Vec<i64>,
        test_texts: Vec<String>,
        embedding_src: impl Into<String>,
    ) -> Self {
        let max_tok_count = texts
            .iter()
            .chain(&test_texts)
            .map(|text| token_count(text))
            .max()
            .unwrap_or(0);

        Self {
            texts,
            labels,
            test_texts,
            max_tok_count,
            embedding_src: embedding_src.into(),
        }
    }

    /// Read `train.csv` and `test.csv` from a directory
    pub fn load(data_dir: impl AsRef<Path>, embedding_src: impl Into<String>) -> anyhow::Result<Self> {
        let data_dir = data_dir.as_ref();
        let reader = csv::ReaderBuilder::new();

        let train_path = data_dir.join("train.csv");
        let train: InMemDataset<Item> = InMemDataset::from_csv(&train_path, &reader)
            .with_context(|| format!("Unable to read {}", train_path.display()))?;

        let test_path = data_dir.join("test.csv");
        let test: InMemDataset<TestItem> = InMemDataset::from_csv(&test_path, &reader)
            .with_context(|| format!("Unable to read {}", test_path.display()))?;

        let (texts, labels) = train.iter().map(|item| (item.text, item.label)).unzip();
        let test_texts = test.iter().map(|item| item.text).collect();

        let source = Self::new(texts, labels, test_texts, embedding_src);

        info!(
            "Loaded {} labeled and {} unlabeled texts from {}",
            source.texts.len(),
            source.test_texts.len(),
            data_dir.display()
        );

        Ok(source)
    }
}

impl DataSource for RawText {
    fn texts(&self) -> &[String] {
        &self.texts
    }

    fn labels(&self) -> &[i64] {
        &self.labels
    }

    fn test_texts(&self) -> &[String] {
        &self.test_texts
    }

    fn max_tok_count(&self) -> usize {
        self.max_tok_count
    }

    fn embedding_src(&self) -> &str {
        &self.embedding_src
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{datasets::ConfigError, utils::files::scratch_dir};

    #[test]
    fn test_load() {
        let dir = scratch_dir("raw-text");

        fs::write(
            dir.join("train.csv"),
            "text,label\ngood movie,1\n\"bad, bad plot\",0\n",
        )
        .unwrap();
        fs::write(dir.join("test.csv"), "text\nwhat a great fun movie\n").unwrap();

        let source = RawText::load(&dir, "vectors.txt").unwrap();

        assert_eq!(source.texts(), &["good movie".to_string(), "bad, bad plot".to_string()]);
        assert_eq!(source.labels(), &[1, 0]);
        assert_eq!(source.test_texts(), &["what a great fun movie".to_string()]);
        assert_eq!(source.max_tok_count(), 5);
        assert_eq!(source.embedding_src(), "vectors.txt");
        assert_eq!(source.validate(), Ok(()));
    }

    #[test]
    fn test_missing_files() {
        let dir = scratch_dir("raw-text-missing");

        assert!(RawText::load(&dir, "vectors.txt").is_err());
    }

    #[test]
    fn test_missing_embeddings() {
        let source = RawText::new(vec!["good".to_string()], vec![1], vec![], " ");

        assert_eq!(source.validate(), Err(ConfigError::MissingEmbeddings));
    }

    #[test]
    fn test_label_mismatch() {
        let source = RawText::new(vec!["good".to_string()], vec![], vec![], "vectors.txt");

        assert_eq!(
            source.validate(),
            Err(ConfigError::LabelMismatch {
                texts: 1,
                labels: 0
            })
        );
    }
}
