/// Labeled and unlabeled texts from CSV files
pub mod raw_text;

/// A source of training texts, their labels and unlabeled texts to predict
pub trait DataSource {
    /// Training texts
    fn texts(&self) -> &[String];

    /// Training labels aligned with `texts`, 1 for positive and 0 for negative
    fn labels(&self) -> &[i64];

    /// Unlabeled texts
    fn test_texts(&self) -> &[String];

    /// Longest whitespace token count over all texts
    fn max_tok_count(&self) -> usize;

    /// Path of the pre-trained word2vec embeddings
    fn embedding_src(&self) -> &str;

    /// Check the source before any model is built
    fn validate(&self) -> Result<(), ConfigError> {
        if self.embedding_src().trim().is_empty() {
            return Err(ConfigError::MissingEmbeddings);
        }

        if self.texts().len() != self.labels().len() {
            return Err(ConfigError::LabelMismatch {
                texts: self.texts().len(),
                labels: self.labels().len(),
            });
        }

        Ok(())
    }
}

/// Configuration Error
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ConfigError {
    /// No embedding file was configured
    #[error("this model uses pre-trained word2vec embeddings, please provide the path to the embeddings")]
    MissingEmbeddings,

    /// Texts and labels do not line up
    #[error("{texts} training texts but {labels} labels")]
    LabelMismatch {
        /// Number of texts
        texts: usize,

        /// Number of labels
        labels: usize,
    },
}
