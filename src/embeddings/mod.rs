use std::collections::HashMap;

/// word2vec file loading
pub mod word2vec;

pub use word2vec::Format;

/// A read-only table of static pre-trained word vectors
#[derive(Debug, Clone)]
pub struct EmbeddingTable {
    dim: usize,
    vectors: HashMap<String, Vec<f32>>,
}

impl EmbeddingTable {
    /// Create a table from word/vector pairs. Every vector must have `dim` values.
    pub fn new(
        dim: usize,
        entries: impl IntoIterator<Item = (String, Vec<f32>)>,
    ) -> Result<Self, EmbeddingError> {
        let mut vectors = HashMap::new();

        for (word, vector) in entries {
            if vector.len() != dim {
                return Err(EmbeddingError::Width {
                    word,
                    expected: dim,
                    found: vector.len(),
                });
            }

            vectors.insert(word, vector);
        }

        Ok(Self { dim, vectors })
    }

    /// Load a word2vec file, detecting the textual or binary format
    pub fn load(path: &str) -> Result<Self, EmbeddingError> {
        word2vec::load(path)
    }

    /// The size of every vector in the table
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// The number of words in the table
    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    /// Whether the table has no words
    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    /// Look up the stored vector for a token
    pub fn get(&self, token: &str) -> Option<&[f32]> {
        self.vectors.get(token).map(Vec::as_slice)
    }
}

/// Embedding Error
#[derive(thiserror::Error, Debug)]
pub enum EmbeddingError {
    /// The file could not be read
    #[error("unable to read embeddings: {0}")]
    Io(#[from] std::io::Error),

    /// The `<count> <dim>` header line is missing or invalid
    #[error("malformed embeddings header: {0}")]
    Header(String),

    /// A vector does not have the declared number of values
    #[error("vector for {word:?} has {found} values, expected {expected}")]
    Width {
        /// The word with the bad vector
        word: String,
        /// The declared dimension
        expected: usize,
        /// The number of values found
        found: usize,
    },

    /// A vector value could not be parsed
    #[error("malformed vector value {value:?} for {word:?}")]
    Value {
        /// The word with the bad value
        word: String,
        /// The raw value
        value: String,
    },
}
