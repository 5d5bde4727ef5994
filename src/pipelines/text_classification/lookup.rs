use burn::tensor::{backend::Backend, Tensor};

use crate::{embeddings::EmbeddingTable, utils::tensors::float_tensor};

use super::item::token_count;

/// Static word vectors for a batch of texts, row-major `[batch, max_len, dim]`
#[derive(Debug, Clone, PartialEq)]
pub struct WordVectors {
    /// Number of texts
    pub batch: usize,

    /// The longest whitespace token count in the batch
    pub max_len: usize,

    /// Embedding dimension
    pub dim: usize,

    /// The flattened vectors
    pub values: Vec<f32>,
}

impl WordVectors {
    /// The tensor shape of the vectors
    pub fn dims(&self) -> [usize; 3] {
        [self.batch, self.max_len, self.dim]
    }

    /// The vector at token `position` of text `index`
    pub fn vector(&self, index: usize, position: usize) -> &[f32] {
        let start = (index * self.max_len + position) * self.dim;

        &self.values[start..start + self.dim]
    }

    /// Move the vectors to the device.
    ///
    /// A batch of empty texts becomes a single zero position so the encoder never sees an empty
    /// sequence axis.
    pub fn into_tensor<B: Backend>(self, device: &B::Device) -> Tensor<B, 3> {
        if self.max_len == 0 {
            return Tensor::zeros([self.batch, 1, self.dim], device);
        }

        let shape = self.dims();

        float_tensor(self.values, shape, device)
    }
}

/// Map whitespace tokens to their static vectors.
///
/// The sequence axis is sized by the longest text in this batch. Shorter texts are zero padded
/// and tokens missing from the table are left as zero vectors.
pub fn text2vecs<S: AsRef<str>>(texts: &[S], embedding: &EmbeddingTable) -> WordVectors {
    let max_len = texts
        .iter()
        .map(|text| token_count(text.as_ref()))
        .max()
        .unwrap_or(0);

    let dim = embedding.dim();
    let mut values = vec![0.0; texts.len() * max_len * dim];

    for (i, text) in texts.iter().enumerate() {
        for (j, token) in text.as_ref().split_whitespace().enumerate() {
            if let Some(vector) = embedding.get(token) {
                let start = (i * max_len + j) * dim;
                values[start..start + dim].copy_from_slice(vector);
            }
        }
    }

    WordVectors {
        batch: texts.len(),
        max_len,
        dim,
        values,
    }
}
