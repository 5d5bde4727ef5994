use std::{fmt::Debug, sync::Arc};

use burn::{
    nn::attention::generate_padding_mask,
    tensor::{backend::Backend, Bool, Int, Tensor},
};
use derive_new::new;
use tokenizers::Tokenizer;

use crate::{
    embeddings::EmbeddingTable,
    utils::tensors::{float_tensor, index_tensor},
};

use super::{
    item::{token_count, LabelPair},
    lookup::text2vecs,
    sampler::TextBatch,
};

/// An inference batch for text classification
#[derive(Debug, Clone, new)]
pub struct Infer<B: Backend> {
    /// Sub-word token ids for the contextual model: [batch_size, max_subwords]
    pub tokens: Tensor<B, 2, Int>,

    /// Padding mask for the tokenized text containing booleans for padding locations
    pub mask_pad: Tensor<B, 2, Bool>,

    /// For every word, the row of its first sub-word in a flattened
    /// [batch_size * max_subwords] view of the contextual output: [batch_size * max_words]
    pub word_index: Tensor<B, 1, Int>,

    /// 1.0 where a word has a contextual vector, 0.0 for padding and truncated words:
    /// [batch_size, max_words, 1]
    pub word_mask: Tensor<B, 3>,

    /// Static word vectors: [batch_size, max_words, embedding_dim]
    pub vectors: Tensor<B, 3>,

    /// Whitespace token count of every text
    pub seq_len: Vec<usize>,
}

/// A training batch for text classification
#[derive(Clone, Debug, new)]
pub struct Train<B: Backend> {
    /// Model input
    pub input: Infer<B>,

    /// One-hot label pairs: [batch_size, 2]
    pub labels: Tensor<B, 2>,

    /// Class ids for the batch
    pub targets: Tensor<B, 1, Int>,
}

/// Struct for batching raw texts into model inputs
#[derive(Clone)]
pub struct Batcher<B: Backend> {
    /// Tokenizer of the contextual model
    pub tokenizer: Tokenizer,

    /// Static word vectors
    pub embedding: Arc<EmbeddingTable>,

    /// Maximum number of sub-word tokens the contextual model accepts
    pub max_seq_length: usize,

    /// ID of the padding token
    pub pad_token_id: usize,

    /// Device on which to perform computation (e.g., CPU or CUDA device)
    pub device: B::Device,
}

impl<B: Backend> Batcher<B> {
    /// Creates a new batcher
    pub fn new(
        tokenizer: Tokenizer,
        embedding: Arc<EmbeddingTable>,
        pad_token_id: usize,
        max_seq_length: usize,
        device: B::Device,
    ) -> Self {
        Self {
            tokenizer,
            embedding,
            max_seq_length,
            pad_token_id,
            device,
        }
    }

    /// Collects raw texts into an inference batch
    pub fn infer(&self, texts: &[String]) -> anyhow::Result<Infer<B>> {
        let batch_size = texts.len();

        let vectors = text2vecs(texts, &self.embedding);
        let max_words = vectors.max_len.max(1);

        let mut token_ids_list = Vec::with_capacity(batch_size);
        let mut first_subwords = Vec::with_capacity(batch_size);

        // Words are fed pre-split so sub-words map back to whitespace tokens
        for text in texts {
            let words: Vec<&str> = text.split_whitespace().collect();
            let n_words = words.len();

            let encoding = self
                .tokenizer
                .encode(words, true)
                .map_err(|e| anyhow!("Unable to tokenize {:?}: {}", text, e))?;

            let mut token_ids: Vec<usize> =
                encoding.get_ids().iter().map(|t| *t as usize).collect();
            token_ids.truncate(self.max_seq_length);

            if token_ids.is_empty() {
                token_ids.push(self.pad_token_id);
            }

            let mut firsts: Vec<Option<usize>> = vec![None; n_words];

            for (position, word) in encoding
                .get_word_ids()
                .iter()
                .enumerate()
                .take(token_ids.len())
            {
                if let Some(slot) = word.and_then(|w| firsts.get_mut(w as usize)) {
                    slot.get_or_insert(position);
                }
            }

            token_ids_list.push(token_ids);
            first_subwords.push(firsts);
        }

        let padding = generate_padding_mask(
            self.pad_token_id,
            token_ids_list,
            Some(self.max_seq_length),
            &self.device,
        );

        let [_, max_subwords] = padding.tensor.dims();

        let mut word_index = Vec::with_capacity(batch_size * max_words);
        let mut word_mask = Vec::with_capacity(batch_size * max_words);

        for (i, firsts) in first_subwords.iter().enumerate() {
            for j in 0..max_words {
                match firsts.get(j).copied().flatten() {
                    Some(position) => {
                        word_index.push(i * max_subwords + position);
                        word_mask.push(1.0);
                    }
                    None => {
                        word_index.push(i * max_subwords);
                        word_mask.push(0.0);
                    }
                }
            }
        }

        Ok(Infer {
            tokens: padding.tensor,
            mask_pad: padding.mask,
            word_index: index_tensor(word_index, &self.device),
            word_mask: float_tensor(word_mask, [batch_size, max_words, 1], &self.device),
            vectors: vectors.into_tensor(&self.device),
            seq_len: texts.iter().map(|text| token_count(text)).collect(),
        })
    }

    /// Collects a batch of labelled texts into a training batch
    pub fn train(&self, batch: &TextBatch) -> anyhow::Result<Train<B>> {
        let batch_size = batch.len();

        let input = self.infer(&batch.texts)?;

        let labels = float_tensor(
            batch.labels.iter().flat_map(|label| label.0).collect(),
            [batch_size, 2],
            &self.device,
        );

        let targets = index_tensor(
            batch.labels.iter().map(LabelPair::class_index).collect(),
            &self.device,
        );

        Ok(Train::new(input, labels, targets))
    }
}
