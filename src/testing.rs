//! Small fixtures so model tests run offline on the ndarray backend

use std::collections::HashMap;

use bert_burn::model::BertModelConfig;
use tokenizers::{models::wordlevel::WordLevel, Tokenizer};

use crate::{
    embeddings::EmbeddingTable,
    models::ebilstm,
    pipelines::text_classification::item::{Example, NEGATIVE, POSITIVE},
};

pub(crate) const PAD_TOKEN_ID: usize = 0;

pub(crate) const EMBEDDING_DIM: usize = 3;

const VOCAB: &[&str] = &[
    "[PAD]", "[UNK]", "a", "good", "bad", "movie", "plot", "great", "awful", "fun",
];

/// A word-level tokenizer: every known word is a single sub-word
pub(crate) fn tokenizer() -> Tokenizer {
    let vocab: HashMap<String, u32> = VOCAB
        .iter()
        .enumerate()
        .map(|(i, word)| (word.to_string(), i as u32))
        .collect();

    let model = WordLevel::builder()
        .vocab(vocab)
        .unk_token("[UNK]".to_string())
        .build()
        .unwrap();

    Tokenizer::new(model)
}

pub(crate) fn embedding() -> EmbeddingTable {
    EmbeddingTable::new(
        EMBEDDING_DIM,
        vec![
            ("good".to_string(), vec![1.0, 0.0, 0.5]),
            ("great".to_string(), vec![0.9, 0.1, 0.5]),
            ("bad".to_string(), vec![-1.0, 0.0, 0.5]),
            ("awful".to_string(), vec![-0.9, -0.1, 0.5]),
            ("movie".to_string(), vec![0.0, 1.0, 0.0]),
        ],
    )
    .unwrap()
}

pub(crate) fn bert_config() -> BertModelConfig {
    BertModelConfig::new(
        2,
        1,
        1e-12,
        8,
        16,
        VOCAB.len(),
        32,
        2,
        0.0,
        "bert".to_string(),
        PAD_TOKEN_ID,
    )
    .with_max_seq_len(Some(32))
    .with_with_pooling_layer(Some(false))
}

pub(crate) fn model_config() -> ebilstm::Config {
    ebilstm::Config::new(bert_config(), EMBEDDING_DIM, 8).with_hidden_size(4)
}

/// Alternating positive and negative reviews
pub(crate) fn examples(n: usize) -> Vec<Example> {
    (0..n)
        .map(|i| match i % 4 {
            0 => Example::new("a good movie".to_string(), POSITIVE),
            1 => Example::new("bad plot".to_string(), NEGATIVE),
            2 => Example::new("great fun".to_string(), POSITIVE),
            _ => Example::new("an awful awful movie".to_string(), NEGATIVE),
        })
        .collect()
}
