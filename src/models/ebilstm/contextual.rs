use bert_burn::{
    data::BertInferenceBatch,
    model::{BertModel, BertModelOutput},
};
use burn::{
    module::Module,
    nn::Dropout,
    tensor::{backend::Backend, Tensor},
};
use derive_new::new;

use crate::pipelines::text_classification::batcher::Infer;

/// Per-word contextual vectors from a fine-tuned BERT
#[derive(Module, Debug, new)]
pub struct ContextualEmbedding<B: Backend> {
    /// The pretrained contextual model, trainable
    pub bert: BertModel<B>,

    /// Dropout on the contextual vectors
    pub dropout: Dropout,
}

impl<B: Backend> ContextualEmbedding<B> {
    /// Contextual vector of every whitespace word: [batch_size, max_words, hidden_size]
    ///
    /// A word takes the hidden state of its first sub-word. Padding and truncated words are zero.
    pub fn forward(&self, input: &Infer<B>) -> Tensor<B, 3> {
        let [batch_size, max_subwords] = input.tokens.dims();
        let [_, max_words, _] = input.word_mask.dims();

        let BertModelOutput { hidden_states, .. } = self.bert.forward(BertInferenceBatch {
            tokens: input.tokens.clone(),
            mask_pad: input.mask_pad.clone(),
        });

        let [_, _, hidden_size] = hidden_states.dims();

        let words = hidden_states
            .reshape([batch_size * max_subwords, hidden_size])
            .select(0, input.word_index.clone())
            .reshape([batch_size, max_words, hidden_size]);

        let words = words * input.word_mask.clone().repeat(2, hidden_size);

        self.dropout.forward(words)
    }
}
