use burn::{
    module::Module,
    nn::{Dropout, Linear},
    tensor::{
        activation::{log_softmax, relu, softmax},
        backend::Backend,
        Tensor,
    },
    train::ClassificationOutput,
};

use crate::pipelines::text_classification::batcher::{Infer, Train};

use super::{bilstm::BiLstm, contextual::ContextualEmbedding};

/// A biLSTM over static and contextual word vectors, with a two class head
#[derive(Module, Debug)]
pub struct Model<B: Backend> {
    /// Contextual word vectors
    pub contextual: ContextualEmbedding<B>,

    /// Sequence encoder
    pub encoder: BiLstm<B>,

    /// Dropout on the final hidden state
    pub dropout: Dropout,

    /// Linear layer for classification
    pub output: Linear<B>,
}

/// Define model behavior
impl<B: Backend> Model<B> {
    /// Class scores, rectified: [batch_size, 2]
    pub fn scores(&self, input: Infer<B>) -> Tensor<B, 2> {
        let contextual = self.contextual.forward(&input);

        let features = Tensor::cat(vec![input.vectors, contextual], 2);

        let state = self.encoder.forward(features, &input.seq_len);
        let hidden = self.dropout.forward(state.hidden);

        relu(self.output.forward(hidden))
    }

    /// Defines forward pass for training
    pub fn forward(&self, item: Train<B>) -> ClassificationOutput<B> {
        let output = self.scores(item.input);
        let loss = softmax_cross_entropy(output.clone(), item.labels);

        ClassificationOutput {
            loss,
            output,
            targets: item.targets,
        }
    }

    /// Defines forward pass for inference
    pub fn infer(&self, input: Infer<B>) -> Tensor<B, 2> {
        softmax(self.scores(input), 1)
    }
}

/// Mean cross-entropy between the softmax of `logits` and one-hot `labels`
pub fn softmax_cross_entropy<B: Backend>(logits: Tensor<B, 2>, labels: Tensor<B, 2>) -> Tensor<B, 1> {
    log_softmax(logits, 1)
        .mul(labels)
        .sum_dim(1)
        .neg()
        .mean()
}
