use burn::{
    tensor::{backend::Backend, Tensor},
    train::{ClassificationOutput, ValidStep},
};

use super::batcher::{Infer, Train};

/// A trait for models that can be evaluated and used for inference in the Text Classification
/// pipeline. Training additionally needs `TrainStep` on the autodiff model.
pub trait Classifier<B: Backend>: ValidStep<Train<B>, ClassificationOutput<B>> {
    /// Class probabilities: [batch_size, 2]
    fn infer(&self, input: Infer<B>) -> Tensor<B, 2>;
}
