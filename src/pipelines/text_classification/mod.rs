/// The classifier seam between the loop and a concrete model
pub mod model;

/// Batcher
pub mod batcher;

/// Text Classification Items
pub mod item;

/// Static word vector lookup
pub mod lookup;

/// Validation split and epoch batching
pub mod sampler;

/// Run directories
pub mod context;

/// Step-tagged checkpoints
pub mod checkpoint;

/// Scalar summaries
pub mod summary;

/// Held-out evaluation
pub mod evaluation;

/// Predictions and submission files
pub mod submission;

/// Training
pub mod training;

/// Inference
pub mod inference;

pub use batcher::Batcher;
pub use inference::infer;
pub use item::Example;
pub use model::Classifier;
pub use training::{train, Config, TrainingLoop, TrainingOutcome};
