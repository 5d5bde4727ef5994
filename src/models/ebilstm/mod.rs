/// Model configuration
pub mod config;

/// Contextual word embeddings from a pretrained BERT
pub mod contextual;

/// Bidirectional LSTM encoder over variable length sequences
pub mod bilstm;

/// The biLSTM classifier
pub mod model;

/// Training and validation steps
pub mod train;

pub use config::Config;
pub use model::{Model, ModelRecord};
