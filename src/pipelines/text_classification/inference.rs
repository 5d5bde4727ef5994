use std::{path::Path, sync::Arc};

use burn::{config::Config as _, tensor::backend::Backend};
use log::info;
use tokenizers::Tokenizer;

use crate::{embeddings::EmbeddingTable, models::ebilstm};

use super::{
    checkpoint::Checkpointer,
    context::RunContext,
    submission::{predict_to_file, Predictions},
    Batcher,
};

/// Define inference function
#[allow(clippy::too_many_arguments)]
pub fn infer<B: Backend>(
    device: B::Device,         // Device on which to perform computation (e.g., CPU or CUDA device)
    output_dir: &Path,         // Directory of a training run, holding config.json and checkpoints
    step: usize,               // The checkpoint to restore
    embedding: EmbeddingTable, // Static word vectors the model was trained with
    tokenizer: Tokenizer,      // Tokenizer of the contextual model
    texts: &[String],          // Text samples for inference
    chunk_size: usize,         // Texts per forward pass
    submission: &Path,         // Where to write the predictions
) -> anyhow::Result<Predictions> {
    let context = RunContext::<B>::new(output_dir, device.clone())?;

    // Load experiment configuration
    let config = ebilstm::Config::load(context.model_config_path())
        .map_err(|e| anyhow!("Unable to load config file: {}", e))?;

    let batcher = Batcher::<B>::new(
        tokenizer,
        Arc::new(embedding),
        config.pad_token_id(),
        config.max_seq_length(),
        device.clone(),
    );

    info!("Loading weights from step {}...", step);

    let model = Checkpointer::new(&context.checkpoint_dir).load(
        config.init::<B>(&device),
        step,
        &device,
    )?;

    info!("Running inference on {} texts...", texts.len());

    predict_to_file(&model, &batcher, texts, chunk_size, submission)
}
