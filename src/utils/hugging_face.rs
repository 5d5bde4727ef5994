use std::path::PathBuf;

use anyhow::Context;
use hf_hub::api::tokio::{self, ApiRepo};
use log::info;

/// Local paths of a pretrained model's files
#[derive(Debug, Clone)]
pub struct PretrainedFiles {
    /// `config.json`
    pub config: PathBuf,

    /// `model.safetensors`
    pub weights: PathBuf,

    /// `tokenizer.json`
    pub tokenizer: PathBuf,
}

/// Download model config, weights and tokenizer from Hugging Face Hub
/// If file exists in cache, it will not be downloaded again
// NOTE: Modified from the built-in function to work within an already-async context
pub async fn download_hf_model(model_name: &str) -> anyhow::Result<PretrainedFiles> {
    let api = tokio::Api::new().context("Unable to reach the Hugging Face Hub")?;
    let repo = api.model(model_name.to_string());

    info!("Fetching {} from the Hugging Face Hub...", model_name);

    Ok(PretrainedFiles {
        weights: fetch(&repo, model_name, "model.safetensors").await?,
        config: fetch(&repo, model_name, "config.json").await?,
        tokenizer: fetch(&repo, model_name, "tokenizer.json").await?,
    })
}

async fn fetch(repo: &ApiRepo, model_name: &str, file: &str) -> anyhow::Result<PathBuf> {
    repo.get(file).await.with_context(|| {
        format!(
            "Failed to download: {} file with name: {} from HuggingFace Hub",
            model_name, file
        )
    })
}
