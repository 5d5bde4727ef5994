use std::path::PathBuf;

use bert_burn::model::{BertModel, BertModelConfig};
use burn::{
    config::Config as _,
    module::Module,
    nn::{DropoutConfig, LinearConfig},
    tensor::backend::Backend,
};

use super::{bilstm::BiLstmConfig, contextual::ContextualEmbedding, Model};

/// Number of output classes
pub const N_CLASSES: usize = 2;

/// The Model Configuration
#[derive(burn::config::Config)]
pub struct Config {
    /// The contextual BERT model
    pub contextual: BertModelConfig,

    /// Dimension of the static word vectors
    pub embedding_dim: usize,

    /// Longest whitespace token count in the data source, kept for reference
    pub max_tok_count: usize,

    /// Size of the hidden state of each LSTM direction
    #[config(default = 512)]
    pub hidden_size: usize,

    /// Dropout rate on the contextual vectors
    #[config(default = 0.4)]
    pub contextual_dropout: f64,

    /// Dropout rate on the final biLSTM state
    #[config(default = 0.2)]
    pub hidden_dropout: f64,
}

impl Config {
    /// Load the contextual model configuration from a Hugging Face `config.json`
    pub fn load_pretrained(
        config_file: PathBuf,
        embedding_dim: usize,
        max_tok_count: usize,
    ) -> anyhow::Result<Self> {
        let mut contextual = BertModelConfig::load(config_file)
            .map_err(|e| anyhow!("Unable to load Hugging Face Config file: {}", e))?;

        // Every sub-word state is needed, not the pooled summary
        contextual.with_pooling_layer = Some(false);

        Ok(Config::new(contextual, embedding_dim, max_tok_count))
    }

    /// Maximum number of sub-word tokens the contextual model accepts
    pub fn max_seq_length(&self) -> usize {
        self.contextual
            .max_seq_len
            .unwrap_or(self.contextual.max_position_embeddings)
    }

    /// ID of the contextual model's padding token
    pub fn pad_token_id(&self) -> usize {
        self.contextual.pad_token_id
    }

    /// Initialize the model with random weights
    pub fn init<B: Backend>(&self, device: &B::Device) -> Model<B> {
        self.init_with(self.contextual.init(device), device)
    }

    /// Initialize the model with pretrained contextual weights from a safetensors file
    pub fn init_pretrained<B: Backend>(&self, model_file: PathBuf, device: &B::Device) -> Model<B> {
        let record = BertModel::from_safetensors(model_file, device, self.contextual.clone());
        let bert = self.contextual.init(device).load_record(record);

        self.init_with(bert, device)
    }

    fn init_with<B: Backend>(&self, bert: BertModel<B>, device: &B::Device) -> Model<B> {
        let contextual = ContextualEmbedding::new(
            bert,
            DropoutConfig::new(self.contextual_dropout).init(),
        );

        let encoder = BiLstmConfig::new(
            self.embedding_dim + self.contextual.hidden_size,
            self.hidden_size,
        )
        .init(device);

        Model {
            contextual,
            encoder,
            dropout: DropoutConfig::new(self.hidden_dropout).init(),
            output: LinearConfig::new(2 * self.hidden_size, N_CLASSES).init(device),
        }
    }
}
