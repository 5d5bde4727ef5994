use std::fmt::Display;

/// Model Variants
/// --------------

/// The base model type
pub static MODEL_TYPE: &str = "bert";

/// bert-base-uncased
pub static BASE_UNCASED: &str = "bert-base-uncased";

/// bert-base-cased
pub static BASE_CASED: &str = "bert-base-cased";

/// bert-large-uncased
pub static LARGE_UNCASED: &str = "bert-large-uncased";

/// bert-large-cased
pub static LARGE_CASED: &str = "bert-large-cased";

/// All available contextual models
pub static ALL_MODELS: &[&str; 4] = &[LARGE_UNCASED, LARGE_CASED, BASE_UNCASED, BASE_CASED];

/// The default model, whose 1024 wide hidden states the classifier was designed around
pub static DEFAULT_MODEL: &str = LARGE_UNCASED;

/// Available contextual models
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub enum Model {
    /// The BERT family of models, with the specific model name contained within
    Bert(String),
}

impl Model {
    /// Get the model type
    pub fn model_type(&self) -> &str {
        match self {
            Model::Bert(_) => MODEL_TYPE,
        }
    }
}

impl Default for Model {
    fn default() -> Self {
        Model::Bert(DEFAULT_MODEL.to_string())
    }
}

impl Display for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let Model::Bert(name) = self;

        write!(f, "{}", name)
    }
}

impl TryFrom<&str> for Model {
    type Error = ModelError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        if ALL_MODELS.contains(&value) {
            Ok(Model::Bert(value.to_string()))
        } else {
            Err(ModelError::Unknown(value.to_string()))
        }
    }
}

/// Model Error
#[derive(thiserror::Error, Debug)]
pub enum ModelError {
    /// No model found for the given string
    #[error("no model found for {0}")]
    Unknown(String),
}
