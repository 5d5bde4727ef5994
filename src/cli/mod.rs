/// CLI Indexes: Datasets
pub mod datasets;

/// CLI Indexes: Contextual models
pub mod models;
