//! # Contextual biLSTM
//!
//! Binary text classification from static word2vec vectors and contextual BERT vectors, read by
//! a bidirectional LSTM.
#![forbid(unsafe_code)]

/// Models
pub mod models;

/// Pipelines
pub mod pipelines;

/// Datasets
pub mod datasets;

/// Static word embeddings
pub mod embeddings;

/// Utilities
pub mod utils;

/// CLI indexes and utilities
pub mod cli;

#[cfg(test)]
mod testing;

/// Error macros
#[macro_use]
extern crate anyhow;
