//! summeval - Evaluate dialogue summaries across model variants
//!
//! Builds prompts, runs generation against a base, a fully fine-tuned and an
//! adapter-tuned model, scores the outputs with ROUGE and reports the deltas.

pub mod cli;
pub mod config;
pub mod dataset;
pub mod generation;
pub mod metrics;
pub mod pipeline;
pub mod storage;

use thiserror::Error;

use crate::generation::ModelVariant;

/// Main error type for summeval
#[derive(Error, Debug)]
pub enum EvalError {
    #[error("Generation failed for dialogue {dialogue_id} ({variant}): {reason}")]
    GenerationFailure {
        dialogue_id: String,
        variant: ModelVariant,
        reason: String,
    },

    #[error("Length mismatch: {predictions} predictions vs {references} references")]
    LengthMismatch {
        predictions: usize,
        references: usize,
    },

    #[error("Metric set mismatch: [{left}] vs [{right}]")]
    MetricSetMismatch { left: String, right: String },

    #[error("Configuration error: {0}")]
    ConfigValidation(String),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, EvalError>;

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = "summeval";
