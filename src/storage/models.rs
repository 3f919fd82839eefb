//! Data models for storage

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::generation::ModelVariant;
use crate::metrics::ScoreSet;

/// A scored evaluation, kept in the run history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationRun {
    /// Unique identifier (UUID)
    pub id: String,

    /// Where the summaries came from (results file or dataset split)
    pub source: String,

    /// Number of dialogues that were scored
    pub example_count: usize,

    /// Whether tokens were stemmed before matching
    pub use_stemmer: bool,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Aggregate scores per model variant
    pub scores: BTreeMap<ModelVariant, ScoreSet>,
}

impl EvaluationRun {
    /// Create a new run for the given source
    pub fn new(source: impl Into<String>, example_count: usize, use_stemmer: bool) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            source: source.into(),
            example_count,
            use_stemmer,
            created_at: Utc::now(),
            scores: BTreeMap::new(),
        }
    }

    pub fn with_scores(mut self, scores: BTreeMap<ModelVariant, ScoreSet>) -> Self {
        self.scores = scores;
        self
    }
}
