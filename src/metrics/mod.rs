//! Metrics module for summeval
//!
//! ROUGE scoring of generated summaries and comparison of the resulting score sets.

mod compare;
mod models;
mod rouge;
pub mod stemmer;
mod tokenize;

pub use compare::compare;
pub use models::{Aggregation, ComparisonResult, Metric, ScoreSet};
pub use rouge::{score, RougeScorer};
pub use tokenize::Tokenizer;
