//! Dataset module for summeval
//!
//! Reads DialogSum-style dialogue splits from local JSONL or CSV files.

mod loader;
mod models;

pub use loader::{DialogueSource, FileDataset};
pub use models::{DialogueRecord, Split};
