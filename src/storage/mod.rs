//! Storage module for summeval
//!
//! CSV results tables for generated summaries and a SQLite history of scored runs.

mod database;
mod models;
mod table;

pub use database::Database;
pub use models::EvaluationRun;
pub use table::{AlignedColumns, ResultsRow, ResultsTable, HUMAN_COLUMN};
