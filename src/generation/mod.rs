//! Generation module for summeval
//!
//! Prompt construction and summary generation against the model variants
//! under evaluation. Model backends sit behind the [`Generator`] trait.

mod client;
mod config;
mod prompts;
mod runner;
mod tgi;
mod variant;

pub use client::{build_generator, Generator};
pub use config::GenerationConfig;
pub use prompts::build_prompt;
pub use runner::{BatchGeneration, GeneratedSummary, GenerationRunner, RunnerOptions};
pub use tgi::TgiGenerator;
pub use variant::ModelVariant;
