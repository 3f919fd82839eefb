//! Loading dialogue splits from local files

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::dataset::models::{DialogueRecord, Split};

/// Supplies dialogue records by split.
pub trait DialogueSource {
    fn load(&self, split: Split) -> Result<Vec<DialogueRecord>>;
}

/// A directory holding `<split>.jsonl` or `<split>.csv` files in the DialogSum layout.
pub struct FileDataset {
    root: PathBuf,
}

impl FileDataset {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn split_path(&self, split: Split) -> Option<PathBuf> {
        ["jsonl", "csv"]
            .iter()
            .map(|ext| self.root.join(format!("{}.{}", split.as_str(), ext)))
            .find(|path| path.exists())
    }
}

impl DialogueSource for FileDataset {
    fn load(&self, split: Split) -> Result<Vec<DialogueRecord>> {
        let path = self.split_path(split).with_context(|| {
            format!(
                "No {split}.jsonl or {split}.csv found in {}",
                self.root.display()
            )
        })?;

        let records = match path.extension().and_then(|e| e.to_str()) {
            Some("csv") => read_csv(&path)?,
            _ => read_jsonl(&path)?,
        };

        tracing::info!(
            "Loaded {} dialogues from {} split ({})",
            records.len(),
            split,
            path.display()
        );

        Ok(records)
    }
}

fn read_jsonl(path: &Path) -> Result<Vec<DialogueRecord>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read dataset file: {}", path.display()))?;

    let records = content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| {
            serde_json::from_str(line)
                .with_context(|| format!("Invalid record on line {} of {}", i + 1, path.display()))
        })
        .collect::<Result<Vec<DialogueRecord>>>()?;

    Ok(records)
}

fn read_csv(path: &Path) -> Result<Vec<DialogueRecord>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("Failed to open dataset file: {}", path.display()))?;

    let records = reader
        .deserialize()
        .enumerate()
        .map(|(i, row)| {
            row.with_context(|| format!("Invalid record {} in {}", i + 1, path.display()))
        })
        .collect::<Result<Vec<DialogueRecord>>>()?;

    Ok(records)
}
