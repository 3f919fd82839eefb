//! Row-oriented results table (CSV)
//!
//! One row per dialogue: the human reference followed by each variant's
//! summary. Row order is the alignment between references and predictions.

use std::collections::{BTreeMap, BTreeSet};
use std::io::{Read, Write};
use std::path::Path;

use crate::generation::ModelVariant;
use crate::{EvalError, Result};

/// Column holding the human reference summaries.
pub const HUMAN_COLUMN: &str = "human_baseline_summaries";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultsRow {
    pub human_baseline_summary: String,
    /// Summaries per variant; a variant is absent where generation failed.
    /// An empty summary counts as absent, matching an empty CSV cell.
    pub summaries: BTreeMap<ModelVariant, String>,
}

impl ResultsRow {
    pub fn new(human_baseline_summary: impl Into<String>) -> Self {
        Self {
            human_baseline_summary: human_baseline_summary.into(),
            summaries: BTreeMap::new(),
        }
    }

    pub fn with_summary(mut self, variant: ModelVariant, text: impl Into<String>) -> Self {
        self.summaries.insert(variant, text.into());
        self
    }
}

/// References and predictions restricted to rows where every requested variant is present.
#[derive(Debug, Clone, Default)]
pub struct AlignedColumns<'a> {
    pub references: Vec<&'a str>,
    pub predictions: BTreeMap<ModelVariant, Vec<&'a str>>,
    /// Rows dropped because at least one variant was missing
    pub excluded: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultsTable {
    variants: BTreeSet<ModelVariant>,
    rows: Vec<ResultsRow>,
}

impl ResultsTable {
    pub fn new(variants: impl IntoIterator<Item = ModelVariant>) -> Self {
        Self {
            variants: variants.into_iter().collect(),
            rows: Vec::new(),
        }
    }

    pub fn push(&mut self, row: ResultsRow) {
        self.rows.push(row);
    }

    pub fn rows(&self) -> &[ResultsRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Variants that have a column in this table
    pub fn variants(&self) -> impl Iterator<Item = ModelVariant> + '_ {
        self.variants.iter().copied()
    }

    pub fn has_variant(&self, variant: ModelVariant) -> bool {
        self.variants.contains(&variant)
    }

    /// Rows usable for comparing `variants`, in table order.
    pub fn aligned(&self, variants: &[ModelVariant]) -> Result<AlignedColumns<'_>> {
        if let Some(missing) = variants.iter().find(|v| !self.has_variant(**v)) {
            return Err(EvalError::NotFound(format!(
                "column {} is not present in the results table",
                missing.column_name()
            )));
        }

        let mut aligned = AlignedColumns {
            predictions: variants.iter().map(|v| (*v, Vec::new())).collect(),
            ..AlignedColumns::default()
        };

        for row in &self.rows {
            let texts: Option<Vec<&str>> = variants
                .iter()
                .map(|v| {
                    row.summaries
                        .get(v)
                        .map(String::as_str)
                        .filter(|text| !text.is_empty())
                })
                .collect();

            match texts {
                Some(texts) => {
                    aligned.references.push(&row.human_baseline_summary);
                    for (variant, text) in variants.iter().zip(texts) {
                        if let Some(column) = aligned.predictions.get_mut(variant) {
                            column.push(text);
                        }
                    }
                }
                None => aligned.excluded += 1,
            }
        }

        Ok(aligned)
    }

    pub fn read_path(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path).map_err(|e| {
            EvalError::NotFound(format!("results table {}: {}", path.display(), e))
        })?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut reader = csv::Reader::from_reader(reader);
        let headers = reader.headers()?.clone();

        let human_index = headers
            .iter()
            .position(|h| h == HUMAN_COLUMN)
            .ok_or_else(|| EvalError::NotFound(format!("column {} is missing", HUMAN_COLUMN)))?;

        let columns: Vec<(usize, ModelVariant)> = headers
            .iter()
            .enumerate()
            .filter_map(|(i, h)| ModelVariant::from_column_name(h).map(|v| (i, v)))
            .collect();

        let mut table = Self::new(columns.iter().map(|(_, v)| *v));
        for record in reader.records() {
            let record = record?;
            let mut row = ResultsRow::new(record.get(human_index).unwrap_or_default());
            for (i, variant) in &columns {
                match record.get(*i) {
                    Some(text) if !text.is_empty() => {
                        row.summaries.insert(*variant, text.to_string());
                    }
                    _ => {}
                }
            }
            table.push(row);
        }

        Ok(table)
    }

    pub fn write_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let file = std::fs::File::create(path)?;
        self.to_writer(file)
    }

    /// Writes the human column followed by one column per variant present.
    pub fn to_writer<W: Write>(&self, writer: W) -> Result<()> {
        let mut writer = csv::Writer::from_writer(writer);

        let mut header = vec![HUMAN_COLUMN];
        header.extend(self.variants.iter().map(|v| v.column_name()));
        writer.write_record(&header)?;

        for row in &self.rows {
            let mut record = vec![row.human_baseline_summary.as_str()];
            record.extend(
                self.variants
                    .iter()
                    .map(|v| row.summaries.get(v).map(String::as_str).unwrap_or_default()),
            );
            writer.write_record(&record)?;
        }

        writer.flush()?;
        Ok(())
    }
}
