//! Evaluation pipeline orchestration
//!
//! dialogues -> prompts -> summaries per variant -> scores per variant -> deltas.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::config::Settings;
use crate::dataset::DialogueRecord;
use crate::generation::{build_generator, GenerationConfig, GenerationRunner, ModelVariant};
use crate::metrics::{compare, Aggregation, ComparisonResult, RougeScorer, ScoreSet};
use crate::storage::{ResultsRow, ResultsTable};
use crate::{EvalError, Result};

/// Progress callback type
pub type ProgressCallback = Box<dyn Fn(f32) + Send + Sync>;

/// Variant pairs reported by default, as (a, b) for `compare(a, b)`.
pub const DEFAULT_COMPARISONS: [(ModelVariant, ModelVariant); 3] = [
    (ModelVariant::Full, ModelVariant::Base),
    (ModelVariant::Adapter, ModelVariant::Base),
    (ModelVariant::Adapter, ModelVariant::Full),
];

/// Generated summaries plus the items that failed.
#[derive(Debug)]
pub struct GenerationOutcome {
    pub table: ResultsTable,
    pub failures: Vec<EvalError>,
}

/// Scores for every variant in a results table.
#[derive(Debug, Clone, Serialize)]
pub struct EvaluationReport {
    /// Rows scored (present for every variant)
    pub example_count: usize,
    /// Rows skipped because a variant had no summary
    pub excluded: usize,
    pub use_stemmer: bool,
    pub scores: BTreeMap<ModelVariant, ScoreSet>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub per_example: Option<BTreeMap<ModelVariant, Vec<ScoreSet>>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Comparison {
    pub a: ModelVariant,
    pub b: ModelVariant,
    pub deltas: ComparisonResult,
}

impl EvaluationReport {
    /// `compare(scores[a], scores[b])`
    pub fn compare(&self, a: ModelVariant, b: ModelVariant) -> Result<ComparisonResult> {
        let lookup = |variant: ModelVariant| {
            self.scores
                .get(&variant)
                .ok_or_else(|| EvalError::NotFound(format!("no scores for {} model", variant)))
        };
        compare(lookup(a)?, lookup(b)?)
    }

    /// The default comparisons whose variants were both scored.
    pub fn comparisons(&self) -> Result<Vec<Comparison>> {
        default_comparisons(&self.scores)
    }
}

/// Deltas for every default pair present in `scores`.
pub fn default_comparisons(scores: &BTreeMap<ModelVariant, ScoreSet>) -> Result<Vec<Comparison>> {
    let mut comparisons = Vec::new();
    for (a, b) in DEFAULT_COMPARISONS {
        if let (Some(left), Some(right)) = (scores.get(&a), scores.get(&b)) {
            comparisons.push(Comparison {
                a,
                b,
                deltas: compare(left, right)?,
            });
        }
    }
    Ok(comparisons)
}

pub struct EvaluationPipeline {
    runner: GenerationRunner,
    scorer: RougeScorer,
    aggregation: Aggregation,
}

impl EvaluationPipeline {
    pub fn new(runner: GenerationRunner, scorer: RougeScorer, aggregation: Aggregation) -> Self {
        Self {
            runner,
            scorer,
            aggregation,
        }
    }

    /// Build generators for `variants` and the scorer from settings.
    pub fn from_settings(
        settings: &Settings,
        variants: &[ModelVariant],
        generation: GenerationConfig,
    ) -> anyhow::Result<Self> {
        let options = settings.runner.options();

        let mut runner = GenerationRunner::new(generation, options);
        for &variant in variants {
            let generator = build_generator(settings.models.get(variant), options.timeout)
                .map_err(|e| e.context(format!("Failed to set up {} model", variant)))?;
            runner = runner.with_generator(variant, generator);
        }

        let scorer = RougeScorer::new(&settings.scoring.metrics, settings.scoring.use_stemmer);

        Ok(Self::new(runner, scorer, settings.scoring.aggregation))
    }

    /// Generate summaries for every record with every configured variant.
    pub async fn generate(
        &self,
        records: &[DialogueRecord],
        progress_callback: ProgressCallback,
    ) -> GenerationOutcome {
        let batch = self
            .runner
            .run_batch_with_progress(records, progress_callback.as_ref())
            .await;

        let mut table = ResultsTable::new(batch.summaries.keys().copied());
        for (idx, record) in records.iter().enumerate() {
            let mut row = ResultsRow::new(record.summary.clone());
            for (variant, summaries) in &batch.summaries {
                if let Some(Some(summary)) = summaries.get(idx) {
                    row.summaries.insert(*variant, summary.text.clone());
                }
            }
            table.push(row);
        }

        tracing::info!(
            "Generation complete: {} dialogues, {} failures",
            records.len(),
            batch.failures.len()
        );

        GenerationOutcome {
            table,
            failures: batch.failures,
        }
    }

    /// Score every variant column of `table` against the human column.
    pub fn score(&self, table: &ResultsTable) -> Result<EvaluationReport> {
        let variants: Vec<ModelVariant> = table.variants().collect();
        score_table(&self.scorer, self.aggregation, table, &variants)
    }
}

/// Score `variants` of `table` on the rows where all of them have a summary.
pub fn score_table(
    scorer: &RougeScorer,
    aggregation: Aggregation,
    table: &ResultsTable,
    variants: &[ModelVariant],
) -> Result<EvaluationReport> {
    let aligned = table.aligned(variants)?;
    if aligned.excluded > 0 {
        tracing::warn!(
            "Excluding {} of {} rows with missing summaries",
            aligned.excluded,
            table.len()
        );
    }

    let mut scores = BTreeMap::new();
    let mut per_example = BTreeMap::new();
    for (variant, predictions) in &aligned.predictions {
        let examples = scorer.score_per_example(predictions, &aligned.references)?;
        scores.insert(*variant, scorer.mean(&examples));
        if aggregation == Aggregation::PerExample {
            per_example.insert(*variant, examples);
        }
    }

    Ok(EvaluationReport {
        example_count: aligned.references.len(),
        excluded: aligned.excluded,
        use_stemmer: scorer.use_stemmer(),
        scores,
        per_example: (aggregation == Aggregation::PerExample).then_some(per_example),
    })
}
