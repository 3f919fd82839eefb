//! Batch generation across model variants
//!
//! Items run concurrently up to a fixed limit and are reassembled in input
//! order. A failed or timed-out call is recorded against its item and never
//! aborts its siblings.

use futures::{stream, StreamExt};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use crate::dataset::DialogueRecord;
use crate::generation::client::Generator;
use crate::generation::config::GenerationConfig;
use crate::generation::prompts::build_prompt;
use crate::generation::variant::ModelVariant;
use crate::{EvalError, Result};

/// One summary produced by one model variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedSummary {
    pub source_dialogue_id: String,
    pub model_variant: ModelVariant,
    pub text: String,
}

/// Summaries for a batch, aligned with the input records.
#[derive(Debug, Default)]
pub struct BatchGeneration {
    /// Per variant, one slot per input record; `None` where generation failed.
    pub summaries: BTreeMap<ModelVariant, Vec<Option<GeneratedSummary>>>,
    /// `EvalError::GenerationFailure` for every failed item.
    pub failures: Vec<EvalError>,
}

impl BatchGeneration {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Runner limits
#[derive(Debug, Clone, Copy)]
pub struct RunnerOptions {
    /// Maximum in-flight generation calls
    pub concurrency: usize,
    /// Per-call timeout
    pub timeout: Duration,
}

impl Default for RunnerOptions {
    fn default() -> Self {
        Self {
            concurrency: 4,
            timeout: Duration::from_secs(120),
        }
    }
}

pub struct GenerationRunner {
    generators: BTreeMap<ModelVariant, Arc<dyn Generator>>,
    config: GenerationConfig,
    options: RunnerOptions,
}

impl GenerationRunner {
    pub fn new(config: GenerationConfig, options: RunnerOptions) -> Self {
        Self {
            generators: BTreeMap::new(),
            config,
            options,
        }
    }

    pub fn with_generator(mut self, variant: ModelVariant, generator: Arc<dyn Generator>) -> Self {
        self.generators.insert(variant, generator);
        self
    }

    pub fn variants(&self) -> impl Iterator<Item = ModelVariant> + '_ {
        self.generators.keys().copied()
    }

    /// Run one generation call for `dialogue_id` against `variant`.
    pub async fn generate(
        &self,
        variant: ModelVariant,
        dialogue_id: &str,
        prompt: &str,
        config: &GenerationConfig,
    ) -> Result<GeneratedSummary> {
        let failure = |reason: String| EvalError::GenerationFailure {
            dialogue_id: dialogue_id.to_string(),
            variant,
            reason,
        };

        let generator = self
            .generators
            .get(&variant)
            .ok_or_else(|| failure("no generator configured for this variant".to_string()))?;

        let text = tokio::time::timeout(self.options.timeout, generator.generate(prompt, config))
            .await
            .map_err(|_| failure(format!("timed out after {:?}", self.options.timeout)))?
            .map_err(|e| failure(format!("{:#}", e)))?;
        if text.trim().is_empty() {
            return Err(failure("model returned an empty summary".to_string()));
        }

        Ok(GeneratedSummary {
            source_dialogue_id: dialogue_id.to_string(),
            model_variant: variant,
            text,
        })
    }

    /// Generate a summary for every record with one variant.
    pub async fn run_variant(
        &self,
        variant: ModelVariant,
        records: &[DialogueRecord],
    ) -> (Vec<Option<GeneratedSummary>>, Vec<EvalError>) {
        let tasks = records.iter().enumerate().map(|(idx, record)| async move {
            let prompt = build_prompt(&record.dialogue);
            let result = self.generate(variant, &record.id, &prompt, &self.config).await;
            (idx, result)
        });

        let mut results = stream::iter(tasks)
            .buffer_unordered(self.options.concurrency.max(1))
            .collect::<Vec<_>>()
            .await;
        results.sort_by_key(|(idx, _)| *idx);

        let mut summaries = Vec::with_capacity(records.len());
        let mut failures = Vec::new();
        for (_, result) in results {
            match result {
                Ok(summary) => {
                    tracing::debug!(
                        "Generated summary for {} ({})",
                        summary.source_dialogue_id,
                        variant
                    );
                    summaries.push(Some(summary));
                }
                Err(e) => {
                    tracing::warn!("{}", e);
                    summaries.push(None);
                    failures.push(e);
                }
            }
        }

        (summaries, failures)
    }

    /// Generate summaries for every record with every configured variant.
    pub async fn run_batch(&self, records: &[DialogueRecord]) -> BatchGeneration {
        self.run_batch_with_progress(records, &|_: f32| {}).await
    }

    /// Like `run_batch`, reporting the finished fraction of variants.
    pub async fn run_batch_with_progress(
        &self,
        records: &[DialogueRecord],
        progress: &(dyn Fn(f32) + Send + Sync),
    ) -> BatchGeneration {
        let mut batch = BatchGeneration::default();
        let total = self.generators.len().max(1) as f32;

        progress(0.0);
        for (done, variant) in self.variants().enumerate() {
            tracing::info!(
                "Generating {} summaries with {} model ({}, max {} tokens)",
                records.len(),
                variant,
                if self.config.is_greedy() { "greedy" } else { "beam search" },
                self.config.max_new_tokens
            );
            let (summaries, failures) = self.run_variant(variant, records).await;
            batch.summaries.insert(variant, summaries);
            batch.failures.extend(failures);
            progress((done + 1) as f32 / total);
        }

        batch
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Echoes the dialogue line back, slower for earlier items.
    struct EchoGenerator {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Generator for EchoGenerator {
        async fn generate(&self, prompt: &str, _config: &GenerationConfig) -> anyhow::Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let dialogue = prompt
                .strip_prefix("Summarize the following conversation.\n\n")
                .and_then(|p| p.strip_suffix("\n\nSummary: "))
                .unwrap_or_default()
                .to_string();
            let delay = 30u64.saturating_sub(dialogue.len() as u64 * 5);
            tokio::time::sleep(Duration::from_millis(delay)).await;
            if dialogue.contains("boom") {
                anyhow::bail!("CUDA out of memory");
            }
            Ok(dialogue)
        }
    }

    fn records() -> Vec<DialogueRecord> {
        vec![
            DialogueRecord::new("d0", "a", "ref a"),
            DialogueRecord::new("d1", "bb boom", "ref b"),
            DialogueRecord::new("d2", "ccc", "ref c"),
        ]
    }

    fn runner(generator: Arc<dyn Generator>) -> GenerationRunner {
        GenerationRunner::new(GenerationConfig::default(), RunnerOptions::default())
            .with_generator(ModelVariant::Base, generator)
    }

    #[test]
    fn preserves_input_order_and_isolates_failures() {
        let generator = Arc::new(EchoGenerator {
            calls: AtomicUsize::new(0),
        });
        let runner = runner(generator.clone());

        let batch = tokio_test::block_on(runner.run_batch(&records()));
        let summaries = &batch.summaries[&ModelVariant::Base];

        assert_eq!(generator.calls.load(Ordering::SeqCst), 3);
        assert_eq!(summaries.len(), 3);
        assert_eq!(summaries[0].as_ref().unwrap().text, "a");
        assert!(summaries[1].is_none());
        assert_eq!(summaries[2].as_ref().unwrap().source_dialogue_id, "d2");

        assert_eq!(batch.failures.len(), 1);
        match &batch.failures[0] {
            EvalError::GenerationFailure {
                dialogue_id,
                variant,
                reason,
            } => {
                assert_eq!(dialogue_id, "d1");
                assert_eq!(*variant, ModelVariant::Base);
                assert!(reason.contains("out of memory"));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(!batch.is_complete());
    }

    #[tokio::test]
    async fn missing_variant_is_a_generation_failure() {
        let runner = GenerationRunner::new(GenerationConfig::default(), RunnerOptions::default());
        let err = runner
            .generate(ModelVariant::Adapter, "d0", "prompt", &GenerationConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            EvalError::GenerationFailure { variant: ModelVariant::Adapter, .. }
        ));
    }

    struct BlankGenerator;

    #[async_trait]
    impl Generator for BlankGenerator {
        async fn generate(&self, _prompt: &str, _config: &GenerationConfig) -> anyhow::Result<String> {
            Ok("  \n".to_string())
        }
    }

    #[tokio::test]
    async fn empty_reply_is_a_generation_failure() {
        let runner = runner(Arc::new(BlankGenerator));
        let (summaries, failures) = runner.run_variant(ModelVariant::Base, &records()).await;

        assert!(summaries.iter().all(Option::is_none));
        assert_eq!(failures.len(), 3);
        assert!(failures[0].to_string().contains("empty summary"));
    }

    struct StuckGenerator;

    #[async_trait]
    impl Generator for StuckGenerator {
        async fn generate(&self, _prompt: &str, _config: &GenerationConfig) -> anyhow::Result<String> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(String::new())
        }
    }

    #[tokio::test]
    async fn slow_calls_time_out() {
        let runner = GenerationRunner::new(
            GenerationConfig::default(),
            RunnerOptions {
                concurrency: 2,
                timeout: Duration::from_millis(20),
            },
        )
        .with_generator(ModelVariant::Full, Arc::new(StuckGenerator));

        let (summaries, failures) = runner.run_variant(ModelVariant::Full, &records()).await;
        assert!(summaries.iter().all(Option::is_none));
        assert_eq!(failures.len(), 3);
        assert!(failures[0].to_string().contains("timed out"));
    }
}
