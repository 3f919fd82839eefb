//! CLI command implementations

use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::cli::args::{ConfigCommand, GenerateArgs, ScoreArgs};
use crate::config::Settings;
use crate::dataset::{DialogueRecord, DialogueSource, FileDataset};
use crate::generation::{build_prompt, ModelVariant};
use crate::metrics::{Aggregation, ComparisonResult, Metric, RougeScorer, ScoreSet};
use crate::pipeline::{
    default_comparisons, score_table, Comparison, EvaluationPipeline, EvaluationReport,
};
use crate::storage::{Database, EvaluationRun, ResultsTable};

/// Generate summaries and write the results table
pub async fn generate_summaries(
    settings: &Settings,
    args: &GenerateArgs,
    output: &Path,
) -> Result<()> {
    let records = load_records(settings, args)?;
    let pipeline = build_pipeline(settings, args, &ScoreArgs::default())?;

    let outcome = pipeline.generate(&records, progress_logger()).await;
    outcome
        .table
        .write_path(output)
        .with_context(|| format!("Failed to write results table: {}", output.display()))?;

    println!(
        "Wrote {} rows to {}",
        outcome.table.len(),
        output.display()
    );
    report_failures(&outcome.failures);

    Ok(())
}

/// Score a results table
pub fn score_results(settings: &Settings, input: &Path, args: &ScoreArgs) -> Result<()> {
    let table = ResultsTable::read_path(input)?;
    if table.variants().next().is_none() {
        anyhow::bail!("No model summary columns found in {}", input.display());
    }

    let (scorer, aggregation) = scorer_for(settings, args);
    let variants: Vec<ModelVariant> = table.variants().collect();
    let report = score_table(&scorer, aggregation, &table, &variants)?;

    print_report(&report, args.json)?;
    if !args.no_save {
        save_run(settings, &input.display().to_string(), &report)?;
    }

    Ok(())
}

/// Compare two columns of a results table
pub fn compare_results(
    settings: &Settings,
    input: &Path,
    a: ModelVariant,
    b: ModelVariant,
    stemmer: bool,
    json: bool,
) -> Result<()> {
    let table = ResultsTable::read_path(input)?;

    let scorer = RougeScorer::new(
        &settings.scoring.metrics,
        stemmer || settings.scoring.use_stemmer,
    );
    let mut variants = vec![a];
    if b != a {
        variants.push(b);
    }
    let report = score_table(&scorer, Aggregation::Mean, &table, &variants)?;
    let comparison = Comparison {
        a,
        b,
        deltas: report.compare(a, b)?,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&comparison)?);
        return Ok(());
    }

    println!(
        "{} vs {} over {} dialogues ({} excluded)",
        a.label(),
        b.label(),
        report.example_count,
        report.excluded
    );
    println!();
    for (metric, delta) in comparison.deltas.iter() {
        println!("{:<12} {:+.2}%", metric.as_str(), delta);
    }

    Ok(())
}

/// Generate, score and compare in one run
pub async fn evaluate(
    settings: &Settings,
    generation: &GenerateArgs,
    output: Option<PathBuf>,
    scoring: &ScoreArgs,
) -> Result<()> {
    let records = load_records(settings, generation)?;
    let pipeline = build_pipeline(settings, generation, scoring)?;

    let outcome = pipeline.generate(&records, progress_logger()).await;
    if let Some(path) = &output {
        outcome
            .table
            .write_path(path)
            .with_context(|| format!("Failed to write results table: {}", path.display()))?;
        tracing::info!("Results table written to {}", path.display());
    }
    report_failures(&outcome.failures);

    let report = pipeline.score(&outcome.table)?;
    print_report(&report, scoring.json)?;

    if !scoring.no_save {
        let source = match &output {
            Some(path) => path.display().to_string(),
            None => dataset_source(settings, generation),
        };
        save_run(settings, &source, &report)?;
    }

    Ok(())
}

/// Print the prompt for a dialogue read from a file or stdin
pub fn print_prompt(file: Option<PathBuf>) -> Result<()> {
    let dialogue = match file {
        Some(path) => std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read dialogue: {}", path.display()))?,
        None => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read dialogue from stdin")?;
            buffer
        }
    };

    println!("{}", build_prompt(dialogue.trim_end_matches(['\r', '\n'])));
    Ok(())
}

/// List stored evaluation runs
pub fn list_runs(settings: &Settings, limit: usize) -> Result<()> {
    let db = Database::open(settings)?;
    let runs = db.list_runs(limit)?;

    if runs.is_empty() {
        println!("No evaluation runs found");
        return Ok(());
    }

    println!(
        "{:<10} {:<17} {:>8}  {:<8} {}",
        "ID", "Date", "Examples", "Stemmed", "Source"
    );
    println!("{}", "-".repeat(72));

    for run in runs {
        println!(
            "{:<10} {:<17} {:>8}  {:<8} {}",
            short_id(&run.id),
            run.created_at.format("%Y-%m-%d %H:%M"),
            run.example_count,
            if run.use_stemmer { "yes" } else { "no" },
            truncate(&run.source, 30)
        );
    }

    Ok(())
}

/// Show a stored evaluation run
pub fn view_run(settings: &Settings, id: &str) -> Result<()> {
    let db = Database::open(settings)?;

    let run = db.find_run_by_prefix(id)?.context("Run not found")?;

    println!("Run: {}", run.id);
    println!("Date: {}", run.created_at.format("%Y-%m-%d %H:%M"));
    println!("Source: {}", run.source);
    println!(
        "Examples: {} (stemming {})",
        run.example_count,
        if run.use_stemmer { "on" } else { "off" }
    );
    println!();

    print_scores(&run.scores);
    print_comparisons(&default_comparisons(&run.scores)?);

    Ok(())
}

/// Delete a stored evaluation run
pub fn delete_run(settings: &Settings, id: &str) -> Result<()> {
    let db = Database::open(settings)?;

    let run = db.find_run_by_prefix(id)?.context("Run not found")?;
    db.delete_run(&run.id)?;

    println!("Deleted run {}", short_id(&run.id));
    Ok(())
}

/// Handle config subcommands
pub fn config_command(settings: &Settings, cmd: ConfigCommand) -> Result<()> {
    match cmd {
        ConfigCommand::Show => {
            let toml = toml::to_string_pretty(settings)?;
            println!("{}", toml);
        }
        ConfigCommand::Path => {
            let path = Settings::config_path()?;
            println!("{}", path.display());
        }
        ConfigCommand::Init { force } => {
            let path = Settings::config_path()?;
            if path.exists() && !force {
                anyhow::bail!(
                    "Config file already exists at {}. Use --force to overwrite.",
                    path.display()
                );
            }
            Settings::write_default(&path)?;
            println!("Configuration initialized at: {}", path.display());
        }
    }

    Ok(())
}

#[derive(Serialize)]
struct JsonReport<'a> {
    #[serde(flatten)]
    report: &'a EvaluationReport,
    comparisons: Vec<Comparison>,
}

// Helper functions

fn load_records(settings: &Settings, args: &GenerateArgs) -> Result<Vec<DialogueRecord>> {
    let root = args
        .dataset
        .clone()
        .unwrap_or_else(|| settings.dataset.path.clone());
    let split = args.split.unwrap_or(settings.dataset.split);

    let mut records = FileDataset::new(root).load(split)?;
    if let Some(limit) = args.limit.or(settings.dataset.limit) {
        records.truncate(limit);
    }

    if records.is_empty() {
        anyhow::bail!("No dialogues to evaluate in the {} split", split);
    }

    Ok(records)
}

fn build_pipeline(
    settings: &Settings,
    generation: &GenerateArgs,
    scoring: &ScoreArgs,
) -> Result<EvaluationPipeline> {
    let config = settings
        .generation
        .clone()
        .with_assignments(&generation.assignments)?;

    let variants = selected_variants(&generation.variants);

    let mut settings = settings.clone();
    settings.scoring.use_stemmer |= scoring.stemmer;
    if scoring.per_example {
        settings.scoring.aggregation = Aggregation::PerExample;
    }

    EvaluationPipeline::from_settings(&settings, &variants, config)
}

fn selected_variants(requested: &[ModelVariant]) -> Vec<ModelVariant> {
    if requested.is_empty() {
        return ModelVariant::ALL.to_vec();
    }
    let mut variants = requested.to_vec();
    variants.sort();
    variants.dedup();
    variants
}

fn scorer_for(settings: &Settings, args: &ScoreArgs) -> (RougeScorer, Aggregation) {
    let scorer = RougeScorer::new(
        &settings.scoring.metrics,
        args.stemmer || settings.scoring.use_stemmer,
    );
    let aggregation = if args.per_example {
        Aggregation::PerExample
    } else {
        settings.scoring.aggregation
    };
    (scorer, aggregation)
}

fn dataset_source(settings: &Settings, args: &GenerateArgs) -> String {
    let root = args.dataset.as_deref().unwrap_or(&settings.dataset.path);
    let split = args.split.unwrap_or(settings.dataset.split);
    format!("{} ({})", root.display(), split)
}

fn progress_logger() -> crate::pipeline::ProgressCallback {
    Box::new(|progress: f32| {
        tracing::debug!("Generation progress: {:.0}%", progress * 100.0);
    })
}

fn report_failures(failures: &[crate::EvalError]) {
    if failures.is_empty() {
        return;
    }

    println!();
    println!("{} generation failures:", failures.len());
    for failure in failures {
        println!("  - {}", failure);
    }
}

fn save_run(settings: &Settings, source: &str, report: &EvaluationReport) -> Result<()> {
    let db = Database::open(settings)?;
    let run = EvaluationRun::new(source, report.example_count, report.use_stemmer)
        .with_scores(report.scores.clone());
    db.insert_run(&run)?;

    tracing::info!("Saved evaluation run {}", short_id(&run.id));
    Ok(())
}

fn print_report(report: &EvaluationReport, json: bool) -> Result<()> {
    let comparisons = report.comparisons()?;

    if json {
        let output = JsonReport {
            report,
            comparisons,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!(
        "Scored {} dialogues ({} excluded), stemming {}",
        report.example_count,
        report.excluded,
        if report.use_stemmer { "on" } else { "off" }
    );
    println!();
    print_scores(&report.scores);
    print_comparisons(&comparisons);

    if let Some(per_example) = &report.per_example {
        for (variant, examples) in per_example {
            println!();
            println!("{} per dialogue:", variant.label());
            for (i, scores) in examples.iter().enumerate() {
                let cells: Vec<String> = scores
                    .iter()
                    .map(|(metric, value)| format!("{}={:.4}", metric, value))
                    .collect();
                println!("  {:>4}  {}", i + 1, cells.join("  "));
            }
        }
    }

    Ok(())
}

fn print_scores(scores: &BTreeMap<ModelVariant, ScoreSet>) {
    let metrics: Vec<Metric> = match scores.values().next() {
        Some(first) => first.metrics().collect(),
        None => {
            println!("(No scores recorded)");
            return;
        }
    };

    let mut header = format!("{:<16}", "Model");
    for metric in &metrics {
        header.push_str(&format!(" {:>10}", metric.as_str()));
    }
    println!("{}", header);
    println!("{}", "-".repeat(header.len()));

    for (variant, set) in scores {
        let mut line = format!("{:<16}", variant.label());
        for metric in &metrics {
            match set.get(*metric) {
                Some(value) => line.push_str(&format!(" {:>10.4}", value)),
                None => line.push_str(&format!(" {:>10}", "-")),
            }
        }
        println!("{}", line);
    }
}

fn print_comparisons(comparisons: &[Comparison]) {
    if comparisons.is_empty() {
        return;
    }

    println!();
    println!("Absolute percentage improvement:");
    for comparison in comparisons {
        println!(
            "  {} over {}: {}",
            comparison.a.label(),
            comparison.b.label(),
            format_deltas(&comparison.deltas)
        );
    }
}

fn format_deltas(deltas: &ComparisonResult) -> String {
    deltas
        .iter()
        .map(|(metric, delta)| format!("{} {:+.2}%", metric, delta))
        .collect::<Vec<_>>()
        .join(", ")
}

fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
