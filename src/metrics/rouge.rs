//! ROUGE-1, ROUGE-2, ROUGE-L and ROUGE-Lsum F-measures
//!
//! Candidate summaries are matched to references by position. Batch scores
//! are the arithmetic mean of the per-example F-measures.

use std::collections::{BTreeSet, HashMap};

use crate::metrics::models::{Metric, ScoreSet};
use crate::metrics::tokenize::Tokenizer;
use crate::{EvalError, Result};

/// Score `predictions` against `references` on all four metrics, averaged over the batch.
pub fn score<P, R>(predictions: &[P], references: &[R], use_stemmer: bool) -> Result<ScoreSet>
where
    P: AsRef<str>,
    R: AsRef<str>,
{
    RougeScorer::new(&Metric::ALL, use_stemmer).score(predictions, references)
}

#[derive(Debug, Clone)]
pub struct RougeScorer {
    metrics: Vec<Metric>,
    tokenizer: Tokenizer,
}

impl RougeScorer {
    pub fn new(metrics: &[Metric], use_stemmer: bool) -> Self {
        let metrics = metrics
            .iter()
            .copied()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        Self {
            metrics,
            tokenizer: Tokenizer::new(use_stemmer),
        }
    }

    pub fn metrics(&self) -> &[Metric] {
        &self.metrics
    }

    pub fn use_stemmer(&self) -> bool {
        self.tokenizer.use_stemmer()
    }

    /// Mean score per metric. An empty batch scores zero on every metric.
    pub fn score<P, R>(&self, predictions: &[P], references: &[R]) -> Result<ScoreSet>
    where
        P: AsRef<str>,
        R: AsRef<str>,
    {
        let per_example = self.score_per_example(predictions, references)?;
        Ok(self.mean(&per_example))
    }

    /// Arithmetic mean of per-example scores on this scorer's metrics.
    pub fn mean(&self, examples: &[ScoreSet]) -> ScoreSet {
        let count = examples.len();

        self.metrics
            .iter()
            .map(|&metric| {
                let total: f64 = examples.iter().filter_map(|s| s.get(metric)).sum();
                let mean = if count == 0 { 0.0 } else { total / count as f64 };
                (metric, mean)
            })
            .collect()
    }

    pub fn score_per_example<P, R>(&self, predictions: &[P], references: &[R]) -> Result<Vec<ScoreSet>>
    where
        P: AsRef<str>,
        R: AsRef<str>,
    {
        if predictions.len() != references.len() {
            return Err(EvalError::LengthMismatch {
                predictions: predictions.len(),
                references: references.len(),
            });
        }

        Ok(predictions
            .iter()
            .zip(references)
            .map(|(p, r)| self.score_pair(p.as_ref(), r.as_ref()))
            .collect())
    }

    pub fn score_pair(&self, prediction: &str, reference: &str) -> ScoreSet {
        let candidate = self.tokenizer.tokenize(prediction);
        let target = self.tokenizer.tokenize(reference);

        self.metrics
            .iter()
            .map(|&metric| {
                let value = match metric {
                    Metric::Rouge1 => ngram_fmeasure(&target, &candidate, 1),
                    Metric::Rouge2 => ngram_fmeasure(&target, &candidate, 2),
                    Metric::RougeL => lcs_fmeasure(&target, &candidate),
                    Metric::RougeLsum => summary_lcs_fmeasure(
                        &self.tokenizer.tokenize_sentences(reference),
                        &self.tokenizer.tokenize_sentences(prediction),
                    ),
                };
                (metric, value)
            })
            .collect()
    }
}

fn fmeasure(precision: f64, recall: f64) -> f64 {
    if precision + recall > 0.0 {
        2.0 * precision * recall / (precision + recall)
    } else {
        0.0
    }
}

fn ngram_counts(tokens: &[String], n: usize) -> HashMap<&[String], usize> {
    let mut counts = HashMap::new();
    if tokens.len() >= n {
        for window in tokens.windows(n) {
            *counts.entry(window).or_insert(0) += 1;
        }
    }
    counts
}

fn ngram_fmeasure(target: &[String], candidate: &[String], n: usize) -> f64 {
    let target_ngrams = ngram_counts(target, n);
    let candidate_ngrams = ngram_counts(candidate, n);

    let overlap: usize = candidate_ngrams
        .iter()
        .map(|(ngram, &count)| count.min(target_ngrams.get(ngram).copied().unwrap_or(0)))
        .sum();

    let target_total: usize = target_ngrams.values().sum();
    let candidate_total: usize = candidate_ngrams.values().sum();

    let precision = overlap as f64 / candidate_total.max(1) as f64;
    let recall = overlap as f64 / target_total.max(1) as f64;
    fmeasure(precision, recall)
}

fn lcs_table(a: &[String], b: &[String]) -> Vec<Vec<usize>> {
    let mut table = vec![vec![0usize; b.len() + 1]; a.len() + 1];
    for i in 1..=a.len() {
        for j in 1..=b.len() {
            table[i][j] = if a[i - 1] == b[j - 1] {
                table[i - 1][j - 1] + 1
            } else {
                table[i - 1][j].max(table[i][j - 1])
            };
        }
    }
    table
}

fn lcs_fmeasure(target: &[String], candidate: &[String]) -> f64 {
    if target.is_empty() || candidate.is_empty() {
        return 0.0;
    }

    let lcs = lcs_table(target, candidate)[target.len()][candidate.len()];
    let precision = lcs as f64 / candidate.len() as f64;
    let recall = lcs as f64 / target.len() as f64;
    fmeasure(precision, recall)
}

/// Indices into `reference` of one longest common subsequence with `candidate`.
fn lcs_indices(reference: &[String], candidate: &[String]) -> Vec<usize> {
    let table = lcs_table(reference, candidate);
    let (mut i, mut j) = (reference.len(), candidate.len());
    let mut indices = Vec::new();

    while i > 0 && j > 0 {
        if reference[i - 1] == candidate[j - 1] {
            indices.push(i - 1);
            i -= 1;
            j -= 1;
        } else if table[i][j - 1] > table[i - 1][j] {
            j -= 1;
        } else {
            i -= 1;
        }
    }

    indices.reverse();
    indices
}

/// Tokens of `reference` covered by the union of its LCS with each candidate sentence.
fn union_lcs<'a>(reference: &'a [String], candidates: &[Vec<String>]) -> Vec<&'a String> {
    let union: BTreeSet<usize> = candidates
        .iter()
        .flat_map(|candidate| lcs_indices(reference, candidate))
        .collect();
    union.into_iter().map(|i| &reference[i]).collect()
}

fn summary_lcs_fmeasure(target: &[Vec<String>], candidate: &[Vec<String>]) -> f64 {
    let target_len: usize = target.iter().map(Vec::len).sum();
    let candidate_len: usize = candidate.iter().map(Vec::len).sum();
    if target_len == 0 || candidate_len == 0 {
        return 0.0;
    }

    let mut target_counts: HashMap<&str, usize> = HashMap::new();
    for token in target.iter().flatten() {
        *target_counts.entry(token.as_str()).or_insert(0) += 1;
    }
    let mut candidate_counts: HashMap<&str, usize> = HashMap::new();
    for token in candidate.iter().flatten() {
        *candidate_counts.entry(token.as_str()).or_insert(0) += 1;
    }

    let mut hits = 0usize;
    for sentence in target {
        for token in union_lcs(sentence, candidate) {
            let token = token.as_str();
            let in_target = target_counts.get(token).copied().unwrap_or(0);
            let in_candidate = candidate_counts.get(token).copied().unwrap_or(0);
            if in_target > 0 && in_candidate > 0 {
                hits += 1;
                target_counts.insert(token, in_target - 1);
                candidate_counts.insert(token, in_candidate - 1);
            }
        }
    }

    let precision = hits as f64 / candidate_len as f64;
    let recall = hits as f64 / target_len as f64;
    fmeasure(precision, recall)
}
