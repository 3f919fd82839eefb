//! Metric names, score sets and comparison results

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::EvalError;

/// A ROUGE variant reported by the scorer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Metric {
    /// Unigram overlap
    #[serde(rename = "rouge1")]
    Rouge1,
    /// Bigram overlap
    #[serde(rename = "rouge2")]
    Rouge2,
    /// Longest common subsequence overlap
    #[serde(rename = "rougeL")]
    RougeL,
    /// Summary-level (union) longest common subsequence overlap
    #[serde(rename = "rougeLsum")]
    RougeLsum,
}

impl Metric {
    pub const ALL: [Metric; 4] = [
        Metric::Rouge1,
        Metric::Rouge2,
        Metric::RougeL,
        Metric::RougeLsum,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rouge1 => "rouge1",
            Self::Rouge2 => "rouge2",
            Self::RougeL => "rougeL",
            Self::RougeLsum => "rougeLsum",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Metric {
    type Err = EvalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "rouge1" | "unigram-overlap" => Ok(Self::Rouge1),
            "rouge2" | "bigram-overlap" => Ok(Self::Rouge2),
            "rougeL" | "lcs-overlap" => Ok(Self::RougeL),
            "rougeLsum" | "summary-lcs-overlap" => Ok(Self::RougeLsum),
            other => Err(EvalError::ConfigValidation(format!(
                "Unknown metric '{}'. Supported: rouge1, rouge2, rougeL, rougeLsum",
                other
            ))),
        }
    }
}

/// How per-example scores are reduced over a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Aggregation {
    /// Arithmetic mean per metric
    #[default]
    Mean,
    /// One score set per example, no reduction
    PerExample,
}

/// Scores in `[0, 1]` keyed by metric.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScoreSet {
    scores: BTreeMap<Metric, f64>,
}

impl ScoreSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, metric: Metric, value: f64) {
        self.scores.insert(metric, value);
    }

    pub fn get(&self, metric: Metric) -> Option<f64> {
        self.scores.get(&metric).copied()
    }

    pub fn metrics(&self) -> impl Iterator<Item = Metric> + '_ {
        self.scores.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Metric, f64)> + '_ {
        self.scores.iter().map(|(m, v)| (*m, *v))
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }
}

impl FromIterator<(Metric, f64)> for ScoreSet {
    fn from_iter<I: IntoIterator<Item = (Metric, f64)>>(iter: I) -> Self {
        Self {
            scores: iter.into_iter().collect(),
        }
    }
}

/// Signed percentage-point deltas keyed by metric. Positive favours the left side.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ComparisonResult {
    deltas: BTreeMap<Metric, f64>,
}

impl ComparisonResult {
    pub fn get(&self, metric: Metric) -> Option<f64> {
        self.deltas.get(&metric).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Metric, f64)> + '_ {
        self.deltas.iter().map(|(m, v)| (*m, *v))
    }

    pub fn len(&self) -> usize {
        self.deltas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.deltas.is_empty()
    }
}

impl FromIterator<(Metric, f64)> for ComparisonResult {
    fn from_iter<I: IntoIterator<Item = (Metric, f64)>>(iter: I) -> Self {
        Self {
            deltas: iter.into_iter().collect(),
        }
    }
}
