//! Percentage-point deltas between two score sets

use crate::metrics::models::{ComparisonResult, ScoreSet};
use crate::{EvalError, Result};

/// `100 * (a - b)` per metric. Both sets must cover exactly the same metrics.
pub fn compare(a: &ScoreSet, b: &ScoreSet) -> Result<ComparisonResult> {
    if !a.metrics().eq(b.metrics()) {
        return Err(EvalError::MetricSetMismatch {
            left: metric_list(a),
            right: metric_list(b),
        });
    }

    Ok(a.iter()
        .zip(b.iter())
        .map(|((metric, left), (_, right))| (metric, 100.0 * (left - right)))
        .collect())
}

fn metric_list(scores: &ScoreSet) -> String {
    scores
        .metrics()
        .map(|m| m.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::Metric;

    fn scores(values: [f64; 4]) -> ScoreSet {
        Metric::ALL.into_iter().zip(values).collect()
    }

    #[test]
    fn comparing_with_itself_is_all_zero() {
        let a = scores([0.42, 0.18, 0.34, 0.33]);
        let deltas = compare(&a, &a).unwrap();
        assert_eq!(deltas.len(), 4);
        assert!(deltas.iter().all(|(_, d)| d == 0.0));
    }

    #[test]
    fn swapping_sides_negates_deltas() {
        let a = scores([0.40, 0.16, 0.32, 0.32]);
        let b = scores([0.23, 0.07, 0.20, 0.20]);
        let forward = compare(&a, &b).unwrap();
        let backward = compare(&b, &a).unwrap();

        for metric in Metric::ALL {
            assert_eq!(forward.get(metric).unwrap(), -backward.get(metric).unwrap());
        }
        assert!(forward.get(Metric::Rouge1).unwrap() > 0.0);
    }

    #[test]
    fn mismatched_metric_sets_are_rejected() {
        let a = scores([0.4, 0.1, 0.3, 0.3]);
        let b: ScoreSet = [(Metric::Rouge1, 0.2)].into_iter().collect();

        let err = compare(&a, &b).unwrap_err();
        match err {
            EvalError::MetricSetMismatch { left, right } => {
                assert_eq!(left, "rouge1, rouge2, rougeL, rougeLsum");
                assert_eq!(right, "rouge1");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn published_instruct_over_original_gain() {
        // Aggregates reported for the 10-dialogue evaluation table.
        let original: ScoreSet = [(Metric::Rouge1, 0.2567)].into_iter().collect();
        let instruct: ScoreSet = [(Metric::Rouge1, 0.4016)].into_iter().collect();

        let delta = compare(&instruct, &original).unwrap();
        let gain = delta.get(Metric::Rouge1).unwrap();
        assert!((gain - 14.49).abs() < 1e-6, "gain was {gain}");
    }
}
