//! Match quality metrics
//!
//! Set-overlap precision/recall/F1 between the keywords extracted from a
//! query and the matched entry's expected keywords. Diagnostic only: surfaced
//! through tracing for offline quality monitoring, never returned to callers.

use std::collections::HashSet;

/// Precision/recall/F1 for one query against one matched entry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AccuracyMetrics {
    pub precision: f32,
    pub recall: f32,
    pub f1: f32,
}

impl AccuracyMetrics {
    /// Compare extracted keywords to the expected keyword set.
    ///
    /// Empty inputs yield zeroes rather than a division error.
    pub fn compute(extracted: &[String], expected: &[String]) -> Self {
        let extracted_set: HashSet<&str> = extracted.iter().map(String::as_str).collect();
        let expected_set: HashSet<&str> = expected.iter().map(String::as_str).collect();

        let overlap = extracted_set.intersection(&expected_set).count() as f32;

        let precision = if extracted_set.is_empty() {
            0.0
        } else {
            overlap / extracted_set.len() as f32
        };
        let recall = if expected_set.is_empty() {
            0.0
        } else {
            overlap / expected_set.len() as f32
        };
        let f1 = if precision + recall == 0.0 {
            0.0
        } else {
            2.0 * precision * recall / (precision + recall)
        };

        Self {
            precision,
            recall,
            f1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strs(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_half_overlap() {
        let metrics = AccuracyMetrics::compute(&strs(&["a", "b"]), &strs(&["a", "c"]));
        assert_eq!(metrics.precision, 0.5);
        assert_eq!(metrics.recall, 0.5);
        assert_eq!(metrics.f1, 0.5);
    }

    #[test]
    fn test_perfect_match() {
        let metrics = AccuracyMetrics::compute(&strs(&["a", "b"]), &strs(&["b", "a"]));
        assert_eq!(metrics.precision, 1.0);
        assert_eq!(metrics.recall, 1.0);
        assert_eq!(metrics.f1, 1.0);
    }

    #[test]
    fn test_empty_extracted_no_division_error() {
        let metrics = AccuracyMetrics::compute(&[], &strs(&["a"]));
        assert_eq!(metrics.precision, 0.0);
        assert_eq!(metrics.recall, 0.0);
        assert_eq!(metrics.f1, 0.0);
    }

    #[test]
    fn test_empty_expected() {
        let metrics = AccuracyMetrics::compute(&strs(&["a"]), &[]);
        assert_eq!(metrics.recall, 0.0);
        assert_eq!(metrics.f1, 0.0);
    }

    #[test]
    fn test_duplicates_count_once() {
        let metrics = AccuracyMetrics::compute(&strs(&["a", "a", "b"]), &strs(&["a", "c"]));
        assert_eq!(metrics.precision, 0.5);
    }
}
