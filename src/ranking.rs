//! Top-K ranking of classifier output

use serde::{Deserialize, Serialize};

use crate::encoding::CategoryTable;

/// Number of alternatives returned with a recommendation
pub const TOP_K: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedLabel {
    pub label: String,
    pub probability: f64,
}

/// Highest-probability classes first, ties broken by class code ascending
///
/// `proba` is aligned with `classes`. Codes with no label in `table` are
/// reported by their numeric code.
pub fn top_k(proba: &[f64], classes: &[i64], table: &CategoryTable, k: usize) -> Vec<RankedLabel> {
    let mut order: Vec<usize> = (0..classes.len().min(proba.len())).collect();
    order.sort_by(|&a, &b| {
        proba[b]
            .total_cmp(&proba[a])
            .then_with(|| classes[a].cmp(&classes[b]))
    });

    order
        .into_iter()
        .take(k)
        .map(|idx| RankedLabel {
            label: table
                .label(classes[idx])
                .map(str::to_string)
                .unwrap_or_else(|| classes[idx].to_string()),
            probability: proba[idx],
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding::EncodingTables;

    #[test]
    fn test_sorted_descending_and_truncated() {
        let tables = EncodingTables::new();
        let ranked = top_k(&[0.1, 0.6, 0.05, 0.25], &[1, 2, 3, 4], &tables.crop, TOP_K);

        let labels: Vec<&str> = ranked.iter().map(|r| r.label.as_str()).collect();
        assert_eq!(labels, vec!["maize", "cotton", "rice"]);
        assert!(ranked.windows(2).all(|w| w[0].probability >= w[1].probability));
    }

    #[test]
    fn test_ties_break_by_code() {
        let tables = EncodingTables::new();
        let ranked = top_k(&[0.3, 0.3, 0.4], &[24, 2, 1], &tables.crop, TOP_K);
        let labels: Vec<&str> = ranked.iter().map(|r| r.label.as_str()).collect();
        assert_eq!(labels, vec!["rice", "maize", "wheat"]);
    }

    #[test]
    fn test_fewer_classes_than_k() {
        let tables = EncodingTables::new();
        let ranked = top_k(&[0.7, 0.3], &[1, 99], &tables.crop, TOP_K);
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[1].label, "99");
    }
}
