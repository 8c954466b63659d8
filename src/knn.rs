//! This is the similarity module.
//! Provides the three-feature distance and k-nearest-neighbor search.

use crate::record::Record;
use tracing::debug;

/// A record returned by [`nearest`] together with its distance to the target.
#[derive(Debug, Clone, Copy)]
pub struct Neighbor<'a> {
    pub record: &'a Record,
    pub distance: f64,
}

/// Euclidean distance
/// dist = sqrt(Δabsenteeism² + Δperformance² + Δcompensation²)
/// Features are not rescaled, so compensation dominates in practice
pub fn distance(a: &Record, b: &Record) -> f64 {
    let absenteeism = a.absenteeism_rate() - b.absenteeism_rate();
    let performance = a.performance_score() - b.performance_score();
    let compensation = a.compensation() - b.compensation();

    (absenteeism * absenteeism + performance * performance + compensation * compensation).sqrt()
}

/// K nearest neighbors of `target` within `records`.
///
/// Records sharing the target's identity are skipped; anything else stays,
/// even at distance zero. The sort is stable, so equal distances keep the
/// order of `records`. Asking for more than is available returns everything.
pub fn nearest<'a>(target: &Record, k: usize, records: &[&'a Record]) -> Vec<Neighbor<'a>> {
    let mut neighbors: Vec<Neighbor<'a>> = records
        .iter()
        .filter(|r| r.identity() != target.identity())
        .map(|r| Neighbor { record: *r, distance: distance(target, r) })
        .collect();

    neighbors.sort_by(|x, y| x.distance.total_cmp(&y.distance));
    neighbors.truncate(k);

    debug!(identity = target.identity(), k, returned = neighbors.len(), "knn search");
    neighbors
}

#[cfg(test)]
mod knn_test {
    use super::*;
    use crate::record::NewRecord;
    use chrono::Utc;

    fn record(identity: &str, compensation: f64, absenteeism_rate: f64, performance_score: f64) -> Record {
        let new = NewRecord {
            identity: identity.to_string(),
            compensation,
            absenteeism_rate,
            performance_score,
            ..NewRecord::default()
        };
        Record::from_new(new, Utc::now()).unwrap()
    }

    // ========== Distance Tests ==========

    #[test]
    fn test_distance_basic() {
        // 3-4-0 triangle on absenteeism/performance
        let a = record("a", 0.0, 0.0, 0.0);
        let b = record("b", 0.0, 3.0, 4.0);

        assert!((distance(&a, &b) - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_distance_self_is_zero() {
        let a = record("a", 1234.5, 7.0, 66.0);
        assert_eq!(distance(&a, &a), 0.0);
    }

    #[test]
    fn test_distance_symmetric() {
        let a = record("a", 1000.0, 2.0, 90.0);
        let b = record("b", 5000.0, 10.0, 40.0);

        assert_eq!(distance(&a, &b), distance(&b, &a));
        assert!(distance(&a, &b) > 0.0);
    }

    #[test]
    fn test_distance_uses_compensation() {
        let a = record("a", 1000.0, 5.0, 50.0);
        let b = record("b", 1012.0, 5.0, 50.0);

        assert!((distance(&a, &b) - 12.0).abs() < 1e-9);
    }

    // ========== Nearest Tests ==========

    #[test]
    fn test_nearest_excludes_target() {
        let a = record("ana", 1000.0, 2.0, 90.0);
        let b = record("bea", 1100.0, 3.0, 85.0);
        let c = record("cia", 5000.0, 10.0, 40.0);
        let all = vec![&a, &b, &c];

        let result = nearest(&a, 10, &all);

        assert_eq!(result.len(), 2);
        assert!(result.iter().all(|n| n.record.identity() != "ANA"));
        assert_eq!(result[0].record.identity(), "BEA");
        assert_eq!(result[1].record.identity(), "CIA");
        assert!(result[0].distance <= result[1].distance);
    }

    #[test]
    fn test_nearest_keeps_identical_features() {
        let a = record("ana", 1000.0, 2.0, 90.0);
        let twin = record("twin", 1000.0, 2.0, 90.0);
        let all = vec![&a, &twin];

        let result = nearest(&a, 1, &all);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].record.identity(), "TWIN");
        assert_eq!(result[0].distance, 0.0);
    }

    #[test]
    fn test_nearest_ties_keep_input_order() {
        let target = record("t", 100.0, 0.0, 0.0);
        let x = record("x", 110.0, 0.0, 0.0);
        let y = record("y", 90.0, 0.0, 0.0);
        let z = record("z", 105.0, 0.0, 0.0);

        let result = nearest(&target, 3, &[&target, &x, &y, &z]);
        let ids: Vec<&str> = result.iter().map(|n| n.record.identity()).collect();
        assert_eq!(ids, vec!["Z", "X", "Y"]);

        let result = nearest(&target, 3, &[&y, &x, &target, &z]);
        let ids: Vec<&str> = result.iter().map(|n| n.record.identity()).collect();
        assert_eq!(ids, vec!["Z", "Y", "X"]);
    }

    #[test]
    fn test_nearest_k_bounds() {
        let a = record("a", 1.0, 0.0, 0.0);
        let b = record("b", 2.0, 0.0, 0.0);
        let c = record("c", 3.0, 0.0, 0.0);
        let all = vec![&a, &b, &c];

        assert_eq!(nearest(&a, 0, &all).len(), 0);
        assert_eq!(nearest(&a, 1, &all).len(), 1);
        assert_eq!(nearest(&a, 2, &all).len(), 2);
        assert_eq!(nearest(&a, 50, &all).len(), 2);
    }

    #[test]
    fn test_nearest_only_target() {
        let a = record("a", 1.0, 0.0, 0.0);
        assert!(nearest(&a, 3, &[&a]).is_empty());
    }
}
