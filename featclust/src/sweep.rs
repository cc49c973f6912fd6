//! Cluster-count selection by silhouette sweep.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::ClusterError;
use crate::agglomerative::Agglomerative;
use crate::distance::Metric;
use crate::silhouette::silhouette;

/// Inclusive range of cluster counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KRange {
    pub min: usize,
    pub max: usize,
}

impl KRange {
    pub fn new(min: usize, max: usize) -> Self {
        Self { min, max }
    }
}

/// Silhouette score of the clustering cut at `k`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SweepPoint {
    pub k: usize,
    pub score: f64,
}

/// Scores every `k` in `range` with the silhouette of `eval` over
/// `eval_items`.
///
/// The range is clamped to `[2, n]`, since a single cluster has no
/// silhouette. Clustering runs once down to the smallest `k`; every larger
/// `k` is a cut of the same merge history. `eval_items[i]` must describe
/// the same item as `items[i]`.
pub fn sweep<T, U, M, E>(
    items: &[T],
    engine: &Agglomerative<M>,
    range: KRange,
    eval_items: &[U],
    eval: &E,
) -> Result<Vec<SweepPoint>, ClusterError>
where
    M: Metric<T>,
    E: Metric<U> + ?Sized,
{
    let n = items.len();
    if n == 0 {
        return Err(ClusterError::EmptyInput);
    }
    if eval_items.len() != n {
        return Err(ClusterError::LabelMismatch {
            items: eval_items.len(),
            labels: n,
        });
    }

    let lo = range.min.max(2);
    let hi = range.max.min(n);
    if lo > hi {
        return Err(ClusterError::InvalidClusterCount { k: range.min, n });
    }

    let dendrogram = engine.run(items, lo)?;
    let mut points = Vec::with_capacity(hi - lo + 1);
    for k in lo..=hi {
        let assignment = dendrogram.cut(k)?;
        let score = silhouette(eval_items, assignment.labels(), eval)?;
        debug!(k, score, "scored cut");
        points.push(SweepPoint { k, score });
    }

    if let Some(best) = best_k(&points) {
        info!(best_k = best.k, score = best.score, "sweep finished");
    }
    Ok(points)
}

/// Highest-scoring point; ties go to the smaller `k`.
pub fn best_k(points: &[SweepPoint]) -> Option<SweepPoint> {
    let mut best: Option<SweepPoint> = None;
    for p in points {
        match best {
            Some(b) if p.score < b.score || (p.score == b.score && p.k >= b.k) => {}
            _ => best = Some(*p),
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(a: &f64, b: &f64) -> Result<f64, ClusterError> {
        Ok((a - b).abs())
    }

    #[test]
    fn picks_natural_cluster_count() {
        let items = [0.0, 1.0, 2.0, 50.0, 51.0, 52.0, 100.0, 101.0, 102.0];
        let engine = Agglomerative::new(line);
        let points = sweep(&items, &engine, KRange::new(1, 6), &items, &line).unwrap();

        assert_eq!(points.first().map(|p| p.k), Some(2));
        assert_eq!(points.last().map(|p| p.k), Some(6));
        assert_eq!(best_k(&points).unwrap().k, 3);
        for p in &points {
            assert!((-1.0..=1.0).contains(&p.score), "k={} score={}", p.k, p.score);
        }
    }

    #[test]
    fn range_clamped_to_item_count() {
        let items = [0.0, 1.0, 5.0];
        let engine = Agglomerative::new(line);
        let points = sweep(&items, &engine, KRange::new(2, 10), &items, &line).unwrap();
        let ks: Vec<usize> = points.iter().map(|p| p.k).collect();
        assert_eq!(ks, vec![2, 3]);
    }

    #[test]
    fn empty_range() {
        let items = [0.0, 1.0];
        let engine = Agglomerative::new(line);
        let res = sweep(&items, &engine, KRange::new(5, 8), &items, &line);
        assert!(matches!(res, Err(ClusterError::InvalidClusterCount { k: 5, n: 2 })));
    }

    #[test]
    fn eval_items_must_align() {
        let items = [0.0, 1.0, 2.0];
        let engine = Agglomerative::new(line);
        let res = sweep(&items, &engine, KRange::new(2, 3), &items[..2], &line);
        assert!(matches!(res, Err(ClusterError::LabelMismatch { .. })));
    }

    #[test]
    fn best_k_ties_to_smaller() {
        let points = [
            SweepPoint { k: 2, score: 0.5 },
            SweepPoint { k: 3, score: 0.7 },
            SweepPoint { k: 4, score: 0.7 },
        ];
        assert_eq!(best_k(&points).unwrap().k, 3);
        assert!(best_k(&[]).is_none());
    }
}
