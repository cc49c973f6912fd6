//! Silhouette coefficient for scoring a clustering.
//!
//! For item `i`:
//! - `a(i)`: mean distance to every member of its own cluster, `i` included
//!   (a singleton therefore gets `a(i) = d(i, i)`, normally 0);
//! - `b(i)`: smallest mean distance to the members of any other cluster;
//! - `s(i) = (b(i) - a(i)) / max(a(i), b(i))`, or 0 when both are 0.
//!
//! Pairwise distances are floored at 0 before averaging. Set fields with
//! repeated tokens can yield a slightly negative distance (even from an
//! item to itself), which would otherwise push `s(i)` outside `[-1, 1]`.
//!
//! The overall score is the mean of `s(i)`. The metric need not be the one
//! used for clustering, e.g. it can compare a held-out attribute.

use std::collections::BTreeMap;

use crate::ClusterError;
use crate::distance::Metric;

/// Mean silhouette over all items.
pub fn silhouette<T, M>(items: &[T], labels: &[usize], metric: &M) -> Result<f64, ClusterError>
where
    M: Metric<T> + ?Sized,
{
    let samples = silhouette_samples(items, labels, metric)?;
    Ok(samples.iter().sum::<f64>() / samples.len() as f64)
}

/// Per-item silhouette values, parallel to `items`.
pub fn silhouette_samples<T, M>(
    items: &[T],
    labels: &[usize],
    metric: &M,
) -> Result<Vec<f64>, ClusterError>
where
    M: Metric<T> + ?Sized,
{
    if items.is_empty() {
        return Err(ClusterError::EmptyInput);
    }
    if items.len() != labels.len() {
        return Err(ClusterError::LabelMismatch {
            items: items.len(),
            labels: labels.len(),
        });
    }

    let mut groups: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
    for (i, &label) in labels.iter().enumerate() {
        groups.entry(label).or_default().push(i);
    }
    if groups.len() < 2 {
        return Err(ClusterError::InvalidClusterCount {
            k: groups.len(),
            n: items.len(),
        });
    }

    let mut out = Vec::with_capacity(items.len());
    for (i, item) in items.iter().enumerate() {
        let own = labels[i];
        let mut a = 0.0;
        let mut b = f64::INFINITY;

        for (&label, members) in &groups {
            let mean = mean_distance(item, members, items, metric)?;
            if label == own {
                a = mean;
            } else if mean < b {
                b = mean;
            }
        }

        let denom = a.max(b);
        out.push(if denom == 0.0 { 0.0 } else { (b - a) / denom });
    }
    Ok(out)
}

fn mean_distance<T, M>(item: &T, members: &[usize], items: &[T], metric: &M) -> Result<f64, ClusterError>
where
    M: Metric<T> + ?Sized,
{
    let mut sum = 0.0;
    for &j in members {
        let d = metric.distance(item, &items[j])?;
        sum += if d < 0.0 { 0.0 } else { d };
    }
    Ok(sum / members.len() as f64)
}
