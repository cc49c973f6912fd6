//! Average-linkage agglomerative clustering.
//!
//! Starts from one singleton cluster per item and repeatedly merges the
//! closest pair until `k` clusters remain. The implementation is naive on
//! purpose: each step scans every active pair, so a full run is `O(n³)`
//! and meant for item counts in the hundreds.
//!
//! Clusters live in an arena addressed by stable ids (the index of the
//! item that seeded them). A merge keeps the lower id and deactivates the
//! higher one, so scanning active ids in ascending order visits clusters
//! in the same order as a list that had the absorbed entry removed.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::ClusterError;
use crate::distance::Metric;

/// Anything that can partition items into `k` labelled clusters.
pub trait Clusterer<T> {
    fn fit(&self, items: &[T], k: usize) -> Result<Assignment, ClusterError>;
}

/// Label per item, labels in `0..k`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawAssignment")]
pub struct Assignment {
    labels: Vec<usize>,
    k: usize,
}

impl Assignment {
    pub fn labels(&self) -> &[usize] {
        &self.labels
    }

    /// Number of clusters.
    pub fn k(&self) -> usize {
        self.k
    }

    /// Number of items.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Item indices grouped by label, each group in ascending order.
    pub fn clusters(&self) -> Vec<Vec<usize>> {
        let mut out = vec![Vec::new(); self.k];
        for (item, &label) in self.labels.iter().enumerate() {
            out[label].push(item);
        }
        out
    }

    pub fn into_labels(self) -> Vec<usize> {
        self.labels
    }
}

#[derive(Deserialize)]
struct RawAssignment {
    labels: Vec<usize>,
    k: usize,
}

impl TryFrom<RawAssignment> for Assignment {
    type Error = ClusterError;

    fn try_from(raw: RawAssignment) -> Result<Self, Self::Error> {
        if raw.k > raw.labels.len() {
            return Err(ClusterError::InvalidClusterCount {
                k: raw.k,
                n: raw.labels.len(),
            });
        }
        if let Some((item, label)) = raw.labels.iter().enumerate().find(|(_, l)| **l >= raw.k) {
            return Err(ClusterError::Config(format!(
                "item {item} has label {label}, expected < {}",
                raw.k
            )));
        }
        Ok(Self {
            labels: raw.labels,
            k: raw.k,
        })
    }
}

/// One merge step of a run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Merge {
    /// Id of the surviving cluster (the lower one).
    pub into: usize,
    /// Id of the cluster folded into `into`.
    pub absorbed: usize,
    /// Average-linkage distance at which the pair was merged.
    pub distance: f64,
    /// Size of the merged cluster.
    pub size: usize,
}

/// Merge history of one run, in merge order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawDendrogram")]
pub struct Dendrogram {
    n: usize,
    merges: Vec<Merge>,
}

#[derive(Deserialize)]
struct RawDendrogram {
    n: usize,
    merges: Vec<Merge>,
}

impl TryFrom<RawDendrogram> for Dendrogram {
    type Error = ClusterError;

    fn try_from(raw: RawDendrogram) -> Result<Self, Self::Error> {
        if raw.n == 0 {
            return Err(ClusterError::EmptyInput);
        }
        if raw.merges.len() >= raw.n {
            return Err(ClusterError::Config(format!(
                "{} merges for {} items",
                raw.merges.len(),
                raw.n
            )));
        }
        // Replaying catches unknown ids and merges of already absorbed clusters.
        let mut arena = Arena::singletons(raw.n);
        for m in &raw.merges {
            arena.merge(m.into, m.absorbed)?;
        }
        Ok(Self {
            n: raw.n,
            merges: raw.merges,
        })
    }
}

impl Dendrogram {
    /// Number of items the run started from.
    pub fn n(&self) -> usize {
        self.n
    }

    pub fn merges(&self) -> &[Merge] {
        &self.merges
    }

    /// Smallest cluster count this history can be cut at.
    pub fn min_k(&self) -> usize {
        self.n.saturating_sub(self.merges.len())
    }

    /// Replays the first `n - k` merges and labels the result.
    ///
    /// Gives the same assignment a run with target `k` would have produced,
    /// since every step only depends on the clusters before it.
    pub fn cut(&self, k: usize) -> Result<Assignment, ClusterError> {
        if k < self.min_k().max(1) || k > self.n {
            return Err(ClusterError::InvalidClusterCount { k, n: self.n });
        }
        let mut arena = Arena::singletons(self.n);
        for m in &self.merges[..self.n - k] {
            arena.merge(m.into, m.absorbed)?;
        }
        arena.assignment()
    }
}

struct Cluster {
    members: Vec<usize>,
    active: bool,
}

struct Arena {
    clusters: Vec<Cluster>,
    n: usize,
}

impl Arena {
    fn singletons(n: usize) -> Self {
        let clusters = (0..n)
            .map(|i| Cluster {
                members: vec![i],
                active: true,
            })
            .collect();
        Self { clusters, n }
    }

    fn active_ids(&self) -> Vec<usize> {
        self.clusters
            .iter()
            .enumerate()
            .filter(|(_, c)| c.active)
            .map(|(id, _)| id)
            .collect()
    }

    fn members(&self, id: usize) -> Result<&[usize], ClusterError> {
        let c = &self.clusters[id];
        if !c.active || c.members.is_empty() {
            return Err(ClusterError::EmptyCluster(id));
        }
        Ok(&c.members)
    }

    /// Mean distance over every cross pair of the two clusters.
    fn linkage(&self, a: usize, b: usize, dm: &DistanceMatrix) -> Result<f64, ClusterError> {
        let ma = self.members(a)?;
        let mb = self.members(b)?;
        let mut sum = 0.0;
        for &x in ma {
            for &y in mb {
                sum += dm.get(x, y);
            }
        }
        Ok(sum / (ma.len() * mb.len()) as f64)
    }

    fn merge(&mut self, into: usize, absorbed: usize) -> Result<usize, ClusterError> {
        if into == absorbed || absorbed >= self.clusters.len() || into >= self.clusters.len() {
            return Err(ClusterError::EmptyCluster(absorbed));
        }
        self.members(into)?;
        self.members(absorbed)?;

        let moved = std::mem::take(&mut self.clusters[absorbed].members);
        self.clusters[absorbed].active = false;
        let target = &mut self.clusters[into].members;
        target.extend(moved);
        target.sort_unstable();
        Ok(target.len())
    }

    fn assignment(&self) -> Result<Assignment, ClusterError> {
        let mut labels = vec![usize::MAX; self.n];
        let active = self.active_ids();
        for (label, &id) in active.iter().enumerate() {
            for &item in self.members(id)? {
                labels[item] = label;
            }
        }
        if let Some(item) = labels.iter().position(|&l| l == usize::MAX) {
            return Err(ClusterError::UnassignedItem(item));
        }
        Ok(Assignment {
            labels,
            k: active.len(),
        })
    }
}

/// Condensed pairwise distances between items, `i < j` only.
///
/// The metric is assumed symmetric; `get(j, i)` reads the `(i, j)` slot.
struct DistanceMatrix {
    n: usize,
    data: Vec<f64>,
}

impl DistanceMatrix {
    fn build<T, M: Metric<T> + ?Sized>(items: &[T], metric: &M) -> Result<Self, ClusterError> {
        let n = items.len();
        let mut data = Vec::with_capacity(n * n.saturating_sub(1) / 2);
        for i in 0..n {
            for j in (i + 1)..n {
                data.push(metric.distance(&items[i], &items[j])?);
            }
        }
        Ok(Self { n, data })
    }

    fn get(&self, i: usize, j: usize) -> f64 {
        let (i, j) = if i < j { (i, j) } else { (j, i) };
        // Row i starts after rows 0..i, which hold (n-1) + (n-2) + ... entries.
        let row = i * (2 * self.n - i - 1) / 2;
        self.data[row + (j - i - 1)]
    }
}

/// Average-linkage agglomerative clusterer over any [`Metric`].
#[derive(Debug, Clone)]
pub struct Agglomerative<M> {
    metric: M,
}

impl<M> Agglomerative<M> {
    pub fn new(metric: M) -> Self {
        Self { metric }
    }

    pub fn metric(&self) -> &M {
        &self.metric
    }

    /// Runs the merge procedure down to `k` clusters and returns the
    /// merge history.
    pub fn run<T>(&self, items: &[T], k: usize) -> Result<Dendrogram, ClusterError>
    where
        M: Metric<T>,
    {
        let n = items.len();
        if n == 0 {
            return Err(ClusterError::EmptyInput);
        }
        if k < 1 || k > n {
            return Err(ClusterError::InvalidClusterCount { k, n });
        }

        if k == n {
            info!(items = n, "nothing to merge");
            return Ok(Dendrogram {
                n,
                merges: Vec::new(),
            });
        }

        let dm = DistanceMatrix::build(items, &self.metric)?;
        let mut arena = Arena::singletons(n);
        let mut merges = Vec::with_capacity(n - k);

        for step in 0..(n - k) {
            let m = merge_nearest(&mut arena, &dm)?;
            debug!(
                step,
                into = m.into,
                absorbed = m.absorbed,
                distance = m.distance,
                size = m.size,
                "merged clusters"
            );
            merges.push(m);
        }

        info!(items = n, clusters = k, merges = merges.len(), "agglomerative run finished");
        Ok(Dendrogram { n, merges })
    }
}

impl<T, M: Metric<T>> Clusterer<T> for Agglomerative<M> {
    fn fit(&self, items: &[T], k: usize) -> Result<Assignment, ClusterError> {
        self.run(items, k)?.cut(k)
    }
}

/// Finds the closest active pair and merges it.
///
/// Pairs are scanned in ascending `(i, j)` order and only a strictly
/// smaller distance replaces the current best, so ties go to the first pair.
fn merge_nearest(arena: &mut Arena, dm: &DistanceMatrix) -> Result<Merge, ClusterError> {
    let active = arena.active_ids();
    let mut best: Option<(usize, usize, f64)> = None;

    for (pos, &a) in active.iter().enumerate() {
        for &b in &active[pos + 1..] {
            let d = arena.linkage(a, b, dm)?;
            if !d.is_finite() {
                return Err(ClusterError::NonFiniteLinkage { a, b });
            }
            match best {
                Some((_, _, best_d)) if d >= best_d => {}
                _ => best = Some((a, b, d)),
            }
        }
    }

    let (into, absorbed, distance) = best.ok_or(ClusterError::InvalidClusterCount {
        k: active.len().saturating_sub(1),
        n: arena.n,
    })?;
    let size = arena.merge(into, absorbed)?;
    Ok(Merge {
        into,
        absorbed,
        distance,
        size,
    })
}
