//! Frequency-based centroids over multisets of feature tokens.
//!
//! Counting order is total: count descending, then first occurrence
//! ascending. Single-value lookups return `None` on no data; collection
//! lookups return an empty `Vec`.

use std::collections::HashMap;
use std::hash::Hash;

/// Selection rule for [`aggregate_centroids`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CentroidMode {
    /// The `floor(part * distinct)` most frequent elements overall.
    TopOfAll,
    /// Every element seen at least `floor(part * rows)` times. May be empty.
    MinRowShare,
}

/// Element counts ordered by count descending, then first occurrence.
pub fn frequencies<'a, T, I>(seq: I) -> Vec<(T, usize)>
where
    T: Eq + Hash + Clone + 'a,
    I: IntoIterator<Item = &'a T>,
{
    let mut counts: HashMap<&T, (usize, usize)> = HashMap::new();
    for (pos, el) in seq.into_iter().enumerate() {
        counts.entry(el).or_insert((0, pos)).0 += 1;
    }

    let mut out: Vec<(&T, usize, usize)> = counts
        .into_iter()
        .map(|(el, (count, first))| (el, count, first))
        .collect();
    out.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));
    out.into_iter().map(|(el, count, _)| (el.clone(), count)).collect()
}

/// Most frequent element, ties broken by first occurrence.
pub fn most_frequent<T: Eq + Hash + Clone>(seq: &[T]) -> Option<T> {
    frequencies(seq).into_iter().next().map(|(el, _)| el)
}

/// Flattens `rows` and picks frequent elements according to `mode`.
///
/// `part` is a share in `[0, 1]`; the derived count is floored.
pub fn aggregate_centroids<T, R>(rows: &[R], part: f64, mode: CentroidMode) -> Vec<T>
where
    T: Eq + Hash + Clone,
    R: AsRef<[T]>,
{
    if rows.is_empty() {
        return Vec::new();
    }

    let counts = frequencies(rows.iter().flat_map(|r| r.as_ref().iter()));
    match mode {
        CentroidMode::TopOfAll => {
            let take = share(part, counts.len());
            counts.into_iter().take(take).map(|(el, _)| el).collect()
        }
        CentroidMode::MinRowShare => {
            let min = share(part, rows.len());
            counts
                .into_iter()
                .filter(|(_, count)| *count >= min)
                .map(|(el, _)| el)
                .collect()
        }
    }
}

fn share(part: f64, total: usize) -> usize {
    let v = (part * total as f64).floor();
    if v.is_finite() && v > 0.0 { v as usize } else { 0 }
}
