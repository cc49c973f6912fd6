//! Per-field distance functions.
//!
//! The set distance remaps the raw overlap ratio
//! `(|A ∪ B| - max(|A|, |B|)) / min(|A|, |B|)` onto a hyperbola anchored so
//! that identical sets land on 0 and disjoint sets on 1:
//!
//! ```text
//! ABCDE : FGH            -> 1.0
//! ABCDE : ABC            -> 0.0
//! ABCDE : AFG            -> 0.29
//! ABCDE : AFG coeff=1e5  -> 0.665
//! ```
//!
//! A larger `coeff` straightens the curve between the anchors.

use std::collections::HashSet;
use std::hash::Hash;

use serde::{Deserialize, Serialize};

use crate::ClusterError;

/// Default steepness coefficient for [`set_distance`].
pub const DEFAULT_COEFF: f64 = 1.0;

/// What [`set_distance`] does when one side has no elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SingularityPolicy {
    /// Treat an empty side against a non-empty side as fully disjoint (1.0).
    #[default]
    MaxDistance,
    /// Fail with [`ClusterError::DistanceSingularity`].
    Error,
}

/// Returns 0 for equal values, 1 otherwise.
pub fn scalar_distance<T: PartialEq + ?Sized>(a: &T, b: &T) -> f64 {
    if a == b { 0.0 } else { 1.0 }
}

/// Normalized distance between two token sequences.
///
/// `a` and `b` may contain duplicates. Uniqueness is applied for the union
/// and for `min`, but the raw sequence lengths feed the intersection count,
/// so duplicate-heavy inputs can land slightly outside `[0, 1]`.
pub fn set_distance<T: Eq + Hash>(
    a: &[T],
    b: &[T],
    coeff: f64,
    policy: SingularityPolicy,
) -> Result<f64, ClusterError> {
    check_coeff(coeff)?;

    let ua: HashSet<&T> = a.iter().collect();
    let ub: HashSet<&T> = b.iter().collect();
    let unique_a = ua.len();
    let unique_b = ub.len();

    let m = unique_a.min(unique_b);
    if m == 0 {
        if unique_a == unique_b {
            return Ok(0.0);
        }
        return match policy {
            SingularityPolicy::MaxDistance => Ok(1.0),
            SingularityPolicy::Error => {
                Err(ClusterError::DistanceSingularity { unique_a, unique_b })
            }
        };
    }

    let union = ua.union(&ub).count();
    let intersects = (a.len() + b.len()) as f64 - union as f64;
    let m = m as f64;

    let sq_d = (m * m + 4.0 * coeff * m).sqrt();
    let x0 = (m - sq_d) / 2.0;
    let shift = coeff / (m - x0);
    let d = coeff / (intersects - x0) - shift;

    if !d.is_finite() {
        return Err(ClusterError::DistanceSingularity { unique_a, unique_b });
    }
    Ok(d)
}

pub(crate) fn check_coeff(coeff: f64) -> Result<(), ClusterError> {
    if coeff.is_finite() && coeff > 0.0 {
        Ok(())
    } else {
        Err(ClusterError::InvalidCoefficient(coeff))
    }
}
