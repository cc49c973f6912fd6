use serde::{Deserialize, Serialize};

use crate::ClusterError;
use crate::field::{FeatureVector, Field};
use crate::metric::{DEFAULT_COEFF, SingularityPolicy, check_coeff, scalar_distance, set_distance};

/// Pairwise distance between two items.
///
/// Implemented by [`VectorDistance`] and by any closure
/// `Fn(&T, &T) -> Result<f64, ClusterError>`, so evaluation can plug in a
/// distance over a held-out attribute without a new type.
pub trait Metric<T: ?Sized> {
    fn distance(&self, a: &T, b: &T) -> Result<f64, ClusterError>;
}

impl<T: ?Sized, F> Metric<T> for F
where
    F: Fn(&T, &T) -> Result<f64, ClusterError>,
{
    fn distance(&self, a: &T, b: &T) -> Result<f64, ClusterError> {
        self(a, b)
    }
}

/// Mean of per-field distances between two feature vectors.
///
/// Scalar fields use [`scalar_distance`], set fields use [`set_distance`]
/// with the configured steepness.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VectorDistance {
    coeff: f64,
    policy: SingularityPolicy,
}

impl VectorDistance {
    /// Creates a distance with the given set-distance steepness.
    pub fn new(coeff: f64, policy: SingularityPolicy) -> Result<Self, ClusterError> {
        check_coeff(coeff)?;
        Ok(Self { coeff, policy })
    }

    pub fn coeff(&self) -> f64 {
        self.coeff
    }

    pub fn policy(&self) -> SingularityPolicy {
        self.policy
    }

    /// Distance between a single pair of fields at position `index`.
    pub fn field_distance(&self, index: usize, a: &Field, b: &Field) -> Result<f64, ClusterError> {
        match (a, b) {
            (Field::Scalar(x), Field::Scalar(y)) => Ok(scalar_distance(x, y)),
            (Field::SetOfText(x), Field::SetOfText(y)) => {
                set_distance(x, y, self.coeff, self.policy)
            }
            _ => Err(ClusterError::FieldKindMismatch {
                index,
                left: a.kind(),
                right: b.kind(),
            }),
        }
    }
}

impl Default for VectorDistance {
    fn default() -> Self {
        Self {
            coeff: DEFAULT_COEFF,
            policy: SingularityPolicy::default(),
        }
    }
}

impl Metric<FeatureVector> for VectorDistance {
    fn distance(&self, a: &FeatureVector, b: &FeatureVector) -> Result<f64, ClusterError> {
        if a.len() != b.len() {
            return Err(ClusterError::ShapeMismatch {
                expected: a.len(),
                got: b.len(),
            });
        }
        if a.is_empty() {
            return Err(ClusterError::EmptyInput);
        }

        let mut sum = 0.0;
        for (i, (fa, fb)) in a.iter().zip(b.iter()).enumerate() {
            sum += self.field_distance(i, fa, fb)?;
        }
        Ok(sum / a.len() as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(s: &str, tokens: &[&str]) -> FeatureVector {
        FeatureVector::new(vec![Field::scalar(s), Field::set(tokens.iter().copied())])
    }

    #[test]
    fn mean_of_fields() {
        let d = VectorDistance::default();
        assert_eq!(d.distance(&item("A", &["x"]), &item("A", &["x"])).unwrap(), 0.0);

        // scalar differs (1.0), sets disjoint (1.0)
        let v = d.distance(&item("A", &["x", "y"]), &item("B", &["p", "q"])).unwrap();
        assert!((v - 1.0).abs() < 1e-9);

        // scalar equal (0.0), sets overlap one of two (~0.2113)
        let v = d.distance(&item("A", &["x", "y"]), &item("A", &["x", "z"])).unwrap();
        assert!((v - 0.2113 / 2.0).abs() < 1e-3, "got {v}");
    }

    #[test]
    fn shape_mismatch() {
        let d = VectorDistance::default();
        let a = item("A", &["x"]);
        let b = FeatureVector::new(vec![Field::scalar("A")]);
        let err = d.distance(&a, &b).unwrap_err();
        assert!(matches!(err, ClusterError::ShapeMismatch { expected: 2, got: 1 }));
    }

    #[test]
    fn kind_mismatch() {
        let d = VectorDistance::default();
        let a = FeatureVector::new(vec![Field::scalar("A")]);
        let b = FeatureVector::new(vec![Field::set(["A"])]);
        let err = d.distance(&a, &b).unwrap_err();
        assert!(matches!(err, ClusterError::FieldKindMismatch { index: 0, .. }));
    }

    #[test]
    fn rejects_bad_coeff() {
        assert!(VectorDistance::new(0.0, SingularityPolicy::MaxDistance).is_err());
        assert!(VectorDistance::new(2.0, SingularityPolicy::Error).is_ok());
    }

    #[test]
    fn closure_metric() {
        let m = |a: &i32, b: &i32| -> Result<f64, ClusterError> { Ok((a - b).abs() as f64) };
        assert_eq!(m.distance(&3, &7).unwrap(), 4.0);
    }
}
