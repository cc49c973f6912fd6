//! Run configuration.
//!
//! Loaded from YAML (JSON is accepted too, being a YAML subset):
//!
//! ```yaml
//! n_clusters: 4
//! coeff: 1.0
//! singularity: max_distance
//! sweep: { min: 2, max: 12 }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ClusterError;
use crate::distance::VectorDistance;
use crate::metric::{DEFAULT_COEFF, SingularityPolicy};
use crate::records::Schema;
use crate::sweep::KRange;

/// Default target cluster count.
pub const DEFAULT_N_CLUSTERS: usize = 2;

/// Parameters consumed by the clustering core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterConfig {
    /// Target cluster count `k`.
    pub n_clusters: usize,

    /// Set-distance steepness. Larger values flatten the curve near
    /// partial overlap.
    pub coeff: f64,

    /// Handling of an empty set compared against a non-empty one.
    pub singularity: SingularityPolicy,

    /// Candidate range for model selection. None disables the sweep.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sweep: Option<KRange>,

    /// Record layout. None means [`Schema::movies`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<Schema>,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            n_clusters: DEFAULT_N_CLUSTERS,
            coeff: DEFAULT_COEFF,
            singularity: SingularityPolicy::default(),
            sweep: None,
            schema: None,
        }
    }
}

impl ClusterConfig {
    /// Loads and validates a config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ClusterError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml(&content)
    }

    /// Parses and validates a YAML document.
    pub fn from_yaml(content: &str) -> Result<Self, ClusterError> {
        let cfg: Self =
            serde_yaml::from_str(content).map_err(|e| ClusterError::Config(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn to_yaml(&self) -> Result<String, ClusterError> {
        serde_yaml::to_string(self).map_err(|e| ClusterError::Config(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), ClusterError> {
        if self.n_clusters == 0 {
            return Err(ClusterError::Config("n_clusters must be at least 1".into()));
        }
        if !(self.coeff.is_finite() && self.coeff > 0.0) {
            return Err(ClusterError::InvalidCoefficient(self.coeff));
        }
        if let Some(r) = self.sweep {
            if r.min == 0 || r.min > r.max {
                return Err(ClusterError::Config(format!(
                    "invalid sweep range {}..{}",
                    r.min, r.max
                )));
            }
        }
        Ok(())
    }

    /// Feature-vector distance for these settings.
    pub fn distance(&self) -> Result<VectorDistance, ClusterError> {
        VectorDistance::new(self.coeff, self.singularity)
    }

    /// Configured schema, or the movie layout.
    pub fn schema(&self) -> Schema {
        self.schema.clone().unwrap_or_default()
    }
}
