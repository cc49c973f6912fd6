//! Agglomerative clustering of items described by mixed scalar and
//! set-valued feature vectors, with silhouette-based model selection.
//!
//! # Pipeline
//!
//! 1. [`read_records`] / [`load_records`]: line-oriented rows -> [`Record`]s
//! 2. [`Schema::features`]: record -> [`FeatureVector`]
//! 3. [`VectorDistance`]: mean of per-field distances
//!    ([`scalar_distance`], [`set_distance`])
//! 4. [`Agglomerative`]: average-linkage merging down to `k` clusters
//! 5. [`silhouette`] / [`sweep`]: score clusterings, pick `k`
//!
//! # Usage
//!
//! ```
//! use featclust::{Agglomerative, Clusterer, FeatureVector, Field, VectorDistance};
//!
//! let items = vec![
//!     FeatureVector::new(vec![Field::scalar("A"), Field::set(["x", "y"])]),
//!     FeatureVector::new(vec![Field::scalar("A"), Field::set(["x", "z"])]),
//!     FeatureVector::new(vec![Field::scalar("B"), Field::set(["p", "q"])]),
//! ];
//!
//! let engine = Agglomerative::new(VectorDistance::default());
//! let assignment = engine.fit(&items, 2).unwrap();
//! assert_eq!(assignment.labels(), &[0, 0, 1]);
//! ```
//!
//! The engine is a reference implementation: a full run is `O(n³)`.

mod agglomerative;
mod centroid;
mod config;
mod distance;
mod error;
mod field;
mod metric;
mod records;
mod silhouette;
mod sweep;


pub use agglomerative::{Agglomerative, Assignment, Clusterer, Dendrogram, Merge};
pub use centroid::{CentroidMode, aggregate_centroids, frequencies, most_frequent};
pub use config::{ClusterConfig, DEFAULT_N_CLUSTERS};
pub use distance::{Metric, VectorDistance};
pub use error::ClusterError;
pub use field::{FeatureVector, Field, FieldKind};
pub use metric::{DEFAULT_COEFF, SingularityPolicy, scalar_distance, set_distance};
pub use records::{FieldRole, FieldSpec, Record, Schema, load_records, read_records, split_row};
pub use silhouette::{silhouette, silhouette_samples};
pub use sweep::{KRange, SweepPoint, best_k, sweep};
