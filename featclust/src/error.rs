use thiserror::Error;

use crate::FieldKind;

/// Errors returned by featclust operations.
#[derive(Debug, Error)]
pub enum ClusterError {
    #[error("shape mismatch: expected {expected} fields, got {got}")]
    ShapeMismatch { expected: usize, got: usize },

    #[error("field {index} kind mismatch: {left} vs {right}")]
    FieldKindMismatch {
        index: usize,
        left: FieldKind,
        right: FieldKind,
    },

    #[error("input is empty")]
    EmptyInput,

    #[error("invalid cluster count {k} for {n} items")]
    InvalidClusterCount { k: usize, n: usize },

    #[error("cluster {0} is empty")]
    EmptyCluster(usize),

    #[error("item {0} is not in any cluster")]
    UnassignedItem(usize),

    #[error("non-finite linkage between clusters {a} and {b}")]
    NonFiniteLinkage { a: usize, b: usize },

    #[error("set distance is singular (unique sizes {unique_a} and {unique_b})")]
    DistanceSingularity { unique_a: usize, unique_b: usize },

    #[error("invalid steepness coefficient: {0}")]
    InvalidCoefficient(f64),

    #[error("label count mismatch: {items} items, {labels} labels")]
    LabelMismatch { items: usize, labels: usize },

    #[error("parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("config error: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
