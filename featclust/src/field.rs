use std::fmt;

use serde::{Deserialize, Serialize};

/// How a field is compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    /// Exact-match value, compared by equality.
    Scalar,
    /// Collection of tokens, compared by overlap.
    Set,
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar => write!(f, "scalar"),
            Self::Set => write!(f, "set"),
        }
    }
}

/// One position of a feature vector.
///
/// `SetOfText` keeps the original token order and duplicates; the set
/// distance counts raw lengths, so collapsing them here would change results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Scalar(String),
    SetOfText(Vec<String>),
}

impl Field {
    /// Builds a scalar field.
    pub fn scalar(value: impl Into<String>) -> Self {
        Self::Scalar(value.into())
    }

    /// Builds a set-valued field from any iterable of tokens.
    pub fn set<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::SetOfText(tokens.into_iter().map(Into::into).collect())
    }

    pub fn kind(&self) -> FieldKind {
        match self {
            Self::Scalar(_) => FieldKind::Scalar,
            Self::SetOfText(_) => FieldKind::Set,
        }
    }
}

/// Fixed-arity sequence of fields describing one item.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureVector(Vec<Field>);

impl FeatureVector {
    pub fn new(fields: Vec<Field>) -> Self {
        Self(fields)
    }

    /// Number of fields (the arity `F`).
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn fields(&self) -> &[Field] {
        &self.0
    }

    pub fn get(&self, idx: usize) -> Option<&Field> {
        self.0.get(idx)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Field> {
        self.0.iter()
    }
}

impl From<Vec<Field>> for FeatureVector {
    fn from(fields: Vec<Field>) -> Self {
        Self(fields)
    }
}

impl FromIterator<Field> for FeatureVector {
    fn from_iter<I: IntoIterator<Item = Field>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a FeatureVector {
    type Item = &'a Field;
    type IntoIter = std::slice::Iter<'a, Field>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
