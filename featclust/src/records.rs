//! Line-oriented record reader.
//!
//! Each line is one row of space-delimited tokens, `|` quoting tokens that
//! contain spaces (`||` inside quotes is a literal `|`). Every
//! `schema.len()` consecutive rows make one record; row `i` of a record is
//! described by `schema.specs()[i]`.
//!
//! ```text
//! 771312088                       <- id        (scalar)
//! Drama Romance                   <- genres    (set, label)
//! |The Notebook|                  <- title     (scalar)
//! ...
//! ```

use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::ClusterError;
use crate::field::{FeatureVector, Field, FieldKind};

const DELIMITER: char = ' ';
const QUOTE: char = '|';

/// What a row is used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldRole {
    /// Part of the clustering feature vector.
    #[default]
    Feature,
    /// Held out from clustering, available for evaluation.
    Label,
    /// Record identifier. Must be scalar.
    Id,
}

/// Describes one row of a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub name: String,
    pub kind: FieldKind,
    #[serde(default)]
    pub role: FieldRole,
}

impl FieldSpec {
    pub fn new(name: impl Into<String>, kind: FieldKind, role: FieldRole) -> Self {
        Self {
            name: name.into(),
            kind,
            role,
        }
    }
}

/// Ordered row layout of a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<FieldSpec>", into = "Vec<FieldSpec>")]
pub struct Schema {
    specs: Vec<FieldSpec>,
}

impl Schema {
    pub fn new(specs: Vec<FieldSpec>) -> Result<Self, ClusterError> {
        if specs.is_empty() {
            return Err(ClusterError::Config("schema has no fields".into()));
        }
        let mut seen = HashSet::new();
        let mut ids = 0;
        for spec in &specs {
            if !seen.insert(spec.name.as_str()) {
                return Err(ClusterError::Config(format!("duplicate field {:?}", spec.name)));
            }
            if spec.role == FieldRole::Id {
                if spec.kind != FieldKind::Scalar {
                    return Err(ClusterError::Config(format!(
                        "id field {:?} must be scalar",
                        spec.name
                    )));
                }
                ids += 1;
            }
        }
        if ids > 1 {
            return Err(ClusterError::Config("schema has more than one id field".into()));
        }
        if !specs.iter().any(|s| s.role == FieldRole::Feature) {
            return Err(ClusterError::Config("schema has no feature fields".into()));
        }
        Ok(Self { specs })
    }

    /// Ten-row movie layout: id, genres, title, synopsis, mpaa_rating,
    /// runtime, critics_consensus, abridged_cast_names,
    /// abridged_directors_names, studio. Genres are held out as the label.
    pub fn movies() -> Self {
        use FieldKind::{Scalar, Set};
        use FieldRole::{Feature, Id, Label};

        let specs = [
            ("id", Scalar, Id),
            ("genres", Set, Label),
            ("title", Scalar, Feature),
            ("synopsis", Set, Feature),
            ("mpaa_rating", Scalar, Feature),
            ("runtime", Scalar, Feature),
            ("critics_consensus", Set, Feature),
            ("abridged_cast_names", Set, Feature),
            ("abridged_directors_names", Set, Feature),
            ("studio", Scalar, Feature),
        ]
        .into_iter()
        .map(|(name, kind, role)| FieldSpec::new(name, kind, role))
        .collect();
        Self { specs }
    }

    /// Rows per record.
    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    pub fn specs(&self) -> &[FieldSpec] {
        &self.specs
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.specs.iter().position(|s| s.name == name)
    }

    /// Feature-role fields of `record`, in schema order.
    pub fn features(&self, record: &Record) -> FeatureVector {
        self.specs
            .iter()
            .zip(&record.fields)
            .filter(|(spec, _)| spec.role == FieldRole::Feature)
            .map(|(_, f)| f.clone())
            .collect()
    }

    /// The named fields of `record`, in the order given.
    pub fn project(&self, record: &Record, names: &[&str]) -> Result<FeatureVector, ClusterError> {
        names
            .iter()
            .map(|name| {
                let pos = self
                    .position(name)
                    .ok_or_else(|| ClusterError::Config(format!("unknown field {name:?}")))?;
                record
                    .fields
                    .get(pos)
                    .cloned()
                    .ok_or(ClusterError::ShapeMismatch {
                        expected: self.len(),
                        got: record.fields.len(),
                    })
            })
            .collect()
    }

    fn build_field(&self, pos: usize, tokens: Vec<String>, line: usize) -> Result<Field, ClusterError> {
        let spec = &self.specs[pos];
        match spec.kind {
            FieldKind::Set => Ok(Field::SetOfText(tokens)),
            FieldKind::Scalar => {
                if tokens.len() != 1 {
                    return Err(ClusterError::Parse {
                        line,
                        message: format!(
                            "scalar field {:?} needs exactly one token, got {}",
                            spec.name,
                            tokens.len()
                        ),
                    });
                }
                Ok(Field::Scalar(tokens.into_iter().next().unwrap_or_default()))
            }
        }
    }
}

impl TryFrom<Vec<FieldSpec>> for Schema {
    type Error = ClusterError;

    fn try_from(specs: Vec<FieldSpec>) -> Result<Self, Self::Error> {
        Self::new(specs)
    }
}

impl From<Schema> for Vec<FieldSpec> {
    fn from(schema: Schema) -> Self {
        schema.specs
    }
}

impl Default for Schema {
    fn default() -> Self {
        Self::movies()
    }
}

/// One parsed record, one field per schema row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    id: Option<String>,
    fields: Vec<Field>,
}

impl Record {
    /// Value of the id row, if the schema has one.
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }
}

/// Splits one line into tokens.
pub fn split_row(line: &str, line_no: usize) -> Result<Vec<String>, ClusterError> {
    let line = line.strip_suffix('\r').unwrap_or(line);
    if line.is_empty() {
        return Ok(Vec::new());
    }

    let mut tokens = Vec::new();
    let mut cur = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            if c == QUOTE {
                if chars.peek() == Some(&QUOTE) {
                    chars.next();
                    cur.push(QUOTE);
                } else {
                    in_quotes = false;
                }
            } else {
                cur.push(c);
            }
        } else if c == DELIMITER {
            tokens.push(std::mem::take(&mut cur));
        } else if c == QUOTE && cur.is_empty() {
            in_quotes = true;
        } else {
            cur.push(c);
        }
    }

    if in_quotes {
        return Err(ClusterError::Parse {
            line: line_no,
            message: "unterminated quote".into(),
        });
    }
    tokens.push(cur);
    Ok(tokens)
}

/// Reads records from `reader`. A trailing partial record is dropped.
pub fn read_records<R: BufRead>(reader: R, schema: &Schema) -> Result<Vec<Record>, ClusterError> {
    let id_pos = schema.specs.iter().position(|s| s.role == FieldRole::Id);
    let mut records = Vec::new();
    let mut fields = Vec::with_capacity(schema.len());

    for (idx, line) in reader.lines().enumerate() {
        let line_no = idx + 1;
        let tokens = split_row(&line?, line_no)?;
        fields.push(schema.build_field(fields.len(), tokens, line_no)?);

        if fields.len() == schema.len() {
            let fields = std::mem::replace(&mut fields, Vec::with_capacity(schema.len()));
            let id = id_pos.and_then(|p| match &fields[p] {
                Field::Scalar(s) => Some(s.clone()),
                Field::SetOfText(_) => None,
            });
            records.push(Record { id, fields });
        }
    }

    if !fields.is_empty() {
        warn!(rows = fields.len(), expected = schema.len(), "dropping incomplete trailing record");
    }
    debug!(records = records.len(), "read records");
    Ok(records)
}

/// Opens `path` and reads records from it.
pub fn load_records(path: impl AsRef<Path>, schema: &Schema) -> Result<Vec<Record>, ClusterError> {
    let file = File::open(path.as_ref())?;
    read_records(BufReader::new(file), schema)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_row_schema() -> Schema {
        Schema::new(vec![
            FieldSpec::new("name", FieldKind::Scalar, FieldRole::Id),
            FieldSpec::new("tags", FieldKind::Set, FieldRole::Feature),
        ])
        .unwrap()
    }

    #[test]
    fn split_plain_and_quoted() {
        assert_eq!(split_row("a b c", 1).unwrap(), vec!["a", "b", "c"]);
        assert_eq!(
            split_row("|The Notebook| PG-13", 1).unwrap(),
            vec!["The Notebook", "PG-13"]
        );
        assert_eq!(split_row("|a||b|", 1).unwrap(), vec!["a|b"]);
        assert_eq!(split_row("a  b", 1).unwrap(), vec!["a", "", "b"]);
        assert!(split_row("", 1).unwrap().is_empty());
        assert_eq!(split_row("x\r", 1).unwrap(), vec!["x"]);
    }

    #[test]
    fn split_unterminated_quote() {
        let err = split_row("|open", 7).unwrap_err();
        assert!(matches!(err, ClusterError::Parse { line: 7, .. }));
    }

    #[test]
    fn groups_rows_into_records() {
        let data = "m1\nx y\nm2\n\nm3\n";
        let records = read_records(data.as_bytes(), &two_row_schema()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id(), Some("m1"));
        assert_eq!(records[0].fields()[1], Field::set(["x", "y"]));
        assert_eq!(records[1].fields()[1], Field::SetOfText(Vec::new()));
    }

    #[test]
    fn scalar_row_needs_one_token() {
        let data = "m1 m2\nx\n";
        let err = read_records(data.as_bytes(), &two_row_schema()).unwrap_err();
        assert!(matches!(err, ClusterError::Parse { line: 1, .. }));
    }

    #[test]
    fn features_and_projection() {
        let schema = Schema::movies();
        let mut data = String::new();
        for row in [
            "42",
            "Drama Romance",
            "|The Notebook|",
            "love summer letters",
            "PG-13",
            "123",
            "sweet",
            "|Ryan Gosling| |Rachel McAdams|",
            "|Nick Cassavetes|",
            "|New Line|",
        ] {
            data.push_str(row);
            data.push('\n');
        }
        let records = read_records(data.as_bytes(), &schema).unwrap();
        assert_eq!(records.len(), 1);

        let r = &records[0];
        assert_eq!(r.id(), Some("42"));

        let features = schema.features(r);
        assert_eq!(features.len(), 8);
        assert_eq!(features.get(0), Some(&Field::scalar("The Notebook")));
        assert_eq!(features.get(7), Some(&Field::scalar("New Line")));

        let genres = schema.project(r, &["genres"]).unwrap();
        assert_eq!(genres.get(0), Some(&Field::set(["Drama", "Romance"])));
        assert!(schema.project(r, &["nope"]).is_err());
    }

    #[test]
    fn schema_validation() {
        assert!(Schema::new(Vec::new()).is_err());
        assert!(
            Schema::new(vec![
                FieldSpec::new("a", FieldKind::Set, FieldRole::Feature),
                FieldSpec::new("a", FieldKind::Set, FieldRole::Feature),
            ])
            .is_err()
        );
        assert!(Schema::new(vec![FieldSpec::new("id", FieldKind::Set, FieldRole::Id)]).is_err());
        assert!(Schema::new(vec![FieldSpec::new("g", FieldKind::Set, FieldRole::Label)]).is_err());
    }

    #[test]
    fn schema_from_yaml() {
        let yaml = "- name: id\n  kind: scalar\n  role: id\n- name: tags\n  kind: set\n";
        let schema: Schema = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(schema.len(), 2);
        assert_eq!(schema.specs()[0].role, FieldRole::Id);
        assert_eq!(schema.specs()[1], FieldSpec::new("tags", FieldKind::Set, FieldRole::Feature));

        let bad = "- name: g\n  kind: set\n  role: label\n";
        assert!(serde_yaml::from_str::<Schema>(bad).is_err());
    }
}
