use bson::Bson;
use serde::{Deserialize, Serialize};

// Safety limits to prevent resource abuse
pub(crate) const MAX_PATH_DEPTH: usize = 32;
pub(crate) const MAX_SORT_FIELDS: usize = 8;
pub(crate) const MAX_PROJECTION_FIELDS: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Order {
    Asc,
    Desc,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SortSpec {
    pub field: String,
    pub order: Order,
}

impl SortSpec {
    pub fn asc(field: impl Into<String>) -> Self {
        Self { field: field.into(), order: Order::Asc }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self { field: field.into(), order: Order::Desc }
    }
}

/// Options for `RecordStore::find`.
///
/// Semantics:
/// - Sorting is applied before projection, so sort keys need not be projected.
/// - `skip`/`limit` slice the sorted result.
/// - Without a sort the natural order (ascending `_id`) is kept.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FindOptions {
    pub projection: Option<Vec<String>>,
    pub sort: Option<Vec<SortSpec>>,
    pub limit: Option<usize>,
    pub skip: Option<usize>,
}

impl FindOptions {
    pub fn project<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { projection: Some(fields.into_iter().map(Into::into).collect()), ..Self::default() }
    }

    #[must_use]
    pub const fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    Eq,
    Gt,
    Gte,
    Lt,
    Lte,
}

#[derive(Debug, Clone)]
pub enum Filter {
    True,
    And(Vec<Filter>),
    Or(Vec<Filter>),
    Not(Box<Filter>),
    Exists { path: String, exists: bool },
    Cmp { path: String, op: CmpOp, value: Bson },
    /// At least one element of the array at `path` is a document matching `filter`.
    ElemMatch { path: String, filter: Box<Filter> },
    /// Compares the length of the array at `path`. A missing array has length 0.
    Size { path: String, op: CmpOp, value: i64 },
    Regex { path: String, pattern: String, case_insensitive: bool },
}

impl Filter {
    pub fn cmp(path: impl Into<String>, op: CmpOp, value: impl Into<Bson>) -> Self {
        Self::Cmp { path: path.into(), op, value: value.into() }
    }

    pub fn equals(path: impl Into<String>, value: impl Into<Bson>) -> Self {
        Self::cmp(path, CmpOp::Eq, value)
    }

    pub fn elem_match(path: impl Into<String>, filter: Self) -> Self {
        Self::ElemMatch { path: path.into(), filter: Box::new(filter) }
    }

    pub fn size(path: impl Into<String>, op: CmpOp, value: i64) -> Self {
        Self::Size { path: path.into(), op, value }
    }

    /// Matches strings that start with `prefix` taken literally and continue
    /// with at least one more character.
    pub fn literal_prefix(path: impl Into<String>, prefix: &str) -> Self {
        Self::Regex {
            path: path.into(),
            pattern: format!("^{}.+", regex::escape(prefix)),
            case_insensitive: false,
        }
    }

    #[must_use]
    pub fn negate(self) -> Self {
        Self::Not(Box::new(self))
    }
}

/// Single-record update operators, applied atomically by the store.
#[derive(Debug, Default, Clone)]
pub struct UpdateDoc {
    pub set: Vec<(String, Bson)>,
    pub push: Vec<(String, Bson)>,
}

impl UpdateDoc {
    pub fn set(path: impl Into<String>, value: impl Into<Bson>) -> Self {
        Self { set: vec![(path.into(), value.into())], ..Self::default() }
    }

    pub fn push(path: impl Into<String>, value: impl Into<Bson>) -> Self {
        Self { push: vec![(path.into(), value.into())], ..Self::default() }
    }
}
