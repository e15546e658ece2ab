//! Secondary indexes.

use serde::Serialize;

/// One key part of an index.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct IndexColumn {
    /// Column name.
    pub name: String,
    /// Sorted descending.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub descending: bool,
}

impl IndexColumn {
    /// Ascending key part.
    pub fn asc(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            descending: false,
        }
    }

    /// Descending key part.
    pub fn desc(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            descending: true,
        }
    }
}

/// A secondary index on a table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Index {
    /// Index name.
    pub name: String,
    /// Key parts, in order.
    pub columns: Vec<IndexColumn>,
    /// Unique index.
    pub unique: bool,
}

impl Index {
    /// Create a non-unique ascending index.
    pub fn new<I, S>(name: impl Into<String>, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            columns: columns.into_iter().map(IndexColumn::asc).collect(),
            unique: false,
        }
    }

    /// Create an index from explicit key parts.
    pub fn with_columns(name: impl Into<String>, columns: Vec<IndexColumn>) -> Self {
        Self {
            name: name.into(),
            columns,
            unique: false,
        }
    }

    /// Make the index unique.
    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// Names of the indexed columns.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    /// Compare key parts and uniqueness, ignoring the name.
    pub fn structurally_eq(&self, other: &Index) -> bool {
        self.unique == other.unique && self.columns == other.columns
    }
}
