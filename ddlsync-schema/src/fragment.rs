//! Parsing of DDL fragments embedded in source annotations.
//!
//! Source extractors do not understand SQL. When a declaration carries a raw
//! column definition or a table-level index/constraint statement, the
//! extractor hands the text to the active dialect through [`FragmentParser`].

use crate::config::DialectKind;
use crate::error::SchemaResult;
use crate::model::{ColumnType, Constraint, Index};

/// A parsed column definition fragment such as `VARCHAR(320) NOT NULL DEFAULT ''`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnFragment {
    /// Canonical type.
    pub ty: ColumnType,
    /// NULL allowed. Columns are nullable unless the fragment says `NOT NULL`.
    pub nullable: bool,
    /// Default expression, normalized by the dialect.
    pub default: Option<String>,
    /// Database-generated values.
    pub auto_increment: bool,
    /// Inline constraints (`PRIMARY KEY`, `UNIQUE`, `REFERENCES`, `CHECK`),
    /// with the column list left empty.
    pub constraints: Vec<Constraint>,
}

impl ColumnFragment {
    /// A nullable fragment of the given type.
    pub fn new(ty: ColumnType) -> Self {
        Self {
            ty,
            nullable: true,
            default: None,
            auto_increment: false,
            constraints: Vec::new(),
        }
    }
}

/// Dialect-side parsing of DDL fragments.
pub trait FragmentParser {
    /// Dialect whose syntax the fragments use.
    fn dialect_kind(&self) -> DialectKind;

    /// Parse a column definition without the leading column name.
    fn parse_column_fragment(&self, fragment: &str) -> SchemaResult<ColumnFragment>;

    /// Parse a `CREATE [UNIQUE] INDEX` statement into the indexed table's name and the index.
    fn parse_index_statement(&self, statement: &str) -> SchemaResult<(String, Index)>;

    /// Parse a table constraint such as `CONSTRAINT name UNIQUE (a, b)` or `CHECK (a > 0)`.
    fn parse_table_constraint(&self, fragment: &str) -> SchemaResult<Constraint>;
}
