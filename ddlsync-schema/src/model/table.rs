//! Tables and the table builder.

use std::collections::HashSet;

use indexmap::IndexMap;
use serde::Serialize;

use super::{Column, Constraint, ConstraintKind, Index};
use crate::error::{SchemaError, SchemaResult};

/// A validated table.
///
/// Tables are only produced by [`TableBuilder`] (usually through
/// [`SchemaBuilder`](super::SchemaBuilder)) and cannot be mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Table {
    name: String,
    columns: IndexMap<String, Column>,
    #[serde(skip_serializing_if = "Option::is_none")]
    primary_key: Option<Constraint>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    indexes: Vec<Index>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    constraints: Vec<Constraint>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    options: Vec<(String, String)>,
    ordinal: usize,
}

impl Table {
    /// Get the table name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Columns in declaration order.
    pub fn columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.values()
    }

    /// Look up a column by name.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.get(name)
    }

    /// Check if a column exists.
    pub fn has_column(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    /// Number of columns.
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Primary key constraint.
    pub fn primary_key(&self) -> Option<&Constraint> {
        self.primary_key.as_ref()
    }

    /// Primary key column names, empty if the table has none.
    pub fn primary_key_columns(&self) -> &[String] {
        self.primary_key
            .as_ref()
            .map(|pk| pk.columns.as_slice())
            .unwrap_or(&[])
    }

    /// Secondary indexes.
    pub fn indexes(&self) -> &[Index] {
        &self.indexes
    }

    /// Constraints other than the primary key.
    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    /// Foreign key constraints.
    pub fn foreign_keys(&self) -> impl Iterator<Item = &Constraint> {
        self.constraints.iter().filter(|c| c.is_foreign_key())
    }

    /// Is `columns` (in any order) the primary key, a unique constraint or a
    /// unique index? Foreign keys may only reference such a key.
    pub fn has_key(&self, columns: &[String]) -> bool {
        let wanted: HashSet<&str> = columns.iter().map(String::as_str).collect();
        let same = |names: HashSet<&str>| names == wanted;

        self.primary_key
            .iter()
            .chain(
                self.constraints
                    .iter()
                    .filter(|c| c.kind == ConstraintKind::Unique),
            )
            .any(|c| same(c.columns.iter().map(String::as_str).collect()))
            || self
                .indexes
                .iter()
                .filter(|i| i.unique)
                .any(|i| same(i.column_names().collect()))
    }

    /// Dialect-specific table options (`ENGINE=InnoDB`, ...), in source order.
    pub fn options(&self) -> &[(String, String)] {
        &self.options
    }

    /// Position of the table in its input.
    pub fn ordinal(&self) -> usize {
        self.ordinal
    }

    /// Copy of this table keeping only the constraints `keep` accepts.
    pub fn retain_constraints(&self, mut keep: impl FnMut(&Constraint) -> bool) -> Table {
        let mut table = self.clone();
        table.constraints.retain(|c| keep(c));
        table
    }

    /// Reopen the table for modification.
    pub fn to_builder(&self) -> TableBuilder {
        TableBuilder {
            name: self.name.clone(),
            columns: self.columns.values().cloned().collect(),
            primary_keys: self.primary_key.iter().cloned().collect(),
            indexes: self.indexes.clone(),
            constraints: self.constraints.clone(),
            options: self.options.clone(),
            ordinal: Some(self.ordinal),
        }
    }

    /// Semantic equality: same columns (in any order), same primary key,
    /// and structurally equal constraint and index sets.
    pub fn equivalent(&self, other: &Table) -> bool {
        if self.name != other.name || self.columns.len() != other.columns.len() {
            return false;
        }

        let columns_match = self.columns.values().all(|col| {
            other
                .columns
                .get(&col.name)
                .is_some_and(|o| col.same_definition(o))
        });

        columns_match
            && self.primary_key_columns() == other.primary_key_columns()
            && same_set(&self.constraints, &other.constraints, Constraint::structurally_eq)
            && same_set(&self.indexes, &other.indexes, Index::structurally_eq)
    }
}

/// Multiset equality under `eq`.
fn same_set<T>(a: &[T], b: &[T], eq: impl Fn(&T, &T) -> bool) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut used = vec![false; b.len()];
    a.iter().all(|x| {
        match b
            .iter()
            .enumerate()
            .position(|(i, y)| !used[i] && eq(x, y))
        {
            Some(i) => {
                used[i] = true;
                true
            }
            None => false,
        }
    })
}

/// Builder for [`Table`].
#[derive(Debug, Clone)]
pub struct TableBuilder {
    name: String,
    columns: Vec<Column>,
    primary_keys: Vec<Constraint>,
    indexes: Vec<Index>,
    constraints: Vec<Constraint>,
    options: Vec<(String, String)>,
    ordinal: Option<usize>,
}

impl TableBuilder {
    /// Start a table.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            primary_keys: Vec::new(),
            indexes: Vec::new(),
            constraints: Vec::new(),
            options: Vec::new(),
            ordinal: None,
        }
    }

    /// Get the table name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Add a column.
    pub fn column(mut self, column: Column) -> Self {
        self.add_column(column);
        self
    }

    /// Set the primary key columns.
    pub fn primary_key<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.add_constraint(Constraint::primary_key(columns));
        self
    }

    /// Add a constraint. A primary key constraint becomes the table's primary key.
    pub fn constraint(mut self, constraint: Constraint) -> Self {
        self.add_constraint(constraint);
        self
    }

    /// Add an index.
    pub fn index(mut self, index: Index) -> Self {
        self.add_index(index);
        self
    }

    /// Add a table option.
    pub fn option(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.add_option(key, value);
        self
    }

    /// Fix the ordinal instead of using the insertion position.
    pub fn ordinal(mut self, ordinal: usize) -> Self {
        self.ordinal = Some(ordinal);
        self
    }

    /// Add a column in place.
    pub fn add_column(&mut self, column: Column) {
        self.columns.push(column);
    }

    /// Add a constraint in place.
    pub fn add_constraint(&mut self, constraint: Constraint) {
        if constraint.is_primary_key() {
            self.primary_keys.push(constraint);
        } else {
            self.constraints.push(constraint);
        }
    }

    /// Add an index in place.
    pub fn add_index(&mut self, index: Index) {
        self.indexes.push(index);
    }

    /// Add a table option in place.
    pub fn add_option(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.options.push((key.into(), value.into()));
    }

    /// Check if a column has been added.
    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.name == name)
    }

    /// Check if an index has been added.
    pub fn has_index(&self, name: &str) -> bool {
        self.indexes.iter().any(|i| i.name == name)
    }

    /// Mutable access to a column that has been added.
    pub fn column_mut(&mut self, name: &str) -> Option<&mut Column> {
        self.columns.iter_mut().find(|c| c.name == name)
    }

    /// Replace the column with the same name. Returns false if there was none.
    pub fn replace_column(&mut self, column: Column) -> bool {
        match self.column_mut(&column.name) {
            Some(slot) => {
                *slot = column;
                true
            }
            None => false,
        }
    }

    /// Remove a column by name. Returns false if there was none.
    pub fn remove_column(&mut self, name: &str) -> bool {
        let before = self.columns.len();
        self.columns.retain(|c| c.name != name);
        self.columns.len() != before
    }

    /// Remove the first constraint structurally equal to `constraint`.
    pub fn remove_constraint(&mut self, constraint: &Constraint) -> bool {
        let list = if constraint.is_primary_key() {
            &mut self.primary_keys
        } else {
            &mut self.constraints
        };
        match list.iter().position(|c| c.structurally_eq(constraint)) {
            Some(i) => {
                list.remove(i);
                true
            }
            None => false,
        }
    }

    /// Remove an index by name.
    pub fn remove_index(&mut self, name: &str) -> bool {
        let before = self.indexes.len();
        self.indexes.retain(|i| i.name != name);
        self.indexes.len() != before
    }

    /// Validate the table on its own and build it.
    ///
    /// References to other tables are checked by
    /// [`SchemaBuilder::build`](super::SchemaBuilder::build).
    pub fn build(self, ordinal: usize) -> SchemaResult<Table> {
        let name = self.name;
        if name.is_empty() {
            return Err(SchemaError::validation(name, "table name is empty"));
        }
        if self.columns.is_empty() {
            return Err(SchemaError::validation(name, "table has no columns"));
        }

        let mut columns = IndexMap::with_capacity(self.columns.len());
        for column in self.columns {
            if column.name.is_empty() {
                return Err(SchemaError::validation(name, "column name is empty"));
            }
            if columns.contains_key(&column.name) {
                return Err(SchemaError::validation(
                    name,
                    format!("duplicate column `{}`", column.name),
                ));
            }
            columns.insert(column.name.clone(), column);
        }

        let mut primary_keys = self.primary_keys;
        if primary_keys.len() > 1 {
            return Err(SchemaError::validation(name, "multiple primary keys defined"));
        }
        let primary_key = primary_keys.pop();
        if let Some(pk) = &primary_key {
            check_columns(&name, &columns, &pk.columns, "primary key")?;
            for col in &pk.columns {
                if let Some(column) = columns.get_mut(col) {
                    column.nullable = false;
                }
            }
        }

        for constraint in &self.constraints {
            if !matches!(constraint.kind, ConstraintKind::Check(_)) || !constraint.columns.is_empty()
            {
                check_columns(&name, &columns, &constraint.columns, constraint.kind.as_str())?;
            }
            if let Some(reference) = constraint.reference() {
                if reference.columns.len() != constraint.columns.len() {
                    return Err(SchemaError::validation(
                        name,
                        format!(
                            "foreign key ({}) references {} column(s) of `{}`",
                            constraint.columns.join(", "),
                            reference.columns.len(),
                            reference.table
                        ),
                    ));
                }
            }
        }

        let mut index_names = HashSet::new();
        for index in &self.indexes {
            if !index_names.insert(index.name.as_str()) {
                return Err(SchemaError::validation(
                    name,
                    format!("duplicate index `{}`", index.name),
                ));
            }
            let cols: Vec<String> = index.column_names().map(String::from).collect();
            check_columns(&name, &columns, &cols, &format!("index `{}`", index.name))?;
        }

        Ok(Table {
            name,
            columns,
            primary_key,
            indexes: self.indexes,
            constraints: self.constraints,
            options: self.options,
            ordinal: self.ordinal.unwrap_or(ordinal),
        })
    }

    pub(crate) fn fixed_ordinal(&self) -> Option<usize> {
        self.ordinal
    }
}

fn check_columns(
    table: &str,
    columns: &IndexMap<String, Column>,
    names: &[String],
    what: &str,
) -> SchemaResult<()> {
    if names.is_empty() {
        return Err(SchemaError::validation(
            table,
            format!("{} has no columns", what),
        ));
    }
    let mut seen = HashSet::new();
    for name in names {
        if !columns.contains_key(name) {
            return Err(SchemaError::validation(
                table,
                format!("{} references unknown column `{}`", what, name),
            ));
        }
        if !seen.insert(name) {
            return Err(SchemaError::validation(
                table,
                format!("{} lists column `{}` twice", what, name),
            ));
        }
    }
    Ok(())
}
