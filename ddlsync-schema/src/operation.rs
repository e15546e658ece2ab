//! Schema operations, the unit of change produced by the differ.

use std::fmt;

use serde::Serialize;
use tracing::trace;

use crate::error::{SchemaError, SchemaResult};
use crate::model::{Column, Constraint, Index, Schema, Table};

/// Kind of an [`Operation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    CreateTable,
    DropTable,
    AddColumn,
    DropColumn,
    AlterColumnType,
    AddConstraint,
    DropConstraint,
    AddIndex,
    DropIndex,
}

impl OperationKind {
    /// All kinds, in summary order.
    pub const ALL: [OperationKind; 9] = [
        Self::CreateTable,
        Self::DropTable,
        Self::AddColumn,
        Self::DropColumn,
        Self::AlterColumnType,
        Self::AddConstraint,
        Self::DropConstraint,
        Self::AddIndex,
        Self::DropIndex,
    ];

    /// Human-readable count, e.g. `Add 2 columns`.
    pub fn describe(&self, count: usize) -> String {
        let (verb, singular, plural) = match self {
            Self::CreateTable => ("Create", "table", "tables"),
            Self::DropTable => ("Drop", "table", "tables"),
            Self::AddColumn => ("Add", "column", "columns"),
            Self::DropColumn => ("Drop", "column", "columns"),
            Self::AlterColumnType => ("Alter", "column", "columns"),
            Self::AddConstraint => ("Add", "constraint", "constraints"),
            Self::DropConstraint => ("Drop", "constraint", "constraints"),
            Self::AddIndex => ("Add", "index", "indexes"),
            Self::DropIndex => ("Drop", "index", "indexes"),
        };
        let noun = if count == 1 { singular } else { plural };
        format!("{} {} {}", verb, count, noun)
    }
}

/// One atomic schema change.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Operation {
    /// Create a table, including its primary key, constraints and indexes.
    CreateTable(Table),
    /// Drop a table.
    DropTable { table: String },
    /// Add a column.
    AddColumn { table: String, column: Column },
    /// Drop a column.
    DropColumn { table: String, column: String },
    /// Change a column's type, nullability or default.
    AlterColumnType {
        table: String,
        from: Column,
        to: Column,
    },
    /// Add a constraint.
    AddConstraint {
        table: String,
        constraint: Constraint,
    },
    /// Drop a constraint.
    DropConstraint {
        table: String,
        constraint: Constraint,
    },
    /// Create an index.
    AddIndex { table: String, index: Index },
    /// Drop an index.
    DropIndex { table: String, index: Index },
}

impl Operation {
    /// Kind of this operation.
    pub fn kind(&self) -> OperationKind {
        match self {
            Self::CreateTable(_) => OperationKind::CreateTable,
            Self::DropTable { .. } => OperationKind::DropTable,
            Self::AddColumn { .. } => OperationKind::AddColumn,
            Self::DropColumn { .. } => OperationKind::DropColumn,
            Self::AlterColumnType { .. } => OperationKind::AlterColumnType,
            Self::AddConstraint { .. } => OperationKind::AddConstraint,
            Self::DropConstraint { .. } => OperationKind::DropConstraint,
            Self::AddIndex { .. } => OperationKind::AddIndex,
            Self::DropIndex { .. } => OperationKind::DropIndex,
        }
    }

    /// Target table.
    pub fn table(&self) -> &str {
        match self {
            Self::CreateTable(t) => t.name(),
            Self::DropTable { table }
            | Self::AddColumn { table, .. }
            | Self::DropColumn { table, .. }
            | Self::AlterColumnType { table, .. }
            | Self::AddConstraint { table, .. }
            | Self::DropConstraint { table, .. }
            | Self::AddIndex { table, .. }
            | Self::DropIndex { table, .. } => table,
        }
    }

    /// Foreign key constraint carried by this operation, if any.
    pub fn foreign_key(&self) -> Option<&Constraint> {
        match self {
            Self::AddConstraint { constraint, .. } | Self::DropConstraint { constraint, .. }
                if constraint.is_foreign_key() =>
            {
                Some(constraint)
            }
            _ => None,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CreateTable(t) => write!(f, "create table {}", t.name()),
            Self::DropTable { table } => write!(f, "drop table {}", table),
            Self::AddColumn { table, column } => {
                write!(f, "add column {}.{} {}", table, column.name, column.ty)
            }
            Self::DropColumn { table, column } => write!(f, "drop column {}.{}", table, column),
            Self::AlterColumnType { table, from, to } => {
                write!(f, "alter column {}.{} {}", table, to.name, from.ty)?;
                if from.nullable {
                    f.write_str(" null")?;
                }
                write!(f, " -> {}", to.ty)?;
                if to.nullable {
                    f.write_str(" null")?;
                }
                Ok(())
            }
            Self::AddConstraint { table, constraint } => {
                write!(f, "add {} on {}", constraint, table)
            }
            Self::DropConstraint { table, constraint } => {
                write!(f, "drop {} on {}", constraint, table)
            }
            Self::AddIndex { table, index } => write!(f, "add index {} on {}", index.name, table),
            Self::DropIndex { table, index } => write!(f, "drop index {} on {}", index.name, table),
        }
    }
}

/// Engine behavior [`Schema::apply`] follows beyond the model invariants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApplyRules {
    /// `DROP TABLE` removes the table's indexes along with it. When false,
    /// every index must be dropped before its table.
    pub drop_table_drops_indexes: bool,
}

impl Default for ApplyRules {
    fn default() -> Self {
        Self {
            drop_table_drops_indexes: true,
        }
    }
}

impl Schema {
    /// Apply `operations` in order with the default [`ApplyRules`].
    pub fn apply(&self, operations: &[Operation]) -> SchemaResult<Schema> {
        self.apply_with(operations, ApplyRules::default())
    }

    /// Apply `operations` in order, validating the model after each one.
    ///
    /// Fails on the first operation whose payload does not fit the schema it
    /// targets, or that leaves the schema invalid (for example dropping a
    /// table that is still referenced by a foreign key). A foreign key is
    /// only accepted once the columns it references are a key of the target
    /// table.
    pub fn apply_with(&self, operations: &[Operation], rules: ApplyRules) -> SchemaResult<Schema> {
        let mut schema = self.clone();
        for op in operations {
            trace!(operation = %op, "applying");
            schema = schema.apply_one(op, rules)?;
            schema.check_references(op)?;
        }
        Ok(schema)
    }

    /// Foreign keys introduced by `op` must point at a key.
    fn check_references(&self, op: &Operation) -> SchemaResult<()> {
        let added: Vec<&Constraint> = match op {
            Operation::CreateTable(table) => table.foreign_keys().collect(),
            Operation::AddConstraint { constraint, .. } if constraint.is_foreign_key() => {
                vec![constraint]
            }
            _ => return Ok(()),
        };
        for reference in added.into_iter().filter_map(Constraint::reference) {
            let keyed = self
                .table(&reference.table)
                .is_some_and(|target| target.has_key(&reference.columns));
            if !keyed {
                return Err(SchemaError::validation(
                    op.table(),
                    format!(
                        "foreign key references `{}` ({}), which is not a primary key or unique key",
                        reference.table,
                        reference.columns.join(", ")
                    ),
                ));
            }
        }
        Ok(())
    }

    fn apply_one(&self, op: &Operation, rules: ApplyRules) -> SchemaResult<Schema> {
        let mut builder = self.to_builder();
        let table_name = op.table();

        if let Operation::CreateTable(table) = op {
            if builder.has_table(table_name) {
                return Err(SchemaError::validation(table_name, "table already exists"));
            }
            let ordinal = builder.next_ordinal();
            builder.add_table(table.to_builder().ordinal(ordinal));
            return builder.build();
        }
        if let Operation::DropTable { .. } = op {
            if !rules.drop_table_drops_indexes {
                if let Some(index) = self.table(table_name).and_then(|t| t.indexes().first()) {
                    return Err(SchemaError::validation(
                        table_name,
                        format!("cannot drop the table while index `{}` exists", index.name),
                    ));
                }
            }
            if !builder.remove_table(table_name) {
                return Err(SchemaError::validation(table_name, "table does not exist"));
            }
            return builder.build();
        }

        let Some(table) = builder.table_mut(table_name) else {
            return Err(SchemaError::validation(table_name, "table does not exist"));
        };

        let applied = match op {
            Operation::AddColumn { column, .. } => {
                if table.has_column(&column.name) {
                    false
                } else {
                    table.add_column(column.clone());
                    true
                }
            }
            Operation::DropColumn { column, .. } => table.remove_column(column),
            Operation::AlterColumnType { from, to, .. } => {
                from.name == to.name && table.replace_column(to.clone())
            }
            Operation::AddConstraint { constraint, .. } => {
                table.add_constraint(constraint.clone());
                true
            }
            Operation::DropConstraint { constraint, .. } => table.remove_constraint(constraint),
            Operation::AddIndex { index, .. } => {
                table.add_index(index.clone());
                true
            }
            Operation::DropIndex { index, .. } => table.remove_index(&index.name),
            Operation::CreateTable(_) | Operation::DropTable { .. } => true,
        };

        if !applied {
            return Err(SchemaError::validation(
                table_name,
                format!("cannot {}", op),
            ));
        }
        builder.build()
    }
}
