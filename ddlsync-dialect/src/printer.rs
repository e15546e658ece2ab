//! Rendering helpers shared by the dialect printers.

use std::collections::HashSet;

use ddlsync_schema::{Constraint, ConstraintKind, DialectKind, IndexColumn, Operation, Schema};

use crate::dialect::Dialect;

/// Join statements into a script: each ends with `;`, separated by a blank line.
pub fn script(statements: &[String]) -> String {
    let mut out = String::new();
    for statement in statements {
        if !out.is_empty() {
            out.push('\n');
        }
        out.push_str(statement);
        out.push_str(";\n");
    }
    out
}

/// Operations that create `schema` from nothing.
///
/// A foreign key into a table that comes later is split out of its
/// `CreateTable` and added once every table exists.
pub(crate) fn schema_operations(schema: &Schema) -> Vec<Operation> {
    let mut created: HashSet<&str> = HashSet::new();
    let mut operations = Vec::with_capacity(schema.len());
    let mut deferred = Vec::new();

    for table in schema.tables() {
        created.insert(table.name());
        let forward = |c: &Constraint| {
            c.reference()
                .is_some_and(|r| !created.contains(r.table.as_str()))
        };
        deferred.extend(table.foreign_keys().filter(|c| forward(c)).map(|c| {
            Operation::AddConstraint {
                table: table.name().to_string(),
                constraint: c.clone(),
            }
        }));
        operations.push(Operation::CreateTable(
            table.retain_constraints(|c| !forward(c)),
        ));
    }

    operations.extend(deferred);
    operations
}

/// `"a", "b"`
pub(crate) fn column_list(dialect: &dyn Dialect, columns: &[String]) -> String {
    columns
        .iter()
        .map(|c| dialect.quote_identifier(c))
        .collect::<Vec<_>>()
        .join(", ")
}

/// `"a", "b" DESC`
pub(crate) fn index_columns(dialect: &dyn Dialect, columns: &[IndexColumn]) -> String {
    columns
        .iter()
        .map(|c| {
            let name = dialect.quote_identifier(&c.name);
            if c.descending {
                format!("{} DESC", name)
            } else {
                name
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Constraint without its name: `UNIQUE ("email")`, `CHECK (age > 0)`.
pub(crate) fn constraint_body(dialect: &dyn Dialect, constraint: &Constraint) -> String {
    let columns = column_list(dialect, &constraint.columns);
    match &constraint.kind {
        ConstraintKind::PrimaryKey => format!("PRIMARY KEY ({})", columns),
        ConstraintKind::Unique => format!("UNIQUE ({})", columns),
        ConstraintKind::Check(expr) => format!("CHECK ({})", expr),
        ConstraintKind::ForeignKey(reference) => {
            let mut sql = format!(
                "FOREIGN KEY ({}) REFERENCES {} ({})",
                columns,
                dialect.quote_identifier(&reference.table),
                column_list(dialect, &reference.columns)
            );
            if let Some(action) = reference.on_delete {
                sql.push_str(" ON DELETE ");
                sql.push_str(action.as_sql());
            }
            if let Some(action) = reference.on_update {
                sql.push_str(" ON UPDATE ");
                sql.push_str(action.as_sql());
            }
            sql
        }
    }
}

/// Constraint as it appears in a table body or `ADD` clause.
///
/// Constraints are always named so that later drops can address them.
/// Primary keys are named only where the dialect keeps the name.
pub(crate) fn table_constraint(dialect: &dyn Dialect, table: &str, constraint: &Constraint) -> String {
    let body = constraint_body(dialect, constraint);
    if constraint.is_primary_key() {
        return match &constraint.name {
            Some(name) if dialect.kind() == DialectKind::Postgres => {
                format!("CONSTRAINT {} {}", dialect.quote_identifier(name), body)
            }
            _ => body,
        };
    }
    format!(
        "CONSTRAINT {} {}",
        dialect.quote_identifier(&constraint.effective_name(table)),
        body
    )
}

/// `CREATE TABLE` body lines joined with the standard indentation.
pub(crate) fn table_body(lines: &[String]) -> String {
    format!("(\n    {}\n)", lines.join(",\n    "))
}
