//! Schema diffing.
//!
//! The differ compares a source schema (what the code describes) against a
//! destination schema (what the database has) and produces the ordered
//! operations that turn the destination into the source.

use std::collections::HashSet;

use ddlsync_dialect::Dialect;
use ddlsync_schema::{ColumnType, Constraint, Index, Operation, Schema, Table};
use tracing::{debug, trace};

use crate::emit::MigrationPlan;
use crate::error::{MigrateResult, MigrationError};
use crate::order::creation_order;

/// Computes the operations between two schemas for one dialect.
pub struct SchemaDiffer<'d> {
    dialect: &'d dyn Dialect,
}

impl<'d> SchemaDiffer<'d> {
    /// Create a differ for `dialect`.
    pub fn new(dialect: &'d dyn Dialect) -> Self {
        Self { dialect }
    }

    /// Operations that turn `destination` into `source`.
    ///
    /// Both schemas are first mapped into the dialect's canonical image, so
    /// differences the dialect cannot store (such as `INTEGER` vs `BIGINT`
    /// on Spanner) never show up as changes.
    pub fn diff(&self, source: &Schema, destination: &Schema) -> MigrateResult<MigrationPlan> {
        let source = self.dialect.canonicalize(source)?;
        let destination = self.dialect.canonicalize(destination)?;
        let mut ops = Buckets::default();

        let dropped: HashSet<&str> = destination
            .table_names()
            .filter(|name| !source.has_table(name))
            .collect();
        for table in destination.tables().filter(|t| dropped.contains(t.name())) {
            for fk in table.foreign_keys() {
                let target = fk.reference().map(|r| r.table.as_str());
                if target.is_some_and(|t| t != table.name() && dropped.contains(t)) {
                    ops.fk_drops.push(Operation::DropConstraint {
                        table: table.name().to_string(),
                        constraint: fk.clone(),
                    });
                }
            }
            if !self.dialect.drops_indexes_with_table() {
                ops.drops
                    .extend(table.indexes().iter().map(|index| Operation::DropIndex {
                        table: table.name().to_string(),
                        index: index.clone(),
                    }));
            }
            ops.table_drops.push(Operation::DropTable {
                table: table.name().to_string(),
            });
        }

        for table in source.tables() {
            if let Some(current) = destination.table(table.name()) {
                self.diff_table(current, table, &mut ops)?;
            }
        }

        let created = creation_order(
            source
                .tables()
                .filter(|t| !destination.has_table(t.name()))
                .collect(),
        );
        ops.creates
            .extend(created.tables.into_iter().map(Operation::CreateTable));
        ops.fk_adds.splice(0..0, created.deferred);

        debug!(
            dialect = %self.dialect.kind(),
            created = ops.creates.len(),
            dropped = ops.table_drops.len(),
            "diffed schemas"
        );
        Ok(MigrationPlan::new(ops.into_operations()))
    }

    fn diff_table(&self, from: &Table, to: &Table, ops: &mut Buckets) -> MigrateResult<()> {
        let name = to.name();

        for column in from.columns().filter(|c| !to.has_column(&c.name)) {
            ops.columns.push(Operation::DropColumn {
                table: name.to_string(),
                column: column.name.clone(),
            });
        }

        let mut added = Vec::new();
        for column in to.columns() {
            match from.column(&column.name) {
                None => added.push(Operation::AddColumn {
                    table: name.to_string(),
                    column: column.clone(),
                }),
                Some(current) if !current.same_definition(column) => {
                    if current.ty != column.ty
                        && !self.dialect.supports_type_change(&current.ty, &column.ty)
                    {
                        return Err(MigrationError::column_change(
                            name,
                            &column.name,
                            format!(
                                "{} cannot change the type from {} to {} with a single ALTER",
                                self.dialect.kind(),
                                self.type_name(&current.ty),
                                self.type_name(&column.ty)
                            ),
                        ));
                    }
                    ops.columns.push(Operation::AlterColumnType {
                        table: name.to_string(),
                        from: current.clone(),
                        to: column.clone(),
                    });
                }
                Some(_) => {}
            }
        }
        ops.columns.append(&mut added);

        if from.primary_key_columns() != to.primary_key_columns() {
            if !self.dialect.supports_primary_key_change() {
                return Err(MigrationError::table_change(
                    name,
                    format!(
                        "{} cannot change the primary key of an existing table from {} to {}",
                        self.dialect.kind(),
                        key_columns(from),
                        key_columns(to)
                    ),
                ));
            }
            if let Some(pk) = from.primary_key() {
                ops.drops.push(Operation::DropConstraint {
                    table: name.to_string(),
                    constraint: pk.clone(),
                });
            }
            if let Some(pk) = to.primary_key() {
                ops.adds.push(Operation::AddConstraint {
                    table: name.to_string(),
                    constraint: pk.clone(),
                });
            }
        }

        let (removed, added) =
            unmatched(from.constraints(), to.constraints(), Constraint::structurally_eq);
        for constraint in removed {
            let bucket = if constraint.is_foreign_key() {
                &mut ops.fk_drops
            } else {
                &mut ops.drops
            };
            bucket.push(Operation::DropConstraint {
                table: name.to_string(),
                constraint: constraint.clone(),
            });
        }
        for constraint in added {
            let bucket = if constraint.is_foreign_key() {
                &mut ops.fk_adds
            } else {
                &mut ops.adds
            };
            bucket.push(Operation::AddConstraint {
                table: name.to_string(),
                constraint: constraint.clone(),
            });
        }

        let (removed, added) = unmatched(from.indexes(), to.indexes(), Index::structurally_eq);
        ops.drops.extend(removed.into_iter().map(|index| Operation::DropIndex {
            table: name.to_string(),
            index: index.clone(),
        }));
        ops.adds.extend(added.into_iter().map(|index| Operation::AddIndex {
            table: name.to_string(),
            index: index.clone(),
        }));

        Ok(())
    }

    fn type_name(&self, ty: &ColumnType) -> String {
        self.dialect.type_sql(ty).unwrap_or_else(|_| ty.to_string())
    }
}

/// Operations grouped by their place in the final order.
#[derive(Debug, Default)]
struct Buckets {
    fk_drops: Vec<Operation>,
    drops: Vec<Operation>,
    table_drops: Vec<Operation>,
    columns: Vec<Operation>,
    creates: Vec<Operation>,
    adds: Vec<Operation>,
    fk_adds: Vec<Operation>,
}

impl Buckets {
    /// Foreign key drops, other drops, table drops, column changes, other
    /// additions, table creation, foreign key additions.
    ///
    /// Keys added to existing tables come before new tables, whose inline
    /// foreign keys may reference them.
    fn into_operations(self) -> Vec<Operation> {
        let operations: Vec<Operation> = [
            self.fk_drops,
            self.drops,
            self.table_drops,
            self.columns,
            self.adds,
            self.creates,
            self.fk_adds,
        ]
        .into_iter()
        .flatten()
        .collect();
        for operation in &operations {
            trace!(operation = %operation, "planned");
        }
        operations
    }
}

/// Elements of `old` without a partner in `new`, and the other way round.
/// Each element partners at most one element on the other side.
fn unmatched<'a, T>(
    old: &'a [T],
    new: &'a [T],
    eq: impl Fn(&T, &T) -> bool,
) -> (Vec<&'a T>, Vec<&'a T>) {
    let mut paired = vec![false; new.len()];
    let mut removed = Vec::new();
    for item in old {
        let partner = new
            .iter()
            .enumerate()
            .position(|(i, candidate)| !paired[i] && eq(item, candidate));
        match partner {
            Some(i) => paired[i] = true,
            None => removed.push(item),
        }
    }
    let added = new
        .iter()
        .zip(paired)
        .filter(|(_, paired)| !paired)
        .map(|(item, _)| item)
        .collect();
    (removed, added)
}

/// `(a, b)`, or `none`.
fn key_columns(table: &Table) -> String {
    match table.primary_key_columns() {
        [] => "none".to_string(),
        columns => format!("({})", columns.join(", ")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ddlsync_dialect::{MySql, Postgres, Spanner, dialect};
    use ddlsync_schema::{
        BaseType, Column, DialectKind, OperationKind, Reference, SchemaBuilder, TableBuilder,
    };
    use pretty_assertions::assert_eq;

    fn bigint(name: &str) -> Column {
        Column::new(name, ColumnType::new(BaseType::BigInt))
    }

    fn text(name: &str) -> Column {
        Column::new(name, ColumnType::varchar(255)).nullable(true)
    }

    fn users() -> TableBuilder {
        TableBuilder::new("users")
            .column(bigint("id"))
            .column(text("email"))
            .primary_key(["id"])
    }

    fn build(tables: Vec<TableBuilder>) -> Schema {
        tables
            .into_iter()
            .fold(SchemaBuilder::new(), SchemaBuilder::table)
            .build()
            .unwrap()
    }

    fn diff(kind: DialectKind, source: &Schema, destination: &Schema) -> Vec<Operation> {
        SchemaDiffer::new(dialect(kind))
            .diff(source, destination)
            .unwrap()
            .into_operations()
    }

    fn kinds(operations: &[Operation]) -> Vec<OperationKind> {
        operations.iter().map(Operation::kind).collect()
    }

    /// Applying the plan to the destination, under the dialect's engine
    /// rules, must land on the source.
    fn assert_converges(kind: DialectKind, source: &Schema, destination: &Schema) {
        let d = dialect(kind);
        let operations = diff(kind, source, destination);
        let migrated = d
            .canonicalize(destination)
            .unwrap()
            .apply_with(&operations, d.apply_rules())
            .unwrap();
        assert!(
            migrated.equivalent(&d.canonicalize(source).unwrap()),
            "{} did not converge with {:?}",
            kind,
            operations
        );
    }

    // ==================== Identity Tests ====================

    #[test]
    fn test_identical_schemas_have_no_changes() {
        let schema = build(vec![
            TableBuilder::new("orgs").column(bigint("id")).primary_key(["id"]),
            users()
                .column(bigint("org_id").nullable(true))
                .constraint(Constraint::foreign_key(["org_id"], Reference::new("orgs", ["id"])))
                .index(Index::new("users_email", ["email"]).unique()),
        ]);
        for kind in DialectKind::ALL {
            assert!(diff(kind, &schema, &schema).is_empty(), "{}", kind);
        }
    }

    #[test]
    fn test_declaration_order_is_ignored() {
        let a = build(vec![
            TableBuilder::new("a").column(bigint("id")).primary_key(["id"]),
            users(),
        ]);
        let b = build(vec![
            TableBuilder::new("users")
                .column(text("email"))
                .column(bigint("id"))
                .primary_key(["id"]),
            TableBuilder::new("a").column(bigint("id")).primary_key(["id"]),
        ]);
        for kind in DialectKind::ALL {
            assert!(diff(kind, &a, &b).is_empty(), "{}", kind);
        }
    }

    #[test]
    fn test_constraint_names_are_ignored() {
        let a = build(vec![users().constraint(Constraint::check(["id"], "id > 0"))]);
        let b = build(vec![
            users().constraint(Constraint::check(["id"], "id > 0").named("positive_id")),
        ]);
        assert!(diff(DialectKind::Postgres, &a, &b).is_empty());
    }

    #[test]
    fn test_canonical_image_hides_folded_types() {
        let a = build(vec![
            TableBuilder::new("t")
                .column(Column::new("id", ColumnType::new(BaseType::Integer)))
                .primary_key(["id"]),
        ]);
        let b = build(vec![
            TableBuilder::new("t").column(bigint("id")).primary_key(["id"]),
        ]);
        assert!(SchemaDiffer::new(&Spanner).diff(&b, &a).unwrap().is_empty());
        assert_eq!(
            kinds(&diff(DialectKind::Postgres, &b, &a)),
            [OperationKind::AlterColumnType]
        );
    }

    // ==================== Column Tests ====================

    #[test]
    fn test_extra_source_column_is_added() {
        let source = build(vec![users().column(text("nickname"))]);
        let destination = build(vec![users()]);
        for kind in DialectKind::ALL {
            let operations = diff(kind, &source, &destination);
            assert_eq!(operations.len(), 1, "{}", kind);
            match &operations[0] {
                Operation::AddColumn { table, column } => {
                    assert_eq!(table, "users");
                    assert_eq!(column.name, "nickname");
                }
                other => panic!("unexpected operation {}", other),
            }
            assert_converges(kind, &source, &destination);
        }
    }

    #[test]
    fn test_destination_only_column_is_dropped() {
        let source = build(vec![users()]);
        let destination = build(vec![users().column(text("Legacy"))]);
        for kind in DialectKind::ALL {
            let operations = diff(kind, &source, &destination);
            assert_eq!(
                operations,
                [Operation::DropColumn {
                    table: "users".to_string(),
                    column: "Legacy".to_string(),
                }],
                "{}",
                kind
            );
            assert_converges(kind, &source, &destination);
        }
    }

    #[test]
    fn test_column_changes_order_within_table() {
        let source = build(vec![
            TableBuilder::new("users")
                .column(bigint("id"))
                .column(Column::new("email", ColumnType::varchar(320)))
                .column(text("nickname"))
                .primary_key(["id"]),
        ]);
        let destination = build(vec![users().column(text("legacy"))]);
        let operations = diff(DialectKind::Postgres, &source, &destination);
        assert_eq!(
            kinds(&operations),
            [
                OperationKind::DropColumn,
                OperationKind::AlterColumnType,
                OperationKind::AddColumn
            ]
        );
        assert_converges(DialectKind::Postgres, &source, &destination);
    }

    #[test]
    fn test_unsupported_type_change_is_differ_error() {
        let source = build(vec![
            TableBuilder::new("users")
                .column(bigint("id"))
                .column(Column::new("email", ColumnType::new(BaseType::Integer)))
                .primary_key(["id"]),
        ]);
        let destination = build(vec![users()]);
        for kind in DialectKind::ALL {
            let err = SchemaDiffer::new(dialect(kind))
                .diff(&source, &destination)
                .unwrap_err();
            match err {
                MigrationError::Differ {
                    table,
                    column,
                    message,
                } => {
                    assert_eq!(table, "users");
                    assert_eq!(column.as_deref(), Some("email"));
                    assert!(message.contains("cannot change the type"), "{}", message);
                }
                other => panic!("unexpected error {}", other),
            }
        }
    }

    #[test]
    fn test_widening_is_allowed() {
        let source = build(vec![
            TableBuilder::new("users")
                .column(bigint("id"))
                .column(Column::new("email", ColumnType::varchar(1024)).nullable(true))
                .primary_key(["id"]),
        ]);
        let destination = build(vec![users()]);
        for kind in DialectKind::ALL {
            assert_eq!(
                kinds(&diff(kind, &source, &destination)),
                [OperationKind::AlterColumnType],
                "{}",
                kind
            );
        }
    }

    #[test]
    fn test_type_error_names_native_types() {
        let source = build(vec![
            TableBuilder::new("t")
                .column(Column::new("id", ColumnType::new(BaseType::Integer)))
                .primary_key(["id"]),
        ]);
        let destination = build(vec![
            TableBuilder::new("t").column(bigint("id")).primary_key(["id"]),
        ]);
        let err = SchemaDiffer::new(&Postgres)
            .diff(&source, &destination)
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "cannot migrate `t.id`: postgres cannot change the type from BIGINT to INTEGER with a single ALTER"
        );
    }

    // ==================== Table Tests ====================

    #[test]
    fn test_new_record_type_is_created() {
        let source = build(vec![
            TableBuilder::new("Record")
                .column(bigint("ID"))
                .column(text("Email"))
                .primary_key(["ID"]),
        ]);
        for kind in DialectKind::ALL {
            let operations = diff(kind, &source, &Schema::empty());
            assert_eq!(operations.len(), 1, "{}", kind);
            match &operations[0] {
                Operation::CreateTable(table) => {
                    assert_eq!(table.name(), "Record");
                    assert_eq!(table.column_count(), 2);
                    assert_eq!(table.primary_key_columns(), ["ID".to_string()]);
                }
                other => panic!("unexpected operation {}", other),
            }
        }
    }

    #[test]
    fn test_created_tables_follow_foreign_keys() {
        let source = build(vec![
            TableBuilder::new("posts")
                .column(bigint("id"))
                .column(bigint("author_id"))
                .primary_key(["id"])
                .constraint(Constraint::foreign_key(
                    ["author_id"],
                    Reference::new("users", ["id"]),
                )),
            users(),
        ]);
        for kind in DialectKind::ALL {
            let operations = diff(kind, &source, &Schema::empty());
            let tables: Vec<&str> = operations.iter().map(Operation::table).collect();
            assert_eq!(tables, ["users", "posts"], "{}", kind);
            assert_converges(kind, &source, &Schema::empty());
        }
    }

    #[test]
    fn test_cyclic_foreign_keys_are_trailing() {
        let source = build(vec![
            TableBuilder::new("a")
                .column(bigint("id"))
                .column(bigint("b_id").nullable(true))
                .primary_key(["id"])
                .constraint(Constraint::foreign_key(["b_id"], Reference::new("b", ["id"]))),
            TableBuilder::new("b")
                .column(bigint("id"))
                .column(bigint("a_id").nullable(true))
                .primary_key(["id"])
                .constraint(Constraint::foreign_key(["a_id"], Reference::new("a", ["id"]))),
        ]);
        let operations = diff(DialectKind::Postgres, &source, &Schema::empty());
        assert_eq!(
            kinds(&operations),
            [
                OperationKind::CreateTable,
                OperationKind::CreateTable,
                OperationKind::AddConstraint
            ]
        );
        assert_converges(DialectKind::Postgres, &source, &Schema::empty());
    }

    #[test]
    fn test_foreign_key_dropped_before_referenced_table() {
        let orgs = TableBuilder::new("orgs").column(bigint("id")).primary_key(["id"]);
        let with_fk = users()
            .column(bigint("org_id"))
            .constraint(Constraint::foreign_key(["org_id"], Reference::new("orgs", ["id"])));
        let source = build(vec![users().column(bigint("org_id"))]);
        let destination = build(vec![orgs, with_fk]);

        for kind in DialectKind::ALL {
            let operations = diff(kind, &source, &destination);
            let fk_drop = operations
                .iter()
                .position(|op| matches!(op, Operation::DropConstraint { .. }))
                .unwrap();
            let table_drop = operations
                .iter()
                .position(|op| matches!(op, Operation::DropTable { table } if table == "orgs"))
                .unwrap();
            assert!(fk_drop < table_drop, "{}: {:?}", kind, operations);
            assert_converges(kind, &source, &destination);
        }
    }

    #[test]
    fn test_dropped_tables_referencing_each_other() {
        let parent = TableBuilder::new("parent").column(bigint("id")).primary_key(["id"]);
        let child = TableBuilder::new("child")
            .column(bigint("id"))
            .column(bigint("parent_id"))
            .primary_key(["id"])
            .constraint(Constraint::foreign_key(
                ["parent_id"],
                Reference::new("parent", ["id"]),
            ));
        let destination = build(vec![parent, child]);

        let operations = diff(DialectKind::MySql, &Schema::empty(), &destination);
        assert_eq!(
            kinds(&operations),
            [
                OperationKind::DropConstraint,
                OperationKind::DropTable,
                OperationKind::DropTable
            ]
        );
        assert_converges(DialectKind::MySql, &Schema::empty(), &destination);
    }

    #[test]
    fn test_spanner_drops_indexes_before_table() {
        let destination = Spanner
            .parse(
                "CREATE TABLE t (id INT64, a STRING(10)) PRIMARY KEY (id);\n\
                 CREATE INDEX ta ON t (a);",
            )
            .unwrap();

        let operations = diff(DialectKind::Spanner, &Schema::empty(), &destination);
        assert_eq!(
            kinds(&operations),
            [OperationKind::DropIndex, OperationKind::DropTable]
        );
        assert_eq!(
            Spanner.print_operations(&operations).unwrap(),
            ["DROP INDEX ta".to_string(), "DROP TABLE t".to_string()]
        );
        assert_converges(DialectKind::Spanner, &Schema::empty(), &destination);
    }

    #[test]
    fn test_unique_constraint_dropped_as_index_with_spanner_table() {
        let destination = build(vec![users().constraint(Constraint::unique(["email"]))]);

        let operations = diff(DialectKind::Spanner, &Schema::empty(), &destination);
        assert_eq!(
            kinds(&operations),
            [OperationKind::DropIndex, OperationKind::DropTable]
        );
        assert_converges(DialectKind::Spanner, &Schema::empty(), &destination);

        let operations = diff(DialectKind::Postgres, &Schema::empty(), &destination);
        assert_eq!(kinds(&operations), [OperationKind::DropTable]);
        assert_converges(DialectKind::Postgres, &Schema::empty(), &destination);
    }

    // ==================== Constraint and Index Tests ====================

    #[test]
    fn test_changed_index_is_dropped_and_added() {
        let source = build(vec![users().index(Index::new("users_email", ["email"]).unique())]);
        let destination = build(vec![users().index(Index::new("users_email", ["email"]))]);
        for kind in [DialectKind::Postgres, DialectKind::Spanner] {
            let operations = diff(kind, &source, &destination);
            assert_eq!(
                kinds(&operations),
                [OperationKind::DropIndex, OperationKind::AddIndex],
                "{}",
                kind
            );
            assert_converges(kind, &source, &destination);
        }
    }

    #[test]
    fn test_mysql_unique_index_becomes_constraint() {
        let source = build(vec![users().index(Index::new("users_email", ["email"]).unique())]);
        let destination = build(vec![users()]);
        let operations = SchemaDiffer::new(&MySql)
            .diff(&source, &destination)
            .unwrap()
            .into_operations();
        assert_eq!(kinds(&operations), [OperationKind::AddConstraint]);
    }

    #[test]
    fn test_new_column_before_its_index() {
        let source = build(vec![
            users()
                .column(text("nickname"))
                .index(Index::new("users_nickname", ["nickname"])),
        ]);
        let destination = build(vec![users()]);
        for kind in DialectKind::ALL {
            assert_eq!(
                kinds(&diff(kind, &source, &destination)),
                [OperationKind::AddColumn, OperationKind::AddIndex],
                "{}",
                kind
            );
            assert_converges(kind, &source, &destination);
        }
    }

    #[test]
    fn test_foreign_key_added_after_new_table() {
        let source = build(vec![
            TableBuilder::new("orgs").column(bigint("id")).primary_key(["id"]),
            users()
                .column(bigint("org_id").nullable(true))
                .constraint(Constraint::foreign_key(["org_id"], Reference::new("orgs", ["id"]))),
        ]);
        let destination = build(vec![users()]);
        for kind in DialectKind::ALL {
            assert_eq!(
                kinds(&diff(kind, &source, &destination)),
                [
                    OperationKind::AddColumn,
                    OperationKind::CreateTable,
                    OperationKind::AddConstraint
                ],
                "{}",
                kind
            );
            assert_converges(kind, &source, &destination);
        }
    }

    #[test]
    fn test_key_added_before_table_referencing_it() {
        let parent = || {
            TableBuilder::new("p")
                .column(bigint("id"))
                .column(text("code"))
                .primary_key(["id"])
        };
        let source = build(vec![
            parent().constraint(Constraint::unique(["code"])),
            TableBuilder::new("c")
                .column(bigint("id"))
                .column(text("pc"))
                .primary_key(["id"])
                .constraint(Constraint::foreign_key(["pc"], Reference::new("p", ["code"]))),
        ]);
        let destination = build(vec![parent()]);

        for (kind, key) in [
            (DialectKind::Postgres, OperationKind::AddConstraint),
            (DialectKind::MySql, OperationKind::AddConstraint),
            (DialectKind::Spanner, OperationKind::AddIndex),
        ] {
            assert_eq!(
                kinds(&diff(kind, &source, &destination)),
                [key, OperationKind::CreateTable],
                "{}",
                kind
            );
            assert_converges(kind, &source, &destination);
        }
    }

    #[test]
    fn test_primary_key_change() {
        let source = build(vec![
            TableBuilder::new("users")
                .column(bigint("id"))
                .column(Column::new("email", ColumnType::varchar(255)))
                .primary_key(["id", "email"]),
        ]);
        let destination = build(vec![
            TableBuilder::new("users")
                .column(bigint("id"))
                .column(Column::new("email", ColumnType::varchar(255)))
                .primary_key(["id"]),
        ]);

        let operations = diff(DialectKind::Postgres, &source, &destination);
        assert_eq!(
            kinds(&operations),
            [OperationKind::DropConstraint, OperationKind::AddConstraint]
        );
        assert_converges(DialectKind::Postgres, &source, &destination);

        let err = SchemaDiffer::new(&Spanner)
            .diff(&source, &destination)
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "cannot migrate `users`: spanner cannot change the primary key of an existing table from (id) to (id, email)"
        );
    }

    #[test]
    fn test_unmatched_pairs_each_element_once() {
        let (removed, added) = unmatched(&[1, 1, 2], &[1, 3], |a: &i32, b: &i32| a == b);
        assert_eq!(removed, [&1, &2]);
        assert_eq!(added, [&3]);
    }
}
