//! Creation order for new tables.

use std::collections::HashSet;

use ddlsync_schema::{Constraint, Operation, Table};
use tracing::debug;

/// New tables in creation order, plus the foreign keys that had to be split
/// out of them to break cycles.
#[derive(Debug, Default)]
pub(crate) struct CreationOrder {
    pub tables: Vec<Table>,
    pub deferred: Vec<Operation>,
}

/// Order `tables` so each one comes after the tables its foreign keys point at.
///
/// Tables are scheduled in repeated passes over the input, so independent
/// tables keep their input order. Self-references and references to tables
/// outside `tables` impose no order. When a pass schedules nothing, the
/// first remaining table is created without its blocking foreign keys, and
/// those come back as `AddConstraint` operations.
pub(crate) fn creation_order(tables: Vec<&Table>) -> CreationOrder {
    let new_tables: HashSet<&str> = tables.iter().map(|t| t.name()).collect();
    let mut created: HashSet<&str> = HashSet::with_capacity(tables.len());
    let mut remaining = tables;
    let mut order = CreationOrder::default();

    while !remaining.is_empty() {
        let before = remaining.len();
        let mut waiting = Vec::with_capacity(before);
        for table in remaining {
            let blocked = table
                .foreign_keys()
                .any(|fk| blocks(fk, table.name(), &new_tables, &created));
            if blocked {
                waiting.push(table);
            } else {
                created.insert(table.name());
                order.tables.push(table.clone());
            }
        }
        remaining = waiting;

        if remaining.is_empty() || remaining.len() < before {
            continue;
        }

        let table = remaining.remove(0);
        let split: Vec<Constraint> = table
            .foreign_keys()
            .filter(|fk| blocks(fk, table.name(), &new_tables, &created))
            .cloned()
            .collect();
        debug!(
            table = table.name(),
            foreign_keys = split.len(),
            "breaking foreign key cycle"
        );

        order
            .tables
            .push(table.retain_constraints(|c| !split.iter().any(|fk| fk.structurally_eq(c))));
        order
            .deferred
            .extend(split.into_iter().map(|constraint| Operation::AddConstraint {
                table: table.name().to_string(),
                constraint,
            }));
        created.insert(table.name());
    }

    order
}

/// Does `fk` point at a new table other than `own` that does not exist yet?
fn blocks(fk: &Constraint, own: &str, new_tables: &HashSet<&str>, created: &HashSet<&str>) -> bool {
    fk.reference().is_some_and(|r| {
        r.table != own
            && new_tables.contains(r.table.as_str())
            && !created.contains(r.table.as_str())
    })
}
