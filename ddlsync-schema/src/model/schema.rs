//! Schema snapshots.

use indexmap::IndexMap;
use serde::Serialize;
use tracing::debug;

use super::{Column, Table, TableBuilder};
use crate::error::{SchemaError, SchemaResult};

/// A validated, immutable canonical schema.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Schema {
    tables: IndexMap<String, Table>,
}

impl Schema {
    /// An empty schema.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Tables ordered by ordinal.
    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.tables.values()
    }

    /// Look up a table by name.
    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.get(name)
    }

    /// Check if a table exists.
    pub fn has_table(&self, name: &str) -> bool {
        self.tables.contains_key(name)
    }

    /// Table names ordered by ordinal.
    pub fn table_names(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }

    /// Number of tables.
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    /// Check if the schema has no tables.
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Reopen the schema for modification.
    pub fn to_builder(&self) -> SchemaBuilder {
        SchemaBuilder {
            tables: self.tables.values().map(Table::to_builder).collect(),
        }
    }

    /// Build a new schema with every column passed through `f`.
    pub fn map_columns<F>(&self, mut f: F) -> SchemaResult<Schema>
    where
        F: FnMut(&Table, &Column) -> SchemaResult<Column>,
    {
        let mut builder = SchemaBuilder::new();
        for table in self.tables.values() {
            let mut tb = table.to_builder();
            for column in table.columns() {
                tb.replace_column(f(table, column)?);
            }
            builder.add_table(tb);
        }
        builder.build()
    }

    /// Semantic equality, insensitive to declaration order and constraint names.
    pub fn equivalent(&self, other: &Schema) -> bool {
        self.tables.len() == other.tables.len()
            && self
                .tables
                .values()
                .all(|t| other.table(t.name()).is_some_and(|o| t.equivalent(o)))
    }
}

/// Builder for [`Schema`].
#[derive(Debug, Clone, Default)]
pub struct SchemaBuilder {
    tables: Vec<TableBuilder>,
}

impl SchemaBuilder {
    /// Start an empty schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a table.
    pub fn table(mut self, table: TableBuilder) -> Self {
        self.add_table(table);
        self
    }

    /// Add a table in place.
    pub fn add_table(&mut self, table: TableBuilder) {
        self.tables.push(table);
    }

    /// Check if a table has been added.
    pub fn has_table(&self, name: &str) -> bool {
        self.tables.iter().any(|t| t.name() == name)
    }

    /// Mutable access to a table that has been added.
    pub fn table_mut(&mut self, name: &str) -> Option<&mut TableBuilder> {
        self.tables.iter_mut().find(|t| t.name() == name)
    }

    /// Remove a table by name.
    pub fn remove_table(&mut self, name: &str) -> bool {
        let before = self.tables.len();
        self.tables.retain(|t| t.name() != name);
        self.tables.len() != before
    }

    /// Largest ordinal in use, counting insertion positions.
    pub fn next_ordinal(&self) -> usize {
        self.tables
            .iter()
            .enumerate()
            .map(|(i, t)| t.fixed_ordinal().unwrap_or(i) + 1)
            .max()
            .unwrap_or(0)
    }

    /// Validate and build the schema.
    pub fn build(self) -> SchemaResult<Schema> {
        let mut built = Vec::with_capacity(self.tables.len());
        for (position, table) in self.tables.into_iter().enumerate() {
            if built.iter().any(|t: &Table| t.name() == table.name()) {
                let name = table.name().to_string();
                return Err(SchemaError::validation(name, "duplicate table"));
            }
            built.push(table.build(position)?);
        }
        built.sort_by_key(Table::ordinal);

        let tables: IndexMap<String, Table> = built
            .into_iter()
            .map(|t| (t.name().to_string(), t))
            .collect();

        for table in tables.values() {
            for fk in table.foreign_keys() {
                let Some(reference) = fk.reference() else {
                    continue;
                };
                let Some(target) = tables.get(&reference.table) else {
                    return Err(SchemaError::validation(
                        table.name(),
                        format!("foreign key references unknown table `{}`", reference.table),
                    ));
                };
                if let Some(missing) = reference.columns.iter().find(|c| !target.has_column(c)) {
                    return Err(SchemaError::validation(
                        table.name(),
                        format!(
                            "foreign key references unknown column `{}.{}`",
                            reference.table, missing
                        ),
                    ));
                }
            }
        }

        debug!(tables = tables.len(), "built schema");
        Ok(Schema { tables })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BaseType, ColumnType, Constraint, Reference};
    use pretty_assertions::assert_eq;

    fn bigint(name: &str) -> Column {
        Column::new(name, ColumnType::new(BaseType::BigInt))
    }

    fn orgs() -> TableBuilder {
        TableBuilder::new("orgs").column(bigint("id")).primary_key(["id"])
    }

    fn users() -> TableBuilder {
        TableBuilder::new("users")
            .column(bigint("id"))
            .column(bigint("org_id"))
            .primary_key(["id"])
            .constraint(Constraint::foreign_key(
                ["org_id"],
                Reference::new("orgs", ["id"]),
            ))
    }

    #[test]
    fn test_build_schema() {
        let schema = SchemaBuilder::new().table(orgs()).table(users()).build().unwrap();
        assert_eq!(schema.len(), 2);
        assert_eq!(schema.table_names().collect::<Vec<_>>(), vec!["orgs", "users"]);
        assert_eq!(schema.table("users").unwrap().ordinal(), 1);
        assert!(schema.has_table("orgs"));
    }

    #[test]
    fn test_duplicate_table() {
        let err = SchemaBuilder::new().table(orgs()).table(orgs()).build().unwrap_err();
        assert_eq!(err.to_string(), "invalid table `orgs`: duplicate table");
    }

    #[test]
    fn test_dangling_foreign_key_table() {
        let err = SchemaBuilder::new().table(users()).build().unwrap_err();
        assert!(err.to_string().contains("unknown table `orgs`"));
    }

    #[test]
    fn test_dangling_foreign_key_column() {
        let orgs = TableBuilder::new("orgs").column(bigint("org_id"));
        let err = SchemaBuilder::new().table(orgs).table(users()).build().unwrap_err();
        assert!(err.to_string().contains("unknown column `orgs.id`"));
    }

    #[test]
    fn test_ordinal_order() {
        let schema = SchemaBuilder::new()
            .table(users().ordinal(10))
            .table(orgs().ordinal(2))
            .build()
            .unwrap();
        assert_eq!(schema.table_names().collect::<Vec<_>>(), vec!["orgs", "users"]);
    }

    #[test]
    fn test_map_columns() {
        let schema = SchemaBuilder::new().table(orgs()).build().unwrap();
        let mapped = schema
            .map_columns(|_, col| Ok(col.clone().default_value("0")))
            .unwrap();
        assert_eq!(
            mapped.table("orgs").unwrap().column("id").unwrap().default.as_deref(),
            Some("0")
        );
        // The original is untouched.
        assert!(schema.table("orgs").unwrap().column("id").unwrap().default.is_none());
    }

    #[test]
    fn test_equivalent_ignores_table_order() {
        let a = SchemaBuilder::new().table(orgs()).table(users()).build().unwrap();
        let b = SchemaBuilder::new()
            .table(users().ordinal(0))
            .table(orgs().ordinal(1))
            .build()
            .unwrap();
        assert!(a.equivalent(&b));
        assert!(!a.equivalent(&Schema::empty()));
    }

    #[test]
    fn test_to_builder_round_trip() {
        let schema = SchemaBuilder::new().table(orgs()).table(users()).build().unwrap();
        let rebuilt = schema.to_builder().build().unwrap();
        assert_eq!(schema, rebuilt);
    }

    #[test]
    fn test_next_ordinal() {
        let builder = SchemaBuilder::new().table(orgs().ordinal(7)).table(users());
        assert_eq!(builder.next_ordinal(), 8);
        assert_eq!(SchemaBuilder::new().next_ordinal(), 0);
    }
}
