//! Cloud Spanner (GoogleSQL).
//!
//! Spanner declares the primary key after the column list, has no unique
//! constraints (uniqueness lives in unique indexes) and cannot change a
//! table's primary key once created.

use ddlsync_schema::{
    BaseType, Column, ColumnFragment, ColumnType, Constraint, ConstraintKind, DialectKind,
    FragmentParser, Index, Length, Operation, ReferentialAction, Schema, SchemaError, SchemaResult,
    Table, TypeFamily,
};

use crate::dialect::{self, Dialect, NativeType, TypeArg};
use crate::parser;
use crate::printer;

/// GoogleSQL reserved keywords. Identifiers matching one are quoted.
const RESERVED: &[&str] = &[
    "ALL", "AND", "ANY", "ARRAY", "AS", "ASC", "ASSERT_ROWS_MODIFIED", "AT", "BETWEEN", "BY",
    "CASE", "CAST", "COLLATE", "CONTAINS", "CREATE", "CROSS", "CUBE", "CURRENT", "DEFAULT",
    "DEFINE", "DESC", "DISTINCT", "ELSE", "END", "ENUM", "ESCAPE", "EXCEPT", "EXCLUDE", "EXISTS",
    "EXTRACT", "FALSE", "FETCH", "FOLLOWING", "FOR", "FROM", "FULL", "GROUP", "GROUPING", "GROUPS",
    "HASH", "HAVING", "IF", "IGNORE", "IN", "INNER", "INTERSECT", "INTERVAL", "INTO", "IS", "JOIN",
    "LATERAL", "LEFT", "LIKE", "LIMIT", "LOOKUP", "MERGE", "NATURAL", "NEW", "NO", "NOT", "NULL",
    "NULLS", "OF", "ON", "OR", "ORDER", "OUTER", "OVER", "PARTITION", "PRECEDING", "PROTO",
    "RANGE", "RECURSIVE", "RESPECT", "RIGHT", "ROLLUP", "ROWS", "SELECT", "SET", "SOME", "STRUCT",
    "TABLESAMPLE", "THEN", "TO", "TREAT", "TRUE", "UNBOUNDED", "UNION", "UNNEST", "USING", "WHEN",
    "WHERE", "WINDOW", "WITH", "WITHIN",
];

/// The Cloud Spanner dialect.
#[derive(Debug, Clone, Copy, Default)]
pub struct Spanner;

impl Spanner {
    fn create_table(&self, table: &Table) -> SchemaResult<Vec<String>> {
        let mut lines = Vec::new();
        for column in table.columns() {
            lines.push(self.column_definition(column)?);
        }
        for constraint in table.constraints() {
            lines.push(printer::table_constraint(self, table.name(), constraint));
        }

        let mut statements = vec![format!(
            "CREATE TABLE {} {} PRIMARY KEY ({})",
            self.quote_identifier(table.name()),
            printer::table_body(&lines),
            printer::column_list(self, table.primary_key_columns())
        )];
        for index in table.indexes() {
            statements.push(self.create_index(table.name(), index));
        }
        Ok(statements)
    }

    fn column_definition(&self, column: &Column) -> SchemaResult<String> {
        let name = self.quote_identifier(&column.name);
        if let Some(raw) = &column.raw_definition {
            return Ok(format!("{} {}", name, raw));
        }

        let mut sql = format!("{} {}", name, self.type_sql(&column.ty)?);
        if !column.nullable {
            sql.push_str(" NOT NULL");
        }
        if let Some(default) = &column.default {
            sql.push_str(&format!(" DEFAULT ({})", default));
        }
        Ok(sql)
    }

    /// A default-only change uses `SET DEFAULT`/`DROP DEFAULT`; anything
    /// else restates the column.
    fn alter_column(&self, table: &str, from: &Column, to: &Column) -> SchemaResult<String> {
        let prefix = format!("ALTER TABLE {} ALTER COLUMN", self.quote_identifier(table));
        let default_only = from.ty == to.ty
            && from.nullable == to.nullable
            && from.raw_definition == to.raw_definition;
        if default_only {
            let column = self.quote_identifier(&to.name);
            return Ok(match &to.default {
                Some(default) => format!("{} {} SET DEFAULT ({})", prefix, column, default),
                None => format!("{} {} DROP DEFAULT", prefix, column),
            });
        }
        Ok(format!("{} {}", prefix, self.column_definition(to)?))
    }

    fn create_index(&self, table: &str, index: &Index) -> String {
        let unique = if index.unique { "UNIQUE " } else { "" };
        format!(
            "CREATE {}INDEX {} ON {} ({})",
            unique,
            self.quote_identifier(&index.name),
            self.quote_identifier(table),
            printer::index_columns(self, &index.columns)
        )
    }

    fn unsupported(&self, construct: impl Into<String>) -> SchemaError {
        SchemaError::unsupported(DialectKind::Spanner, construct)
    }
}

fn is_simple_identifier(ident: &str) -> bool {
    let mut chars = ident.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

impl FragmentParser for Spanner {
    fn dialect_kind(&self) -> DialectKind {
        DialectKind::Spanner
    }

    fn parse_column_fragment(&self, fragment: &str) -> SchemaResult<ColumnFragment> {
        parser::parse_column_fragment(self, fragment)
    }

    fn parse_index_statement(&self, statement: &str) -> SchemaResult<(String, Index)> {
        parser::parse_index_statement(self, statement)
    }

    fn parse_table_constraint(&self, fragment: &str) -> SchemaResult<Constraint> {
        parser::parse_table_constraint(self, fragment)
    }
}

impl Dialect for Spanner {
    fn kind(&self) -> DialectKind {
        DialectKind::Spanner
    }

    fn as_fragment_parser(&self) -> &dyn FragmentParser {
        self
    }

    fn parse(&self, ddl: &str) -> SchemaResult<Schema> {
        parser::parse_ddl(self, ddl)
    }

    fn render_operation(&self, operation: &Operation) -> SchemaResult<Vec<String>> {
        let statement = match operation {
            Operation::CreateTable(table) => return self.create_table(table),
            Operation::DropTable { table } => {
                format!("DROP TABLE {}", self.quote_identifier(table))
            }
            Operation::AddColumn { table, column } => format!(
                "ALTER TABLE {} ADD COLUMN {}",
                self.quote_identifier(table),
                self.column_definition(column)?
            ),
            Operation::DropColumn { table, column } => format!(
                "ALTER TABLE {} DROP COLUMN {}",
                self.quote_identifier(table),
                self.quote_identifier(column)
            ),
            Operation::AlterColumnType { table, from, to } => self.alter_column(table, from, to)?,
            Operation::AddConstraint { constraint, .. } if constraint.is_primary_key() => {
                return Err(self.unsupported("adding a primary key"));
            }
            Operation::AddConstraint { table, constraint } => format!(
                "ALTER TABLE {} ADD {}",
                self.quote_identifier(table),
                printer::table_constraint(self, table, constraint)
            ),
            Operation::DropConstraint { constraint, .. } if constraint.is_primary_key() => {
                return Err(self.unsupported("dropping a primary key"));
            }
            Operation::DropConstraint { table, constraint } => format!(
                "ALTER TABLE {} DROP CONSTRAINT {}",
                self.quote_identifier(table),
                self.quote_identifier(&constraint.effective_name(table))
            ),
            Operation::AddIndex { table, index } => self.create_index(table, index),
            Operation::DropIndex { index, .. } => {
                format!("DROP INDEX {}", self.quote_identifier(&index.name))
            }
        };
        Ok(vec![statement])
    }

    fn normalize_type(&self, native: &NativeType) -> SchemaResult<ColumnType> {
        let unsupported = || self.unsupported(format!("type {}", native));
        if native.unsigned || native.time_zone.is_some() {
            return Err(unsupported());
        }
        if native.array_depth > 1 {
            return Err(self.unsupported(format!("nested array type {}", native)));
        }

        let plain = |base: BaseType| {
            if native.args.is_empty() {
                Ok(ColumnType::new(base))
            } else {
                Err(unsupported())
            }
        };
        let ty = match native.name.as_str() {
            "BOOL" => plain(BaseType::Boolean)?,
            "INT64" => plain(BaseType::BigInt)?,
            "FLOAT32" => plain(BaseType::Real)?,
            "FLOAT64" => plain(BaseType::Double)?,
            "NUMERIC" => plain(BaseType::Decimal)?,
            "STRING" => match native.args.as_slice() {
                [TypeArg::Number(n)] => ColumnType::varchar(*n),
                [TypeArg::Max] => ColumnType::new(BaseType::Text),
                _ => return Err(unsupported()),
            },
            "BYTES" => match native.args.as_slice() {
                [arg] => match dialect::length_arg(Some(arg)) {
                    Some(length) => ColumnType::new(BaseType::Bytes).with_length(length),
                    None => return Err(unsupported()),
                },
                _ => return Err(unsupported()),
            },
            "DATE" => plain(BaseType::Date)?,
            "TIMESTAMP" => plain(BaseType::TimestampTz)?,
            "JSON" => plain(BaseType::Json)?,
            _ => return Err(unsupported()),
        };

        Ok(if native.array_depth == 1 { ty.array() } else { ty })
    }

    fn denormalize_type(&self, ty: &ColumnType) -> SchemaResult<NativeType> {
        let string = |n: u32| NativeType::new("STRING").num(n);
        let native = match ty.base {
            BaseType::Boolean => NativeType::new("BOOL"),
            BaseType::SmallInt | BaseType::Integer | BaseType::BigInt => NativeType::new("INT64"),
            BaseType::Real => NativeType::new("FLOAT32"),
            BaseType::Double => NativeType::new("FLOAT64"),
            BaseType::Decimal => NativeType::new("NUMERIC"),
            BaseType::Char | BaseType::Varchar => match ty.length {
                Some(Length::Fixed(n)) => string(n),
                None if ty.base == BaseType::Char => string(1),
                _ => NativeType::new("STRING").arg(TypeArg::Max),
            },
            BaseType::Text => NativeType::new("STRING").arg(TypeArg::Max),
            BaseType::Bytes => match ty.length {
                Some(Length::Fixed(n)) => NativeType::new("BYTES").num(n),
                _ => NativeType::new("BYTES").arg(TypeArg::Max),
            },
            BaseType::Date => NativeType::new("DATE"),
            BaseType::Time => return Err(self.unsupported("TIME type")),
            BaseType::Timestamp | BaseType::TimestampTz => NativeType::new("TIMESTAMP"),
            BaseType::Json | BaseType::Jsonb => NativeType::new("JSON"),
            BaseType::Uuid => string(36),
        };
        Ok(if ty.array { native.array() } else { native })
    }

    fn type_sql(&self, ty: &ColumnType) -> SchemaResult<String> {
        let native = self.denormalize_type(ty)?;
        if native.array_depth > 0 {
            Ok(format!("ARRAY<{}>", native.scalar_sql()))
        } else {
            Ok(native.scalar_sql())
        }
    }

    fn quote_identifier(&self, ident: &str) -> String {
        let reserved = RESERVED.iter().any(|k| k.eq_ignore_ascii_case(ident));
        if is_simple_identifier(ident) && !reserved {
            ident.to_string()
        } else {
            format!("`{}`", ident.replace('`', "``"))
        }
    }

    fn supports_type_change(&self, from: &ColumnType, to: &ColumnType) -> bool {
        if from == to {
            return true;
        }
        if from.array != to.array {
            return false;
        }
        let (from_family, to_family) = (from.base.family(), to.base.family());
        let stringish = |f: TypeFamily| matches!(f, TypeFamily::String | TypeFamily::Bytes);
        if from_family == to_family && stringish(from_family) {
            // Lengths may only grow.
            return length_rank(to) >= length_rank(from);
        }
        stringish(from_family) && stringish(to_family)
    }

    fn supports_primary_key_change(&self) -> bool {
        false
    }

    fn drops_indexes_with_table(&self) -> bool {
        false
    }

    fn check_table(&self, table: &Table) -> SchemaResult<()> {
        for constraint in table.constraints() {
            match &constraint.kind {
                ConstraintKind::Unique => return Err(self.unsupported("UNIQUE constraint")),
                ConstraintKind::ForeignKey(reference) => {
                    if reference.on_update.is_some() {
                        return Err(self.unsupported("ON UPDATE foreign key action"));
                    }
                    match reference.on_delete {
                        None | Some(ReferentialAction::Cascade) | Some(ReferentialAction::NoAction) => {}
                        Some(action) => {
                            return Err(self.unsupported(format!("ON DELETE {}", action.as_sql())));
                        }
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn check_column(&self, _table: &Table, column: &Column) -> SchemaResult<()> {
        if column.auto_increment {
            return Err(self.unsupported("auto-increment column"));
        }
        Ok(())
    }

    /// Unique constraints become unique indexes named after the constraint.
    fn canonicalize(&self, schema: &Schema) -> SchemaResult<Schema> {
        let mut builder = schema.to_builder();
        for table in schema.tables() {
            let Some(target) = builder.table_mut(table.name()) else {
                continue;
            };
            for constraint in table.constraints() {
                if constraint.kind == ConstraintKind::Unique {
                    target.remove_constraint(constraint);
                    target.add_index(
                        Index::new(constraint.effective_name(table.name()), &constraint.columns)
                            .unique(),
                    );
                }
            }
        }
        dialect::canonical_columns(self, &builder.build()?)
    }
}

/// Orders lengths so that `MAX` and unbounded sort above any fixed length.
fn length_rank(ty: &ColumnType) -> u64 {
    match ty.length {
        Some(Length::Fixed(n)) => u64::from(n),
        Some(Length::Max) | None => u64::MAX,
    }
}
