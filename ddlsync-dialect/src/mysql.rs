//! MySQL (and MariaDB).
//!
//! The parser reads `SHOW CREATE TABLE` / `mysqldump` output. Identifiers
//! are case-sensitive and backtick-quoted. A unique index and a unique key
//! are the same object in MySQL, so ascending unique indexes fold into
//! unique constraints in the canonical image.

use ddlsync_schema::{
    BaseType, Column, ColumnFragment, ColumnType, Constraint, ConstraintKind, DialectKind,
    FragmentParser, Index, Length, Operation, Schema, SchemaError, SchemaResult, Table, TypeFamily,
};

use crate::defaults;
use crate::dialect::{self, Dialect, NativeType, TypeArg};
use crate::parser;
use crate::printer;

/// Table options written when a table carries none.
const DEFAULT_TABLE_OPTIONS: &str = "ENGINE=InnoDB DEFAULT CHARSET=utf8mb4";

/// The MySQL dialect.
#[derive(Debug, Clone, Copy, Default)]
pub struct MySql;

impl MySql {
    fn create_table(&self, table: &Table) -> SchemaResult<Vec<String>> {
        let mut lines = Vec::new();
        for column in table.columns() {
            lines.push(self.column_definition(column)?);
        }
        if let Some(pk) = table.primary_key() {
            lines.push(printer::table_constraint(self, table.name(), pk));
        }
        for constraint in table.constraints() {
            lines.push(printer::table_constraint(self, table.name(), constraint));
        }
        for index in table.indexes().iter().filter(|i| !i.unique) {
            lines.push(format!(
                "KEY {} ({})",
                self.quote_identifier(&index.name),
                printer::index_columns(self, &index.columns)
            ));
        }

        let options = if table.options().is_empty() {
            DEFAULT_TABLE_OPTIONS.to_string()
        } else {
            table
                .options()
                .iter()
                .map(|(key, value)| format!("{}={}", key, value))
                .collect::<Vec<_>>()
                .join(" ")
        };

        let mut statements = vec![format!(
            "CREATE TABLE {} {} {}",
            self.quote_identifier(table.name()),
            printer::table_body(&lines),
            options
        )];
        for index in table.indexes().iter().filter(|i| i.unique) {
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
            if defaults::is_literal(default) {
                sql.push_str(&format!(" DEFAULT {}", default));
            } else {
                sql.push_str(&format!(" DEFAULT ({})", default));
            }
        }
        if column.auto_increment {
            sql.push_str(" AUTO_INCREMENT");
        }
        Ok(sql)
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

    fn drop_constraint(&self, table: &str, constraint: &Constraint) -> String {
        let name = self.quote_identifier(&constraint.effective_name(table));
        let action = match constraint.kind {
            ConstraintKind::PrimaryKey => "DROP PRIMARY KEY".to_string(),
            ConstraintKind::ForeignKey(_) => format!("DROP FOREIGN KEY {}", name),
            ConstraintKind::Unique => format!("DROP INDEX {}", name),
            ConstraintKind::Check(_) => format!("DROP CHECK {}", name),
        };
        format!("ALTER TABLE {} {}", self.quote_identifier(table), action)
    }
}

impl FragmentParser for MySql {
    fn dialect_kind(&self) -> DialectKind {
        DialectKind::MySql
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

impl Dialect for MySql {
    fn kind(&self) -> DialectKind {
        DialectKind::MySql
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
            Operation::AlterColumnType { table, to, .. } => format!(
                "ALTER TABLE {} MODIFY COLUMN {}",
                self.quote_identifier(table),
                self.column_definition(to)?
            ),
            Operation::AddConstraint { table, constraint } => format!(
                "ALTER TABLE {} ADD {}",
                self.quote_identifier(table),
                printer::table_constraint(self, table, constraint)
            ),
            Operation::DropConstraint { table, constraint } => {
                self.drop_constraint(table, constraint)
            }
            Operation::AddIndex { table, index } => self.create_index(table, index),
            Operation::DropIndex { table, index } => format!(
                "DROP INDEX {} ON {}",
                self.quote_identifier(&index.name),
                self.quote_identifier(table)
            ),
        };
        Ok(vec![statement])
    }

    fn normalize_type(&self, native: &NativeType) -> SchemaResult<ColumnType> {
        let unsupported = || SchemaError::unsupported(DialectKind::MySql, format!("type {}", native));
        if native.array_depth > 0 {
            return Err(SchemaError::unsupported(
                DialectKind::MySql,
                format!("array type {}", native),
            ));
        }
        if native.unsigned {
            return Err(SchemaError::unsupported(
                DialectKind::MySql,
                format!("unsigned type {}", native),
            ));
        }

        let plain = |base: BaseType| {
            if native.args.is_empty() {
                Ok(ColumnType::new(base))
            } else {
                Err(unsupported())
            }
        };
        // Integer display widths carry no meaning.
        let integer = |base: BaseType| match native.args.as_slice() {
            [] | [TypeArg::Number(_)] => Ok(ColumnType::new(base)),
            _ => Err(unsupported()),
        };

        let ty = match native.name.as_str() {
            "TINYINT" if native.args == [TypeArg::Number(1)] => ColumnType::new(BaseType::Boolean),
            "BOOL" | "BOOLEAN" => plain(BaseType::Boolean)?,
            "SMALLINT" => integer(BaseType::SmallInt)?,
            "INT" | "INTEGER" => integer(BaseType::Integer)?,
            "BIGINT" => integer(BaseType::BigInt)?,
            "FLOAT" => match native.args.as_slice() {
                [] => ColumnType::new(BaseType::Real),
                [TypeArg::Number(p)] if *p <= 24 => ColumnType::new(BaseType::Real),
                [TypeArg::Number(_)] => ColumnType::new(BaseType::Double),
                _ => return Err(unsupported()),
            },
            "DOUBLE" | "DOUBLE PRECISION" | "REAL" => plain(BaseType::Double)?,
            "DECIMAL" | "NUMERIC" | "DEC" | "FIXED" => match native.args.as_slice() {
                [] => ColumnType::decimal(10, 0),
                [TypeArg::Number(p)] => ColumnType::decimal(*p, 0),
                [TypeArg::Number(p), TypeArg::Number(s)] => ColumnType::decimal(*p, *s),
                _ => return Err(unsupported()),
            },
            "CHAR" => match native.args.as_slice() {
                [] => ColumnType::new(BaseType::Char).with_length(Length::Fixed(1)),
                [TypeArg::Number(n)] => ColumnType::new(BaseType::Char).with_length(Length::Fixed(*n)),
                _ => return Err(unsupported()),
            },
            "VARCHAR" => match native.args.as_slice() {
                [TypeArg::Number(n)] => ColumnType::varchar(*n),
                _ => return Err(unsupported()),
            },
            "TEXT" => plain(BaseType::Text)?,
            "BLOB" => plain(BaseType::Bytes)?,
            "VARBINARY" => match dialect::length_arg(native.args.first()) {
                Some(Length::Fixed(n)) if native.args.len() == 1 => {
                    ColumnType::new(BaseType::Bytes).with_length(Length::Fixed(n))
                }
                _ => return Err(unsupported()),
            },
            "DATE" => plain(BaseType::Date)?,
            "TIME" => plain(BaseType::Time)?,
            "DATETIME" => plain(BaseType::Timestamp)?,
            "TIMESTAMP" => plain(BaseType::TimestampTz)?,
            "JSON" => plain(BaseType::Json)?,
            _ => return Err(unsupported()),
        };
        Ok(ty)
    }

    fn denormalize_type(&self, ty: &ColumnType) -> SchemaResult<NativeType> {
        if ty.array {
            return Err(SchemaError::unsupported(
                DialectKind::MySql,
                format!("array type {}", ty),
            ));
        }
        let native = match ty.base {
            BaseType::Boolean => NativeType::new("TINYINT").num(1),
            BaseType::SmallInt => NativeType::new("SMALLINT"),
            BaseType::Integer => NativeType::new("INT"),
            BaseType::BigInt => NativeType::new("BIGINT"),
            BaseType::Real => NativeType::new("FLOAT"),
            BaseType::Double => NativeType::new("DOUBLE"),
            BaseType::Decimal => match (ty.precision, ty.scale) {
                (Some(p), Some(s)) => NativeType::new("DECIMAL").num(p).num(s),
                (Some(p), None) => NativeType::new("DECIMAL").num(p),
                _ => NativeType::new("DECIMAL"),
            },
            BaseType::Char => match ty.length {
                Some(Length::Fixed(n)) => NativeType::new("CHAR").num(n),
                Some(Length::Max) => NativeType::new("TEXT"),
                None => NativeType::new("CHAR").num(1),
            },
            BaseType::Varchar => match ty.length {
                Some(Length::Fixed(n)) => NativeType::new("VARCHAR").num(n),
                _ => NativeType::new("TEXT"),
            },
            BaseType::Text => NativeType::new("TEXT"),
            BaseType::Bytes => match ty.length {
                Some(Length::Fixed(n)) => NativeType::new("VARBINARY").num(n),
                _ => NativeType::new("BLOB"),
            },
            BaseType::Date => NativeType::new("DATE"),
            BaseType::Time => NativeType::new("TIME"),
            BaseType::Timestamp => NativeType::new("DATETIME"),
            BaseType::TimestampTz => NativeType::new("TIMESTAMP"),
            BaseType::Json | BaseType::Jsonb => NativeType::new("JSON"),
            BaseType::Uuid => NativeType::new("CHAR").num(36),
        };
        Ok(native)
    }

    fn quote_identifier(&self, ident: &str) -> String {
        format!("`{}`", ident.replace('`', "``"))
    }

    fn supports_type_change(&self, from: &ColumnType, to: &ColumnType) -> bool {
        dialect::widening_or_text(from, to)
    }

    fn check_column(&self, _table: &Table, column: &Column) -> SchemaResult<()> {
        if column.auto_increment && (column.ty.array || column.ty.base.family() != TypeFamily::Integer)
        {
            return Err(SchemaError::unsupported(
                DialectKind::MySql,
                format!("auto-increment {} column", column.ty),
            ));
        }
        Ok(())
    }

    fn canonicalize(&self, schema: &Schema) -> SchemaResult<Schema> {
        let schema = dialect::canonical_columns(self, schema)?;
        let mut builder = schema.to_builder();

        for table in schema.tables() {
            let Some(target) = builder.table_mut(table.name()) else {
                continue;
            };
            for index in table.indexes() {
                if index.unique && index.columns.iter().all(|c| !c.descending) {
                    target.remove_index(&index.name);
                    target.add_constraint(
                        Constraint::unique(index.column_names()).named(index.name.as_str()),
                    );
                }
            }
        }
        builder.build()
    }
}
