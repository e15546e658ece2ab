//! PostgreSQL.
//!
//! Unquoted identifiers fold to lower case and the `public` schema qualifier
//! is dropped. Output always double-quotes identifiers. `SERIAL` types and
//! identity columns both read as auto-increment columns, which are written
//! back as `SERIAL`, `BIGSERIAL` or `SMALLSERIAL`.

use ddlsync_schema::{
    BaseType, Column, ColumnFragment, ColumnType, Constraint, DialectKind, FragmentParser, Index,
    Length, Operation, Schema, SchemaError, SchemaResult, Table,
};

use crate::defaults;
use crate::dialect::{self, Dialect, NamePart, NativeType, TypeArg};
use crate::parser;
use crate::printer;

/// The PostgreSQL dialect.
#[derive(Debug, Clone, Copy, Default)]
pub struct Postgres;

impl Postgres {
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

        let mut statements = vec![format!(
            "CREATE TABLE {} {}",
            self.quote_identifier(table.name()),
            printer::table_body(&lines)
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

        let ty = if column.auto_increment {
            serial_type(&column.ty)?.to_string()
        } else {
            self.type_sql(&column.ty)?
        };
        let mut sql = format!("{} {}", name, ty);
        if !column.nullable {
            sql.push_str(" NOT NULL");
        }
        if let Some(default) = &column.default {
            sql.push_str(" DEFAULT ");
            sql.push_str(default);
        }
        Ok(sql)
    }

    /// One `ALTER TABLE` with an action per changed attribute.
    fn alter_column(&self, table: &str, from: &Column, to: &Column) -> SchemaResult<String> {
        let column = self.quote_identifier(&to.name);
        let mut actions = Vec::new();

        if from.ty != to.ty {
            let ty = self.type_sql(&to.ty)?;
            actions.push(format!(
                "ALTER COLUMN {} TYPE {} USING {}::{}",
                column, ty, column, ty
            ));
        }
        if from.nullable != to.nullable {
            let action = if to.nullable { "DROP" } else { "SET" };
            actions.push(format!("ALTER COLUMN {} {} NOT NULL", column, action));
        }
        if from.default != to.default {
            actions.push(match &to.default {
                Some(default) => format!("ALTER COLUMN {} SET DEFAULT {}", column, default),
                None => format!("ALTER COLUMN {} DROP DEFAULT", column),
            });
        }
        if from.auto_increment != to.auto_increment {
            actions.push(if to.auto_increment {
                format!("ALTER COLUMN {} ADD GENERATED BY DEFAULT AS IDENTITY", column)
            } else {
                format!("ALTER COLUMN {} DROP IDENTITY IF EXISTS", column)
            });
        }

        Ok(format!(
            "ALTER TABLE {} {}",
            self.quote_identifier(table),
            actions.join(", ")
        ))
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
}

/// Serial pseudo-type for an auto-increment integer column.
fn serial_type(ty: &ColumnType) -> SchemaResult<&'static str> {
    match (ty.base, ty.array) {
        (BaseType::SmallInt, false) => Ok("SMALLSERIAL"),
        (BaseType::Integer, false) => Ok("SERIAL"),
        (BaseType::BigInt, false) => Ok("BIGSERIAL"),
        _ => Err(SchemaError::unsupported(
            DialectKind::Postgres,
            format!("auto-increment {} column", ty),
        )),
    }
}

impl FragmentParser for Postgres {
    fn dialect_kind(&self) -> DialectKind {
        DialectKind::Postgres
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

impl Dialect for Postgres {
    fn kind(&self) -> DialectKind {
        DialectKind::Postgres
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
            Operation::DropColumn { table, column } => {
                format!(
                    "ALTER TABLE {} DROP COLUMN {}",
                    self.quote_identifier(table),
                    self.quote_identifier(column)
                )
            }
            Operation::AlterColumnType { table, from, to } => self.alter_column(table, from, to)?,
            Operation::AddConstraint { table, constraint } => format!(
                "ALTER TABLE {} ADD {}",
                self.quote_identifier(table),
                printer::table_constraint(self, table, constraint)
            ),
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
        let unsupported = || {
            SchemaError::unsupported(DialectKind::Postgres, format!("type {}", native))
        };
        if native.array_depth > 1 {
            return Err(SchemaError::unsupported(
                DialectKind::Postgres,
                format!("multidimensional array {}", native),
            ));
        }
        if native.unsigned {
            return Err(unsupported());
        }

        let plain = |base: BaseType| {
            if native.args.is_empty() && native.time_zone.is_none() {
                Ok(ColumnType::new(base))
            } else {
                Err(unsupported())
            }
        };

        let ty = match native.name.as_str() {
            "SMALLINT" | "INT2" | "SMALLSERIAL" | "SERIAL2" => plain(BaseType::SmallInt)?,
            "INTEGER" | "INT" | "INT4" | "SERIAL" | "SERIAL4" => plain(BaseType::Integer)?,
            "BIGINT" | "INT8" | "BIGSERIAL" | "SERIAL8" => plain(BaseType::BigInt)?,
            "REAL" | "FLOAT4" => plain(BaseType::Real)?,
            "DOUBLE PRECISION" | "FLOAT8" => plain(BaseType::Double)?,
            "FLOAT" => match (native.args.as_slice(), native.first_number()) {
                ([], _) => ColumnType::new(BaseType::Double),
                ([_], Some(p)) if p <= 24 => ColumnType::new(BaseType::Real),
                ([_], Some(_)) => ColumnType::new(BaseType::Double),
                _ => return Err(unsupported()),
            },
            "NUMERIC" | "DECIMAL" => match native.args.as_slice() {
                [] => ColumnType::new(BaseType::Decimal),
                [TypeArg::Number(p)] => ColumnType::new(BaseType::Decimal).with_precision(*p, None),
                [TypeArg::Number(p), TypeArg::Number(s)] => ColumnType::decimal(*p, *s),
                _ => return Err(unsupported()),
            },
            "BOOLEAN" | "BOOL" => plain(BaseType::Boolean)?,
            "CHAR" | "CHARACTER" | "BPCHAR" => match native.args.as_slice() {
                [] => ColumnType::new(BaseType::Char).with_length(Length::Fixed(1)),
                [TypeArg::Number(n)] => ColumnType::new(BaseType::Char).with_length(Length::Fixed(*n)),
                _ => return Err(unsupported()),
            },
            "VARCHAR" | "CHARACTER VARYING" => match native.args.as_slice() {
                [] => ColumnType::new(BaseType::Varchar),
                [TypeArg::Number(n)] => ColumnType::varchar(*n),
                _ => return Err(unsupported()),
            },
            "TEXT" => plain(BaseType::Text)?,
            "BYTEA" => plain(BaseType::Bytes)?,
            "DATE" => plain(BaseType::Date)?,
            "TIME" if native.args.is_empty() && native.time_zone != Some(true) => {
                ColumnType::new(BaseType::Time)
            }
            "TIMESTAMP" if native.args.is_empty() => match native.time_zone {
                Some(true) => ColumnType::new(BaseType::TimestampTz),
                _ => ColumnType::new(BaseType::Timestamp),
            },
            "TIMESTAMPTZ" => plain(BaseType::TimestampTz)?,
            "JSON" => plain(BaseType::Json)?,
            "JSONB" => plain(BaseType::Jsonb)?,
            "UUID" => plain(BaseType::Uuid)?,
            _ => return Err(unsupported()),
        };

        Ok(if native.array_depth == 1 { ty.array() } else { ty })
    }

    fn denormalize_type(&self, ty: &ColumnType) -> SchemaResult<NativeType> {
        let native = match ty.base {
            BaseType::SmallInt => NativeType::new("SMALLINT"),
            BaseType::Integer => NativeType::new("INTEGER"),
            BaseType::BigInt => NativeType::new("BIGINT"),
            BaseType::Real => NativeType::new("REAL"),
            BaseType::Double => NativeType::new("DOUBLE PRECISION"),
            BaseType::Decimal => match (ty.precision, ty.scale) {
                (Some(p), Some(s)) => NativeType::new("NUMERIC").num(p).num(s),
                (Some(p), None) => NativeType::new("NUMERIC").num(p),
                _ => NativeType::new("NUMERIC"),
            },
            BaseType::Boolean => NativeType::new("BOOLEAN"),
            BaseType::Char => match ty.length {
                Some(Length::Fixed(n)) => NativeType::new("CHAR").num(n),
                Some(Length::Max) => NativeType::new("TEXT"),
                None => NativeType::new("CHAR").num(1),
            },
            BaseType::Varchar => match ty.length {
                Some(Length::Fixed(n)) => NativeType::new("VARCHAR").num(n),
                _ => NativeType::new("VARCHAR"),
            },
            BaseType::Text => NativeType::new("TEXT"),
            BaseType::Bytes => NativeType::new("BYTEA"),
            BaseType::Date => NativeType::new("DATE"),
            BaseType::Time => NativeType::new("TIME"),
            BaseType::Timestamp => NativeType::new("TIMESTAMP"),
            BaseType::TimestampTz => NativeType::new("TIMESTAMPTZ"),
            BaseType::Json => NativeType::new("JSON"),
            BaseType::Jsonb => NativeType::new("JSONB"),
            BaseType::Uuid => NativeType::new("UUID"),
        };
        Ok(if ty.array { native.array() } else { native })
    }

    fn implies_auto_increment(&self, native: &NativeType) -> bool {
        native.name.contains("SERIAL")
    }

    fn normalize_default(&self, expr: &str) -> Option<String> {
        defaults::normalize(expr).map(|e| defaults::strip_literal_cast(&e))
    }

    fn fold_identifier(&self, ident: &str, quoted: bool) -> String {
        if quoted {
            ident.to_string()
        } else {
            ident.to_lowercase()
        }
    }

    fn quote_identifier(&self, ident: &str) -> String {
        format!("\"{}\"", ident.replace('"', "\"\""))
    }

    fn resolve_name(&self, parts: &[NamePart]) -> SchemaResult<String> {
        match parts {
            [name] => Ok(self.fold_identifier(&name.text, name.quoted)),
            [schema, name] if self.fold_identifier(&schema.text, schema.quoted) == "public" => {
                Ok(self.fold_identifier(&name.text, name.quoted))
            }
            _ => Err(dialect::qualified_name_error(self.kind(), parts)),
        }
    }

    fn supports_type_change(&self, from: &ColumnType, to: &ColumnType) -> bool {
        dialect::widening_or_text(from, to)
    }

    fn check_column(&self, _table: &Table, column: &Column) -> SchemaResult<()> {
        if column.auto_increment {
            serial_type(&column.ty)?;
        }
        Ok(())
    }
}
