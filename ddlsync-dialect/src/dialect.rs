//! The dialect capability set and dialect-keyed dispatch.

use std::fmt;

use ddlsync_schema::{
    ApplyRules, Column, ColumnType, DialectKind, FragmentParser, Length, Operation, Schema,
    SchemaError, SchemaResult, Table, TypeChange,
};
use tracing::trace;

use crate::defaults;
use crate::mysql::MySql;
use crate::postgres::Postgres;
use crate::printer;
use crate::spanner::Spanner;

/// One argument of a native type, e.g. the `255` in `VARCHAR(255)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeArg {
    /// Numeric argument.
    Number(u32),
    /// `MAX`.
    Max,
    /// String argument (`ENUM('a', 'b')`).
    Text(String),
}

impl fmt::Display for TypeArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{}", n),
            Self::Max => f.write_str("MAX"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// A type as spelled in a dialect's DDL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeType {
    /// Upper-cased type name with single spaces (`DOUBLE PRECISION`).
    pub name: String,
    /// Parenthesized arguments.
    pub args: Vec<TypeArg>,
    /// `WITH TIME ZONE` (`Some(true)`) or `WITHOUT TIME ZONE` (`Some(false)`).
    pub time_zone: Option<bool>,
    /// MySQL `UNSIGNED`.
    pub unsigned: bool,
    /// Array nesting depth.
    pub array_depth: usize,
}

impl NativeType {
    /// A type without arguments.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: Vec::new(),
            time_zone: None,
            unsigned: false,
            array_depth: 0,
        }
    }

    /// Add an argument.
    pub fn arg(mut self, arg: TypeArg) -> Self {
        self.args.push(arg);
        self
    }

    /// Add a numeric argument.
    pub fn num(self, n: u32) -> Self {
        self.arg(TypeArg::Number(n))
    }

    /// Wrap in one level of array.
    pub fn array(mut self) -> Self {
        self.array_depth += 1;
        self
    }

    /// First argument as a number.
    pub fn first_number(&self) -> Option<u32> {
        match self.args.first() {
            Some(TypeArg::Number(n)) => Some(*n),
            _ => None,
        }
    }

    /// Second argument as a number.
    pub fn second_number(&self) -> Option<u32> {
        match self.args.get(1) {
            Some(TypeArg::Number(n)) => Some(*n),
            _ => None,
        }
    }

    /// Render without array decoration.
    pub fn scalar_sql(&self) -> String {
        let mut sql = self.name.clone();
        if !self.args.is_empty() {
            let args: Vec<String> = self.args.iter().map(ToString::to_string).collect();
            sql.push('(');
            sql.push_str(&args.join(", "));
            sql.push(')');
        }
        match self.time_zone {
            Some(true) => sql.push_str(" WITH TIME ZONE"),
            Some(false) => sql.push_str(" WITHOUT TIME ZONE"),
            None => {}
        }
        if self.unsigned {
            sql.push_str(" UNSIGNED");
        }
        sql
    }
}

impl fmt::Display for NativeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.scalar_sql())?;
        for _ in 0..self.array_depth {
            f.write_str("[]")?;
        }
        Ok(())
    }
}

/// A part of a possibly qualified name, as written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamePart {
    /// Identifier text with quotes removed.
    pub text: String,
    /// Written as a quoted identifier.
    pub quoted: bool,
}

/// Everything ddlsync needs to know about one SQL dialect.
///
/// A dialect parses its DDL into the canonical model, prints the model and
/// operation lists back, and owns the type table between its native types and
/// [`ColumnType`]. Implementations are stateless unit structs obtained
/// through [`dialect`].
pub trait Dialect: FragmentParser + Send + Sync {
    /// Which dialect this is.
    fn kind(&self) -> DialectKind;

    /// View this dialect as a fragment parser for source extractors.
    fn as_fragment_parser(&self) -> &dyn FragmentParser;

    /// Parse DDL text into a canonical schema.
    fn parse(&self, ddl: &str) -> SchemaResult<Schema>;

    /// Render one operation as statements, without trailing semicolons.
    fn render_operation(&self, operation: &Operation) -> SchemaResult<Vec<String>>;

    /// Render operations as statements, without trailing semicolons.
    fn print_operations(&self, operations: &[Operation]) -> SchemaResult<Vec<String>> {
        let mut statements = Vec::with_capacity(operations.len());
        for operation in operations {
            trace!(operation = %operation, "rendering");
            statements.extend(self.render_operation(operation)?);
        }
        Ok(statements)
    }

    /// Render a whole schema as DDL.
    ///
    /// Tables come out in ordinal order. Foreign keys into tables that are
    /// created later are emitted as trailing `ALTER TABLE` statements.
    fn print_schema(&self, schema: &Schema) -> SchemaResult<String> {
        let schema = self.canonicalize(schema)?;
        let statements = self.print_operations(&printer::schema_operations(&schema))?;
        Ok(printer::script(&statements))
    }

    /// Map a native type to the canonical descriptor.
    fn normalize_type(&self, native: &NativeType) -> SchemaResult<ColumnType>;

    /// Map a canonical descriptor to this dialect's native type.
    fn denormalize_type(&self, ty: &ColumnType) -> SchemaResult<NativeType>;

    /// The canonical type this dialect would read back after printing `ty`.
    fn canonical_type(&self, ty: &ColumnType) -> SchemaResult<ColumnType> {
        self.normalize_type(&self.denormalize_type(ty)?)
    }

    /// Render a canonical type as native SQL.
    fn type_sql(&self, ty: &ColumnType) -> SchemaResult<String> {
        Ok(self.denormalize_type(ty)?.to_string())
    }

    /// Native types that imply database-generated values (`SERIAL`).
    fn implies_auto_increment(&self, _native: &NativeType) -> bool {
        false
    }

    /// Normalize a default expression; `None` means no default.
    fn normalize_default(&self, expr: &str) -> Option<String> {
        defaults::normalize(expr)
    }

    /// Apply the dialect's case rules to an identifier.
    fn fold_identifier(&self, ident: &str, _quoted: bool) -> String {
        ident.to_string()
    }

    /// Quote an identifier for output.
    fn quote_identifier(&self, ident: &str) -> String;

    /// Resolve a possibly qualified table or index name.
    fn resolve_name(&self, parts: &[NamePart]) -> SchemaResult<String> {
        match parts {
            [single] => Ok(self.fold_identifier(&single.text, single.quoted)),
            _ => Err(qualified_name_error(self.kind(), parts)),
        }
    }

    /// Can a column change from `from` to `to` with a single ALTER?
    fn supports_type_change(&self, from: &ColumnType, to: &ColumnType) -> bool;

    /// Can the primary key of an existing table be changed?
    fn supports_primary_key_change(&self) -> bool {
        true
    }

    /// Does `DROP TABLE` also drop the table's indexes?
    fn drops_indexes_with_table(&self) -> bool {
        true
    }

    /// Rules for replaying operations the way this dialect's engine would.
    fn apply_rules(&self) -> ApplyRules {
        ApplyRules {
            drop_table_drops_indexes: self.drops_indexes_with_table(),
        }
    }

    /// Reject table-level constructs the dialect cannot represent.
    fn check_table(&self, _table: &Table) -> SchemaResult<()> {
        Ok(())
    }

    /// Reject column-level constructs the dialect cannot represent.
    fn check_column(&self, _table: &Table, _column: &Column) -> SchemaResult<()> {
        Ok(())
    }

    /// Map a schema into this dialect's canonical image: types and defaults
    /// become exactly what printing and re-parsing would produce.
    fn canonicalize(&self, schema: &Schema) -> SchemaResult<Schema> {
        canonical_columns(self, schema)
    }
}

/// Check every table and column, then map column types and defaults
/// through `dialect`.
pub(crate) fn canonical_columns<D: Dialect + ?Sized>(
    dialect: &D,
    schema: &Schema,
) -> SchemaResult<Schema> {
    for table in schema.tables() {
        dialect.check_table(table)?;
    }
    schema.map_columns(|table, column| {
        dialect.check_column(table, column)?;
        let mut column = column.clone();
        column.ty = dialect.canonical_type(&column.ty)?;
        column.default = column
            .default
            .as_deref()
            .and_then(|expr| dialect.normalize_default(expr));
        Ok(column)
    })
}

/// Error for a schema-qualified name the dialect does not model.
pub(crate) fn qualified_name_error(kind: DialectKind, parts: &[NamePart]) -> SchemaError {
    let name: Vec<&str> = parts.iter().map(|p| p.text.as_str()).collect();
    SchemaError::unsupported(kind, format!("qualified name `{}`", name.join(".")))
}

/// Length argument of a native type.
pub(crate) fn length_arg(arg: Option<&TypeArg>) -> Option<Length> {
    match arg {
        Some(TypeArg::Number(n)) => Some(Length::Fixed(*n)),
        Some(TypeArg::Max) => Some(Length::Max),
        _ => None,
    }
}

/// Single-statement changes for dialects with a general `ALTER COLUMN ... TYPE`:
/// widening, and conversion to an unbounded string.
pub(crate) fn widening_or_text(from: &ColumnType, to: &ColumnType) -> bool {
    matches!(
        from.classify_change(to),
        TypeChange::Identical | TypeChange::Widening
    ) || (to.is_unbounded_string() && from.array == to.array)
}

static POSTGRES: Postgres = Postgres;
static MYSQL: MySql = MySql;
static SPANNER: Spanner = Spanner;

/// The dialect implementation for `kind`.
pub fn dialect(kind: DialectKind) -> &'static dyn Dialect {
    match kind {
        DialectKind::Postgres => &POSTGRES,
        DialectKind::MySql => &MYSQL,
        DialectKind::Spanner => &SPANNER,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dispatch() {
        for kind in DialectKind::ALL {
            assert_eq!(dialect(kind).kind(), kind);
        }
    }

    #[test]
    fn test_apply_rules() {
        assert!(dialect(DialectKind::Postgres).apply_rules().drop_table_drops_indexes);
        assert!(dialect(DialectKind::MySql).apply_rules().drop_table_drops_indexes);
        assert!(!dialect(DialectKind::Spanner).apply_rules().drop_table_drops_indexes);
    }

    #[test]
    fn test_native_type_display() {
        assert_eq!(NativeType::new("VARCHAR").num(255).to_string(), "VARCHAR(255)");
        assert_eq!(
            NativeType::new("NUMERIC").num(10).num(2).to_string(),
            "NUMERIC(10, 2)"
        );
        assert_eq!(NativeType::new("TEXT").array().to_string(), "TEXT[]");
        let mut ts = NativeType::new("TIMESTAMP");
        ts.time_zone = Some(true);
        assert_eq!(ts.to_string(), "TIMESTAMP WITH TIME ZONE");
    }

    #[test]
    fn test_native_type_numbers() {
        let ty = NativeType::new("DECIMAL").num(12).num(4);
        assert_eq!(ty.first_number(), Some(12));
        assert_eq!(ty.second_number(), Some(4));
        assert_eq!(NativeType::new("TEXT").first_number(), None);
    }
}
