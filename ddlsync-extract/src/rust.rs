//! Extractor for annotated Rust structs.

use convert_case::{Case, Casing};
use ddlsync_schema::{
    AnnotationKeys, Column, Constraint, FragmentParser, Location, SchemaError, SchemaResult,
    TableBuilder,
};
use proc_macro2::Span;
use quote::ToTokens;
use syn::ext::IdentExt;
use syn::spanned::Spanned;
use syn::{Field, Fields, Ident, Item, ItemStruct};
use tracing::debug;

use crate::attrs::{FieldAttrs, StructAttrs, parse_field_attrs, parse_struct_attrs};
use crate::extractor::SourceExtractor;
use crate::types;

/// Reads table declarations from Rust source.
///
/// Raw DDL in annotations (column overrides, indexes and constraints) is
/// handed to `parser`, the fragment parser of the target dialect.
pub struct RustExtractor<'a> {
    keys: AnnotationKeys,
    parser: &'a dyn FragmentParser,
}

impl<'a> RustExtractor<'a> {
    /// Create an extractor for the given annotation keys.
    pub fn new(keys: AnnotationKeys, parser: &'a dyn FragmentParser) -> Self {
        Self { keys, parser }
    }

    /// The annotation keys in use.
    pub fn keys(&self) -> &AnnotationKeys {
        &self.keys
    }

    fn items(
        &self,
        items: &[Item],
        origin: &Origin<'_>,
        out: &mut Vec<TableBuilder>,
    ) -> SchemaResult<()> {
        for item in items {
            match item {
                Item::Struct(item) => {
                    if let Some(table) = self.table(item, origin)? {
                        out.push(table);
                    }
                }
                Item::Mod(module) => {
                    if let Some((_, items)) = &module.content {
                        self.items(items, origin, out)?;
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn table(&self, item: &ItemStruct, origin: &Origin<'_>) -> SchemaResult<Option<TableBuilder>> {
        let declaration = item.ident.unraw().to_string();
        let settings = parse_struct_attrs(&item.attrs, &self.keys)
            .map_err(|e| origin.syn_error(&declaration, e))?;

        let fields: Vec<&Field> = match &item.fields {
            Fields::Named(named) => named.named.iter().collect(),
            _ if settings.is_some() => {
                return Err(origin.annotation_error(
                    &declaration,
                    item.ident.span(),
                    "table declarations need named fields",
                ));
            }
            _ => return Ok(None),
        };

        let mut annotated = Vec::with_capacity(fields.len());
        for field in fields {
            let name = field_name(field);
            let attrs = parse_field_attrs(&field.attrs, &self.keys)
                .map_err(|e| origin.syn_error(&format!("{}.{}", declaration, name), e))?;
            annotated.push((field, name, attrs));
        }
        if settings.is_none() && !annotated.iter().any(|(_, _, attrs)| attrs.annotated) {
            return Ok(None);
        }
        let settings = settings.unwrap_or_default();

        let table_name = settings
            .table
            .clone()
            .unwrap_or_else(|| declaration.to_case(Case::Snake));
        let mut table = TableBuilder::new(table_name.as_str());
        let mut primary_key = Vec::new();

        for (field, name, attrs) in &annotated {
            if attrs.excluded {
                if attrs.primary_key {
                    return Err(origin.annotation_error(
                        &format!("{}.{}", declaration, name),
                        field_span(field),
                        "an excluded field cannot be part of the primary key",
                    ));
                }
                continue;
            }
            let column = self.column(&declaration, field, name, attrs, origin)?;
            if attrs.primary_key {
                primary_key.push(column.name.clone());
            }
            table.add_column(column);
        }

        if let Some(names) = &settings.primary_key {
            if !primary_key.is_empty() {
                return Err(origin.annotation_error(
                    &declaration,
                    item.ident.span(),
                    format!(
                        "primary key is declared both by `primary_key` and by #[{}] fields",
                        self.keys.primary_key
                    ),
                ));
            }
            for wanted in names {
                let column = annotated
                    .iter()
                    .find(|(_, name, attrs)| name == wanted && !attrs.excluded)
                    .map(|(_, name, attrs)| attrs.column.clone().unwrap_or_else(|| name.clone()));
                match column {
                    Some(column) => primary_key.push(column),
                    None => {
                        return Err(origin.annotation_error(
                            &declaration,
                            item.ident.span(),
                            format!("primary key field `{}` does not exist", wanted),
                        ));
                    }
                }
            }
        }
        if !primary_key.is_empty() {
            table.add_constraint(Constraint::primary_key(primary_key));
        }

        self.table_fragments(&mut table, &settings, &declaration, origin)?;

        debug!(
            declaration = %declaration,
            table = %table_name,
            "extracted table"
        );
        Ok(Some(table))
    }

    fn table_fragments(
        &self,
        table: &mut TableBuilder,
        settings: &StructAttrs,
        declaration: &str,
        origin: &Origin<'_>,
    ) -> SchemaResult<()> {
        for statement in &settings.indexes {
            let (target, index) = self
                .parser
                .parse_index_statement(&statement.value())
                .map_err(|e| origin.fragment_error(declaration, statement.span(), e))?;
            if target != table.name() {
                return Err(origin.annotation_error(
                    declaration,
                    statement.span(),
                    format!(
                        "index `{}` is on table `{}`, not `{}`",
                        index.name,
                        target,
                        table.name()
                    ),
                ));
            }
            if table.has_index(&index.name) {
                return Err(origin.annotation_error(
                    declaration,
                    statement.span(),
                    format!("duplicate index `{}`", index.name),
                ));
            }
            table.add_index(index);
        }

        for fragment in &settings.constraints {
            let constraint = self
                .parser
                .parse_table_constraint(&fragment.value())
                .map_err(|e| origin.fragment_error(declaration, fragment.span(), e))?;
            table.add_constraint(constraint);
        }
        Ok(())
    }

    fn column(
        &self,
        declaration: &str,
        field: &Field,
        name: &str,
        attrs: &FieldAttrs,
        origin: &Origin<'_>,
    ) -> SchemaResult<Column> {
        let qualified = format!("{}.{}", declaration, name);
        let column_name = attrs.column.clone().unwrap_or_else(|| name.to_string());

        let mut column = match &attrs.ddl {
            Some(lit) => {
                let text = lit.value();
                let fragment = self
                    .parser
                    .parse_column_fragment(&text)
                    .map_err(|e| origin.fragment_error(&qualified, lit.span(), e))?;
                if !fragment.constraints.is_empty() {
                    return Err(origin.annotation_error(
                        &qualified,
                        lit.span(),
                        format!(
                            "column overrides cannot declare constraints; use #[{}(constraint = \"...\")] on the struct",
                            self.keys.ddl
                        ),
                    ));
                }
                let mut column = Column::new(column_name, fragment.ty)
                    .nullable(fragment.nullable)
                    .raw_definition(text.trim());
                column.default = fragment.default;
                column.auto_increment = fragment.auto_increment;
                column
            }
            None => {
                let Some((ty, nullable)) = types::column_type(&field.ty) else {
                    let spelled = field.ty.to_token_stream().to_string().replace(' ', "");
                    return Err(origin.annotation_error(
                        &qualified,
                        field_span(field),
                        format!(
                            "cannot map type `{}` to a column type; add a #[{} = \"...\"] override",
                            spelled, self.keys.ddl
                        ),
                    ));
                };
                Column::new(column_name, ty).nullable(nullable)
            }
        };

        column.annotations = attrs.annotations.clone();
        Ok(column)
    }
}

impl SourceExtractor for RustExtractor<'_> {
    fn extension(&self) -> &str {
        "rs"
    }

    fn extract_source(&self, source: &str, file: Option<&str>) -> SchemaResult<Vec<TableBuilder>> {
        let origin = Origin { source, file };
        let parsed = syn::parse_file(source).map_err(|e| origin.parse_error(e))?;
        let mut tables = Vec::new();
        self.items(&parsed.items, &origin, &mut tables)?;
        Ok(tables)
    }
}

fn field_name(field: &Field) -> String {
    field
        .ident
        .as_ref()
        .map(|ident| ident.unraw().to_string())
        .unwrap_or_default()
}

fn field_span(field: &Field) -> Span {
    field.ident.as_ref().map_or_else(|| field.ty.span(), Ident::span)
}

/// The input being extracted, for error locations.
struct Origin<'s> {
    source: &'s str,
    file: Option<&'s str>,
}

impl Origin<'_> {
    fn location(&self, span: Span) -> Location {
        let start = span.start();
        let location = Location::new(start.line.max(1), start.column + 1);
        match self.file {
            Some(file) => location.in_file(file),
            None => location,
        }
    }

    fn annotation_error(
        &self,
        declaration: &str,
        span: Span,
        message: impl Into<String>,
    ) -> SchemaError {
        SchemaError::invalid_annotation(declaration, self.location(span), message)
    }

    fn syn_error(&self, declaration: &str, err: syn::Error) -> SchemaError {
        self.annotation_error(declaration, err.span(), err.to_string())
    }

    /// A fragment the dialect rejected. Syntax errors are reported against
    /// the annotation; unsupported constructs keep their own kind.
    fn fragment_error(&self, declaration: &str, span: Span, err: SchemaError) -> SchemaError {
        match err {
            SchemaError::Syntax { message, src, .. } => self.annotation_error(
                declaration,
                span,
                format!("invalid DDL `{}`: {}", src, message),
            ),
            SchemaError::InvalidAnnotation { message, .. } => {
                self.annotation_error(declaration, span, message)
            }
            other => other,
        }
    }

    fn parse_error(&self, err: syn::Error) -> SchemaError {
        let location = self.location(err.span());
        let offset = byte_offset(self.source, location.line, location.column);
        SchemaError::syntax(self.source, location, offset, 0, err.to_string())
    }
}

/// Byte offset of a 1-based line and character column.
fn byte_offset(source: &str, line: usize, column: usize) -> usize {
    let line_start: usize = source
        .split_inclusive('\n')
        .take(line.saturating_sub(1))
        .map(str::len)
        .sum();
    let rest = &source[line_start.min(source.len())..];
    let within = rest
        .char_indices()
        .nth(column.saturating_sub(1))
        .map_or(rest.len(), |(i, _)| i);
    line_start + within
}

#[cfg(test)]
mod tests {
    use super::*;
    use ddlsync_dialect::dialect;
    use ddlsync_schema::{BaseType, ColumnType, DialectKind, ErrorKind, Schema};
    use pretty_assertions::assert_eq;

    const USERS: &str = r#"
use serde::Serialize;

#[derive(Debug, Serialize)]
#[ddl(table = "users", index = "CREATE UNIQUE INDEX users_email ON users (email_address)")]
pub struct User {
    #[pk]
    pub id: i64,
    #[db = "email_address"]
    #[ddl = "VARCHAR(320) NOT NULL"]
    pub email: String,
    pub nickname: Option<String>,
    #[db = "-"]
    pub transient: bool,
}

/// Not a table.
pub struct Helper {
    pub value: u32,
}
"#;

    fn extract(source: &str) -> SchemaResult<Schema> {
        extract_with(source, DialectKind::Postgres)
    }

    fn extract_with(source: &str, kind: DialectKind) -> SchemaResult<Schema> {
        let parser = dialect(kind).as_fragment_parser();
        RustExtractor::new(AnnotationKeys::default(), parser).extract_str(source)
    }

    fn annotation_message(source: &str) -> (String, Location, String) {
        match extract(source).unwrap_err() {
            SchemaError::InvalidAnnotation {
                declaration,
                location,
                message,
            } => (declaration, location, message),
            other => panic!("unexpected error: {}", other),
        }
    }

    // ==================== Extraction Tests ====================

    #[test]
    fn test_extract_users() {
        let schema = extract(USERS).unwrap();
        assert_eq!(schema.len(), 1);

        let users = schema.table("users").unwrap();
        let names: Vec<&str> = users.columns().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["id", "email_address", "nickname"]);
        assert_eq!(users.primary_key_columns(), ["id".to_string()]);

        let id = users.column("id").unwrap();
        assert_eq!(id.ty, ColumnType::new(BaseType::BigInt));
        assert!(!id.nullable);

        let email = users.column("email_address").unwrap();
        assert_eq!(email.ty, ColumnType::varchar(320));
        assert!(!email.nullable);
        assert_eq!(email.raw_definition.as_deref(), Some("VARCHAR(320) NOT NULL"));
        assert_eq!(email.annotations["db"], "email_address");
        assert_eq!(email.annotations["ddl"], "VARCHAR(320) NOT NULL");

        let nickname = users.column("nickname").unwrap();
        assert_eq!(nickname.ty, ColumnType::new(BaseType::Text));
        assert!(nickname.nullable);

        let index = &users.indexes()[0];
        assert_eq!(index.name, "users_email");
        assert!(index.unique);
    }

    #[test]
    fn test_record_with_primary_key() {
        let schema = extract(
            r#"
struct Record {
    #[pk]
    ID: i64,
    Email: String,
}
"#,
        )
        .unwrap();
        let record = schema.table("record").unwrap();
        assert_eq!(record.column_count(), 2);
        assert_eq!(record.primary_key_columns(), ["ID".to_string()]);
    }

    #[test]
    fn test_composite_key_and_nested_module() {
        let schema = extract(
            r#"
mod orders {
    #[ddl(primary_key = "order_id, line", constraint = "CHECK (qty > 0)")]
    pub struct OrderLine {
        pub line: i32,
        pub order_id: i64,
        pub qty: i32,
        pub r#type: Option<String>,
    }
}
"#,
        )
        .unwrap();
        let lines = schema.table("order_line").unwrap();
        assert_eq!(
            lines.primary_key_columns(),
            ["order_id".to_string(), "line".to_string()]
        );
        assert!(lines.has_column("type"));
        assert_eq!(lines.constraints().len(), 1);
    }

    #[test]
    fn test_field_key_order_is_field_order() {
        let schema = extract(
            r#"
struct Membership {
    #[pk] user_id: i64,
    #[pk] group_id: i64,
}
"#,
        )
        .unwrap();
        assert_eq!(
            schema.table("membership").unwrap().primary_key_columns(),
            ["user_id".to_string(), "group_id".to_string()]
        );
    }

    #[test]
    fn test_ordinals_follow_declaration_order() {
        let schema = extract(
            r#"
#[ddl] struct Zeta { #[pk] id: i64 }
#[ddl] struct Alpha { #[pk] id: i64 }
"#,
        );
        // A bare #[ddl] on a struct is not a list.
        assert!(schema.is_err());

        let schema = extract(
            r#"
#[ddl()] struct Zeta { #[pk] id: i64 }
#[ddl()] struct Alpha { #[pk] id: i64 }
"#,
        )
        .unwrap();
        let names: Vec<&str> = schema.table_names().collect();
        assert_eq!(names, vec!["zeta", "alpha"]);
    }

    #[test]
    fn test_mysql_override() {
        let schema = extract_with(
            r#"
struct Counter {
    #[pk]
    #[ddl = "BIGINT NOT NULL AUTO_INCREMENT"]
    id: i64,
}
"#,
            DialectKind::MySql,
        )
        .unwrap();
        assert!(schema.table("counter").unwrap().column("id").unwrap().auto_increment);
    }

    // ==================== Error Tests ====================

    #[test]
    fn test_unknown_struct_key() {
        let (declaration, location, message) = annotation_message(
            "\n#[ddl(tabel = \"users\")]\nstruct User { id: i64 }\n",
        );
        assert_eq!(declaration, "User");
        assert_eq!(location.line, 2);
        assert!(message.contains("unknown key"));
    }

    #[test]
    fn test_missing_primary_key_field() {
        let (declaration, _, message) = annotation_message(
            "#[ddl(primary_key = \"id, tenant\")]\nstruct User { id: i64 }\n",
        );
        assert_eq!(declaration, "User");
        assert_eq!(message, "primary key field `tenant` does not exist");
    }

    #[test]
    fn test_unmappable_field_type() {
        let (declaration, location, message) = annotation_message(
            "struct User {\n    #[pk] id: i64,\n    meta: HashMap<String, String>,\n}\n",
        );
        assert_eq!(declaration, "User.meta");
        assert_eq!(location, Location::new(3, 5));
        assert!(message.contains("HashMap<String,String>"), "{}", message);
    }

    #[test]
    fn test_malformed_column_key() {
        let (declaration, _, _) = annotation_message("struct User {\n    #[db] id: i64,\n}\n");
        assert_eq!(declaration, "User.id");
    }

    #[test]
    fn test_override_errors() {
        let (declaration, _, message) =
            annotation_message("struct User {\n    #[ddl = \"VARCHAR(\"] name: String,\n}\n");
        assert_eq!(declaration, "User.name");
        assert!(message.starts_with("invalid DDL `VARCHAR(`"), "{}", message);

        let (_, _, message) =
            annotation_message("struct User {\n    #[ddl = \"BIGINT PRIMARY KEY\"] id: i64,\n}\n");
        assert!(message.contains("cannot declare constraints"));

        let err = extract("struct User {\n    #[ddl = \"BIGINT UNSIGNED\"] id: u64,\n}\n").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedFeature);
    }

    #[test]
    fn test_index_on_other_table() {
        let (_, _, message) = annotation_message(
            "#[ddl(index = \"CREATE INDEX i ON accounts (id)\")]\nstruct User { id: i64 }\n",
        );
        assert_eq!(message, "index `i` is on table `accounts`, not `user`");
    }

    #[test]
    fn test_excluded_primary_key() {
        let (_, _, message) =
            annotation_message("struct User {\n    #[pk]\n    #[db = \"-\"]\n    id: i64,\n}\n");
        assert!(message.contains("excluded"));
    }

    #[test]
    fn test_source_syntax_error() {
        let err = extract("struct User {\n    id: i64\n    name: String,\n}\n").unwrap_err();
        match err {
            SchemaError::Syntax { location, .. } => assert_eq!(location.line, 3),
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_byte_offset() {
        let source = "ab\ncdé\nf";
        assert_eq!(byte_offset(source, 1, 1), 0);
        assert_eq!(byte_offset(source, 2, 3), 5);
        assert_eq!(byte_offset(source, 3, 1), 8);
    }
}
