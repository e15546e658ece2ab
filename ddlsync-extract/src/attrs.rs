//! Parsing of the configured annotation attributes.

use std::collections::BTreeMap;

use ddlsync_schema::AnnotationKeys;
use syn::{Attribute, Expr, ExprLit, Lit, LitStr, Meta};

/// Struct-level settings from `#[ddl(...)]`.
#[derive(Debug, Default)]
pub(crate) struct StructAttrs {
    /// Table name override.
    pub table: Option<String>,
    /// Composite primary key, by field name.
    pub primary_key: Option<Vec<String>>,
    /// `CREATE INDEX` statements.
    pub indexes: Vec<LitStr>,
    /// Table constraints.
    pub constraints: Vec<LitStr>,
}

/// Field-level annotations.
#[derive(Debug, Default)]
pub(crate) struct FieldAttrs {
    /// Column name override.
    pub column: Option<String>,
    /// `#[db = "-"]`.
    pub excluded: bool,
    /// Part of the primary key.
    pub primary_key: bool,
    /// Raw column definition override.
    pub ddl: Option<LitStr>,
    /// Raw key/value pairs as written.
    pub annotations: BTreeMap<String, String>,
    /// Any configured key was present.
    pub annotated: bool,
}

/// Parse the struct-level ddl-key attribute. `None` when the struct has none.
pub(crate) fn parse_struct_attrs(
    attrs: &[Attribute],
    keys: &AnnotationKeys,
) -> syn::Result<Option<StructAttrs>> {
    let mut found: Option<StructAttrs> = None;

    for attr in attrs {
        if !attr.path().is_ident(keys.ddl.as_str()) {
            continue;
        }
        if !matches!(attr.meta, Meta::List(_)) {
            return Err(syn::Error::new_spanned(
                attr,
                format!("expected #[{}(...)] on a struct", keys.ddl),
            ));
        }

        let parsed = found.get_or_insert_with(StructAttrs::default);
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("table") {
                let value: LitStr = meta.value()?.parse()?;
                if value.value().is_empty() {
                    return Err(syn::Error::new(value.span(), "table name is empty"));
                }
                parsed.table = Some(value.value());
            } else if meta.path.is_ident("primary_key") {
                let value: LitStr = meta.value()?.parse()?;
                let fields: Vec<String> = value
                    .value()
                    .split(',')
                    .map(|f| f.trim().to_string())
                    .filter(|f| !f.is_empty())
                    .collect();
                if fields.is_empty() {
                    return Err(syn::Error::new(value.span(), "primary_key names no fields"));
                }
                parsed.primary_key = Some(fields);
            } else if meta.path.is_ident("index") {
                parsed.indexes.push(meta.value()?.parse()?);
            } else if meta.path.is_ident("constraint") {
                parsed.constraints.push(meta.value()?.parse()?);
            } else {
                return Err(meta.error(
                    "unknown key; expected `table`, `primary_key`, `index` or `constraint`",
                ));
            }
            Ok(())
        })?;
    }

    Ok(found)
}

/// Parse the annotations of one field.
pub(crate) fn parse_field_attrs(
    attrs: &[Attribute],
    keys: &AnnotationKeys,
) -> syn::Result<FieldAttrs> {
    let mut parsed = FieldAttrs::default();

    for attr in attrs {
        let path = attr.path();
        if path.is_ident(keys.column.as_str()) {
            let name = column_name(attr, &keys.column)?;
            parsed.annotations.insert(keys.column.clone(), name.clone());
            if name == "-" {
                parsed.excluded = true;
            } else {
                parsed.column = Some(name);
            }
        } else if path.is_ident(keys.primary_key.as_str()) {
            parsed.primary_key = flag(attr, &keys.primary_key)?;
            parsed
                .annotations
                .insert(keys.primary_key.clone(), parsed.primary_key.to_string());
        } else if path.is_ident(keys.ddl.as_str()) {
            let fragment = match string_value(&attr.meta) {
                Some(lit) => lit.clone(),
                None => {
                    return Err(syn::Error::new_spanned(
                        attr,
                        format!("expected #[{} = \"<column definition>\"]", keys.ddl),
                    ));
                }
            };
            parsed.annotations.insert(keys.ddl.clone(), fragment.value());
            parsed.ddl = Some(fragment);
        } else {
            continue;
        }
        parsed.annotated = true;
    }

    Ok(parsed)
}

/// `#[db = "name"]` or `#[db("name")]`.
fn column_name(attr: &Attribute, key: &str) -> syn::Result<String> {
    let name = match &attr.meta {
        Meta::NameValue(_) => string_value(&attr.meta).map(LitStr::value),
        Meta::List(list) => list.parse_args::<LitStr>().ok().map(|lit| lit.value()),
        Meta::Path(_) => None,
    };
    match name {
        Some(name) if !name.is_empty() => Ok(name),
        _ => Err(syn::Error::new_spanned(
            attr,
            format!("expected #[{0} = \"name\"] or #[{0}(\"name\")]", key),
        )),
    }
}

/// `#[pk]`, `#[pk = true]` or `#[pk = "true"]`.
fn flag(attr: &Attribute, key: &str) -> syn::Result<bool> {
    let value = match &attr.meta {
        Meta::Path(_) => Some(true),
        Meta::NameValue(nv) => match &nv.value {
            Expr::Lit(ExprLit {
                lit: Lit::Bool(b), ..
            }) => Some(b.value),
            Expr::Lit(ExprLit {
                lit: Lit::Str(s), ..
            }) => match s.value().as_str() {
                "true" => Some(true),
                "false" => Some(false),
                _ => None,
            },
            _ => None,
        },
        Meta::List(_) => None,
    };
    value.ok_or_else(|| {
        syn::Error::new_spanned(
            attr,
            format!("expected #[{0}], #[{0} = true] or #[{0} = false]", key),
        )
    })
}

fn string_value(meta: &Meta) -> Option<&LitStr> {
    match meta {
        Meta::NameValue(nv) => match &nv.value {
            Expr::Lit(ExprLit {
                lit: Lit::Str(s), ..
            }) => Some(s),
            _ => None,
        },
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::{ItemStruct, parse_quote};

    fn keys() -> AnnotationKeys {
        AnnotationKeys::default()
    }

    fn field_attrs(item: &ItemStruct) -> syn::Result<FieldAttrs> {
        let field = item.fields.iter().next().unwrap();
        parse_field_attrs(&field.attrs, &keys())
    }

    #[test]
    fn test_struct_attrs() {
        let item: ItemStruct = parse_quote! {
            #[derive(Debug)]
            #[ddl(table = "order_lines", primary_key = "order_id, line")]
            #[ddl(index = "CREATE INDEX a ON order_lines (sku)", index = "CREATE INDEX b ON order_lines (qty)")]
            struct OrderLine { order_id: i64 }
        };
        let attrs = parse_struct_attrs(&item.attrs, &keys()).unwrap().unwrap();
        assert_eq!(attrs.table.as_deref(), Some("order_lines"));
        assert_eq!(
            attrs.primary_key,
            Some(vec!["order_id".to_string(), "line".to_string()])
        );
        assert_eq!(attrs.indexes.len(), 2);
    }

    #[test]
    fn test_struct_without_attrs() {
        let item: ItemStruct = parse_quote! {
            #[derive(Debug)]
            struct Plain { a: i32 }
        };
        assert!(parse_struct_attrs(&item.attrs, &keys()).unwrap().is_none());
    }

    #[test]
    fn test_unknown_struct_key() {
        let item: ItemStruct = parse_quote! {
            #[ddl(tabel = "x")]
            struct Typo { a: i32 }
        };
        let err = parse_struct_attrs(&item.attrs, &keys()).unwrap_err();
        assert!(err.to_string().contains("unknown key"));
    }

    #[test]
    fn test_column_name_forms() {
        let item: ItemStruct = parse_quote! { struct A { #[db = "x"] a: i32 } };
        assert_eq!(field_attrs(&item).unwrap().column.as_deref(), Some("x"));

        let item: ItemStruct = parse_quote! { struct A { #[db("y")] a: i32 } };
        assert_eq!(field_attrs(&item).unwrap().column.as_deref(), Some("y"));

        let item: ItemStruct = parse_quote! { struct A { #[db = "-"] a: i32 } };
        let attrs = field_attrs(&item).unwrap();
        assert!(attrs.excluded);
        assert!(attrs.column.is_none());

        let item: ItemStruct = parse_quote! { struct A { #[db] a: i32 } };
        assert!(field_attrs(&item).is_err());

        let item: ItemStruct = parse_quote! { struct A { #[db = 3] a: i32 } };
        assert!(field_attrs(&item).is_err());
    }

    #[test]
    fn test_primary_key_forms() {
        let item: ItemStruct = parse_quote! { struct A { #[pk] a: i32 } };
        assert!(field_attrs(&item).unwrap().primary_key);

        let item: ItemStruct = parse_quote! { struct A { #[pk = true] a: i32 } };
        assert!(field_attrs(&item).unwrap().primary_key);

        let item: ItemStruct = parse_quote! { struct A { #[pk = "true"] a: i32 } };
        assert!(field_attrs(&item).unwrap().primary_key);

        let item: ItemStruct = parse_quote! { struct A { #[pk = false] a: i32 } };
        let attrs = field_attrs(&item).unwrap();
        assert!(!attrs.primary_key);
        assert!(attrs.annotated);

        let item: ItemStruct = parse_quote! { struct A { #[pk = "yes"] a: i32 } };
        assert!(field_attrs(&item).is_err());
    }

    #[test]
    fn test_annotations_recorded() {
        let item: ItemStruct = parse_quote! {
            struct A {
                #[serde(rename = "mail")]
                #[db = "email_address"]
                #[ddl = "VARCHAR(320) NOT NULL"]
                email: String,
            }
        };
        let attrs = field_attrs(&item).unwrap();
        assert_eq!(attrs.annotations.len(), 2);
        assert_eq!(attrs.annotations["db"], "email_address");
        assert_eq!(attrs.annotations["ddl"], "VARCHAR(320) NOT NULL");
        assert_eq!(attrs.ddl.unwrap().value(), "VARCHAR(320) NOT NULL");
    }

    #[test]
    fn test_custom_keys() {
        let keys = AnnotationKeys::new("column", "sql", "id");
        let item: ItemStruct = parse_quote! {
            struct A {
                #[id]
                #[column = "ident"]
                #[db = "ignored"]
                a: i64,
            }
        };
        let field = item.fields.iter().next().unwrap();
        let attrs = parse_field_attrs(&field.attrs, &keys).unwrap();
        assert!(attrs.primary_key);
        assert_eq!(attrs.column.as_deref(), Some("ident"));
        assert!(!attrs.annotations.contains_key("db"));
    }
}
