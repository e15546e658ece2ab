//! Mapping from Rust field types to canonical column types.

use ddlsync_schema::{BaseType, ColumnType};
use syn::{GenericArgument, PathArguments, Type};

/// Canonical type and nullability for a field type, if it has one.
///
/// `Option<T>` makes the column nullable, `Vec<u8>` is binary and any other
/// `Vec<T>` is an array of `T`.
pub(crate) fn column_type(ty: &Type) -> Option<(ColumnType, bool)> {
    match generic_arg(ty, "Option") {
        Some(inner) => value_type(inner).map(|t| (t, true)),
        None => value_type(ty).map(|t| (t, false)),
    }
}

fn value_type(ty: &Type) -> Option<ColumnType> {
    match generic_arg(ty, "Vec") {
        Some(inner) if is_named(inner, "u8") => Some(ColumnType::new(BaseType::Bytes)),
        Some(inner) => scalar_type(inner).map(ColumnType::array),
        None => scalar_type(ty),
    }
}

fn scalar_type(ty: &Type) -> Option<ColumnType> {
    match ty {
        Type::Group(group) => scalar_type(&group.elem),
        Type::Paren(paren) => scalar_type(&paren.elem),
        Type::Reference(reference) => match &*reference.elem {
            Type::Slice(slice) if is_named(&slice.elem, "u8") => {
                Some(ColumnType::new(BaseType::Bytes))
            }
            elem if is_named(elem, "str") => Some(ColumnType::new(BaseType::Text)),
            _ => None,
        },
        Type::Path(path) => {
            let segment = path.path.segments.last()?;
            let base = match segment.ident.to_string().as_str() {
                "bool" => BaseType::Boolean,
                "i8" | "i16" | "u8" => BaseType::SmallInt,
                "i32" | "u16" => BaseType::Integer,
                "i64" | "u32" | "u64" | "isize" | "usize" => BaseType::BigInt,
                "f32" => BaseType::Real,
                "f64" => BaseType::Double,
                "String" | "char" => BaseType::Text,
                "Bytes" => BaseType::Bytes,
                "NaiveDate" | "Date" => BaseType::Date,
                "NaiveTime" | "Time" => BaseType::Time,
                "NaiveDateTime" | "PrimitiveDateTime" => BaseType::Timestamp,
                "DateTime" | "OffsetDateTime" | "Timestamp" => BaseType::TimestampTz,
                "Uuid" => BaseType::Uuid,
                "Json" => BaseType::Json,
                "Value" if is_serde_json(path) => BaseType::Json,
                "Decimal" | "BigDecimal" => BaseType::Decimal,
                _ => return None,
            };
            Some(ColumnType::new(base))
        }
        _ => None,
    }
}

/// `Value` alone, or any path through `serde_json`.
fn is_serde_json(path: &syn::TypePath) -> bool {
    let segments = &path.path.segments;
    segments.len() == 1 || segments.iter().any(|s| s.ident == "serde_json")
}

/// The single type argument of `Wrapper<T>`.
fn generic_arg<'a>(ty: &'a Type, wrapper: &str) -> Option<&'a Type> {
    let Type::Path(path) = ty else {
        return None;
    };
    let segment = path.path.segments.last()?;
    if segment.ident != wrapper {
        return None;
    }
    let PathArguments::AngleBracketed(args) = &segment.arguments else {
        return None;
    };
    match (args.args.len(), args.args.first()) {
        (1, Some(GenericArgument::Type(inner))) => Some(inner),
        _ => None,
    }
}

fn is_named(ty: &Type, name: &str) -> bool {
    match ty {
        Type::Path(path) => path.qself.is_none() && path.path.is_ident(name),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use syn::parse_quote;

    fn map(ty: Type) -> Option<(ColumnType, bool)> {
        column_type(&ty)
    }

    #[test]
    fn test_scalar_types() {
        assert_eq!(
            map(parse_quote!(bool)),
            Some((ColumnType::new(BaseType::Boolean), false))
        );
        assert_eq!(
            map(parse_quote!(u16)),
            Some((ColumnType::new(BaseType::Integer), false))
        );
        assert_eq!(
            map(parse_quote!(u64)),
            Some((ColumnType::new(BaseType::BigInt), false))
        );
        assert_eq!(
            map(parse_quote!(&'a str)),
            Some((ColumnType::new(BaseType::Text), false))
        );
        assert_eq!(
            map(parse_quote!(chrono::DateTime<chrono::Utc>)),
            Some((ColumnType::new(BaseType::TimestampTz), false))
        );
        assert_eq!(
            map(parse_quote!(serde_json::Value)),
            Some((ColumnType::new(BaseType::Json), false))
        );
        assert_eq!(
            map(parse_quote!(rust_decimal::Decimal)),
            Some((ColumnType::new(BaseType::Decimal), false))
        );
    }

    #[test]
    fn test_option_is_nullable() {
        assert_eq!(
            map(parse_quote!(Option<String>)),
            Some((ColumnType::new(BaseType::Text), true))
        );
        assert_eq!(
            map(parse_quote!(std::option::Option<uuid::Uuid>)),
            Some((ColumnType::new(BaseType::Uuid), true))
        );
    }

    #[test]
    fn test_vec_types() {
        assert_eq!(
            map(parse_quote!(Vec<u8>)),
            Some((ColumnType::new(BaseType::Bytes), false))
        );
        assert_eq!(
            map(parse_quote!(&[u8])),
            Some((ColumnType::new(BaseType::Bytes), false))
        );
        assert_eq!(
            map(parse_quote!(Option<Vec<i32>>)),
            Some((ColumnType::new(BaseType::Integer).array(), true))
        );
        assert_eq!(
            map(parse_quote!(Vec<String>)),
            Some((ColumnType::new(BaseType::Text).array(), false))
        );
    }

    #[test]
    fn test_unmappable_types() {
        assert_eq!(map(parse_quote!(HashMap<String, String>)), None);
        assert_eq!(map(parse_quote!(Vec<Vec<i32>>)), None);
        assert_eq!(map(parse_quote!(Vec<Option<i32>>)), None);
        assert_eq!(map(parse_quote!(Option<Option<i32>>)), None);
        assert_eq!(map(parse_quote!(other::Value)), None);
        assert_eq!(map(parse_quote!((i32, i32))), None);
    }
}
