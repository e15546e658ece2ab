//! Column definitions.

use std::collections::BTreeMap;

use serde::Serialize;

use super::ColumnType;

/// A column in a table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Column {
    /// Column name.
    pub name: String,
    /// Normalized type.
    pub ty: ColumnType,
    /// Whether NULL is allowed.
    pub nullable: bool,
    /// Default expression, as raw text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    /// Values are generated by the database (serial, identity, auto increment).
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub auto_increment: bool,
    /// Raw annotation key/value pairs from the source declaration.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: BTreeMap<String, String>,
    /// Verbatim column definition fragment that replaces the synthesized one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_definition: Option<String>,
}

impl Column {
    /// Create a NOT NULL column with no default.
    pub fn new(name: impl Into<String>, ty: ColumnType) -> Self {
        Self {
            name: name.into(),
            ty,
            nullable: false,
            default: None,
            auto_increment: false,
            annotations: BTreeMap::new(),
            raw_definition: None,
        }
    }

    /// Set nullability.
    pub fn nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    /// Set the default expression.
    pub fn default_value(mut self, expr: impl Into<String>) -> Self {
        self.default = Some(expr.into());
        self
    }

    /// Mark the column as database-generated.
    pub fn auto_increment(mut self) -> Self {
        self.auto_increment = true;
        self
    }

    /// Record a raw annotation.
    pub fn annotation(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.annotations.insert(key.into(), value.into());
        self
    }

    /// Set the verbatim definition fragment.
    pub fn raw_definition(mut self, fragment: impl Into<String>) -> Self {
        self.raw_definition = Some(fragment.into());
        self
    }

    /// Get the column name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Check if the column accepts NULL.
    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    /// Compare everything that ends up in the database.
    ///
    /// Annotations and the verbatim fragment are rendering hints and are not
    /// part of the comparison.
    pub fn same_definition(&self, other: &Column) -> bool {
        self.name == other.name
            && self.ty == other.ty
            && self.nullable == other.nullable
            && self.default == other.default
            && self.auto_increment == other.auto_increment
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::BaseType;

    #[test]
    fn test_column_builder() {
        let col = Column::new("email", ColumnType::varchar(320))
            .nullable(true)
            .default_value("''")
            .annotation("db", "email");

        assert_eq!(col.name(), "email");
        assert!(col.is_nullable());
        assert_eq!(col.default.as_deref(), Some("''"));
        assert_eq!(col.annotations.get("db").map(String::as_str), Some("email"));
    }

    #[test]
    fn test_same_definition_ignores_hints() {
        let a = Column::new("id", ColumnType::new(BaseType::BigInt)).annotation("pk", "");
        let b = Column::new("id", ColumnType::new(BaseType::BigInt)).raw_definition("BIGINT NOT NULL");
        assert!(a.same_definition(&b));
        assert_ne!(a, b);
    }

    #[test]
    fn test_same_definition_detects_changes() {
        let a = Column::new("id", ColumnType::new(BaseType::BigInt));
        assert!(!a.same_definition(&a.clone().nullable(true)));
        assert!(!a.same_definition(&a.clone().default_value("0")));
        assert!(!a.same_definition(&a.clone().auto_increment()));
        assert!(!a.same_definition(&Column::new("id", ColumnType::new(BaseType::Integer))));
    }
}
