//! Configuration for `ddlsync.toml`.
//!
//! The core only ever receives already-resolved values. Loading a file is
//! offered here for convenience; deciding which file to load, and layering
//! command-line flags on top, is the caller's job.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{SchemaError, SchemaResult};

/// Default config file name.
pub const CONFIG_FILE_NAME: &str = "ddlsync.toml";

/// Main configuration structure for `ddlsync.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DdlsyncConfig {
    /// Target SQL dialect.
    #[serde(default)]
    pub dialect: DialectKind,

    /// Annotation key names used by the source extractor.
    #[serde(default)]
    pub annotations: AnnotationKeys,

    /// Migration settings.
    #[serde(default)]
    pub migrate: MigrateSettings,
}

impl DdlsyncConfig {
    /// Load configuration from a file path.
    pub fn from_file(path: impl AsRef<Path>) -> SchemaResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| SchemaError::Io {
            path: path.display().to_string(),
            source: e,
        })?;

        content.parse()
    }
}

impl FromStr for DdlsyncConfig {
    type Err = SchemaError;

    fn from_str(content: &str) -> SchemaResult<Self> {
        let config: DdlsyncConfig =
            toml::from_str(content).map_err(|e| SchemaError::Toml { source: e })?;
        config.annotations.validate()?;
        Ok(config)
    }
}

/// Supported SQL dialects.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DialectKind {
    /// PostgreSQL.
    #[default]
    #[serde(alias = "postgresql", alias = "pg")]
    Postgres,
    /// MySQL / MariaDB.
    #[serde(alias = "mariadb")]
    MySql,
    /// Google Cloud Spanner (GoogleSQL dialect).
    Spanner,
}

impl DialectKind {
    /// All supported dialects.
    pub const ALL: [DialectKind; 3] = [Self::Postgres, Self::MySql, Self::Spanner];

    /// Canonical identifier of the dialect.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Postgres => "postgres",
            Self::MySql => "mysql",
            Self::Spanner => "spanner",
        }
    }
}

impl fmt::Display for DialectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DialectKind {
    type Err = SchemaError;

    fn from_str(s: &str) -> SchemaResult<Self> {
        match s.to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" | "pg" => Ok(Self::Postgres),
            "mysql" | "mariadb" => Ok(Self::MySql),
            "spanner" => Ok(Self::Spanner),
            other => Err(SchemaError::config(format!(
                "unknown dialect `{}` (expected postgres, mysql or spanner)",
                other
            ))),
        }
    }
}

/// Names of the annotations the source extractor looks for.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnnotationKeys {
    /// Overrides the column name of a field.
    pub column: String,
    /// Raw DDL override for a field, and table-level settings on a struct.
    pub ddl: String,
    /// Marks a field as (part of) the primary key.
    pub primary_key: String,
}

impl Default for AnnotationKeys {
    fn default() -> Self {
        Self {
            column: "db".to_string(),
            ddl: "ddl".to_string(),
            primary_key: "pk".to_string(),
        }
    }
}

impl AnnotationKeys {
    /// Create a key set.
    pub fn new(
        column: impl Into<String>,
        ddl: impl Into<String>,
        primary_key: impl Into<String>,
    ) -> Self {
        Self {
            column: column.into(),
            ddl: ddl.into(),
            primary_key: primary_key.into(),
        }
    }

    /// Check that every key is a usable identifier and that keys are distinct.
    pub fn validate(&self) -> SchemaResult<()> {
        for (role, key) in self.roles() {
            let mut chars = key.chars();
            let valid = match chars.next() {
                Some(c) if c.is_ascii_alphabetic() || c == '_' => {
                    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
                }
                _ => false,
            };
            if !valid {
                return Err(SchemaError::config(format!(
                    "annotation key for {} must be an identifier, got `{}`",
                    role, key
                )));
            }
        }

        if self.column == self.ddl || self.column == self.primary_key || self.ddl == self.primary_key
        {
            return Err(SchemaError::config(format!(
                "annotation keys must be distinct (column = `{}`, ddl = `{}`, primary_key = `{}`)",
                self.column, self.ddl, self.primary_key
            )));
        }

        Ok(())
    }

    /// Is `name` one of the configured keys?
    pub fn is_key(&self, name: &str) -> bool {
        name == self.column || name == self.ddl || name == self.primary_key
    }

    fn roles(&self) -> [(&'static str, &str); 3] {
        [
            ("column", self.column.as_str()),
            ("ddl", self.ddl.as_str()),
            ("primary_key", self.primary_key.as_str()),
        ]
    }
}

/// Migration settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct MigrateSettings {
    /// Skip the confirmation gate before writing a migration.
    pub auto_approve: bool,
}
