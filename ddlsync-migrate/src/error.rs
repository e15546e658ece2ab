//! Error types for the migration engine.

use std::path::PathBuf;

use ddlsync_schema::SchemaError;
use miette::Diagnostic;
use thiserror::Error;

/// Result type alias for migration operations.
pub type MigrateResult<T> = Result<T, MigrationError>;

/// Errors that can occur while diffing schemas or emitting migrations.
#[derive(Debug, Error, Diagnostic)]
pub enum MigrationError {
    /// Loading, validating or printing a schema failed.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Schema(#[from] SchemaError),

    /// A required change has no safe single-statement representation.
    #[error("cannot migrate {}: {message}", target(.table, .column))]
    #[diagnostic(
        code(ddlsync::migrate::differ_error),
        help("change the destination by hand, or split the change into steps the dialect supports")
    )]
    Differ {
        /// Table being changed.
        table: String,
        /// Column being changed, when the problem is column-level.
        column: Option<String>,
        /// What cannot be expressed.
        message: String,
    },

    /// Writing the migration failed.
    #[error("failed to write {}", .path.display())]
    #[diagnostic(code(ddlsync::migrate::io_error))]
    Io {
        /// Output path.
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The requested output cannot be produced.
    #[error("output error: {message}")]
    #[diagnostic(code(ddlsync::migrate::output_error))]
    Output {
        /// What went wrong.
        message: String,
    },
}

impl MigrationError {
    /// Create a column-level differ error.
    pub fn column_change(
        table: impl Into<String>,
        column: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Differ {
            table: table.into(),
            column: Some(column.into()),
            message: message.into(),
        }
    }

    /// Create a table-level differ error.
    pub fn table_change(table: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Differ {
            table: table.into(),
            column: None,
            message: message.into(),
        }
    }

    /// Create an I/O error for `path`.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create an output error.
    pub fn output(message: impl Into<String>) -> Self {
        Self::Output {
            message: message.into(),
        }
    }
}

/// `table` or `table.column`, backticked.
fn target(table: &str, column: &Option<String>) -> String {
    match column {
        Some(column) => format!("`{}.{}`", table, column),
        None => format!("`{}`", table),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ddlsync_schema::DialectKind;

    #[test]
    fn test_differ_error_display() {
        let err = MigrationError::column_change(
            "users",
            "age",
            "type BIGINT cannot become INTEGER in a single ALTER",
        );
        assert_eq!(
            err.to_string(),
            "cannot migrate `users.age`: type BIGINT cannot become INTEGER in a single ALTER"
        );

        let err = MigrationError::table_change("users", "the primary key cannot change");
        assert_eq!(
            err.to_string(),
            "cannot migrate `users`: the primary key cannot change"
        );
    }

    #[test]
    fn test_schema_error_is_transparent() {
        let err: MigrationError =
            SchemaError::unsupported(DialectKind::Spanner, "TIME type").into();
        assert_eq!(err.to_string(), "unsupported spanner feature: TIME type");
        assert_eq!(
            err.code().map(|c| c.to_string()).as_deref(),
            Some("ddlsync::schema::unsupported_feature")
        );
    }

    #[test]
    fn test_io_error_names_path() {
        let err = MigrationError::io(
            "out/schema.sql",
            std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        );
        assert_eq!(err.to_string(), "failed to write out/schema.sql");
    }
}
