//! CLI error types and result alias.

use ddlsync_migrate::MigrationError;
use ddlsync_schema::SchemaError;
use miette::Diagnostic;
use thiserror::Error;

/// Result type alias for CLI operations
pub type CliResult<T> = Result<T, CliError>;

/// CLI error types
#[derive(Error, Debug, Diagnostic)]
pub enum CliError {
    /// Schema loading, parsing or printing error
    #[error(transparent)]
    #[diagnostic(transparent)]
    Schema(#[from] SchemaError),

    /// Diffing or emitting error
    #[error(transparent)]
    #[diagnostic(transparent)]
    Migration(#[from] MigrationError),

    /// IO error
    #[error("IO error: {0}")]
    #[diagnostic(code(ddlsync::cli::io))]
    Io(#[from] std::io::Error),

    /// JSON output error
    #[error("JSON error: {0}")]
    #[diagnostic(code(ddlsync::cli::json))]
    Json(#[from] serde_json::Error),
}
