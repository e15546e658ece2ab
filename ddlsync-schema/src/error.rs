//! Error types for model construction, parsing and configuration.

// These warnings are false positives - the fields are used by derive macros
#![allow(unused_assignments)]

use std::fmt;

use miette::Diagnostic;
use thiserror::Error;

use crate::config::DialectKind;

/// Result type for schema operations.
pub type SchemaResult<T> = Result<T, SchemaError>;

/// A position in an input document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Location {
    /// File the input was read from, when known.
    pub file: Option<String>,
    /// 1-based line.
    pub line: usize,
    /// 1-based column.
    pub column: usize,
}

impl Location {
    /// Create a location without a file name.
    pub fn new(line: usize, column: usize) -> Self {
        Self {
            file: None,
            line,
            column,
        }
    }

    /// Attach a file name.
    pub fn in_file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.file {
            Some(file) => write!(f, "{}:{}:{}", file, self.line, self.column),
            None => write!(f, "line {}, column {}", self.line, self.column),
        }
    }
}

/// Coarse classification of a [`SchemaError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed source annotation or destination DDL.
    Parse,
    /// A construct with no canonical representation in the dialect.
    UnsupportedFeature,
    /// A canonical-model invariant was violated.
    Validation,
    /// Reading input failed.
    Io,
    /// Invalid configuration.
    Config,
}

/// Errors that can occur while building, parsing or printing schemas.
#[derive(Error, Debug, Diagnostic)]
pub enum SchemaError {
    /// Error reading a file.
    #[error("failed to read file: {path}")]
    #[diagnostic(code(ddlsync::schema::io_error))]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Syntax error in DDL text.
    #[error("syntax error at {location}: {message}")]
    #[diagnostic(code(ddlsync::schema::syntax_error))]
    Syntax {
        location: Location,
        message: String,
        #[source_code]
        src: String,
        #[label("error here")]
        span: miette::SourceSpan,
    },

    /// Malformed annotation on a source declaration.
    #[error("invalid annotation on `{declaration}` at {location}: {message}")]
    #[diagnostic(code(ddlsync::schema::invalid_annotation))]
    InvalidAnnotation {
        declaration: String,
        location: Location,
        message: String,
    },

    /// Construct that the dialect cannot represent canonically.
    #[error("unsupported {dialect} feature: {construct}")]
    #[diagnostic(
        code(ddlsync::schema::unsupported_feature),
        help("ddlsync refuses to drop constructs it cannot model; remove it or manage it by hand")
    )]
    UnsupportedFeature {
        construct: String,
        dialect: DialectKind,
    },

    /// Canonical-model invariant violation.
    #[error("invalid table `{table}`: {message}")]
    #[diagnostic(code(ddlsync::schema::validation))]
    Validation { table: String, message: String },

    /// Configuration error.
    #[error("configuration error: {message}")]
    #[diagnostic(code(ddlsync::schema::config_error))]
    Config { message: String },

    /// TOML parsing error.
    #[error("failed to parse TOML")]
    #[diagnostic(code(ddlsync::schema::toml_error))]
    Toml {
        #[source]
        source: toml::de::Error,
    },
}

impl SchemaError {
    /// Create a syntax error pointing into `src`.
    pub fn syntax(
        src: impl Into<String>,
        location: Location,
        offset: usize,
        len: usize,
        message: impl Into<String>,
    ) -> Self {
        Self::Syntax {
            location,
            message: message.into(),
            src: src.into(),
            span: (offset, len).into(),
        }
    }

    /// Create an invalid annotation error.
    pub fn invalid_annotation(
        declaration: impl Into<String>,
        location: Location,
        message: impl Into<String>,
    ) -> Self {
        Self::InvalidAnnotation {
            declaration: declaration.into(),
            location,
            message: message.into(),
        }
    }

    /// Create an unsupported feature error.
    pub fn unsupported(dialect: DialectKind, construct: impl Into<String>) -> Self {
        Self::UnsupportedFeature {
            construct: construct.into(),
            dialect,
        }
    }

    /// Create a validation error.
    pub fn validation(table: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            table: table.into(),
            message: message.into(),
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Syntax { .. } | Self::InvalidAnnotation { .. } => ErrorKind::Parse,
            Self::UnsupportedFeature { .. } => ErrorKind::UnsupportedFeature,
            Self::Validation { .. } => ErrorKind::Validation,
            Self::Io { .. } => ErrorKind::Io,
            Self::Config { .. } | Self::Toml { .. } => ErrorKind::Config,
        }
    }
}
