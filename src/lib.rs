//! # ddlsync
//!
//! Keep SQL DDL in sync with annotated Rust structs.
//!
//! ddlsync provides:
//! - A canonical, dialect-neutral schema model
//! - Parsers and printers for PostgreSQL, MySQL and Cloud Spanner DDL
//! - An extractor that reads table declarations from Rust source
//! - A differ that plans an ordered migration between two schemas
//!
//! ## Quick Start
//!
//! ```rust
//! use ddlsync::prelude::*;
//!
//! let engine = MigrationEngine::new(EngineConfig::new().dialect(DialectKind::MySql)).unwrap();
//! let rust = SchemaSource::RustText("struct Tag { #[pk] id: i32, label: String }".into());
//! let ddl = SchemaSource::DdlText(String::new());
//!
//! let plan = engine.diff(&rust, &ddl).unwrap();
//! assert_eq!(plan.summary(), "Create 1 table");
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

/// Schema model, configuration and errors.
pub mod schema {
    pub use ddlsync_schema::*;
}

/// Dialect parsers and printers.
pub mod dialect {
    pub use ddlsync_dialect::*;
}

/// Rust source extraction.
pub mod extract {
    pub use ddlsync_extract::*;
}

/// Diffing and migration output.
pub mod migrate {
    pub use ddlsync_migrate::*;
}

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::dialect::{Dialect, dialect};
    pub use crate::extract::{RustExtractor, SourceExtractor};
    pub use crate::migrate::{
        EngineConfig, MigrationEngine, MigrationPlan, MigrationScript, SchemaDiffer, SchemaSource,
    };
    pub use crate::schema::{AnnotationKeys, DialectKind, Operation, Schema, SchemaError};
}

// Re-export key types at the crate root
pub use migrate::{MigrationEngine, MigrationError};
pub use schema::{Schema, SchemaError};
