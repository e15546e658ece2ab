//! # ddlsync-schema
//!
//! Canonical schema model for ddlsync.
//!
//! This crate provides:
//! - The dialect-neutral model: [`Schema`], [`Table`], [`Column`], [`Constraint`], [`Index`]
//! - The normalized type descriptor [`ColumnType`]
//! - [`Operation`], the unit of change produced by the differ
//! - Configuration for annotation keys and dialect selection (`ddlsync.toml`)
//! - The [`FragmentParser`] seam used by source extractors to resolve raw DDL overrides
//!
//! Models are assembled with [`SchemaBuilder`] and validated once, on
//! [`SchemaBuilder::build`]. A built [`Schema`] is immutable; transformations
//! such as [`Schema::map_columns`] return a new model.
//!
//! ## Example
//!
//! ```rust
//! use ddlsync_schema::{BaseType, Column, ColumnType, SchemaBuilder, TableBuilder};
//!
//! let schema = SchemaBuilder::new()
//!     .table(
//!         TableBuilder::new("users")
//!             .column(Column::new("id", ColumnType::new(BaseType::BigInt)))
//!             .column(Column::new("email", ColumnType::varchar(320)).nullable(true))
//!             .primary_key(["id"]),
//!     )
//!     .build()
//!     .unwrap();
//!
//! let users = schema.table("users").unwrap();
//! assert!(users.column("email").unwrap().is_nullable());
//! ```

pub mod config;
pub mod error;
pub mod fragment;
pub mod model;
pub mod operation;

pub use config::{AnnotationKeys, DdlsyncConfig, DialectKind, MigrateSettings};
pub use error::{ErrorKind, Location, SchemaError, SchemaResult};
pub use fragment::{ColumnFragment, FragmentParser};
pub use model::*;
pub use operation::{ApplyRules, Operation, OperationKind};
