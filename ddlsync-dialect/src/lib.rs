//! # ddlsync-dialect
//!
//! SQL dialects for ddlsync.
//!
//! This crate provides:
//! - A shared pest grammar for PostgreSQL, MySQL and Spanner DDL
//! - Per-dialect lowering from DDL text into the canonical [`Schema`](ddlsync_schema::Schema)
//! - Per-dialect printers for whole schemas and for operation lists
//! - The type tables between native types and [`ColumnType`](ddlsync_schema::ColumnType)
//!
//! Every dialect implements [`Dialect`]; [`dialect`] returns the
//! implementation for a [`DialectKind`](ddlsync_schema::DialectKind).
//!
//! ## Example
//!
//! ```rust
//! use ddlsync_dialect::dialect;
//! use ddlsync_schema::DialectKind;
//!
//! let pg = dialect(DialectKind::Postgres);
//! let schema = pg
//!     .parse("CREATE TABLE users (id BIGINT PRIMARY KEY, email TEXT NOT NULL);")
//!     .unwrap();
//!
//! let mysql = dialect(DialectKind::MySql);
//! let ddl = mysql.print_schema(&schema).unwrap();
//! assert!(ddl.starts_with("CREATE TABLE `users`"));
//! ```

pub mod defaults;
pub mod dialect;
pub mod mysql;
pub mod parser;
pub mod postgres;
pub mod printer;
pub mod spanner;

pub use dialect::{Dialect, NamePart, NativeType, TypeArg, dialect};
pub use mysql::MySql;
pub use postgres::Postgres;
pub use printer::script;
pub use spanner::Spanner;
