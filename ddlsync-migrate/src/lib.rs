//! # ddlsync-migrate
//!
//! Schema differ and migration emitter for ddlsync.
//!
//! This crate provides functionality for:
//! - Diffing a described schema against a destination schema
//! - Ordering the resulting operations so every statement is valid when it runs
//! - Rendering operations with the active dialect's printer
//! - Writing the migration behind a confirmation gate, atomically
//!
//! ## Architecture
//!
//! Both sides are loaded into the canonical model, either from annotated Rust
//! sources or from DDL. The differ maps them into the dialect's canonical
//! image and compares them; the emitter renders and writes the result.
//!
//! ```text
//! ┌──────────────┐     ┌────────────────┐     ┌────────────────┐
//! │ Rust sources │────▶│                │     │                │
//! └──────────────┘     │ Schema Differ  │────▶│ Migration Plan │
//! ┌──────────────┐     │                │     │                │
//! │ DDL          │────▶│                │     └────────────────┘
//! └──────────────┘     └────────────────┘             │
//!                                                     ▼
//!                      ┌────────────────┐     ┌────────────────┐
//!                      │ Output (atomic)│◀────│ Confirm        │
//!                      └────────────────┘     └────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust
//! use ddlsync_migrate::{EngineConfig, MigrationEngine, Outcome, SchemaSource};
//! use ddlsync_schema::DialectKind;
//!
//! let engine = MigrationEngine::new(EngineConfig::new().dialect(DialectKind::Postgres)).unwrap();
//!
//! let source = SchemaSource::RustText(
//!     r#"
//!     struct Users {
//!         #[pk]
//!         id: i64,
//!         nickname: Option<String>,
//!     }
//!     "#
//!     .to_string(),
//! );
//! let destination = SchemaSource::DdlText("CREATE TABLE users (id BIGINT PRIMARY KEY);".to_string());
//!
//! let plan = engine.diff(&source, &destination).unwrap();
//! assert_eq!(plan.summary(), "Add 1 column");
//!
//! match engine.plan(&source, &destination).unwrap() {
//!     Outcome::Planned(script) => {
//!         assert_eq!(
//!             script.to_string(),
//!             "ALTER TABLE \"users\" ADD COLUMN \"nickname\" TEXT;\n"
//!         );
//!     }
//!     other => panic!("unexpected outcome {:?}", other),
//! }
//! ```

pub mod diff;
pub mod emit;
pub mod engine;
pub mod error;
mod order;

pub use diff::SchemaDiffer;
pub use emit::{AutoApprove, Confirm, Emitter, MigrationPlan, MigrationScript, Outcome, Sink};
pub use engine::{EngineConfig, MigrationEngine, SchemaSource};
pub use error::{MigrateResult, MigrationError};
