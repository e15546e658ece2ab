//! # ddlsync-extract
//!
//! Source extraction for ddlsync: turns annotated declarations into a
//! canonical [`Schema`](ddlsync_schema::Schema).
//!
//! The host language is Rust. A struct is a table declaration when it has a
//! struct-level `#[ddl(...)]` attribute or when any field carries one of the
//! configured annotation keys (`db`, `ddl`, `pk` by default):
//!
//! ```rust,ignore
//! #[ddl(table = "users", index = "CREATE UNIQUE INDEX users_email ON users (email_address)")]
//! pub struct User {
//!     #[pk]
//!     pub id: i64,
//!     #[db = "email_address"]
//!     #[ddl = "VARCHAR(320) NOT NULL"]
//!     pub email: String,
//!     pub nickname: Option<String>,
//!     #[db = "-"]
//!     pub transient: bool,
//! }
//! ```
//!
//! Raw DDL in annotations is parsed by the target dialect through
//! [`FragmentParser`](ddlsync_schema::FragmentParser), so the extractor itself
//! knows no SQL. Other host languages can plug in by implementing
//! [`SourceExtractor`].

mod attrs;
pub mod extractor;
pub mod rust;
mod types;

pub use extractor::SourceExtractor;
pub use rust::RustExtractor;
