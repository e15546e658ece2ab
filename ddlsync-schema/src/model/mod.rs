//! The canonical, dialect-neutral schema model.

mod column;
mod constraint;
mod index;
mod schema;
mod table;
mod types;

pub use column::*;
pub use constraint::*;
pub use index::*;
pub use schema::*;
pub use table::*;
pub use types::*;
