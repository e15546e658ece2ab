//! Pest grammar for DDL text.

use pest_derive::Parser;

/// The DDL parser shared by every dialect.
#[derive(Parser)]
#[grammar = "parser/ddl.pest"]
pub struct DdlParser;
