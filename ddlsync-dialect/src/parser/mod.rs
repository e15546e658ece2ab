//! DDL parsing.
//!
//! Every dialect shares one pest grammar ([`grammar::DdlParser`]) that accepts
//! the union of the three syntaxes. Lowering the parse tree into the canonical
//! model is where dialect rules apply: constructs a dialect does not have, or
//! that ddlsync cannot model, are rejected there with
//! [`SchemaError::UnsupportedFeature`].

mod grammar;
mod lower;

use ddlsync_schema::{ColumnFragment, Constraint, Index, Location, Schema, SchemaError, SchemaResult};
use pest::Parser;
use pest::error::InputLocation;
use tracing::debug;

use crate::dialect::Dialect;
pub use grammar::{DdlParser, Rule};
use lower::Lowerer;

/// Parse a DDL document into a canonical schema.
pub(crate) fn parse_ddl(dialect: &dyn Dialect, input: &str) -> SchemaResult<Schema> {
    let mut pairs = DdlParser::parse(Rule::ddl, input).map_err(|e| syntax_error(input, 0, e))?;
    let lowerer = Lowerer::new(dialect, input);
    let mut schema = ddlsync_schema::SchemaBuilder::new();

    if let Some(ddl) = pairs.next() {
        for statement in ddl.into_inner() {
            if statement.as_rule() == Rule::statement {
                lowerer.statement(&mut schema, statement)?;
            }
        }
    }

    let schema = schema.build()?;
    for table in schema.tables() {
        dialect.check_table(table)?;
        for column in table.columns() {
            dialect.check_column(table, column)?;
        }
    }

    debug!(
        dialect = dialect.kind().as_str(),
        tables = schema.len(),
        "parsed DDL"
    );
    Ok(schema)
}

/// Parse a column definition without its leading name.
pub(crate) fn parse_column_fragment(
    dialect: &dyn Dialect,
    fragment: &str,
) -> SchemaResult<ColumnFragment> {
    let mut pairs = DdlParser::parse(Rule::column_fragment, fragment)
        .map_err(|e| syntax_error(fragment, 0, e))?;
    let root = pairs.next().ok_or_else(|| empty_input(fragment))?;
    Lowerer::new(dialect, fragment).column_body(None, root.into_inner())
}

/// Parse a standalone `CREATE INDEX` statement.
pub(crate) fn parse_index_statement(
    dialect: &dyn Dialect,
    statement: &str,
) -> SchemaResult<(String, Index)> {
    let mut pairs = DdlParser::parse(Rule::create_index_statement, statement)
        .map_err(|e| syntax_error(statement, 0, e))?;
    let create = pairs
        .next()
        .and_then(|root| root.into_inner().find(|p| p.as_rule() == Rule::create_index))
        .ok_or_else(|| empty_input(statement))?;
    let parsed = Lowerer::new(dialect, statement).index_statement(create)?;
    Ok((parsed.table, parsed.index))
}

/// Parse a table constraint fragment.
pub(crate) fn parse_table_constraint(
    dialect: &dyn Dialect,
    fragment: &str,
) -> SchemaResult<Constraint> {
    let mut pairs = DdlParser::parse(Rule::constraint_fragment, fragment)
        .map_err(|e| syntax_error(fragment, 0, e))?;
    let constraint = pairs
        .next()
        .and_then(|root| root.into_inner().find(|p| p.as_rule() == Rule::table_constraint))
        .ok_or_else(|| empty_input(fragment))?;
    Lowerer::new(dialect, fragment).table_constraint(constraint)
}

/// 1-based line and column of a byte offset.
pub(crate) fn location_at(input: &str, offset: usize) -> Location {
    let before = &input[..offset.min(input.len())];
    let line = before.matches('\n').count() + 1;
    let column = before
        .rsplit('\n')
        .next()
        .map_or(0, |l| l.chars().count())
        + 1;
    Location::new(line, column)
}

/// Convert a pest error on a slice starting at `base` of `input`.
pub(crate) fn syntax_error(input: &str, base: usize, err: pest::error::Error<Rule>) -> SchemaError {
    let (start, end) = match err.location {
        InputLocation::Pos(pos) => (pos, pos),
        InputLocation::Span((start, end)) => (start, end),
    };
    let err = err.renamed_rules(rule_name);
    let offset = base + start;
    SchemaError::syntax(
        input,
        location_at(input, offset),
        offset,
        end - start,
        err.variant.message().into_owned(),
    )
}

fn empty_input(input: &str) -> SchemaError {
    SchemaError::syntax(input, Location::new(1, 1), 0, 0, "empty input")
}

/// Friendly rule names for error messages: `kw_table` reads as `TABLE`.
fn rule_name(rule: &Rule) -> String {
    if *rule == Rule::EOI {
        return "end of input".to_string();
    }
    let name = format!("{:?}", rule);
    match name.strip_prefix("kw_") {
        Some(keyword) => keyword.to_ascii_uppercase(),
        None => name.replace('_', " "),
    }
}
