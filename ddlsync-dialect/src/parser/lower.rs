//! Lowering of parse trees into the canonical model.

use ddlsync_schema::{
    Column, ColumnFragment, Constraint, DialectKind, Index, IndexColumn, Reference,
    ReferentialAction, SchemaBuilder, SchemaError, SchemaResult, TableBuilder,
};
use pest::Parser;
use pest::iterators::Pair;
use tracing::debug;

use super::grammar::{DdlParser, Rule};
use super::{location_at, syntax_error};
use crate::defaults;
use crate::dialect::{Dialect, NamePart, NativeType, TypeArg};

/// A `CREATE INDEX` statement after lowering.
pub(crate) struct IndexStatement {
    pub table: String,
    pub index: Index,
    pub if_not_exists: bool,
}

/// Walks parse trees for one input document.
pub(crate) struct Lowerer<'a> {
    dialect: &'a dyn Dialect,
    input: &'a str,
}

impl<'a> Lowerer<'a> {
    pub(crate) fn new(dialect: &'a dyn Dialect, input: &'a str) -> Self {
        Self { dialect, input }
    }

    fn kind(&self) -> DialectKind {
        self.dialect.kind()
    }

    fn unsupported(&self, construct: impl Into<String>) -> SchemaError {
        SchemaError::unsupported(self.kind(), construct)
    }

    // ==================== Statements ====================

    pub(crate) fn statement(
        &self,
        schema: &mut SchemaBuilder,
        pair: Pair<'_, Rule>,
    ) -> SchemaResult<()> {
        let Some(inner) = pair.into_inner().next() else {
            return Ok(());
        };
        match inner.as_rule() {
            Rule::create_table => self.create_table(schema, inner),
            Rule::create_index => {
                let parsed = self.index_statement(inner)?;
                let Some(table) = schema.table_mut(&parsed.table) else {
                    return Err(SchemaError::validation(
                        parsed.table,
                        format!("index `{}` on unknown table", parsed.index.name),
                    ));
                };
                if parsed.if_not_exists && table.has_index(&parsed.index.name) {
                    debug!(index = %parsed.index.name, "index exists, skipping");
                    return Ok(());
                }
                table.add_index(parsed.index);
                Ok(())
            }
            Rule::alter_table => self.alter_table(schema, inner),
            Rule::set_statement => {
                debug!(statement = inner.as_str().trim(), "ignoring SET statement");
                Ok(())
            }
            Rule::other_statement => Err(self.other_statement(inner)),
            _ => Ok(()),
        }
    }

    /// Explain a statement the grammar did not recognize.
    ///
    /// Statements that look like ones we model are re-parsed on their own so
    /// the syntax error points at the offending token. Anything else is a
    /// statement kind ddlsync does not model.
    fn other_statement(&self, pair: Pair<'_, Rule>) -> SchemaError {
        let text = pair.as_str();
        let start = pair.as_span().start();
        let words: Vec<String> = text
            .split(|c: char| c.is_whitespace() || c == '(')
            .filter(|w| !w.is_empty())
            .take(3)
            .map(|w| w.to_ascii_uppercase())
            .collect();
        let words: Vec<&str> = words.iter().map(String::as_str).collect();

        let rule = match words.as_slice() {
            ["CREATE", "TABLE", ..] => Some(Rule::create_table_statement),
            ["CREATE", "INDEX", ..]
            | ["CREATE", "UNIQUE" | "NULL_FILTERED", "INDEX", ..] => {
                Some(Rule::create_index_statement)
            }
            ["ALTER", "TABLE", ..] => Some(Rule::alter_table_statement),
            _ => None,
        };

        match rule {
            Some(rule) => match DdlParser::parse(rule, text) {
                Err(err) => syntax_error(self.input, start, err),
                Ok(_) => SchemaError::syntax(
                    self.input,
                    location_at(self.input, start),
                    start,
                    text.len(),
                    "unrecognized statement",
                ),
            },
            None => self.unsupported(format!(
                "{} statement",
                words.iter().take(2).copied().collect::<Vec<_>>().join(" ")
            )),
        }
    }

    // ==================== CREATE TABLE ====================

    fn create_table(&self, schema: &mut SchemaBuilder, pair: Pair<'_, Rule>) -> SchemaResult<()> {
        let mut table: Option<TableBuilder> = None;
        let mut if_not_exists = false;

        for item in pair.into_inner() {
            match item.as_rule() {
                Rule::if_not_exists => if_not_exists = true,
                Rule::qualified_name => table = Some(TableBuilder::new(self.qualified(item)?)),
                Rule::table_element => {
                    if let Some(table) = table.as_mut() {
                        self.table_element(table, item)?;
                    }
                }
                Rule::table_suffix => {
                    if let Some(table) = table.as_mut() {
                        self.table_suffix(table, item)?;
                    }
                }
                _ => {}
            }
        }

        let Some(table) = table else {
            return Ok(());
        };
        if if_not_exists && schema.has_table(table.name()) {
            debug!(table = table.name(), "table exists, skipping");
            return Ok(());
        }
        debug!(table = table.name(), "parsed CREATE TABLE");
        schema.add_table(table);
        Ok(())
    }

    fn table_element(&self, table: &mut TableBuilder, pair: Pair<'_, Rule>) -> SchemaResult<()> {
        let Some(element) = pair.into_inner().next() else {
            return Ok(());
        };
        match element.as_rule() {
            Rule::table_constraint => table.add_constraint(self.table_constraint(element)?),
            Rule::index_definition => table.add_index(self.index_definition(element)?),
            Rule::column_def => {
                let (column, constraints) = self.column_def(element)?;
                table.add_column(column);
                for constraint in constraints {
                    table.add_constraint(constraint);
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn table_suffix(&self, table: &mut TableBuilder, pair: Pair<'_, Rule>) -> SchemaResult<()> {
        for clause in pair.into_inner() {
            match clause.as_rule() {
                Rule::spanner_primary_key => {
                    if self.kind() != DialectKind::Spanner {
                        return Err(self.unsupported("PRIMARY KEY after the column list"));
                    }
                    let mut columns = Vec::new();
                    for column in clause.into_inner() {
                        if column.as_rule() == Rule::index_column {
                            columns.push(self.key_column(column)?);
                        }
                    }
                    if !columns.is_empty() {
                        table.add_constraint(Constraint::primary_key(columns));
                    }
                }
                Rule::interleave_clause => return Err(self.unsupported("INTERLEAVE IN PARENT")),
                Rule::row_deletion_policy => return Err(self.unsupported("ROW DELETION POLICY")),
                Rule::unsupported_table_clause => {
                    let keyword = clause
                        .as_str()
                        .split_whitespace()
                        .next()
                        .unwrap_or_default()
                        .to_ascii_uppercase();
                    return Err(self.unsupported(format!("{} table clause", keyword)));
                }
                Rule::table_option => self.table_option(table, clause)?,
                _ => {}
            }
        }
        Ok(())
    }

    fn table_option(&self, table: &mut TableBuilder, pair: Pair<'_, Rule>) -> SchemaResult<()> {
        let mut name = String::new();
        let mut value = String::new();
        for part in pair.into_inner() {
            match part.as_rule() {
                Rule::option_name => {
                    name = part
                        .as_str()
                        .split_whitespace()
                        .map(str::to_ascii_uppercase)
                        .collect::<Vec<_>>()
                        .join(" ");
                }
                Rule::option_value => value = part.as_str().to_string(),
                _ => {}
            }
        }

        if self.kind() != DialectKind::MySql {
            return Err(self.unsupported(format!("table option {}", name)));
        }
        // The counter is data, not schema.
        if name == "AUTO_INCREMENT" {
            return Ok(());
        }
        table.add_option(name, value);
        Ok(())
    }

    // ==================== Columns ====================

    fn column_def(&self, pair: Pair<'_, Rule>) -> SchemaResult<(Column, Vec<Constraint>)> {
        let mut inner = pair.into_inner();
        let name = inner.next().map(|p| self.ident(p)).unwrap_or_default();
        let fragment = self.column_body(Some(&name), inner)?;

        let mut column = Column::new(name, fragment.ty).nullable(fragment.nullable);
        column.default = fragment.default;
        column.auto_increment = fragment.auto_increment;
        Ok((column, fragment.constraints))
    }

    /// Lower a data type and its column clauses. Inline constraints are
    /// attached to `column`, or get an empty column list for fragments.
    pub(crate) fn column_body<'i>(
        &self,
        column: Option<&str>,
        items: impl Iterator<Item = Pair<'i, Rule>>,
    ) -> SchemaResult<ColumnFragment> {
        let mut fragment: Option<ColumnFragment> = None;
        let mut pending_name: Option<String> = None;

        for item in items {
            match item.as_rule() {
                Rule::data_type => {
                    let native = self.native_type(item)?;
                    let mut lowered = ColumnFragment::new(self.dialect.normalize_type(&native)?);
                    lowered.auto_increment = self.dialect.implies_auto_increment(&native);
                    fragment = Some(lowered);
                }
                Rule::column_clause => {
                    if let Some(fragment) = fragment.as_mut() {
                        self.column_clause(column, fragment, &mut pending_name, item)?;
                    }
                }
                _ => {}
            }
        }

        fragment.ok_or_else(|| {
            SchemaError::syntax(
                self.input,
                location_at(self.input, 0),
                0,
                0,
                "expected data type",
            )
        })
    }

    fn column_clause(
        &self,
        column: Option<&str>,
        fragment: &mut ColumnFragment,
        pending_name: &mut Option<String>,
        pair: Pair<'_, Rule>,
    ) -> SchemaResult<()> {
        let Some(clause) = pair.into_inner().next() else {
            return Ok(());
        };
        let columns: Vec<String> = column.into_iter().map(String::from).collect();

        match clause.as_rule() {
            Rule::not_null => fragment.nullable = false,
            Rule::null_clause => fragment.nullable = true,
            Rule::default_clause => {
                let expr = clause
                    .into_inner()
                    .find(|p| p.as_rule() == Rule::default_expr)
                    .map(|p| p.as_str())
                    .unwrap_or_default();
                fragment.default = self.dialect.normalize_default(expr);
            }
            Rule::column_constraint_name => {
                *pending_name = clause
                    .into_inner()
                    .find(|p| p.as_rule() == Rule::identifier)
                    .map(|p| self.ident(p));
            }
            Rule::primary_key_clause => {
                let descending = clause
                    .clone()
                    .into_inner()
                    .any(|p| p.as_rule() == Rule::sort_order && has_rule(&p, Rule::kw_desc));
                if descending {
                    return Err(self.unsupported("descending primary key column"));
                }
                let pk = Constraint::primary_key(columns);
                fragment.constraints.push(self.named(pk, pending_name.take()));
            }
            Rule::unique_clause => {
                let unique = Constraint::unique(columns);
                fragment.constraints.push(self.named(unique, pending_name.take()));
            }
            Rule::references_clause => {
                let fk = Constraint::foreign_key(columns, self.reference(clause)?);
                fragment.constraints.push(self.named(fk, pending_name.take()));
            }
            Rule::check_clause => {
                let check = Constraint::check(columns, check_expr(clause));
                fragment.constraints.push(self.named(check, pending_name.take()));
            }
            Rule::auto_increment => {
                if self.kind() != DialectKind::MySql {
                    return Err(self.unsupported("AUTO_INCREMENT"));
                }
                fragment.auto_increment = true;
            }
            Rule::identity_clause => {
                if self.kind() != DialectKind::Postgres {
                    return Err(self.unsupported("identity column"));
                }
                if has_rule(&clause, Rule::paren_group) {
                    return Err(self.unsupported("identity sequence options"));
                }
                fragment.auto_increment = true;
            }
            Rule::generated_clause => return Err(self.unsupported("generated column")),
            Rule::on_update_clause => return Err(self.unsupported("ON UPDATE column default")),
            Rule::collate_clause => return Err(self.unsupported("column COLLATE")),
            Rule::comment_clause => return Err(self.unsupported("column COMMENT")),
            Rule::options_clause => return Err(self.unsupported("column OPTIONS")),
            Rule::hidden_clause => return Err(self.unsupported("HIDDEN column")),
            _ => {}
        }
        Ok(())
    }

    fn native_type(&self, pair: Pair<'_, Rule>) -> SchemaResult<NativeType> {
        let Some(inner) = pair.into_inner().next() else {
            return Ok(NativeType::new(""));
        };
        match inner.as_rule() {
            Rule::array_type => {
                let scalar = inner
                    .into_inner()
                    .find(|p| p.as_rule() == Rule::scalar_type);
                match scalar {
                    Some(scalar) => Ok(self.scalar_type(scalar)?.array()),
                    None => Ok(NativeType::new("")),
                }
            }
            _ => self.scalar_type(inner),
        }
    }

    fn scalar_type(&self, pair: Pair<'_, Rule>) -> SchemaResult<NativeType> {
        let mut native = NativeType::new("");
        for part in pair.into_inner() {
            match part.as_rule() {
                Rule::type_name => {
                    native.name = part
                        .as_str()
                        .split_whitespace()
                        .map(str::to_ascii_uppercase)
                        .collect::<Vec<_>>()
                        .join(" ");
                }
                Rule::type_args => {
                    for arg in part.into_inner() {
                        native.args.push(self.type_arg(arg)?);
                    }
                }
                Rule::time_zone => native.time_zone = Some(has_rule(&part, Rule::kw_with)),
                Rule::kw_unsigned => native.unsigned = true,
                Rule::array_suffix => native.array_depth += 1,
                _ => {}
            }
        }
        Ok(native)
    }

    fn type_arg(&self, pair: Pair<'_, Rule>) -> SchemaResult<TypeArg> {
        let text = pair.as_str().trim();
        let Some(inner) = pair.into_inner().next() else {
            return Ok(TypeArg::Text(text.to_string()));
        };
        match inner.as_rule() {
            Rule::number => text
                .parse()
                .map(TypeArg::Number)
                .map_err(|_| self.unsupported(format!("type argument {}", text))),
            Rule::kw_max => Ok(TypeArg::Max),
            _ => Ok(TypeArg::Text(text.to_string())),
        }
    }

    // ==================== Constraints ====================

    /// Name a constraint. Only PostgreSQL keeps primary key names.
    fn named(&self, constraint: Constraint, name: Option<String>) -> Constraint {
        match name {
            Some(_) if constraint.is_primary_key() && self.kind() != DialectKind::Postgres => {
                constraint
            }
            Some(name) => constraint.named(name),
            None => constraint,
        }
    }

    pub(crate) fn table_constraint(&self, pair: Pair<'_, Rule>) -> SchemaResult<Constraint> {
        let mut name = None;
        let mut constraint = None;

        for item in pair.into_inner() {
            match item.as_rule() {
                Rule::constraint_name => {
                    name = item
                        .into_inner()
                        .find(|p| p.as_rule() == Rule::identifier)
                        .map(|p| self.ident(p));
                }
                Rule::primary_key_constraint => {
                    let mut columns = Vec::new();
                    for part in item.into_inner() {
                        if part.as_rule() == Rule::index_column_list {
                            for column in part.into_inner() {
                                columns.push(self.key_column(column)?);
                            }
                        }
                    }
                    constraint = Some(Constraint::primary_key(columns));
                }
                Rule::foreign_key_constraint => {
                    let mut columns = Vec::new();
                    let mut reference = None;
                    for part in item.into_inner() {
                        match part.as_rule() {
                            Rule::column_list => columns = self.column_list(part),
                            Rule::references_clause => reference = Some(self.reference(part)?),
                            _ => {}
                        }
                    }
                    if let Some(reference) = reference {
                        constraint = Some(Constraint::foreign_key(columns, reference));
                    }
                }
                Rule::unique_constraint => {
                    let mut columns = Vec::new();
                    for part in item.into_inner() {
                        match part.as_rule() {
                            Rule::identifier if name.is_none() => name = Some(self.ident(part)),
                            Rule::index_column_list => {
                                for column in part.into_inner() {
                                    columns.push(self.key_column(column)?);
                                }
                            }
                            _ => {}
                        }
                    }
                    constraint = Some(Constraint::unique(columns));
                }
                Rule::check_constraint => {
                    constraint = Some(Constraint::check(Vec::<String>::new(), check_expr(item)));
                }
                _ => {}
            }
        }

        let constraint = constraint.ok_or_else(|| self.unsupported("empty constraint"))?;
        Ok(self.named(constraint, name))
    }

    fn reference(&self, pair: Pair<'_, Rule>) -> SchemaResult<Reference> {
        let mut table = String::new();
        let mut columns = Vec::new();
        let mut on_delete = None;
        let mut on_update = None;

        for item in pair.into_inner() {
            match item.as_rule() {
                Rule::qualified_name => table = self.qualified(item)?,
                Rule::column_list => columns = self.column_list(item),
                Rule::referential_rule => {
                    let is_delete = has_rule(&item, Rule::kw_delete);
                    let action = item
                        .into_inner()
                        .find(|p| p.as_rule() == Rule::referential_action)
                        .map(|p| referential_action(p.as_str()));
                    if is_delete {
                        on_delete = action;
                    } else {
                        on_update = action;
                    }
                }
                _ => {}
            }
        }

        if columns.is_empty() {
            return Err(self.unsupported(format!(
                "REFERENCES {} without a column list",
                table
            )));
        }
        let mut reference = Reference::new(table, columns);
        if let Some(action) = on_delete {
            reference = reference.on_delete(action);
        }
        if let Some(action) = on_update {
            reference = reference.on_update(action);
        }
        Ok(reference)
    }

    fn column_list(&self, pair: Pair<'_, Rule>) -> Vec<String> {
        pair.into_inner()
            .filter(|p| p.as_rule() == Rule::identifier)
            .map(|p| self.ident(p))
            .collect()
    }

    /// An ascending key column of a primary key or unique constraint.
    fn key_column(&self, pair: Pair<'_, Rule>) -> SchemaResult<String> {
        let column = self.index_column(pair)?;
        if column.descending {
            return Err(self.unsupported(format!("descending key column `{}`", column.name)));
        }
        Ok(column.name)
    }

    // ==================== Indexes ====================

    fn index_column(&self, pair: Pair<'_, Rule>) -> SchemaResult<IndexColumn> {
        let mut name = String::new();
        let mut descending = false;
        for part in pair.into_inner() {
            match part.as_rule() {
                Rule::identifier => name = self.ident(part),
                Rule::prefix_length => return Err(self.unsupported("index prefix length")),
                Rule::sort_order => descending = has_rule(&part, Rule::kw_desc),
                _ => {}
            }
        }
        Ok(if descending {
            IndexColumn::desc(name)
        } else {
            IndexColumn::asc(name)
        })
    }

    fn index_columns(&self, pair: Pair<'_, Rule>) -> SchemaResult<Vec<IndexColumn>> {
        pair.into_inner()
            .filter(|p| p.as_rule() == Rule::index_column)
            .map(|p| self.index_column(p))
            .collect()
    }

    /// MySQL `KEY name (cols)` inside a table body.
    fn index_definition(&self, pair: Pair<'_, Rule>) -> SchemaResult<Index> {
        if self.kind() != DialectKind::MySql {
            return Err(self.unsupported("index definition inside CREATE TABLE"));
        }
        let mut name = None;
        let mut columns = Vec::new();
        for part in pair.into_inner() {
            match part.as_rule() {
                Rule::index_kind => {
                    return Err(self.unsupported(format!(
                        "{} index",
                        part.as_str().to_ascii_uppercase()
                    )));
                }
                Rule::identifier => name = Some(self.ident(part)),
                Rule::index_column_list => columns = self.index_columns(part)?,
                _ => {}
            }
        }
        let name = name
            .or_else(|| columns.first().map(|c| c.name.clone()))
            .unwrap_or_default();
        Ok(Index::with_columns(name, columns))
    }

    pub(crate) fn index_statement(&self, pair: Pair<'_, Rule>) -> SchemaResult<IndexStatement> {
        let mut unique = false;
        let mut if_not_exists = false;
        let mut seen_on = false;
        let mut name = None;
        let mut table = String::new();
        let mut columns = Vec::new();

        for item in pair.into_inner() {
            match item.as_rule() {
                Rule::kw_unique => unique = true,
                Rule::kw_null_filtered => return Err(self.unsupported("NULL_FILTERED index")),
                Rule::if_not_exists => if_not_exists = true,
                Rule::kw_on => seen_on = true,
                Rule::qualified_name if seen_on => table = self.qualified(item)?,
                Rule::qualified_name => name = Some(self.qualified(item)?),
                Rule::using_clause => self.using_clause(item)?,
                Rule::index_column_list => columns = self.index_columns(item)?,
                Rule::index_suffix => self.index_suffix(item)?,
                _ => {}
            }
        }

        let name = name.unwrap_or_else(|| {
            let names: Vec<&str> = columns.iter().map(|c| c.name.as_str()).collect();
            format!("{}_{}_idx", table, names.join("_"))
        });
        let mut index = Index::with_columns(name, columns);
        if unique {
            index = index.unique();
        }
        debug!(index = %index.name, table = %table, "parsed CREATE INDEX");
        Ok(IndexStatement {
            table,
            index,
            if_not_exists,
        })
    }

    fn using_clause(&self, pair: Pair<'_, Rule>) -> SchemaResult<()> {
        let method = pair
            .into_inner()
            .find(|p| p.as_rule() == Rule::identifier)
            .map(|p| p.as_str().to_ascii_lowercase())
            .unwrap_or_default();
        if method != "btree" {
            return Err(self.unsupported(format!("index method {}", method)));
        }
        Ok(())
    }

    fn index_suffix(&self, pair: Pair<'_, Rule>) -> SchemaResult<()> {
        for clause in pair.into_inner() {
            match clause.as_rule() {
                Rule::using_clause => self.using_clause(clause)?,
                Rule::include_clause => return Err(self.unsupported("INCLUDE columns")),
                Rule::storing_clause => return Err(self.unsupported("STORING columns")),
                Rule::where_clause => return Err(self.unsupported("partial index")),
                Rule::interleave_clause => return Err(self.unsupported("interleaved index")),
                _ => {}
            }
        }
        Ok(())
    }

    // ==================== ALTER TABLE ====================

    fn alter_table(&self, schema: &mut SchemaBuilder, pair: Pair<'_, Rule>) -> SchemaResult<()> {
        let mut name: Option<String> = None;

        for item in pair.into_inner() {
            match item.as_rule() {
                Rule::qualified_name => name = Some(self.qualified(item)?),
                Rule::alter_action => {
                    let table_name = name.clone().unwrap_or_default();
                    let Some(table) = schema.table_mut(&table_name) else {
                        return Err(SchemaError::validation(
                            table_name,
                            "ALTER TABLE on unknown table",
                        ));
                    };
                    self.alter_action(table, item)?;
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn alter_action(&self, table: &mut TableBuilder, pair: Pair<'_, Rule>) -> SchemaResult<()> {
        let Some(action) = pair.into_inner().next() else {
            return Ok(());
        };
        match action.as_rule() {
            Rule::add_constraint => {
                if let Some(constraint) = action
                    .into_inner()
                    .find(|p| p.as_rule() == Rule::table_constraint)
                {
                    table.add_constraint(self.table_constraint(constraint)?);
                }
            }
            Rule::add_index => {
                if let Some(index) = action
                    .into_inner()
                    .find(|p| p.as_rule() == Rule::index_definition)
                {
                    table.add_index(self.index_definition(index)?);
                }
            }
            Rule::add_column => {
                let if_not_exists = has_rule(&action, Rule::if_not_exists);
                if let Some(def) = action.into_inner().find(|p| p.as_rule() == Rule::column_def) {
                    let (column, constraints) = self.column_def(def)?;
                    if if_not_exists && table.has_column(&column.name) {
                        return Ok(());
                    }
                    table.add_column(column);
                    for constraint in constraints {
                        table.add_constraint(constraint);
                    }
                }
            }
            Rule::unsupported_action => return self.unsupported_action(table, action),
            _ => {}
        }
        Ok(())
    }

    fn unsupported_action(&self, table: &TableBuilder, pair: Pair<'_, Rule>) -> SchemaResult<()> {
        let text = pair.as_str();
        let words: Vec<String> = text
            .split_whitespace()
            .take(2)
            .map(str::to_ascii_uppercase)
            .collect();

        match words.first().map(String::as_str) {
            // A malformed ADD: report where it went wrong.
            Some("ADD") => match DdlParser::parse(Rule::alter_add_action, text) {
                Err(err) => Err(syntax_error(self.input, pair.as_span().start(), err)),
                Ok(_) => Err(self.unsupported(format!("ALTER TABLE {}", words.join(" ")))),
            },
            Some("OWNER") => {
                debug!(table = table.name(), "ignoring ALTER TABLE OWNER");
                Ok(())
            }
            _ => Err(self.unsupported(format!("ALTER TABLE {}", words.join(" ")))),
        }
    }

    // ==================== Names ====================

    fn ident(&self, pair: Pair<'_, Rule>) -> String {
        let part = name_part(pair);
        self.dialect.fold_identifier(&part.text, part.quoted)
    }

    fn qualified(&self, pair: Pair<'_, Rule>) -> SchemaResult<String> {
        let parts: Vec<NamePart> = pair
            .into_inner()
            .filter(|p| p.as_rule() == Rule::identifier)
            .map(name_part)
            .collect();
        self.dialect.resolve_name(&parts)
    }
}

fn name_part(pair: Pair<'_, Rule>) -> NamePart {
    let text = pair.as_str().to_string();
    let Some(inner) = pair.into_inner().next() else {
        return NamePart {
            text,
            quoted: false,
        };
    };
    let (quote, escaped) = match inner.as_rule() {
        Rule::quoted_identifier => ("\"", "\"\""),
        Rule::backtick_identifier => ("`", "``"),
        _ => {
            return NamePart {
                text: inner.as_str().to_string(),
                quoted: false,
            };
        }
    };
    let body = inner
        .into_inner()
        .next()
        .map(|p| p.as_str())
        .unwrap_or_default();
    NamePart {
        text: body.replace(escaped, quote),
        quoted: true,
    }
}

/// Does any direct child of `pair` match `rule`?
fn has_rule(pair: &Pair<'_, Rule>, rule: Rule) -> bool {
    pair.clone().into_inner().any(|p| p.as_rule() == rule)
}

/// Check expression text without its parentheses.
fn check_expr(pair: Pair<'_, Rule>) -> String {
    let group = pair
        .into_inner()
        .find(|p| p.as_rule() == Rule::paren_group)
        .map(|p| p.as_str())
        .unwrap_or_default();
    defaults::strip_outer_parens(group)
}

fn referential_action(text: &str) -> ReferentialAction {
    let words: Vec<String> = text
        .split_whitespace()
        .map(str::to_ascii_uppercase)
        .collect();
    match words.join(" ").as_str() {
        "CASCADE" => ReferentialAction::Cascade,
        "RESTRICT" => ReferentialAction::Restrict,
        "SET NULL" => ReferentialAction::SetNull,
        "SET DEFAULT" => ReferentialAction::SetDefault,
        _ => ReferentialAction::NoAction,
    }
}
