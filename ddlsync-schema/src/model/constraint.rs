//! Table constraints.

use std::fmt;

use serde::Serialize;

/// Referential actions for foreign keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferentialAction {
    /// Cascade the operation.
    Cascade,
    /// Restrict the operation (error if references exist).
    Restrict,
    /// No action (deferred check).
    NoAction,
    /// Set to null.
    SetNull,
    /// Set to default value.
    SetDefault,
}

impl ReferentialAction {
    /// SQL spelling of the action.
    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Cascade => "CASCADE",
            Self::Restrict => "RESTRICT",
            Self::NoAction => "NO ACTION",
            Self::SetNull => "SET NULL",
            Self::SetDefault => "SET DEFAULT",
        }
    }
}

/// Target of a foreign key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reference {
    /// Referenced table.
    pub table: String,
    /// Referenced columns, positionally matching the constrained columns.
    pub columns: Vec<String>,
    /// `ON DELETE` action; `None` is the SQL default (`NO ACTION`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub on_delete: Option<ReferentialAction>,
    /// `ON UPDATE` action; `None` is the SQL default (`NO ACTION`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub on_update: Option<ReferentialAction>,
}

impl Reference {
    /// Create a reference with default actions.
    pub fn new<I, S>(table: impl Into<String>, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            table: table.into(),
            columns: columns.into_iter().map(Into::into).collect(),
            on_delete: None,
            on_update: None,
        }
    }

    /// Set the on delete action.
    pub fn on_delete(mut self, action: ReferentialAction) -> Self {
        self.on_delete = normalize_action(Some(action));
        self
    }

    /// Set the on update action.
    pub fn on_update(mut self, action: ReferentialAction) -> Self {
        self.on_update = normalize_action(Some(action));
        self
    }
}

fn normalize_action(action: Option<ReferentialAction>) -> Option<ReferentialAction> {
    action.filter(|a| *a != ReferentialAction::NoAction)
}

/// Kind of a constraint, with its kind-specific payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum ConstraintKind {
    /// Primary key.
    PrimaryKey,
    /// Foreign key into another table.
    ForeignKey(Reference),
    /// Uniqueness over the column list.
    Unique,
    /// Check expression, as raw text without the surrounding parentheses.
    Check(String),
}

impl ConstraintKind {
    /// Short name used in messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PrimaryKey => "primary key",
            Self::ForeignKey(_) => "foreign key",
            Self::Unique => "unique",
            Self::Check(_) => "check",
        }
    }
}

/// A table constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Constraint {
    /// Explicit constraint name, if one was given.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Constrained columns, in order.
    pub columns: Vec<String>,
    /// Kind and payload.
    pub kind: ConstraintKind,
}

impl Constraint {
    fn with_kind<I, S>(columns: I, kind: ConstraintKind) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: None,
            columns: columns.into_iter().map(Into::into).collect(),
            kind,
        }
    }

    /// A primary key over `columns`.
    pub fn primary_key<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_kind(columns, ConstraintKind::PrimaryKey)
    }

    /// A unique constraint over `columns`.
    pub fn unique<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_kind(columns, ConstraintKind::Unique)
    }

    /// A foreign key from `columns` to `reference`.
    pub fn foreign_key<I, S>(columns: I, reference: Reference) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_kind(columns, ConstraintKind::ForeignKey(reference))
    }

    /// A check constraint. `columns` names the columns the expression was
    /// declared on (empty for table-level checks).
    pub fn check<I, S>(columns: I, expr: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_kind(columns, ConstraintKind::Check(expr.into()))
    }

    /// Set the constraint name.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Is this a primary key?
    pub fn is_primary_key(&self) -> bool {
        matches!(self.kind, ConstraintKind::PrimaryKey)
    }

    /// Is this a foreign key?
    pub fn is_foreign_key(&self) -> bool {
        matches!(self.kind, ConstraintKind::ForeignKey(_))
    }

    /// Foreign key target, if this is a foreign key.
    pub fn reference(&self) -> Option<&Reference> {
        match &self.kind {
            ConstraintKind::ForeignKey(r) => Some(r),
            _ => None,
        }
    }

    /// Explicit name, or the name PostgreSQL would generate on `table`.
    pub fn effective_name(&self, table: &str) -> String {
        if let Some(name) = &self.name {
            return name.clone();
        }
        let suffix = match self.kind {
            ConstraintKind::PrimaryKey => return format!("{}_pkey", table),
            ConstraintKind::ForeignKey(_) => "fkey",
            ConstraintKind::Unique => "key",
            ConstraintKind::Check(_) => "check",
        };
        if self.columns.is_empty() {
            format!("{}_{}", table, suffix)
        } else {
            format!("{}_{}_{}", table, self.columns.join("_"), suffix)
        }
    }

    /// Compare kind, columns and reference, ignoring the name.
    ///
    /// Checks compare by expression only; whether a check was written inline
    /// on a column or at table level makes no difference to the database.
    pub fn structurally_eq(&self, other: &Constraint) -> bool {
        match (&self.kind, &other.kind) {
            (ConstraintKind::PrimaryKey, ConstraintKind::PrimaryKey)
            | (ConstraintKind::Unique, ConstraintKind::Unique) => self.columns == other.columns,
            (ConstraintKind::ForeignKey(a), ConstraintKind::ForeignKey(b)) => {
                self.columns == other.columns
                    && a.table == b.table
                    && a.columns == b.columns
                    && normalize_action(a.on_delete) == normalize_action(b.on_delete)
                    && normalize_action(a.on_update) == normalize_action(b.on_update)
            }
            (ConstraintKind::Check(a), ConstraintKind::Check(b)) => {
                squeeze_expr(a) == squeeze_expr(b)
            }
            _ => false,
        }
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ConstraintKind::Check(expr) => write!(f, "check ({})", expr),
            ConstraintKind::ForeignKey(r) => write!(
                f,
                "foreign key ({}) -> {}({})",
                self.columns.join(", "),
                r.table,
                r.columns.join(", ")
            ),
            kind => write!(f, "{} ({})", kind.as_str(), self.columns.join(", ")),
        }
    }
}

/// Strip whitespace outside string literals and drop redundant outer parentheses.
fn squeeze_expr(expr: &str) -> String {
    let mut out = String::with_capacity(expr.len());
    let mut in_string = false;
    for c in expr.chars() {
        if c == '\'' {
            in_string = !in_string;
        }
        if in_string || !c.is_whitespace() {
            out.push(c);
        }
    }
    while out.len() >= 2
        && out.starts_with('(')
        && out.ends_with(')')
        && balanced(&out[1..out.len() - 1])
    {
        out = out[1..out.len() - 1].to_string();
    }
    out
}

fn balanced(s: &str) -> bool {
    let mut depth = 0i32;
    for c in s.chars() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth < 0 {
                    return false;
                }
            }
            _ => {}
        }
    }
    depth == 0
}
