//! Migration plans, rendered scripts and the emitter that writes them.

use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};

use ddlsync_dialect::{Dialect, dialect, script};
use ddlsync_schema::{DialectKind, Operation, OperationKind};
use serde::Serialize;
use tracing::{debug, info};

use crate::error::{MigrateResult, MigrationError};

/// The ordered operations of one migration.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MigrationPlan {
    operations: Vec<Operation>,
}

impl MigrationPlan {
    /// Wrap an ordered operation list.
    pub fn new(operations: Vec<Operation>) -> Self {
        Self { operations }
    }

    /// Operations in execution order.
    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    /// Take the operations out of the plan.
    pub fn into_operations(self) -> Vec<Operation> {
        self.operations
    }

    /// Number of operations.
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    /// Check if there is nothing to do.
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Number of operations of `kind`.
    pub fn count(&self, kind: OperationKind) -> usize {
        self.operations.iter().filter(|op| op.kind() == kind).count()
    }

    /// Get a summary of the plan, e.g. `Create 1 table, Add 2 columns`.
    pub fn summary(&self) -> String {
        let parts: Vec<String> = OperationKind::ALL
            .iter()
            .filter_map(|kind| match self.count(*kind) {
                0 => None,
                n => Some(kind.describe(n)),
            })
            .collect();

        if parts.is_empty() {
            "No changes".to_string()
        } else {
            parts.join(", ")
        }
    }
}

/// Rendered statements of a plan, without trailing semicolons.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MigrationScript {
    statements: Vec<String>,
}

impl MigrationScript {
    /// Wrap rendered statements.
    pub fn new(statements: Vec<String>) -> Self {
        Self { statements }
    }

    /// Statements in execution order.
    pub fn statements(&self) -> &[String] {
        &self.statements
    }

    /// Check if the script has no statements.
    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }
}

impl fmt::Display for MigrationScript {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&script(&self.statements))
    }
}

/// Where an applied migration goes.
pub enum Sink<'a> {
    /// A file, replaced atomically.
    File(PathBuf),
    /// An open stream such as standard output.
    Stream(&'a mut dyn Write),
}

impl fmt::Debug for Sink<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => f.debug_tuple("File").field(path).finish(),
            Self::Stream(_) => f.write_str("Stream"),
        }
    }
}

/// Confirmation gate in front of [`Emitter::apply`].
pub trait Confirm {
    /// Decide whether `script`, which implements `plan`, may be written.
    fn confirm(&mut self, plan: &MigrationPlan, script: &MigrationScript) -> MigrateResult<bool>;
}

/// Accepts every migration.
#[derive(Debug, Clone, Copy, Default)]
pub struct AutoApprove;

impl Confirm for AutoApprove {
    fn confirm(&mut self, _plan: &MigrationPlan, _script: &MigrationScript) -> MigrateResult<bool> {
        Ok(true)
    }
}

/// Result of running a plan through the emitter.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The schemas already match.
    NoChanges,
    /// Rendered for review only.
    Planned(MigrationScript),
    /// Written to `target`; `None` means a stream.
    Applied {
        script: MigrationScript,
        target: Option<PathBuf>,
    },
    /// Confirmation was refused; nothing was written.
    Declined(MigrationScript),
}

impl Outcome {
    /// The rendered script, if anything was rendered.
    pub fn script(&self) -> Option<&MigrationScript> {
        match self {
            Self::NoChanges => None,
            Self::Planned(script) | Self::Declined(script) => Some(script),
            Self::Applied { script, .. } => Some(script),
        }
    }
}

/// Renders plans with one dialect's printer and writes them out.
pub struct Emitter {
    dialect: &'static dyn Dialect,
}

impl Emitter {
    /// Create an emitter for `kind`.
    pub fn new(kind: DialectKind) -> Self {
        Self {
            dialect: dialect(kind),
        }
    }

    /// Render every statement of `plan`.
    pub fn render(&self, plan: &MigrationPlan) -> MigrateResult<MigrationScript> {
        let statements = self.dialect.print_operations(plan.operations())?;
        Ok(MigrationScript::new(statements))
    }

    /// Render `plan` for review without writing anything.
    pub fn plan(&self, plan: &MigrationPlan) -> MigrateResult<Outcome> {
        if plan.is_empty() {
            info!("no changes");
            return Ok(Outcome::NoChanges);
        }
        Ok(Outcome::Planned(self.render(plan)?))
    }

    /// Render `plan`, pass it through `confirm` unless `auto_approve` is set,
    /// and write it to `sink`.
    ///
    /// The whole script is rendered before anything is written. A declined
    /// confirmation or a rendering error leaves no output behind.
    pub fn apply(
        &self,
        plan: &MigrationPlan,
        sink: Sink<'_>,
        confirm: &mut dyn Confirm,
        auto_approve: bool,
    ) -> MigrateResult<Outcome> {
        if plan.is_empty() {
            info!("no changes");
            return Ok(Outcome::NoChanges);
        }

        let script = self.render(plan)?;
        if !auto_approve && !confirm.confirm(plan, &script)? {
            info!(summary = %plan.summary(), "migration declined");
            return Ok(Outcome::Declined(script));
        }

        let target = write(sink, &script.to_string())?;
        info!(
            summary = %plan.summary(),
            statements = script.statements().len(),
            "migration written"
        );
        Ok(Outcome::Applied { script, target })
    }
}

/// Write `contents` to `sink`, returning the file path for file sinks.
///
/// Files are written to a temporary file next to the target and then
/// renamed over it, so the target is either fully replaced or untouched.
pub fn write(sink: Sink<'_>, contents: &str) -> MigrateResult<Option<PathBuf>> {
    match sink {
        Sink::File(path) => {
            write_file(&path, contents)?;
            Ok(Some(path))
        }
        Sink::Stream(stream) => {
            stream
                .write_all(contents.as_bytes())
                .and_then(|()| stream.flush())
                .map_err(|e| MigrationError::io("<stream>", e))?;
            Ok(None)
        }
    }
}

fn write_file(path: &Path, contents: &str) -> MigrateResult<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut file = tempfile::Builder::new()
        .prefix(".ddlsync-")
        .suffix(".tmp")
        .tempfile_in(dir)
        .map_err(|e| MigrationError::io(path, e))?;
    file.write_all(contents.as_bytes())
        .and_then(|()| file.as_file().sync_all())
        .map_err(|e| MigrationError::io(path, e))?;
    file.persist(path)
        .map_err(|e| MigrationError::io(path, e.error))?;

    debug!(path = %path.display(), bytes = contents.len(), "wrote output");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ddlsync_schema::{BaseType, Column, ColumnType, Schema, SchemaBuilder, TableBuilder};
    use pretty_assertions::assert_eq;

    struct Answer {
        accept: bool,
        asked: usize,
    }

    impl Confirm for Answer {
        fn confirm(&mut self, _plan: &MigrationPlan, _script: &MigrationScript) -> MigrateResult<bool> {
            self.asked += 1;
            Ok(self.accept)
        }
    }

    fn answer(accept: bool) -> Answer {
        Answer { accept, asked: 0 }
    }

    fn users() -> Schema {
        SchemaBuilder::new()
            .table(
                TableBuilder::new("users")
                    .column(Column::new("id", ColumnType::new(BaseType::BigInt)))
                    .column(Column::new("email", ColumnType::new(BaseType::Text)).nullable(true))
                    .primary_key(["id"]),
            )
            .build()
            .unwrap()
    }

    fn plan() -> MigrationPlan {
        let table = users().table("users").unwrap().clone();
        MigrationPlan::new(vec![
            Operation::CreateTable(table),
            Operation::AddColumn {
                table: "users".to_string(),
                column: Column::new("age", ColumnType::new(BaseType::Integer)).nullable(true),
            },
            Operation::AddColumn {
                table: "users".to_string(),
                column: Column::new("bio", ColumnType::new(BaseType::Text)).nullable(true),
            },
        ])
    }

    // ==================== Plan Tests ====================

    #[test]
    fn test_plan_summary() {
        assert_eq!(plan().summary(), "Create 1 table, Add 2 columns");
        assert_eq!(plan().count(OperationKind::AddColumn), 2);
        assert_eq!(MigrationPlan::default().summary(), "No changes");
        assert!(MigrationPlan::default().is_empty());
    }

    #[test]
    fn test_plan_serializes_operations() {
        let value = serde_json::to_value(plan()).unwrap();
        assert_eq!(value["operations"][0]["op"], "create_table");
        assert_eq!(value["operations"][1]["op"], "add_column");
        assert_eq!(value["operations"][1]["table"], "users");
    }

    #[test]
    fn test_script_display() {
        let script = MigrationScript::new(vec!["DROP TABLE a".to_string(), "DROP TABLE b".to_string()]);
        assert_eq!(script.to_string(), "DROP TABLE a;\n\nDROP TABLE b;\n");
    }

    // ==================== Emitter Tests ====================

    #[test]
    fn test_empty_plan_reports_no_changes() {
        let emitter = Emitter::new(DialectKind::Postgres);
        let mut confirm = answer(true);
        let mut out = Vec::new();
        let outcome = emitter
            .apply(
                &MigrationPlan::default(),
                Sink::Stream(&mut out),
                &mut confirm,
                false,
            )
            .unwrap();
        assert_eq!(outcome, Outcome::NoChanges);
        assert_eq!(confirm.asked, 0);
        assert!(out.is_empty());
        assert_eq!(
            emitter.plan(&MigrationPlan::default()).unwrap(),
            Outcome::NoChanges
        );
    }

    #[test]
    fn test_plan_only_renders() {
        let outcome = Emitter::new(DialectKind::Postgres).plan(&plan()).unwrap();
        let Outcome::Planned(script) = outcome else {
            panic!("expected a planned outcome");
        };
        assert_eq!(script.statements().len(), 3);
        assert!(script.statements()[0].starts_with("CREATE TABLE \"users\""));
        assert_eq!(
            script.statements()[1],
            r#"ALTER TABLE "users" ADD COLUMN "age" INTEGER"#
        );
    }

    #[test]
    fn test_apply_to_stream() {
        let mut confirm = answer(true);
        let mut out = Vec::new();
        let outcome = Emitter::new(DialectKind::MySql)
            .apply(&plan(), Sink::Stream(&mut out), &mut confirm, false)
            .unwrap();
        assert_eq!(confirm.asked, 1);
        let Outcome::Applied { script, target } = outcome else {
            panic!("expected an applied outcome");
        };
        assert_eq!(target, None);
        assert_eq!(String::from_utf8(out).unwrap(), script.to_string());
    }

    #[test]
    fn test_apply_writes_file_atomically() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("migration.sql");
        std::fs::write(&path, "old contents").unwrap();

        let outcome = Emitter::new(DialectKind::Spanner)
            .apply(&plan(), Sink::File(path.clone()), &mut AutoApprove, false)
            .unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(Some(written.as_str()), outcome.script().map(|s| s.to_string()).as_deref());
        assert!(written.starts_with("CREATE TABLE users ("));

        let leftovers: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(leftovers, [std::ffi::OsString::from("migration.sql")]);
    }

    #[test]
    fn test_declined_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("migration.sql");
        let mut confirm = answer(false);

        let outcome = Emitter::new(DialectKind::Postgres)
            .apply(&plan(), Sink::File(path.clone()), &mut confirm, false)
            .unwrap();
        assert!(matches!(outcome, Outcome::Declined(_)));
        assert!(!path.exists());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_auto_approve_skips_confirmation() {
        let mut confirm = answer(false);
        let mut out = Vec::new();
        let outcome = Emitter::new(DialectKind::Postgres)
            .apply(&plan(), Sink::Stream(&mut out), &mut confirm, true)
            .unwrap();
        assert!(matches!(outcome, Outcome::Applied { .. }));
        assert_eq!(confirm.asked, 0);
    }

    #[test]
    fn test_render_error_leaves_no_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("migration.sql");
        let plan = MigrationPlan::new(vec![Operation::AddColumn {
            table: "users".to_string(),
            column: Column::new("at", ColumnType::new(BaseType::Time)),
        }]);

        let err = Emitter::new(DialectKind::Spanner)
            .apply(&plan, Sink::File(path.clone()), &mut AutoApprove, true)
            .unwrap_err();
        assert!(matches!(err, MigrationError::Schema(_)));
        assert!(!path.exists());
    }

    #[test]
    fn test_missing_directory_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("migration.sql");
        let err = write(Sink::File(path.clone()), "SELECT 1;\n").unwrap_err();
        match err {
            MigrationError::Io { path: failed, .. } => assert_eq!(failed, path),
            other => panic!("unexpected error {}", other),
        }
    }
}
