//! Migration engine: loads both sides, diffs them and drives the emitter.

use std::fmt;
use std::path::{Path, PathBuf};

use ddlsync_dialect::{Dialect, dialect};
use ddlsync_extract::{RustExtractor, SourceExtractor};
use ddlsync_schema::{AnnotationKeys, DdlsyncConfig, DialectKind, Schema, SchemaError};
use tracing::{debug, info};

use crate::diff::SchemaDiffer;
use crate::emit::{Confirm, Emitter, MigrationPlan, Outcome, Sink};
use crate::error::{MigrateResult, MigrationError};

/// Configuration for the migration engine.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EngineConfig {
    /// Dialect used to parse DDL, resolve overrides and render output.
    pub dialect: DialectKind,
    /// Annotation keys for Rust sources.
    pub keys: AnnotationKeys,
    /// Skip the confirmation gate.
    pub auto_approve: bool,
}

impl EngineConfig {
    /// Create a new configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the values of a loaded `ddlsync.toml`.
    pub fn from_config(config: &DdlsyncConfig) -> Self {
        Self {
            dialect: config.dialect,
            keys: config.annotations.clone(),
            auto_approve: config.migrate.auto_approve,
        }
    }

    /// Set the dialect.
    pub fn dialect(mut self, dialect: DialectKind) -> Self {
        self.dialect = dialect;
        self
    }

    /// Set the annotation keys.
    pub fn keys(mut self, keys: AnnotationKeys) -> Self {
        self.keys = keys;
        self
    }

    /// Set whether to skip confirmation.
    pub fn auto_approve(mut self, auto_approve: bool) -> Self {
        self.auto_approve = auto_approve;
        self
    }
}

/// One side of a diff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaSource {
    /// A `.rs` file, or a directory walked for them.
    Rust(PathBuf),
    /// Rust source text.
    RustText(String),
    /// A `.sql` or `.ddl` file.
    Ddl(PathBuf),
    /// DDL text.
    DdlText(String),
}

impl SchemaSource {
    /// Classify a path by its extension; directories hold Rust sources.
    pub fn from_path(path: impl Into<PathBuf>) -> MigrateResult<Self> {
        let path = path.into();
        if path.is_dir() {
            return Ok(Self::Rust(path));
        }
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match extension.as_deref() {
            Some("rs") => Ok(Self::Rust(path)),
            Some("sql" | "ddl") => Ok(Self::Ddl(path)),
            _ => Err(SchemaError::config(format!(
                "cannot tell what `{}` contains; expected a .rs file, a directory, or a .sql/.ddl file",
                path.display()
            ))
            .into()),
        }
    }

    /// The file or directory behind this source, if any.
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Rust(path) | Self::Ddl(path) => Some(path),
            Self::RustText(_) | Self::DdlText(_) => None,
        }
    }
}

impl fmt::Display for SchemaSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rust(path) | Self::Ddl(path) => write!(f, "{}", path.display()),
            Self::RustText(_) => f.write_str("<rust source>"),
            Self::DdlText(_) => f.write_str("<ddl>"),
        }
    }
}

/// Diffs a described schema against a destination and emits the migration.
pub struct MigrationEngine {
    config: EngineConfig,
    dialect: &'static dyn Dialect,
}

impl MigrationEngine {
    /// Create an engine, validating the annotation keys.
    pub fn new(config: EngineConfig) -> MigrateResult<Self> {
        config.keys.validate()?;
        Ok(Self {
            dialect: dialect(config.dialect),
            config,
        })
    }

    /// Get the engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Load one side into a validated schema.
    pub fn load(&self, source: &SchemaSource) -> MigrateResult<Schema> {
        let schema = match source {
            SchemaSource::Rust(path) => self.extractor().extract_path(path)?,
            SchemaSource::RustText(text) => self.extractor().extract_str(text)?,
            SchemaSource::Ddl(path) => {
                let text = std::fs::read_to_string(path).map_err(|e| SchemaError::Io {
                    path: path.display().to_string(),
                    source: e,
                })?;
                self.dialect.parse(&text)?
            }
            SchemaSource::DdlText(text) => self.dialect.parse(text)?,
        };
        debug!(source = %source, tables = schema.len(), "loaded schema");
        Ok(schema)
    }

    /// Plan the operations that turn `destination` into `source`.
    pub fn diff(
        &self,
        source: &SchemaSource,
        destination: &SchemaSource,
    ) -> MigrateResult<MigrationPlan> {
        let plan = SchemaDiffer::new(self.dialect)
            .diff(&self.load(source)?, &self.load(destination)?)?;
        info!(
            dialect = %self.config.dialect,
            operations = plan.len(),
            summary = %plan.summary(),
            "planned migration"
        );
        Ok(plan)
    }

    /// Diff and render without writing anything.
    pub fn plan(&self, source: &SchemaSource, destination: &SchemaSource) -> MigrateResult<Outcome> {
        let plan = self.diff(source, destination)?;
        self.emitter().plan(&plan)
    }

    /// Diff, confirm and write the migration to `sink`.
    ///
    /// A file sink may not be the destination schema itself.
    pub fn apply(
        &self,
        source: &SchemaSource,
        destination: &SchemaSource,
        sink: Sink<'_>,
        confirm: &mut dyn Confirm,
    ) -> MigrateResult<Outcome> {
        if let (Sink::File(output), Some(existing)) = (&sink, destination.path()) {
            if same_file(output, existing) {
                return Err(MigrationError::output(format!(
                    "refusing to overwrite the destination schema `{}`",
                    existing.display()
                )));
            }
        }

        let plan = self.diff(source, destination)?;
        self.emitter()
            .apply(&plan, sink, confirm, self.config.auto_approve)
    }

    /// Render `source` as a complete DDL script.
    pub fn generate(&self, source: &SchemaSource) -> MigrateResult<String> {
        let schema = self.load(source)?;
        info!(dialect = %self.config.dialect, tables = schema.len(), "generating schema");
        Ok(self.dialect.print_schema(&schema)?)
    }

    fn extractor(&self) -> RustExtractor<'static> {
        RustExtractor::new(self.config.keys.clone(), self.dialect.as_fragment_parser())
    }

    fn emitter(&self) -> Emitter {
        Emitter::new(self.config.dialect)
    }
}

/// Do both paths name the same existing file?
fn same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
