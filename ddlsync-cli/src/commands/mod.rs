//! CLI command implementations.

pub mod apply;
pub mod diff;
pub mod generate;
pub mod show;
pub mod version;

use std::path::Path;

use ddlsync_migrate::{MigrationEngine, SchemaSource};

use crate::cli::GlobalArgs;
use crate::config;
use crate::error::CliResult;

/// Build an engine from the resolved configuration.
pub(crate) fn engine(global: &GlobalArgs, auto_approve: bool) -> CliResult<MigrationEngine> {
    let config = config::engine_config(global)?;
    let auto_approve = auto_approve || config.auto_approve;
    Ok(MigrationEngine::new(config.auto_approve(auto_approve))?)
}

/// Classify a command-line path.
pub(crate) fn source(path: &Path) -> CliResult<SchemaSource> {
    Ok(SchemaSource::from_path(path)?)
}
