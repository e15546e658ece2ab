//! CLI configuration handling.
//!
//! Values are resolved in order: command-line flag, `DDLSYNC_*` environment
//! variable (both through clap), config file, built-in default.

use std::path::Path;

use ddlsync_migrate::EngineConfig;
use ddlsync_schema::DdlsyncConfig;
use ddlsync_schema::config::CONFIG_FILE_NAME;
use tracing::debug;

use crate::cli::GlobalArgs;
use crate::error::CliResult;

/// Load the config file named by `--config`, or `./ddlsync.toml` if present.
pub fn load_file(global: &GlobalArgs) -> CliResult<DdlsyncConfig> {
    if let Some(path) = &global.config {
        debug!(path = %path.display(), "loading config");
        return Ok(DdlsyncConfig::from_file(path)?);
    }

    let default = Path::new(CONFIG_FILE_NAME);
    if default.is_file() {
        debug!(path = %default.display(), "loading config");
        return Ok(DdlsyncConfig::from_file(default)?);
    }
    Ok(DdlsyncConfig::default())
}

/// Layer the global options over `file`.
pub fn resolve(global: &GlobalArgs, file: &DdlsyncConfig) -> CliResult<EngineConfig> {
    let mut config = EngineConfig::from_config(file);

    if let Some(dialect) = global.dialect {
        config.dialect = dialect;
    }
    if let Some(key) = &global.column_key {
        config.keys.column = key.clone();
    }
    if let Some(key) = &global.ddl_key {
        config.keys.ddl = key.clone();
    }
    if let Some(key) = &global.pk_key {
        config.keys.primary_key = key.clone();
    }
    config.keys.validate()?;

    debug!(
        dialect = %config.dialect,
        column_key = %config.keys.column,
        ddl_key = %config.keys.ddl,
        pk_key = %config.keys.primary_key,
        "resolved configuration"
    );
    Ok(config)
}

/// Load and resolve in one step.
pub fn engine_config(global: &GlobalArgs) -> CliResult<EngineConfig> {
    resolve(global, &load_file(global)?)
}
