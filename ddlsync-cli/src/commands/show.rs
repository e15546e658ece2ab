//! `ddlsync show` command - Re-print a DDL file canonically.

use std::io::Write;

use ddlsync_migrate::SchemaSource;

use crate::cli::{GlobalArgs, ShowArgs};
use crate::commands::engine;
use crate::error::CliResult;

/// Run the show command
pub fn run(args: ShowArgs, global: &GlobalArgs) -> CliResult<()> {
    let engine = engine(global, false)?;
    let ddl = engine.generate(&SchemaSource::Ddl(args.ddl))?;

    let mut stdout = std::io::stdout().lock();
    stdout.write_all(ddl.as_bytes())?;
    stdout.flush()?;
    Ok(())
}
