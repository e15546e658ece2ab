//! `ddlsync diff` command - Plan a migration without writing it.

use std::io::Write;

use ddlsync_migrate::Emitter;
use serde_json::json;

use crate::cli::{DiffArgs, GlobalArgs, OutputFormat};
use crate::commands::{engine, source};
use crate::error::CliResult;
use crate::output;

/// Run the diff command
pub fn run(args: DiffArgs, global: &GlobalArgs) -> CliResult<()> {
    let engine = engine(global, false)?;
    let dialect = engine.config().dialect;
    let plan = engine.diff(&source(&args.source)?, &source(&args.destination)?)?;
    let script = Emitter::new(dialect).render(&plan)?;

    let mut stdout = std::io::stdout().lock();
    match args.format {
        OutputFormat::Sql if plan.is_empty() => {
            writeln!(stdout, "No changes")?;
        }
        OutputFormat::Sql => {
            write!(stdout, "{}", script)?;
            output::dim(&plan.summary());
        }
        OutputFormat::Json => {
            let report = json!({
                "dialect": dialect,
                "summary": plan.summary(),
                "operations": plan.operations(),
                "statements": script.statements(),
            });
            writeln!(stdout, "{}", serde_json::to_string_pretty(&report)?)?;
        }
    }
    stdout.flush()?;
    Ok(())
}
