//! `ddlsync generate` command - Render the described schema as DDL.

use std::io::Write;

use ddlsync_migrate::Sink;
use ddlsync_migrate::emit;

use crate::cli::{GenerateArgs, GlobalArgs};
use crate::commands::{engine, source};
use crate::error::CliResult;
use crate::output;

/// Run the generate command
pub fn run(args: GenerateArgs, global: &GlobalArgs) -> CliResult<()> {
    let engine = engine(global, false)?;
    let ddl = engine.generate(&source(&args.source)?)?;

    match args.output {
        Some(path) => {
            emit::write(Sink::File(path.clone()), &ddl)?;
            output::success(&format!(
                "Wrote {} schema to {}",
                engine.config().dialect,
                path.display()
            ));
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(ddl.as_bytes())?;
            stdout.flush()?;
        }
    }
    Ok(())
}
