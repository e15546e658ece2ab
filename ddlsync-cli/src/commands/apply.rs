//! `ddlsync apply` command - Confirm and write a migration.

use ddlsync_migrate::{Confirm, MigrateResult, MigrationPlan, MigrationScript, Outcome, Sink};

use crate::cli::{ApplyArgs, GlobalArgs};
use crate::commands::{engine, source};
use crate::error::CliResult;
use crate::output;

/// Interactive confirmation on the terminal.
pub struct Prompt;

impl Confirm for Prompt {
    fn confirm(&mut self, plan: &MigrationPlan, script: &MigrationScript) -> MigrateResult<bool> {
        output::header("Planned migration");
        output::kv("Changes", &plan.summary());
        output::code(&script.to_string());
        Ok(output::confirm("Apply these changes?"))
    }
}

/// Run the apply command
pub fn run(args: ApplyArgs, global: &GlobalArgs) -> CliResult<()> {
    let engine = engine(global, args.auto_approve)?;
    let desired = source(&args.source)?;
    let destination = source(&args.destination)?;

    let mut stdout = std::io::stdout().lock();
    let sink = match &args.output {
        Some(path) => Sink::File(path.clone()),
        None => Sink::Stream(&mut stdout),
    };

    match engine.apply(&desired, &destination, sink, &mut Prompt)? {
        Outcome::NoChanges => output::info("No changes"),
        Outcome::Declined(_) => output::warn("Migration declined; nothing was written"),
        Outcome::Applied {
            script,
            target: Some(path),
        } => output::success(&format!(
            "Wrote {} statement(s) to {}",
            script.statements().len(),
            path.display()
        )),
        Outcome::Applied { target: None, .. } | Outcome::Planned(_) => {}
    }
    Ok(())
}
