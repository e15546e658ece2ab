//! ddlsync CLI - Command-line interface for ddlsync.

use clap::Parser;

use ddlsync_cli::cli::{Cli, Command};
use ddlsync_cli::commands;
use ddlsync_cli::error::CliResult;
use ddlsync_cli::logging;

fn main() {
    if let Err(e) = run() {
        eprintln!("{:?}", miette::Report::new(e));
        std::process::exit(1);
    }
}

fn run() -> CliResult<()> {
    let cli = Cli::parse();
    logging::init(cli.global.debug, cli.global.trace);

    match cli.command {
        Command::Generate(args) => commands::generate::run(args, &cli.global),
        Command::Show(args) => commands::show::run(args, &cli.global),
        Command::Diff(args) => commands::diff::run(args, &cli.global),
        Command::Apply(args) => commands::apply::run(args, &cli.global),
        Command::Version => commands::version::run(),
    }
}
