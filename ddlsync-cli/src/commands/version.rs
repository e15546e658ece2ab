//! `ddlsync version` command - Display version information.

use ddlsync_schema::DialectKind;

use crate::error::CliResult;
use crate::output::{self, kv};

/// Package version
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Package name
const NAME: &str = env!("CARGO_PKG_NAME");

/// Run the version command
pub fn run() -> CliResult<()> {
    println!("ddlsync {}", VERSION);
    output::newline();

    kv("Binary", NAME);

    #[cfg(debug_assertions)]
    let build_mode = "debug";
    #[cfg(not(debug_assertions))]
    let build_mode = "release";
    kv("Build", build_mode);

    let dialects: Vec<&str> = DialectKind::ALL.iter().map(DialectKind::as_str).collect();
    kv("Dialects", &dialects.join(", "));

    output::newline();
    output::section("Components");
    kv("ddlsync-schema", VERSION);
    kv("ddlsync-dialect", VERSION);
    kv("ddlsync-extract", VERSION);
    kv("ddlsync-migrate", VERSION);

    Ok(())
}
