//! Tracing subscriber setup.

use tracing_subscriber::EnvFilter;

/// Environment variable holding a filter directive such as `ddlsync_migrate=trace`.
pub const LOG_ENV: &str = "DDLSYNC_LOG";

/// Default filter for the given flags.
pub fn default_level(debug: bool, trace: bool) -> &'static str {
    if trace {
        "trace"
    } else if debug {
        "debug"
    } else {
        "warn"
    }
}

/// Install a compact subscriber on stderr.
///
/// `--debug` and `--trace` win over `DDLSYNC_LOG`; without them the variable
/// applies, falling back to `warn`.
pub fn init(debug: bool, trace: bool) {
    let level = default_level(debug, trace);
    let filter = if debug || trace {
        EnvFilter::new(level)
    } else {
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(level))
    };

    // A second call (tests running in one process) keeps the first subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .try_init();
}
