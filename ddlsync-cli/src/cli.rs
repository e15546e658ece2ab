//! CLI argument definitions using clap.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use ddlsync_schema::DialectKind;

/// ddlsync - keep SQL DDL in sync with annotated Rust structs
#[derive(Parser, Debug)]
#[command(name = "ddlsync")]
#[command(version)]
#[command(
    about = "ddlsync - keep SQL DDL in sync with annotated Rust structs",
    long_about = None
)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Options shared by every command
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Options shared by every command.
///
/// Each one may also come from a `DDLSYNC_*` environment variable; the
/// config file fills in whatever neither sets.
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// SQL dialect: postgres, mysql or spanner
    #[arg(long, global = true, env = "DDLSYNC_DIALECT", value_parser = parse_dialect)]
    pub dialect: Option<DialectKind>,

    /// Field attribute that renames a column
    #[arg(long, global = true, env = "DDLSYNC_COLUMN_KEY")]
    pub column_key: Option<String>,

    /// Attribute that carries raw DDL and table settings
    #[arg(long, global = true, env = "DDLSYNC_DDL_KEY")]
    pub ddl_key: Option<String>,

    /// Field attribute that marks primary key columns
    #[arg(long, global = true, env = "DDLSYNC_PK_KEY")]
    pub pk_key: Option<String>,

    /// Path to the config file (defaults to ./ddlsync.toml when present)
    #[arg(long, global = true, env = "DDLSYNC_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(long, global = true, env = "DDLSYNC_DEBUG")]
    pub debug: bool,

    /// Log trace output to stderr
    #[arg(long, global = true, env = "DDLSYNC_TRACE")]
    pub trace: bool,
}

fn parse_dialect(value: &str) -> Result<DialectKind, String> {
    value.parse().map_err(|e: ddlsync_schema::SchemaError| e.to_string())
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate DDL for the schema described by Rust sources
    Generate(GenerateArgs),

    /// Parse a DDL file and print it in canonical form
    Show(ShowArgs),

    /// Show the migration from DESTINATION to SOURCE without writing it
    Diff(DiffArgs),

    /// Write the migration from DESTINATION to SOURCE after confirmation
    Apply(ApplyArgs),

    /// Display version information
    Version,
}

// =============================================================================
// Generate Command
// =============================================================================

/// Arguments for the `generate` command
#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Rust file or directory of annotated structs (or a .sql/.ddl file)
    pub source: PathBuf,

    /// Write the DDL to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

// =============================================================================
// Show Command
// =============================================================================

/// Arguments for the `show` command
#[derive(Args, Debug)]
pub struct ShowArgs {
    /// DDL file to parse
    pub ddl: PathBuf,
}

// =============================================================================
// Diff Command
// =============================================================================

/// Arguments for the `diff` command
#[derive(Args, Debug)]
pub struct DiffArgs {
    /// Desired schema: Rust file or directory, or a .sql/.ddl file
    pub source: PathBuf,

    /// Current schema: .sql/.ddl file, or Rust file or directory
    pub destination: PathBuf,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Sql)]
    pub format: OutputFormat,
}

/// Output formats for `diff`
#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Rendered DDL statements
    #[default]
    Sql,
    /// Operations and statements as JSON
    Json,
}

// =============================================================================
// Apply Command
// =============================================================================

/// Arguments for the `apply` command
#[derive(Args, Debug)]
pub struct ApplyArgs {
    /// Desired schema: Rust file or directory, or a .sql/.ddl file
    pub source: PathBuf,

    /// Current schema: .sql/.ddl file, or Rust file or directory
    pub destination: PathBuf,

    /// Write the migration to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Skip the confirmation prompt
    #[arg(short = 'y', long, env = "DDLSYNC_AUTO_APPROVE")]
    pub auto_approve: bool,
}
