//! ddlsync CLI - Command-line interface for ddlsync.
//!
//! This crate provides the `ddlsync` binary: argument parsing, config file
//! resolution, logging setup and the interactive confirmation prompt around
//! the migration engine.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod logging;
pub mod output;
