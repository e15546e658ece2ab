//! Styled terminal output utilities.
//!
//! Messages go to stderr; stdout carries only DDL or JSON so it can be
//! redirected into a file.

use std::io::{self, BufRead, Write};

use owo_colors::OwoColorize;

/// Print a header/title
pub fn header(text: &str) {
    eprintln!();
    eprintln!("{}", text.bold().cyan());
    eprintln!("{}", "─".repeat(text.chars().count()).dimmed());
    eprintln!();
}

/// Print a section header
pub fn section(text: &str) {
    eprintln!("{}", text.bold().white());
}

/// Print a key-value pair
pub fn kv(key: &str, value: &str) {
    eprintln!("  {}: {}", key.dimmed(), value);
}

/// Print a success message
pub fn success(text: &str) {
    eprintln!("{} {}", "✔".green().bold(), text.green());
}

/// Print an info message
pub fn info(text: &str) {
    eprintln!("{} {}", "ℹ".blue().bold(), text);
}

/// Print a warning message
pub fn warn(text: &str) {
    eprintln!("{} {}", "⚠".yellow().bold(), text.yellow());
}

/// Print a newline
pub fn newline() {
    eprintln!();
}

/// Print dimmed text
pub fn dim(text: &str) {
    eprintln!("{}", text.dimmed());
}

/// Print a block of SQL, indented
pub fn code(code: &str) {
    eprintln!();
    for line in code.lines() {
        eprintln!("  {}", line.bright_white());
    }
    eprintln!();
}

/// Ask for confirmation on stdin. Anything but `y`/`yes` declines,
/// including end of input.
pub fn confirm(prompt: &str) -> bool {
    eprint!("{} {} ", prompt, "[y/N]".dimmed());
    io::stderr().flush().ok();

    let mut input = String::new();
    if io::stdin().lock().read_line(&mut input).is_err() {
        return false;
    }

    is_yes(&input)
}

fn is_yes(input: &str) -> bool {
    matches!(input.trim().to_lowercase().as_str(), "y" | "yes")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_yes() {
        assert!(is_yes("y\n"));
        assert!(is_yes(" YES "));
        assert!(!is_yes(""));
        assert!(!is_yes("no"));
        assert!(!is_yes("yep"));
    }
}
