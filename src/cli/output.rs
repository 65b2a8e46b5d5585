//! Terminal output for the packager CLI.
//!
//! Progress, warnings and the final summary go to the terminal directly;
//! everything else is logged through `log`. Styling is stripped
//! automatically when the stream is not a terminal.

use anstream::{stderr, stdout};
use owo_colors::OwoColorize;
use std::io::{self, Write};

/// Formats user-facing messages.
#[derive(Debug, Clone, Copy, Default)]
pub struct OutputManager;

impl OutputManager {
    /// Creates an output manager.
    pub fn new() -> Self {
        Self
    }

    /// Warning, on stderr.
    pub fn warn(&self, message: &str) -> io::Result<()> {
        writeln!(
            stderr(),
            "{}{} {}",
            "warning".yellow().bold(),
            ":".bold(),
            message.bold()
        )
    }

    /// Success line.
    pub fn success(&self, message: &str) -> io::Result<()> {
        writeln!(stdout(), "{} {}", "✓".green().bold(), message)
    }

    /// Progress line.
    pub fn progress(&self, message: &str) -> io::Result<()> {
        writeln!(stdout(), "{} {}", "→".cyan(), message)
    }

    /// Section header.
    pub fn section(&self, title: &str) -> io::Result<()> {
        let mut out = stdout();
        writeln!(out)?;
        writeln!(out, "{}", title.bold())?;
        writeln!(out, "{}", "─".repeat(title.chars().count()).dimmed())
    }

    /// Indented detail line.
    pub fn indent(&self, message: &str) -> io::Result<()> {
        writeln!(stdout(), "  {}", message)
    }
}
