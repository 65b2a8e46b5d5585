//! Top-level error types for the packager.
//!
//! This module defines the errors surfaced by the CLI, with exit codes and
//! recovery suggestions.

use thiserror::Error;

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, PackagerError>;

/// Main error type for all packager operations
#[derive(Error, Debug)]
pub enum PackagerError {
    /// CLI argument errors
    #[error("CLI error: {0}")]
    Cli(#[from] CliError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Packaging pipeline errors
    #[error("{0}")]
    Bundler(#[from] crate::bundler::Error),

    /// Generic errors from anyhow
    #[error("{0}")]
    Anyhow(#[from] anyhow::Error),
}

/// CLI-specific errors
#[derive(Error, Debug)]
pub enum CliError {
    /// Invalid command line arguments
    #[error("Invalid arguments: {reason}")]
    InvalidArguments {
        /// Reason for the error
        reason: String,
    },
}

impl PackagerError {
    /// Process exit code for this error.
    ///
    /// `2` for bad input, `1` for everything that failed while running tools.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Cli(_) => 2,
            Self::Bundler(e) if e.is_configuration() => 2,
            _ => 1,
        }
    }

    /// Get actionable recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<String> {
        use crate::bundler::Error;

        match self {
            Self::Bundler(Error::Configuration(msg)) if msg.contains("Duplicate archs") => vec![
                "Give --macos_archs and --catalyst_archs disjoint architecture lists".to_string(),
            ],
            Self::Bundler(Error::Configuration(msg)) if msg.contains("nothing will be built") => {
                vec!["Pass --macos_archs and/or --catalyst_archs".to_string()]
            }
            Self::Bundler(Error::UnsupportedToolchain { .. }) => {
                vec!["Install CMake 3.17 or later (e.g. `brew install cmake`)".to_string()]
            }
            Self::Bundler(Error::CommandFailed { command, .. }) => vec![format!(
                "Make sure `{}` is installed and on PATH (Xcode command line tools)",
                command
            )],
            Self::Bundler(Error::ExternalProcess { .. }) => vec![
                "Inspect the tool output above; build directories are kept under <OUTDIR>/build"
                    .to_string(),
            ],
            _ => vec!["Check the error message above for specific details".to_string()],
        }
    }
}
