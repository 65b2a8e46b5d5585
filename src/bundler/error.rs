//! Error types for the framework packaging pipeline.
//!
//! Every failure is fatal: configuration problems are reported before any
//! external tool runs, toolchain and process failures abort the run as soon
//! as they are observed.

use std::fmt::Display;
use std::path::PathBuf;

/// Result type alias for packaging operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while resolving, building, or assembling a framework.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Bad or contradictory input, detected before any build runs.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The external build tool is older than the supported minimum.
    #[error("{tool} {required} or later is required. Current version is {found}")]
    UnsupportedToolchain {
        /// Tool that was checked
        tool: String,
        /// Minimum supported version
        required: String,
        /// Version reported by the tool
        found: String,
    },

    /// An external process could not be started.
    #[error("failed to run `{command}`: {error}")]
    CommandFailed {
        /// Program that failed to spawn
        command: String,
        /// Underlying spawn error
        #[source]
        error: std::io::Error,
    },

    /// An external process ran and exited unsuccessfully.
    #[error("`{command}` failed with exit code {code:?}")]
    ExternalProcess {
        /// Full command line
        command: String,
        /// Exit code, `None` when terminated by a signal
        code: Option<i32>,
    },

    /// Filesystem error with the path and the operation that failed.
    #[error("{context} {}: {error}", path.display())]
    Fs {
        /// Operation being performed
        context: &'static str,
        /// Path involved
        path: PathBuf,
        /// Underlying IO error
        #[source]
        error: std::io::Error,
    },

    /// Directory traversal error.
    #[error("{0}")]
    WalkDir(#[from] walkdir::Error),

    /// Invalid glob pattern.
    #[error("{0}")]
    GlobPattern(#[from] glob::PatternError),

    /// Path outside of the expected root.
    #[error("{0}")]
    StripPrefix(#[from] std::path::StripPrefixError),

    /// Anything else.
    #[error("{0}")]
    GenericError(String),
}

impl Error {
    /// Whether the error was caused by user input rather than by the toolchain.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }
}

/// Attach path context to IO results.
pub trait ErrorExt<T> {
    /// Wrap an IO error with the operation and path it happened on.
    fn fs_context(self, context: &'static str, path: impl Into<PathBuf>) -> Result<T>;
}

impl<T> ErrorExt<T> for std::result::Result<T, std::io::Error> {
    fn fs_context(self, context: &'static str, path: impl Into<PathBuf>) -> Result<T> {
        self.map_err(|error| Error::Fs {
            context,
            path: path.into(),
            error,
        })
    }
}

/// Message context for missing values, in the spirit of `anyhow::Context`.
pub trait Context<T> {
    /// Turn `None` into an error carrying `context`.
    fn context<C>(self, context: C) -> Result<T>
    where
        C: Display + Send + Sync + 'static;
}

impl<T> Context<T> for Option<T> {
    fn context<C>(self, context: C) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
    {
        self.ok_or_else(|| Error::GenericError(context.to_string()))
    }
}

/// Return early with a [`Error::Configuration`] built from a format string.
#[macro_export]
macro_rules! config_bail {
    ($($arg:tt)*) => {
        return Err($crate::bundler::Error::Configuration(format!($($arg)*)))
    };
}
