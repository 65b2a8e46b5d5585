//! Framework packager library for building OpenCV.framework on macOS.
//!
//! This library drives CMake and xcodebuild for each requested
//! (architectures, platform) pair, merges the slices with `lipo` and lays
//! out a static or versioned dynamic `.framework` bundle.
//!
//! It can be used both as a CLI tool (`build_framework`) and as a library
//! dependency.

pub mod bundler;
pub mod cli;
pub mod error;

// Re-export commonly used types
pub use error::{CliError, PackagerError, Result};
