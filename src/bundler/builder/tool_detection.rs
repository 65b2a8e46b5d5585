//! External tool version checks.
//!
//! The Xcode generator features the framework build relies on need CMake
//! 3.17 or later; anything older is rejected before a build starts.

use super::runner::{CommandRunner, ToolCommand};
use crate::bundler::error::{Error, Result};
use regex::Regex;
use std::sync::LazyLock;

/// Oldest CMake release able to generate the framework project.
pub const MIN_CMAKE_VERSION: (u32, u32) = (3, 17);

static CMAKE_VERSION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"cmake version (\d+)\.(\d+)").expect("static regex is valid")
});

/// Extracts `(major, minor)` from `cmake --version` output.
pub fn parse_cmake_version(output: &str) -> Option<(u32, u32)> {
    let caps = CMAKE_VERSION_RE.captures(output)?;
    Some((caps[1].parse().ok()?, caps[2].parse().ok()?))
}

/// Queries the installed CMake and fails if it is older than [`MIN_CMAKE_VERSION`].
pub async fn check_cmake_version<R: CommandRunner>(runner: &R) -> Result<(u32, u32)> {
    let output = runner
        .output(&ToolCommand::new("cmake").arg("--version"))
        .await?;

    let version = parse_cmake_version(&output).ok_or_else(|| {
        Error::GenericError(format!(
            "could not determine CMake version from output: {}",
            output.trim()
        ))
    })?;

    if version < MIN_CMAKE_VERSION {
        return Err(Error::UnsupportedToolchain {
            tool: "CMake".to_string(),
            required: format!("{}.{}", MIN_CMAKE_VERSION.0, MIN_CMAKE_VERSION.1),
            found: format!("{}.{}", version.0, version.1),
        });
    }

    log::info!("✓ CMake {}.{} available", version.0, version.1);
    Ok(version)
}
