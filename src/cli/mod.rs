//! Command line interface for the framework packager.
//!
//! This module parses arguments, resolves the configuration and runs the
//! packaging pipeline, reporting progress to the terminal.

mod args;
mod output;

pub use args::{Args, RuntimeConfig};
pub use output::OutputManager;

use crate::bundler::FrameworkPackager;
use crate::error::{CliError, Result};
use anyhow::Context;
use path_absolutize::Absolutize;
use std::path::{Path, PathBuf};

/// Main CLI entry point
///
/// Returns the process exit code on success.
pub async fn run() -> Result<i32> {
    let (args, unknown) = Args::parse_args();
    let runtime = RuntimeConfig::new();

    if !unknown.is_empty() {
        runtime.warn(&format!(
            "The following args are not recognized and will not be used: {:?}",
            unknown
        ))?;
    }

    args.validate()
        .map_err(|reason| CliError::InvalidArguments { reason })?;

    let out_dir = absolute(&args.out)?;
    let mut builder = args.to_builder().opencv_dir(absolute(&args.opencv)?);
    if let Some(contrib) = &args.contrib {
        builder = builder.contrib_dir(absolute(contrib)?);
    }
    let config = builder.build()?;

    runtime.section(&format!("Building {}.framework", config.framework_name()))?;
    runtime.indent(&format!("OpenCV:  {}", config.opencv_dir().display()))?;
    runtime.indent(&format!("Output:  {}", out_dir.display()))?;
    runtime.indent(&format!(
        "Kind:    {}",
        if config.dynamic() { "dynamic" } else { "static" }
    ))?;
    for target in config.targets() {
        runtime.indent(&format!("Target:  {}", target))?;
    }

    runtime.progress("Building targets")?;
    let mut packager = FrameworkPackager::new(config);
    let framework = packager.package(&out_dir).await?;

    runtime.success(&format!("Created {}", framework.path.display()))?;
    runtime.indent(&format!("SHA256: {}", framework.digest.sha256))?;
    runtime.indent(&format!("Size:   {} bytes", framework.digest.size))?;

    Ok(0)
}

fn absolute(path: &Path) -> Result<PathBuf> {
    let absolute = path
        .absolutize()
        .with_context(|| format!("Failed to resolve path {}", path.display()))?;
    Ok(absolute.into_owned())
}
