//! Optional post-packaging steps for the Objective-C wrapper: tests and docs.

use super::runner::{CommandRunner, ToolCommand};
use crate::bundler::{
    error::Result,
    settings::{BuildConfiguration, BuildOutput},
    utils::fs,
};
use std::path::{Path, PathBuf};

/// Directory of the companion scripts inside the OpenCV repository.
fn scripts_dir(config: &BuildConfiguration) -> PathBuf {
    config.opencv_dir().join("platforms").join("osx")
}

/// Command running the Objective-C test suite against the built framework.
pub fn run_tests_command(
    config: &BuildConfiguration,
    first: &BuildOutput,
    out_dir: &Path,
) -> ToolCommand {
    let test_dir = first
        .dir()
        .join("modules")
        .join("objc_bindings_generator")
        .join(first.target().platform().objc_target())
        .join("test");

    ToolCommand::new(scripts_dir(config).join("run_tests.py").to_string_lossy())
        .arg(format!("--framework_dir={}", out_dir.display()))
        .arg(format!("--framework_name={}", config.framework_name()))
        .path_arg(&test_dir)
}

/// Command generating the Objective-C documentation.
pub fn build_docs_command(config: &BuildConfiguration, first: &BuildOutput) -> ToolCommand {
    let framework_build = first
        .dir()
        .join("modules")
        .join("objc")
        .join("framework_build");

    ToolCommand::new(scripts_dir(config).join("build_docs.py").to_string_lossy())
        .path_arg(&framework_build)
}

/// Runs the requested extras, or prints how to run them.
///
/// Nothing happens when the Objective-C wrapper was not built.
pub async fn run_extras<R: CommandRunner>(
    runner: &R,
    config: &BuildConfiguration,
    first: &BuildOutput,
    out_dir: &Path,
) -> Result<()> {
    if !config.build_objc_wrapper() {
        return Ok(());
    }

    let tests = run_tests_command(config, first, out_dir);
    if config.run_tests() {
        runner.run(&tests).await?;
    } else {
        log::info!("To run tests call:\n{}", tests);
    }

    let docs = build_docs_command(config, first);
    if config.build_docs() {
        runner.run(&docs).await?;

        let doc_path = first
            .dir()
            .join("modules")
            .join("objc")
            .join("doc_build")
            .join("docs");
        if doc_path.exists() {
            let out_docs = out_dir.join("docs");
            fs::copy_dir(&doc_path, &out_docs).await?;
            fs::copy_file(
                &config.opencv_dir().join("doc").join("opencv.ico"),
                &out_docs.join("favicon.ico"),
            )
            .await?;
            log::info!("✓ Documentation: {}", out_docs.display());
        }
    } else {
        log::info!("To build docs call:\n{}", docs);
    }

    Ok(())
}
