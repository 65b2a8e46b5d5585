//! Universal (fat) library creation with Apple's `lipo`.

use crate::bundler::{
    builder::{CommandRunner, ToolCommand, native_build},
    error::Result,
    settings::{BuildConfiguration, BuildOutput},
};
use std::path::{Path, PathBuf};

/// The library each target contributes to the universal binary.
///
/// Static frameworks use the merged static archive, dynamic frameworks the
/// framework binary installed by CMake.
pub fn library_inputs(config: &BuildConfiguration, outputs: &[BuildOutput]) -> Vec<PathBuf> {
    outputs
        .iter()
        .map(|output| {
            if config.dynamic() {
                let name = config.framework_name();
                output
                    .install_dir()
                    .join("lib")
                    .join(format!("{}.framework", name))
                    .join(name)
            } else {
                native_build::merged_static_lib(config, output.dir())
            }
        })
        .collect()
}

/// `lipo -create <inputs...> -o <output>`.
pub fn lipo_command(inputs: &[PathBuf], output: &Path) -> ToolCommand {
    ToolCommand::new("lipo")
        .arg("-create")
        .args(inputs.iter().map(|p| p.to_string_lossy().into_owned()))
        .arg("-o")
        .path_arg(output)
}

/// Stitches one library per target into a single multi-architecture file.
///
/// # Errors
/// - If lipo cannot be run
/// - If lipo rejects the inputs (most often: the same architecture twice)
pub async fn create_universal_library<R: CommandRunner>(
    runner: &R,
    inputs: &[PathBuf],
    output: &Path,
) -> Result<()> {
    log::info!(
        "Creating universal library from:\n\t{}",
        inputs
            .iter()
            .map(|p| p.display().to_string())
            .collect::<Vec<_>>()
            .join("\n\t")
    );
    runner.run(&lipo_command(inputs, output)).await?;
    log::info!("✓ Universal library: {}", output.display());
    Ok(())
}
