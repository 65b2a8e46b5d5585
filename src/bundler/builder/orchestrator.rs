//! Main packaging orchestration.
//!
//! This module provides the [`FrameworkPackager`] orchestrator that drives
//! the native build of every target and assembles the framework bundle.

use super::{
    checksum::{TreeDigest, calculate_tree_digest},
    extras, native_build,
    runner::{CommandRunner, EnvRunner, ProcessRunner},
    tool_detection,
};
use crate::bundler::{
    Result,
    framework::{self, BundleStage},
    settings::{BuildConfiguration, BuildOutput, TargetState},
};
use std::path::{Path, PathBuf};

/// A finished framework.
#[derive(Clone, Debug)]
pub struct BundledFramework {
    /// Bundle root, `<out>/<name>.framework`
    pub path: PathBuf,
    /// Universal library inside the bundle
    pub binary: PathBuf,
    /// Symlinks created at the bundle root (dynamic frameworks only)
    pub links: Vec<PathBuf>,
    /// Checksum and size of the bundle tree
    pub digest: TreeDigest,
}

/// Main packaging orchestrator.
///
/// Runs the pipeline strictly in order:
/// 1. CMake version preflight
/// 2. Native build of every target, sequentially
/// 3. Framework assembly (headers, universal library, Info.plist, links)
/// 4. Optional tests and docs
///
/// The first failure aborts the run; build directories are left in place.
///
/// # Examples
///
/// ```no_run
/// use framework_packager::bundler::{ConfigurationBuilder, FrameworkPackager};
///
/// # async fn example() -> framework_packager::bundler::Result<()> {
/// let config = ConfigurationBuilder::new()
///     .opencv_dir("../opencv")
///     .macos_archs(["x86_64", "arm64"])
///     .build()?;
///
/// let framework = FrameworkPackager::new(config).package("build_out".as_ref()).await?;
/// println!("Created: {}", framework.path.display());
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct FrameworkPackager<R = ProcessRunner> {
    config: BuildConfiguration,
    runner: R,
    states: Vec<TargetState>,
}

impl FrameworkPackager<ProcessRunner> {
    /// Creates a packager running real processes.
    pub fn new(config: BuildConfiguration) -> Self {
        Self::with_runner(config, ProcessRunner)
    }
}

impl<R: CommandRunner> FrameworkPackager<R> {
    /// Creates a packager using a custom command runner.
    pub fn with_runner(config: BuildConfiguration, runner: R) -> Self {
        let states = vec![TargetState::Pending; config.targets().len()];
        Self {
            config,
            runner,
            states,
        }
    }

    /// Configuration in use.
    pub fn config(&self) -> &BuildConfiguration {
        &self.config
    }

    /// Command runner in use.
    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// State of each target, in build order.
    pub fn target_states(&self) -> &[TargetState] {
        &self.states
    }

    /// Builds every target and assembles `<out_dir>/<name>.framework`.
    ///
    /// Every command launched on the way sees `MACOSX_DEPLOYMENT_TARGET`.
    pub async fn package(&mut self, out_dir: &Path) -> Result<BundledFramework> {
        let config = &self.config;
        let runner = EnvRunner::new(&self.runner)
            .env(native_build::DEPLOYMENT_TARGET_ENV, config.deployment_target());

        tool_detection::check_cmake_version(&runner).await?;

        log::info!(
            "Using {}={}",
            native_build::DEPLOYMENT_TARGET_ENV,
            config.deployment_target()
        );

        let outputs = build_targets(&runner, config, &mut self.states, out_dir).await?;

        let bundle = framework::assemble_framework(&runner, config, &outputs, out_dir).await?;
        debug_assert_eq!(bundle.stage(), BundleStage::Complete);

        extras::run_extras(&runner, config, &outputs[0], out_dir).await?;

        let digest = calculate_tree_digest(bundle.path()).await?;

        Ok(BundledFramework {
            path: bundle.path().to_path_buf(),
            binary: bundle.layout().binary(),
            links: bundle.links().to_vec(),
            digest,
        })
    }
}

/// Runs the native build of every target, in configured order.
async fn build_targets<R: CommandRunner>(
    runner: &R,
    config: &BuildConfiguration,
    states: &mut [TargetState],
    out_dir: &Path,
) -> Result<Vec<BuildOutput>> {
    let build_root = out_dir.join("build");
    let mut outputs = Vec::with_capacity(config.targets().len());

    for (target, state) in config.targets().iter().zip(states.iter_mut()) {
        *state = TargetState::Building;
        match native_build::build_target(runner, config, target, &build_root).await {
            Ok(output) => {
                *state = TargetState::Built;
                log::info!("✓ Built {}", target);
                outputs.push(output);
            }
            Err(e) => {
                *state = TargetState::Failed;
                log::error!("Build of {} failed", target);
                return Err(e);
            }
        }
    }

    Ok(outputs)
}
