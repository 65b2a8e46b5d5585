//! Core BuildConfiguration struct and implementations.

use super::Target;
use std::path::{Path, PathBuf};

/// Default `MACOSX_DEPLOYMENT_TARGET` when neither the CLI nor the
/// environment provide one.
pub const DEFAULT_DEPLOYMENT_TARGET: &str = "10.12";

/// Default framework name.
pub const DEFAULT_FRAMEWORK_NAME: &str = "opencv2";

/// Framework name forced by legacy builds.
pub const LEGACY_FRAMEWORK_NAME: &str = "opencv2";

/// Module holding the Objective-C/Swift wrapper.
pub const OBJC_MODULE: &str = "objc";

/// Validated, immutable configuration for one packaging run.
///
/// Constructed via [`ConfigurationBuilder`](super::ConfigurationBuilder).
///
/// # Examples
///
/// ```
/// use framework_packager::bundler::ConfigurationBuilder;
///
/// # fn example() -> framework_packager::bundler::Result<()> {
/// let config = ConfigurationBuilder::new()
///     .opencv_dir("/src/opencv")
///     .macos_archs(["x86_64", "arm64"])
///     .dynamic(true)
///     .build()?;
///
/// assert_eq!(config.framework_name(), "opencv2");
/// assert_eq!(config.targets().len(), 1);
/// # Ok(())
/// # }
/// # example().unwrap();
/// ```
#[derive(Clone, Debug)]
pub struct BuildConfiguration {
    pub(super) opencv_dir: PathBuf,
    pub(super) contrib_dir: Option<PathBuf>,
    pub(super) exclude: Vec<String>,
    pub(super) disable: Vec<String>,
    pub(super) dynamic: bool,
    pub(super) enable_nonfree: bool,
    pub(super) deployment_target: String,
    pub(super) targets: Vec<Target>,
    pub(super) debug: bool,
    pub(super) debug_info: bool,
    pub(super) framework_name: String,
    pub(super) run_tests: bool,
    pub(super) build_docs: bool,
    pub(super) jobs: usize,
}

impl BuildConfiguration {
    /// OpenCV source repository.
    pub fn opencv_dir(&self) -> &Path {
        &self.opencv_dir
    }

    /// opencv_contrib repository, if extra modules are built.
    pub fn contrib_dir(&self) -> Option<&Path> {
        self.contrib_dir.as_deref()
    }

    /// Modules excluded from the build, without duplicates.
    pub fn exclude(&self) -> &[String] {
        &self.exclude
    }

    /// Features turned off (`WITH_<FEATURE>=OFF`).
    pub fn disable(&self) -> &[String] {
        &self.disable
    }

    /// Dynamic (versioned) framework instead of a static one.
    pub fn dynamic(&self) -> bool {
        self.dynamic
    }

    /// Whether non-free modules are enabled.
    pub fn enable_nonfree(&self) -> bool {
        self.enable_nonfree
    }

    /// Value of `MACOSX_DEPLOYMENT_TARGET` handed to every build tool.
    pub fn deployment_target(&self) -> &str {
        &self.deployment_target
    }

    /// Targets in build order.
    pub fn targets(&self) -> &[Target] {
        &self.targets
    }

    /// Debug configuration instead of Release.
    pub fn debug(&self) -> bool {
        self.debug
    }

    /// Release build with debug information.
    pub fn debug_info(&self) -> bool {
        self.debug_info
    }

    /// Name of the framework (`<name>.framework`, `<name>` binary).
    pub fn framework_name(&self) -> &str {
        &self.framework_name
    }

    /// Run the Objective-C tests after packaging.
    pub fn run_tests(&self) -> bool {
        self.run_tests
    }

    /// Build the Objective-C documentation after packaging.
    pub fn build_docs(&self) -> bool {
        self.build_docs
    }

    /// Parallel job hint handed to xcodebuild.
    pub fn jobs(&self) -> usize {
        self.jobs
    }

    /// Whether the Objective-C wrapper (and module maps) is part of the build.
    pub fn build_objc_wrapper(&self) -> bool {
        !self.exclude.iter().any(|m| m == OBJC_MODULE)
    }

    /// Xcode/CMake configuration name.
    pub fn configuration(&self) -> &'static str {
        if self.debug { "Debug" } else { "Release" }
    }
}
