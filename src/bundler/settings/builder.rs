//! Builder for constructing BuildConfiguration.

use super::core::{
    DEFAULT_DEPLOYMENT_TARGET, DEFAULT_FRAMEWORK_NAME, LEGACY_FRAMEWORK_NAME, OBJC_MODULE,
};
use super::{Arch, BuildConfiguration, Platform, Target};
use crate::{bundler::Result, config_bail};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Builder for constructing [`BuildConfiguration`].
///
/// Resolves defaults and validates the requested targets; nothing is
/// executed here.
///
/// # Defaults
///
/// - macOS archs: `x86_64`, unless [`build_only_specified_archs`](Self::build_only_specified_archs)
/// - Catalyst archs: none
/// - deployment target: `10.12`
/// - framework name: `opencv2`
/// - jobs: number of logical CPUs
#[derive(Debug, Default)]
pub struct ConfigurationBuilder {
    opencv_dir: Option<PathBuf>,
    contrib_dir: Option<PathBuf>,
    without: Vec<String>,
    disable: Vec<String>,
    dynamic: bool,
    enable_nonfree: bool,
    deployment_target: Option<String>,
    build_only_specified_archs: bool,
    macos_archs: Option<Vec<String>>,
    catalyst_archs: Option<Vec<String>>,
    debug: bool,
    debug_info: bool,
    framework_name: Option<String>,
    legacy_build: bool,
    run_tests: bool,
    build_docs: bool,
    jobs: Option<usize>,
}

impl ConfigurationBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Default::default()
    }

    /// OpenCV repository to build from.
    ///
    /// Default: current directory
    pub fn opencv_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.opencv_dir = Some(path.as_ref().to_path_buf());
        self
    }

    /// opencv_contrib repository with extra modules.
    pub fn contrib_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.contrib_dir = Some(path.as_ref().to_path_buf());
        self
    }

    /// Modules to exclude from the framework.
    pub fn without<I, S>(mut self, modules: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.without.extend(modules.into_iter().map(Into::into));
        self
    }

    /// Features to disable.
    pub fn disable<I, S>(mut self, features: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.disable.extend(features.into_iter().map(Into::into));
        self
    }

    /// Build a dynamic framework.
    pub fn dynamic(mut self, dynamic: bool) -> Self {
        self.dynamic = dynamic;
        self
    }

    /// Enable non-free modules.
    pub fn enable_nonfree(mut self, enable: bool) -> Self {
        self.enable_nonfree = enable;
        self
    }

    /// Override `MACOSX_DEPLOYMENT_TARGET`.
    pub fn deployment_target(mut self, version: impl Into<String>) -> Self {
        self.deployment_target = Some(version.into());
        self
    }

    /// Only build architectures that were explicitly requested.
    pub fn build_only_specified_archs(mut self, only: bool) -> Self {
        self.build_only_specified_archs = only;
        self
    }

    /// Architectures for the macOS slice.
    pub fn macos_archs<I, S>(mut self, archs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.macos_archs = Some(archs.into_iter().map(Into::into).collect());
        self
    }

    /// Architectures for the Catalyst slice.
    pub fn catalyst_archs<I, S>(mut self, archs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.catalyst_archs = Some(archs.into_iter().map(Into::into).collect());
        self
    }

    /// Debug configuration.
    pub fn debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Build with debug information.
    pub fn debug_info(mut self, debug_info: bool) -> Self {
        self.debug_info = debug_info;
        self
    }

    /// Framework name.
    pub fn framework_name(mut self, name: impl Into<String>) -> Self {
        self.framework_name = Some(name.into());
        self
    }

    /// Legacy framework: name `opencv2`, no Objective-C wrapper.
    pub fn legacy_build(mut self, legacy: bool) -> Self {
        self.legacy_build = legacy;
        self
    }

    /// Run tests after packaging.
    pub fn run_tests(mut self, run: bool) -> Self {
        self.run_tests = run;
        self
    }

    /// Build docs after packaging.
    pub fn build_docs(mut self, build: bool) -> Self {
        self.build_docs = build;
        self
    }

    /// Parallel job hint for xcodebuild.
    pub fn jobs(mut self, jobs: usize) -> Self {
        self.jobs = Some(jobs);
        self
    }

    /// Resolves defaults and validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`](crate::bundler::Error::Configuration) if:
    /// - no architectures are requested for either platform
    /// - an architecture name is unknown
    /// - the same architecture is requested for more than one platform
    /// - the framework name or job count is empty/zero
    pub fn build(self) -> Result<BuildConfiguration> {
        let macos_archs = match parse_archs(self.macos_archs.as_deref(), Platform::MacOsx)? {
            Some(archs) => Some(archs),
            None if !self.build_only_specified_archs => Some(vec![Arch::X86_64]),
            None => None,
        };
        log::info!("Using MacOS ARCHS={}", format_archs(macos_archs.as_deref()));

        let catalyst_archs = parse_archs(self.catalyst_archs.as_deref(), Platform::Catalyst)?;
        log::info!(
            "Using Catalyst ARCHS={}",
            format_archs(catalyst_archs.as_deref())
        );

        // lipo cannot stitch two slices of the same architecture together
        if let (Some(macos), Some(catalyst)) = (&macos_archs, &catalyst_archs) {
            let duplicates: BTreeSet<_> = macos.iter().filter(|&a| catalyst.contains(a)).collect();
            if !duplicates.is_empty() {
                config_bail!(
                    "Cannot have the same architecture for multiple platforms in a fat framework! \
                     Consider building an xcframework instead. Duplicate archs are {}",
                    duplicates
                        .iter()
                        .map(|a| a.as_str())
                        .collect::<Vec<_>>()
                        .join(", ")
                );
            }
        }

        let mut targets = Vec::new();
        if let Some(archs) = macos_archs {
            targets.push(Target::new(archs, Platform::MacOsx));
        }
        if let Some(archs) = catalyst_archs {
            targets.push(Target::new(archs, Platform::Catalyst));
        }
        if targets.is_empty() {
            config_bail!("--macos_archs and --catalyst_archs are undefined; nothing will be built.");
        }

        let mut exclude = Vec::new();
        for module in self.without {
            if !exclude.contains(&module) {
                exclude.push(module);
            }
        }

        let mut framework_name = self
            .framework_name
            .unwrap_or_else(|| DEFAULT_FRAMEWORK_NAME.to_string());
        if self.legacy_build {
            framework_name = LEGACY_FRAMEWORK_NAME.to_string();
            if !exclude.iter().any(|m| m == OBJC_MODULE) {
                exclude.push(OBJC_MODULE.to_string());
            }
        }
        if framework_name.is_empty() || framework_name.contains('/') {
            config_bail!("invalid framework name '{}'", framework_name);
        }

        let jobs = self.jobs.unwrap_or_else(num_cpus::get);
        if jobs == 0 {
            config_bail!("job count must be at least 1");
        }

        let deployment_target = self
            .deployment_target
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_DEPLOYMENT_TARGET.to_string());

        Ok(BuildConfiguration {
            opencv_dir: self.opencv_dir.unwrap_or_else(|| PathBuf::from(".")),
            contrib_dir: self.contrib_dir,
            exclude,
            disable: self.disable,
            dynamic: self.dynamic,
            enable_nonfree: self.enable_nonfree,
            deployment_target,
            targets,
            debug: self.debug,
            debug_info: self.debug_info,
            framework_name,
            run_tests: self.run_tests,
            build_docs: self.build_docs,
            jobs,
        })
    }
}

/// Parses a requested architecture list.
///
/// Blank entries are ignored, an all-blank list counts as "not requested".
/// Repeats within one platform are dropped with a warning.
fn parse_archs(raw: Option<&[String]>, platform: Platform) -> Result<Option<Vec<Arch>>> {
    let Some(raw) = raw else {
        return Ok(None);
    };

    let mut archs: Vec<Arch> = Vec::new();
    for name in raw.iter().map(|s| s.trim()).filter(|s| !s.is_empty()) {
        let arch: Arch = name.parse()?;
        if archs.contains(&arch) {
            log::warn!("{} requested more than once for {}, building it once", arch, platform);
            continue;
        }
        archs.push(arch);
    }

    Ok((!archs.is_empty()).then_some(archs))
}

fn format_archs(archs: Option<&[Arch]>) -> String {
    match archs {
        Some(archs) => format!(
            "[{}]",
            archs.iter().map(Arch::as_str).collect::<Vec<_>>().join(", ")
        ),
        None => "None".to_string(),
    }
}
