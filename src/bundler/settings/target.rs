//! Build targets: one native build invocation each.

use super::{Arch, Platform};
use std::fmt;
use std::path::{Path, PathBuf};

/// One (architecture list, platform) pair.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Target {
    archs: Vec<Arch>,
    platform: Platform,
}

impl Target {
    /// Creates a target. `archs` must not be empty.
    pub fn new(archs: Vec<Arch>, platform: Platform) -> Self {
        debug_assert!(!archs.is_empty());
        Self { archs, platform }
    }

    /// Architectures built by this target, in requested order.
    pub fn archs(&self) -> &[Arch] {
        &self.archs
    }

    /// Platform built by this target.
    pub fn platform(&self) -> Platform {
        self.platform
    }

    /// Architectures joined with `sep`, e.g. `"x86_64 arm64"`.
    pub fn archs_joined(&self, sep: &str) -> String {
        self.archs
            .iter()
            .map(Arch::as_str)
            .collect::<Vec<_>>()
            .join(sep)
    }

    /// Build directory for this target under `parent`.
    ///
    /// Single-arch targets get `build-<arch>-<platform>`, multi-arch targets
    /// share `build-<platform>`.
    pub fn build_dir(&self, parent: &Path) -> PathBuf {
        let name = match self.archs.as_slice() {
            [arch] => format!("build-{}-{}", arch.as_str(), self.platform.dir_name()),
            _ => format!("build-{}", self.platform.dir_name()),
        };
        parent.join(name)
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.platform, self.archs_joined(", "))
    }
}

/// Lifecycle of a single target.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TargetState {
    /// Not started
    Pending,
    /// Native build running
    Building,
    /// Native build installed its output
    Built,
    /// Native build failed; the pipeline stops
    Failed,
}

/// A target whose native build completed, and where it put its output.
#[derive(Clone, Debug)]
pub struct BuildOutput {
    target: Target,
    dir: PathBuf,
}

impl BuildOutput {
    /// Records a completed build.
    pub fn new(target: Target, dir: PathBuf) -> Self {
        Self { target, dir }
    }

    /// The target that produced this output.
    pub fn target(&self) -> &Target {
        &self.target
    }

    /// Root of the build directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// `install/` tree written by `cmake_install.cmake`.
    pub fn install_dir(&self) -> PathBuf {
        self.dir.join("install")
    }
}
