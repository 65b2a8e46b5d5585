//! Configuration structures for framework builds.
//!
//! This module resolves raw command-line style input into a validated
//! [`BuildConfiguration`] and the list of [`Target`]s to build.

mod arch;
mod builder;
mod core;
mod platform;
mod target;

// Re-export all public types
pub use arch::Arch;
pub use builder::ConfigurationBuilder;
pub use core::{
    BuildConfiguration, DEFAULT_DEPLOYMENT_TARGET, DEFAULT_FRAMEWORK_NAME, LEGACY_FRAMEWORK_NAME,
    OBJC_MODULE,
};
pub use platform::Platform;
pub use target::{BuildOutput, Target, TargetState};
