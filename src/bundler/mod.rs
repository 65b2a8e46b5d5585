//! Framework packaging.
//!
//! Builds OpenCV once per (architectures, platform) target with the native
//! Apple toolchain and repackages the installed output as a single
//! `<name>.framework` bundle.
//!
//! # Example
//!
//! ```no_run
//! use framework_packager::bundler::{ConfigurationBuilder, FrameworkPackager};
//!
//! # async fn example() -> framework_packager::bundler::Result<()> {
//! let config = ConfigurationBuilder::new()
//!     .opencv_dir("../opencv")
//!     .macos_archs(["arm64"])
//!     .catalyst_archs(["x86_64"])
//!     .dynamic(true)
//!     .build()?;
//!
//! let framework = FrameworkPackager::new(config)
//!     .package("ios_out".as_ref())
//!     .await?;
//! println!("SHA256: {}", framework.digest.sha256);
//! # Ok(())
//! # }
//! ```

pub mod builder;
pub mod error;
pub mod framework;
pub mod settings;
pub mod utils;

pub use builder::{
    BundledFramework, CommandRunner, EnvRunner, FrameworkPackager, ProcessRunner, ToolCommand,
};
pub use error::{Error, Result};
pub use settings::{
    Arch, BuildConfiguration, BuildOutput, ConfigurationBuilder, Platform, Target, TargetState,
};
