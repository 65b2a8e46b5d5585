//! Command line argument parsing and validation.
//!
//! This module provides CLI argument parsing using clap. Arguments clap does
//! not know about are split off before parsing and reported as a warning
//! instead of failing the run.

use crate::bundler::{
    ConfigurationBuilder,
    settings::{DEFAULT_DEPLOYMENT_TARGET, DEFAULT_FRAMEWORK_NAME},
};
use clap::{CommandFactory, Parser};
use std::path::PathBuf;

/// Builds OpenCV.framework for macOS
#[derive(Parser, Debug)]
#[command(
    name = "build_framework",
    version,
    about = "The script builds OpenCV.framework for OSX.",
    long_about = "Builds OpenCV.framework for macOS and Mac Catalyst.

Runs CMake and xcodebuild once per platform, merges the slices with lipo and
lays out OUTDIR/<name>.framework.

Usage:
  build_framework --opencv ../opencv out
  build_framework --opencv ../opencv --macos_archs x86_64,arm64 --dynamic out
  build_framework --opencv ../opencv --macos_archs arm64 --catalyst_archs x86_64 out

Exit code 0 = framework guaranteed to exist at OUTDIR/<name>.framework."
)]
pub struct Args {
    /// Folder to put built framework
    #[arg(value_name = "OUTDIR")]
    pub out: PathBuf,

    /// Folder with opencv repository
    #[arg(long, value_name = "DIR", default_value = ".")]
    pub opencv: PathBuf,

    /// Folder with opencv_contrib repository (default: build only main framework)
    #[arg(long, value_name = "DIR")]
    pub contrib: Option<PathBuf>,

    /// OpenCV modules to exclude from the framework. Repeat to exclude several,
    /// e.g. "--without video --without objc"
    #[arg(long, value_name = "MODULE")]
    pub without: Vec<String>,

    /// OpenCV features to disable (add WITH_*=OFF). Repeat to disable several,
    /// e.g. "--disable tbb --disable openmp"
    #[arg(long, value_name = "FEATURE")]
    pub disable: Vec<String>,

    /// Build dynamic framework (default builds a static framework)
    #[arg(long)]
    pub dynamic: bool,

    /// Enable non-free modules
    #[arg(long = "enable_nonfree")]
    pub enable_nonfree: bool,

    /// Specify MACOSX_DEPLOYMENT_TARGET
    #[arg(
        long = "macosx_deployment_target",
        env = "MACOSX_DEPLOYMENT_TARGET",
        default_value = DEFAULT_DEPLOYMENT_TARGET
    )]
    pub macosx_deployment_target: String,

    /// Only build directly specified archs, ignoring defaults
    #[arg(long = "build_only_specified_archs")]
    pub build_only_specified_archs: bool,

    /// (Deprecated! Prefer --macos_archs instead.) Select target ARCHS
    #[arg(long, value_name = "ARCHS")]
    pub archs: Option<String>,

    /// Select macOS target ARCHS, e.g. "x86_64,arm64" for a Universal Binary. Default is "x86_64"
    #[arg(long = "macos_archs", value_name = "ARCHS")]
    pub macos_archs: Option<String>,

    /// Select Catalyst target ARCHS, e.g. "x86_64,arm64". Default is none
    #[arg(long = "catalyst_archs", value_name = "ARCHS")]
    pub catalyst_archs: Option<String>,

    /// Build "Debug" binaries (CMAKE_BUILD_TYPE=Debug)
    #[arg(long)]
    pub debug: bool,

    /// Build with debug information (BUILD_WITH_DEBUG_INFO=ON)
    #[arg(long = "debug_info")]
    pub debug_info: bool,

    /// Name of OpenCV framework
    #[arg(long = "framework_name", default_value = DEFAULT_FRAMEWORK_NAME)]
    pub framework_name: String,

    /// Build legacy framework (equivalent to "--framework_name=opencv2 --without=objc")
    #[arg(long = "legacy_build")]
    pub legacy_build: bool,

    /// Run tests
    #[arg(long = "run_tests")]
    pub run_tests: bool,

    /// Build docs
    #[arg(long = "build_docs")]
    pub build_docs: bool,

    /// Parallel jobs for xcodebuild (default: number of CPUs)
    #[arg(short = 'j', long, value_name = "N")]
    pub jobs: Option<usize>,
}

impl Args {
    /// Parse command line arguments, exiting on `--help`, `--version` or
    /// malformed known arguments.
    ///
    /// Returns the parsed arguments and the arguments that were not recognized.
    pub fn parse_args() -> (Self, Vec<String>) {
        let argv = std::env::args_os().map(|a| a.to_string_lossy().into_owned());
        Self::parse_known_from(argv).unwrap_or_else(|e| e.exit())
    }

    /// Parses `argv` (program name first), splitting off unknown arguments.
    ///
    /// Unknown long/short options and surplus positionals are returned
    /// instead of rejected.
    pub fn parse_known_from<I>(argv: I) -> Result<(Self, Vec<String>), clap::Error>
    where
        I: IntoIterator<Item = String>,
    {
        let mut command = Self::command();
        command.build();

        let mut argv = argv.into_iter();
        let mut known: Vec<String> = argv.next().into_iter().collect();
        let mut unknown = Vec::new();
        let mut positionals = 0;

        while let Some(arg) = argv.next() {
            if arg == "--" {
                known.push(arg);
                known.extend(argv.by_ref());
                break;
            }

            let (matched, inline_value) = if let Some(long) = arg.strip_prefix("--") {
                let (name, value) = match long.split_once('=') {
                    Some((name, _)) => (name, true),
                    None => (long, false),
                };
                let matched = command
                    .get_arguments()
                    .find(|a| a.get_long() == Some(name));
                (Some(matched), value)
            } else if arg.len() > 1 && arg.starts_with('-') {
                let short = arg.chars().nth(1);
                let matched = command
                    .get_arguments()
                    .find(|a| a.get_short().is_some() && a.get_short() == short);
                (Some(matched), arg.chars().count() > 2)
            } else {
                (None, false)
            };

            match matched {
                Some(Some(option)) => {
                    let takes_value = option.get_action().takes_values();
                    known.push(arg);
                    if takes_value && !inline_value {
                        if let Some(value) = argv.next() {
                            known.push(value);
                        }
                    }
                }
                Some(None) => unknown.push(arg),
                None if positionals == 0 => {
                    positionals += 1;
                    known.push(arg);
                }
                None => unknown.push(arg),
            }
        }

        let args = Self::try_parse_from(known)?;
        Ok((args, unknown))
    }

    /// Validate arguments for consistency
    pub fn validate(&self) -> Result<(), String> {
        if self.out.as_os_str().is_empty() {
            return Err("OUTDIR cannot be empty".to_string());
        }
        if self.jobs == Some(0) {
            return Err("--jobs must be at least 1".to_string());
        }
        Ok(())
    }

    /// Translates the arguments into a configuration builder.
    ///
    /// `--archs` overrides `--macos_archs` and logs a deprecation warning.
    pub fn to_builder(&self) -> ConfigurationBuilder {
        let mut macos_archs = self.macos_archs.as_deref();
        if let Some(archs) = self.archs.as_deref() {
            log::warn!("--archs is deprecated! Prefer --macos_archs instead.");
            macos_archs = Some(archs);
        }

        let mut builder = ConfigurationBuilder::new()
            .opencv_dir(&self.opencv)
            .without(self.without.iter().cloned())
            .disable(self.disable.iter().cloned())
            .dynamic(self.dynamic)
            .enable_nonfree(self.enable_nonfree)
            .deployment_target(self.macosx_deployment_target.clone())
            .build_only_specified_archs(self.build_only_specified_archs)
            .debug(self.debug)
            .debug_info(self.debug_info)
            .framework_name(self.framework_name.clone())
            .legacy_build(self.legacy_build)
            .run_tests(self.run_tests)
            .build_docs(self.build_docs);

        if let Some(contrib) = &self.contrib {
            builder = builder.contrib_dir(contrib);
        }
        if let Some(archs) = macos_archs {
            builder = builder.macos_archs(split_archs(archs));
        }
        if let Some(archs) = self.catalyst_archs.as_deref() {
            builder = builder.catalyst_archs(split_archs(archs));
        }
        if let Some(jobs) = self.jobs {
            builder = builder.jobs(jobs);
        }
        builder
    }
}

fn split_archs(archs: &str) -> Vec<String> {
    archs.split(',').map(|a| a.trim().to_string()).collect()
}

/// Configuration derived from command line arguments
#[derive(Debug, Clone, Default)]
pub struct RuntimeConfig {
    /// Output manager for terminal output
    output: super::OutputManager,
}

impl RuntimeConfig {
    /// Creates the runtime configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Print warning message
    pub fn warn(&self, message: &str) -> std::io::Result<()> {
        self.output.warn(message)
    }

    /// Print success message
    pub fn success(&self, message: &str) -> std::io::Result<()> {
        self.output.success(message)
    }

    /// Print progress message
    pub fn progress(&self, message: &str) -> std::io::Result<()> {
        self.output.progress(message)
    }

    /// Print section header
    pub fn section(&self, title: &str) -> std::io::Result<()> {
        self.output.section(title)
    }

    /// Print indented text
    pub fn indent(&self, message: &str) -> std::io::Result<()> {
        self.output.indent(message)
    }
}
