//! Build orchestration and coordination.
//!
//! This module provides the main [`FrameworkPackager`] orchestrator that
//! drives the native toolchain for each target and hands the results to
//! framework assembly.
//!
//! # Module Organization
//!
//! - [`checksum`] - SHA-256 digest of the finished bundle
//! - [`extras`] - Objective-C test and doc runs
//! - [`native_build`] - CMake / xcodebuild / libtool command lines
//! - [`orchestrator`] - Main [`FrameworkPackager`] struct
//! - [`runner`] - External process execution
//! - [`tool_detection`] - CMake version preflight

pub mod checksum;
pub mod extras;
pub mod native_build;
mod orchestrator;
pub mod runner;
pub mod tool_detection;

pub use orchestrator::{BundledFramework, FrameworkPackager};
pub use runner::{CommandRunner, EnvRunner, ProcessRunner, ToolCommand};
