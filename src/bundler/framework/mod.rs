//! Framework bundle assembly.
//!
//! Turns the installed output of every built target into one
//! `<name>.framework` directory.
//!
//! # Module Organization
//!
//! - [`headers`] - include rewriting for the packaged header tree
//! - [`layout`] - bundle paths and the versioned symlink table
//! - [`modules`] - Swift module merge and triple renaming
//! - [`universal`] - `lipo` universal library creation

pub mod headers;
pub mod layout;
pub mod modules;
pub mod universal;

pub use headers::HeaderRewriter;
pub use layout::FrameworkLayout;

use crate::bundler::{
    builder::CommandRunner,
    error::{Context, Result},
    settings::{BuildConfiguration, BuildOutput},
    utils::fs,
};
use std::fmt;
use std::path::{Path, PathBuf};

/// Assembly progress of a bundle. Stages only move forward.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd)]
pub enum BundleStage {
    /// Bundle directory created, nothing inside
    Empty,
    /// Headers (and module files) in place
    HeadersCopied,
    /// Universal library written
    LibraryMerged,
    /// `Info.plist` written
    MetadataWritten,
    /// Version links created (dynamic frameworks only)
    LinksCreated,
    /// Done
    Complete,
}

impl fmt::Display for BundleStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// An assembled (or partially assembled) framework bundle.
#[derive(Debug)]
pub struct FrameworkBundle {
    layout: FrameworkLayout,
    stage: BundleStage,
    links: Vec<PathBuf>,
}

impl FrameworkBundle {
    fn new(layout: FrameworkLayout) -> Self {
        Self {
            layout,
            stage: BundleStage::Empty,
            links: Vec::new(),
        }
    }

    fn advance(&mut self, next: BundleStage) {
        debug_assert!(next > self.stage, "{} -> {}", self.stage, next);
        log::debug!("Bundle stage: {} -> {}", self.stage, next);
        self.stage = next;
    }

    /// Paths of the bundle.
    pub fn layout(&self) -> &FrameworkLayout {
        &self.layout
    }

    /// Bundle root directory.
    pub fn path(&self) -> &Path {
        self.layout.framework_dir()
    }

    /// Current stage.
    pub fn stage(&self) -> BundleStage {
        self.stage
    }

    /// Symlinks created at the bundle root.
    pub fn links(&self) -> &[PathBuf] {
        &self.links
    }
}

/// Assembles `<out_dir>/<name>.framework` from completed builds.
///
/// Headers and `Info.plist` are taken from the first target; every target
/// contributes one library slice and, with the Objective-C wrapper, its
/// module files. An existing bundle at the destination is replaced.
pub async fn assemble_framework<R: CommandRunner>(
    runner: &R,
    config: &BuildConfiguration,
    outputs: &[BuildOutput],
    out_dir: &Path,
) -> Result<FrameworkBundle> {
    let first = outputs.first().context("no build outputs to assemble")?;
    let name = config.framework_name();

    let layout = FrameworkLayout::new(out_dir, name, config.dynamic());
    fs::create_dir_all(layout.framework_dir(), true).await?;
    let mut bundle = FrameworkBundle::new(layout);
    let layout = bundle.layout.clone();

    // Headers come from the first build; every slice installs the same tree
    let headers_dir = layout.headers_dir();
    fs::copy_dir(
        &first.install_dir().join("include").join(headers::PACKAGE_PREFIX),
        &headers_dir,
    )
    .await?;
    HeaderRewriter::new(name).rewrite_tree(&headers_dir).await?;

    if config.build_objc_wrapper() {
        let wrapper_headers = first
            .install_dir()
            .join("lib")
            .join(format!("{}.framework", name))
            .join("Headers");
        fs::copy_dir(&wrapper_headers, &headers_dir).await?;

        let modules_dir = layout.modules_dir();
        modules::copy_modules(outputs, name, &modules_dir).await?;
        modules::rename_to_triples(&modules_dir).await?;
    }
    bundle.advance(BundleStage::HeadersCopied);

    let inputs = universal::library_inputs(config, outputs);
    universal::create_universal_library(runner, &inputs, &layout.binary()).await?;
    bundle.advance(BundleStage::LibraryMerged);

    let plist = first.dir().join("osx").join("Info.plist");
    fs::copy_file(&plist, &layout.info_plist()).await?;
    bundle.advance(BundleStage::MetadataWritten);

    if config.dynamic() {
        bundle.links = layout.create_version_links()?;
        bundle.advance(BundleStage::LinksCreated);
    }

    bundle.advance(BundleStage::Complete);
    log::info!("✓ Assembled {}", layout.framework_dir().display());
    Ok(bundle)
}
