//! Swift module files of the Objective-C wrapper.
//!
//! Each target installs `<arch>.swiftmodule`, `<arch>.swiftdoc`, ... files;
//! Swift looks them up by target triple, so after all targets are merged
//! into one `Modules` directory the files are renamed by [`MODULE_TRIPLES`].

use crate::bundler::{
    error::{ErrorExt, Result},
    settings::BuildOutput,
    utils::fs,
};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Architecture name to Swift target triple for macOS module files.
pub const MODULE_TRIPLES: &[(&str, &str)] = &[
    ("x86_64", "x86_64-apple-macos"),
    ("arm64", "arm64-apple-macos"),
];

/// Triple for a module file stem, if it names a known architecture.
pub fn triple_for(stem: &str) -> Option<&'static str> {
    MODULE_TRIPLES
        .iter()
        .find(|(arch, _)| *arch == stem)
        .map(|(_, triple)| *triple)
}

/// Merges each target's installed `Modules` tree into `modules_dir`.
pub async fn copy_modules(
    outputs: &[BuildOutput],
    framework_name: &str,
    modules_dir: &Path,
) -> Result<()> {
    for output in outputs {
        let src = output
            .install_dir()
            .join("lib")
            .join(format!("{}.framework", framework_name))
            .join("Modules");
        log::debug!("Copying modules from {}", src.display());
        fs::copy_dir(&src, modules_dir).await?;
    }
    Ok(())
}

/// Renames architecture-named module files to their target triple.
///
/// Returns the renamed destinations.
pub async fn rename_to_triples(modules_dir: &Path) -> Result<Vec<PathBuf>> {
    let mut renames = Vec::new();
    for entry in WalkDir::new(modules_dir).follow_links(false) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        if let Some(triple) = triple_for(stem) {
            let file_name = match path.extension() {
                Some(ext) => format!("{}.{}", triple, ext.to_string_lossy()),
                None => triple.to_string(),
            };
            renames.push((path.to_path_buf(), path.with_file_name(file_name)));
        }
    }

    let mut renamed = Vec::with_capacity(renames.len());
    for (from, to) in renames {
        tokio::fs::rename(&from, &to)
            .await
            .fs_context("renaming module file", &from)?;
        renamed.push(to);
    }
    Ok(renamed)
}
