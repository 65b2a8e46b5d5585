//! Rewrites quoted header includes to framework-style angle includes.
//!
//! Inside a framework, headers must be included as `<Name/path.h>`. Two
//! quoted forms are rewritten:
//!
//! - `#include "opencv2/core.hpp"` becomes `#include <Name/core.hpp>`
//! - `#include "mat.hpp"` (or `"./mat.hpp"`) becomes
//!   `#include <Name/mat.hpp>` at the header root, or
//!   `#include <Name/sub/mat.hpp>` for a file living in `sub/`.

use crate::bundler::error::{ErrorExt, Result};
use regex::Regex;
use std::path::{Component, Path};
use std::sync::LazyLock;
use walkdir::WalkDir;

/// Package prefix used by includes in the installed header tree.
pub const PACKAGE_PREFIX: &str = "opencv2";

static PACKAGE_INCLUDE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"#\s*include\s+"opencv2/([\w./]+\.h[p]{0,2})""#).expect("static regex is valid")
});

static LOCAL_INCLUDE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"#\s*include\s+"(?:\./)?([\w./]+\.h[p]{0,2})""#).expect("static regex is valid")
});

/// Header include rewriter for one framework name.
#[derive(Debug, Clone)]
pub struct HeaderRewriter {
    framework_name: String,
}

impl HeaderRewriter {
    /// Creates a rewriter producing `<framework_name/...>` includes.
    pub fn new(framework_name: &str) -> Self {
        Self {
            framework_name: framework_name.to_string(),
        }
    }

    /// Rewrites one header body.
    ///
    /// `rel_dir` is the directory of the file relative to the header root,
    /// `None` (or empty) for files at the root.
    pub fn rewrite(&self, body: &str, rel_dir: Option<&str>) -> String {
        let name = &self.framework_name;
        let body = PACKAGE_INCLUDE_RE.replace_all(body, |caps: &regex::Captures<'_>| {
            format!("#include <{}/{}>", name, &caps[1])
        });

        let prefix = match rel_dir.filter(|d| !d.is_empty()) {
            Some(dir) => format!("{}/{}", name, dir),
            None => name.clone(),
        };
        LOCAL_INCLUDE_RE
            .replace_all(&body, |caps: &regex::Captures<'_>| {
                format!("#include <{}/{}>", prefix, &caps[1])
            })
            .into_owned()
    }

    /// Rewrites every file under `header_root` in place.
    ///
    /// Returns the number of files whose content changed. Files that are not
    /// valid UTF-8 are left untouched.
    pub async fn rewrite_tree(&self, header_root: &Path) -> Result<usize> {
        let mut files = Vec::new();
        for entry in WalkDir::new(header_root).follow_links(false) {
            let entry = entry?;
            if entry.file_type().is_file() {
                files.push(entry.into_path());
            }
        }

        let mut changed = 0;
        for path in files {
            let rel_dir = path
                .parent()
                .map(|dir| dir.strip_prefix(header_root))
                .transpose()?
                .map(relative_dir_string);

            let bytes = tokio::fs::read(&path)
                .await
                .fs_context("reading header", &path)?;
            let Ok(body) = String::from_utf8(bytes) else {
                log::warn!("Skipping non UTF-8 header {}", path.display());
                continue;
            };

            let rewritten = self.rewrite(&body, rel_dir.as_deref());
            if rewritten != body {
                changed += 1;
            }
            tokio::fs::write(&path, rewritten)
                .await
                .fs_context("writing header", &path)?;
        }

        log::debug!("Rewrote includes in {} headers", changed);
        Ok(changed)
    }
}

/// `/`-joined form of a relative directory; empty for the root.
fn relative_dir_string(dir: &Path) -> String {
    dir.components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}
