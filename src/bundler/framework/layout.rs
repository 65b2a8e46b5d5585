//! On-disk shape of a `.framework` bundle.
//!
//! Static frameworks are flat:
//!
//! ```text
//! Name.framework/
//!   Headers/  Name  Info.plist  [Modules/]
//! ```
//!
//! Dynamic frameworks are versioned, with the top level made of links:
//!
//! ```text
//! Name.framework/
//!   Versions/A/{Headers, Resources/Info.plist, Modules, Name}
//!   Versions/Current -> A
//!   Headers   -> Versions/Current/Headers
//!   Resources -> Versions/Current/Resources
//!   Modules   -> Versions/Current/Modules
//!   Name      -> Versions/Current/Name
//! ```

use crate::bundler::{error::Result, utils::fs};
use std::path::{Path, PathBuf};

/// Version directory of a dynamic framework.
pub const VERSION_NAME: &str = "A";

/// Paths of one framework bundle.
#[derive(Clone, Debug)]
pub struct FrameworkLayout {
    name: String,
    framework_dir: PathBuf,
    dynamic: bool,
}

impl FrameworkLayout {
    /// Layout of `<out_dir>/<name>.framework`.
    pub fn new(out_dir: &Path, name: &str, dynamic: bool) -> Self {
        Self {
            name: name.to_string(),
            framework_dir: out_dir.join(format!("{}.framework", name)),
            dynamic,
        }
    }

    /// Bundle root.
    pub fn framework_dir(&self) -> &Path {
        &self.framework_dir
    }

    /// Directory holding the real content: the root, or `Versions/A`.
    pub fn content_dir(&self) -> PathBuf {
        if self.dynamic {
            self.framework_dir.join("Versions").join(VERSION_NAME)
        } else {
            self.framework_dir.clone()
        }
    }

    /// Header tree.
    pub fn headers_dir(&self) -> PathBuf {
        self.content_dir().join("Headers")
    }

    /// Swift module tree.
    pub fn modules_dir(&self) -> PathBuf {
        self.content_dir().join("Modules")
    }

    /// Directory receiving `Info.plist`.
    pub fn resources_dir(&self) -> PathBuf {
        if self.dynamic {
            self.content_dir().join("Resources")
        } else {
            self.content_dir()
        }
    }

    /// `Info.plist` destination.
    pub fn info_plist(&self) -> PathBuf {
        self.resources_dir().join("Info.plist")
    }

    /// Universal library destination.
    pub fn binary(&self) -> PathBuf {
        self.content_dir().join(&self.name)
    }

    /// `(target, link)` pairs of a dynamic framework, link relative to the
    /// bundle root. Empty for static frameworks.
    pub fn version_links(&self) -> Vec<(PathBuf, PathBuf)> {
        if !self.dynamic {
            return Vec::new();
        }
        let current = Path::new("Versions").join("Current");
        vec![
            (PathBuf::from(VERSION_NAME), current.clone()),
            (current.join("Headers"), PathBuf::from("Headers")),
            (current.join("Resources"), PathBuf::from("Resources")),
            (current.join("Modules"), PathBuf::from("Modules")),
            (current.join(&self.name), PathBuf::from(&self.name)),
        ]
    }

    /// Creates the version links. The `Modules` link is created even when
    /// no module tree exists.
    pub fn create_version_links(&self) -> Result<Vec<PathBuf>> {
        let mut links = Vec::new();
        for (target, link) in self.version_links() {
            let link = self.framework_dir.join(link);
            fs::symlink(&target, &link)?;
            links.push(link);
        }
        Ok(links)
    }
}
