//! Build platforms a framework slice can be compiled for.

use std::fmt;

/// Platform half of a build target.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Platform {
    /// Native macOS
    MacOsx,
    /// Mac Catalyst (iOS APIs running on macOS)
    Catalyst,
}

impl Platform {
    /// Display name, as used in log output.
    pub fn name(&self) -> &'static str {
        match self {
            Platform::MacOsx => "MacOSX",
            Platform::Catalyst => "Catalyst",
        }
    }

    /// Lowercase name used in build directory names.
    pub fn dir_name(&self) -> &'static str {
        match self {
            Platform::MacOsx => "macosx",
            Platform::Catalyst => "catalyst",
        }
    }

    /// SDK passed to `xcodebuild -sdk`.
    ///
    /// Catalyst builds against the macOS SDK; the iOS SDK root is selected
    /// separately through `SDKROOT`.
    pub fn sdk(&self) -> &'static str {
        "macosx"
    }

    /// Target the Objective-C bindings are generated for.
    pub fn objc_target(&self) -> &'static str {
        match self {
            Platform::MacOsx => "osx",
            Platform::Catalyst => "ios",
        }
    }

    /// Whether this is the cross-platform compatibility target.
    pub fn is_catalyst(&self) -> bool {
        matches!(self, Platform::Catalyst)
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
