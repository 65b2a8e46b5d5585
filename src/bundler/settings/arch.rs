//! CPU architecture types and utilities.

use std::fmt;
use std::str::FromStr;

/// Apple CPU architecture as spelled by Xcode's `ARCHS` setting.
///
/// # Examples
///
/// ```
/// use framework_packager::bundler::Arch;
///
/// let arch: Arch = "arm64".parse().unwrap();
/// assert_eq!(arch, Arch::Arm64);
/// assert_eq!(arch.as_str(), "arm64");
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub enum Arch {
    /// Intel 64-bit
    X86_64,
    /// Apple Silicon / ARM 64-bit
    Arm64,
    /// ARM 64-bit with pointer authentication
    Arm64e,
    /// Intel 32-bit (legacy simulators)
    I386,
    /// ARMv7 (legacy devices)
    Armv7,
    /// ARMv7s (legacy devices)
    Armv7s,
}

impl Arch {
    /// All architectures accepted on the command line.
    pub const ALL: [Arch; 6] = [
        Arch::X86_64,
        Arch::Arm64,
        Arch::Arm64e,
        Arch::I386,
        Arch::Armv7,
        Arch::Armv7s,
    ];

    /// Name used by xcodebuild, lipo and module map file stems.
    pub fn as_str(&self) -> &'static str {
        match self {
            Arch::X86_64 => "x86_64",
            Arch::Arm64 => "arm64",
            Arch::Arm64e => "arm64e",
            Arch::I386 => "i386",
            Arch::Armv7 => "armv7",
            Arch::Armv7s => "armv7s",
        }
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Arch {
    type Err = crate::bundler::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Arch::ALL
            .into_iter()
            .find(|arch| arch.as_str() == s)
            .ok_or_else(|| {
                crate::bundler::Error::Configuration(format!(
                    "unknown architecture '{}'. Valid architectures: {}",
                    s,
                    Arch::ALL.map(|a| a.as_str()).join(", ")
                ))
            })
    }
}
