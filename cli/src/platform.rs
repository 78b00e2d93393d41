//! Host platform detection and Windows version gating.
use std::fmt;

use crate::error::PlatformError;
use crate::resources::registry::{HKEY_LOCAL_MACHINE, RegistryAccessor};

/// Registry key holding the Windows version numbers.
const CURRENT_VERSION_KEY: &str = r"SOFTWARE\Microsoft\Windows NT\CurrentVersion";

/// Detected operating system family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Os {
    /// Linux.
    Linux,
    /// macOS.
    MacOs,
    /// Windows.
    Windows,
    /// Anything else.
    Other,
}

impl fmt::Display for Os {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Linux => write!(f, "linux"),
            Self::MacOs => write!(f, "macos"),
            Self::Windows => write!(f, "windows"),
            Self::Other => write!(f, "{}", std::env::consts::OS),
        }
    }
}

/// Platform information for the current system.
#[derive(Debug, Clone)]
pub struct Platform {
    /// Operating system family.
    pub os: Os,
}

impl Platform {
    /// Detect the current platform.
    #[must_use]
    pub fn detect() -> Self {
        Self::new(Self::detect_os())
    }

    /// Create a platform with an explicit OS (for testing).
    #[must_use]
    pub const fn new(os: Os) -> Self {
        Self { os }
    }

    /// Whether the host is Windows.
    #[must_use]
    pub fn is_windows(&self) -> bool {
        self.os == Os::Windows
    }

    const fn detect_os() -> Os {
        if cfg!(target_os = "windows") {
            Os::Windows
        } else if cfg!(target_os = "linux") {
            Os::Linux
        } else if cfg!(target_os = "macos") {
            Os::MacOs
        } else {
            Os::Other
        }
    }
}

/// A Windows release identified by major version and build number.
///
/// Ordering is lexicographic on `(major, build)`, so a version compares
/// greater than [`WindowsVersion::USER_FONTS`] exactly when it is a newer
/// major release or the same major release with a build at least as high.
///
/// # Examples
///
/// ```
/// use dotfiles_windows::platform::WindowsVersion;
///
/// assert!(WindowsVersion::new(11, 0).supports_user_fonts());
/// assert!(WindowsVersion::new(10, 17704).supports_user_fonts());
/// assert!(!WindowsVersion::new(10, 17134).supports_user_fonts());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct WindowsVersion {
    /// Major version (10 for Windows 10 and, by registry value, Windows 11).
    pub major: u32,
    /// OS build number.
    pub build: u32,
}

impl WindowsVersion {
    /// First release that supports per-user font installation.
    pub const USER_FONTS: Self = Self::new(10, 17704);

    /// Create a version from its parts.
    #[must_use]
    pub const fn new(major: u32, build: u32) -> Self {
        Self { major, build }
    }

    /// Whether fonts can be installed without administrator rights.
    #[must_use]
    pub fn supports_user_fonts(self) -> bool {
        self >= Self::USER_FONTS
    }

    /// Read the running Windows version from the registry.
    ///
    /// Uses `CurrentMajorVersionNumber`, falling back to the major part of
    /// the legacy `CurrentVersion` string on releases older than Windows 10.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError::VersionUnavailable`] if the values are
    /// missing or not numeric.
    pub fn detect(registry: &RegistryAccessor<'_>) -> Result<Self, PlatformError> {
        let major = registry
            .get(HKEY_LOCAL_MACHINE, CURRENT_VERSION_KEY, "CurrentMajorVersionNumber")
            .map(|v| v.data)
            .or_else(|| {
                registry
                    .get(HKEY_LOCAL_MACHINE, CURRENT_VERSION_KEY, "CurrentVersion")
                    .and_then(|v| v.data.split('.').next().map(str::to_string))
            })
            .ok_or_else(|| PlatformError::VersionUnavailable("no major version".to_string()))?;
        let build = registry
            .get(HKEY_LOCAL_MACHINE, CURRENT_VERSION_KEY, "CurrentBuildNumber")
            .map(|v| v.data)
            .ok_or_else(|| PlatformError::VersionUnavailable("no build number".to_string()))?;

        Ok(Self::new(parse_number(&major)?, parse_number(&build)?))
    }
}

impl fmt::Display for WindowsVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Windows {} build {}", self.major, self.build)
    }
}

fn parse_number(raw: &str) -> Result<u32, PlatformError> {
    raw.trim()
        .parse()
        .map_err(|_| PlatformError::VersionUnavailable(format!("'{raw}' is not a number")))
}
