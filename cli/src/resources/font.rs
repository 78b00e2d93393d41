//! Per-user font files and their registry registration.
use std::collections::BTreeMap;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

use anyhow::Result;

use super::error::ResourceError;
use super::fs::{collect_files, has_extension};
use super::registry::{HKEY_CURRENT_USER, RegistryAccessor, RegistryValue};
use crate::logging::Log;

/// File extensions recognised as fonts.
pub const FONT_EXTENSIONS: &[&str] = &["otc", "otf", "ttc", "ttf"];

/// Registry key listing per-user fonts.
pub const FONTS_KEY: &str = r"SOFTWARE\Microsoft\Windows NT\CurrentVersion\Fonts";

/// Suffix distinguishing our registry values from those of other installers.
const VALUE_SUFFIX: &str = "(dotfiles-windows)";

/// Font files found under a directory, keyed by file name.
///
/// Fonts are identified by file name alone; when the same name appears in
/// several subdirectories the first one in scan order is kept.
#[derive(Debug, Clone, Default)]
pub struct FontSet {
    fonts: BTreeMap<OsString, PathBuf>,
}

impl FontSet {
    /// Recursively scan `root` for font files.
    ///
    /// # Errors
    ///
    /// Returns an error if `root` cannot be read.
    pub fn scan(root: &Path, log: &dyn Log) -> Result<Self> {
        let mut fonts = BTreeMap::new();
        for path in collect_files(root, &|p| has_extension(p, FONT_EXTENSIONS), log)? {
            if let Some(name) = path.file_name() {
                fonts.entry(name.to_os_string()).or_insert(path);
            }
        }
        Ok(Self { fonts })
    }

    /// Number of fonts in the set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fonts.len()
    }

    /// Whether the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fonts.is_empty()
    }

    /// Names present in both `self` and `installed`, sorted.
    #[must_use]
    pub fn already_installed(&self, installed: &Self) -> Vec<&OsStr> {
        self.fonts
            .keys()
            .filter(|name| installed.fonts.contains_key(*name))
            .map(OsString::as_os_str)
            .collect()
    }

    /// Fonts in `self` whose names are absent from `installed`, sorted by name.
    #[must_use]
    pub fn missing_from(&self, installed: &Self) -> Vec<(&OsStr, &Path)> {
        self.fonts
            .iter()
            .filter(|(name, _)| !installed.fonts.contains_key(*name))
            .map(|(name, path)| (name.as_os_str(), path.as_path()))
            .collect()
    }
}

/// Copy `source` into `dest_dir` under the same file name.
///
/// # Errors
///
/// Returns [`ResourceError::Copy`] if the bytes cannot be copied.
pub fn copy_font(source: &Path, name: &OsStr, dest_dir: &Path) -> Result<PathBuf, ResourceError> {
    let dest = dest_dir.join(name);
    std::fs::copy(source, &dest).map_err(|e| ResourceError::Copy {
        from: source.to_path_buf(),
        to: dest.clone(),
        source: e,
    })?;
    Ok(dest)
}

/// Registry value name used for an installed font file.
///
/// # Examples
///
/// ```
/// use dotfiles_windows::resources::font::registry_value_name;
/// use std::ffi::OsStr;
///
/// assert_eq!(
///     registry_value_name(OsStr::new("Hack.ttf")),
///     "Hack.ttf (dotfiles-windows)"
/// );
/// ```
#[must_use]
pub fn registry_value_name(name: &OsStr) -> String {
    format!("{} {VALUE_SUFFIX}", name.to_string_lossy())
}

/// Record an installed font file so Windows loads it for the current user.
///
/// # Errors
///
/// Returns [`ResourceError::Registry`] if the value cannot be written.
pub fn register_font(registry: &RegistryAccessor<'_>, installed: &Path) -> Result<(), ResourceError> {
    let name = installed
        .file_name()
        .map(registry_value_name)
        .unwrap_or_default();
    registry.set(
        HKEY_CURRENT_USER,
        FONTS_KEY,
        &name,
        &RegistryValue::string(installed.to_string_lossy()),
    )
}
