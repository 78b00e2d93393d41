pub mod apply;
pub mod validate;
pub mod version;

use std::path::{Path, PathBuf};

use crate::cli::GlobalOpts;

/// Directory that relative paths in `file` resolve against.
///
/// `--root` wins; otherwise the directory containing the config file.
#[must_use]
pub fn base_dir(global: &GlobalOpts, file: &Path) -> PathBuf {
    if let Some(ref root) = global.root {
        return root.clone();
    }
    match file.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Version string baked in at build time, or the crate version.
#[must_use]
pub fn version() -> &'static str {
    option_env!("DOTFILES_VERSION").unwrap_or(env!("CARGO_PKG_VERSION"))
}
