use std::fs::DirEntry;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};

use crate::logging::Log;

/// Recursively collect the files under `root` accepted by `keep`.
///
/// Entries are visited in file-name order so the result is deterministic.
/// Symlinked directories are not descended into; symlinks to files (even
/// dangling ones) are returned like regular files. A subdirectory or entry
/// below `root` that cannot be read is logged as a warning and skipped.
///
/// # Errors
///
/// Returns an error if `root` itself cannot be read.
pub fn collect_files(
    root: &Path,
    keep: &dyn Fn(&Path) -> bool,
    log: &dyn Log,
) -> Result<Vec<PathBuf>> {
    let entries =
        read_sorted(root).with_context(|| format!("reading directory {}", root.display()))?;
    let mut found = Vec::new();
    walk(entries, keep, log, &mut found);
    Ok(found)
}

fn read_sorted(dir: &Path) -> io::Result<Vec<DirEntry>> {
    let mut entries = std::fs::read_dir(dir)?.collect::<io::Result<Vec<_>>>()?;
    entries.sort_by_key(DirEntry::file_name);
    Ok(entries)
}

fn walk(
    entries: Vec<DirEntry>,
    keep: &dyn Fn(&Path) -> bool,
    log: &dyn Log,
    found: &mut Vec<PathBuf>,
) {
    for entry in entries {
        let path = entry.path();
        match entry.file_type() {
            Ok(file_type) if file_type.is_dir() => match read_sorted(&path) {
                Ok(children) => walk(children, keep, log, found),
                Err(e) => log.warn(&format!(
                    "Skipping unreadable directory '{}': {e}",
                    path.display()
                )),
            },
            Ok(_) => {
                if keep(&path) {
                    found.push(path);
                }
            }
            Err(e) => log.warn(&format!(
                "Skipping unreadable entry '{}': {e}",
                path.display()
            )),
        }
    }
}

/// Whether `path` has one of `extensions` (given without the dot).
///
/// Matching ignores ASCII case on Windows, where the filesystem does too.
#[must_use]
pub fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
        return false;
    };
    extensions.iter().any(|wanted| {
        if cfg!(windows) {
            ext.eq_ignore_ascii_case(wanted)
        } else {
            ext == *wanted
        }
    })
}
