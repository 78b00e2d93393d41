//! `.reg` file import resource.
use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};

use super::error::ResourceError;
use super::fs::{collect_files, has_extension};
use super::Applicable;
use crate::exec::Executor;
use crate::logging::Log;

/// Location of the registry editor used for imports.
pub const REG_EXE: &str = r"C:\Windows\system32\reg.exe";

/// Extension of registry export files.
const REG_EXTENSION: &str = "reg";

/// Find every `.reg` file under `root`, as absolute paths in sorted order.
///
/// Only `root` is made absolute; the files themselves are not resolved, so
/// a dangling symlink is still returned and fails on its own import. The
/// `\\?\` verbatim prefix, which `reg.exe` does not accept, is dropped.
///
/// # Errors
///
/// Returns an error if `root` cannot be made absolute or read.
pub fn discover(root: &Path, log: &dyn Log) -> Result<Vec<PathBuf>> {
    let root = std::path::absolute(root)
        .with_context(|| format!("resolving {}", root.display()))?;
    collect_files(
        dunce::simplified(&root),
        &|p| has_extension(p, &[REG_EXTENSION]),
        log,
    )
}

/// A registry file imported with `reg.exe import`.
///
/// Imports are not checked for current state: `reg.exe` overwrites values
/// unconditionally, so re-importing is harmless.
pub struct RegistryImportResource<'a> {
    path: PathBuf,
    reg_exe: &'a Path,
    executor: &'a dyn Executor,
}

impl std::fmt::Debug for RegistryImportResource<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistryImportResource")
            .field("path", &self.path)
            .field("reg_exe", &self.reg_exe)
            .finish_non_exhaustive()
    }
}

impl<'a> RegistryImportResource<'a> {
    /// Create an import of `path` run through `reg_exe`.
    #[must_use]
    pub const fn new(path: PathBuf, reg_exe: &'a Path, executor: &'a dyn Executor) -> Self {
        Self {
            path,
            reg_exe,
            executor,
        }
    }

    /// The file being imported.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Applicable for RegistryImportResource<'_> {
    fn description(&self) -> String {
        self.path.display().to_string()
    }

    fn apply(&self) -> Result<()> {
        let program = self.reg_exe.to_string_lossy();
        let path = self.path.to_string_lossy();
        let result = self.executor.run_unchecked(&program, &["import", &path])?;
        if !result.success {
            return Err(ResourceError::ExecutionFailed {
                program: program.into_owned(),
                exit_code: result.code.unwrap_or(-1),
                stderr: result.failure_detail().to_string(),
            }
            .into());
        }
        Ok(())
    }
}
