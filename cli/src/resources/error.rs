//! Typed error variants for resource operations.
//!
//! This module provides [`ResourceError`], a structured error type for
//! resource check and apply operations.  Callers convert to
//! [`anyhow::Error`] via `?`.
use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors that arise from resource checks and apply operations.
#[derive(Error, Debug)]
pub enum ResourceError {
    /// A command invoked by a resource failed with a non-zero exit code.
    #[error("command '{program}' failed (exit {exit_code}): {stderr}")]
    ExecutionFailed {
        /// Name of the program that was invoked.
        program: String,
        /// Exit code returned by the process.
        exit_code: i32,
        /// Captured standard error output.
        stderr: String,
    },

    /// A registry value could not be written.
    #[error("unable to write {location}: {source}")]
    Registry {
        /// Display form of the hive, key and value name.
        location: String,
        /// Underlying OS error.
        source: io::Error,
    },

    /// A file could not be copied.
    #[error("unable to copy '{}' to '{}': {source}", .from.display(), .to.display())]
    Copy {
        /// Source file.
        from: PathBuf,
        /// Destination file.
        to: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// The registry backend cannot write values of this type.
    #[error("registry data type {0} is not supported")]
    UnsupportedDataType(String),
}
