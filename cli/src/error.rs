//! Domain-specific error types for the Windows plugin.
//!
//! Library code returns typed errors built with [`thiserror`]; task and
//! command boundaries convert them to [`anyhow::Error`] via `?`.
//!
//! # Error hierarchy
//!
//! ```text
//! Error
//! ├── Config(ConfigError)     : directive shape, config file I/O and syntax
//! └── Platform(PlatformError) : wrong OS, missing reg.exe, unknown version
//! ```
//!
//! Only config and platform errors stop a directive, before any mutation.
//! [`TaskError`], [`ColorError`](crate::resources::color::ColorError) and
//! [`ResourceError`](crate::resources::error::ResourceError) are local to a
//! single task and reach the summary as `anyhow::Error`.

use std::path::PathBuf;

use thiserror::Error;

use crate::config::validation::Kind;
use crate::platform::WindowsVersion;

/// Top-level error type for the Windows plugin.
#[derive(Error, Debug)]
pub enum Error {
    /// The directive or its config file is malformed.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The host cannot run the plugin at all.
    #[error("Platform error: {0}")]
    Platform(#[from] PlatformError),
}

/// Errors that arise from configuration loading and shape validation.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A value declared as a nested section is not a table.
    #[error("Config value '{path}' must be a table")]
    NotATable {
        /// Dotted path of the offending value.
        path: String,
    },

    /// A table contains keys the schema does not declare.
    #[error("Config value '{path}' contains unexpected keys: {}", .keys.join(", "))]
    UnexpectedKeys {
        /// Dotted path of the table.
        path: String,
        /// The undeclared keys, sorted.
        keys: Vec<String>,
    },

    /// A primitive value has the wrong type.
    #[error("Config value '{path}' must be a {expected}")]
    WrongType {
        /// Dotted path of the offending value.
        path: String,
        /// The type the schema declares.
        expected: Kind,
    },

    /// The plugin was asked to handle a directive it does not own.
    #[error("The Windows plugin does not support '{0}' directives")]
    UnsupportedDirective(String),

    /// The config file could not be read.
    #[error("IO error reading config file {}: {source}", .path.display())]
    Io {
        /// Path to the file that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The config file is not valid TOML.
    #[error("Invalid TOML in {}: {message}", .path.display())]
    Parse {
        /// Path to the file that failed to parse.
        path: PathBuf,
        /// Parser diagnostic.
        message: String,
    },
}

/// Errors that prevent the plugin from running on this host.
#[derive(Error, Debug)]
pub enum PlatformError {
    /// The host OS is not Windows.
    #[error("The Windows plugin cannot run on '{platform}' platforms")]
    Unsupported {
        /// Name of the detected platform.
        platform: String,
    },

    /// The registry import executable is not where it should be.
    #[error("The Windows plugin must be able to access '{}'", .path.display())]
    MissingExecutable {
        /// Expected location of the executable.
        path: PathBuf,
    },

    /// The Windows version could not be read from the registry.
    #[error("Unable to determine the Windows version: {0}")]
    VersionUnavailable(String),
}

/// Errors local to a single task.
#[derive(Error, Debug)]
pub enum TaskError {
    /// The host Windows build is too old for the requested feature.
    #[error("Fonts can only be configured on {required} and higher (found {found})")]
    Capability {
        /// Version detected on the host.
        found: WindowsVersion,
        /// Minimum version that supports the feature.
        required: WindowsVersion,
    },

    /// A configured source directory does not exist.
    #[error("'{}' is not a directory that exists", .path.display())]
    NotADirectory {
        /// The resolved path.
        path: PathBuf,
    },

    /// A path exists but has the wrong type; the user must fix it by hand.
    #[error("'{}' {reason}", .path.display())]
    StateConflict {
        /// The conflicting path.
        path: PathBuf,
        /// What is wrong with it.
        reason: String,
    },

    /// A required environment variable is not set.
    #[error("environment variable '{0}' is not set")]
    MissingEnvironment(String),

    /// Some items of a batch failed; the rest were applied.
    #[error("{failed} of {total} item(s) failed")]
    ItemsFailed {
        /// Number of failed items.
        failed: u32,
        /// Number of items processed.
        total: u32,
    },
}
