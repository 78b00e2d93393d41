//! The `windows` directive handler.
//!
//! A run is linear: platform gate, schema validation, then every task in
//! order. Gate and validation failures stop the directive before anything is
//! touched; task failures are recorded and the remaining tasks still run.
use std::path::PathBuf;

use serde::Serialize;
use toml::Value;

use crate::config::{DIRECTIVE, WindowsConfig};
use crate::error::{ConfigError, Error, PlatformError};
use crate::logging::Log;
use crate::tasks::{self, Context, System, TaskOutcome};

/// Per-run options supplied by the host.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Directory relative config paths are resolved against.
    pub base_dir: PathBuf,
    /// Log intended changes without applying them.
    pub dry_run: bool,
}

/// Outcome of every task for one directive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Report {
    /// Task outcomes in execution order.
    pub outcomes: Vec<TaskOutcome>,
}

impl Report {
    /// Whether every task succeeded (vacuously true).
    #[must_use]
    pub fn success(&self) -> bool {
        self.outcomes.iter().all(|o| o.ok)
    }

    /// Outcomes that failed.
    pub fn failures(&self) -> impl Iterator<Item = &TaskOutcome> {
        self.outcomes.iter().filter(|o| !o.ok)
    }
}

/// Reconciles a Windows host with a `windows` directive.
pub struct WindowsPlugin<'a> {
    system: &'a System,
    log: &'a dyn Log,
    options: RunOptions,
}

impl std::fmt::Debug for WindowsPlugin<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WindowsPlugin")
            .field("system", self.system)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl<'a> WindowsPlugin<'a> {
    /// Create a plugin acting on `system`.
    #[must_use]
    pub const fn new(system: &'a System, log: &'a dyn Log, options: RunOptions) -> Self {
        Self {
            system,
            log,
            options,
        }
    }

    /// Whether this plugin handles `directive`.
    #[must_use]
    pub fn can_handle(&self, directive: &str) -> bool {
        if directive == DIRECTIVE {
            return true;
        }
        self.log.debug(&format!(
            "The Windows plugin does not support '{directive}' directives"
        ));
        false
    }

    /// Handle a directive, returning whether it was fully applied.
    ///
    /// Detail is reported through the logger only.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnsupportedDirective`] if
    /// [`can_handle`](Self::can_handle) rejects `directive`.
    pub fn handle(&self, directive: &str, data: &Value) -> Result<bool, ConfigError> {
        if !self.can_handle(directive) {
            return Err(ConfigError::UnsupportedDirective(directive.to_string()));
        }
        Ok(self.reconcile(data).is_ok_and(|report| report.success()))
    }

    /// Gate, validate, and run every task against `data`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Platform`] if the host cannot run the plugin and
    /// [`Error::Config`] if `data` does not match the schema. Nothing is
    /// changed in either case. Task failures are reported in the
    /// [`Report`], not as errors.
    pub fn reconcile(&self, data: &Value) -> Result<Report, Error> {
        self.check_platform()?;

        let config = WindowsConfig::from_tree(data).inspect_err(|e| {
            self.log.error(&e.to_string());
        })?;
        self.log.debug(&format!("{config:?}"));

        let ctx = Context {
            config: &config,
            system: self.system,
            log: self.log,
            base_dir: &self.options.base_dir,
            dry_run: self.options.dry_run,
        };
        let outcomes = tasks::all_tasks()
            .iter()
            .map(|task| tasks::execute(task.as_ref(), &ctx))
            .collect();
        Ok(Report { outcomes })
    }

    fn check_platform(&self) -> Result<(), PlatformError> {
        if !self.system.platform.is_windows() {
            let err = PlatformError::Unsupported {
                platform: self.system.platform.os.to_string(),
            };
            self.log.warn(&err.to_string());
            return Err(err);
        }
        let reg_exe = &self.system.paths.reg_exe;
        if !reg_exe.is_file() {
            let err = PlatformError::MissingExecutable {
                path: reg_exe.clone(),
            };
            self.log.error(&err.to_string());
            return Err(err);
        }
        Ok(())
    }
}
