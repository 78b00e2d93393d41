//! Subprocess execution behind an injectable seam.
//!
//! The plugin spawns exactly one external program, `reg.exe`, so the seam
//! only exposes a run that reports the exit status instead of failing on it.
use std::process::{Command, Output};

use anyhow::{Context as _, Result};

/// Captured outcome of a finished process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecResult {
    /// Captured standard output.
    pub stdout: String,
    /// Captured standard error.
    pub stderr: String,
    /// Whether the process exited with status zero.
    pub success: bool,
    /// Exit code, if the process was not terminated by a signal.
    pub code: Option<i32>,
}

impl ExecResult {
    /// Text explaining a failure: trimmed stderr, falling back to stdout.
    ///
    /// `reg.exe` reports some errors on stdout only.
    #[must_use]
    pub fn failure_detail(&self) -> &str {
        let stderr = self.stderr.trim();
        if stderr.is_empty() {
            self.stdout.trim()
        } else {
            stderr
        }
    }
}

impl From<Output> for ExecResult {
    fn from(output: Output) -> Self {
        Self {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            success: output.status.success(),
            code: output.status.code(),
        }
    }
}

/// Runs external programs on behalf of resources.
///
/// Tests substitute a recorder so that no real subprocess is spawned.
pub trait Executor: Send + Sync {
    /// Run a program to completion, returning its result even on non-zero exit.
    ///
    /// # Errors
    ///
    /// Returns an error only if the process could not be spawned.
    fn run_unchecked(&self, program: &str, args: &[&str]) -> Result<ExecResult>;
}

/// Executor that spawns real processes, without a console window on Windows.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemExecutor;

impl Executor for SystemExecutor {
    fn run_unchecked(&self, program: &str, args: &[&str]) -> Result<ExecResult> {
        let mut cmd = Command::new(program);
        cmd.args(args);

        #[cfg(windows)]
        {
            use std::os::windows::process::CommandExt;
            const CREATE_NO_WINDOW: u32 = 0x0800_0000;
            cmd.creation_flags(CREATE_NO_WINDOW);
        }

        let output = cmd
            .output()
            .with_context(|| format!("failed to execute: {program}"))?;
        Ok(output.into())
    }
}
