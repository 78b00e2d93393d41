//! Core logging types: output channels, task status, and the [`Log`] trait.
use std::fmt;

use serde::Serialize;

/// Where a message goes and how it is rendered.
///
/// Each channel maps onto a `tracing` level plus a target, so the console
/// formatter and the log file can tell an "already ok" line from a plain
/// info line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    /// Major section header.
    Stage,
    /// Something changed or is about to.
    Info,
    /// State that already matches the directive.
    AlreadyOk,
    /// Detail for `--verbose` and the log file.
    Debug,
    /// Recoverable problem.
    Warn,
    /// Failed item or task.
    Error,
    /// Change that dry-run mode skipped.
    DryRun,
}

impl Channel {
    /// Target used for stage headers.
    pub const STAGE_TARGET: &'static str = "dotfiles_windows::stage";
    /// Target used for already-satisfied state.
    pub const OK_TARGET: &'static str = "dotfiles_windows::ok";
    /// Target used for dry-run lines.
    pub const DRY_RUN_TARGET: &'static str = "dotfiles_windows::dry_run";

    /// Recover the channel of a `tracing` event.
    #[must_use]
    pub fn classify(level: tracing::Level, target: &str) -> Self {
        match level {
            tracing::Level::ERROR => Self::Error,
            tracing::Level::WARN => Self::Warn,
            tracing::Level::INFO => match target {
                Self::STAGE_TARGET => Self::Stage,
                Self::OK_TARGET => Self::AlreadyOk,
                Self::DRY_RUN_TARGET => Self::DryRun,
                _ => Self::Info,
            },
            _ => Self::Debug,
        }
    }

    /// Tag written before the message in the log file.
    #[must_use]
    pub const fn file_tag(self) -> &'static str {
        match self {
            Self::Stage => "==> ",
            Self::Info => "    ",
            Self::AlreadyOk => "    [ok] ",
            Self::Debug => "    [debug] ",
            Self::Warn => "    [warn] ",
            Self::Error => "    [error] ",
            Self::DryRun => "    [dry run] ",
        }
    }
}

/// Task execution result for summary reporting.
#[derive(Debug, Clone)]
pub struct TaskEntry {
    /// Human-readable task name.
    pub name: String,
    /// Final status of the task.
    pub status: TaskStatus,
    /// Optional detail message (e.g., skip reason or error description).
    pub message: Option<String>,
}

/// Status of a completed task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    /// Task completed successfully.
    Ok,
    /// The task's section is absent from the directive.
    NotApplicable,
    /// Task was explicitly skipped (e.g., nothing to import).
    Skipped,
    /// Task ran in dry-run mode; no changes were applied.
    DryRun,
    /// Task encountered an error and could not complete.
    Failed,
}

impl TaskStatus {
    /// Whether this status counts towards overall success.
    #[must_use]
    pub const fn is_ok(self) -> bool {
        !matches!(self, Self::Failed)
    }

    /// Summary icon and its ANSI colour.
    #[must_use]
    pub const fn icon(self) -> (&'static str, &'static str) {
        match self {
            Self::Ok => ("✓", "\x1b[32m"),
            Self::NotApplicable => ("·", "\x1b[2m"),
            Self::Skipped => ("○", "\x1b[33m"),
            Self::DryRun => ("~", "\x1b[37m"),
            Self::Failed => ("✗", "\x1b[31m"),
        }
    }
}

/// Per-status totals over a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    /// Tasks that succeeded.
    pub ok: usize,
    /// Tasks whose section was absent.
    pub not_applicable: usize,
    /// Tasks that had nothing to do.
    pub skipped: usize,
    /// Tasks that only reported changes.
    pub dry_run: usize,
    /// Tasks that failed.
    pub failed: usize,
}

impl Summary {
    /// Tally `entries` by status.
    #[must_use]
    pub fn of(entries: &[TaskEntry]) -> Self {
        entries.iter().fold(Self::default(), |mut sum, entry| {
            match entry.status {
                TaskStatus::Ok => sum.ok += 1,
                TaskStatus::NotApplicable => sum.not_applicable += 1,
                TaskStatus::Skipped => sum.skipped += 1,
                TaskStatus::DryRun => sum.dry_run += 1,
                TaskStatus::Failed => sum.failed += 1,
            }
            sum
        })
    }

    /// Number of tasks counted.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.ok + self.not_applicable + self.skipped + self.dry_run + self.failed
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} tasks: \x1b[32m{} ok\x1b[0m, \x1b[2m{} n/a\x1b[0m, \x1b[33m{} skipped\x1b[0m, \
             \x1b[37m{} dry-run\x1b[0m, \x1b[31m{} failed\x1b[0m",
            self.total(),
            self.ok,
            self.not_applicable,
            self.skipped,
            self.dry_run,
            self.failed
        )
    }
}

/// Abstraction over logging backends.
///
/// Resources and tasks log through this trait so tests can capture output
/// with an in-memory recorder instead of a tracing subscriber.
pub trait Log: Send + Sync {
    /// Log a stage header (major section).
    fn stage(&self, msg: &str);
    /// Log an informational message.
    fn info(&self, msg: &str);
    /// Log low-priority information about state that is already satisfied.
    fn already_ok(&self, msg: &str);
    /// Log a debug message (may be suppressed on console).
    fn debug(&self, msg: &str);
    /// Log a warning message.
    fn warn(&self, msg: &str);
    /// Log an error message.
    fn error(&self, msg: &str);
    /// Log a dry-run action message.
    fn dry_run(&self, msg: &str);
    /// Record a task result for the summary.
    fn record_task(&self, name: &str, status: TaskStatus, message: Option<&str>);
}
