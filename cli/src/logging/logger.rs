//! Production [`Log`] backed by `tracing`, with a task summary.
use std::path::PathBuf;
use std::sync::Mutex;

use super::types::{Channel, Log, Summary, TaskEntry, TaskStatus};
use super::utils::log_file_path;

/// Emits every message as a `tracing` event and remembers task results for
/// [`print_summary`](Self::print_summary).
///
/// Where events end up is decided by the subscriber installed with
/// [`init_subscriber`](super::init_subscriber).
#[derive(Debug)]
pub struct Logger {
    tasks: Mutex<Vec<TaskEntry>>,
    log_file: Option<PathBuf>,
}

impl Logger {
    /// Create a logger for `command`.
    ///
    /// Only the log file path is computed here, for the summary footer.
    #[must_use]
    pub fn new(command: &str) -> Self {
        Self {
            tasks: Mutex::new(Vec::new()),
            log_file: log_file_path(command),
        }
    }

    /// Log file announced in the summary.
    #[must_use]
    pub const fn log_path(&self) -> Option<&PathBuf> {
        self.log_file.as_ref()
    }

    /// Recorded task results, in order.
    #[must_use]
    pub fn task_entries(&self) -> Vec<TaskEntry> {
        self.tasks.lock().map_or_else(|_| vec![], |g| g.clone())
    }

    fn emit(channel: Channel, msg: &str) {
        match channel {
            Channel::Stage => tracing::info!(target: Channel::STAGE_TARGET, "{msg}"),
            Channel::Info => tracing::info!("{msg}"),
            Channel::AlreadyOk => tracing::info!(target: Channel::OK_TARGET, "{msg}"),
            Channel::Debug => tracing::debug!("{msg}"),
            Channel::Warn => tracing::warn!("{msg}"),
            Channel::Error => tracing::error!("{msg}"),
            Channel::DryRun => tracing::info!(target: Channel::DRY_RUN_TARGET, "{msg}"),
        }
    }

    /// Print one line per recorded task, then the totals and the log file.
    ///
    /// Prints nothing when no task was recorded.
    pub fn print_summary(&self) {
        let tasks = self.task_entries();
        if tasks.is_empty() {
            return;
        }

        println!();
        self.stage("Summary");
        for task in &tasks {
            let (icon, color) = task.status.icon();
            let suffix = task
                .message
                .as_ref()
                .map_or_else(String::new, |msg| format!(" ({msg})"));
            self.info(&format!("{color}{icon} {}{suffix}\x1b[0m", task.name));
        }

        println!();
        self.info(&Summary::of(&tasks).to_string());
        if let Some(path) = &self.log_file {
            self.info(&format!("\x1b[2mlog: {}\x1b[0m", path.display()));
        }
    }
}

impl Log for Logger {
    fn stage(&self, msg: &str) {
        Self::emit(Channel::Stage, msg);
    }

    fn info(&self, msg: &str) {
        Self::emit(Channel::Info, msg);
    }

    fn already_ok(&self, msg: &str) {
        Self::emit(Channel::AlreadyOk, msg);
    }

    fn debug(&self, msg: &str) {
        Self::emit(Channel::Debug, msg);
    }

    fn warn(&self, msg: &str) {
        Self::emit(Channel::Warn, msg);
    }

    fn error(&self, msg: &str) {
        Self::emit(Channel::Error, msg);
    }

    fn dry_run(&self, msg: &str) {
        Self::emit(Channel::DryRun, msg);
    }

    fn record_task(&self, name: &str, status: TaskStatus, message: Option<&str>) {
        if let Ok(mut guard) = self.tasks.lock() {
            guard.push(TaskEntry {
                name: name.to_string(),
                status,
                message: message.map(String::from),
            });
        }
    }
}
