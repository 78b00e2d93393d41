//! Named tasks that orchestrate resource changes.
pub mod context;
pub mod fonts;
pub mod personalization;
pub mod registry_import;

pub use context::{Context, System, SystemPaths};

use anyhow::Result;
use serde::Serialize;

use crate::error::TaskError;
use crate::logging::TaskStatus;

/// Result of a single task execution.
///
/// # Examples
///
/// ```
/// use dotfiles_windows::tasks::TaskResult;
///
/// let ok = TaskResult::Ok;
/// let skipped = TaskResult::Skipped("no registry files found".into());
/// let dry = TaskResult::DryRun;
///
/// assert!(matches!(ok, TaskResult::Ok));
/// assert!(matches!(skipped, TaskResult::Skipped(_)));
/// assert!(matches!(dry, TaskResult::DryRun));
/// ```
#[derive(Debug, Clone)]
pub enum TaskResult {
    /// Task completed successfully.
    Ok,
    /// Task had nothing to do.
    Skipped(String),
    /// Task ran in dry-run mode.
    DryRun,
}

/// Counters for batch tasks that process many items.
///
/// Failed items do not stop a batch; they are counted and turned into a
/// task failure by [`TaskStats::finish`].
///
/// # Examples
///
/// ```
/// use dotfiles_windows::tasks::TaskStats;
///
/// let mut stats = TaskStats::new();
/// stats.changed = 3;
/// stats.already_ok = 10;
///
/// assert_eq!(stats.summary(false), "3 changed, 10 already ok");
/// assert_eq!(stats.summary(true), "3 would change, 10 already ok");
///
/// stats.failed = 1;
/// assert_eq!(stats.summary(false), "3 changed, 10 already ok, 1 failed");
/// ```
#[derive(Debug, Default)]
pub struct TaskStats {
    /// Number of items changed or applied.
    pub changed: u32,
    /// Number of items already in the correct state.
    pub already_ok: u32,
    /// Number of items that could not be applied.
    pub failed: u32,
}

impl TaskStats {
    /// Create a new empty stats counter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Format the summary string (e.g. "3 changed, 10 already ok, 1 failed").
    #[must_use]
    pub fn summary(&self, dry_run: bool) -> String {
        let verb = if dry_run { "would change" } else { "changed" };
        if self.failed > 0 {
            format!(
                "{} {verb}, {} already ok, {} failed",
                self.changed, self.already_ok, self.failed
            )
        } else {
            format!("{} {verb}, {} already ok", self.changed, self.already_ok)
        }
    }

    /// Log the summary and return the appropriate `TaskResult`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskError::ItemsFailed`] if any item failed.
    pub fn finish(self, ctx: &Context<'_>) -> Result<TaskResult> {
        ctx.log.info(&self.summary(ctx.dry_run));
        if self.failed > 0 {
            return Err(TaskError::ItemsFailed {
                failed: self.failed,
                total: self.changed + self.already_ok + self.failed,
            }
            .into());
        }
        if ctx.dry_run {
            Ok(TaskResult::DryRun)
        } else {
            Ok(TaskResult::Ok)
        }
    }
}

/// A named, executable task.
pub trait Task: Send + Sync {
    /// Human-readable task name.
    fn name(&self) -> &str;

    /// Whether the directive configures this task at all.
    fn should_run(&self, ctx: &Context<'_>) -> bool;

    /// Execute the task.
    ///
    /// # Errors
    ///
    /// Returns an error if the task could not reach the desired state, either
    /// because a precondition failed or because some items failed.
    fn run(&self, ctx: &Context<'_>) -> Result<TaskResult>;
}

/// Outcome of one task within a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskOutcome {
    /// Task name.
    pub name: String,
    /// Whether the task reached its desired state.
    pub ok: bool,
    /// Final status.
    pub status: TaskStatus,
    /// Skip reason or error description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl TaskOutcome {
    fn new(name: &str, status: TaskStatus, detail: Option<String>) -> Self {
        Self {
            name: name.to_string(),
            ok: status.is_ok(),
            status,
            detail,
        }
    }
}

/// The tasks run for a `windows` directive, in execution order.
#[must_use]
pub fn all_tasks() -> Vec<Box<dyn Task>> {
    vec![
        Box::new(personalization::ConfigurePersonalization),
        Box::new(registry_import::ImportRegistryFiles),
        Box::new(fonts::InstallFonts),
    ]
}

/// Execute a task, recording the result in the logger.
#[must_use]
pub fn execute(task: &dyn Task, ctx: &Context<'_>) -> TaskOutcome {
    let name = task.name();
    if !task.should_run(ctx) {
        ctx.log
            .debug(&format!("skipping task: {name} (not applicable)"));
        ctx.log.record_task(name, TaskStatus::NotApplicable, None);
        return TaskOutcome::new(name, TaskStatus::NotApplicable, None);
    }

    ctx.log.stage(name);

    let (status, detail) = match task.run(ctx) {
        Ok(TaskResult::Ok) => (TaskStatus::Ok, None),
        Ok(TaskResult::Skipped(reason)) => {
            ctx.log.info(&format!("skipped: {reason}"));
            (TaskStatus::Skipped, Some(reason))
        }
        Ok(TaskResult::DryRun) => (TaskStatus::DryRun, None),
        Err(e) => {
            ctx.log.error(&format!("{name}: {e:#}"));
            (TaskStatus::Failed, Some(format!("{e:#}")))
        }
    };
    ctx.log.record_task(name, status, detail.as_deref());
    TaskOutcome::new(name, status, detail)
}

/// Shared helpers for task unit tests.
#[cfg(test)]
pub(crate) mod test_helpers {
    use std::path::{Path, PathBuf};
    use std::sync::{Arc, Mutex};

    use crate::exec::{ExecResult, Executor};
    use crate::platform::{Os, Platform};
    use crate::resources::color::{Color, SystemColors};
    use crate::resources::registry::test_helpers::MemoryRegistry;
    use crate::resources::registry::{HKEY_LOCAL_MACHINE, RegistryValue};

    use super::{System, SystemPaths};

    const VERSION_KEY: &str = r"SOFTWARE\Microsoft\Windows NT\CurrentVersion";

    /// Executor that records calls and fails any whose last argument ends
    /// with one of `failing`.
    #[derive(Debug, Default)]
    pub struct RecordingExecutor {
        pub failing: Vec<String>,
        calls: Mutex<Vec<Vec<String>>>,
    }

    impl RecordingExecutor {
        /// Fail every import whose path ends with one of `suffixes`.
        pub fn failing_on(suffixes: &[&str]) -> Self {
            Self {
                failing: suffixes.iter().map(ToString::to_string).collect(),
                calls: Mutex::default(),
            }
        }

        pub fn calls(&self) -> Vec<Vec<String>> {
            self.calls.lock().map_or_else(|_| vec![], |g| g.clone())
        }
    }

    impl Executor for RecordingExecutor {
        fn run_unchecked(&self, program: &str, args: &[&str]) -> anyhow::Result<ExecResult> {
            let mut call = vec![program.to_string()];
            call.extend(args.iter().map(ToString::to_string));
            let fail = args
                .last()
                .is_some_and(|last| self.failing.iter().any(|f| last.ends_with(f.as_str())));
            if let Ok(mut calls) = self.calls.lock() {
                calls.push(call);
            }
            Ok(ExecResult {
                stdout: String::new(),
                stderr: if fail { "ERROR: Access is denied.".into() } else { String::new() },
                success: !fail,
                code: Some(i32::from(fail)),
            })
        }
    }

    /// Records every live colour change.
    #[derive(Debug, Default)]
    pub struct RecordingColors {
        calls: Mutex<Vec<Color>>,
    }

    impl RecordingColors {
        pub fn calls(&self) -> Vec<Color> {
            self.calls.lock().map_or_else(|_| vec![], |g| g.clone())
        }
    }

    impl SystemColors for RecordingColors {
        fn set_desktop_color(&self, color: Color) {
            if let Ok(mut calls) = self.calls.lock() {
                calls.push(color);
            }
        }
    }

    /// Seed `registry` with a Windows version.
    pub fn with_version(registry: MemoryRegistry, major: u32, build: u32) -> MemoryRegistry {
        registry
            .with(
                HKEY_LOCAL_MACHINE,
                VERSION_KEY,
                "CurrentMajorVersionNumber",
                RegistryValue::dword(major),
            )
            .with(
                HKEY_LOCAL_MACHINE,
                VERSION_KEY,
                "CurrentBuildNumber",
                RegistryValue::string(build.to_string()),
            )
    }

    /// Fakes behind a [`System`], kept so tests can inspect them.
    #[derive(Debug)]
    pub struct FakeSystem {
        pub registry: Arc<MemoryRegistry>,
        pub executor: Arc<RecordingExecutor>,
        pub colors: Arc<RecordingColors>,
        pub system: System,
    }

    impl FakeSystem {
        /// A Windows host on a recent build with the given fonts directory.
        pub fn new(registry: MemoryRegistry, fonts_dir: Option<&Path>) -> Self {
            Self::build(registry, RecordingExecutor::default(), fonts_dir)
        }

        pub fn build(
            registry: MemoryRegistry,
            executor: RecordingExecutor,
            fonts_dir: Option<&Path>,
        ) -> Self {
            let registry = Arc::new(registry);
            let executor = Arc::new(executor);
            let colors = Arc::new(RecordingColors::default());
            let system = System {
                platform: Platform::new(Os::Windows),
                registry: registry.clone(),
                executor: executor.clone(),
                colors: colors.clone(),
                paths: SystemPaths {
                    reg_exe: PathBuf::from("reg.exe"),
                    user_fonts_dir: fonts_dir.map(Path::to_path_buf),
                },
            };
            Self {
                registry,
                executor,
                colors,
                system,
            }
        }
    }
}
