use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::WindowsConfig;
use crate::config::paths;
use crate::exec::{Executor, SystemExecutor};
use crate::logging::Log;
use crate::platform::Platform;
use crate::resources::color::{NativeSystemColors, SystemColors};
use crate::resources::registry::{NativeRegistry, RegistryAccessor, RegistryBackend};
use crate::resources::registry_file::REG_EXE;

/// Fixed locations on the host.
#[derive(Debug, Clone)]
pub struct SystemPaths {
    /// Registry editor used for `.reg` imports.
    pub reg_exe: PathBuf,
    /// Per-user font directory, if `LOCALAPPDATA` is set.
    pub user_fonts_dir: Option<PathBuf>,
}

impl SystemPaths {
    /// Locations on a real Windows host.
    #[must_use]
    pub fn native() -> Self {
        Self {
            reg_exe: PathBuf::from(REG_EXE),
            user_fonts_dir: std::env::var_os("LOCALAPPDATA").map(|root| {
                PathBuf::from(root)
                    .join("Microsoft")
                    .join("Windows")
                    .join("Fonts")
            }),
        }
    }
}

/// The OS services tasks act on.
///
/// Every seam is a trait object so tests can run the whole plugin against
/// in-memory fakes.
pub struct System {
    /// Detected platform information.
    pub platform: Platform,
    /// Registry backend.
    pub registry: Arc<dyn RegistryBackend>,
    /// Command executor (for testing or real system calls).
    pub executor: Arc<dyn Executor>,
    /// Live system colour setter.
    pub colors: Arc<dyn SystemColors>,
    /// Fixed host locations.
    pub paths: SystemPaths,
}

impl std::fmt::Debug for System {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("System")
            .field("platform", &self.platform)
            .field("registry", &"<dyn RegistryBackend>")
            .field("executor", &"<dyn Executor>")
            .field("colors", &"<dyn SystemColors>")
            .field("paths", &self.paths)
            .finish()
    }
}

impl System {
    /// The real host: native registry, subprocesses and `SetSysColors`.
    #[must_use]
    pub fn native() -> Self {
        Self {
            platform: Platform::detect(),
            registry: Arc::new(NativeRegistry),
            executor: Arc::new(SystemExecutor),
            colors: Arc::new(NativeSystemColors),
            paths: SystemPaths::native(),
        }
    }
}

/// Shared context for task execution.
pub struct Context<'a> {
    /// The validated directive.
    pub config: &'a WindowsConfig,
    /// OS services.
    pub system: &'a System,
    /// Logger for output and task recording.
    pub log: &'a dyn Log,
    /// Directory relative config paths are resolved against.
    pub base_dir: &'a Path,
    /// Whether to perform a dry run (preview changes without applying).
    pub dry_run: bool,
}

impl std::fmt::Debug for Context<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("config", self.config)
            .field("system", self.system)
            .field("log", &"<dyn Log>")
            .field("base_dir", &self.base_dir)
            .field("dry_run", &self.dry_run)
            .finish()
    }
}

impl Context<'_> {
    /// Registry accessor logging through this context's logger.
    #[must_use]
    pub fn registry(&self) -> RegistryAccessor<'_> {
        RegistryAccessor::new(self.system.registry.as_ref(), self.log)
    }

    /// Expand a configured path and anchor it at [`Context::base_dir`].
    #[must_use]
    pub fn resolve_path(&self, raw: &str) -> PathBuf {
        paths::resolve(raw, self.base_dir)
    }
}
