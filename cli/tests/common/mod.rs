// Shared helpers for integration tests.
//
// Provides in-memory fakes for every OS seam and a temp-dir-backed Windows
// host so each integration test can run the whole plugin without touching
// the real registry or spawning `reg.exe`.
//
// Used by all integration test binaries that declare `mod common;`.
#![allow(dead_code)]

use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use dotfiles_windows::exec::{ExecResult, Executor};
use dotfiles_windows::logging::{Log, TaskStatus};
use dotfiles_windows::platform::{Os, Platform};
use dotfiles_windows::plugin::{RunOptions, WindowsPlugin};
use dotfiles_windows::resources::color::{Color, SystemColors};
use dotfiles_windows::resources::registry::{
    HKEY_LOCAL_MACHINE, RegistryBackend, RegistryValue,
};
use dotfiles_windows::tasks::{System, SystemPaths};

type Slot = (u32, String, String);

/// Registry stored in a map that counts successful writes.
#[derive(Debug, Default)]
pub struct FakeRegistry {
    values: Mutex<BTreeMap<Slot, RegistryValue>>,
    denied: Mutex<Vec<Slot>>,
    writes: Mutex<Vec<Slot>>,
}

impl FakeRegistry {
    pub fn seed(&self, hive: u32, key: &str, name: &str, value: RegistryValue) {
        self.values
            .lock()
            .unwrap()
            .insert((hive, key.to_string(), name.to_string()), value);
    }

    pub fn deny(&self, hive: u32, key: &str, name: &str) {
        self.denied
            .lock()
            .unwrap()
            .push((hive, key.to_string(), name.to_string()));
    }

    pub fn get(&self, hive: u32, key: &str, name: &str) -> Option<RegistryValue> {
        self.values
            .lock()
            .unwrap()
            .get(&(hive, key.to_string(), name.to_string()))
            .cloned()
    }

    pub fn write_count(&self) -> usize {
        self.writes.lock().unwrap().len()
    }

    pub fn written_names(&self) -> Vec<String> {
        self.writes
            .lock()
            .unwrap()
            .iter()
            .map(|(_, _, name)| name.clone())
            .collect()
    }
}

impl RegistryBackend for FakeRegistry {
    fn query(&self, hive: u32, key: &str, name: &str) -> io::Result<RegistryValue> {
        self.get(hive, key, name)
            .ok_or_else(|| io::Error::from(io::ErrorKind::NotFound))
    }

    fn write(&self, hive: u32, key: &str, name: &str, value: &RegistryValue) -> io::Result<()> {
        let slot = (hive, key.to_string(), name.to_string());
        if self.denied.lock().unwrap().contains(&slot) {
            return Err(io::Error::from(io::ErrorKind::PermissionDenied));
        }
        self.values.lock().unwrap().insert(slot.clone(), value.clone());
        self.writes.lock().unwrap().push(slot);
        Ok(())
    }
}

/// Records every `reg.exe` call; files whose path ends with an entry of
/// `failing` exit with status 1.
#[derive(Debug, Default)]
pub struct FakeExecutor {
    pub failing: Mutex<Vec<String>>,
    calls: Mutex<Vec<Vec<String>>>,
}

impl FakeExecutor {
    pub fn fail_on(&self, suffix: &str) {
        self.failing.lock().unwrap().push(suffix.to_string());
    }

    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().unwrap().clone()
    }

    /// Last argument of every call.
    pub fn imported(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| c.last().cloned())
            .collect()
    }
}

impl Executor for FakeExecutor {
    fn run_unchecked(&self, program: &str, args: &[&str]) -> anyhow::Result<ExecResult> {
        let mut call = vec![program.to_string()];
        call.extend(args.iter().map(ToString::to_string));
        self.calls.lock().unwrap().push(call);
        let fail = args.last().is_some_and(|last| {
            self.failing
                .lock()
                .unwrap()
                .iter()
                .any(|suffix| last.ends_with(suffix.as_str()))
        });
        Ok(ExecResult {
            stdout: String::new(),
            stderr: String::new(),
            success: !fail,
            code: Some(i32::from(fail)),
        })
    }
}

/// Records every live colour change.
#[derive(Debug, Default)]
pub struct FakeColors {
    calls: Mutex<Vec<Color>>,
}

impl FakeColors {
    pub fn calls(&self) -> Vec<Color> {
        self.calls.lock().unwrap().clone()
    }
}

impl SystemColors for FakeColors {
    fn set_desktop_color(&self, color: Color) {
        self.calls.lock().unwrap().push(color);
    }
}

/// Captures log lines by channel.
#[derive(Debug, Default)]
pub struct CaptureLog {
    pub lines: Mutex<Vec<(&'static str, String)>>,
    pub tasks: Mutex<Vec<(String, TaskStatus)>>,
}

impl CaptureLog {
    fn push(&self, level: &'static str, msg: &str) {
        self.lines.lock().unwrap().push((level, msg.to_string()));
    }

    pub fn lines(&self, level: &str) -> Vec<String> {
        self.lines
            .lock()
            .unwrap()
            .iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, m)| m.clone())
            .collect()
    }

    pub fn contains(&self, level: &str, needle: &str) -> bool {
        self.lines(level).iter().any(|m| m.contains(needle))
    }
}

impl Log for CaptureLog {
    fn stage(&self, msg: &str) {
        self.push("stage", msg);
    }
    fn info(&self, msg: &str) {
        self.push("info", msg);
    }
    fn already_ok(&self, msg: &str) {
        self.push("ok", msg);
    }
    fn debug(&self, msg: &str) {
        self.push("debug", msg);
    }
    fn warn(&self, msg: &str) {
        self.push("warn", msg);
    }
    fn error(&self, msg: &str) {
        self.push("error", msg);
    }
    fn dry_run(&self, msg: &str) {
        self.push("dry-run", msg);
    }
    fn record_task(&self, name: &str, status: TaskStatus, _message: Option<&str>) {
        self.tasks.lock().unwrap().push((name.to_string(), status));
    }
}

/// A Windows 11 host rooted in a temp dir.
///
/// Layout: `reg.exe` (an empty file standing in for the executable),
/// `AppData/Local/Microsoft/Windows/Fonts` (not created), and a `repo/`
/// directory that relative config paths resolve against.
pub struct TestHost {
    pub tmp: tempfile::TempDir,
    pub registry: Arc<FakeRegistry>,
    pub executor: Arc<FakeExecutor>,
    pub colors: Arc<FakeColors>,
    pub log: CaptureLog,
    pub system: System,
}

impl TestHost {
    pub fn new() -> Self {
        let tmp = tempfile::tempdir().expect("create temp dir");
        let reg_exe = tmp.path().join("reg.exe");
        std::fs::write(&reg_exe, b"").expect("write reg.exe");
        std::fs::create_dir(tmp.path().join("repo")).expect("create repo");

        let registry = Arc::new(FakeRegistry::default());
        let key = r"SOFTWARE\Microsoft\Windows NT\CurrentVersion";
        registry.seed(
            HKEY_LOCAL_MACHINE,
            key,
            "CurrentMajorVersionNumber",
            RegistryValue::dword(10),
        );
        registry.seed(
            HKEY_LOCAL_MACHINE,
            key,
            "CurrentBuildNumber",
            RegistryValue::string("22631"),
        );

        let executor = Arc::new(FakeExecutor::default());
        let colors = Arc::new(FakeColors::default());
        let fonts_dir = tmp
            .path()
            .join("AppData")
            .join("Local")
            .join("Microsoft")
            .join("Windows")
            .join("Fonts");
        let system = System {
            platform: Platform::new(Os::Windows),
            registry: registry.clone(),
            executor: executor.clone(),
            colors: colors.clone(),
            paths: SystemPaths {
                reg_exe,
                user_fonts_dir: Some(fonts_dir),
            },
        };

        Self {
            tmp,
            registry,
            executor,
            colors,
            log: CaptureLog::default(),
            system,
        }
    }

    /// Directory relative config paths resolve against.
    pub fn repo(&self) -> PathBuf {
        self.tmp.path().join("repo")
    }

    /// The per-user font directory.
    pub fn fonts_dir(&self) -> PathBuf {
        self.system
            .paths
            .user_fonts_dir
            .clone()
            .expect("fonts dir configured")
    }

    /// Write `content` to `repo/<relative>`, creating parent directories.
    pub fn write(&self, relative: &str, content: &[u8]) -> PathBuf {
        let path = self.repo().join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create parent");
        }
        std::fs::write(&path, content).expect("write file");
        path
    }

    /// Write a font straight into the per-user font directory.
    pub fn install_existing_font(&self, name: &str) {
        let dir = self.fonts_dir();
        std::fs::create_dir_all(&dir).expect("create fonts dir");
        std::fs::write(dir.join(name), b"existing").expect("write font");
    }

    pub fn plugin(&self) -> WindowsPlugin<'_> {
        self.plugin_with(false)
    }

    pub fn plugin_with(&self, dry_run: bool) -> WindowsPlugin<'_> {
        WindowsPlugin::new(
            &self.system,
            &self.log,
            RunOptions {
                base_dir: self.repo(),
                dry_run,
            },
        )
    }
}

/// Parse a TOML snippet into a directive tree.
pub fn tree(src: &str) -> toml::Value {
    toml::from_str(src).expect("valid toml")
}

/// Whether `path` names the same file as `expected`, ignoring symlinked
/// temp-dir prefixes.
pub fn same_file(path: &str, expected: &Path) -> bool {
    dunce::canonicalize(path).ok() == dunce::canonicalize(expected).ok()
}
