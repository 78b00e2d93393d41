use anyhow::{Context as _, Result};

use super::{Context, Task, TaskResult, TaskStats};
use crate::error::TaskError;
use crate::platform::WindowsVersion;
use crate::resources::font::{FontSet, copy_font, register_font};

/// Install fonts for the current user.
///
/// Fonts missing from the per-user font directory are copied there and
/// registered under `HKCU`. Fonts already present (matched by file name) are
/// left alone; fonts only present in the destination are ignored.
#[derive(Debug)]
pub struct InstallFonts;

impl Task for InstallFonts {
    fn name(&self) -> &'static str {
        "Install fonts"
    }

    fn should_run(&self, ctx: &Context<'_>) -> bool {
        ctx.config.fonts_path.is_some()
    }

    fn run(&self, ctx: &Context<'_>) -> Result<TaskResult> {
        let Some(raw) = ctx.config.fonts_path.as_deref() else {
            return Ok(TaskResult::Skipped("no font path configured".to_string()));
        };

        let registry = ctx.registry();
        let version = WindowsVersion::detect(&registry)?;
        ctx.log.debug(&format!("detected {version}"));
        if !version.supports_user_fonts() {
            return Err(TaskError::Capability {
                found: version,
                required: WindowsVersion::USER_FONTS,
            }
            .into());
        }

        let source = ctx.resolve_path(raw);
        if !source.is_dir() {
            return Err(TaskError::NotADirectory { path: source }.into());
        }

        let dest = ctx
            .system
            .paths
            .user_fonts_dir
            .clone()
            .ok_or_else(|| TaskError::MissingEnvironment("LOCALAPPDATA".to_string()))?;
        if dest.is_file() {
            return Err(TaskError::StateConflict {
                path: dest,
                reason: "is a file, not the user font directory".to_string(),
            }
            .into());
        }
        if !dest.exists() {
            if ctx.dry_run {
                ctx.log
                    .dry_run(&format!("would create {}", dest.display()));
            } else {
                std::fs::create_dir_all(&dest)
                    .with_context(|| format!("creating {}", dest.display()))?;
                ctx.log.debug(&format!("created {}", dest.display()));
            }
        }

        let wanted = FontSet::scan(&source, ctx.log)?;
        let installed = if dest.is_dir() {
            FontSet::scan(&dest, ctx.log)?
        } else {
            FontSet::default()
        };
        ctx.log.debug(&format!(
            "{} font(s) in source, {} in {}",
            wanted.len(),
            installed.len(),
            dest.display()
        ));

        let mut stats = TaskStats::new();
        for name in wanted.already_installed(&installed) {
            ctx.log.already_ok(&format!(
                "Font '{}' is already installed",
                name.to_string_lossy()
            ));
            stats.already_ok += 1;
        }

        let mut copied = Vec::new();
        for (name, path) in wanted.missing_from(&installed) {
            let display = name.to_string_lossy();
            if ctx.dry_run {
                ctx.log.dry_run(&format!("would install font '{display}'"));
                stats.changed += 1;
                continue;
            }
            match copy_font(path, name, &dest) {
                Ok(installed_path) => copied.push(installed_path),
                Err(e) => {
                    ctx.log.error(&format!(
                        "Unable to copy '{display}' to the Windows font directory"
                    ));
                    ctx.log.debug(&e.to_string());
                    stats.failed += 1;
                }
            }
        }

        for font in &copied {
            let display = font
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            match register_font(&registry, font) {
                Ok(()) => {
                    ctx.log.info(&format!("Installed font '{display}'"));
                    stats.changed += 1;
                }
                Err(e) => {
                    ctx.log.error(&format!(
                        "Unable to install '{display}' to the Windows registry"
                    ));
                    ctx.log.debug(&e.to_string());
                    stats.failed += 1;
                }
            }
        }

        stats.finish(ctx)
    }
}
