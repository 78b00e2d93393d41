use anyhow::Result;

use super::{Context, Task, TaskResult, TaskStats};
use crate::resources::Applicable;
use crate::resources::registry_file::{RegistryImportResource, discover};

/// Import every `.reg` file under the configured directory.
#[derive(Debug)]
pub struct ImportRegistryFiles;

impl Task for ImportRegistryFiles {
    fn name(&self) -> &'static str {
        "Import registry files"
    }

    fn should_run(&self, ctx: &Context<'_>) -> bool {
        ctx.config.registry_import.is_some()
    }

    fn run(&self, ctx: &Context<'_>) -> Result<TaskResult> {
        let Some(raw) = ctx.config.registry_import.as_deref() else {
            return Ok(TaskResult::Skipped("no import directory configured".to_string()));
        };
        let root = ctx.resolve_path(raw);
        if !root.is_dir() {
            ctx.log.warn(&format!(
                "The registry import directory '{}' does not exist",
                root.display()
            ));
            return Ok(TaskResult::Skipped(format!(
                "{} does not exist",
                root.display()
            )));
        }

        let files = discover(&root, ctx.log)?;
        if files.is_empty() {
            return Ok(TaskResult::Skipped(format!(
                "no registry files found in {}",
                root.display()
            )));
        }
        ctx.log
            .debug(&format!("found {} registry file(s)", files.len()));

        let mut stats = TaskStats::new();
        for path in files {
            let resource = RegistryImportResource::new(
                path,
                &ctx.system.paths.reg_exe,
                ctx.system.executor.as_ref(),
            );
            let desc = resource.description();

            if ctx.dry_run {
                ctx.log.dry_run(&format!("would import '{desc}'"));
                stats.changed += 1;
                continue;
            }

            match resource.apply() {
                Ok(()) => {
                    ctx.log
                        .info(&format!("Imported '{desc}' into the registry"));
                    stats.changed += 1;
                }
                Err(e) => {
                    ctx.log.error(&format!(
                        "Unable to import '{desc}' into the registry \
                         (are elevated permissions required?)"
                    ));
                    ctx.log.debug(&format!("{e:#}"));
                    stats.failed += 1;
                }
            }
        }

        stats.finish(ctx)
    }
}
