use anyhow::Result;

use super::{Context, Task, TaskResult};
use crate::resources::background::BackgroundColorResource;
use crate::resources::color::Color;
use crate::resources::{Applicable, Resource, ResourceState};

/// Set the desktop background colour.
#[derive(Debug)]
pub struct ConfigurePersonalization;

impl Task for ConfigurePersonalization {
    fn name(&self) -> &'static str {
        "Configure personalization"
    }

    fn should_run(&self, ctx: &Context<'_>) -> bool {
        ctx.config.background_color.is_some()
    }

    fn run(&self, ctx: &Context<'_>) -> Result<TaskResult> {
        let Some(spec) = ctx.config.background_color.as_deref() else {
            return Ok(TaskResult::Skipped("no background color configured".to_string()));
        };
        let color: Color = spec.parse()?;
        let resource =
            BackgroundColorResource::new(color, ctx.registry(), ctx.system.colors.as_ref());

        match resource.current_state()? {
            ResourceState::Correct => {
                ctx.log
                    .already_ok(&format!("The background color is already set to {spec}"));
                return Ok(TaskResult::Ok);
            }
            ResourceState::Incorrect { current } if ctx.dry_run => {
                ctx.log.dry_run(&format!(
                    "would set the background color to {spec} (currently {current})"
                ));
                return Ok(TaskResult::DryRun);
            }
            _ if ctx.dry_run => {
                ctx.log
                    .dry_run(&format!("would set the background color to {spec}"));
                return Ok(TaskResult::DryRun);
            }
            _ => {}
        }

        ctx.log
            .info(&format!("Setting the background color to {spec}"));
        resource.apply()?;
        ctx.log.debug(&format!("applied {}", resource.description()));
        Ok(TaskResult::Ok)
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::config::WindowsConfig;
    use crate::logging::test_helpers::{Level, RecordingLog};
    use crate::resources::registry::test_helpers::MemoryRegistry;
    use crate::resources::registry::{HKEY_CURRENT_USER, RegistryValue};
    use crate::tasks::test_helpers::FakeSystem;
    use std::path::Path;

    const KEY: &str = r"Control Panel\Colors";

    fn config(spec: &str) -> WindowsConfig {
        WindowsConfig {
            background_color: Some(spec.to_string()),
            ..WindowsConfig::default()
        }
    }

    fn run(fake: &FakeSystem, config: &WindowsConfig, dry_run: bool) -> (Result<TaskResult>, RecordingLog) {
        let log = RecordingLog::default();
        let ctx = Context {
            config,
            system: &fake.system,
            log: &log,
            base_dir: Path::new("."),
            dry_run,
        };
        let result = ConfigurePersonalization.run(&ctx);
        (result, log)
    }

    #[test]
    fn not_applicable_without_color() {
        let fake = FakeSystem::new(MemoryRegistry::new(), None);
        let config = WindowsConfig::default();
        let log = RecordingLog::default();
        let ctx = Context {
            config: &config,
            system: &fake.system,
            log: &log,
            base_dir: Path::new("."),
            dry_run: false,
        };
        assert!(!ConfigurePersonalization.should_run(&ctx));
    }

    #[test]
    fn sets_color_when_missing() {
        let fake = FakeSystem::new(MemoryRegistry::new(), None);
        let (result, log) = run(&fake, &config("#0099ff"), false);
        assert!(matches!(result.unwrap(), TaskResult::Ok));
        assert_eq!(
            fake.registry.value(HKEY_CURRENT_USER, KEY, "Background"),
            Some(RegistryValue::string("0 153 255"))
        );
        assert_eq!(fake.colors.calls(), vec![Color::new(0, 153, 255)]);
        assert!(log.contains(Level::Info, "Setting the background color to #0099ff"));
    }

    #[test]
    fn second_run_is_a_no_op() {
        let fake = FakeSystem::new(MemoryRegistry::new(), None);
        let cfg = config("0 153 255");
        run(&fake, &cfg, false).0.unwrap();
        let (result, log) = run(&fake, &cfg, false);
        assert!(matches!(result.unwrap(), TaskResult::Ok));
        assert_eq!(fake.registry.write_count(), 1);
        assert_eq!(fake.colors.calls().len(), 1);
        assert!(log.contains(Level::AlreadyOk, "already set to 0 153 255"));
    }

    #[test]
    fn hex_and_decimal_forms_are_equivalent() {
        let fake = FakeSystem::new(MemoryRegistry::new(), None);
        run(&fake, &config("#0099FF"), false).0.unwrap();
        let (_, log) = run(&fake, &config("0 153 255"), false);
        assert_eq!(fake.registry.write_count(), 1);
        assert!(log.contains(Level::AlreadyOk, "already set"));
    }

    #[test]
    fn wrong_data_type_is_rewritten() {
        let registry = MemoryRegistry::new().with(
            HKEY_CURRENT_USER,
            KEY,
            "Background",
            RegistryValue {
                data: "0 153 255".to_string(),
                data_type: crate::resources::registry::REG_EXPAND_SZ,
            },
        );
        let fake = FakeSystem::new(registry, None);
        run(&fake, &config("0 153 255"), false).0.unwrap();
        assert_eq!(fake.registry.write_count(), 1);
    }

    #[test]
    fn malformed_color_fails_without_writing() {
        let fake = FakeSystem::new(MemoryRegistry::new(), None);
        let (result, _) = run(&fake, &config("#12345"), false);
        let err = result.unwrap_err();
        assert!(err.to_string().contains("'#12345' did not parse as a hex RGB value"));
        assert_eq!(fake.registry.write_count(), 0);
        assert!(fake.colors.calls().is_empty());
    }

    #[test]
    fn out_of_range_color_fails() {
        let fake = FakeSystem::new(MemoryRegistry::new(), None);
        let (result, _) = run(&fake, &config("256 0 0"), false);
        assert!(result.is_err());
        assert_eq!(fake.registry.write_count(), 0);
    }

    #[test]
    fn dry_run_reports_without_writing() {
        let registry = MemoryRegistry::new().with(
            HKEY_CURRENT_USER,
            KEY,
            "Background",
            RegistryValue::string("255 255 255"),
        );
        let fake = FakeSystem::new(registry, None);
        let (result, log) = run(&fake, &config("0 0 0"), true);
        assert!(matches!(result.unwrap(), TaskResult::DryRun));
        assert_eq!(fake.registry.write_count(), 0);
        assert!(fake.colors.calls().is_empty());
        assert!(log.contains(Level::DryRun, "(currently 255 255 255)"));
    }

    #[test]
    fn write_failure_still_changes_live_color() {
        let registry = MemoryRegistry::new().deny_write(HKEY_CURRENT_USER, KEY, "Background");
        let fake = FakeSystem::new(registry, None);
        let (result, _) = run(&fake, &config("1 2 3"), false);
        assert!(result.is_err());
        assert_eq!(fake.colors.calls(), vec![Color::new(1, 2, 3)]);
    }
}
