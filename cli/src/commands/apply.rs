//! Command: reconcile the host with every directive the plugin handles.
use anyhow::Result;
use serde::Serialize;

use crate::cli::{ApplyOpts, GlobalOpts};
use crate::config::toml_loader::load_directives;
use crate::logging::{Log, Logger};
use crate::plugin::{RunOptions, WindowsPlugin};
use crate::tasks::{System, TaskOutcome};

/// Result of one directive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DirectiveOutcome {
    /// Directive name.
    pub directive: String,
    /// Whether every task succeeded.
    pub success: bool,
    /// Why the directive was rejected before any task ran.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Task outcomes in execution order.
    pub tasks: Vec<TaskOutcome>,
}

/// Hand each directive in `table` the plugin accepts to it.
///
/// Directives the plugin does not handle are ignored.
#[must_use]
pub fn apply_directives(table: &toml::Table, plugin: &WindowsPlugin<'_>) -> Vec<DirectiveOutcome> {
    table
        .iter()
        .filter(|(directive, _)| plugin.can_handle(directive))
        .map(|(directive, data)| match plugin.reconcile(data) {
            Ok(report) => DirectiveOutcome {
                directive: directive.clone(),
                success: report.success(),
                error: None,
                tasks: report.outcomes,
            },
            Err(e) => DirectiveOutcome {
                directive: directive.clone(),
                success: false,
                error: Some(e.to_string()),
                tasks: Vec::new(),
            },
        })
        .collect()
}

/// Run the apply command.
///
/// # Errors
///
/// Returns an error if the config file cannot be loaded or any directive
/// failed.
pub fn run(global: &GlobalOpts, opts: &ApplyOpts, log: &Logger) -> Result<()> {
    log.info(&format!("dotfiles-windows {}", super::version()));

    log.stage("Loading configuration");
    let table = load_directives(&opts.file)?;
    log.info(&format!(
        "loaded {} directive(s) from {}",
        table.len(),
        opts.file.display()
    ));

    let system = System::native();
    let plugin = WindowsPlugin::new(
        &system,
        log,
        RunOptions {
            base_dir: super::base_dir(global, &opts.file),
            dry_run: global.dry_run,
        },
    );
    let outcomes = apply_directives(&table, &plugin);

    log.print_summary();
    if opts.json {
        println!("{}", serde_json::to_string_pretty(&outcomes)?);
    }

    if outcomes.is_empty() {
        log.warn(&format!(
            "{} has no directive this plugin handles",
            opts.file.display()
        ));
    }
    let failed = outcomes.iter().filter(|o| !o.success).count();
    if failed > 0 {
        anyhow::bail!("{failed} directive(s) failed");
    }
    Ok(())
}
