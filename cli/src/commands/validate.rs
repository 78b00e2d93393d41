//! Command: check the shape of a `windows` directive without applying it.
use anyhow::Result;

use crate::cli::ValidateOpts;
use crate::config::toml_loader::load_directives;
use crate::config::{DIRECTIVE, WindowsConfig};
use crate::logging::Log;

/// Run the validate command.
///
/// No platform gate applies, so a config can be checked on any host.
///
/// # Errors
///
/// Returns an error if the file cannot be loaded or the directive is
/// malformed.
pub fn run(opts: &ValidateOpts, log: &dyn Log) -> Result<()> {
    log.stage("Validating configuration");
    let table = load_directives(&opts.file)?;

    let Some(tree) = table.get(DIRECTIVE) else {
        log.warn(&format!(
            "{} has no '{DIRECTIVE}' directive",
            opts.file.display()
        ));
        return Ok(());
    };

    let config = WindowsConfig::from_tree(tree)?;
    log.debug(&format!("{config:?}"));
    log.info(&format!("{} is valid", opts.file.display()));
    Ok(())
}
