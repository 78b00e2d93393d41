use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Top-level CLI entry point for the Windows plugin.
#[derive(Parser, Debug)]
#[command(
    name = "dotfiles-windows",
    about = "Declarative Windows configuration for the dotfiles engine",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(flatten)]
    pub global: GlobalOpts,
}

/// Options shared across all subcommands.
#[derive(Parser, Debug, Clone)]
pub struct GlobalOpts {
    /// Preview changes without applying
    #[arg(short = 'd', long, global = true)]
    pub dry_run: bool,

    /// Resolve relative config paths against this directory
    #[arg(long, global = true)]
    pub root: Option<PathBuf>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Apply the `windows` directive from a config file
    Apply(ApplyOpts),
    /// Check the `windows` directive without applying it
    Validate(ValidateOpts),
    /// Print version information
    Version,
}

impl Command {
    /// Name used for the log file.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Apply(_) => "windows-apply",
            Self::Validate(_) => "windows-validate",
            Self::Version => "windows-version",
        }
    }
}

/// Options for the `apply` subcommand.
#[derive(Parser, Debug, Clone)]
pub struct ApplyOpts {
    /// TOML config file whose top-level keys are directives
    pub file: PathBuf,

    /// Print a JSON report of every task after the summary
    #[arg(long)]
    pub json: bool,
}

/// Options for the `validate` subcommand.
#[derive(Parser, Debug, Clone)]
pub struct ValidateOpts {
    /// TOML config file whose top-level keys are directives
    pub file: PathBuf,
}
