use anyhow::Result;
use clap::Parser;

use dotfiles_windows::{cli, commands, logging};

fn main() -> Result<()> {
    let _ = enable_ansi_support::enable_ansi_support();
    let args = cli::Cli::parse();

    let command = args.command.name();
    logging::init_subscriber(args.verbose, command);
    let log = logging::Logger::new(command);

    match args.command {
        cli::Command::Apply(opts) => commands::apply::run(&args.global, &opts, &log),
        cli::Command::Validate(opts) => commands::validate::run(&opts, &log),
        cli::Command::Version => {
            commands::version::run();
            Ok(())
        }
    }
}
