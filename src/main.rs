//! # Command Line Interface
//! 
//! The subcommands are in the `commands` module.

use env_logger;
#[cfg(windows)]
use colored;
use patasm::commands;
use patasm::commands::CommandError;

mod cli;

fn main() -> Result<(),Box<dyn std::error::Error>>
{
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    #[cfg(windows)]
    if let Err(e) = colored::control::set_virtual_terminal(true) {
        log::debug!("virtual terminal not available: {:?}",e);
    }
    let main_cmd = cli::build_cli();
    let matches = main_cmd.clone().get_matches();

    if let Some(cmd) = matches.subcommand_matches("completions") {
        return commands::completions::generate(main_cmd,cmd);
    }

    if let Some(cmd) = matches.subcommand_matches("asm") {
        return commands::asm::run(cmd);
    }

    if let Some(cmd) = matches.subcommand_matches("repl") {
        return commands::repl::run(cmd);
    }

    log::error!("No subcommand was found, try `patasm --help`");
    return Err(Box::new(CommandError::InvalidCommand));
}
