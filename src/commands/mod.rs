//! # CLI Subcommands
//! 
//! Contains modules that run the subcommands.

pub mod asm;
pub mod repl;
pub mod completions;

#[derive(thiserror::Error,Debug)]
pub enum CommandError {
    #[error("Command could not be interpreted")]
    InvalidCommand,
    #[error("File not found")]
    FileNotFound,
    #[error("Assembly finished with {0} error(s)")]
    AssemblyFailed(usize)
}

/// Read a whole text file, logging the path on failure
pub fn read_text(path: &str) -> Result<String,CommandError> {
    match std::fs::read_to_string(path) {
        Ok(s) => Ok(s),
        Err(e) => {
            log::error!("could not read {}: {}",path,e);
            Err(CommandError::FileNotFound)
        }
    }
}
