//! Batch assembly subcommand

use crate::asm::assembly::Assembler;
use crate::asm::settings::{self,Settings};
use crate::STDRESULT;
use super::{CommandError,read_text};

const RCH: &str = "unreachable was reached";

pub fn run(cmd: &clap::ArgMatches) -> STDRESULT {
    let pattern = cmd.get_one::<String>("pattern").expect(RCH);
    let source = cmd.get_one::<String>("source").expect(RCH);
    let mut config = match cmd.get_one::<String>("config") {
        Some(path) => settings::parse(&read_text(path)?)?,
        None => Settings::new()
    };
    if cmd.get_flag("quiet") {
        config.listing = false;
    }
    let mut assembler = Assembler::from_pattern_file(pattern)?;
    if config.listing {
        assembler.set_listing(Some(Box::new(std::io::stdout())),atty::is(atty::Stream::Stdout));
    }
    if let Some(path) = cmd.get_one::<String>("import") {
        assembler.import_labels(&read_text(path)?);
    }
    assembler.assemble_file(source)?;
    if let Some(path) = cmd.get_one::<String>("output") {
        assembler.image().save(path)?;
    }
    let export = match (cmd.get_one::<String>("export"),cmd.get_one::<String>("export_elf")) {
        (Some(path),_) => Some((path,config.elf_flags)),
        (None,Some(path)) => Some((path,true)),
        (None,None) => None
    };
    if let Some((path,elf)) = export {
        std::fs::write(path,assembler.export_table(elf))?;
    }
    let errors = assembler.error_count();
    if errors > 0 {
        log::warn!("assembly finished with {} error(s)",errors);
        if config.strict {
            return Err(Box::new(CommandError::AssemblyFailed(errors)));
        }
    }
    Ok(())
}
