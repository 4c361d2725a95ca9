//! Interactive subcommand, each line is assembled as soon as it is entered

use std::io::Write;
use crate::asm::assembly::Assembler;
use crate::STDRESULT;
use super::read_text;

const RCH: &str = "unreachable was reached";

pub fn run(cmd: &clap::ArgMatches) -> STDRESULT {
    let pattern = cmd.get_one::<String>("pattern").expect(RCH);
    let mut assembler = Assembler::from_pattern_file(pattern)?;
    assembler.set_listing(Some(Box::new(std::io::stdout())),atty::is(atty::Stream::Stdout));
    if let Some(path) = cmd.get_one::<String>("import") {
        assembler.import_labels(&read_text(path)?);
    }
    let stdin = std::io::stdin();
    loop {
        print!("{:016x}: >> ",assembler.context().pc);
        std::io::stdout().flush()?;
        let mut line = String::new();
        if stdin.read_line(&mut line)? == 0 {
            println!();
            break;
        }
        let line = line.replace("\\\\","\\");
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == "?" {
            print!("{}",assembler.label_table());
            continue;
        }
        assembler.immediate(line);
    }
    if let Some(path) = cmd.get_one::<String>("output") {
        assembler.image().save(path)?;
    }
    Ok(())
}
