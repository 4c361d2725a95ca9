//! # `patasm` main library
//!
//! This library assembles source programs for instruction sets that are described
//! entirely by a declarative pattern file.  The pattern file maps textual instruction
//! syntax to binary encodings through an embedded expression language, so a new target
//! needs no dedicated encoder.
//!
//! ## Architecture
//!
//! Everything is built around a single `asm::Context` that owns the symbol, label, and
//! section tables, the bind variables, the program counter, and the output image.
//! Components take the context as an argument rather than reaching into ambient state:
//! * `asm::expr::Evaluator` parses and evaluates expressions against the context
//! * `asm::matcher` matches normalized source lines against pattern templates
//! * `asm::directives` handles pattern-file configuration and source pseudo-operations
//! * `asm::emitter::Image` holds the positioned output bytes
//! * `asm::vliw` packs chained sub-instructions into fixed-width bundles
//! * `asm::assembly::Assembler` drives the two passes (or immediate mode)
//!
//! ## Pattern Files
//!
//! Each non-blank line of a pattern file is a record of up to six `::` separated fields,
//! `template :: errors :: object :: slot index :: extra :: extra`.  Records whose first
//! field is a reserved name such as `.setsym` or `.vliw` are directives rather than rules.
//! The first rule whose template matches a source line wins.

pub mod asm;
pub mod commands;

type DYNERR = Box<dyn std::error::Error>;
type STDRESULT = Result<(),Box<dyn std::error::Error>>;

/// Assemble `source_path` with the patterns in `pattern_path`, returning the assembler
/// after both passes so the caller can save the image or export labels.
pub fn assemble_files(pattern_path: &str, source_path: &str) -> Result<asm::assembly::Assembler,DYNERR> {
    let mut assembler = asm::assembly::Assembler::from_pattern_file(pattern_path)?;
    assembler.assemble_file(source_path)?;
    Ok(assembler)
}
