//! # Assembler core
//!
//! The core is organized leaves first: the expression evaluator, the symbol and label
//! stores, the pattern matcher, the directive processor, the binary emitter, the VLIW
//! bundler, and finally the two-pass driver in `assembly`.
//!
//! All mutable state lives in `Context`.  A fresh `Evaluator` borrows the context for
//! each evaluation job, which keeps the expression mode (pattern vs. assembly) a property
//! of the entry point rather than of global state.

use num_derive::FromPrimitive;
use num_traits::FromPrimitive;

pub mod text;
pub mod expr;
pub mod ieee754;
pub mod symbols;
pub mod pattern;
pub mod matcher;
pub mod directives;
pub mod emitter;
pub mod vliw;
pub mod assembly;
pub mod linkage;
pub mod settings;

#[cfg(test)]
mod tests;

/// All expression values are carried as 128-bit integers, wide enough for `qad{...}`.
pub type Value = i128;

pub const DIGIT: &str = "0123456789";
pub const LOWER: &str = "abcdefghijklmnopqrstuvwxyz";
pub const CAPITAL: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";
pub const DEFAULT_SECTION: &str = ".text";
const DEFAULT_ALIGN: Value = 16;

/// Errors that can fail a line or a run
#[derive(thiserror::Error,Debug)]
pub enum Error {
    #[error("Syntax error")]
    Syntax,
    #[error("undefined label `{0}`")]
    UndefinedLabel(String),
    #[error("label `{0}` already defined")]
    LabelRedefined(String),
    #[error("`{0}` is a pattern file symbol")]
    PatternSymbolClash(String),
    #[error("Division by 0 error")]
    DivisionByZero,
    #[error("Some error(s) in vliw definition")]
    MalformedVliw,
    #[error("no matching bundle template")]
    NoBundleTemplate,
    #[error("Illegal syntax in assemble line or pattern line")]
    IllegalPattern,
    #[error("Error code {code}{}",spaced(.message))]
    UserError { code: Value, message: String },
    #[error("section `{0}` was never started")]
    NoSection(String),
    #[error("file not found: {0}")]
    FileNotFound(String),
    #[error("nesting too deep")]
    Nesting
}

fn spaced(message: &str) -> String {
    match message.is_empty() {
        true => String::new(),
        false => format!(" {}",message)
    }
}

/// Numbered messages that a pattern's error field can raise.
/// Codes 3 and 4 are reserved and carry no message.
#[derive(thiserror::Error,FromPrimitive,Debug,Clone,Copy,PartialEq)]
pub enum UserError {
    #[error("Value out of range.")]
    ValueOutOfRange = 0,
    #[error("Invalid syntax.")]
    InvalidSyntax = 1,
    #[error("Address out of range.")]
    AddressOutOfRange = 2,
    #[error("Register out of range.")]
    RegisterOutOfRange = 5,
    #[error("Port number out of range.")]
    PortOutOfRange = 6
}

impl UserError {
    /// Build the line error for a numbered code, unknown codes get an empty message
    pub fn report(code: Value) -> Error {
        let known: Option<UserError> = match i64::try_from(code) {
            Ok(c) => FromPrimitive::from_i64(c),
            Err(_) => None
        };
        let message = match known {
            Some(e) => e.to_string(),
            None => String::new()
        };
        Error::UserError { code, message }
    }
}

/// Which traversal is running.  Discovery defines labels, emission writes the image,
/// immediate mode does both at once for interactive use.
#[derive(Clone,Copy,PartialEq,Debug)]
pub enum Pass {
    Immediate,
    Discovery,
    Emission
}

impl Pass {
    pub fn emits(&self) -> bool {
        *self != Pass::Discovery
    }
    pub fn defines(&self) -> bool {
        *self != Pass::Emission
    }
}

/// Characters allowed in label words and symbol words, both can be extended
/// by directives.
#[derive(Clone)]
pub struct CharSets {
    pub label: String,
    pub symbol: String
}

impl CharSets {
    pub fn new() -> Self {
        Self {
            label: [DIGIT,LOWER,CAPITAL,"_."].concat(),
            symbol: [DIGIT,LOWER,CAPITAL,"_%$-~&|"].concat()
        }
    }
    pub fn is_label(&self,c: char) -> bool {
        c != '\0' && self.label.contains(c)
    }
    pub fn is_symbol(&self,c: char) -> bool {
        c != '\0' && self.symbol.contains(c)
    }
    pub fn extend_label(&mut self,extra: &str) {
        self.label = [DIGIT,LOWER,CAPITAL,extra].concat();
    }
    pub fn extend_symbol(&mut self,extra: &str) {
        self.symbol = [LOWER,CAPITAL,DIGIT,extra].concat();
    }
}

/// Chained-slot information visible to pattern expressions as `!!!` and `!!!!`
#[derive(Clone,Copy,Default)]
pub struct BundleState {
    /// set when the line carries a `!!!!` stop marker
    pub stop: Value,
    /// number of non-empty `!!` separated parts on the line
    pub slots: Value
}

/// The assembler context, owned by the driver and lent to every component.
pub struct Context {
    pub pass: Pass,
    pub pc: Value,
    pub padding: Value,
    pub align: Value,
    pub charsets: CharSets,
    pub symbols: symbols::SymbolTable,
    /// names declared by the pattern file, labels may not reuse them
    pub pattern_symbols: std::collections::HashSet<String>,
    pub labels: symbols::LabelTable,
    pub sections: symbols::SectionTable,
    pub current_section: String,
    pub exports: symbols::ExportTable,
    pub vars: symbols::BindVars,
    pub vliw: vliw::VliwConfig,
    pub bundle: BundleState,
    pub image: emitter::Image,
    /// bytes emitted for the line being assembled, used for the listing
    pub listing: Vec<u8>,
    pub numeric: Box<dyn ieee754::NumericEvaluator>,
    pub file: String,
    pub line: usize
}

impl Context {
    pub fn new() -> Self {
        Self {
            pass: Pass::Immediate,
            pc: 0,
            padding: 0,
            align: DEFAULT_ALIGN,
            charsets: CharSets::new(),
            symbols: symbols::SymbolTable::new(),
            pattern_symbols: std::collections::HashSet::new(),
            labels: symbols::LabelTable::new(),
            sections: symbols::SectionTable::new(),
            current_section: DEFAULT_SECTION.to_string(),
            exports: symbols::ExportTable::new(),
            vars: symbols::BindVars::new(),
            vliw: vliw::VliwConfig::new(),
            bundle: BundleState::default(),
            image: emitter::Image::new(),
            listing: Vec::new(),
            numeric: Box::new(ieee754::MathParseEvaluator),
            file: String::new(),
            line: 0
        }
    }
    /// Write one unit at `address` if the current pass emits.
    /// If `listed` the bytes also go to the listing of the current line.
    pub fn emit(&mut self,address: Value,value: Value,listed: bool) {
        if !self.pass.emits() {
            return;
        }
        match self.image.write_unit(address,value) {
            Some(bytes) => {
                if listed {
                    self.listing.extend_from_slice(&bytes);
                }
            },
            None => log::warn!("{}:{}: address {} cannot be written",self.file,self.line,address)
        }
    }
    /// Round `addr` up to the current alignment
    pub fn align_up(&self,addr: Value) -> Value {
        if self.align <= 0 {
            return addr;
        }
        match addr.rem_euclid(self.align) {
            0 => addr,
            rem => addr + self.align - rem
        }
    }
    /// Define a label, enforcing single definition during the defining passes
    pub fn define_label(&mut self,name: &str,value: Value,section: &str) -> Result<(),Error> {
        if self.pass.defines() && self.labels.contains(name) {
            return Err(Error::LabelRedefined(name.to_string()));
        }
        if self.pattern_symbols.contains(&name.to_uppercase()) {
            return match self.pass.defines() {
                true => Err(Error::PatternSymbolClash(name.to_string())),
                false => Ok(())
            };
        }
        self.labels.insert(name,value,section);
        Ok(())
    }
}
