//! # Directives
//!
//! Pattern directives configure the assembler and are replayed before every source line.
//! Source directives are pseudo-operations that appear in the program being assembled.

use super::expr::Evaluator;
use super::pattern::PatternEntry;
use super::text::{chars,at,q,skip_spaces,label_word};
use super::vliw::{BundleTemplate};
use super::emitter::Endian;
use super::symbols::Label;
use super::{Context,Value,Error};

#[derive(Clone,Debug,PartialEq)]
pub enum PatternDirective {
    SetSymbol { name: String, expr: String },
    /// clear one symbol, or all if None
    ClearSymbol(Option<String>),
    Bits { big: bool, expr: String },
    Padding(String),
    SymbolChars(String),
    Vliw { bundle: String, slot: String, template: String, nop: String },
    Epic { indices: String, expr: String }
}

impl PatternDirective {
    pub fn from_entry(entry: &PatternEntry) -> Option<Self> {
        let f = &entry.fields;
        match f[0].as_str() {
            ".setsym" => Some(Self::SetSymbol { name: f[1].clone(), expr: f[2].clone() }),
            ".clearsym" => match f[2].is_empty() {
                true => Some(Self::ClearSymbol(None)),
                false => Some(Self::ClearSymbol(Some(f[2].clone())))
            },
            ".bits" => Some(Self::Bits { big: f[1]=="big", expr: f[2].clone() }),
            ".padding" => Some(Self::Padding(f[2].clone())),
            ".symbolc" => Some(Self::SymbolChars(f[2].clone())),
            ".vliw" => Some(Self::Vliw {
                bundle: f[1].clone(),
                slot: f[2].clone(),
                template: f[3].clone(),
                nop: f[4].clone()
            }),
            s if s.to_uppercase()=="EPIC" && !f[1].is_empty() => Some(Self::Epic {
                indices: f[1].clone(),
                expr: f[2].clone()
            }),
            _ => None
        }
    }
    /// Replay the directive against the context, expressions use pattern mode
    pub fn apply(&self,ctx: &mut Context) {
        match self {
            Self::SetSymbol { name, expr } => {
                let v = match expr.trim().is_empty() {
                    true => 0,
                    false => Evaluator::pattern(ctx).eval(expr)
                };
                ctx.symbols.set(name,v);
            },
            Self::ClearSymbol(Some(name)) => ctx.symbols.remove(name),
            Self::ClearSymbol(None) => ctx.symbols.clear(),
            Self::Bits { big, expr } => {
                let bits = match expr.trim().is_empty() {
                    true => 8,
                    false => Evaluator::pattern(ctx).eval(expr)
                };
                ctx.image.bits = bits;
                ctx.image.endian = match big {
                    true => Endian::Big,
                    false => Endian::Little
                };
            },
            Self::Padding(expr) => {
                ctx.padding = Evaluator::pattern(ctx).eval(expr);
            },
            Self::SymbolChars(extra) => ctx.charsets.extend_symbol(extra),
            Self::Vliw { bundle, slot, template, nop } => {
                let mut ev = Evaluator::pattern(ctx);
                let b = ev.eval(bundle);
                let s = ev.eval(slot);
                let t = ev.eval(template);
                let n = ev.eval(nop);
                ctx.vliw.configure(b,s,t,n);
            },
            Self::Epic { indices, expr } => {
                let s = chars(indices);
                let mut ev = Evaluator::pattern(ctx);
                let mut list = Vec::new();
                let mut idx = 0;
                loop {
                    let (v,i) = ev.expression(&s,idx);
                    list.push(v);
                    if at(&s,i) == ',' && i > idx {
                        idx = i + 1;
                        continue;
                    }
                    break;
                }
                ctx.vliw.add_template(BundleTemplate { indices: list, expr: expr.clone() });
            }
        }
    }
}

/// What the driver should do after a source directive was examined
#[derive(Debug,PartialEq)]
pub enum Outcome {
    /// not a directive, go on to the pattern rules
    NotDirective,
    Done,
    Include(String)
}

fn asm_eval(ctx: &mut Context,s: &[char],idx: usize) -> Result<(Value,usize),Error> {
    let emits = ctx.pass.emits();
    let mut ev = Evaluator::assembly(ctx);
    let ans = ev.expression(s,idx);
    if !emits {
        return Ok(ans);
    }
    if let Some(name) = ev.unresolved().first() {
        return Err(Error::UndefinedLabel(name.clone()));
    }
    match ev.take_faults().into_iter().next() {
        Some(e) => Err(e),
        None => Ok(ans)
    }
}

/// Emit a quoted string with `\0`, `\t`, `\n` escapes, the closing quote is optional
fn ascii(ctx: &mut Context,operand: &str) -> Result<(),Error> {
    let s = chars(operand);
    if at(&s,0) != '"' {
        return Err(Error::Syntax);
    }
    let mut idx = 1;
    while idx < s.len() && s[idx] != '"' {
        let (c,len) = match (s[idx],at(&s,idx+1)) {
            ('\\','0') => ('\0',2),
            ('\\','t') => ('\t',2),
            ('\\','n') => ('\n',2),
            (c,_) => (c,1)
        };
        ctx.emit(ctx.pc,c as Value,true);
        ctx.pc += 1;
        idx += len;
    }
    Ok(())
}

fn export(ctx: &mut Context,operand: &str) -> Result<(),Error> {
    if !ctx.pass.emits() {
        return Ok(());
    }
    let s = chars(operand);
    let mut idx = 0;
    let mut missing: Option<String> = None;
    loop {
        idx = skip_spaces(&s,idx);
        let (name,i) = label_word(&s,idx,&ctx.charsets,true);
        if name.is_empty() {
            break;
        }
        idx = i;
        match ctx.labels.get(&name) {
            Some(label) => {
                let label: Label = label.clone();
                ctx.exports.insert(&name,label);
            },
            None => {
                if missing.is_none() {
                    missing = Some(name);
                }
            }
        }
        idx = skip_spaces(&s,idx);
        if at(&s,idx) == ',' {
            idx += 1;
        }
    }
    match missing {
        Some(name) => Err(Error::UndefinedLabel(name)),
        None => Ok(())
    }
}

/// Try `mnemonic operand` as a source pseudo-op.
/// The mnemonic has its spaces removed and is compared without regard to case.
pub fn process(ctx: &mut Context,mnemonic: &str,operand: &str) -> Result<Outcome,Error> {
    let op = operand.trim_end();
    match mnemonic.to_uppercase().as_str() {
        "SECTION" | "SEGMENT" => {
            if !op.is_empty() {
                ctx.current_section = op.to_string();
                ctx.sections.start(op,ctx.pc);
            }
        },
        "ENDSECTION" | "ENDSEGMENT" => {
            let name = ctx.current_section.clone();
            if !ctx.sections.end(&name,ctx.pc) {
                return Err(Error::NoSection(name));
            }
        },
        ".ZERO" => {
            let (n,_) = asm_eval(ctx,&chars(op),0)?;
            for _i in 0..=n {
                ctx.emit(ctx.pc,0,false);
                ctx.pc += 1;
            }
        },
        ".ASCII" => ascii(ctx,op)?,
        ".ASCIIZ" => {
            ascii(ctx,op)?;
            ctx.emit(ctx.pc,0,true);
            ctx.pc += 1;
        },
        ".INCLUDE" => match super::text::quoted(op) {
            Some(path) => return Ok(Outcome::Include(path)),
            None => return Err(Error::Syntax)
        },
        ".ALIGN" => {
            if !op.is_empty() {
                ctx.align = asm_eval(ctx,&chars(op),0)?.0;
            }
            ctx.pc = ctx.align_up(ctx.pc);
        },
        ".ORG" => {
            let s = chars(op);
            let (u,idx) = asm_eval(ctx,&s,0)?;
            if q(&s,idx,",P") {
                for addr in ctx.pc..u {
                    ctx.emit(addr,ctx.padding,false);
                }
            }
            ctx.pc = u;
        },
        ".LABELC" => {
            if !op.is_empty() {
                ctx.charsets.extend_label(op);
            }
        },
        ".EXPORT" => export(ctx,op)?,
        _ => return Ok(Outcome::NotDirective)
    }
    Ok(Outcome::Done)
}
