//! # Assembly driver
//!
//! Runs a discovery pass that defines labels and an emission pass that writes the image,
//! or assembles single lines in immediate mode where both happen at once.
//!
//! Each source line goes through these steps:
//! 1. normalize whitespace and strip the `;` comment
//! 2. clear the symbols and replay the pattern directives
//! 3. define a leading `label:`, possibly with `.equ`
//! 4. try the source directives, then scan the pattern rules
//! 5. emit the object units, or pack a VLIW bundle if `!!` chains more instructions
//!
//! Errors are local to the line.  They are logged, shown in the listing, and counted,
//! but assembly always continues with the next line.

use std::io::Write;
use std::path::PathBuf;
use colored::Colorize;
use super::expr::Evaluator;
use super::matcher::match_optional;
use super::pattern::PatternFile;
use super::directives::{self,Outcome};
use super::text::{chars,at,exact,collect,skip_spaces,param_to_space,param_to_chain,
    reduce_spaces,remove_line_comment,label_word};
use super::vliw::Slot;
use super::emitter::Image;
use super::ieee754::NumericEvaluator;
use super::{Context,Pass,Value,Error,UserError,BundleState,DEFAULT_SECTION};
use crate::{DYNERR,STDRESULT};

const MAX_INCLUDE_DEPTH: usize = 32;
const MAX_REPEAT: Value = 0x10000;

/// What happened on one source line
#[derive(Debug)]
pub struct LineReport {
    pub pc: Value,
    pub bytes: Vec<u8>,
    pub errors: Vec<Error>
}

enum Part {
    /// nothing to encode, e.g. empty text or no match during discovery
    Skip,
    /// a source directive was carried out
    Done,
    Include(String),
    Instruction(Slot)
}

/// Expand `rep[n,pattern]` into `n` comma separated copies of `pattern`
fn expand_rep(ev: &mut Evaluator,spec: &str) -> String {
    let s = chars(spec);
    let mut ans = String::new();
    let mut i = 0;
    while i < s.len() {
        if !exact(&s,i,"rep[") {
            ans.push(s[i]);
            i += 1;
            continue;
        }
        i += 4;
        let beg = i;
        let mut depth = 1;
        let mut comma: Option<usize> = None;
        while i < s.len() {
            match s[i] {
                '[' => depth += 1,
                ']' => {
                    depth -= 1;
                    if depth == 0 {
                        break;
                    }
                },
                ',' if depth == 1 && comma.is_none() => comma = Some(i),
                _ => {}
            }
            i += 1;
        }
        match comma {
            Some(c) => {
                let mut n = ev.eval(&collect(&s,beg,c));
                if n > MAX_REPEAT {
                    log::warn!("repeat count {} limited to {}",n,MAX_REPEAT);
                    n = MAX_REPEAT;
                }
                let pattern = collect(&s,c+1,i);
                let copies: Vec<String> = (0..n.max(0)).map(|_| pattern.clone()).collect();
                ans += &copies.join(",");
                i += 1;
            },
            None => {
                ans += "rep[";
                i = beg;
            }
        }
    }
    ans
}

/// Replace each `%%` with its ordinal, counting from 0
fn number_percent(spec: &str) -> String {
    let mut ans = String::new();
    let mut count = 0;
    let mut parts = spec.split("%%");
    if let Some(first) = parts.next() {
        ans += first;
    }
    for part in parts {
        ans += &count.to_string();
        ans += part;
        count += 1;
    }
    ans
}

/// Evaluate the object spec into a list of unit values
fn object_spec(ev: &mut Evaluator,spec: &str) -> Vec<Value> {
    let expanded = number_percent(&expand_rep(ev,spec));
    let s = chars(&expanded);
    let mut idx = 0;
    let mut obj: Vec<Value> = Vec::new();
    loop {
        match at(&s,idx) {
            '\0' => break,
            ',' => {
                idx += 1;
                let p = ev.ctx().pc + obj.len() as Value;
                let n = ev.ctx().align_up(p);
                let pad = ev.ctx().padding;
                for _i in p..n {
                    obj.push(pad);
                }
                continue;
            },
            _ => {}
        }
        let mut conditional = false;
        if at(&s,idx) == ';' {
            conditional = true;
            idx += 1;
        }
        let (x,i) = ev.expression(&s,idx);
        idx = i;
        if !conditional || x != 0 {
            obj.push(x);
        }
        if at(&s,idx) == ',' {
            idx += 1;
            continue;
        }
        break;
    }
    obj
}

/// Evaluate `cond;code` pairs, each true condition raises its numbered error
fn error_spec(ev: &mut Evaluator,spec: &str) -> Vec<Error> {
    let mut ans = Vec::new();
    if spec.trim().is_empty() {
        return ans;
    }
    let s = chars(spec);
    let mut idx = 0;
    loop {
        match at(&s,idx) {
            '\0' => break,
            ',' => {
                idx += 1;
                continue;
            },
            _ => {}
        }
        let beg = idx;
        let (cond,i) = ev.expression(&s,idx);
        idx = i;
        if at(&s,idx) == ';' {
            idx += 1;
        }
        let (code,i) = ev.expression(&s,idx);
        idx = i;
        if cond != 0 {
            ans.push(UserError::report(code));
        }
        if idx == beg {
            log::warn!("error spec `{}` could not be fully parsed",spec);
            break;
        }
    }
    ans
}

/// Scan the rules in order, the first match encodes the instruction.
/// Problems that only matter for output are reported in emitting passes.
fn scan_rules(patterns: &PatternFile,ctx: &mut Context,input: &str,errs: &mut Vec<Error>) -> Result<Option<Slot>,Error> {
    let emits = ctx.pass.emits();
    let s = chars(input);
    for rule in &patterns.rules {
        ctx.vars.reset();
        if rule.entry.is_terminator() {
            return Ok(Some(Slot { index: 0, object: Vec::new() }));
        }
        let mut ev = Evaluator::pattern(ctx);
        if !match_optional(&mut ev,&s,&rule.template) {
            continue;
        }
        log::trace!("`{}` matched `{}`",input,rule.entry.template());
        let user = error_spec(&mut ev,rule.entry.error_spec());
        let object = object_spec(&mut ev,rule.entry.object_spec());
        let index = ev.eval(rule.entry.slot_expr());
        if emits {
            if let Some(name) = ev.unresolved().first() {
                return Err(Error::UndefinedLabel(name.clone()));
            }
            errs.extend(ev.take_faults());
            errs.extend(user);
        }
        return Ok(Some(Slot { index, object }));
    }
    match emits {
        true => Err(Error::Syntax),
        false => Ok(None)
    }
}

pub struct Assembler {
    ctx: Context,
    patterns: PatternFile,
    include_stack: Vec<(String,usize)>,
    listing: Option<Box<dyn Write>>,
    colored: bool,
    error_count: usize
}

impl Assembler {
    pub fn new(patterns: PatternFile) -> Self {
        let mut ctx = Context::new();
        ctx.pattern_symbols = patterns.symbol_names.iter().cloned().collect();
        let mut ans = Self {
            ctx,
            patterns,
            include_stack: Vec::new(),
            listing: None,
            colored: false,
            error_count: 0
        };
        ans.prepare_line();
        ans
    }
    pub fn from_pattern_file(path: &str) -> Result<Self,DYNERR> {
        Ok(Self::new(PatternFile::load(path)?))
    }
    /// Send the listing somewhere, it is only produced by emitting passes
    pub fn set_listing(&mut self,listing: Option<Box<dyn Write>>,colored: bool) {
        self.listing = listing;
        self.colored = colored;
    }
    pub fn set_numeric(&mut self,numeric: Box<dyn NumericEvaluator>) {
        self.ctx.numeric = numeric;
    }
    pub fn import_labels(&mut self,text: &str) -> usize {
        super::linkage::import_labels(&mut self.ctx,text)
    }
    pub fn export_table(&self,elf: bool) -> String {
        super::linkage::export_table(&self.ctx,elf)
    }
    pub fn context(&self) -> &Context {
        &self.ctx
    }
    pub fn context_mut(&mut self) -> &mut Context {
        &mut self.ctx
    }
    pub fn image(&self) -> &Image {
        &self.ctx.image
    }
    /// Number of errors reported so far
    pub fn error_count(&self) -> usize {
        self.error_count
    }
    /// Labels as `name value section` lines
    pub fn label_table(&self) -> String {
        let mut ans = String::new();
        for (name,label) in self.ctx.labels.iter() {
            ans += &format!("{}\t{}\t{}\n",name,super::linkage::hex_string(label.value),label.section);
        }
        ans
    }
    /// Two pass assembly of a source file
    pub fn assemble_file(&mut self,path: &str) -> STDRESULT {
        let text = match std::fs::read_to_string(path) {
            Ok(t) => t,
            Err(_) => {
                log::error!("could not read source file {}",path);
                return Err(Box::new(Error::FileNotFound(path.to_string())));
            }
        };
        self.assemble_text(path,&text)
    }
    /// Two pass assembly of source text, `name` is used in messages and the listing
    pub fn assemble_text(&mut self,name: &str,text: &str) -> STDRESULT {
        for pass in [Pass::Discovery,Pass::Emission] {
            log::info!("begin {:?} pass",pass);
            self.ctx.pass = pass;
            self.ctx.pc = 0;
            self.ctx.current_section = DEFAULT_SECTION.to_string();
            self.assemble_source(name,text);
        }
        Ok(())
    }
    /// Assemble one line in immediate mode, labels are defined and bytes emitted at once
    pub fn immediate(&mut self,line: &str) -> LineReport {
        if self.ctx.pass != Pass::Immediate || self.ctx.line == 0 {
            self.ctx.pass = Pass::Immediate;
            self.ctx.file = "(stdin)".to_string();
            self.ctx.line = 1;
        }
        let ans = self.process_line(line);
        self.ctx.line += 1;
        ans
    }
    fn assemble_source(&mut self,name: &str,text: &str) {
        self.include_stack.push((self.ctx.file.clone(),self.ctx.line));
        self.ctx.file = name.to_string();
        self.ctx.line = 1;
        for raw in text.lines() {
            self.process_line(raw);
            self.ctx.line += 1;
        }
        if let Some((file,line)) = self.include_stack.pop() {
            self.ctx.file = file;
            self.ctx.line = line;
        }
    }
    fn resolve_include(&self,path: &str) -> PathBuf {
        let direct = PathBuf::from(path);
        if direct.exists() {
            return direct;
        }
        match PathBuf::from(&self.ctx.file).parent() {
            Some(dir) => dir.join(path),
            None => direct
        }
    }
    fn process_line(&mut self,raw: &str) -> LineReport {
        let src = raw.trim_end_matches(['\r','\n']);
        let pc = self.ctx.pc;
        self.ctx.listing = Vec::new();
        let (mut errs,include) = self.assemble_line(src);
        let mut included: Option<(String,String)> = None;
        if let Some(path) = include {
            if self.include_stack.len() > MAX_INCLUDE_DEPTH {
                errs.push(Error::Nesting);
            } else {
                match std::fs::read_to_string(self.resolve_include(&path)) {
                    Ok(text) => included = Some((path,text)),
                    Err(_) => errs.push(Error::FileNotFound(path))
                }
            }
        }
        if self.ctx.pass == Pass::Discovery {
            errs.retain(|e| matches!(e,Error::LabelRedefined(_) | Error::PatternSymbolClash(_)));
        }
        for e in &errs {
            log::error!("{}:{}: {}",self.ctx.file,self.ctx.line,e);
        }
        self.error_count += errs.len();
        if self.ctx.pass.emits() {
            self.write_listing(pc,src,&errs);
        }
        if let Some((path,text)) = included {
            log::debug!("include {}",path);
            self.assemble_source(&path,&text);
        }
        LineReport { pc, bytes: self.ctx.listing.clone(), errors: errs }
    }
    fn write_listing(&mut self,pc: Value,src: &str,errs: &[Error]) {
        let mut out = format!("{:016x} {} {} {}",pc,self.ctx.file,self.ctx.line,src);
        for b in &self.ctx.listing {
            out += &format!(" 0x{:02x}",b);
        }
        for e in errs {
            let msg = format!(" error - {}",e);
            match self.colored {
                true => out += &msg.red().to_string(),
                false => out += &msg
            }
        }
        if let Some(w) = self.listing.as_mut() {
            if let Err(e) = writeln!(w,"{}",out) {
                log::warn!("listing could not be written: {}",e);
            }
        }
    }
    /// Clear the symbols and replay the pattern directives
    fn prepare_line(&mut self) {
        self.ctx.symbols.clear();
        for d in &self.patterns.directives {
            d.apply(&mut self.ctx);
        }
        self.ctx.bundle = BundleState::default();
    }
    /// Handle a leading label, returns the rest of the line or None if nothing is left
    fn line_label(&mut self,line: &str,errs: &mut Vec<Error>) -> Option<String> {
        let s = chars(line);
        let (label,idx) = label_word(&s,0,&self.ctx.charsets,true);
        if label.is_empty() || at(&s,idx-1) != ':' {
            return Some(line.to_string());
        }
        let section = self.ctx.current_section.clone();
        let (word,after) = param_to_space(&s,idx);
        if word.to_uppercase() == ".EQU" {
            let emits = self.ctx.pass.emits();
            let mut ev = Evaluator::assembly(&mut self.ctx);
            let (v,_) = ev.expression(&s,after);
            if emits {
                if let Some(name) = ev.unresolved().first() {
                    errs.push(Error::UndefinedLabel(name.clone()));
                }
                errs.extend(ev.take_faults());
            }
            if let Err(e) = self.ctx.define_label(&label,v,&section) {
                errs.push(e);
            }
            return None;
        }
        if let Err(e) = self.ctx.define_label(&label,self.ctx.pc,&section) {
            errs.push(e);
        }
        Some(collect(&s,idx,s.len()))
    }
    /// Assemble one mnemonic and operand, stopping at a `!!` chain marker
    fn part(&mut self,s: &[char],idx: usize,errs: &mut Vec<Error>) -> Result<(Part,usize),Error> {
        let (mnemonic,idx) = param_to_space(s,idx);
        let (operand,idx) = param_to_chain(s,idx);
        let mnemonic = mnemonic.replace(' ',"");
        let operand = operand.trim_end().to_string();
        match directives::process(&mut self.ctx,&mnemonic,&operand)? {
            Outcome::Done => return Ok((Part::Done,idx)),
            Outcome::Include(path) => return Ok((Part::Include(path),idx)),
            Outcome::NotDirective => {}
        }
        if mnemonic.is_empty() {
            return Ok((Part::Skip,idx));
        }
        let input = reduce_spaces([mnemonic,operand].join(" ").trim());
        match scan_rules(&self.patterns,&mut self.ctx,&input,errs)? {
            Some(slot) => Ok((Part::Instruction(slot),idx)),
            None => Ok((Part::Skip,idx))
        }
    }
    fn assemble_line(&mut self,raw: &str) -> (Vec<Error>,Option<String>) {
        let mut errs = Vec::new();
        let line = remove_line_comment(&reduce_spaces(&raw.replace('\t'," ")));
        if line.trim().is_empty() {
            return (errs,None);
        }
        self.prepare_line();
        let rest = match self.line_label(&line,&mut errs) {
            Some(rest) => rest,
            None => return (errs,None)
        };
        self.ctx.bundle.slots = rest.split("!!").filter(|p| !p.is_empty()).count() as Value;
        let s = chars(&rest);
        let (first,idx) = match self.part(&s,0,&mut errs) {
            Ok(ans) => ans,
            Err(e) => {
                errs.push(e);
                return (errs,None);
            }
        };
        let slot = match first {
            Part::Instruction(slot) => slot,
            Part::Include(path) => return (errs,Some(path)),
            Part::Skip | Part::Done => return (errs,None)
        };
        if !self.ctx.vliw.enabled || !exact(&s,skip_spaces(&s,idx),"!!") {
            for (i,v) in slot.object.iter().enumerate() {
                self.ctx.emit(self.ctx.pc + i as Value,*v,true);
            }
            self.ctx.pc += slot.object.len() as Value;
            return (errs,None);
        }
        if let Err(e) = self.bundle(&s,idx,slot,&mut errs) {
            errs.push(e);
        }
        (errs,None)
    }
    /// Collect the chained sub-instructions and emit them as one bundle
    fn bundle(&mut self,s: &[char],mut idx: usize,first: Slot,errs: &mut Vec<Error>) -> Result<(),Error> {
        let mut slots = vec![first];
        loop {
            idx = skip_spaces(s,idx);
            if exact(s,idx,"!!!!") {
                idx += 4;
                self.ctx.bundle.stop = 1;
                continue;
            }
            if exact(s,idx,"!!") {
                let (part,i) = self.part(s,idx+2,errs)?;
                idx = i;
                match part {
                    Part::Instruction(slot) => slots.push(slot),
                    Part::Include(_) => log::warn!("include inside a bundle is ignored"),
                    _ => {}
                }
                continue;
            }
            break;
        }
        let emits = self.ctx.pass.emits();
        let vliw = self.ctx.vliw.clone();
        let mut ev = Evaluator::pattern(&mut self.ctx);
        let bytes = match vliw.pack(&mut ev,&slots) {
            Ok(bytes) => bytes,
            Err(e) => return match emits {
                true => Err(e),
                false => Ok(())
            }
        };
        for (i,b) in bytes.iter().enumerate() {
            self.ctx.emit(self.ctx.pc + i as Value,*b as Value,true);
        }
        self.ctx.pc += bytes.len() as Value;
        Ok(())
    }
}
