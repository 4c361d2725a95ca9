//! # Pattern file
//!
//! A pattern file holds one record per line with up to six `::` separated fields:
//! template, error spec, object spec, slot index, and two free fields.
//! Records whose first field names a directive are kept apart from encoding rules,
//! so that the driver can replay them before every source line.

use std::path::{Path,PathBuf};
use super::directives::PatternDirective;
use super::matcher::Template;
use super::text::{chars,at,skip_spaces,exact,collect,reduce_spaces,remove_block_comment,quoted};
use super::Error;
use crate::DYNERR;

const MAX_DEPTH: usize = 16;

#[derive(Clone,Debug,PartialEq)]
pub struct PatternEntry {
    pub fields: [String;6]
}

impl PatternEntry {
    /// Distribute the split fields the same way regardless of how many were given.
    /// A lone second field is the object spec, which is the common shorthand.
    pub fn from_fields(f: Vec<String>) -> Result<Self,Error> {
        let e = String::new;
        let fields = match f.len() {
            0 => [e(),e(),e(),e(),e(),e()],
            1 => [f[0].clone(),e(),e(),e(),e(),e()],
            2 => [f[0].clone(),e(),f[1].clone(),e(),e(),e()],
            3 => [f[0].clone(),f[1].clone(),f[2].clone(),e(),e(),e()],
            4 => [f[0].clone(),f[1].clone(),f[2].clone(),f[3].clone(),e(),e()],
            5 => [f[0].clone(),f[1].clone(),f[2].clone(),f[3].clone(),f[4].clone(),e()],
            6 => [f[0].clone(),f[1].clone(),f[2].clone(),f[3].clone(),f[4].clone(),f[5].clone()],
            _ => return Err(Error::IllegalPattern)
        };
        Ok(Self { fields })
    }
    pub fn template(&self) -> &str {
        &self.fields[0]
    }
    pub fn error_spec(&self) -> &str {
        &self.fields[1]
    }
    pub fn object_spec(&self) -> &str {
        &self.fields[2]
    }
    pub fn slot_expr(&self) -> &str {
        &self.fields[3]
    }
    pub fn is_blank(&self) -> bool {
        self.fields.iter().all(|f| f.is_empty())
    }
    /// Empty template with something in the other fields, this stops the rule scan
    pub fn is_terminator(&self) -> bool {
        self.fields[0].is_empty() && !self.is_blank()
    }
}

/// Encoding rule with its template groups worked out at load time
pub struct Rule {
    pub entry: PatternEntry,
    pub template: Template
}

pub struct PatternFile {
    pub directives: Vec<PatternDirective>,
    pub rules: Vec<Rule>,
    /// upper case names declared by `.setsym`, labels may not reuse them
    pub symbol_names: Vec<String>
}

/// Split a line on `::`, each field has leading spaces skipped and trailing whitespace removed
pub fn split_fields(line: &str) -> Vec<String> {
    let s = chars(line);
    let mut ans = Vec::new();
    let mut idx = 0;
    loop {
        idx = skip_spaces(&s,idx);
        if idx >= s.len() {
            if ans.is_empty() {
                ans.push(String::new());
            }
            break;
        }
        let beg = idx;
        while idx < s.len() && !exact(&s,idx,"::") {
            idx += 1;
        }
        ans.push(collect(&s,beg,idx).trim_end().to_string());
        if idx >= s.len() {
            break;
        }
        idx += 2;
    }
    ans
}

/// If the line is `.include "path"` return the path
fn include_path(line: &str) -> Option<String> {
    let s = chars(line);
    let idx = skip_spaces(&s,0);
    if !super::text::q(&s,idx,".include") {
        return None;
    }
    let c = at(&s,idx+8);
    if c != ' ' && c != '"' {
        return None;
    }
    quoted(&collect(&s,idx+8,s.len()))
}

fn resolve(path: &str,base: Option<&Path>) -> PathBuf {
    let direct = PathBuf::from(path);
    if direct.exists() {
        return direct;
    }
    match base {
        Some(dir) => dir.join(path),
        None => direct
    }
}

impl PatternFile {
    pub fn new() -> Self {
        Self {
            directives: Vec::new(),
            rules: Vec::new(),
            symbol_names: Vec::new()
        }
    }
    /// Load from a file, following `.include`
    pub fn load(path: &str) -> Result<Self,DYNERR> {
        let mut entries = Vec::new();
        read_entries(Path::new(path),&mut entries,0)?;
        Ok(Self::from_entries(entries))
    }
    /// Parse text that is already in memory, includes are resolved against the working directory
    pub fn parse(text: &str) -> Result<Self,DYNERR> {
        let mut entries = Vec::new();
        parse_entries(text,None,&mut entries,0)?;
        Ok(Self::from_entries(entries))
    }
    pub fn from_entries(entries: Vec<PatternEntry>) -> Self {
        let mut ans = Self::new();
        for entry in entries {
            if entry.is_blank() {
                continue;
            }
            if let Some(d) = PatternDirective::from_entry(&entry) {
                if let PatternDirective::SetSymbol { name, expr: _ } = &d {
                    let name = name.to_uppercase();
                    if !ans.symbol_names.contains(&name) {
                        ans.symbol_names.push(name);
                    }
                }
                ans.directives.push(d);
                continue;
            }
            let template = Template::new(entry.template());
            ans.rules.push(Rule { entry, template });
        }
        log::debug!("{} directives and {} rules",ans.directives.len(),ans.rules.len());
        ans
    }
}

fn read_entries(path: &Path,entries: &mut Vec<PatternEntry>,depth: usize) -> Result<(),DYNERR> {
    if depth > MAX_DEPTH {
        log::error!("pattern includes nested too deeply at {}",path.display());
        return Err(Box::new(Error::Nesting));
    }
    let text = match std::fs::read_to_string(path) {
        Ok(t) => t,
        Err(_) => {
            log::error!("could not read pattern file {}",path.display());
            return Err(Box::new(Error::FileNotFound(path.display().to_string())));
        }
    };
    log::info!("reading pattern file {}",path.display());
    parse_entries(&text,path.parent(),entries,depth)
}

fn parse_entries(text: &str,base: Option<&Path>,entries: &mut Vec<PatternEntry>,depth: usize) -> Result<(),DYNERR> {
    for (num,raw) in text.lines().enumerate() {
        let line = remove_block_comment(raw).replace('\t'," ").replace('\r',"");
        let line = reduce_spaces(&line);
        if let Some(inc) = include_path(&line) {
            read_entries(&resolve(&inc,base),entries,depth+1)?;
            continue;
        }
        match PatternEntry::from_fields(split_fields(&line)) {
            Ok(entry) => entries.push(entry),
            Err(e) => log::warn!("pattern line {} skipped: {}",num+1,e)
        }
    }
    Ok(())
}
