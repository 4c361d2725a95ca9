//! Symbol, label, section, and bind variable stores.
//!
//! Pattern symbols and program labels are separate namespaces.  Symbols are
//! case-insensitive and rebuilt before every source line, labels are case-sensitive
//! and live for the whole run.

use std::collections::{BTreeMap,HashMap};
use super::Value;

/// Pattern-file constants, keys are stored upper case
pub struct SymbolTable {
    map: HashMap<String,Value>
}

impl SymbolTable {
    pub fn new() -> Self {
        Self { map: HashMap::new() }
    }
    pub fn get(&self,name: &str) -> Option<Value> {
        self.map.get(&name.to_uppercase()).copied()
    }
    pub fn set(&mut self,name: &str,val: Value) {
        self.map.insert(name.to_uppercase(),val);
    }
    pub fn remove(&mut self,name: &str) {
        self.map.remove(&name.to_uppercase());
    }
    pub fn clear(&mut self) {
        self.map.clear();
    }
    pub fn names(&self) -> Vec<String> {
        self.map.keys().cloned().collect()
    }
}

#[derive(Clone,Debug,PartialEq)]
pub struct Label {
    pub value: Value,
    pub section: String
}

/// Program labels, ordered by name for printing
pub struct LabelTable {
    map: BTreeMap<String,Label>
}

impl LabelTable {
    pub fn new() -> Self {
        Self { map: BTreeMap::new() }
    }
    pub fn contains(&self,name: &str) -> bool {
        self.map.contains_key(name)
    }
    /// Look up a label, the caller decides what an unresolved name means
    pub fn get(&self,name: &str) -> Option<&Label> {
        self.map.get(name)
    }
    pub fn value(&self,name: &str) -> Option<Value> {
        self.map.get(name).map(|l| l.value)
    }
    pub fn insert(&mut self,name: &str,value: Value,section: &str) {
        self.map.insert(name.to_string(),Label { value, section: section.to_string() });
    }
    pub fn iter(&self) -> impl Iterator<Item = (&String,&Label)> {
        self.map.iter()
    }
    pub fn len(&self) -> usize {
        self.map.len()
    }
}

#[derive(Clone,Copy,Debug,PartialEq)]
pub struct Section {
    pub start: Value,
    pub size: Value
}

/// Sections in order of first appearance
pub struct SectionTable {
    list: Vec<(String,Section)>
}

impl SectionTable {
    pub fn new() -> Self {
        Self { list: Vec::new() }
    }
    pub fn get(&self,name: &str) -> Option<Section> {
        self.list.iter().find(|(n,_)| n==name).map(|(_,s)| *s)
    }
    /// Start or restart a section at `start`, the size is reset
    pub fn start(&mut self,name: &str,start: Value) {
        let sec = Section { start, size: 0 };
        match self.list.iter_mut().find(|(n,_)| n==name) {
            Some(entry) => entry.1 = sec,
            None => self.list.push((name.to_string(),sec))
        }
    }
    /// Close a section at `pc`, returns false if it was never started
    pub fn end(&mut self,name: &str,pc: Value) -> bool {
        match self.list.iter_mut().find(|(n,_)| n==name) {
            Some(entry) => {
                entry.1.size = pc - entry.1.start;
                true
            },
            None => false
        }
    }
    pub fn iter(&self) -> impl Iterator<Item = &(String,Section)> {
        self.list.iter()
    }
}

/// Labels marked for the export file, in order of export
pub struct ExportTable {
    list: Vec<(String,Label)>
}

impl ExportTable {
    pub fn new() -> Self {
        Self { list: Vec::new() }
    }
    pub fn insert(&mut self,name: &str,label: Label) {
        match self.list.iter_mut().find(|(n,_)| n==name) {
            Some(entry) => entry.1 = label,
            None => self.list.push((name.to_string(),label))
        }
    }
    pub fn iter(&self) -> impl Iterator<Item = &(String,Label)> {
        self.list.iter()
    }
}

/// The 26 single letter variables used to carry captures into the object code
pub struct BindVars {
    vals: [Value;26]
}

impl BindVars {
    pub fn new() -> Self {
        Self { vals: [0;26] }
    }
    fn slot(c: char) -> Option<usize> {
        let c = c.to_ascii_lowercase();
        match c {
            'a'..='z' => Some(c as usize - 'a' as usize),
            _ => None
        }
    }
    pub fn get(&self,c: char) -> Value {
        match Self::slot(c) {
            Some(i) => self.vals[i],
            None => 0
        }
    }
    pub fn put(&mut self,c: char,v: Value) {
        if let Some(i) = Self::slot(c) {
            self.vals[i] = v;
        }
    }
    pub fn reset(&mut self) {
        self.vals = [0;26];
    }
}
