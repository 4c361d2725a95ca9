//! # VLIW bundler
//!
//! Sub-instructions chained on one line with `!!` are encoded separately, then packed
//! into one bundle.  The slot indices found on the line select the template field.

use std::collections::BTreeSet;
use super::expr::Evaluator;
use super::{Value,Error};

#[derive(Clone,Debug,PartialEq)]
pub struct BundleTemplate {
    pub indices: Vec<Value>,
    pub expr: String
}

#[derive(Clone)]
pub struct VliwConfig {
    pub enabled: bool,
    /// bundle width, negative means the bundle is written low byte first
    pub bundle_bits: Value,
    pub slot_bits: Value,
    /// template field width, negative puts the field in the high bits
    pub template_bits: Value,
    /// filler bytes for an unused slot, low byte first
    pub nop: Vec<u8>,
    pub templates: Vec<BundleTemplate>
}

/// One encoded sub-instruction
#[derive(Clone,Debug,PartialEq)]
pub struct Slot {
    pub index: Value,
    pub object: Vec<Value>
}

fn mask(bits: Value) -> u128 {
    match bits {
        b if b >= 128 => u128::MAX,
        b if b <= 0 => 0,
        b => (1u128 << b) - 1
    }
}

fn shl(x: u128,n: Value) -> u128 {
    match n {
        n if n >= 128 || n < 0 => 0,
        n => x << n
    }
}

impl VliwConfig {
    pub fn new() -> Self {
        Self {
            enabled: false,
            bundle_bits: 0,
            slot_bits: 0,
            template_bits: 0,
            nop: Vec::new(),
            templates: Vec::new()
        }
    }
    /// Set the geometry, the nop value is split into `ceil(slot_bits/8)` bytes
    pub fn configure(&mut self,bundle_bits: Value,slot_bits: Value,template_bits: Value,nop: Value) {
        self.bundle_bits = bundle_bits;
        self.slot_bits = slot_bits;
        self.template_bits = template_bits;
        self.enabled = true;
        let n = match slot_bits {
            b if b > 0 => ((b + 7) / 8) as usize,
            _ => 0
        };
        self.nop = (0..n).map(|i| match i < 16 {
            true => ((nop as u128) >> (8*i)) as u8,
            false => 0
        }).collect();
    }
    /// Add a template unless an identical one is present
    pub fn add_template(&mut self,t: BundleTemplate) {
        if !self.templates.contains(&t) {
            self.templates.push(t);
        }
    }
    /// Template expression whose index set equals the set of slot indices
    pub fn select(&self,slots: &[Slot]) -> Option<String> {
        if self.template_bits == 0 {
            return Some("0".to_string());
        }
        let present: BTreeSet<Value> = slots.iter().map(|s| s.index).collect();
        self.templates.iter()
            .find(|t| t.indices.iter().copied().collect::<BTreeSet<Value>>() == present)
            .map(|t| t.expr.clone())
    }
    /// Pack the slots into bundle bytes in output order
    pub fn pack(&self,ev: &mut Evaluator,slots: &[Slot]) -> Result<Vec<u8>,Error> {
        let vbits = self.bundle_bits.abs();
        let tbits = self.template_bits.abs();
        if self.slot_bits <= 0 || self.slot_bits > 128 || vbits > 128 || tbits > vbits {
            return Err(Error::MalformedVliw);
        }
        let expr = self.select(slots).ok_or(Error::NoBundleTemplate)?;
        let templ = (ev.eval(&expr) as u128) & mask(tbits);
        let ibyte = ((self.slot_bits + 7) / 8) as usize;
        let noi = ((vbits - tbits) / self.slot_bits) as usize;
        let mut values: Vec<Value> = slots.iter().flat_map(|s| s.object.iter().copied()).collect();
        while values.len() < ibyte*noi {
            if self.nop.is_empty() {
                values.push(0);
            } else {
                values.extend(self.nop.iter().map(|b| *b as Value));
            }
        }
        let mut r: u128 = 0;
        for j in 0..noi {
            let mut vv: u128 = 0;
            for i in 0..ibyte {
                vv = shl(vv,8) | (values[j*ibyte+i] & 0xff) as u128;
            }
            r = shl(r,self.slot_bits) | (vv & mask(self.slot_bits));
        }
        r &= mask(vbits);
        let res = match self.template_bits < 0 {
            true => r | shl(templ,vbits - tbits),
            false => shl(r,tbits) | templ
        };
        let nbytes = (vbits / 8) as usize;
        let mut ans: Vec<u8> = (0..nbytes).map(|i| (res >> (8*i)) as u8).collect();
        if self.bundle_bits > 0 {
            let shift = vbits - 8*nbytes as Value;
            ans = (0..nbytes).rev().map(|i| (res >> (shift as usize + 8*i)) as u8).collect();
        }
        Ok(ans)
    }
}
