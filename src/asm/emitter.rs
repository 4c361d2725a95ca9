//! # Binary emitter
//!
//! The image is a sparse map from byte offsets to bytes.  Every write covers one unit
//! of `ceil(bits/8)` bytes at offset `address * bytes_per_unit`, so a program may
//! revisit or skip regions freely.  Unwritten bytes read back as zero.

use std::collections::BTreeMap;
use std::io::{Seek,SeekFrom,Write};
use super::Value;
use crate::STDRESULT;

#[derive(Clone,Copy,PartialEq,Debug)]
pub enum Endian {
    Little,
    Big
}

pub struct Image {
    bytes: BTreeMap<u64,u8>,
    pub bits: Value,
    pub endian: Endian
}

impl Image {
    pub fn new() -> Self {
        Self {
            bytes: BTreeMap::new(),
            bits: 8,
            endian: Endian::Little
        }
    }
    pub fn bytes_per_unit(&self) -> usize {
        let b = Value::max(self.bits,8);
        ((b + 7) / 8) as usize
    }
    /// Bytes of one unit in output order
    pub fn encode_unit(&self,v: Value) -> Vec<u8> {
        let n = self.bytes_per_unit();
        let masked = match self.bits {
            b if b >= 128 => v as u128,
            b if b <= 0 => 0,
            b => (v as u128) & ((1u128 << b) - 1)
        };
        let fill = match (self.bits >= 128,v < 0) {
            (true,true) => 0xff,
            _ => 0
        };
        let mut le: Vec<u8> = (0..n).map(|i| match i < 16 {
            true => (masked >> (8*i)) as u8,
            false => fill
        }).collect();
        if self.endian == Endian::Big {
            le.reverse();
        }
        le
    }
    /// Write one unit, returning the bytes written.
    /// Returns None if the address is negative.
    pub fn write_unit(&mut self,address: Value,v: Value) -> Option<Vec<u8>> {
        let n = self.bytes_per_unit() as Value;
        let offset = u64::try_from(address.checked_mul(n)?).ok()?;
        let bytes = self.encode_unit(v);
        for (i,b) in bytes.iter().enumerate() {
            self.bytes.insert(offset + i as u64,*b);
        }
        Some(bytes)
    }
    pub fn get(&self,offset: u64) -> Option<u8> {
        self.bytes.get(&offset).copied()
    }
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
    /// One past the highest offset written
    pub fn len(&self) -> u64 {
        match self.bytes.last_key_value() {
            Some((k,_)) => k + 1,
            None => 0
        }
    }
    /// Dense copy of the image starting at offset 0, gaps are zero
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut ans = vec![0;self.len() as usize];
        for (k,v) in &self.bytes {
            ans[*k as usize] = *v;
        }
        ans
    }
    /// Contiguous runs of written bytes
    pub fn runs(&self) -> Vec<(u64,Vec<u8>)> {
        let mut ans: Vec<(u64,Vec<u8>)> = Vec::new();
        for (k,v) in &self.bytes {
            match ans.last_mut() {
                Some((beg,run)) if *beg + run.len() as u64 == *k => run.push(*v),
                _ => ans.push((*k,vec![*v]))
            }
        }
        ans
    }
    /// Create or truncate `path` and write each run at its offset
    pub fn save(&self,path: &str) -> STDRESULT {
        let mut file = std::fs::File::create(path)?;
        for (offset,run) in self.runs() {
            file.seek(SeekFrom::Start(offset))?;
            file.write_all(&run)?;
        }
        log::info!("wrote {} bytes to {}",self.len(),path);
        Ok(())
    }
}
