//! # Expression evaluator
//!
//! Recursive descent over the operator table below, lowest binding first.
//! Every level returns the value and the index of the first character it did not consume.
//!
//! | level | operators |
//! |-------|-----------|
//! | ternary | `c ? a : b` |
//! | logical | `\|\|` then `&&` then `not(..)` |
//! | relational | `<= < >= > == !=` |
//! | sign extension | `x ' n` |
//! | bitwise | `^` then `\|` then `&` |
//! | shift | `<< >>` |
//! | additive | `+ -` |
//! | multiplicative | `* // %` |
//! | power | `**`, right associative |
//! | unary | `- ~ @` and `*(x,n)` |
//!
//! Arithmetic wraps at 128 bits.  Division uses floor semantics and the modulo takes the
//! sign of the divisor.

use super::{Context,Value,Error};
use super::text::{at,q,exact,skip_spaces,chars,symbol_word,label_word};
use super::ieee754;

/// Pattern mode enables bind variables and the `!!!`/`!!!!` atoms, assembly mode does not.
#[derive(Clone,Copy,PartialEq,Debug)]
pub enum Mode {
    Pattern,
    Assembly
}

pub struct Evaluator<'a> {
    ctx: &'a mut Context,
    mode: Mode,
    unresolved: Vec<String>,
    faults: Vec<Error>
}

fn floor_div(x: Value,t: Value) -> Value {
    let d = x.wrapping_div(t);
    if x.wrapping_rem(t) != 0 && ((x < 0) != (t < 0)) {
        d.wrapping_sub(1)
    } else {
        d
    }
}

fn floor_mod(x: Value,t: Value) -> Value {
    let r = x.wrapping_rem(t);
    if r != 0 && ((r < 0) != (t < 0)) {
        r.wrapping_add(t)
    } else {
        r
    }
}

fn shift_left(x: Value,t: Value) -> Value {
    match t {
        t if t < 0 || t >= 128 => 0,
        t => x.wrapping_shl(t as u32)
    }
}

fn shift_right(x: Value,t: Value) -> Value {
    match t {
        t if t < 0 => 0,
        t if t >= 128 => if x < 0 { -1 } else { 0 },
        t => x >> t
    }
}

fn power(x: Value,t: Value) -> Value {
    if t < 0 {
        return 0;
    }
    x.wrapping_pow(u32::try_from(t).unwrap_or(u32::MAX))
}

/// Treat bit `n-1` of `x` as a sign bit and extend it upward
fn sign_extend(x: Value,n: Value) -> Value {
    if n <= 0 || n >= 128 {
        return x;
    }
    let hi: Value = !0 << n;
    match (x >> (n-1)) & 1 {
        1 => (x & !hi) | hi,
        _ => x & !hi
    }
}

/// Number of bits needed to hold the unsigned magnitude
fn bit_length(x: Value) -> Value {
    (128 - (x as u128).leading_zeros()) as Value
}

impl<'a> Evaluator<'a> {
    pub fn new(ctx: &'a mut Context,mode: Mode) -> Self {
        Self {
            ctx,
            mode,
            unresolved: Vec::new(),
            faults: Vec::new()
        }
    }
    pub fn pattern(ctx: &'a mut Context) -> Self {
        Self::new(ctx,Mode::Pattern)
    }
    pub fn assembly(ctx: &'a mut Context) -> Self {
        Self::new(ctx,Mode::Assembly)
    }
    pub fn ctx(&mut self) -> &mut Context {
        &mut *self.ctx
    }
    pub fn mode(&self) -> Mode {
        self.mode
    }
    pub fn set_mode(&mut self,mode: Mode) {
        self.mode = mode;
    }
    /// Labels that were referenced but not found since the last clear
    pub fn unresolved(&self) -> &[String] {
        &self.unresolved
    }
    pub fn clear_unresolved(&mut self) {
        self.unresolved = Vec::new();
    }
    /// Errors raised by operators, such as division by zero
    pub fn faults(&self) -> &[Error] {
        &self.faults
    }
    pub fn clear_faults(&mut self) {
        self.faults = Vec::new();
    }
    pub fn take_faults(&mut self) -> Vec<Error> {
        std::mem::take(&mut self.faults)
    }
    /// Evaluate a whole string, trailing text is ignored
    pub fn eval(&mut self,text: &str) -> Value {
        self.expression(&chars(text),0).0
    }
    pub fn expression(&mut self,s: &[char],idx: usize) -> (Value,usize) {
        let idx = skip_spaces(s,idx);
        self.ternary(s,idx)
    }
    /// Evaluate with `stop` acting as a terminator wherever it appears outside parentheses.
    /// The returned index refers to `s`, so the caller sees the stop character next.
    pub fn expression_until(&mut self,s: &[char],idx: usize,stop: char) -> (Value,usize) {
        if stop == '\0' {
            return self.expression(s,idx);
        }
        let mut depth = 0;
        let mut masked: Vec<char> = Vec::with_capacity(s.len());
        for c in s {
            match *c {
                '(' => {
                    depth += 1;
                    masked.push('(');
                },
                ')' => {
                    if depth > 0 {
                        depth -= 1;
                    }
                    masked.push(')');
                },
                c if c==stop && depth==0 => masked.push('\0'),
                c => masked.push(c)
            }
        }
        self.expression(&masked,idx)
    }
    fn ternary(&mut self,s: &[char],idx: usize) -> (Value,usize) {
        let (mut x,mut idx) = self.logical_or(s,idx);
        while at(s,idx) == '?' {
            let (t,i) = self.logical_or(s,idx+1);
            idx = i;
            if at(s,idx) == ':' {
                let (u,i) = self.logical_or(s,idx+1);
                idx = i;
                x = if x != 0 { t } else { u };
            }
        }
        (x,idx)
    }
    fn logical_or(&mut self,s: &[char],idx: usize) -> (Value,usize) {
        let (mut x,mut idx) = self.logical_and(s,idx);
        while exact(s,idx,"||") {
            let (t,i) = self.logical_and(s,idx+2);
            idx = i;
            x = (x != 0 || t != 0) as Value;
        }
        (x,idx)
    }
    fn logical_and(&mut self,s: &[char],idx: usize) -> (Value,usize) {
        let (mut x,mut idx) = self.logical_not(s,idx);
        while exact(s,idx,"&&") {
            let (t,i) = self.logical_not(s,idx+2);
            idx = i;
            x = (x != 0 && t != 0) as Value;
        }
        (x,idx)
    }
    fn logical_not(&mut self,s: &[char],idx: usize) -> (Value,usize) {
        let idx = skip_spaces(s,idx);
        if exact(s,idx,"not(") {
            let (x,idx) = self.relational(s,idx+3);
            return ((x == 0) as Value,idx);
        }
        self.relational(s,idx)
    }
    fn relational(&mut self,s: &[char],idx: usize) -> (Value,usize) {
        let (mut x,mut idx) = self.sign_ext(s,idx);
        loop {
            let (op,len) = if exact(s,idx,"<=") {
                ("<=",2)
            } else if at(s,idx) == '<' {
                ("<",1)
            } else if exact(s,idx,">=") {
                (">=",2)
            } else if at(s,idx) == '>' {
                (">",1)
            } else if exact(s,idx,"==") {
                ("==",2)
            } else if exact(s,idx,"!=") {
                ("!=",2)
            } else {
                break;
            };
            let (t,i) = self.sign_ext(s,idx+len);
            idx = i;
            x = match op {
                "<=" => x <= t,
                "<" => x < t,
                ">=" => x >= t,
                ">" => x > t,
                "==" => x == t,
                _ => x != t
            } as Value;
        }
        (x,idx)
    }
    fn sign_ext(&mut self,s: &[char],idx: usize) -> (Value,usize) {
        let (mut x,mut idx) = self.bit_xor(s,idx);
        while at(s,idx) == '\'' {
            let (t,i) = self.bit_xor(s,idx+1);
            idx = i;
            x = sign_extend(x,t);
        }
        (x,idx)
    }
    fn bit_xor(&mut self,s: &[char],idx: usize) -> (Value,usize) {
        let (mut x,mut idx) = self.bit_or(s,idx);
        while at(s,idx) == '^' {
            let (t,i) = self.bit_or(s,idx+1);
            idx = i;
            x ^= t;
        }
        (x,idx)
    }
    fn bit_or(&mut self,s: &[char],idx: usize) -> (Value,usize) {
        let (mut x,mut idx) = self.bit_and(s,idx);
        while at(s,idx) == '|' && at(s,idx+1) != '|' {
            let (t,i) = self.bit_and(s,idx+1);
            idx = i;
            x |= t;
        }
        (x,idx)
    }
    fn bit_and(&mut self,s: &[char],idx: usize) -> (Value,usize) {
        let (mut x,mut idx) = self.shift(s,idx);
        while at(s,idx) == '&' && at(s,idx+1) != '&' {
            let (t,i) = self.shift(s,idx+1);
            idx = i;
            x &= t;
        }
        (x,idx)
    }
    fn shift(&mut self,s: &[char],idx: usize) -> (Value,usize) {
        let (mut x,mut idx) = self.additive(s,idx);
        loop {
            if exact(s,idx,"<<") {
                let (t,i) = self.additive(s,idx+2);
                idx = i;
                x = shift_left(x,t);
            } else if exact(s,idx,">>") {
                let (t,i) = self.additive(s,idx+2);
                idx = i;
                x = shift_right(x,t);
            } else {
                break;
            }
        }
        (x,idx)
    }
    fn additive(&mut self,s: &[char],idx: usize) -> (Value,usize) {
        let (mut x,mut idx) = self.multiplicative(s,idx);
        loop {
            match at(s,idx) {
                '+' => {
                    let (t,i) = self.multiplicative(s,idx+1);
                    idx = i;
                    x = x.wrapping_add(t);
                },
                '-' => {
                    let (t,i) = self.multiplicative(s,idx+1);
                    idx = i;
                    x = x.wrapping_sub(t);
                },
                _ => break
            }
        }
        (x,idx)
    }
    fn multiplicative(&mut self,s: &[char],idx: usize) -> (Value,usize) {
        let (mut x,mut idx) = self.power(s,idx);
        loop {
            if at(s,idx) == '*' {
                let (t,i) = self.power(s,idx+1);
                idx = i;
                x = x.wrapping_mul(t);
            } else if exact(s,idx,"//") {
                let (t,i) = self.power(s,idx+2);
                idx = i;
                x = self.checked(x,t,floor_div);
            } else if at(s,idx) == '%' {
                let (t,i) = self.power(s,idx+1);
                idx = i;
                x = self.checked(x,t,floor_mod);
            } else {
                break;
            }
        }
        (x,idx)
    }
    fn checked(&mut self,x: Value,t: Value,op: fn(Value,Value) -> Value) -> Value {
        if t == 0 {
            self.faults.push(Error::DivisionByZero);
            return 0;
        }
        op(x,t)
    }
    fn power(&mut self,s: &[char],idx: usize) -> (Value,usize) {
        let (x,idx) = self.factor(s,idx);
        if exact(s,idx,"**") {
            let (t,idx) = self.power(s,idx+2);
            return (power(x,t),idx);
        }
        (x,idx)
    }
    /// Unary level, this is also what `!!v` captures in a template
    pub fn factor(&mut self,s: &[char],idx: usize) -> (Value,usize) {
        let idx = skip_spaces(s,idx);
        let pat = self.mode == Mode::Pattern;
        let (x,idx) = if pat && exact(s,idx,"!!!!") {
            (self.ctx.bundle.stop,idx+4)
        } else if pat && exact(s,idx,"!!!") {
            (self.ctx.bundle.slots,idx+3)
        } else {
            match at(s,idx) {
                '-' => {
                    let (x,i) = self.factor(s,idx+1);
                    (x.wrapping_neg(),i)
                },
                '~' => {
                    let (x,i) = self.factor(s,idx+1);
                    (!x,i)
                },
                '@' => {
                    let (x,i) = self.factor(s,idx+1);
                    (bit_length(x),i)
                },
                '*' if at(s,idx+1) == '(' => self.byte_extract(s,idx+2),
                _ => self.atom(s,idx)
            }
        };
        (x,skip_spaces(s,idx))
    }
    /// `*(x,n)` selects byte `n` of `x` and above
    fn byte_extract(&mut self,s: &[char],idx: usize) -> (Value,usize) {
        let (x,idx) = self.expression(s,idx);
        if at(s,idx) != ',' {
            return (0,idx);
        }
        let (n,idx) = self.expression(s,idx+1);
        if at(s,idx) != ')' {
            return (0,idx);
        }
        (shift_right(x,n.wrapping_mul(8)),idx+1)
    }
    fn char_literal(s: &[char],idx: usize) -> Option<(Value,usize)> {
        for (txt,val) in [("'\\t'",0x09),("'\\''",0x27),("'\\\\'",0x5c),("'\\n'",0x0a)] {
            if exact(s,idx,txt) {
                return Some((val,idx+4));
            }
        }
        if at(s,idx) == '\'' && at(s,idx+1) != '\0' && at(s,idx+2) == '\'' {
            return Some((at(s,idx+1) as Value,idx+3));
        }
        None
    }
    /// If a brace group follows, return its trimmed contents and the index after it
    fn braces(s: &[char],idx: usize) -> Option<(String,usize)> {
        let mut idx = skip_spaces(s,idx);
        if at(s,idx) != '{' {
            return None;
        }
        idx += 1;
        let mut txt = String::new();
        while idx < s.len() && s[idx] != '}' && s[idx] != '\0' {
            txt.push(s[idx]);
            idx += 1;
        }
        if at(s,idx) == '}' {
            idx += 1;
        }
        Some((txt.trim().to_string(),idx))
    }
    fn radix(s: &[char],mut idx: usize,radix: u32) -> (Value,usize) {
        let mut x: Value = 0;
        while let Some(d) = at(s,idx).to_digit(radix) {
            x = x.wrapping_mul(radix as Value).wrapping_add(d as Value);
            idx += 1;
        }
        (x,idx)
    }
    fn atom(&mut self,s: &[char],idx: usize) -> (Value,usize) {
        let idx = skip_spaces(s,idx);
        let c = at(s,idx);
        if c == '(' {
            let (x,idx) = self.expression(s,idx+1);
            return match at(s,idx) {
                ')' => (x,idx+1),
                _ => (x,idx)
            };
        }
        if let Some(ans) = Self::char_literal(s,idx) {
            return ans;
        }
        if exact(s,idx,"$$") {
            return (self.ctx.pc,idx+2);
        }
        if c == '#' {
            let (name,idx) = symbol_word(s,idx+1,&self.ctx.charsets);
            return (self.ctx.symbols.get(&name).unwrap_or(0),idx);
        }
        if q(s,idx,"0b") {
            return Self::radix(s,idx+2,2);
        }
        if q(s,idx,"0x") {
            return Self::radix(s,idx+2,16);
        }
        for (prefix,fmt) in [("qad",ieee754::Format::Quad),("dbl",ieee754::Format::Double),("flt",ieee754::Format::Single)] {
            if exact(s,idx,prefix) {
                if let Some((txt,idx)) = Self::braces(s,idx+3) {
                    return (ieee754::literal(fmt,&txt,self.ctx.numeric.as_ref()),idx);
                }
            }
        }
        if c.is_ascii_digit() {
            return Self::radix(s,idx,10);
        }
        if self.mode == Mode::Pattern && c.is_ascii_lowercase() && !at(s,idx+1).is_ascii_lowercase() {
            if exact(s,idx+1,":=") {
                let (x,idx) = self.expression(s,idx+3);
                self.ctx.vars.put(c,x);
                return (x,idx);
            }
            return (self.ctx.vars.get(c),idx+1);
        }
        let (name,end) = label_word(s,idx,&self.ctx.charsets,false);
        if end > idx {
            let x = match self.ctx.labels.value(&name) {
                Some(v) => v,
                None => {
                    log::trace!("unresolved label {}",name);
                    self.unresolved.push(name);
                    0
                }
            };
            return (x,end);
        }
        (0,idx)
    }
}
