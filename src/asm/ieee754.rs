//! # IEEE-754 literals
//!
//! The `flt{..}`, `dbl{..}`, and `qad{..}` atoms hand their text to a `NumericEvaluator`
//! and then build the bit pattern field by field.  The construction truncates the
//! fraction rather than rounding, and the quad format is filled from a double precision
//! value, so only the upper 52 fraction bits can be non-zero.

use math_parse::MathParse;
use std::collections::HashMap;
use super::Value;

/// Capability that turns literal text into a number.  The assembler does not do
/// floating point arithmetic itself, so anything beyond a plain decimal is delegated.
pub trait NumericEvaluator {
    fn evaluate(&self,text: &str) -> Option<f64>;
}

/// Default evaluator, plain decimals are parsed directly, anything else goes to `math_parse`.
pub struct MathParseEvaluator;

impl NumericEvaluator for MathParseEvaluator {
    fn evaluate(&self,text: &str) -> Option<f64> {
        if let Ok(ans) = text.trim().parse::<f64>() {
            return Some(ans);
        }
        let vars: HashMap<String,String> = HashMap::new();
        match MathParse::parse(text) {
            Ok(parsed) => match parsed.solve_float(Some(&vars)) {
                Ok(ans) => Some(ans),
                Err(e) => {
                    log::error!("problem solving {}: {}",text,e);
                    None
                }
            },
            Err(e) => {
                log::error!("problem parsing {}: {}",text,e);
                None
            }
        }
    }
}

#[derive(Clone,Copy,PartialEq,Debug)]
pub enum Format {
    Single,
    Double,
    Quad
}

impl Format {
    fn exp_bits(&self) -> i32 {
        match self {
            Self::Single => 8,
            Self::Double => 11,
            Self::Quad => 15
        }
    }
    fn frac_bits(&self) -> i32 {
        match self {
            Self::Single => 23,
            Self::Double => 52,
            Self::Quad => 112
        }
    }
    fn sign_bit(&self) -> u128 {
        1 << (self.exp_bits() + self.frac_bits())
    }
    fn exp_max(&self) -> i32 {
        (1 << self.exp_bits()) - 1
    }
    fn assemble(&self,neg: bool,exp: u128,frac: u128) -> u128 {
        let sign = match neg {
            true => self.sign_bit(),
            false => 0
        };
        let frac_mask = (1u128 << self.frac_bits()) - 1;
        sign | (exp << self.frac_bits()) | (frac & frac_mask)
    }
    pub fn nan(&self) -> u128 {
        self.assemble(false,self.exp_max() as u128,1 << (self.frac_bits()-1))
    }
    pub fn infinity(&self,neg: bool) -> u128 {
        self.assemble(neg,self.exp_max() as u128,0)
    }
}

/// Build the bit pattern of `v` in the given format
pub fn encode(fmt: Format,v: f64) -> u128 {
    if v.is_nan() {
        return fmt.nan();
    }
    let neg = v.is_sign_negative();
    if v.is_infinite() {
        return fmt.infinity(neg);
    }
    if v == 0.0 {
        return fmt.assemble(neg,0,0);
    }
    let mut n = v.abs();
    let mut e: i32 = 0;
    while n >= 2.0 {
        n /= 2.0;
        e += 1;
    }
    while n < 1.0 {
        n *= 2.0;
        e -= 1;
    }
    let bias = (1 << (fmt.exp_bits()-1)) - 1;
    let biased = e + bias;
    if biased >= fmt.exp_max() {
        return fmt.infinity(neg);
    }
    if biased <= 0 {
        let frac = (n * 2.0_f64.powi(biased - 1 + fmt.frac_bits())).floor();
        return fmt.assemble(neg,0,frac as u128);
    }
    let frac = ((n - 1.0) * 2.0_f64.powi(fmt.frac_bits())).floor();
    fmt.assemble(neg,biased as u128,frac as u128)
}

/// Evaluate the text found inside the braces of a float literal.
/// Failure of the delegate is logged and treated as zero.
pub fn literal(fmt: Format,text: &str,numeric: &dyn NumericEvaluator) -> Value {
    let bits = match text.trim() {
        "nan" => fmt.nan(),
        "inf" => fmt.infinity(false),
        "-inf" => fmt.infinity(true),
        t => match numeric.evaluate(t) {
            Some(v) => encode(fmt,v),
            None => {
                log::warn!("could not evaluate `{}`, using 0",t);
                0
            }
        }
    };
    bits as Value
}
