mod expr_test;
mod pattern_test;
mod emitter_test;
mod vliw_test;

use super::assembly::Assembler;
use super::pattern::PatternFile;
use super::expr::Evaluator;
use super::{Context,Value};

/// Small accumulator-style instruction set used throughout the tests
pub const TOY: &str = r#"
/* registers */
.setsym::A::7
.setsym::B::0
.setsym::C::1
NOP::0x00
HALT::0x76
LD a,!n :: n>255;0 :: 0x06|(a<<3),n
LDI !n :: n>255;0,n<0;0 :: 0x3e,n
JP !n :: :: 0xc3,n&0xff,n>>8
JR [[!c,]]!d :: :: 0x18+c,d-$$-2
FILL !n :: :: rep[n,0xff]
SEQ :: :: rep[3,%%]
OPT !n :: :: 0x01,;n
"#;

pub fn assembler(patterns: &str) -> Assembler {
    Assembler::new(PatternFile::parse(patterns).expect("pattern parse failed"))
}

/// Assemble `code` in two passes and compare the dense image with `hex`
pub fn test_assembler(hex: &str,patterns: &str,code: &str) {
    let mut assembler = assembler(patterns);
    assembler.assemble_text("test.s",code).expect("assembler failed");
    let actual = hex::encode(assembler.image().to_bytes());
    assert_eq!(actual,hex.replace(" ","").to_lowercase());
}

pub fn eval_asm(expr: &str) -> Value {
    let mut ctx = Context::new();
    Evaluator::assembly(&mut ctx).eval(expr)
}

pub fn eval_pat(expr: &str) -> Value {
    let mut ctx = Context::new();
    Evaluator::pattern(&mut ctx).eval(expr)
}
