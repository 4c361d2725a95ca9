use super::{assembler,test_assembler};
use crate::asm::vliw::{VliwConfig,Slot,BundleTemplate};
use crate::asm::expr::Evaluator;
use crate::asm::{Context,Error};

const BUNDLE: &str = "
.vliw::40::16::8::0
EPIC::0,1::0x5a
ADD !x::::0x10,x::0
SUB !x::::0x20,x::1
";

fn slots() -> Vec<Slot> {
    vec![
        Slot { index: 0, object: vec![0x10,1] },
        Slot { index: 1, object: vec![0x20,2] }
    ]
}

#[test]
fn two_slots() {
    test_assembler("10 01 20 02 5a",BUNDLE,"ADD 1 !! SUB 2");
}

#[test]
fn slot_order_does_not_select() {
    test_assembler("20 02 10 01 5a",BUNDLE,"SUB 2 !! ADD 1");
}

#[test]
fn unchained_line_is_plain() {
    test_assembler("10 01",BUNDLE,"ADD 1");
}

#[test]
fn low_byte_first() {
    let pat = BUNDLE.replace(".vliw::40",".vliw::-40");
    test_assembler("5a 02 20 01 10",&pat,"ADD 1 !! SUB 2");
}

#[test]
fn template_in_high_bits() {
    let pat = BUNDLE.replace("::8::0","::-8::0");
    test_assembler("5a 10 01 20 02",&pat,"ADD 1 !! SUB 2");
}

#[test]
fn stop_bit() {
    let pat = BUNDLE.replace("::0x5a","::0x5a|(!!!!<<7)");
    test_assembler("10 01 20 02 da",&pat,"ADD 1 !!!! !! SUB 2");
    test_assembler("10 01 20 02 5a",&pat,"ADD 1 !! SUB 2");
}

#[test]
fn missing_template() {
    let mut asm = assembler(BUNDLE);
    let report = asm.immediate("ADD 1 !! ADD 2");
    assert_eq!(report.errors.len(),1);
    assert!(matches!(report.errors[0],Error::NoBundleTemplate));
    assert!(report.bytes.is_empty());
    assert_eq!(asm.context().pc,0);
}

#[test]
fn missing_template_is_silent_in_discovery() {
    let mut asm = assembler(BUNDLE);
    asm.assemble_text("test.s","ADD 1 !! ADD 2\nlab: ADD 3").expect("assembler failed");
    assert_eq!(asm.error_count(),1);
    assert_eq!(asm.context().labels.value("lab"),Some(0));
}

#[test]
fn nop_fill() {
    let mut ctx = Context::new();
    let mut vliw = VliwConfig::new();
    vliw.configure(48,16,0,0x1234);
    assert_eq!(vliw.nop,vec![0x34,0x12]);
    let one = vec![Slot { index: 0, object: vec![0xaa,0xbb] }];
    let bytes = vliw.pack(&mut Evaluator::pattern(&mut ctx),&one).expect("pack failed");
    assert_eq!(bytes,vec![0xaa,0xbb,0x34,0x12,0x34,0x12]);
}

#[test]
fn template_selection() {
    let mut vliw = VliwConfig::new();
    vliw.configure(40,16,8,0);
    vliw.add_template(BundleTemplate { indices: vec![0,1], expr: "1".to_string() });
    vliw.add_template(BundleTemplate { indices: vec![0,1], expr: "1".to_string() });
    vliw.add_template(BundleTemplate { indices: vec![1], expr: "2".to_string() });
    assert_eq!(vliw.templates.len(),2);
    assert_eq!(vliw.select(&slots()),Some("1".to_string()));
    assert_eq!(vliw.select(&slots()[1..]),Some("2".to_string()));
    assert_eq!(vliw.select(&slots()[0..1]),None);
}

#[test]
fn malformed_geometry() {
    let mut ctx = Context::new();
    let mut vliw = VliwConfig::new();
    vliw.configure(40,0,8,0);
    let ans = vliw.pack(&mut Evaluator::pattern(&mut ctx),&slots());
    assert!(matches!(ans,Err(Error::MalformedVliw)));
    vliw.configure(8,4,16,0);
    let ans = vliw.pack(&mut Evaluator::pattern(&mut ctx),&slots());
    assert!(matches!(ans,Err(Error::MalformedVliw)));
}
