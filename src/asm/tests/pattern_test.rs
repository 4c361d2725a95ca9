use crate::asm::pattern::{PatternFile,PatternEntry,split_fields};
use crate::asm::directives::PatternDirective;
use std::io::Write;

fn fields(v: &[&str]) -> Vec<String> {
    v.iter().map(|s| s.to_string()).collect()
}

#[test]
fn field_split() {
    assert_eq!(split_fields("LD a,!n :: n>255;0 :: 0x06,n"),fields(&["LD a,!n","n>255;0","0x06,n"]));
    assert_eq!(split_fields("NOP::0x00"),fields(&["NOP","0x00"]));
    assert_eq!(split_fields("JP !n :: :: 0xc3"),fields(&["JP !n","","0xc3"]));
    assert_eq!(split_fields(""),fields(&[""]));
}

#[test]
fn field_distribution() {
    let e = PatternEntry::from_fields(fields(&["NOP","0x00"])).expect("bad entry");
    assert_eq!(e.template(),"NOP");
    assert_eq!(e.error_spec(),"");
    assert_eq!(e.object_spec(),"0x00");
    let e = PatternEntry::from_fields(fields(&["ADD !x","","0x10,x","1"])).expect("bad entry");
    assert_eq!(e.object_spec(),"0x10,x");
    assert_eq!(e.slot_expr(),"1");
    assert!(PatternEntry::from_fields(fields(&["1","2","3","4","5","6","7"])).is_err());
    let e = PatternEntry::from_fields(fields(&["","0"])).expect("bad entry");
    assert!(e.is_terminator());
}

#[test]
fn directives_are_separated() {
    let pat = PatternFile::parse("\
.setsym::R0::0
.bits::big::16
NOP::0x00 /* no operation */
/* whole line comment
EPIC::0,1::0x5a
.vliw::40::16::8::0
HALT::0x76
").expect("parse failed");
    assert_eq!(pat.rules.len(),2);
    assert_eq!(pat.rules[0].entry.object_spec(),"0x00");
    assert_eq!(pat.directives.len(),4);
    assert_eq!(pat.directives[0],PatternDirective::SetSymbol { name: "R0".to_string(), expr: "0".to_string() });
    assert_eq!(pat.directives[1],PatternDirective::Bits { big: true, expr: "16".to_string() });
    assert_eq!(pat.symbol_names,vec!["R0".to_string()]);
}

#[test]
fn whitespace_is_normalized() {
    let pat = PatternFile::parse("LD\ta,   !n   ::   0x3e,n").expect("parse failed");
    assert_eq!(pat.rules[0].entry.template(),"LD a, !n");
    assert_eq!(pat.rules[0].entry.object_spec(),"0x3e,n");
}

#[test]
fn include_file() {
    let dir = tempfile::tempdir().expect("no temp dir");
    let inc_path = dir.path().join("inc.axx");
    let mut inc = std::fs::File::create(&inc_path).expect("create failed");
    writeln!(inc,"HALT::0x76").expect("write failed");
    let main_path = dir.path().join("main.axx");
    let mut main = std::fs::File::create(&main_path).expect("create failed");
    writeln!(main,"NOP::0x00").expect("write failed");
    writeln!(main,".include \"inc.axx\"").expect("write failed");
    writeln!(main,"RET::0xc9").expect("write failed");
    drop(inc);
    drop(main);
    let pat = PatternFile::load(&main_path.to_string_lossy()).expect("load failed");
    let templates: Vec<&str> = pat.rules.iter().map(|r| r.entry.template()).collect();
    assert_eq!(templates,vec!["NOP","HALT","RET"]);
}

#[test]
fn missing_file() {
    assert!(PatternFile::load("no/such/file.axx").is_err());
}
