use crate::asm::emitter::{Image,Endian};
use crate::asm::{Context,Pass};

#[test]
fn little_endian_unit() {
    let mut img = Image::new();
    img.bits = 16;
    assert_eq!(img.bytes_per_unit(),2);
    assert_eq!(img.write_unit(4,0x1234),Some(vec![0x34,0x12]));
    assert_eq!(img.get(8),Some(0x34));
    assert_eq!(img.get(9),Some(0x12));
    assert_eq!(img.to_bytes(),vec![0,0,0,0,0,0,0,0,0x34,0x12]);
}

#[test]
fn big_endian_unit() {
    let mut img = Image::new();
    img.bits = 16;
    img.endian = Endian::Big;
    img.write_unit(4,0x1234);
    assert_eq!(img.get(8),Some(0x12));
    assert_eq!(img.get(9),Some(0x34));
}

#[test]
fn masking() {
    let mut img = Image::new();
    assert_eq!(img.encode_unit(0x1ff),vec![0xff]);
    assert_eq!(img.encode_unit(-1),vec![0xff]);
    img.bits = 12;
    assert_eq!(img.encode_unit(0xffff),vec![0xff,0x0f]);
    img.bits = 4;
    assert_eq!(img.encode_unit(0xff),vec![0x0f]);
}

#[test]
fn positioned_writes() {
    let mut img = Image::new();
    img.write_unit(2,0xaa);
    img.write_unit(0,0xbb);
    img.write_unit(2,0xcc);
    assert_eq!(img.to_bytes(),vec![0xbb,0,0xcc]);
    assert_eq!(img.runs(),vec![(0,vec![0xbb]),(2,vec![0xcc])]);
    assert_eq!(img.write_unit(-1,0),None);
}

#[test]
fn save_image() {
    let dir = tempfile::tempdir().expect("no temp dir");
    let path = dir.path().join("out.bin");
    let mut img = Image::new();
    img.write_unit(3,0x11);
    img.write_unit(1,0x22);
    img.save(&path.to_string_lossy()).expect("save failed");
    assert_eq!(std::fs::read(&path).expect("read failed"),vec![0,0x22,0,0x11]);
}

#[test]
fn discovery_does_not_emit() {
    let mut ctx = Context::new();
    ctx.pass = Pass::Discovery;
    ctx.emit(0,0x55,true);
    assert!(ctx.image.is_empty());
    assert!(ctx.listing.is_empty());
    ctx.pass = Pass::Emission;
    ctx.emit(0,0x55,true);
    ctx.emit(1,0x66,false);
    assert_eq!(ctx.image.to_bytes(),vec![0x55,0x66]);
    assert_eq!(ctx.listing,vec![0x55]);
}
