mod common;

use common::{float, int};
use irasm::{
    assembler::{self, disasm},
    spec::types::schema::NumericType,
};

fn round_trip(text: &str, ty: NumericType) -> anyhow::Result<()> {
    let words = common::parse(text, ty)?;
    assert_eq!(disasm::format_literal(&words, ty)?, text, "{}", ty);
    Ok(())
}

#[test]
fn integers() -> anyhow::Result<()> {
    common::init_logging();
    let cases: &[(&str, u32, bool)] = &[
        ("0", 16, false),
        ("65535", 16, false),
        ("-32768", 16, true),
        ("32767", 16, true),
        ("0", 32, false),
        ("4294967295", 32, false),
        ("2147483647", 32, true),
        ("-2147483648", 32, true),
        ("0", 48, false),
        ("281474976710655", 48, false),
        ("140737488355327", 48, true),
        ("-140737488355328", 48, true),
        ("0", 64, false),
        ("18446744073709551615", 64, false),
        ("9223372036854775807", 64, true),
        ("-9223372036854775808", 64, true),
    ];
    for &(text, width, signed) in cases {
        round_trip(text, int(width, signed))?;
    }
    Ok(())
}

#[test]
fn finite_floats() -> anyhow::Result<()> {
    common::init_logging();
    for text in &["0", "13.5", "-12.5"] {
        round_trip(text, float(32))?;
    }
    for text in &["0", "1.79769e+308", "-1.79769e+308"] {
        round_trip(text, float(64))?;
    }
    Ok(())
}

#[test]
fn non_finite_floats() -> anyhow::Result<()> {
    common::init_logging();
    let singles = &[
        "-0x1p+128",
        "0x1p+128",
        "-0x1.8p+128",
        "-0x1.0002p+128",
        "-0x1.0018p+128",
        "-0x1.01ep+128",
        "-0x1.fffffep+128",
        "0x1.8p+128",
        "0x1.0002p+128",
        "0x1.0018p+128",
        "0x1.01ep+128",
        "0x1.fffffep+128",
    ];
    for text in singles {
        round_trip(text, float(32))?;
    }

    let doubles = &[
        "-0x1p+1024",
        "0x1p+1024",
        "-0x1.8p+1024",
        "-0x1.0fp+1024",
        "-0x1.0000000000001p+1024",
        "-0x1.00003p+1024",
        "-0x1.fffffffffffffp+1024",
        "0x1.8p+1024",
        "0x1.0fp+1024",
        "0x1.0000000000001p+1024",
        "0x1.00003p+1024",
        "0x1.fffffffffffffp+1024",
    ];
    for text in doubles {
        round_trip(text, float(64))?;
    }
    Ok(())
}

#[test]
fn half_floats() -> anyhow::Result<()> {
    common::init_logging();
    for text in &["0", "-0", "1.5", "0.1", "-2", "0x1p+16", "-0x1.2p+16"] {
        round_trip(text, float(16))?;
    }
    Ok(())
}

#[test]
fn pipeline() -> anyhow::Result<()> {
    common::init_logging();
    let source = "0 -32768 ; bounds\n32767 0x7fff";
    let ty = int(16, true);
    let words = assembler::encode(source, ty)?;
    assert_eq!(words, vec![0, 0xFFFF_8000, 0x7FFF, 0x7FFF]);
    assert_eq!(assembler::decode(&words, ty)?, "0 -32768 32767 32767");
    Ok(())
}
