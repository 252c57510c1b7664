#![allow(dead_code)]

use irasm::{
    assembler::{
        diag::{LiteralError, Reporter},
        literal,
        phases::types::Located,
    },
    spec::types::{hw::Word, schema::NumericType},
};

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn int(width: u32, signed: bool) -> NumericType {
    NumericType::int(width, signed).unwrap()
}

pub fn float(width: u32) -> NumericType {
    NumericType::float(width).unwrap()
}

pub fn parse(text: &str, ty: NumericType) -> Result<Vec<Word>, LiteralError> {
    literal::parse_literal(&Located::from(text), ty, &Reporter::soft("bad literal: "))
}
