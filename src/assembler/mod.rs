pub mod diag;
pub mod disasm;
pub mod hexfloat;
pub mod literal;
pub mod mask;
pub mod pack;
pub mod phases;

pub use phases::types::Error;

use crate::common;
use crate::spec::{
    grammar::Grammar,
    types::{hw::Word, schema::NumericType},
};
use diag::{Diagnostic, LiteralError, Reporter};
use log::trace;
use pack::Value;
use static_assertions::assert_impl_all;

assert_impl_all!(Error: Send, Sync);
assert_impl_all!(Diagnostic: Send, Sync);
assert_impl_all!(LiteralError: Send, Sync);
assert_impl_all!(Reporter<'static>: Send, Sync);
assert_impl_all!(Value: Send, Sync);
assert_impl_all!(NumericType: Send, Sync);
assert_impl_all!(Grammar: Send, Sync);

/// Assembles every whitespace-separated literal of `source` as a `ty`, concatenating their
/// words. Every token is required, so the first unusable one is reported with its position.
pub fn encode(source: &str, ty: NumericType) -> Result<Vec<Word>, Error> {
    let prefix = format!("Invalid {} literal: ", ty);
    let reporter = Reporter::hard(&prefix);

    let tokens = phases::tokenize(source)?;
    common::accumulate_vecs(tokens.iter().map(|token| -> Result<Vec<Word>, Error> {
        let words = literal::parse_literal(token, ty, &reporter)?;
        trace!("{} -> {:#010X?}", token, words);
        Ok(words)
    }))
}

/// Disassembles `words` as consecutive literals of `ty`, separated by single spaces.
pub fn decode(words: &[Word], ty: NumericType) -> Result<String, Error> {
    let texts = words
        .chunks(ty.word_count())
        .map(|chunk| disasm::format_literal(chunk, ty))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(texts.join(" "))
}
