use super::tokenize;
use crate::assembler::{
    diag::{Diagnostic, LiteralError},
    disasm,
};
use crate::spec::types::schema;
use derive_more::Constructor;
use std::fmt::Display;

/*
    Phases:

        1.  Tokenization: The source is split into lines, comments (`;` to the end of the line)
            are dropped, and each line is split at whitespace into words. A word beginning with
            '"' runs to the matching unescaped '"' and may contain whitespace. Every word keeps
            the (1-based) line and column it started at.

        2.  Literal parsing: Each word is matched against the numeric literal grammar for the
            declared `NumericType` (raw bits, hex float, hex integer, decimal integer, decimal
            float, in that order), producing a `Value`, or a mask expression is resolved
            against the enumerant grammar.

        3.  Packing: The `Value` is range checked against the declared width and split into
            32-bit words, low-order word first, sign or zero extending the unused high bits.

    Disassembly runs the other way: the words are unpacked into a `Value` (checking the
    padding bits) and formatted as the unique canonical text which parses back to the same
    words.
*/

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    Tokenize(Located<tokenize::Error>),
    Schema(schema::Error),
    /// Only reachable with a soft `Reporter`, which never says which token failed.
    Unmatched,
    Diagnostic(Diagnostic),
    Disassemble(disasm::Error),
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Tokenize(err) => write!(f, "Tokenize error: {}", err),
            Error::Schema(err) => write!(f, "Type error: {}", err),
            Error::Unmatched => write!(f, "Literal error: token did not match"),
            Error::Diagnostic(diag) => write!(f, "Literal error: {}", diag),
            Error::Disassemble(err) => write!(f, "Disassemble error: {}", err),
        }
    }
}

impl std::error::Error for Error {}

impl From<Located<tokenize::Error>> for Error {
    fn from(err: Located<tokenize::Error>) -> Self {
        Error::Tokenize(err)
    }
}

impl From<schema::Error> for Error {
    fn from(err: schema::Error) -> Self {
        Error::Schema(err)
    }
}

impl From<Diagnostic> for Error {
    fn from(diag: Diagnostic) -> Self {
        Error::Diagnostic(diag)
    }
}

impl From<LiteralError> for Error {
    fn from(err: LiteralError) -> Self {
        match err {
            LiteralError::NoMatch => Error::Unmatched,
            LiteralError::Invalid(diag) => Error::Diagnostic(diag),
        }
    }
}

impl From<disasm::Error> for Error {
    fn from(err: disasm::Error) -> Self {
        Error::Disassemble(err)
    }
}

#[derive(Debug, PartialEq, Clone, Copy, Eq, Constructor)]
pub struct Loc {
    line: usize,
    col: usize,
}

impl Loc {
    pub fn line(&self) -> usize {
        self.line
    }

    pub fn col(&self) -> usize {
        self.col
    }
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Located<T: Sized> {
    loc: Option<Loc>,
    val: T,
}

impl Display for Loc {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "(line: {}, col: {})", self.line, self.col)
    }
}

impl<T: Display> Display for Located<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.loc {
            None => write!(f, "@<unknown location>: {}", self.val),
            Some(loc) => write!(f, "@{}: {}", loc, self.val),
        }
    }
}

impl<T> Located<T> {
    fn new(loc: Option<Loc>, val: T) -> Self {
        Located { loc, val }
    }

    pub fn with_loc(loc: Loc, val: T) -> Self {
        Located::new(Some(loc), val)
    }

    pub fn loc(&self) -> Option<Loc> {
        self.loc
    }
}

impl<T> std::ops::Deref for Located<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.val
    }
}

impl<T> From<T> for Located<T> {
    fn from(val: T) -> Self {
        Located { loc: None, val }
    }
}
