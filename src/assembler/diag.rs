use super::phases::types::{Loc, Located};
use derive_more::Display;
use log::{debug, trace};
use std::fmt;

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
    #[display(fmt = "unrecognized literal")]
    Unrecognized,
    #[display(fmt = "value out of range")]
    OutOfRange,
    #[display(fmt = "malformed hex float")]
    MalformedHexFloat,
    #[display(fmt = "malformed literal")]
    MalformedLiteral,
    #[display(fmt = "malformed mask")]
    MalformedMask,
    #[display(fmt = "unknown enumerant")]
    UnknownEnumerant,
}

/// A positioned, fully composed error message. Only ever produced for a hard failure, and
/// handed back to the caller that asked for the parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    kind: DiagnosticKind,
    message: String,
    loc: Option<Loc>,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, message: String, loc: Option<Loc>) -> Self {
        Diagnostic { kind, message, loc }
    }

    pub fn kind(&self) -> DiagnosticKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn loc(&self) -> Option<Loc> {
        self.loc
    }

    /// `(line, column)`, both 1-based.
    pub fn position(&self) -> Option<(usize, usize)> {
        self.loc.map(|loc| (loc.line(), loc.col()))
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.loc {
            None => write!(f, "@<unknown location>: {}", self.message),
            Some(loc) => write!(f, "@{}: {}", loc, self.message),
        }
    }
}

impl std::error::Error for Diagnostic {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LiteralError {
    /// The token does not have the shape of the requested literal at all. Never carries a
    /// diagnostic, so the caller is free to try another interpretation.
    NoMatch,
    /// The token was meant as this kind of literal, but is unusable.
    Invalid(Diagnostic),
}

impl LiteralError {
    pub fn diagnostic(&self) -> Option<&Diagnostic> {
        match self {
            LiteralError::NoMatch => None,
            LiteralError::Invalid(diag) => Some(diag),
        }
    }
}

impl fmt::Display for LiteralError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LiteralError::NoMatch => write!(f, "token does not match the expected literal"),
            LiteralError::Invalid(diag) => write!(f, "{}", diag),
        }
    }
}

impl std::error::Error for LiteralError {}

/// What a token which doesn't match at all should turn into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureMode {
    /// The operand is optional: report `NoMatch` and stay quiet.
    Soft,
    /// The operand is required: a mismatch is as bad as any other invalid literal.
    Hard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reporter<'a> {
    prefix: &'a str,
    mode: FailureMode,
}

impl<'a> Reporter<'a> {
    pub fn new(prefix: &'a str, mode: FailureMode) -> Self {
        Reporter { prefix, mode }
    }

    pub fn soft(prefix: &'a str) -> Self {
        Reporter::new(prefix, FailureMode::Soft)
    }

    pub fn hard(prefix: &'a str) -> Self {
        Reporter::new(prefix, FailureMode::Hard)
    }

    /// The token has none of the accepted shapes.
    pub fn mismatch(&self, token: &Located<&str>) -> LiteralError {
        match self.mode {
            FailureMode::Soft => {
                trace!("no match for '{}'", **token);
                LiteralError::NoMatch
            }
            FailureMode::Hard => self.invalid(DiagnosticKind::Unrecognized, token),
        }
    }

    /// The token has an accepted shape but breaks a later constraint.
    pub fn invalid(&self, kind: DiagnosticKind, token: &Located<&str>) -> LiteralError {
        LiteralError::Invalid(self.diagnostic(kind, token))
    }

    pub fn diagnostic(&self, kind: DiagnosticKind, token: &Located<&str>) -> Diagnostic {
        let diag = Diagnostic::new(kind, format!("{}{}", self.prefix, **token), token.loc());
        debug!("{} ({})", diag, kind);
        diag
    }
}
