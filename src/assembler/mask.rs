use super::{
    diag::{Diagnostic, DiagnosticKind},
    phases::types::Located,
};
use crate::spec::{
    defs::enumerant::MaskFlags,
    grammar::{Grammar, MaskCategory, ValueCategory},
};
use itertools::Itertools;
use log::{debug, trace};
use std::fmt::Display;

pub type MaskValue = u32;

pub const MASK_SEPARATOR: &str = "|";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    EmptyExpression(MaskCategory),
    /// A leading, trailing or doubled separator. Carries the whole expression.
    EmptyComponent(MaskCategory, String),
    UnknownName(MaskCategory, String),
    UnnamedBits(MaskCategory, MaskValue),
    UnknownEnumerant(ValueCategory, String),
    UnnamedValue(ValueCategory, u32),
}

impl Error {
    pub fn kind(&self) -> DiagnosticKind {
        match self {
            Error::UnknownEnumerant(..) | Error::UnnamedValue(..) => {
                DiagnosticKind::UnknownEnumerant
            }
            _ => DiagnosticKind::MalformedMask,
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::EmptyExpression(category) => write!(f, "Invalid {} operand ''.", category),
            Error::EmptyComponent(category, expression) => write!(
                f,
                "Invalid {} operand '{}': empty name between separators.",
                category, expression
            ),
            Error::UnknownName(category, name) => {
                write!(f, "Invalid {} operand '{}'.", category, name)
            }
            Error::UnnamedBits(category, bits) => {
                write!(f, "Invalid {} operand bits {:#x}.", category, bits)
            }
            Error::UnknownEnumerant(category, name) => {
                write!(f, "Invalid {} '{}'.", category, name)
            }
            Error::UnnamedValue(category, value) => write!(f, "Invalid {} {}.", category, value),
        }
    }
}

impl std::error::Error for Error {}

/// ORs together the `|`-separated enumerant names of `category`. Order and repetition do
/// not matter.
pub fn parse_mask(category: MaskCategory, expression: &str) -> Result<MaskValue, Error> {
    if expression.is_empty() {
        return Err(Error::EmptyExpression(category));
    }

    let grammar = Grammar::get();
    expression
        .split(MASK_SEPARATOR)
        .try_fold(0, |mask, name| {
            if name.is_empty() {
                return Err(Error::EmptyComponent(category, expression.to_owned()));
            }

            grammar
                .lookup_mask(category, name)
                .map(|bits| mask | bits)
                .ok_or_else(|| Error::UnknownName(category, name.to_owned()))
        })
}

fn located_diagnostic(token: &Located<&str>, err: Error) -> Diagnostic {
    let diag = Diagnostic::new(err.kind(), err.to_string(), token.loc());
    debug!("{}", diag);
    diag
}

pub fn resolve_mask(token: &Located<&str>, category: MaskCategory) -> Result<MaskValue, Diagnostic> {
    let mask = parse_mask(category, **token).map_err(|err| located_diagnostic(token, err))?;
    trace!("{} mask '{}' = {:#x}", category, **token, mask);
    Ok(mask)
}

/// The canonical text of `mask`: `None` when empty, otherwise the names of the set bits in
/// declaration order.
pub fn format_mask(category: MaskCategory, mask: MaskValue) -> Result<String, Error> {
    let enumerants = Grammar::get().mask_enumerants(category);

    if mask == 0 {
        return enumerants
            .iter()
            .find(|e| e.value == 0)
            .map(|e| e.name.to_owned())
            .ok_or(Error::UnnamedBits(category, 0));
    }

    let named = enumerants
        .iter()
        .filter(|e| e.value != 0 && mask & e.value == e.value);
    let covered = named.clone().fold(0, |acc, e| acc | e.value);
    if covered != mask {
        return Err(Error::UnnamedBits(category, mask & !covered));
    }

    Ok(named.map(|e| e.name).join(MASK_SEPARATOR))
}

pub fn parse_flags<F: MaskFlags>(expression: &str) -> Result<F, Error> {
    let mask = parse_mask(F::CATEGORY, expression)?;
    F::from_mask_bits(mask).ok_or(Error::UnnamedBits(F::CATEGORY, mask))
}

pub fn format_flags<F: MaskFlags>(flags: F) -> Result<String, Error> {
    format_mask(F::CATEGORY, flags.mask_bits())
}

/// Looks up a single enumerant name; unlike masks there is no `|` syntax.
pub fn parse_enumerant(category: ValueCategory, word: &str) -> Result<u32, Error> {
    Grammar::get()
        .lookup_value(category, word)
        .ok_or_else(|| Error::UnknownEnumerant(category, word.to_owned()))
}

pub fn resolve_enumerant(token: &Located<&str>, category: ValueCategory) -> Result<u32, Diagnostic> {
    parse_enumerant(category, **token).map_err(|err| located_diagnostic(token, err))
}

pub fn format_enumerant(category: ValueCategory, value: u32) -> Result<&'static str, Error> {
    Grammar::get()
        .value_name(category, value)
        .ok_or(Error::UnnamedValue(category, value))
}
