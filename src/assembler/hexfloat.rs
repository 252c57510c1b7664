//! The `[-]0x1[.<hex>]p[+|-]<exp>` floating point syntax.
//!
//! Unlike decimal notation this names an exact bit pattern, so it is also how infinities and
//! NaN payloads are written: any exponent above the format's largest normal exponent selects
//! the all-ones exponent field, and the mantissa digits become the payload verbatim.

use crate::spec::types::schema::FloatFormat;
use std::fmt::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    MissingLeadingOne,
    EmptyFraction,
    InvalidFractionDigit,
    FractionTooLong,
    MissingExponent,
    InvalidExponent,
    /// Too small to represent without dropping significand bits.
    Inexact,
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::MissingLeadingOne => write!(f, "the leading mantissa digit must be '1'"),
            Error::EmptyFraction => write!(f, "expected hex digits after '.'"),
            Error::InvalidFractionDigit => write!(f, "invalid hex digit in mantissa"),
            Error::FractionTooLong => write!(f, "mantissa has more bits than the format holds"),
            Error::MissingExponent => write!(f, "expected a 'p' exponent"),
            Error::InvalidExponent => write!(f, "invalid decimal exponent"),
            Error::Inexact => write!(f, "value is too small to represent exactly"),
        }
    }
}

fn is_exponent_marker(c: char) -> bool {
    c == 'p' || c == 'P'
}

// Exponents this large are already far outside every format.
const EXPONENT_CLAMP: i64 = 1 << 20;

fn parse_fraction(digits: &str, fmt: FloatFormat) -> Result<u64, Error> {
    if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(Error::InvalidFractionDigit);
    }

    let digits = digits.trim_end_matches('0');
    let fb = fmt.fraction_bits();
    let given_bits = digits.len() as u32 * 4;
    if given_bits > (fb + 3) / 4 * 4 {
        return Err(Error::FractionTooLong);
    }

    if digits.is_empty() {
        return Ok(0);
    }

    let value = u64::from_str_radix(digits, 16).map_err(|_| Error::InvalidFractionDigit)?;
    if given_bits > fb {
        let shift = given_bits - fb;
        if value & ((1 << shift) - 1) != 0 {
            return Err(Error::FractionTooLong);
        }
        Ok(value >> shift)
    } else {
        Ok(value << (fb - given_bits))
    }
}

fn parse_exponent(text: &str) -> Result<i32, Error> {
    let (negative, digits) = match text.as_bytes().first() {
        Some(b'+') => (false, &text[1..]),
        Some(b'-') => (true, &text[1..]),
        _ => (false, text),
    };

    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Error::InvalidExponent);
    }

    let magnitude = digits
        .parse::<i64>()
        .unwrap_or(EXPONENT_CLAMP)
        .min(EXPONENT_CLAMP) as i32;
    Ok(if negative { -magnitude } else { magnitude })
}

/// Parses the text following `0x` (the sign has already been stripped) into a bit pattern
/// of `fmt`.
pub fn parse(body: &str, negative: bool, fmt: FloatFormat) -> Result<u64, Error> {
    let rest = body.strip_prefix('1').ok_or(Error::MissingLeadingOne)?;
    if rest.starts_with(|c: char| c.is_ascii_hexdigit()) {
        return Err(Error::MissingLeadingOne);
    }

    let (fraction_digits, rest) = match rest.strip_prefix('.') {
        Some(rest) => {
            let end = rest.find(is_exponent_marker).unwrap_or_else(|| rest.len());
            let (digits, rest) = rest.split_at(end);
            if digits.is_empty() {
                return Err(Error::EmptyFraction);
            }
            (digits, rest)
        }
        None => ("", rest),
    };

    let exponent_text = rest
        .strip_prefix(is_exponent_marker)
        .ok_or(Error::MissingExponent)?;

    let fraction = parse_fraction(fraction_digits, fmt)?;
    let exponent = parse_exponent(exponent_text)?;

    if exponent > fmt.max_exponent() {
        return Ok(fmt.assemble(negative, fmt.exponent_field_max(), fraction));
    }

    if exponent >= fmt.min_exponent() {
        let biased = (exponent + fmt.bias()) as u64;
        return Ok(fmt.assemble(negative, biased, fraction));
    }

    let fb = fmt.fraction_bits();
    let shift = (fmt.min_exponent() - exponent) as u32;
    if shift > fb {
        return Err(Error::Inexact);
    }

    let significand = (1u64 << fb) | fraction;
    if significand & ((1 << shift) - 1) != 0 {
        return Err(Error::Inexact);
    }

    Ok(fmt.assemble(negative, 0, significand >> shift))
}

/// Formats a bit pattern of `fmt` so that `parse` reproduces it exactly. Infinities and NaNs
/// use the exponent one past the largest normal exponent.
///
/// Returns `None` for zeroes, which have no `0x1...` spelling.
pub fn format(bits: u64, fmt: FloatFormat) -> Option<String> {
    let (negative, exponent_field, fraction) = fmt.fields(bits);
    let fb = fmt.fraction_bits();

    let (exponent, fraction) = if exponent_field == fmt.exponent_field_max() {
        (fmt.max_exponent() + 1, fraction)
    } else if exponent_field != 0 {
        (exponent_field as i32 - fmt.bias(), fraction)
    } else if fraction != 0 {
        // Subnormal: renormalise so the leading set bit becomes the implicit one.
        let lead = 63 - fraction.leading_zeros();
        let shift = fb - lead;
        (
            fmt.min_exponent() - shift as i32,
            (fraction << shift) & fmt.fraction_mask(),
        )
    } else {
        return None;
    };

    let mut text = String::new();
    if negative {
        text.push('-');
    }
    text.push_str("0x1");

    if fraction != 0 {
        let pad = (4 - fb % 4) % 4;
        let width = ((fb + pad) / 4) as usize;
        let digits = format!("{:0width$x}", fraction << pad, width = width);
        text.push('.');
        text.push_str(digits.trim_end_matches('0'));
    }

    text.push_str(&format!("p{:+}", exponent));
    Some(text)
}
