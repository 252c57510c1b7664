use super::{
    hexfloat, literal,
    pack::{self, Value},
};
use crate::spec::types::{
    hw::{self, Word},
    schema::{FloatFormat, NumericKind, NumericType},
};
use std::fmt::Display;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    Unpack(pack::Error),
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Unpack(err) => write!(f, "cannot disassemble literal: {}", err),
        }
    }
}

impl std::error::Error for Error {}

impl From<pack::Error> for Error {
    fn from(err: pack::Error) -> Self {
        Error::Unpack(err)
    }
}

/// Exact, since every half is representable as a single.
fn f16_bits_to_f32(bits: u16) -> f32 {
    let sign = if bits & 0x8000 != 0 { -1.0 } else { 1.0 };
    let exponent = i32::from((bits >> 10) & 0x1F);
    let fraction = f32::from(bits & 0x3FF);

    if exponent == 0 {
        sign * fraction * 2f32.powi(-24)
    } else {
        sign * (1024.0 + fraction) * 2f32.powi(exponent - 25)
    }
}

// Halves have no native `{:e}`, so look for the fewest significant digits (five always
// suffice) which read back as the same half.
fn shortest_half(bits: u16) -> String {
    let x = f64::from(f16_bits_to_f32(bits));
    (0..5)
        .map(|precision| format!("{:.*e}", precision, x))
        .find(|text| {
            text.parse::<f64>()
                .map_or(false, |y| literal::f64_to_f16_bits(y) == bits)
        })
        .unwrap_or_else(|| format!("{:e}", x))
}

/// Lays out the output of `{:e}` (the shortest digits which round trip, e.g. `1.25e-7`) the
/// way `%g` would: positional when the decimal exponent is in `-4..max(6, digits)`, otherwise
/// scientific with a signed, at least two digit exponent.
fn layout_decimal(scientific: &str) -> String {
    let (mantissa, exponent) = match scientific.find('e') {
        Some(at) => (&scientific[..at], &scientific[at + 1..]),
        None => (scientific, "0"),
    };
    let exponent: i32 = exponent.parse().unwrap_or(0);

    let (negative, mantissa) = match mantissa.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, mantissa),
    };
    let digits: String = mantissa.chars().filter(|c| *c != '.').collect();

    let mut text = String::new();
    if negative {
        text.push('-');
    }

    if digits.bytes().all(|b| b == b'0') {
        text.push('0');
        return text;
    }

    let precision = digits.len().max(6) as i32;
    if exponent < -4 || exponent >= precision {
        let (lead, rest) = digits.split_at(1);
        text.push_str(lead);
        if !rest.is_empty() {
            text.push('.');
            text.push_str(rest);
        }
        let sign = if exponent < 0 { '-' } else { '+' };
        text.push_str(&format!("e{}{:02}", sign, exponent.abs()));
    } else if exponent < 0 {
        text.push_str("0.");
        text.push_str(&"0".repeat((-exponent - 1) as usize));
        text.push_str(&digits);
    } else {
        let point = exponent as usize + 1;
        if digits.len() <= point {
            text.push_str(&digits);
            text.push_str(&"0".repeat(point - digits.len()));
        } else {
            text.push_str(&digits[..point]);
            text.push('.');
            text.push_str(&digits[point..]);
        }
    }

    text
}

fn format_float(bits: u64, fmt: FloatFormat) -> String {
    let (_, exponent, _) = fmt.fields(bits);
    if exponent == fmt.exponent_field_max() {
        if let Some(text) = hexfloat::format(bits, fmt) {
            return text;
        }
    }

    let scientific = match fmt {
        FloatFormat::Half => shortest_half(bits as u16),
        FloatFormat::Single => format!("{:e}", f32::from_bits(bits as u32)),
        FloatFormat::Double => format!("{:e}", f64::from_bits(bits)),
    };
    layout_decimal(&scientific)
}

/// The canonical text of `value` as a literal of `ty`.
pub fn format_value(value: Value, ty: NumericType) -> Result<String, Error> {
    let bits = pack::to_bits(value, ty)?;
    Ok(match ty.kind() {
        NumericKind::Int { signed: true } => {
            (hw::sign_extend(bits, ty.width()) as i128).to_string()
        }
        NumericKind::Int { signed: false } => bits.to_string(),
        NumericKind::Float(fmt) => format_float(bits as u64, fmt),
    })
}

/// The canonical text of the literal `words` encode, which `parse_literal` turns back into
/// the same words.
pub fn format_literal(words: &[Word], ty: NumericType) -> Result<String, Error> {
    format_value(pack::unpack(words, ty)?, ty)
}
