use super::{
    diag::{DiagnosticKind, LiteralError, Reporter},
    hexfloat,
    pack::{self, Value},
    phases::types::Located,
};
use crate::spec::types::{
    hw::Word,
    schema::{FloatFormat, NumericType},
};
use derive_more::Display;
use log::trace;
use std::cmp::Ordering;

/// The literal forms, in the order they are tried.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum Syntax {
    #[display(fmt = "raw bits")]
    RawBits,
    #[display(fmt = "hex float")]
    HexFloat,
    #[display(fmt = "hex integer")]
    HexInt,
    #[display(fmt = "decimal integer")]
    DecimalInt,
    #[display(fmt = "decimal float")]
    DecimalFloat,
}

/// `None` when the text does not have this form at all, otherwise the value or the reason a
/// text of this form is unusable.
type Matcher = fn(&str, NumericType) -> Option<Result<Value, DiagnosticKind>>;

const MATCHERS: [(Syntax, Matcher); 5] = [
    (Syntax::RawBits, match_raw_bits),
    (Syntax::HexFloat, match_hex_float),
    (Syntax::HexInt, match_hex_int),
    (Syntax::DecimalInt, match_decimal_int),
    (Syntax::DecimalFloat, match_decimal_float),
];

const RAW_BITS_CHAR: char = '!';

fn split_sign(text: &str) -> (bool, &str) {
    match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    }
}

fn strip_hex_prefix(text: &str) -> Option<&str> {
    text.strip_prefix("0x").or_else(|| text.strip_prefix("0X"))
}

fn is_hex_digits(text: &str) -> bool {
    !text.is_empty() && text.bytes().all(|b| b.is_ascii_hexdigit())
}

fn is_decimal_digits(text: &str) -> bool {
    !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit())
}

fn parse_magnitude(digits: &str, radix: u32) -> Result<u128, DiagnosticKind> {
    u128::from_str_radix(digits, radix).map_err(|_| DiagnosticKind::OutOfRange)
}

fn negate(magnitude: u128) -> Result<Value, DiagnosticKind> {
    const MIN_MAGNITUDE: u128 = 1 << 127;
    match magnitude {
        MIN_MAGNITUDE => Ok(Value::Signed(i128::MIN)),
        m if m < MIN_MAGNITUDE => Ok(Value::Signed(-(m as i128))),
        _ => Err(DiagnosticKind::OutOfRange),
    }
}

fn match_raw_bits(text: &str, _ty: NumericType) -> Option<Result<Value, DiagnosticKind>> {
    let body = text.strip_prefix(RAW_BITS_CHAR)?;
    Some(match strip_hex_prefix(body) {
        Some(digits) if is_hex_digits(digits) => parse_magnitude(digits, 16).map(Value::Bits),
        _ => Err(DiagnosticKind::MalformedLiteral),
    })
}

fn match_hex_float(text: &str, ty: NumericType) -> Option<Result<Value, DiagnosticKind>> {
    let fmt = ty.float_format()?;
    let (negative, rest) = split_sign(text);
    let body = strip_hex_prefix(rest)?;

    Some(
        hexfloat::parse(body, negative, fmt)
            .map(|bits| Value::Bits(bits as u128))
            .map_err(|err| {
                trace!("hex float '{}': {}", text, err);
                match err {
                    hexfloat::Error::Inexact => DiagnosticKind::OutOfRange,
                    _ => DiagnosticKind::MalformedHexFloat,
                }
            }),
    )
}

fn match_hex_int(text: &str, ty: NumericType) -> Option<Result<Value, DiagnosticKind>> {
    if ty.is_float() {
        return None;
    }

    let (negative, rest) = split_sign(text);
    let digits = strip_hex_prefix(rest).filter(|digits| is_hex_digits(digits))?;

    Some(parse_magnitude(digits, 16).and_then(|magnitude| {
        if negative {
            negate(magnitude)
        } else {
            Ok(Value::Bits(magnitude))
        }
    }))
}

fn match_decimal_int(text: &str, ty: NumericType) -> Option<Result<Value, DiagnosticKind>> {
    if ty.is_float() {
        return None;
    }

    let (negative, digits) = split_sign(text);
    if !is_decimal_digits(digits) {
        return None;
    }

    Some(parse_magnitude(digits, 10).and_then(|magnitude| {
        if negative {
            negate(magnitude)
        } else {
            Ok(Value::Unsigned(magnitude))
        }
    }))
}

/// `[-]<digits>[.<digits>][e|E[+|-]<digits>]`, where either side of the point may be empty
/// but not both. Keeps `inf`, `nan` and a leading `+` away from the standard library parser,
/// which would accept them.
fn is_decimal_float(text: &str) -> bool {
    let (_, rest) = split_sign(text);
    let (mantissa, exponent) = match rest.find(|c| c == 'e' || c == 'E') {
        Some(at) => (&rest[..at], Some(&rest[at + 1..])),
        None => (rest, None),
    };

    let mantissa_ok = match mantissa.find('.') {
        Some(at) => {
            let (int, frac) = (&mantissa[..at], &mantissa[at + 1..]);
            (int.is_empty() || is_decimal_digits(int))
                && (frac.is_empty() || is_decimal_digits(frac))
                && !(int.is_empty() && frac.is_empty())
        }
        None => is_decimal_digits(mantissa),
    };

    let exponent_ok = match exponent {
        None => true,
        Some(exponent) => {
            let digits = exponent
                .strip_prefix('+')
                .or_else(|| exponent.strip_prefix('-'))
                .unwrap_or(exponent);
            is_decimal_digits(digits)
        }
    };

    mantissa_ok && exponent_ok
}

/// Rounds to the nearest half precision value, ties to even. Values past the largest finite
/// half round to infinity.
pub(crate) fn f64_to_f16_bits(x: f64) -> u16 {
    round_to_half(x, || Ordering::Equal)
}

/// As `f64_to_f16_bits`, except that when `x` lies exactly halfway between two halves,
/// `break_tie` says whether the value `x` stands for is really above, below or on it.
fn round_to_half(x: f64, break_tie: impl FnOnce() -> Ordering) -> u16 {
    let bits = x.to_bits();
    let sign = ((bits >> 48) & 0x8000) as u16;
    let exponent = ((bits >> 52) & 0x7FF) as i32;
    let fraction = bits & 0x000F_FFFF_FFFF_FFFF;

    if exponent == 0x7FF {
        return sign | 0x7C00 | if fraction != 0 { 0x0200 } else { 0 };
    }

    // Double subnormals are far below the smallest half subnormal.
    if exponent == 0 {
        return sign;
    }

    let unbiased = exponent - 1023;
    if unbiased > 15 {
        return sign | 0x7C00;
    }

    let significand = fraction | (1 << 52);
    let target = unbiased.max(-14);
    let shift = (42 + target - unbiased) as u32;
    if shift > 63 {
        return sign;
    }

    let mut m = significand >> shift;
    let rem = significand & ((1 << shift) - 1);
    let halfway = 1u64 << (shift - 1);
    let round_up = match rem.cmp(&halfway) {
        Ordering::Greater => true,
        Ordering::Less => false,
        Ordering::Equal => match break_tie() {
            Ordering::Equal => m & 1 == 1,
            side => side == Ordering::Greater,
        },
    };
    if round_up {
        m += 1;
    }

    // A carry out of the significand bumps the exponent, up to infinity if need be.
    let magnitude = if m >= 1 << 10 {
        (((target + 15) as u64) << 10) + (m - (1 << 10))
    } else {
        m
    };

    sign | magnitude as u16
}

/// The significant digits of an unsigned decimal (no leading or trailing zeros), and the
/// power of ten just above the first of them, so that `0.<digits> * 10^power` is the value.
fn significant_digits(text: &str) -> Option<(String, i64)> {
    let (mantissa, exponent) = match text.find(|c| c == 'e' || c == 'E') {
        Some(at) => (&text[..at], text[at + 1..].parse::<i64>().ok()?),
        None => (text, 0),
    };
    let (int, frac) = match mantissa.find('.') {
        Some(at) => (&mantissa[..at], &mantissa[at + 1..]),
        None => (mantissa, ""),
    };

    let digits = format!("{}{}", int, frac);
    let significant = digits.trim_start_matches('0');
    let leading = (digits.len() - significant.len()) as i64;
    let power = (int.len() as i64 - leading).checked_add(exponent)?;
    Some((significant.trim_end_matches('0').to_owned(), power))
}

/// Compares the magnitude of the decimal `text` with that of `tie`, a midpoint between two
/// halves. Such midpoints are multiples of 2^-25, so 25 places print them exactly.
fn compare_with_tie(text: &str, tie: f64) -> Ordering {
    let (_, text) = split_sign(text);
    let tie = format!("{:.25}", tie.abs());

    match (significant_digits(text), significant_digits(&tie)) {
        (Some((digits, power)), Some((tie_digits, tie_power))) => power
            .cmp(&tie_power)
            .then_with(|| digits.cmp(&tie_digits)),
        _ => Ordering::Equal,
    }
}

/// Rounds the decimal `text`, already read as the double `x`, straight to half precision. A
/// text just off a midpoint between two halves can read as a double exactly on it, so such
/// ties are settled by the digits of `text` rather than by rounding to even.
fn decimal_to_f16_bits(text: &str, x: f64) -> u16 {
    round_to_half(x, || compare_with_tie(text, x))
}

fn match_decimal_float(text: &str, ty: NumericType) -> Option<Result<Value, DiagnosticKind>> {
    let fmt = ty.float_format()?;
    if !is_decimal_float(text) {
        return None;
    }

    let bits = match fmt {
        FloatFormat::Half => text
            .parse::<f64>()
            .ok()
            .filter(|x| x.is_finite())
            .map(|x| decimal_to_f16_bits(text, x))
            .filter(|bits| bits & 0x7C00 != 0x7C00)
            .map(u128::from),
        FloatFormat::Single => text
            .parse::<f32>()
            .ok()
            .filter(|x| x.is_finite())
            .map(|x| u128::from(x.to_bits())),
        FloatFormat::Double => text
            .parse::<f64>()
            .ok()
            .filter(|x| x.is_finite())
            .map(|x| u128::from(x.to_bits())),
    };

    Some(bits.map(Value::Bits).ok_or(DiagnosticKind::OutOfRange))
}

fn pack_error_kind(err: &pack::Error) -> DiagnosticKind {
    match err {
        pack::Error::OutOfRange(..) => DiagnosticKind::OutOfRange,
        _ => DiagnosticKind::MalformedLiteral,
    }
}

/// Recognises `token` as one of the literal forms accepted for `ty`, without laying it out in
/// words. The value is already known to fit in `ty`.
pub fn parse_value(
    token: &Located<&str>,
    ty: NumericType,
    reporter: &Reporter,
) -> Result<Value, LiteralError> {
    for (syntax, matcher) in MATCHERS.iter() {
        if let Some(result) = matcher(**token, ty) {
            trace!("'{}' is a {} for {}", **token, syntax, ty);
            let value = result.map_err(|kind| reporter.invalid(kind, token))?;
            pack::to_bits(value, ty).map_err(|err| reporter.invalid(pack_error_kind(&err), token))?;
            return Ok(value);
        }
    }

    Err(reporter.mismatch(token))
}

/// Parses `token` as a literal of `ty` and packs it into `ty.word_count()` words, low-order
/// word first.
pub fn parse_literal(
    token: &Located<&str>,
    ty: NumericType,
    reporter: &Reporter,
) -> Result<Vec<Word>, LiteralError> {
    let value = parse_value(token, ty, reporter)?;
    pack::pack(value, ty).map_err(|err| reporter.invalid(pack_error_kind(&err), token))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assembler::phases::types::Loc;

    fn int(width: u32, signed: bool) -> NumericType {
        NumericType::int(width, signed).unwrap()
    }

    fn float(width: u32) -> NumericType {
        NumericType::float(width).unwrap()
    }

    fn words(text: &str, ty: NumericType) -> Result<Vec<Word>, LiteralError> {
        parse_literal(&Located::from(text), ty, &Reporter::soft("bad: "))
    }

    fn kind(text: &str, ty: NumericType) -> Option<DiagnosticKind> {
        words(text, ty).unwrap_err().diagnostic().map(|diag| diag.kind())
    }

    #[test]
    fn narrow_ints() {
        let i16_ty = int(16, true);
        let u16_ty = int(16, false);
        assert_eq!(words("-32", i16_ty), Ok(vec![0xFFFF_FFE0]));
        assert_eq!(words("-0x20", i16_ty), Ok(vec![0xFFFF_FFE0]));
        assert_eq!(words("0x8000", i16_ty), Ok(vec![0xFFFF_8000]));
        assert_eq!(words("-32768", i16_ty), Ok(vec![0xFFFF_8000]));
        assert_eq!(words("32767", i16_ty), Ok(vec![0x0000_7FFF]));
        assert_eq!(words("65535", u16_ty), Ok(vec![0x0000_FFFF]));
        assert_eq!(words("0xffff", u16_ty), Ok(vec![0x0000_FFFF]));
        assert_eq!(words("-0", u16_ty), Ok(vec![0]));
        assert_eq!(words("-0x0", u16_ty), Ok(vec![0]));
    }

    #[test]
    fn narrow_int_ranges() {
        assert_eq!(kind("65536", int(16, false)), Some(DiagnosticKind::OutOfRange));
        assert_eq!(kind("32768", int(16, true)), Some(DiagnosticKind::OutOfRange));
        assert_eq!(kind("-32769", int(16, true)), Some(DiagnosticKind::OutOfRange));
        assert_eq!(kind("0x10000", int(16, true)), Some(DiagnosticKind::OutOfRange));
        assert_eq!(kind("-1", int(16, false)), Some(DiagnosticKind::OutOfRange));
        assert_eq!(kind("-0x8001", int(16, true)), Some(DiagnosticKind::OutOfRange));
    }

    #[test]
    fn wide_ints() {
        let i64_ty = int(64, true);
        assert_eq!(
            words("-9223372036854775808", i64_ty),
            Ok(vec![0x0000_0000, 0x8000_0000])
        );
        assert_eq!(
            words("18446744073709551615", int(64, false)),
            Ok(vec![0xFFFF_FFFF, 0xFFFF_FFFF])
        );
        assert_eq!(
            kind("18446744073709551616", int(64, false)),
            Some(DiagnosticKind::OutOfRange)
        );
        assert_eq!(
            words("0x800000000000", int(48, true)),
            Ok(vec![0x0000_0000, 0xFFFF_8000])
        );
        assert_eq!(
            kind("999999999999999999999999999999999999999999", i64_ty),
            Some(DiagnosticKind::OutOfRange)
        );
    }

    #[test]
    fn not_a_literal() {
        for text in &["", "abc", "0=", "1.5", "+1", "-", "0x", "0xg", "1e3", "- 1"] {
            assert_eq!(words(text, int(32, true)), Err(LiteralError::NoMatch), "{}", text);
        }
        for text in &["", "abc", "inf", "nan", "-inf", "+1.5", "1e", ".", "1.5.5", "e5"] {
            assert_eq!(words(text, float(32)), Err(LiteralError::NoMatch), "{}", text);
        }
    }

    #[test]
    fn raw_bits() {
        assert_eq!(words("!0x00000001", float(32)), Ok(vec![0x0000_0001]));
        assert_eq!(words("!0xff800001", float(32)), Ok(vec![0xFF80_0001]));
        assert_eq!(words("!0xFFFF", int(16, true)), Ok(vec![0xFFFF_FFFF]));
        assert_eq!(kind("!0x1FFFF", int(16, true)), Some(DiagnosticKind::OutOfRange));
        assert_eq!(kind("!0x", float(32)), Some(DiagnosticKind::MalformedLiteral));
        assert_eq!(kind("!12", int(32, false)), Some(DiagnosticKind::MalformedLiteral));
        assert_eq!(kind("!", int(32, false)), Some(DiagnosticKind::MalformedLiteral));
    }

    #[test]
    fn decimal_floats() {
        assert_eq!(words("13.5", float(32)), Ok(vec![0x4158_0000]));
        assert_eq!(words("-12.5", float(32)), Ok(vec![0xC148_0000]));
        assert_eq!(words("-0", float(32)), Ok(vec![0x8000_0000]));
        assert_eq!(words("1.", float(32)), Ok(vec![0x3F80_0000]));
        assert_eq!(words(".5", float(32)), Ok(vec![0x3F00_0000]));
        assert_eq!(words("1e+38", float(32)), Ok(vec![0x7E96_7699]));
        assert_eq!(words("1.5", float(64)), Ok(vec![0x0000_0000, 0x3FF8_0000]));
        assert_eq!(words("1.5", float(16)), Ok(vec![0x0000_3E00]));
        assert_eq!(words("65504", float(16)), Ok(vec![0x0000_7BFF]));
    }

    #[test]
    fn decimal_floats_out_of_range() {
        assert_eq!(kind("1e40", float(32)), Some(DiagnosticKind::OutOfRange));
        assert_eq!(kind("-1e40", float(32)), Some(DiagnosticKind::OutOfRange));
        assert_eq!(kind("1e400", float(64)), Some(DiagnosticKind::OutOfRange));
        assert_eq!(kind("65520", float(16)), Some(DiagnosticKind::OutOfRange));
    }

    #[test]
    fn hex_floats() {
        assert_eq!(words("0x1p+128", float(32)), Ok(vec![0x7F80_0000]));
        assert_eq!(words("-0x1.0002p+128", float(32)), Ok(vec![0xFF80_0100]));
        assert_eq!(
            words("0x1.8p+1024", float(64)),
            Ok(vec![0x0000_0000, 0x7FF8_0000])
        );
        assert_eq!(kind("0x1.fffffffp+0", float(32)), Some(DiagnosticKind::MalformedHexFloat));
        assert_eq!(kind("0x2p+0", float(32)), Some(DiagnosticKind::MalformedHexFloat));
        assert_eq!(kind("0x", float(32)), Some(DiagnosticKind::MalformedHexFloat));
        assert_eq!(kind("0x1p-150", float(32)), Some(DiagnosticKind::OutOfRange));
    }

    #[test]
    fn half_rounding() {
        assert_eq!(f64_to_f16_bits(1.0), 0x3C00);
        assert_eq!(f64_to_f16_bits(-2.0), 0xC000);
        assert_eq!(f64_to_f16_bits(0.1), 0x2E66);
        assert_eq!(f64_to_f16_bits(5.960_464_477_539_063e-8), 0x0001);
        // Exactly half of the smallest subnormal ties to even, which is zero.
        assert_eq!(f64_to_f16_bits(2.980_232_238_769_531_3e-8), 0x0000);
        assert_eq!(f64_to_f16_bits(6.103_515_625e-5), 0x0400);
        assert_eq!(f64_to_f16_bits(65519.0), 0x7BFF);
        assert_eq!(f64_to_f16_bits(65520.0), 0x7C00);
        assert_eq!(f64_to_f16_bits(1e-300), 0x0000);
    }

    #[test]
    fn half_decimals_round_once() {
        // 1 + 2^-11 is the midpoint of 0x3C00 and 0x3C01, and 1 + 3 * 2^-11 that of 0x3C01
        // and 0x3C02. Texts just off them read as exactly the midpoint in a double.
        assert_eq!(words("1.00048828125", float(16)), Ok(vec![0x0000_3C00]));
        assert_eq!(words("1.000488281250000000001", float(16)), Ok(vec![0x0000_3C01]));
        assert_eq!(words("1.000488281249999999999", float(16)), Ok(vec![0x0000_3C00]));
        assert_eq!(words("1.00146484375", float(16)), Ok(vec![0x0000_3C02]));
        assert_eq!(words("1.001464843749999999999", float(16)), Ok(vec![0x0000_3C01]));
        assert_eq!(words("-1.000488281250000000001", float(16)), Ok(vec![0x0000_BC01]));
        assert_eq!(words("1000488281250000000001e-21", float(16)), Ok(vec![0x0000_3C01]));
        assert_eq!(words("65519.99999999999999999", float(16)), Ok(vec![0x0000_7BFF]));
        assert_eq!(kind("65520.00000000000000001", float(16)), Some(DiagnosticKind::OutOfRange));
        // Half of the smallest subnormal.
        assert_eq!(words("2.98023223876953125e-8", float(16)), Ok(vec![0x0000_0000]));
        assert_eq!(words("2.980232238769531250001e-8", float(16)), Ok(vec![0x0000_0001]));
    }

    #[test]
    fn soft_and_hard_failures() {
        let token = Located::with_loc(Loc::new(3, 9), "abc");
        let ty = int(16, true);

        let soft = parse_literal(&token, ty, &Reporter::soft("bad narrow int: "));
        assert_eq!(soft, Err(LiteralError::NoMatch));

        let hard = parse_literal(&token, ty, &Reporter::hard("bad narrow int: "));
        let diag = hard.unwrap_err().diagnostic().cloned().unwrap();
        assert_eq!(diag.kind(), DiagnosticKind::Unrecognized);
        assert_eq!(diag.message(), "bad narrow int: abc");
        assert_eq!(diag.position(), Some((3, 9)));
    }

    #[test]
    fn parse_value_keeps_the_form() {
        let reporter = Reporter::soft("");
        let i16_ty = int(16, true);
        assert_eq!(
            parse_value(&Located::from("0x8000"), i16_ty, &reporter),
            Ok(Value::Bits(0x8000))
        );
        assert_eq!(
            parse_value(&Located::from("-5"), i16_ty, &reporter),
            Ok(Value::Signed(-5))
        );
        assert_eq!(
            parse_value(&Located::from("5"), i16_ty, &reporter),
            Ok(Value::Unsigned(5))
        );
    }
}
