use crate::spec::types::{
    hw::{self, Word, WORD_WIDTH},
    schema::{NumericKind, NumericType},
};
use std::fmt::Display;

/// A parsed literal before it is laid out in words.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Value {
    Unsigned(u128),
    Signed(i128),
    /// An exact bit pattern in the low `width` bits: raw-bits literals, hex integers
    /// destined for a signed type, and every floating point value.
    Bits(u128),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    OutOfRange(Value, NumericType),
    NotAnInteger(Value, NumericType),
    WordCountMismatch { expected: usize, found: usize },
    NonCanonicalPadding(Vec<Word>, NumericType),
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::OutOfRange(value, ty) => write!(f, "{:?} does not fit in {}", value, ty),
            Error::NotAnInteger(value, ty) => {
                write!(f, "{:?} is an integer, but {} is a floating point type", value, ty)
            }
            Error::WordCountMismatch { expected, found } => write!(
                f,
                "expected {} word(s) but found {}",
                expected, found
            ),
            Error::NonCanonicalPadding(words, ty) => write!(
                f,
                "words {:#010X?} are not a {}-extended {}",
                words,
                if ty.sign_extends() { "sign" } else { "zero" },
                ty
            ),
        }
    }
}

impl std::error::Error for Error {}

/// Checks `value` against the range of `ty`, returning its pattern in the low `width` bits.
pub fn to_bits(value: Value, ty: NumericType) -> Result<u128, Error> {
    let width = ty.width();
    let mask = hw::low_mask(width);
    let out_of_range = || Error::OutOfRange(value, ty);

    let signed = match ty.kind() {
        NumericKind::Int { signed } => signed,
        NumericKind::Float(_) => match value {
            Value::Bits(bits) if bits & !mask == 0 => return Ok(bits),
            Value::Bits(_) => return Err(out_of_range()),
            _ => return Err(Error::NotAnInteger(value, ty)),
        },
    };

    match value {
        Value::Bits(bits) => {
            if bits & !mask == 0 {
                Ok(bits)
            } else {
                Err(out_of_range())
            }
        }
        Value::Unsigned(v) => {
            let max = if signed { mask >> 1 } else { mask };
            if v <= max {
                Ok(v)
            } else {
                Err(out_of_range())
            }
        }
        Value::Signed(v) => {
            let in_range = if !signed {
                v >= 0 && (v as u128) <= mask
            } else if width == hw::MAX_INT_WIDTH {
                true
            } else {
                let half = 1i128 << (width - 1);
                -half <= v && v < half
            };

            if in_range {
                Ok((v as u128) & mask)
            } else {
                Err(out_of_range())
            }
        }
    }
}

/// Lays `value` out as `ty.word_count()` words, low-order word first, filling the bits
/// above `width` with the sign bit for signed integers and with zeroes otherwise.
pub fn pack(value: Value, ty: NumericType) -> Result<Vec<Word>, Error> {
    let bits = to_bits(value, ty)?;
    let bits = if ty.sign_extends() {
        hw::sign_extend(bits, ty.width())
    } else {
        bits
    };

    Ok(hw::bits_to_words(bits, ty.word_count()))
}

/// Inverse of `pack`. Rejects padding bits which `pack` could not have produced, since no
/// literal text would reproduce them.
pub fn unpack(words: &[Word], ty: NumericType) -> Result<Value, Error> {
    if words.len() != ty.word_count() {
        return Err(Error::WordCountMismatch {
            expected: ty.word_count(),
            found: words.len(),
        });
    }

    let width = ty.width();
    let storage = ty.word_count() as u32 * WORD_WIDTH;
    let raw = hw::words_to_bits(words);
    let bits = raw & hw::low_mask(width);
    let canonical = if ty.sign_extends() {
        hw::sign_extend(bits, width) & hw::low_mask(storage)
    } else {
        bits
    };

    if raw != canonical {
        return Err(Error::NonCanonicalPadding(words.to_vec(), ty));
    }

    Ok(match ty.kind() {
        NumericKind::Int { signed: true } => Value::Signed(hw::sign_extend(bits, width) as i128),
        NumericKind::Int { signed: false } => Value::Unsigned(bits),
        NumericKind::Float(_) => Value::Bits(bits),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int(width: u32, signed: bool) -> NumericType {
        NumericType::int(width, signed).unwrap()
    }

    #[test]
    fn sign_extends_narrow_signed() {
        assert_eq!(pack(Value::Signed(-32), int(16, true)), Ok(vec![0xFFFF_FFE0]));
        assert_eq!(pack(Value::Bits(0x8000), int(16, true)), Ok(vec![0xFFFF_8000]));
        assert_eq!(pack(Value::Bits(0x8000), int(16, false)), Ok(vec![0x0000_8000]));
    }

    #[test]
    fn sign_extends_into_second_word() {
        assert_eq!(
            pack(Value::Signed(-32), int(48, true)),
            Ok(vec![0xFFFF_FFE0, 0xFFFF_FFFF])
        );
        assert_eq!(
            pack(Value::Bits(0x8000_0000_0000), int(48, true)),
            Ok(vec![0x0000_0000, 0xFFFF_8000])
        );
        assert_eq!(
            pack(Value::Unsigned(0x8000_0000_0001), int(48, false)),
            Ok(vec![0x0000_0001, 0x0000_8000])
        );
    }

    #[test]
    fn range_limits() {
        assert!(pack(Value::Unsigned(65535), int(16, false)).is_ok());
        assert!(pack(Value::Unsigned(65536), int(16, false)).is_err());
        assert!(pack(Value::Unsigned(32767), int(16, true)).is_ok());
        assert!(pack(Value::Unsigned(32768), int(16, true)).is_err());
        assert!(pack(Value::Signed(-32768), int(16, true)).is_ok());
        assert!(pack(Value::Signed(-32769), int(16, true)).is_err());
        assert!(pack(Value::Signed(-1), int(64, false)).is_err());
        assert!(pack(Value::Signed(0), int(64, false)).is_ok());
        assert!(pack(Value::Bits(0x1_0000), int(16, true)).is_err());
        assert!(pack(Value::Signed(i128::MIN), int(128, true)).is_ok());
        assert!(pack(Value::Unsigned(u128::MAX), int(128, false)).is_ok());
    }

    #[test]
    fn integers_into_floats_are_rejected() {
        let f32_ty = NumericType::float(32).unwrap();
        assert_eq!(
            pack(Value::Unsigned(1), f32_ty),
            Err(Error::NotAnInteger(Value::Unsigned(1), f32_ty))
        );
        assert_eq!(pack(Value::Bits(0x3F80_0000), f32_ty), Ok(vec![0x3F80_0000]));
    }

    #[test]
    fn half_floats_are_zero_extended() {
        let f16_ty = NumericType::float(16).unwrap();
        assert_eq!(pack(Value::Bits(0xFC00), f16_ty), Ok(vec![0x0000_FC00]));
        assert!(unpack(&[0xFFFF_FC00], f16_ty).is_err());
    }

    #[test]
    fn unpack_inverts_pack() {
        let ty = int(48, true);
        assert_eq!(
            unpack(&[0xFFFF_FFE0, 0xFFFF_FFFF], ty),
            Ok(Value::Signed(-32))
        );
        assert_eq!(
            unpack(&[0x0000_1234, 0x0000_0000], int(64, false)),
            Ok(Value::Unsigned(0x1234))
        );
    }

    #[test]
    fn unpack_checks_shape() {
        let ty = int(48, true);
        assert_eq!(
            unpack(&[0], ty),
            Err(Error::WordCountMismatch {
                expected: 2,
                found: 1
            })
        );
        // Sign bit clear, but the padding is all ones.
        assert!(matches!(
            unpack(&[0x0000_0000, 0xFFFF_7FFF], ty),
            Err(Error::NonCanonicalPadding(..))
        ));
        assert!(matches!(
            unpack(&[0x0000_0000, 0x0001_0000], int(48, false)),
            Err(Error::NonCanonicalPadding(..))
        ));
    }
}
