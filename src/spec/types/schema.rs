use super::hw::{self, MAX_INT_WIDTH};
use derive_more::Display;
use std::fmt;
use strum_macros::EnumIter;

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    #[display(fmt = "unsupported integer width {} (expected 1 to {})", _0, MAX_INT_WIDTH)]
    UnsupportedIntWidth(u32),
    #[display(fmt = "unsupported floating point width {} (expected 16, 32 or 64)", _0)]
    UnsupportedFloatWidth(u32),
}

impl std::error::Error for Error {}

/// The IEEE-754 binary interchange formats a literal can be encoded in.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, EnumIter)]
pub enum FloatFormat {
    #[display(fmt = "f16")]
    Half,
    #[display(fmt = "f32")]
    Single,
    #[display(fmt = "f64")]
    Double,
}

impl FloatFormat {
    pub fn from_width(width: u32) -> Option<FloatFormat> {
        match width {
            16 => Some(FloatFormat::Half),
            32 => Some(FloatFormat::Single),
            64 => Some(FloatFormat::Double),
            _ => None,
        }
    }

    pub const fn width(self) -> u32 {
        match self {
            FloatFormat::Half => 16,
            FloatFormat::Single => 32,
            FloatFormat::Double => 64,
        }
    }

    pub const fn exponent_bits(self) -> u32 {
        match self {
            FloatFormat::Half => 5,
            FloatFormat::Single => 8,
            FloatFormat::Double => 11,
        }
    }

    /// Width of the trailing significand field (the implicit leading bit is not stored).
    pub const fn fraction_bits(self) -> u32 {
        self.width() - self.exponent_bits() - 1
    }

    pub const fn bias(self) -> i32 {
        (1 << (self.exponent_bits() - 1)) - 1
    }

    /// Largest unbiased exponent of a finite number.
    pub const fn max_exponent(self) -> i32 {
        self.bias()
    }

    /// Smallest unbiased exponent of a normal number.
    pub const fn min_exponent(self) -> i32 {
        1 - self.bias()
    }

    pub const fn exponent_field_max(self) -> u64 {
        (1 << self.exponent_bits()) - 1
    }

    pub const fn fraction_mask(self) -> u64 {
        (1 << self.fraction_bits()) - 1
    }

    pub const fn sign_bit(self) -> u64 {
        1 << (self.width() - 1)
    }

    /// Splits a bit pattern into its sign, biased exponent and fraction fields.
    pub fn fields(self, bits: u64) -> (bool, u64, u64) {
        let negative = bits & self.sign_bit() != 0;
        let exponent = (bits >> self.fraction_bits()) & self.exponent_field_max();
        let fraction = bits & self.fraction_mask();
        (negative, exponent, fraction)
    }

    pub fn assemble(self, negative: bool, exponent: u64, fraction: u64) -> u64 {
        debug_assert!(exponent <= self.exponent_field_max());
        debug_assert!(fraction <= self.fraction_mask());
        let sign = if negative { self.sign_bit() } else { 0 };
        sign | (exponent << self.fraction_bits()) | fraction
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumericKind {
    Int { signed: bool },
    Float(FloatFormat),
}

/// The declared type a literal is parsed against: a bit width plus
/// integer signedness or a floating point format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NumericType {
    width: u32,
    kind: NumericKind,
}

impl NumericType {
    pub fn int(width: u32, signed: bool) -> Result<NumericType, Error> {
        if width == 0 || width > MAX_INT_WIDTH {
            return Err(Error::UnsupportedIntWidth(width));
        }

        Ok(NumericType {
            width,
            kind: NumericKind::Int { signed },
        })
    }

    pub fn float(width: u32) -> Result<NumericType, Error> {
        let fmt = FloatFormat::from_width(width).ok_or(Error::UnsupportedFloatWidth(width))?;
        Ok(NumericType::from(fmt))
    }

    /// Mirrors the shape of a type declaration: `(bit width, signedness, is float)`.
    /// Signedness is ignored for floating point types.
    pub fn new(width: u32, signed: bool, is_float: bool) -> Result<NumericType, Error> {
        if is_float {
            NumericType::float(width)
        } else {
            NumericType::int(width, signed)
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn kind(&self) -> NumericKind {
        self.kind
    }

    pub fn is_float(&self) -> bool {
        matches!(self.kind, NumericKind::Float(_))
    }

    pub fn float_format(&self) -> Option<FloatFormat> {
        match self.kind {
            NumericKind::Float(fmt) => Some(fmt),
            NumericKind::Int { .. } => None,
        }
    }

    pub fn word_count(&self) -> usize {
        hw::word_count(self.width)
    }

    /// Whether the storage above `width` is filled with copies of the sign bit.
    pub fn sign_extends(&self) -> bool {
        matches!(self.kind, NumericKind::Int { signed: true })
    }
}

impl From<FloatFormat> for NumericType {
    fn from(fmt: FloatFormat) -> Self {
        NumericType {
            width: fmt.width(),
            kind: NumericKind::Float(fmt),
        }
    }
}

impl fmt::Display for NumericType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            NumericKind::Int { signed: true } => write!(f, "i{}", self.width),
            NumericKind::Int { signed: false } => write!(f, "u{}", self.width),
            NumericKind::Float(fmt) => write!(f, "{}", fmt),
        }
    }
}
