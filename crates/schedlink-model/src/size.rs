//! Byte quantities.
//!
//! Log offsets are expressed as an amount of information rather than a raw
//! integer so callers can say "the last 2 KiB" without doing the arithmetic.
//! The wire format only accepts whole bytes; [`ByteSize::whole_bytes`] does the
//! rounding.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

const KIB: f64 = 1024.0;
const MIB: f64 = KIB * 1024.0;
const GIB: f64 = MIB * 1024.0;

#[derive(Debug, Error, PartialEq)]
pub enum ByteSizeError {
    #[error("empty byte size")]
    Empty,

    #[error("invalid byte size {0:?}")]
    Invalid(String),

    #[error("unknown byte size unit {0:?}")]
    UnknownUnit(String),

    #[error("byte size must be finite and non-negative: {0}")]
    OutOfRange(f64),
}

/// A (possibly fractional) number of bytes.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct ByteSize(f64);

impl ByteSize {
    pub fn bytes(n: f64) -> Self {
        Self(n)
    }

    pub fn kibibytes(n: f64) -> Self {
        Self(n * KIB)
    }

    pub fn mebibytes(n: f64) -> Self {
        Self(n * MIB)
    }

    pub fn gibibytes(n: f64) -> Self {
        Self(n * GIB)
    }

    /// Exact quantity in bytes.
    pub fn as_bytes(&self) -> f64 {
        self.0
    }

    /// Quantity rounded to the nearest whole byte.
    ///
    /// Negative and non-finite quantities saturate to 0.
    pub fn whole_bytes(&self) -> u64 {
        if !self.0.is_finite() || self.0 <= 0.0 {
            return 0;
        }
        self.0.round() as u64
    }
}

impl fmt::Display for ByteSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}B", self.0)
    }
}

/// Parse strings like `"1536"`, `"512B"`, `"1.5KiB"`, `"2MiB"`, `"1GiB"`.
///
/// A bare number is taken as bytes. Units are binary and case-insensitive;
/// `K`/`KB`, `M`/`MB` and `G`/`GB` are accepted as aliases.
impl FromStr for ByteSize {
    type Err = ByteSizeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ByteSizeError::Empty);
        }

        let split = s
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(s.len());
        let (number, unit) = s.split_at(split);

        let value: f64 = number
            .parse()
            .map_err(|_| ByteSizeError::Invalid(s.to_string()))?;
        if !value.is_finite() || value < 0.0 {
            return Err(ByteSizeError::OutOfRange(value));
        }

        let multiplier = match unit.trim().to_ascii_lowercase().as_str() {
            "" | "b" => 1.0,
            "k" | "kb" | "kib" => KIB,
            "m" | "mb" | "mib" => MIB,
            "g" | "gb" | "gib" => GIB,
            other => return Err(ByteSizeError::UnknownUnit(other.to_string())),
        };

        Ok(Self(value * multiplier))
    }
}
