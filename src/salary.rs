//! CABINET - Fixed-Point Salary
//! A signed decimal with a 96-bit magnitude and a power-of-ten scale.
//!
//! ## Binary Layout (four little-endian i32 components)
//! ```text
//! [lo: bits 0..32][mid: bits 32..64][hi: bits 64..96][flags]
//! flags: bits 16..=23 scale (0..=28), bit 31 sign, every other bit zero
//! ```

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{CabinetError, Result};

/// Largest supported number of fractional digits.
pub const MAX_SCALE: u8 = 28;

const MAX_MAGNITUDE: u128 = (1u128 << 96) - 1;
const SIGN_MASK: u32 = 0x8000_0000;
const SCALE_MASK: u32 = 0x00FF_0000;
const SCALE_SHIFT: u32 = 16;

/// A salary amount: `mantissa / 10^scale`.
///
/// Equality and ordering are numeric, so `5000` equals `5000.00`;
/// the stored mantissa and scale are still preserved bit-exactly.
#[derive(Debug, Clone, Copy, Default)]
pub struct Salary {
    mantissa: i128,
    scale: u8,
}

impl Salary {
    /// Create a salary from a raw mantissa and scale.
    pub fn new(mantissa: i128, scale: u8) -> Result<Self> {
        if scale > MAX_SCALE {
            return Err(CabinetError::Parse(format!(
                "scale {} exceeds the maximum of {}",
                scale, MAX_SCALE
            )));
        }
        if mantissa.unsigned_abs() > MAX_MAGNITUDE {
            return Err(CabinetError::Parse(format!(
                "{} does not fit in 96 bits",
                mantissa
            )));
        }
        Ok(Self { mantissa, scale })
    }

    /// A whole-number salary.
    pub fn from_int(value: i64) -> Self {
        Self {
            mantissa: value as i128,
            scale: 0,
        }
    }

    pub fn mantissa(&self) -> i128 {
        self.mantissa
    }

    pub fn scale(&self) -> u8 {
        self.scale
    }

    pub fn is_negative(&self) -> bool {
        self.mantissa < 0
    }

    /// Split into the `lo, mid, hi, flags` components written to disk.
    pub fn to_parts(&self) -> [i32; 4] {
        let magnitude = self.mantissa.unsigned_abs();
        let mut flags = (self.scale as u32) << SCALE_SHIFT;
        if self.mantissa < 0 {
            flags |= SIGN_MASK;
        }
        [
            magnitude as u32 as i32,
            (magnitude >> 32) as u32 as i32,
            (magnitude >> 64) as u32 as i32,
            flags as i32,
        ]
    }

    /// Rebuild a salary from its four on-disk components.
    pub fn from_parts(parts: [i32; 4]) -> Result<Self> {
        let flags = parts[3] as u32;
        if flags & !(SIGN_MASK | SCALE_MASK) != 0 {
            return Err(CabinetError::Corruption(format!(
                "decimal flags {:#010x} have reserved bits set",
                flags
            )));
        }
        let scale = ((flags & SCALE_MASK) >> SCALE_SHIFT) as u8;
        if scale > MAX_SCALE {
            return Err(CabinetError::Corruption(format!(
                "decimal scale {} exceeds {}",
                scale, MAX_SCALE
            )));
        }
        let magnitude = (parts[0] as u32 as u128)
            | ((parts[1] as u32 as u128) << 32)
            | ((parts[2] as u32 as u128) << 64);
        let mut mantissa = magnitude as i128;
        if flags & SIGN_MASK != 0 {
            mantissa = -mantissa;
        }
        Ok(Self { mantissa, scale })
    }

    /// Integer part and fractional digits padded to `scale` places.
    fn split(&self, scale: u8) -> (i128, i128) {
        let unit = 10i128.pow(self.scale as u32);
        let whole = self.mantissa / unit;
        let fraction = (self.mantissa % unit) * 10i128.pow((scale - self.scale) as u32);
        (whole, fraction)
    }
}

impl PartialEq for Salary {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Salary {}

impl PartialOrd for Salary {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Salary {
    fn cmp(&self, other: &Self) -> Ordering {
        // Truncating division keeps the fraction's sign equal to the value's
        // sign, so (whole, fraction) pairs order the same way the values do.
        let scale = self.scale.max(other.scale);
        self.split(scale).cmp(&other.split(scale))
    }
}

impl fmt::Display for Salary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.mantissa < 0 { "-" } else { "" };
        let digits = self.mantissa.unsigned_abs().to_string();
        let scale = self.scale as usize;
        if scale == 0 {
            return write!(f, "{}{}", sign, digits);
        }
        let digits = format!("{:0>width$}", digits, width = scale + 1);
        let (whole, fraction) = digits.split_at(digits.len() - scale);
        write!(f, "{}{}.{}", sign, whole, fraction)
    }
}

impl FromStr for Salary {
    type Err = CabinetError;

    fn from_str(s: &str) -> Result<Self> {
        let text = s.trim();
        let invalid = || CabinetError::Parse(format!("'{}' is not a decimal number", s));

        let (negative, unsigned) = match text.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, text.strip_prefix('+').unwrap_or(text)),
        };
        let (whole, fraction) = match unsigned.split_once('.') {
            Some((whole, fraction)) => (whole, fraction),
            None => (unsigned, ""),
        };
        if whole.is_empty() && fraction.is_empty() {
            return Err(invalid());
        }
        if !whole.chars().chain(fraction.chars()).all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }
        let scale = u8::try_from(fraction.len()).map_err(|_| invalid())?;
        let digits = format!("{}{}", whole, fraction);
        let magnitude: u128 = if digits.is_empty() {
            0
        } else {
            digits.parse().map_err(|_| invalid())?
        };
        if magnitude > MAX_MAGNITUDE {
            return Err(invalid());
        }
        let mantissa = if negative {
            -(magnitude as i128)
        } else {
            magnitude as i128
        };
        Salary::new(mantissa, scale)
    }
}

impl Serialize for Salary {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Salary {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}
