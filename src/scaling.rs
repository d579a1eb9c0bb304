//! Q16.16 fixed-point scaling.
//!
//! The setpoint, PID gains, measured temperature and heater duty cycle registers all
//! carry a 32-bit word holding a real value scaled by 2^16. This module converts between
//! that word and engineering units.

use thiserror::Error;

/// Scale factor between a real value and its Q16.16 representation.
pub const SCALE: f64 = 65536.0;

/// Smallest representable value.
pub const MIN: f64 = i32::MIN as f64 / SCALE;

/// Values must stay strictly below this bound.
pub const MAX_EXCLUSIVE: f64 = (i32::MAX as f64 + 1.0) / SCALE;

#[derive(Error, Debug, Clone, Copy, PartialEq)]
#[error("Value {0} cannot be represented as Q16.16")]
pub struct RangeError(pub f64);

/// A 32-bit register word interpreted as a signed Q16.16 quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FixedPoint(u32);

impl FixedPoint {
    pub const ZERO: Self = Self(0);

    /// Wrap a raw register word.
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// The raw register word.
    pub const fn raw(&self) -> u32 {
        self.0
    }

    /// Encode a real value, truncating toward zero.
    pub fn from_f64(value: f64) -> Result<Self, RangeError> {
        if !value.is_finite() || !(MIN..MAX_EXCLUSIVE).contains(&value) {
            return Err(RangeError(value));
        }
        let scaled = (value * SCALE) as i32;
        Ok(Self(scaled as u32))
    }

    /// Decode to a real value. Exact, since f64 holds all 32 bits.
    pub fn to_f64(&self) -> f64 {
        self.0 as i32 as f64 / SCALE
    }
}

impl TryFrom<f64> for FixedPoint {
    type Error = RangeError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::from_f64(value)
    }
}

impl From<FixedPoint> for f64 {
    fn from(value: FixedPoint) -> Self {
        value.to_f64()
    }
}

impl core::fmt::Display for FixedPoint {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match f.precision() {
            Some(precision) => write!(f, "{:.*}", precision, self.to_f64()),
            None => write!(f, "{}", self.to_f64()),
        }
    }
}
