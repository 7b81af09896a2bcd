//! Fixed-point scalar used for pathing costs.
//!
//! The runtime pathfinder consumes costs as Q48.16 fixed-point values stored in
//! an `i64`. Authoring data arrives as `f64`, so conversion happens once, at the
//! point a cost is written onto a triangle or link.

use serde::{Deserialize, Serialize};

/// Q48.16 fixed-point number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fixed(i64);

impl Fixed {
    /// Number of fractional bits.
    pub const FRACTIONAL_BITS: u32 = 16;

    /// Raw value of `1.0`.
    const ONE_RAW: i64 = 1 << Self::FRACTIONAL_BITS;

    /// `0.0`
    pub const ZERO: Fixed = Fixed(0);

    /// `1.0`, the default pathing weight.
    pub const ONE: Fixed = Fixed(Self::ONE_RAW);

    /// Wrap a raw Q48.16 value.
    #[inline]
    pub const fn from_raw(raw: i64) -> Self {
        Self(raw)
    }

    /// The raw Q48.16 value.
    #[inline]
    pub const fn raw(self) -> i64 {
        self.0
    }

    /// Convert from an integer.
    #[inline]
    pub const fn from_int(value: i32) -> Self {
        Self((value as i64) << Self::FRACTIONAL_BITS)
    }

    /// Convert from `f64`, rounding to the nearest representable value.
    ///
    /// Non-finite input saturates: NaN maps to zero, infinities clamp.
    pub fn from_f64(value: f64) -> Self {
        if value.is_nan() {
            return Self::ZERO;
        }
        let scaled = (value * Self::ONE_RAW as f64).round();
        if scaled >= i64::MAX as f64 {
            Self(i64::MAX)
        } else if scaled <= i64::MIN as f64 {
            Self(i64::MIN)
        } else {
            Self(scaled as i64)
        }
    }

    /// Convert to `f64`.
    #[inline]
    pub fn to_f64(self) -> f64 {
        self.0 as f64 / Self::ONE_RAW as f64
    }
}

impl Default for Fixed {
    fn default() -> Self {
        Self::ONE
    }
}

impl From<i32> for Fixed {
    fn from(value: i32) -> Self {
        Self::from_int(value)
    }
}

impl std::fmt::Display for Fixed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.4}", self.to_f64())
    }
}
