// Copyright 2025 Lars Brubaker
// License: SGI Free Software License B (MIT-compatible)
//
// 16.16 fixed-point scalar.

use core::fmt;
use core::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};

#[cfg(not(feature = "double-fallback"))]
use log::error;
#[cfg(feature = "double-fallback")]
use log::warn;
use num_traits::{One, Zero};
#[cfg(feature = "serialization")]
use serde::{Deserialize, Serialize};

use super::Scalar;

const FRAC_BITS: u32 = 16;
const RAW_ONE: i32 = 1 << FRAC_BITS;
const RAW_NAN: i32 = i32::MIN;
const RAW_INF: i32 = i32::MAX;

/// A signed 16.16 fixed-point number.
///
/// `i32::MIN` is reserved as the not-a-number sentinel and `±i32::MAX` act as
/// infinities; arithmetic saturates to them instead of wrapping.
#[derive(Copy, Clone, Default, PartialEq, Eq, PartialOrd, Hash)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct Fixed(i32);

impl Fixed {
    pub const INFINITY: Fixed = Fixed(RAW_INF);
    pub const NEG_INFINITY: Fixed = Fixed(-RAW_INF);

    #[inline]
    pub const fn from_bits(bits: i32) -> Self {
        Fixed(bits)
    }

    #[inline]
    pub const fn to_bits(self) -> i32 {
        self.0
    }

    #[inline]
    fn saturate(v: i128) -> Self {
        if v >= RAW_INF as i128 {
            Fixed(RAW_INF)
        } else if v <= -(RAW_INF as i128) {
            Fixed(-RAW_INF)
        } else {
            Fixed(v as i32)
        }
    }

    #[inline]
    fn either_nan(a: Fixed, b: Fixed) -> bool {
        a.0 == RAW_NAN || b.0 == RAW_NAN
    }

    /// `num / den` in raw units, rounded toward zero except that a nonzero
    /// quotient never collapses to zero. `den` must be positive.
    fn quotient_keeping_sign(num: i128, den: i128) -> Self {
        let q = num / den;
        if q == 0 {
            return Fixed(num.signum() as i32);
        }
        Fixed::saturate(q)
    }
}

// Integer square root by Newton iteration; n < 2^48 here.
fn isqrt(n: u64) -> u64 {
    if n < 2 {
        return n;
    }
    let mut x = n;
    let mut y = (x + 1) / 2;
    while y < x {
        x = y;
        y = (x + n / x) / 2;
    }
    x
}

impl Add for Fixed {
    type Output = Fixed;
    #[inline]
    fn add(self, rhs: Fixed) -> Fixed {
        if Fixed::either_nan(self, rhs) {
            return Fixed(RAW_NAN);
        }
        Fixed::saturate(self.0 as i128 + rhs.0 as i128)
    }
}

impl Sub for Fixed {
    type Output = Fixed;
    #[inline]
    fn sub(self, rhs: Fixed) -> Fixed {
        if Fixed::either_nan(self, rhs) {
            return Fixed(RAW_NAN);
        }
        Fixed::saturate(self.0 as i128 - rhs.0 as i128)
    }
}

impl Mul for Fixed {
    type Output = Fixed;
    #[inline]
    fn mul(self, rhs: Fixed) -> Fixed {
        if Fixed::either_nan(self, rhs) {
            return Fixed(RAW_NAN);
        }
        Fixed::saturate((self.0 as i128 * rhs.0 as i128) >> FRAC_BITS)
    }
}

impl Div for Fixed {
    type Output = Fixed;
    fn div(self, rhs: Fixed) -> Fixed {
        if Fixed::either_nan(self, rhs) {
            return Fixed(RAW_NAN);
        }
        if rhs.0 == 0 {
            return match self.0 {
                0 => Fixed(RAW_NAN),
                v if v > 0 => Fixed::INFINITY,
                _ => Fixed::NEG_INFINITY,
            };
        }
        Fixed::saturate(((self.0 as i128) << FRAC_BITS) / rhs.0 as i128)
    }
}

impl Neg for Fixed {
    type Output = Fixed;
    #[inline]
    fn neg(self) -> Fixed {
        if self.0 == RAW_NAN {
            return self;
        }
        Fixed(-self.0)
    }
}

impl AddAssign for Fixed {
    #[inline]
    fn add_assign(&mut self, rhs: Fixed) {
        *self = *self + rhs;
    }
}

impl SubAssign for Fixed {
    #[inline]
    fn sub_assign(&mut self, rhs: Fixed) {
        *self = *self - rhs;
    }
}

impl Zero for Fixed {
    #[inline]
    fn zero() -> Self {
        Fixed(0)
    }

    #[inline]
    fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl One for Fixed {
    #[inline]
    fn one() -> Self {
        Fixed(RAW_ONE)
    }
}

impl fmt::Display for Fixed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_f64())
    }
}

impl fmt::Debug for Fixed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fixed({})", self.to_f64())
    }
}

impl Scalar for Fixed {
    const ZERO: Self = Fixed(0);
    const ONE: Self = Fixed(RAW_ONE);
    const HALF: Self = Fixed(RAW_ONE >> 1);
    const NEAR_ZERO: Self = Fixed(1 << 4);
    const NAN: Self = Fixed(RAW_NAN);
    const MAX_COORD: Self = Fixed(4096 << FRAC_BITS);

    type Wide = f64;

    #[inline]
    fn widen(self) -> f64 {
        self.to_f64()
    }

    #[inline]
    fn narrow(wide: f64) -> Self {
        Fixed::from_f64(wide)
    }

    fn from_f64(v: f64) -> Self {
        if v.is_nan() {
            return Fixed(RAW_NAN);
        }
        Fixed::saturate((v * RAW_ONE as f64).round().clamp(i64::MIN as f64, i64::MAX as f64) as i128)
    }

    fn to_f64(self) -> f64 {
        match self.0 {
            RAW_NAN => f64::NAN,
            RAW_INF => f64::INFINITY,
            v if v == -RAW_INF => f64::NEG_INFINITY,
            v => v as f64 / RAW_ONE as f64,
        }
    }

    #[inline]
    fn from_i32(v: i32) -> Self {
        Fixed::saturate((v as i128) << FRAC_BITS)
    }

    #[inline]
    fn abs(self) -> Self {
        if self.0 == RAW_NAN {
            return self;
        }
        Fixed(self.0.abs())
    }

    fn sqrt(self) -> Self {
        if self.0 == RAW_NAN || self.0 < 0 {
            return Fixed(RAW_NAN);
        }
        if self.0 == RAW_INF {
            return self;
        }
        Fixed(isqrt((self.0 as u64) << FRAC_BITS) as i32)
    }

    #[inline]
    fn is_finite(self) -> bool {
        self.0 > -RAW_INF && self.0 < RAW_INF
    }

    #[inline]
    fn is_nan(self) -> bool {
        self.0 == RAW_NAN
    }

    fn mul_add2(a: Self, b: Self, c: Self, d: Self) -> Self {
        if Fixed::either_nan(a, b) || Fixed::either_nan(c, d) {
            return Fixed(RAW_NAN);
        }
        let wide = a.0 as i128 * b.0 as i128 + c.0 as i128 * d.0 as i128;
        Fixed::saturate(wide >> FRAC_BITS)
    }

    fn mul_sub2(a: Self, b: Self, c: Self, d: Self) -> Self {
        if Fixed::either_nan(a, b) || Fixed::either_nan(c, d) {
            return Fixed(RAW_NAN);
        }
        let wide = a.0 as i128 * b.0 as i128 - c.0 as i128 * d.0 as i128;
        Fixed::quotient_keeping_sign(wide, RAW_ONE as i128)
    }

    fn length(x: Self, y: Self) -> Self {
        if Fixed::either_nan(x, y) {
            return Fixed(RAW_NAN);
        }
        let (ax, ay) = (x.0.unsigned_abs() as u64, y.0.unsigned_abs() as u64);
        let dd = (ax * ax + ay * ay) >> FRAC_BITS;
        if dd > 0 && dd >> 31 == 0 {
            return Fixed(dd as i32).sqrt();
        }
        if dd == 0 {
            return Self::NEAR_ZERO;
        }
        wide_length(x, y)
    }

    /// Computed exactly on the wide intermediate as
    /// `((v - u) * (gap_l + gap_r) - (w - u) * gap_l) / (gap_l + gap_r)`,
    /// whose numerator is the cross product `edge_sign` takes, so the two
    /// predicates never disagree on a side.
    fn edge_offset(u: Self, v: Self, w: Self, gap_l: Self, gap_r: Self) -> Self {
        if Fixed::either_nan(u, v) || Fixed::either_nan(w, gap_l) || gap_r.0 == RAW_NAN {
            return Fixed(RAW_NAN);
        }
        let total = gap_l.0 as i128 + gap_r.0 as i128;
        let num = (v.0 as i128 - u.0 as i128) * total - (w.0 as i128 - u.0 as i128) * gap_l.0 as i128;
        Fixed::quotient_keeping_sign(num, total)
    }
}

#[cfg(feature = "double-fallback")]
fn wide_length(x: Fixed, y: Fixed) -> Fixed {
    let (xx, yy) = (x.to_f64(), y.to_f64());
    warn!("computing length of ({}, {}) in f64, will be slower", x, y);
    Fixed::from_f64((xx * xx + yy * yy).sqrt())
}

#[cfg(not(feature = "double-fallback"))]
fn wide_length(x: Fixed, y: Fixed) -> Fixed {
    error!("cannot compute length of ({}, {}) in 16.16", x, y);
    Fixed::NAN
}
