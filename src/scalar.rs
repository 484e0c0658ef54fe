// Copyright 2025 Lars Brubaker
// License: SGI Free Software License B (MIT-compatible)
//
// Numeric policy.
//
// Every coordinate in the crate is a `Real`, which is `f32` by default and
// the 16.16 `Fixed` type when the `fixed-point` feature is enabled. Code
// outside this module only relies on the `Scalar` contract, so the choice is
// made once per build and never branched on at runtime.

mod fixed;

use core::fmt::{Debug, Display};
use core::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};

use log::debug;
use num_traits::{Float, One, Zero};

pub use fixed::Fixed;

#[cfg(not(feature = "fixed-point"))]
pub type Real = f32;

#[cfg(feature = "fixed-point")]
pub type Real = Fixed;

/// The arithmetic contract shared by the fixed-point and floating-point
/// representations.
pub trait Scalar:
    Copy
    + Debug
    + Display
    + Default
    + PartialEq
    + PartialOrd
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + Neg<Output = Self>
    + AddAssign
    + SubAssign
    + Zero
    + One
{
    const ZERO: Self;
    const ONE: Self;
    const HALF: Self;
    /// Values at or below this magnitude are treated as zero by the vector
    /// operations.
    const NEAR_ZERO: Self;
    const NAN: Self;
    /// Largest magnitude accepted for an input coordinate.
    const MAX_COORD: Self;

    /// Representation edge intersections are located in before being
    /// rounded back.
    type Wide: Scalar;

    fn widen(self) -> Self::Wide;
    fn narrow(wide: Self::Wide) -> Self;

    fn from_f64(v: f64) -> Self;
    fn to_f64(self) -> f64;
    fn from_i32(v: i32) -> Self;
    fn abs(self) -> Self;
    fn sqrt(self) -> Self;
    fn is_finite(self) -> bool;
    fn is_nan(self) -> bool;

    /// `a * b + c * d`, computed with a wide intermediate where the
    /// representation needs one.
    fn mul_add2(a: Self, b: Self, c: Self, d: Self) -> Self;

    /// `a * b - c * d`, computed with a wide intermediate where the
    /// representation needs one.
    fn mul_sub2(a: Self, b: Self, c: Self, d: Self) -> Self;

    /// Euclidean norm of `(x, y)`, escalating to `f64` when the native
    /// computation overflows.
    fn length(x: Self, y: Self) -> Self;

    /// Offset of `v` from the edge `(u, w)` along the sweep line, from the
    /// three line coordinates and the sweep gaps `gap_l = v - u`,
    /// `gap_r = w - v`, whose sum must be positive.
    fn edge_offset(u: Self, v: Self, w: Self, gap_l: Self, gap_r: Self) -> Self;
}

/// Interpolated form used by the floating-point types: the smaller gap
/// weights the correction term.
#[inline]
fn float_edge_offset<F: Float>(u: F, v: F, w: F, gap_l: F, gap_r: F) -> F {
    if gap_l < gap_r {
        (v - u) + (u - w) * (gap_l / (gap_l + gap_r))
    } else {
        (v - w) + (w - u) * (gap_r / (gap_l + gap_r))
    }
}

impl Scalar for f32 {
    const ZERO: Self = 0.0;
    const ONE: Self = 1.0;
    const HALF: Self = 0.5;
    const NEAR_ZERO: Self = 1.0 / 4096.0;
    const NAN: Self = f32::NAN;
    const MAX_COORD: Self = (1u32 << 23) as f32;

    type Wide = f32;

    #[inline]
    fn widen(self) -> f32 {
        self
    }

    #[inline]
    fn narrow(wide: f32) -> Self {
        wide
    }

    #[inline]
    fn from_f64(v: f64) -> Self {
        v as f32
    }

    #[inline]
    fn to_f64(self) -> f64 {
        self as f64
    }

    #[inline]
    fn from_i32(v: i32) -> Self {
        v as f32
    }

    #[inline]
    fn abs(self) -> Self {
        <f32 as Float>::abs(self)
    }

    #[inline]
    fn sqrt(self) -> Self {
        <f32 as Float>::sqrt(self)
    }

    #[inline]
    fn is_finite(self) -> bool {
        <f32 as Float>::is_finite(self)
    }

    #[inline]
    fn is_nan(self) -> bool {
        <f32 as Float>::is_nan(self)
    }

    #[inline]
    fn mul_add2(a: Self, b: Self, c: Self, d: Self) -> Self {
        a * b + c * d
    }

    #[inline]
    fn mul_sub2(a: Self, b: Self, c: Self, d: Self) -> Self {
        a * b - c * d
    }

    fn length(x: Self, y: Self) -> Self {
        let dd = x * x + y * y;
        if <f32 as Float>::is_finite(dd) {
            return <f32 as Float>::sqrt(dd);
        }
        debug!("length of ({}, {}) overflows f32, using f64", x, y);
        let (xx, yy) = (x as f64, y as f64);
        (xx * xx + yy * yy).sqrt() as f32
    }

    #[inline]
    fn edge_offset(u: Self, v: Self, w: Self, gap_l: Self, gap_r: Self) -> Self {
        float_edge_offset(u, v, w, gap_l, gap_r)
    }
}

impl Scalar for f64 {
    const ZERO: Self = 0.0;
    const ONE: Self = 1.0;
    const HALF: Self = 0.5;
    const NEAR_ZERO: Self = 1.0 / 4096.0;
    const NAN: Self = f64::NAN;
    const MAX_COORD: Self = (1u64 << 52) as f64;

    type Wide = f64;

    #[inline]
    fn widen(self) -> f64 {
        self
    }

    #[inline]
    fn narrow(wide: f64) -> Self {
        wide
    }

    #[inline]
    fn from_f64(v: f64) -> Self {
        v
    }

    #[inline]
    fn to_f64(self) -> f64 {
        self
    }

    #[inline]
    fn from_i32(v: i32) -> Self {
        v as f64
    }

    #[inline]
    fn abs(self) -> Self {
        <f64 as Float>::abs(self)
    }

    #[inline]
    fn sqrt(self) -> Self {
        <f64 as Float>::sqrt(self)
    }

    #[inline]
    fn is_finite(self) -> bool {
        <f64 as Float>::is_finite(self)
    }

    #[inline]
    fn is_nan(self) -> bool {
        <f64 as Float>::is_nan(self)
    }

    #[inline]
    fn mul_add2(a: Self, b: Self, c: Self, d: Self) -> Self {
        a * b + c * d
    }

    #[inline]
    fn mul_sub2(a: Self, b: Self, c: Self, d: Self) -> Self {
        a * b - c * d
    }

    #[inline]
    fn length(x: Self, y: Self) -> Self {
        <f64 as Float>::hypot(x, y)
    }

    #[inline]
    fn edge_offset(u: Self, v: Self, w: Self, gap_l: Self, gap_r: Self) -> Self {
        float_edge_offset(u, v, w, gap_l, gap_r)
    }
}
