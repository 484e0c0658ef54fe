// Copyright 2025 Lars Brubaker
// License: SGI Free Software License B (MIT-compatible)
//
// Points and vectors in the build's numeric representation.

use core::ops::{Add, Neg, Sub};

use log::error;
#[cfg(feature = "double-fallback")]
use log::warn;
#[cfg(feature = "serialization")]
use serde::{Deserialize, Serialize};

use crate::error::VectorError;
use crate::scalar::{Real, Scalar};

/// Direction of a quarter turn.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub enum RotateDirection {
    /// `(x, y)` becomes `(-y, x)`.
    Clockwise,
    /// `(x, y)` becomes `(y, -x)`.
    CounterClockwise,
}

/// A position.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct Point<S = Real> {
    pub x: S,
    pub y: S,
}

/// A displacement.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct Vector<S = Real> {
    pub x: S,
    pub y: S,
}

impl<S: Scalar> Point<S> {
    #[inline]
    pub fn new(x: S, y: S) -> Self {
        Point { x, y }
    }

    #[inline]
    pub fn origin() -> Self {
        Point {
            x: S::ZERO,
            y: S::ZERO,
        }
    }

    #[inline]
    pub fn to_vector(self) -> Vector<S> {
        Vector::make_from_point(&self)
    }

    #[inline]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// The point rotated a quarter turn about the origin.
    #[inline]
    pub fn rotated(self, direction: RotateDirection) -> Self {
        let v = self.to_vector().rotated(direction);
        Point { x: v.x, y: v.y }
    }
}

impl<S: Scalar> Vector<S> {
    #[inline]
    pub fn make(x: S, y: S) -> Self {
        Vector { x, y }
    }

    #[inline]
    pub fn make_from_integer(x: i32, y: i32) -> Self {
        Vector {
            x: S::from_i32(x),
            y: S::from_i32(y),
        }
    }

    #[inline]
    pub fn make_from_point(point: &Point<S>) -> Self {
        Vector {
            x: point.x,
            y: point.y,
        }
    }

    #[inline]
    pub fn negate(&mut self) {
        self.x = -self.x;
        self.y = -self.y;
    }

    #[inline]
    pub fn scale(&mut self, factor: S) {
        let src = *self;
        src.scale_into(self, factor);
    }

    #[inline]
    pub fn scale_into(&self, scaled: &mut Vector<S>, factor: S) {
        scaled.x = self.x * factor;
        scaled.y = self.y * factor;
    }

    #[inline]
    pub fn rotate(&mut self, direction: RotateDirection) {
        let src = *self;
        src.rotate_into(self, direction);
    }

    pub fn rotate_into(&self, rotated: &mut Vector<S>, direction: RotateDirection) {
        let (x, y) = (self.x, self.y);
        match direction {
            RotateDirection::Clockwise => {
                rotated.x = -y;
                rotated.y = x;
            }
            RotateDirection::CounterClockwise => {
                rotated.x = y;
                rotated.y = -x;
            }
        }
    }

    #[inline]
    pub fn rotated(self, direction: RotateDirection) -> Self {
        let mut out = self;
        self.rotate_into(&mut out, direction);
        out
    }

    #[inline]
    pub fn length(&self) -> S {
        S::length(self.x, self.y)
    }

    /// Rescales the vector to `length`.
    ///
    /// Fails, leaving the vector untouched, when the target or the current
    /// length is not a usable positive number. A scale factor that
    /// underflows the native representation is recomputed in `f64` when the
    /// `double-fallback` feature is enabled.
    pub fn length_set(&mut self, length: S) -> Result<(), VectorError> {
        if length <= S::NEAR_ZERO || !length.is_finite() {
            error!("invalid length: {}", length);
            return Err(VectorError::InvalidLength(length.to_f64()));
        }

        let current = self.length();
        if current <= S::NEAR_ZERO || !current.is_finite() {
            error!("invalid self length for vector ({}, {})", self.x, self.y);
            return Err(VectorError::Degenerate {
                x: self.x.to_f64(),
                y: self.y.to_f64(),
            });
        }

        let scale = length / current;
        if scale <= S::NEAR_ZERO {
            return self.length_set_wide(length, current);
        }

        self.x = self.x * scale;
        self.y = self.y * scale;
        Ok(())
    }

    #[cfg(feature = "double-fallback")]
    fn length_set_wide(&mut self, length: S, current: S) -> Result<(), VectorError> {
        let (xx, yy) = (self.x.to_f64(), self.y.to_f64());
        let ss = length.to_f64() / (xx * xx + yy * yy).sqrt();
        warn!(
            "computing scale {} / {} in f64, will be slower",
            length, current
        );
        self.x = S::from_f64(xx * ss);
        self.y = S::from_f64(yy * ss);
        Ok(())
    }

    #[cfg(not(feature = "double-fallback"))]
    fn length_set_wide(&mut self, length: S, current: S) -> Result<(), VectorError> {
        error!("invalid scale: {} / {}", length, current);
        Err(VectorError::ScaleUnderflow {
            length: length.to_f64(),
            current: current.to_f64(),
        })
    }

    #[inline]
    pub fn normalize(&mut self) -> Result<(), VectorError> {
        self.length_set(S::ONE)
    }

    #[inline]
    pub fn dot(&self, other: &Vector<S>) -> S {
        S::mul_add2(self.x, other.x, self.y, other.y)
    }

    /// Positive when `other` turns counter-clockwise from `self`.
    #[inline]
    pub fn cross(&self, other: &Vector<S>) -> S {
        S::mul_sub2(self.x, other.y, self.y, other.x)
    }
}

impl<S: Scalar> Sub for Point<S> {
    type Output = Vector<S>;
    #[inline]
    fn sub(self, rhs: Point<S>) -> Vector<S> {
        Vector::make(self.x - rhs.x, self.y - rhs.y)
    }
}

impl<S: Scalar> Add<Vector<S>> for Point<S> {
    type Output = Point<S>;
    #[inline]
    fn add(self, rhs: Vector<S>) -> Point<S> {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl<S: Scalar> Add for Vector<S> {
    type Output = Vector<S>;
    #[inline]
    fn add(self, rhs: Vector<S>) -> Vector<S> {
        Vector::make(self.x + rhs.x, self.y + rhs.y)
    }
}

impl<S: Scalar> Sub for Vector<S> {
    type Output = Vector<S>;
    #[inline]
    fn sub(self, rhs: Vector<S>) -> Vector<S> {
        Vector::make(self.x - rhs.x, self.y - rhs.y)
    }
}

impl<S: Scalar> Neg for Vector<S> {
    type Output = Vector<S>;
    #[inline]
    fn neg(self) -> Vector<S> {
        let mut v = self;
        v.negate();
        v
    }
}

/// Shorthand for a `Point<Real>`.
#[inline]
pub fn point(x: f64, y: f64) -> Point {
    Point::new(Real::from_f64(x), Real::from_f64(y))
}
