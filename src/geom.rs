// Copyright 2025 Lars Brubaker
// License: SGI Free Software License B (MIT-compatible)
//
// Geometric predicates in the sweep frame.
//
// Positions here are sweep-frame points: `x` is the sweep coordinate (events
// are processed in increasing `x`) and `y` is the position along the sweep
// line. Every sidedness test goes through `Vector::cross`.

use crate::scalar::{Real, Scalar};
use crate::vector::Point;

/// Returns true if u is lexicographically <= v (x first, then y).
#[inline]
pub fn vert_leq<S: Scalar>(u: Point<S>, v: Point<S>) -> bool {
    u.x < v.x || (u.x == v.x && u.y <= v.y)
}

#[inline]
pub fn vert_eq<S: Scalar>(u: Point<S>, v: Point<S>) -> bool {
    u.x == v.x && u.y == v.y
}

/// Lexicographic order with the axes swapped (y first, then x).
#[inline]
pub fn trans_leq<S: Scalar>(u: Point<S>, v: Point<S>) -> bool {
    u.y < v.y || (u.y == v.y && u.x <= v.x)
}

#[inline]
fn transposed<S: Scalar>(p: Point<S>) -> Point<S> {
    Point::new(p.y, p.x)
}

/// Signed distance along y from the edge (u, w) to v, evaluated at v.x.
///
/// Requires `u <= v <= w` in sweep order. Positive when v lies on the
/// high-y side of the edge; zero for a vertical edge.
pub fn edge_eval<S: Scalar>(u: Point<S>, v: Point<S>, w: Point<S>) -> S {
    let gap_l = v.x - u.x;
    let gap_r = w.x - v.x;
    if gap_l + gap_r > S::ZERO {
        return S::edge_offset(u.y, v.y, w.y, gap_l, gap_r);
    }
    S::ZERO
}

/// Same sign as `edge_eval(u, v, w)` but cheaper: the cross product of
/// `w - u` and `v - u`.
#[inline]
pub fn edge_sign<S: Scalar>(u: Point<S>, v: Point<S>, w: Point<S>) -> S {
    (w - u).cross(&(v - u))
}

#[inline]
pub fn trans_eval<S: Scalar>(u: Point<S>, v: Point<S>, w: Point<S>) -> S {
    edge_eval(transposed(u), transposed(v), transposed(w))
}

#[inline]
pub fn trans_sign<S: Scalar>(u: Point<S>, v: Point<S>, w: Point<S>) -> S {
    edge_sign(transposed(u), transposed(v), transposed(w))
}

/// True when (u, v, w) turn counter-clockwise or are collinear.
#[inline]
pub fn vert_ccw<S: Scalar>(u: Point<S>, v: Point<S>, w: Point<S>) -> bool {
    (v - u).cross(&(w - u)) >= S::ZERO
}

/// Interpolates between x and y with weights b and a. Negative weights are
/// clamped to zero; two zero weights give the midpoint.
pub fn real_interpolate<S: Scalar>(a: S, x: S, b: S, y: S) -> S {
    let a = if a < S::ZERO { S::ZERO } else { a };
    let b = if b < S::ZERO { S::ZERO } else { b };
    if a <= b {
        if b == S::ZERO {
            (x + y) * S::HALF
        } else {
            x + (y - x) * (a / (a + b))
        }
    } else {
        y + (x - y) * (b / (a + b))
    }
}

/// Intersection of the edges (o1, d1) and (o2, d2).
///
/// Each coordinate is computed separately from the endpoints sorted along
/// that axis, so the result always lies inside the bounding box of the
/// overlap even when the edges are nearly parallel. The work happens in
/// `Real::Wide` and is rounded back once at the end.
pub fn edge_intersect(o1: Point, d1: Point, o2: Point, d2: Point) -> Point {
    let wide = |p: Point| Point::new(p.x.widen(), p.y.widen());
    let (o1, d1, o2, d2) = (wide(o1), wide(d1), wide(o2), wide(d2));
    let x = intersect_axis(o1, d1, o2, d2, vert_leq, edge_eval, edge_sign, |p| p.x);
    let y = intersect_axis(o1, d1, o2, d2, trans_leq, trans_eval, trans_sign, |p| p.y);
    Point::new(Real::narrow(x), Real::narrow(y))
}

#[allow(clippy::too_many_arguments)]
fn intersect_axis<S: Scalar>(
    mut o1: Point<S>,
    mut d1: Point<S>,
    mut o2: Point<S>,
    mut d2: Point<S>,
    leq: fn(Point<S>, Point<S>) -> bool,
    eval: fn(Point<S>, Point<S>, Point<S>) -> S,
    sign: fn(Point<S>, Point<S>, Point<S>) -> S,
    coord: fn(Point<S>) -> S,
) -> S {
    if !leq(o1, d1) {
        core::mem::swap(&mut o1, &mut d1);
    }
    if !leq(o2, d2) {
        core::mem::swap(&mut o2, &mut d2);
    }
    if !leq(o1, o2) {
        core::mem::swap(&mut o1, &mut o2);
        core::mem::swap(&mut d1, &mut d2);
    }

    if !leq(o2, d1) {
        // Technically no intersection; do our best.
        return (coord(o2) + coord(d1)) * S::HALF;
    }

    let (mut z1, mut z2, far) = if leq(d1, d2) {
        // Interpolate between o2 and d1.
        (eval(o1, o2, d1), eval(o2, d1, d2), d1)
    } else {
        // Interpolate between o2 and d2.
        (sign(o1, o2, d1), -sign(o1, d2, d1), d2)
    };
    if z1 + z2 < S::ZERO {
        z1 = -z1;
        z2 = -z2;
    }
    real_interpolate(z1, coord(o2), z2, coord(far))
}
