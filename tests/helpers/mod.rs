// Copyright 2025 Lars Brubaker
// License: SGI Free Software License B (MIT-compatible)
//
// Shared test utilities for sweep-tess tests.

#![allow(dead_code)]

use sweep_tess::{point, FillRule, Point, Scalar, TessOptions, Tessellation, Tessellator};

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Contour from `(x, y)` pairs.
pub fn contour(points: &[(f64, f64)]) -> Vec<Point> {
    points.iter().map(|&(x, y)| point(x, y)).collect()
}

/// Axis-aligned rectangle, counter-clockwise.
pub fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> Vec<Point> {
    contour(&[(x0, y0), (x1, y0), (x1, y1), (x0, y1)])
}

/// Regular polygon approximating a circle; counter-clockwise unless
/// `clockwise`.
pub fn circle(cx: f64, cy: f64, r: f64, segments: usize, clockwise: bool) -> Vec<Point> {
    let mut points: Vec<Point> = (0..segments)
        .map(|i| {
            let a = i as f64 * std::f64::consts::TAU / segments as f64;
            point(cx + r * a.cos(), cy + r * a.sin())
        })
        .collect();
    if clockwise {
        points.reverse();
    }
    points
}

/// Star with `tips` points alternating between two radii.
pub fn star(tips: usize, outer: f64, inner: f64) -> Vec<Point> {
    (0..tips * 2)
        .map(|i| {
            let r = if i % 2 == 0 { outer } else { inner };
            let a = i as f64 * std::f64::consts::PI / tips as f64;
            point(r * a.cos(), r * a.sin())
        })
        .collect()
}

/// Self-intersecting star polygon visiting every `step`-th of `n` points on
/// a circle, e.g. `(5, 2)` for a pentagram.
pub fn star_polygon(n: usize, step: usize, r: f64) -> Vec<Point> {
    (0..n)
        .map(|i| {
            let a = ((i * step) % n) as f64 * std::f64::consts::TAU / n as f64
                + std::f64::consts::FRAC_PI_2;
            point(r * a.cos(), r * a.sin())
        })
        .collect()
}

pub fn run(contours: &[Vec<Point>], options: TessOptions) -> Tessellation {
    init_logger();
    let mut tess = Tessellator::with_options(options);
    for c in contours {
        tess.add_contour(c).expect("contour rejected");
    }
    let output = tess.tessellate().expect("tessellation failed");
    verify_valid_output(&output);
    output
}

pub fn triangulate(contours: &[Vec<Point>], rule: FillRule) -> Tessellation {
    run(contours, TessOptions::DEFAULT.with_fill_rule(rule))
}

pub fn triangle_area(a: Point, b: Point, c: Point) -> f64 {
    let (ax, ay) = (a.x.to_f64(), a.y.to_f64());
    let (bx, by) = (b.x.to_f64(), b.y.to_f64());
    let (cx, cy) = (c.x.to_f64(), c.y.to_f64());
    0.5 * ((bx - ax) * (cy - ay) - (cx - ax) * (by - ay))
}

/// Sum of the unsigned areas of the output triangles.
pub fn total_triangle_area(output: &Tessellation) -> f64 {
    let v = output.vertices();
    output
        .triangles()
        .map(|[a, b, c]| triangle_area(v[a as usize], v[b as usize], v[c as usize]).abs())
        .sum()
}

/// Indices in range, vertices finite, polygons of at least three corners.
pub fn verify_valid_output(output: &Tessellation) {
    let vertices = output.vertices();
    assert_eq!(vertices.len(), output.input_indices().len());
    for (i, v) in vertices.iter().enumerate() {
        assert!(
            v.x.to_f64().is_finite() && v.y.to_f64().is_finite(),
            "vertex {} = {:?} is not finite",
            i,
            v
        );
    }
    for (i, polygon) in output.polygons().enumerate() {
        assert!(polygon.len() >= 3, "polygon {} has {} corners", i, polygon.len());
        for &idx in polygon {
            assert!(
                (idx as usize) < vertices.len(),
                "polygon {} refers to vertex {} of {}",
                i,
                idx,
                vertices.len()
            );
        }
    }
}

/// Every triangle winds counter-clockwise with at least `epsilon` area.
pub fn verify_ccw_triangles(output: &Tessellation, epsilon: f64) {
    let v = output.vertices();
    for (i, [a, b, c]) in output.triangles().enumerate() {
        let area = triangle_area(v[a as usize], v[b as usize], v[c as usize]);
        assert!(
            area > epsilon,
            "triangle {} is degenerate or clockwise (area={}, {:?} {:?} {:?})",
            i,
            area,
            v[a as usize],
            v[b as usize],
            v[c as usize]
        );
    }
}

pub fn assert_area_approx(actual: f64, expected: f64, tolerance: f64, label: &str) {
    assert!(
        (actual - expected).abs() < tolerance,
        "{}: expected area ~{}, got {} (diff={})",
        label,
        expected,
        actual,
        (actual - expected).abs()
    );
}

/// Area of a simple polygon.
pub fn polygon_signed_area(points: &[Point]) -> f64 {
    let n = points.len();
    let mut area = 0.0;
    for i in 0..n {
        let (a, b) = (points[i], points[(i + 1) % n]);
        area += a.x.to_f64() * b.y.to_f64() - b.x.to_f64() * a.y.to_f64();
    }
    area * 0.5
}

/// Small xorshift generator so randomized tests replay from a fixed seed.
pub struct SeededRng(u64);

impl SeededRng {
    pub fn new(seed: u64) -> Self {
        SeededRng(seed.max(1))
    }

    pub fn next_u64(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }

    /// Uniform in `lo..=hi`.
    pub fn range(&mut self, lo: u32, hi: u32) -> u32 {
        lo + (self.next_u64() % u64::from(hi - lo + 1)) as u32
    }
}

/// Winding number of `(px, py)` with respect to closed contours, counting
/// counter-clockwise loops as +1. Exact for inputs on a coarse grid.
pub fn winding_number(contours: &[Vec<(f64, f64)>], px: f64, py: f64) -> i32 {
    let mut winding = 0;
    for c in contours {
        for i in 0..c.len() {
            let (a, b) = (c[i], c[(i + 1) % c.len()]);
            let cross = (b.0 - a.0) * (py - a.1) - (b.1 - a.1) * (px - a.0);
            if a.1 <= py && py < b.1 && cross > 0.0 {
                winding += 1;
            } else if b.1 <= py && py < a.1 && cross < 0.0 {
                winding -= 1;
            }
        }
    }
    winding
}

/// Distance from `(px, py)` to the nearest contour edge.
pub fn distance_to_contours(contours: &[Vec<(f64, f64)>], px: f64, py: f64) -> f64 {
    let mut best = f64::INFINITY;
    for c in contours {
        for i in 0..c.len() {
            let (a, b) = (c[i], c[(i + 1) % c.len()]);
            let (dx, dy) = (b.0 - a.0, b.1 - a.1);
            let len2 = dx * dx + dy * dy;
            let t = if len2 > 0.0 {
                (((px - a.0) * dx + (py - a.1) * dy) / len2).clamp(0.0, 1.0)
            } else {
                0.0
            };
            let (qx, qy) = (a.0 + t * dx - px, a.1 + t * dy - py);
            best = best.min((qx * qx + qy * qy).sqrt());
        }
    }
    best
}

/// Number of output triangles containing `(px, py)`, edges included.
pub fn covering_triangles(output: &Tessellation, px: f64, py: f64) -> usize {
    let v = output.vertices();
    let side = |a: Point, b: Point| {
        let (ax, ay) = (a.x.to_f64(), a.y.to_f64());
        let (bx, by) = (b.x.to_f64(), b.y.to_f64());
        (bx - ax) * (py - ay) - (by - ay) * (px - ax)
    };
    output
        .triangles()
        .filter(|&[a, b, c]| {
            let (a, b, c) = (v[a as usize], v[b as usize], v[c as usize]);
            let (s0, s1, s2) = (side(a, b), side(b, c), side(c, a));
            (s0 >= 0.0 && s1 >= 0.0 && s2 >= 0.0) || (s0 <= 0.0 && s1 <= 0.0 && s2 <= 0.0)
        })
        .count()
}

/// Checks triangle coverage against the fill rule on an off-grid lattice,
/// skipping samples within `margin` of an input edge.
pub fn verify_coverage(contours: &[Vec<(f64, f64)>], rule: FillRule, output: &Tessellation, margin: f64) {
    let (mut lo, mut hi) = ((f64::INFINITY, f64::INFINITY), (f64::NEG_INFINITY, f64::NEG_INFINITY));
    for &(x, y) in contours.iter().flatten() {
        lo = (lo.0.min(x), lo.1.min(y));
        hi = (hi.0.max(x), hi.1.max(y));
    }
    const STEPS: usize = 24;
    for i in 0..STEPS {
        for j in 0..STEPS {
            let px = lo.0 + (hi.0 - lo.0) * (i as f64 + 0.37) / STEPS as f64;
            let py = lo.1 + (hi.1 - lo.1) * (j as f64 + 0.61) / STEPS as f64;
            if distance_to_contours(contours, px, py) < margin {
                continue;
            }
            let winding = winding_number(contours, px, py);
            let covered = covering_triangles(output, px, py);
            if rule.is_inside(winding) {
                assert_eq!(
                    covered, 1,
                    "({px}, {py}) has winding {winding} under {rule:?} but {covered} triangles cover it"
                );
            } else {
                assert_eq!(
                    covered, 0,
                    "({px}, {py}) has winding {winding} under {rule:?} but is covered"
                );
            }
        }
    }
}
