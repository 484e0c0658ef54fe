// Copyright 2025 Lars Brubaker
// License: SGI Free Software License B (MIT-compatible)
//
// Randomized contours checked against an exact winding count.
//
// Also meant to run with `--features fixed-point` and
// `--features debug-checks`.

mod helpers;

use helpers::{
    assert_area_approx, contour, total_triangle_area, triangulate, verify_coverage, SeededRng,
};
use sweep_tess::{FillRule, Point};

const RULES: [FillRule; 5] = [
    FillRule::EvenOdd,
    FillRule::NonZero,
    FillRule::Positive,
    FillRule::Negative,
    FillRule::AbsGeqTwo,
];

fn to_points(contours: &[Vec<(f64, f64)>]) -> Vec<Vec<Point>> {
    contours.iter().map(|c| contour(c)).collect()
}

fn check(contours: &[Vec<(f64, f64)>], rule: FillRule) -> f64 {
    let output = triangulate(&to_points(contours), rule);
    verify_coverage(contours, rule, &output, 1e-2);
    total_triangle_area(&output)
}

fn grid_contours(rng: &mut SeededRng) -> Vec<Vec<(f64, f64)>> {
    (0..rng.range(1, 3))
        .map(|_| {
            (0..rng.range(3, 8))
                .map(|_| (f64::from(rng.range(0, 5)), f64::from(rng.range(0, 5))))
                .collect()
        })
        .collect()
}

#[test]
fn random_grid_contours_match_the_winding_count() {
    let mut rng = SeededRng::new(0x5eed_7e55);
    for case in 0..300 {
        let contours = grid_contours(&mut rng);
        let rule = RULES[rng.range(0, 4) as usize];
        log::debug!("case {case}: {rule:?} {contours:?}");
        check(&contours, rule);
    }
}

#[test]
fn tangled_contours_keep_positive_area() {
    let contours = vec![
        vec![(2.0, 2.0), (1.0, 4.0), (2.0, 0.0), (5.0, 3.0), (3.0, 1.0)],
        vec![
            (2.0, 1.0),
            (5.0, 4.0),
            (1.0, 1.0),
            (4.0, 0.0),
            (0.0, 4.0),
            (5.0, 2.0),
            (2.0, 3.0),
            (0.0, 3.0),
            (2.0, 1.0),
            (2.0, 2.0),
        ],
        vec![(3.0, 3.0), (4.0, 2.0), (2.0, 4.0), (1.0, 4.0), (5.0, 1.0), (1.0, 2.0), (4.0, 0.0), (0.0, 5.0)],
    ];
    let area = check(&contours, FillRule::Positive);
    assert_area_approx(area, 4.666, 2e-2, "positive");
}

#[test]
fn shared_vertices_under_even_odd() {
    let contours = vec![
        vec![(2.0, 1.0), (2.0, 0.0), (4.0, 2.0), (3.0, 5.0), (0.0, 0.0), (0.0, 2.0), (2.0, 0.0), (4.0, 4.0)],
        vec![(4.0, 3.0), (0.0, 2.0), (4.0, 0.0), (3.0, 0.0)],
        vec![(0.0, 5.0), (1.0, 2.0), (2.0, 0.0), (3.0, 2.0), (3.0, 1.0), (2.0, 1.0), (3.0, 5.0)],
    ];
    for rule in RULES {
        check(&contours, rule);
    }
}
