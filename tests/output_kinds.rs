// Copyright 2025 Lars Brubaker
// License: SGI Free Software License B (MIT-compatible)
//
// Tests for the monotone, convex and boundary output kinds.

mod helpers;

use helpers::{assert_area_approx, circle, rect, run, total_triangle_area};
use sweep_tess::{OutputKind, Point, TessOptions};

fn ring() -> Vec<Vec<Point>> {
    let mut hole = rect(3.0, 3.0, 7.0, 7.0);
    hole.reverse();
    vec![rect(0.0, 0.0, 10.0, 10.0), hole]
}

fn options(output: OutputKind) -> TessOptions {
    TessOptions::non_zero().with_output(output)
}

// --- ConvexPolygons ---

#[test]
fn convex_square_merges_back_into_one_quad() {
    let output = run(
        &[rect(0.0, 0.0, 1.0, 1.0)],
        options(OutputKind::ConvexPolygons { max_vertices: 4 }),
    );
    assert_eq!(output.polygon_count(), 1);
    assert_eq!(output.polygon(0).len(), 4);
    assert_eq!(output.triangles().count(), 2);
    assert_area_approx(output.area(), 1.0, 1e-4, "merged square");
}

#[test]
fn convex_hexagon_respects_the_corner_limit() {
    let hexagon = vec![circle(0.0, 0.0, 5.0, 6, false)];

    let merged = run(&hexagon, options(OutputKind::ConvexPolygons { max_vertices: 6 }));
    assert_eq!(merged.polygon_count(), 1);
    assert_eq!(merged.polygon(0).len(), 6);

    let triangles = run(&hexagon, options(OutputKind::ConvexPolygons { max_vertices: 3 }));
    assert_eq!(triangles.polygon_count(), 4);
    assert!(triangles.polygons().all(|p| p.len() == 3));

    assert_area_approx(merged.area(), triangles.area(), 1e-3, "same coverage");
}

#[test]
fn convex_polygons_never_exceed_the_limit() {
    let output = run(&ring(), options(OutputKind::ConvexPolygons { max_vertices: 5 }));
    for polygon in output.polygons() {
        assert!(polygon.len() <= 5, "polygon with {} corners", polygon.len());
    }
    assert_area_approx(output.area(), 84.0, 1e-3, "ring");
    assert_area_approx(total_triangle_area(&output), 84.0, 1e-3, "fanned ring");
}

// --- MonotonePolygons ---

#[test]
fn monotone_square_is_a_single_region() {
    let output = run(&[rect(0.0, 0.0, 2.0, 2.0)], options(OutputKind::MonotonePolygons));
    assert_eq!(output.polygon_count(), 1);
    assert_eq!(output.polygon(0).len(), 4);
    assert_eq!(output.triangles().count(), 0, "monotone polygons are not fanned");
    assert_area_approx(output.area(), 4.0, 1e-4, "square");
}

#[test]
fn monotone_regions_cover_the_ring() {
    let output = run(&ring(), options(OutputKind::MonotonePolygons));
    assert!(output.polygon_count() >= 2, "a ring needs at least two monotone pieces");
    assert_area_approx(output.area(), 84.0, 1e-3, "ring");
}

// --- BoundaryContours ---

#[test]
fn boundary_of_a_ring_is_two_loops() {
    let output = run(&ring(), options(OutputKind::BoundaryContours));
    assert_eq!(output.polygon_count(), 2);
    assert!(output.polygons().all(|p| p.len() == 4));
    // Outer loop counter-clockwise, hole clockwise.
    assert_area_approx(output.area(), 84.0, 1e-3, "ring");
    assert_eq!(output.triangles().count(), 0);
}

#[test]
fn boundary_of_overlapping_squares_is_their_union() {
    let output = run(
        &[rect(0.0, 0.0, 2.0, 2.0), rect(1.0, 1.0, 3.0, 3.0)],
        options(OutputKind::BoundaryContours),
    );
    assert_eq!(output.polygon_count(), 1);
    assert_eq!(output.polygon(0).len(), 8);
    assert_area_approx(output.area(), 7.0, 1e-3, "union");
}

#[test]
fn boundary_of_abutting_squares_drops_the_shared_edge() {
    let output = run(
        &[rect(0.0, 0.0, 1.0, 1.0), rect(1.0, 0.0, 2.0, 1.0)],
        options(OutputKind::BoundaryContours),
    );
    assert_eq!(output.polygon_count(), 1);
    assert_area_approx(output.area(), 2.0, 1e-4, "merged rectangle");
}

#[test]
fn boundary_under_even_odd_keeps_the_overlap_as_a_hole() {
    let output = run(
        &[rect(0.0, 0.0, 2.0, 2.0), rect(1.0, 1.0, 3.0, 3.0)],
        TessOptions::even_odd().with_output(OutputKind::BoundaryContours),
    );
    assert_area_approx(output.area(), 6.0, 1e-3, "symmetric difference");
    assert!(output.polygon_count() >= 1);
}
