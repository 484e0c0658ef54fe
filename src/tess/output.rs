// Copyright 2025 Lars Brubaker
// License: SGI Free Software License B (MIT-compatible)
//
// The result of a tessellation run.

#[cfg(feature = "serialization")]
use serde::{Deserialize, Serialize};

use super::OutputKind;
use crate::mesh::Mesh;
use crate::scalar::Scalar;
use crate::vector::{Point, RotateDirection};

/// Polygons over a shared vertex list, in input coordinates.
///
/// Every polygon winds counter-clockwise, except holes in
/// `BoundaryContours` output which wind clockwise.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct Tessellation {
    kind: OutputKind,
    vertices: Vec<Point>,
    input_indices: Vec<Option<u32>>,
    indices: Vec<u32>,
    /// Start of each polygon in `indices`, plus a final end offset.
    offsets: Vec<usize>,
}

impl Default for Tessellation {
    fn default() -> Self {
        Tessellation {
            kind: OutputKind::Triangles,
            vertices: Vec::new(),
            input_indices: Vec::new(),
            indices: Vec::new(),
            offsets: vec![0],
        }
    }
}

impl Tessellation {
    /// Collects the loops of every inside face. Vertices are numbered in
    /// order of first use, so identical runs give identical output.
    pub(crate) fn from_mesh(mesh: &Mesh, kind: OutputKind) -> Self {
        let mut output = Tessellation {
            kind,
            ..Tessellation::default()
        };
        let mut numbering: Vec<Option<u32>> = vec![None; mesh.vertex_max_count()];

        for (_, face) in mesh.faces() {
            if !face.inside {
                continue;
            }
            let start = face.edge;
            let mut e = start;
            loop {
                let v = mesh.org(e);
                let slot = &mut numbering[v.index()];
                let n = match *slot {
                    Some(n) => n,
                    None => {
                        let n = output.vertices.len() as u32;
                        *slot = Some(n);
                        output
                            .vertices
                            .push(mesh[v].position.rotated(RotateDirection::CounterClockwise));
                        output.input_indices.push(mesh[v].input);
                        n
                    }
                };
                output.indices.push(n);
                e = mesh.lnext(e);
                if e == start {
                    break;
                }
            }
            output.offsets.push(output.indices.len());
        }
        output
    }

    pub fn kind(&self) -> OutputKind {
        self.kind
    }

    pub fn vertices(&self) -> &[Point] {
        &self.vertices
    }

    /// For each output vertex, the index of the input point it came from,
    /// or `None` for points created at edge crossings.
    pub fn input_indices(&self) -> &[Option<u32>] {
        &self.input_indices
    }

    pub fn polygon_count(&self) -> usize {
        self.offsets.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.polygon_count() == 0
    }

    /// Vertex indices of polygon `i`.
    pub fn polygon(&self, i: usize) -> &[u32] {
        &self.indices[self.offsets[i]..self.offsets[i + 1]]
    }

    pub fn polygons(&self) -> Polygons<'_> {
        Polygons {
            output: self,
            next: 0,
        }
    }

    /// Fans each polygon into triangles. Only meaningful when the polygons
    /// are convex, that is for `Triangles` and `ConvexPolygons` output; for
    /// the other kinds the iterator is empty.
    pub fn triangles(&self) -> Triangles<'_> {
        let polygons = match self.kind {
            OutputKind::Triangles | OutputKind::ConvexPolygons { .. } => self.polygon_count(),
            _ => 0,
        };
        Triangles {
            output: self,
            polygon: 0,
            polygons,
            corner: 1,
        }
    }

    /// Signed area covered by the polygons, holes counting negative.
    pub fn area(&self) -> f64 {
        let mut twice = 0.0;
        for polygon in self.polygons() {
            let n = polygon.len();
            for i in 0..n {
                let a = self.vertices[polygon[i] as usize];
                let b = self.vertices[polygon[(i + 1) % n] as usize];
                twice += a.x.to_f64() * b.y.to_f64() - b.x.to_f64() * a.y.to_f64();
            }
        }
        twice * 0.5
    }
}

/// Iterator over the polygons of a `Tessellation`.
#[derive(Clone)]
pub struct Polygons<'a> {
    output: &'a Tessellation,
    next: usize,
}

impl<'a> Iterator for Polygons<'a> {
    type Item = &'a [u32];

    fn next(&mut self) -> Option<&'a [u32]> {
        if self.next >= self.output.polygon_count() {
            return None;
        }
        let polygon = self.output.polygon(self.next);
        self.next += 1;
        Some(polygon)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.output.polygon_count() - self.next;
        (n, Some(n))
    }
}

impl<'a> ExactSizeIterator for Polygons<'a> {}

/// Iterator over the triangles of a `Tessellation`, as vertex index
/// triples.
#[derive(Clone)]
pub struct Triangles<'a> {
    output: &'a Tessellation,
    polygon: usize,
    polygons: usize,
    corner: usize,
}

impl<'a> Iterator for Triangles<'a> {
    type Item = [u32; 3];

    fn next(&mut self) -> Option<[u32; 3]> {
        while self.polygon < self.polygons {
            let polygon = self.output.polygon(self.polygon);
            if self.corner + 1 < polygon.len() {
                let tri = [polygon[0], polygon[self.corner], polygon[self.corner + 1]];
                self.corner += 1;
                return Some(tri);
            }
            self.polygon += 1;
            self.corner = 1;
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector::point;

    fn two_triangles() -> Tessellation {
        Tessellation {
            kind: OutputKind::ConvexPolygons { max_vertices: 4 },
            vertices: vec![point(0.0, 0.0), point(2.0, 0.0), point(2.0, 1.0), point(0.0, 1.0), point(3.0, 0.0)],
            input_indices: vec![Some(0), Some(1), Some(2), Some(3), None],
            indices: vec![0, 1, 2, 3, 1, 4, 2],
            offsets: vec![0, 4, 7],
        }
    }

    #[test]
    fn polygons_are_sliced_by_offset() {
        let output = two_triangles();
        assert_eq!(output.polygon_count(), 2);
        let polygons: Vec<&[u32]> = output.polygons().collect();
        assert_eq!(polygons, vec![&[0, 1, 2, 3][..], &[1, 4, 2][..]]);
        assert_eq!(output.polygons().len(), 2);
    }

    #[test]
    fn triangles_fan_and_restart() {
        let output = two_triangles();
        let first: Vec<[u32; 3]> = output.triangles().collect();
        assert_eq!(first, vec![[0, 1, 2], [0, 2, 3], [1, 4, 2]]);
        let second: Vec<[u32; 3]> = output.triangles().collect();
        assert_eq!(first, second);
    }

    #[test]
    fn area_sums_polygons() {
        let output = two_triangles();
        assert!((output.area() - 2.5).abs() < 1e-6);
    }

    #[test]
    fn empty_output() {
        let output = Tessellation::default();
        assert!(output.is_empty());
        assert_eq!(output.triangles().next(), None);
        assert_eq!(output.area(), 0.0);
    }

    #[test]
    fn boundary_output_has_no_triangles() {
        let mut output = two_triangles();
        output.kind = OutputKind::BoundaryContours;
        assert_eq!(output.triangles().count(), 0);
        assert_eq!(output.polygons().count(), 2);
    }
}
