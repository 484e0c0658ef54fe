// Copyright 2025 Lars Brubaker
// License: SGI Free Software License B (MIT-compatible)
//
// Partitioning of the swept mesh into output polygons.

use log::debug;

use super::{EdgeId, FaceId, Mesh};
use crate::error::MeshError;
use crate::geom::{edge_sign, vert_ccw, vert_leq};
use crate::scalar::{Real, Scalar};

impl Mesh {
    /// Triangulates a face that is monotone with respect to the sweep
    /// direction by adding diagonals.
    ///
    /// The face must have at least three edges; smaller loops are left as
    /// they are.
    pub fn tessellate_mono_region(&mut self, face: FaceId) -> Result<(), MeshError> {
        let mut up = self[face].edge;
        if self.lnext(up) == up || self.lnext(self.lnext(up)) == up {
            debug!("skipping degenerate region {:?}", face);
            return Ok(());
        }

        // Find the left-most vertex, then the right-most one along the
        // upper chain.
        while vert_leq(self.dst_pos(up), self.org_pos(up)) {
            up = self.lprev(up);
        }
        while vert_leq(self.org_pos(up), self.dst_pos(up)) {
            up = self.lnext(up);
        }
        let mut lo = self.lprev(up);

        while self.lnext(up) != lo {
            if vert_leq(self.dst_pos(up), self.org_pos(lo)) {
                // up.dst is on the left; make triangles fanning from lo.org.
                while self.lnext(lo) != up {
                    let next = self.lnext(lo);
                    let convex = edge_sign(self.org_pos(lo), self.dst_pos(lo), self.dst_pos(next))
                        <= Real::ZERO;
                    if !(self.edge_goes_left(next) || convex) {
                        break;
                    }
                    lo = self.connect(next, lo)?.mirror();
                }
                lo = self.lprev(lo);
            } else {
                // lo.org is on the left; fan from up.dst.
                while self.lnext(lo) != up {
                    let prev = self.lprev(up);
                    let convex = edge_sign(self.dst_pos(up), self.org_pos(up), self.org_pos(prev))
                        >= Real::ZERO;
                    if !(self.edge_goes_right(prev) || convex) {
                        break;
                    }
                    up = self.connect(up, prev)?.mirror();
                }
                up = self.lnext(up);
            }
        }

        // Close off the remaining fan from the right-most vertex.
        while self.lnext(self.lnext(lo)) != up {
            let next = self.lnext(lo);
            lo = self.connect(next, lo)?.mirror();
        }
        Ok(())
    }

    /// Triangulates every face marked inside. Faces created on the way are
    /// already triangles and are not revisited.
    pub fn tessellate_interior(&mut self) -> Result<(), MeshError> {
        for f in self.face_ids() {
            if self.contains_face(f) && self[f].inside {
                self.tessellate_mono_region(f)?;
            }
        }
        Ok(())
    }

    /// Removes diagonals between inside faces as long as the merged face
    /// stays convex and has at most `max_vertices` corners.
    pub fn merge_convex_faces(&mut self, max_vertices: usize) -> Result<(), MeshError> {
        for f in self.face_ids() {
            if !self.contains_face(f) || !self[f].inside {
                continue;
            }

            let mut cur = Some(self[f].edge);
            let start = self.org(self[f].edge);
            let mut e = self[f].edge;
            loop {
                let mut next = self.lnext(e);
                let sym = e.mirror();
                if let Some(other) = self.lface(sym) {
                    if other != f && self[other].inside && self.mergeable(e, f, other, max_vertices) {
                        next = self.lnext(sym);
                        self.delete_edge(sym)?;
                        cur = None;
                    }
                }
                if cur.is_some() && self.org(self.lnext(e)) == start {
                    break;
                }
                e = next;
                cur = Some(e);
            }
        }
        Ok(())
    }

    fn mergeable(&self, e: EdgeId, f: FaceId, other: FaceId, max_vertices: usize) -> bool {
        let total = self.face_degree(f) + self.face_degree(other) - 2;
        if total > max_vertices {
            return false;
        }
        let sym = e.mirror();
        let far_of_other = self.org(self.lnext(self.lnext(sym)));
        let far_of_self = self.org(self.lnext(self.lnext(e)));
        vert_ccw(
            self.org_pos(self.lprev(e)),
            self.org_pos(e),
            self.position(far_of_other),
        ) && vert_ccw(
            self.org_pos(self.lprev(sym)),
            self.org_pos(sym),
            self.position(far_of_self),
        )
    }

    /// Resets edge windings so that edges separating an inside face from an
    /// outside one carry `value` (positive toward the inside) and all others
    /// carry zero. With `keep_only_boundary`, the latter are deleted instead.
    pub fn set_winding_number(&mut self, value: i32, keep_only_boundary: bool) -> Result<(), MeshError> {
        for e in self.edge_ids() {
            if !self.contains_edge(e) {
                continue;
            }
            let left_inside = self.lface(e).map_or(false, |f| self[f].inside);
            let right_inside = self.rface(e).map_or(false, |f| self[f].inside);
            if left_inside != right_inside {
                let w = if left_inside { value } else { -value };
                self[e].winding = w;
                self[e.mirror()].winding = -w;
            } else if keep_only_boundary {
                self.delete_edge(e)?;
            } else {
                self[e].winding = 0;
                self[e.mirror()].winding = 0;
            }
        }
        Ok(())
    }
}
