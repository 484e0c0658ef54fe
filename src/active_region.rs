// Copyright 2025 Lars Brubaker
// License: SGI Free Software License B (MIT-compatible)
//
// Ordered set of the edges crossing the sweep line.
//
// Each region is the strip between its upper edge `e_up` and the upper edge
// of its left neighbour. Regions are kept left to right along the sweep
// line in a doubly linked list, bracketed by two sentinel regions whose
// edges lie outside the input bounds.

use crate::error::MeshError;
use crate::geom::{edge_eval, edge_sign, vert_leq};
use crate::mesh::{EdgeId, Mesh, VertexId};
use crate::pool::{Handle, Pool};
use crate::scalar::{Real, Scalar};
use crate::vector::Point;

pub type RegionId = Handle<ActiveRegion>;

#[derive(Clone, Debug)]
pub struct ActiveRegion {
    /// Upper edge, directed from the unprocessed end to the processed one.
    pub e_up: EdgeId,
    pub winding_number: i32,
    pub inside: bool,
    /// Marks the two bracketing regions.
    pub sentinel: bool,
    /// Set when the upper or lower edge changed and the pair must be
    /// rechecked for intersection.
    pub dirty: bool,
    /// `e_up` is a temporary edge to be replaced once a better one is known.
    pub fix_upper_edge: bool,
    left: Option<RegionId>,
    right: Option<RegionId>,
}

impl ActiveRegion {
    pub fn new(e_up: EdgeId) -> Self {
        ActiveRegion {
            e_up,
            winding_number: 0,
            inside: false,
            sentinel: false,
            dirty: false,
            fix_upper_edge: false,
            left: None,
            right: None,
        }
    }
}

/// True when `e1` lies left of (or level with) `e2` on the sweep line
/// through `event`.
///
/// Both edges must span the event in the sweep direction. Edges that end at
/// the event itself are compared by their direction instead, so that edges
/// meeting at the event are ordered by angle.
pub fn edge_leq(mesh: &Mesh, event: VertexId, e1: EdgeId, e2: EdgeId) -> bool {
    let ev = mesh.position(event);
    let (o1, d1) = (mesh.org_pos(e1), mesh.dst_pos(e1));
    let (o2, d2) = (mesh.org_pos(e2), mesh.dst_pos(e2));
    let e1_at_event = mesh.dst(e1) == event;
    let e2_at_event = mesh.dst(e2) == event;

    match (e1_at_event, e2_at_event) {
        (true, true) => {
            // Two edges ending at the event: sort by slope.
            if vert_leq(o1, o2) {
                edge_sign(d2, o1, o2) <= Real::ZERO
            } else {
                edge_sign(d1, o2, o1) >= Real::ZERO
            }
        }
        (true, false) => edge_sign(d2, ev, o2) <= Real::ZERO,
        (false, true) => edge_sign(d1, ev, o1) >= Real::ZERO,
        (false, false) => edge_eval(d1, ev, o1) >= edge_eval(d2, ev, o2),
    }
}

#[derive(Default)]
pub struct ActiveRegions {
    regions: Pool<ActiveRegion>,
    leftmost: Option<RegionId>,
    rightmost: Option<RegionId>,
}

impl core::ops::Index<RegionId> for ActiveRegions {
    type Output = ActiveRegion;
    #[inline]
    fn index(&self, r: RegionId) -> &ActiveRegion {
        &self.regions[r]
    }
}

impl core::ops::IndexMut<RegionId> for ActiveRegions {
    #[inline]
    fn index_mut(&mut self, r: RegionId) -> &mut ActiveRegion {
        &mut self.regions[r]
    }
}

impl ActiveRegions {
    /// An empty structure with no sentinels.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the structure for a sweep over `min..=max` (sweep frame),
    /// adding the two sentinel edges to `mesh`.
    pub fn make_regions(mesh: &mut Mesh, min: Point, max: Point) -> Result<Self, MeshError> {
        let mut regions = ActiveRegions::new();
        let margin = Real::from_f64(0.01);
        let w = (max.x - min.x) + margin;
        let h = (max.y - min.y) + margin;
        let s_min = min.x - w;
        let s_max = max.x + w;
        regions.add_sentinel(mesh, s_min, s_max, min.y - h)?;
        regions.add_sentinel(mesh, s_min, s_max, max.y + h)?;
        Ok(regions)
    }

    fn add_sentinel(&mut self, mesh: &mut Mesh, s_min: Real, s_max: Real, t: Real) -> Result<(), MeshError> {
        let e = mesh.make_edge()?;
        let org = mesh.org(e);
        let dst = mesh.dst(e);
        mesh[org].position = Point::new(s_max, t);
        mesh[dst].position = Point::new(s_min, t);

        let mut region = ActiveRegion::new(e);
        region.sentinel = true;
        let id = self.insert(mesh, dst, region)?;
        mesh[e].region = Some(id);
        Ok(())
    }

    /// Drops every region. Mesh back-references are not touched.
    pub fn clear(&mut self) {
        self.regions.clear();
        self.leftmost = None;
        self.rightmost = None;
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.regions.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    #[inline]
    pub fn contains(&self, r: RegionId) -> bool {
        self.regions.contains(r)
    }

    #[inline]
    pub fn leftmost(&self) -> Option<RegionId> {
        self.leftmost
    }

    #[inline]
    pub fn rightmost(&self) -> Option<RegionId> {
        self.rightmost
    }

    #[inline]
    pub fn left(&self, r: RegionId) -> Option<RegionId> {
        self.regions[r].left
    }

    #[inline]
    pub fn right(&self, r: RegionId) -> Option<RegionId> {
        self.regions[r].right
    }

    /// Regions from left to right.
    pub fn iter(&self) -> impl Iterator<Item = RegionId> + '_ {
        let mut next = self.leftmost;
        core::iter::from_fn(move || {
            let r = next?;
            next = self.regions[r].right;
            Some(r)
        })
    }

    #[inline]
    pub fn in_left(&self, mesh: &Mesh, event: VertexId, r1: RegionId, r2: RegionId) -> bool {
        edge_leq(mesh, event, self.regions[r1].e_up, self.regions[r2].e_up)
    }

    /// The left-most region whose edge is not left of `edge`.
    pub fn find(&self, mesh: &Mesh, event: VertexId, edge: EdgeId) -> Option<RegionId> {
        self.iter()
            .find(|&r| edge_leq(mesh, event, edge, self.regions[r].e_up))
    }

    /// Unlinks `r` and returns its record.
    pub fn remove(&mut self, r: RegionId) -> Option<ActiveRegion> {
        let region = self.regions.free(r)?;
        match region.left {
            Some(l) => self.regions[l].right = region.right,
            None => self.leftmost = region.right,
        }
        match region.right {
            Some(n) => self.regions[n].left = region.left,
            None => self.rightmost = region.left,
        }
        Some(region)
    }

    /// Inserts `region` at its ordered position, searching leftwards from
    /// the right end. Among equal keys the new region goes right-most.
    pub fn insert(&mut self, mesh: &Mesh, event: VertexId, region: ActiveRegion) -> Result<RegionId, MeshError> {
        self.insert_before(mesh, event, None, region)
    }

    /// Like `insert`, but starts the leftward search just left of
    /// `right_of` (the right end when `None`).
    pub fn insert_before(
        &mut self,
        mesh: &Mesh,
        event: VertexId,
        right_of: Option<RegionId>,
        region: ActiveRegion,
    ) -> Result<RegionId, MeshError> {
        let mut prev = match right_of {
            Some(r) => self.regions[r].left,
            None => self.rightmost,
        };
        while let Some(p) = prev {
            if edge_leq(mesh, event, self.regions[p].e_up, region.e_up) {
                break;
            }
            prev = self.regions[p].left;
        }
        self.link_after(prev, region)
    }

    /// Inserts `region` immediately right of `prev`, or left-most when
    /// `prev` is `None`.
    pub fn insert_after(&mut self, prev: Option<RegionId>, region: ActiveRegion) -> Result<RegionId, MeshError> {
        self.link_after(prev, region)
    }

    fn link_after(&mut self, prev: Option<RegionId>, mut region: ActiveRegion) -> Result<RegionId, MeshError> {
        let next = match prev {
            Some(p) => self.regions[p].right,
            None => self.leftmost,
        };
        region.left = prev;
        region.right = next;
        let id = self.regions.alloc(region)?;
        match prev {
            Some(p) => self.regions[p].right = Some(id),
            None => self.leftmost = Some(id),
        }
        match next {
            Some(n) => self.regions[n].left = Some(id),
            None => self.rightmost = Some(id),
        }
        Ok(id)
    }

    /// Asserts that the links are consistent and that adjacent regions are
    /// in order at `event`.
    ///
    /// Temporary upper edges are never tested for intersection and may
    /// cross their neighbours until replaced, so pairs involving one are
    /// skipped, as are edges that do not span the event. Edges split at a
    /// rounded intersection may disagree by rounding error; a pair passes
    /// when it is out of order by no more than `NEAR_ZERO` relative to the
    /// coordinates involved.
    #[cfg(any(test, feature = "debug-checks"))]
    pub fn check(&self, mesh: &Mesh, event: VertexId) {
        let mut prev: Option<RegionId> = None;
        let mut count = 0;
        for r in self.iter() {
            assert_eq!(self.regions[r].left, prev, "broken left link at {r:?}");
            if let Some(p) = prev {
                let (lo, up) = (&self.regions[p], &self.regions[r]);
                let comparable = !lo.fix_upper_edge
                    && !up.fix_upper_edge
                    && spans(mesh, event, lo.e_up)
                    && spans(mesh, event, up.e_up);
                if comparable && !self.in_left(mesh, event, p, r) {
                    let (overlap, scale) = misorder(mesh, event, lo.e_up, up.e_up);
                    let tolerance = Real::NEAR_ZERO.to_f64() * (1.0 + scale);
                    assert!(
                        overlap <= tolerance,
                        "regions {p:?} and {r:?} are out of order by {overlap}"
                    );
                }
            }
            prev = Some(r);
            count += 1;
        }
        assert_eq!(prev, self.rightmost);
        assert_eq!(count, self.len(), "unlinked regions in the pool");
    }
}

/// The edge runs from the unprocessed side of `event` to the processed side.
#[cfg(any(test, feature = "debug-checks"))]
fn spans(mesh: &Mesh, event: VertexId, e: EdgeId) -> bool {
    let ev = mesh.position(event);
    vert_leq(mesh.dst_pos(e), ev) && vert_leq(ev, mesh.org_pos(e))
}

/// How far `lo` lies right of `up` at `event`, with the largest coordinate
/// magnitude involved.
#[cfg(any(test, feature = "debug-checks"))]
fn misorder(mesh: &Mesh, event: VertexId, lo: EdgeId, up: EdgeId) -> (f64, f64) {
    let ev = mesh.position(event);
    let (lo_d, lo_o) = (mesh.dst_pos(lo), mesh.org_pos(lo));
    let (up_d, up_o) = (mesh.dst_pos(up), mesh.org_pos(up));
    let scale = [ev, lo_d, lo_o, up_d, up_o]
        .iter()
        .map(|p| p.x.to_f64().abs() + p.y.to_f64().abs())
        .fold(0.0, f64::max);

    let overlap = match (mesh.dst(lo) == event, mesh.dst(up) == event) {
        (false, false) => (edge_eval(up_d, ev, up_o) - edge_eval(lo_d, ev, lo_o)).to_f64(),
        (true, false) => line_distance(ev, up_d, up_o),
        (false, true) => line_distance(ev, lo_d, lo_o),
        (true, true) => line_distance(lo_o, up_d, up_o).min(line_distance(up_o, lo_d, lo_o)),
    };
    (overlap, scale)
}

/// Distance from `p` to the line through `a` and `b`.
#[cfg(any(test, feature = "debug-checks"))]
fn line_distance(p: Point, a: Point, b: Point) -> f64 {
    let (ax, ay) = (a.x.to_f64(), a.y.to_f64());
    let (dx, dy) = (b.x.to_f64() - ax, b.y.to_f64() - ay);
    let len = (dx * dx + dy * dy).sqrt();
    if len == 0.0 {
        return 0.0;
    }
    (dx * (p.y.to_f64() - ay) - dy * (p.x.to_f64() - ax)).abs() / len
}
