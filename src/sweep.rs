// Copyright 2025 Lars Brubaker
// License: SGI Free Software License B (MIT-compatible)
//
// The sweep line pass.
//
// Vertices are processed in sweep order. The active regions hold every edge
// crossing the sweep line; at each event the regions ending there are
// closed into mesh faces (marking them inside or outside from the winding
// number), new regions are opened for the edges leaving the event, and
// neighbouring edges are checked for intersections, which are split into
// the mesh as new events. When the queue runs dry every face of the mesh is
// classified and, inside the input, monotone.
//
// Throughout, "left" and "right" are positions along the sweep line:
// `regions.left(r)` is the region just below `r`.

use log::debug;

use crate::active_region::{ActiveRegion, ActiveRegions, RegionId};
use crate::error::MeshError;
use crate::geom::{edge_intersect, edge_sign, vert_eq, vert_leq};
use crate::mesh::{EdgeId, Mesh, VertexId};
use crate::pool::Handle;
use crate::priorityq::EventQueue;
use crate::scalar::{Real, Scalar};
use crate::tess::FillRule;
use crate::vector::Point;

/// Sweeps `mesh`, whose vertices lie within `min..=max` in the sweep frame,
/// and marks each face inside or outside under `fill_rule`.
pub(crate) fn compute_interior(
    mesh: &mut Mesh,
    fill_rule: FillRule,
    min: Point,
    max: Point,
) -> Result<(), MeshError> {
    Sweep::new(mesh, fill_rule).run(min, max)
}

struct Sweep<'m> {
    mesh: &'m mut Mesh,
    regions: ActiveRegions,
    queue: EventQueue,
    event: VertexId,
    fill_rule: FillRule,
}

impl<'m> Sweep<'m> {
    fn new(mesh: &'m mut Mesh, fill_rule: FillRule) -> Self {
        Sweep {
            mesh,
            regions: ActiveRegions::new(),
            queue: EventQueue::new(),
            event: Handle::dangling(),
            fill_rule,
        }
    }

    fn run(mut self, min: Point, max: Point) -> Result<(), MeshError> {
        self.remove_degenerate_edges()?;
        self.init_queue();
        self.regions = ActiveRegions::make_regions(self.mesh, min, max)?;

        let mut events = 0usize;
        while let Some(v) = self.queue.extract_min() {
            if !self.mesh.contains_vertex(v) {
                continue;
            }
            self.mesh[v].queue_handle = None;

            // Merge every queued vertex at the same position into this one.
            while let Some(next) = self.queue.minimum() {
                if self.mesh.contains_vertex(next)
                    && !vert_eq(self.mesh.position(next), self.mesh.position(v))
                {
                    break;
                }
                self.queue.extract_min();
                if !self.mesh.contains_vertex(next) {
                    continue;
                }
                self.mesh[next].queue_handle = None;
                if let (Some(a), Some(b)) = (self.mesh[v].edge, self.mesh[next].edge) {
                    self.mesh.splice(a, b)?;
                }
            }

            self.sweep_event(v)?;
            events += 1;

            #[cfg(any(test, feature = "debug-checks"))]
            if self.mesh.contains_vertex(self.event) {
                self.regions.check(self.mesh, self.event);
            }
        }
        debug!("sweep processed {} events", events);

        self.done_regions();
        self.remove_degenerate_faces()?;

        #[cfg(any(test, feature = "debug-checks"))]
        self.mesh.check();
        Ok(())
    }

    // ───────────────────────────── Helpers ─────────────────────────────

    fn below(&self, r: RegionId) -> RegionId {
        match self.regions.left(r) {
            Some(b) => b,
            None => panic!("region {r:?} has no region below it"),
        }
    }

    fn above(&self, r: RegionId) -> RegionId {
        match self.regions.right(r) {
            Some(a) => a,
            None => panic!("region {r:?} has no region above it"),
        }
    }

    #[inline]
    fn e_up(&self, r: RegionId) -> EdgeId {
        self.regions[r].e_up
    }

    fn set_dirty(&mut self, regions: &[RegionId]) {
        for &r in regions {
            self.regions[r].dirty = true;
        }
    }

    fn add_winding(&mut self, dst: EdgeId, src: EdgeId) {
        let w = self.mesh[src].winding;
        let w_sym = self.mesh[src.mirror()].winding;
        self.mesh[dst].winding += w;
        self.mesh[dst.mirror()].winding += w_sym;
    }

    fn delete_region(&mut self, r: RegionId) {
        let e = self.regions[r].e_up;
        if self.mesh.contains_edge(e) && self.mesh[e].region == Some(r) {
            self.mesh[e].region = None;
        }
        self.regions.remove(r);
    }

    /// Replaces a temporary upper edge with `new_edge`.
    fn fix_upper_edge(&mut self, r: RegionId, new_edge: EdgeId) -> Result<(), MeshError> {
        let old = self.regions[r].e_up;
        self.mesh.delete_edge(old)?;
        let region = &mut self.regions[r];
        region.fix_upper_edge = false;
        region.e_up = new_edge;
        self.mesh[new_edge].region = Some(r);
        Ok(())
    }

    /// The lowest region above `r` whose upper edge does not start at the
    /// same vertex as `r`'s.
    fn top_left_region(&mut self, r: RegionId) -> Result<RegionId, MeshError> {
        let org = self.mesh.org(self.e_up(r));
        let mut reg = r;
        loop {
            reg = self.above(reg);
            if self.mesh.org(self.e_up(reg)) != org {
                break;
            }
        }

        // A temporary edge above can be replaced now that its lower end is
        // known.
        if self.regions[reg].fix_upper_edge {
            let below_up = self.e_up(self.below(reg));
            let up_lnext = self.mesh.lnext(self.e_up(reg));
            let e = self.mesh.connect(below_up.mirror(), up_lnext)?;
            self.fix_upper_edge(reg, e)?;
            reg = self.above(reg);
        }
        Ok(reg)
    }

    fn top_right_region(&self, r: RegionId) -> RegionId {
        let dst = self.mesh.dst(self.e_up(r));
        let mut reg = r;
        loop {
            reg = self.above(reg);
            if self.mesh.dst(self.e_up(reg)) != dst {
                return reg;
            }
        }
    }

    fn add_region_below(&mut self, above: RegionId, e_new_up: EdgeId) -> Result<RegionId, MeshError> {
        let id = self.regions.insert_before(
            self.mesh,
            self.event,
            Some(above),
            ActiveRegion::new(e_new_up),
        )?;
        self.mesh[e_new_up].region = Some(id);
        Ok(id)
    }

    fn set_winding(&mut self, r: RegionId, winding: i32) {
        let region = &mut self.regions[r];
        region.winding_number = winding;
        region.inside = self.fill_rule.is_inside(winding);
    }

    fn compute_winding(&mut self, r: RegionId) {
        let above = self.above(r);
        let winding = self.regions[above].winding_number + self.mesh[self.e_up(r)].winding;
        self.set_winding(r, winding);
    }

    /// Closes the face left of `r`'s upper edge and drops the region.
    fn finish_region(&mut self, r: RegionId) {
        let e = self.e_up(r);
        if let Some(f) = self.mesh.lface(e) {
            self.mesh[f].inside = self.regions[r].inside;
            self.mesh[f].edge = e;
        }
        self.delete_region(r);
    }

    /// Finishes the regions from `first` down to (not including) `last`, or
    /// down to the first region whose edge does not share the event, and
    /// returns the lowest edge reached.
    fn finish_left_regions(&mut self, first: RegionId, last: Option<RegionId>) -> Result<EdgeId, MeshError> {
        let mut reg_prev = first;
        let mut e_prev = self.e_up(first);
        while Some(reg_prev) != last {
            self.regions[reg_prev].fix_upper_edge = false;
            let reg = self.below(reg_prev);
            let mut e = self.e_up(reg);
            if self.mesh.org(e) != self.mesh.org(e_prev) {
                if !self.regions[reg].fix_upper_edge {
                    self.finish_region(reg_prev);
                    break;
                }
                // The lower edge is temporary; replace it with one ending at
                // the event.
                let lprev = self.mesh.lprev(e_prev);
                e = self.mesh.connect(lprev, e.mirror())?;
                self.fix_upper_edge(reg, e)?;
            }

            // Relink so the edges leave the event in sweep order.
            if self.mesh.onext(e_prev) != e {
                let oprev = self.mesh.oprev(e);
                self.mesh.splice(oprev, e)?;
                self.mesh.splice(e_prev, e)?;
            }
            self.finish_region(reg_prev);
            e_prev = self.e_up(reg);
            reg_prev = reg;
        }
        Ok(e_prev)
    }

    /// Opens a region below `reg_up` for each edge from `e_first` up to
    /// `e_last` (exclusive, in `onext` order), all leaving the event to the
    /// right, then computes their windings.
    fn add_right_edges(
        &mut self,
        reg_up: RegionId,
        e_first: EdgeId,
        e_last: EdgeId,
        e_top_left: Option<EdgeId>,
        clean_up: bool,
    ) -> Result<(), MeshError> {
        let mut e = e_first;
        loop {
            self.add_region_below(reg_up, e.mirror())?;
            e = self.mesh.onext(e);
            if e == e_last {
                break;
            }
        }

        let e_top_left = match e_top_left {
            Some(e) => e,
            None => self.mesh.rprev(self.e_up(self.below(reg_up))),
        };

        let mut reg_prev = reg_up;
        let mut e_prev = e_top_left;
        let mut first_time = true;
        loop {
            let reg = self.below(reg_prev);
            let e = self.e_up(reg).mirror();
            if self.mesh.org(e) != self.mesh.org(e_prev) {
                break;
            }

            if self.mesh.onext(e) != e_prev {
                // Move e to just below e_prev in the ring.
                let oprev = self.mesh.oprev(e);
                self.mesh.splice(oprev, e)?;
                let prev_oprev = self.mesh.oprev(e_prev);
                self.mesh.splice(prev_oprev, e)?;
            }
            let winding = self.regions[reg_prev].winding_number - self.mesh[e].winding;
            self.set_winding(reg, winding);

            // Two right-going edges may have merged; keep only one.
            self.regions[reg_prev].dirty = true;
            if !first_time && self.check_for_right_splice(reg_prev)? {
                self.add_winding(e, e_prev);
                self.delete_region(reg_prev);
                self.mesh.delete_edge(e_prev)?;
            }
            first_time = false;
            reg_prev = reg;
            e_prev = e;
        }
        self.regions[reg_prev].dirty = true;

        if clean_up {
            self.walk_dirty_regions(reg_prev)?;
        }
        Ok(())
    }

    // ─────────────────────── Splices and crossings ─────────────────────

    /// Checks the unprocessed ends of the edges bounding `reg_up` from above
    /// and below. When one lies on the wrong side of the other edge, it is
    /// spliced into that edge. Returns true if the mesh changed.
    fn check_for_right_splice(&mut self, reg_up: RegionId) -> Result<bool, MeshError> {
        let reg_lo = self.below(reg_up);
        let e_up = self.e_up(reg_up);
        let e_lo = self.e_up(reg_lo);
        let up_org = self.mesh.org_pos(e_up);
        let lo_org = self.mesh.org_pos(e_lo);

        if vert_leq(up_org, lo_org) {
            if edge_sign(self.mesh.dst_pos(e_lo), up_org, lo_org) > Real::ZERO {
                return Ok(false);
            }
            if !vert_eq(up_org, lo_org) {
                // Splice e_up.org into e_lo.
                self.mesh.split_edge(e_lo.mirror())?;
                let lo_oprev = self.mesh.oprev(e_lo);
                self.mesh.splice(e_up, lo_oprev)?;
                self.set_dirty(&[reg_up, reg_lo]);
            } else if self.mesh.org(e_up) != self.mesh.org(e_lo) {
                // Coincident; drop e_up.org from the queue and merge.
                let v = self.mesh.org(e_up);
                if let Some(handle) = self.mesh[v].queue_handle.take() {
                    self.queue.delete(handle);
                }
                let lo_oprev = self.mesh.oprev(e_lo);
                self.mesh.splice(lo_oprev, e_up)?;
            }
        } else {
            if edge_sign(self.mesh.dst_pos(e_up), lo_org, up_org) < Real::ZERO {
                return Ok(false);
            }
            // e_lo.org is above e_up: splice it into e_up.
            let above = self.above(reg_up);
            self.set_dirty(&[above, reg_up]);
            self.mesh.split_edge(e_up.mirror())?;
            let lo_oprev = self.mesh.oprev(e_lo);
            self.mesh.splice(lo_oprev, e_up)?;
        }
        Ok(true)
    }

    /// Like `check_for_right_splice`, for the processed ends.
    fn check_for_left_splice(&mut self, reg_up: RegionId) -> Result<bool, MeshError> {
        let reg_lo = self.below(reg_up);
        let e_up = self.e_up(reg_up);
        let e_lo = self.e_up(reg_lo);
        let up_dst = self.mesh.dst_pos(e_up);
        let lo_dst = self.mesh.dst_pos(e_lo);
        let inside = self.regions[reg_up].inside;

        if vert_leq(up_dst, lo_dst) {
            if edge_sign(up_dst, lo_dst, self.mesh.org_pos(e_up)) < Real::ZERO {
                return Ok(false);
            }
            // e_lo.dst is above e_up: splice it into e_up.
            let above = self.above(reg_up);
            self.set_dirty(&[above, reg_up]);
            let e = self.mesh.split_edge(e_up)?;
            self.mesh.splice(e_lo.mirror(), e)?;
            if let Some(f) = self.mesh.lface(e) {
                self.mesh[f].inside = inside;
            }
        } else {
            if edge_sign(lo_dst, up_dst, self.mesh.org_pos(e_lo)) > Real::ZERO {
                return Ok(false);
            }
            // e_up.dst is below e_lo: splice it into e_lo.
            self.set_dirty(&[reg_up, reg_lo]);
            let e = self.mesh.split_edge(e_lo)?;
            let up_lnext = self.mesh.lnext(e_up);
            self.mesh.splice(up_lnext, e_lo.mirror())?;
            if let Some(f) = self.mesh.rface(e) {
                self.mesh[f].inside = inside;
            }
        }
        Ok(true)
    }

    /// Checks the upper and lower edges of `reg_up` for a crossing right of
    /// the sweep line and splits both at the crossing. Returns true when the
    /// event's regions had to be rebuilt, in which case the caller must not
    /// continue its own walk.
    fn check_for_intersect(&mut self, reg_up: RegionId) -> Result<bool, MeshError> {
        let mut reg_up = reg_up;
        let mut reg_lo = self.below(reg_up);
        let mut e_up = self.e_up(reg_up);
        let mut e_lo = self.e_up(reg_lo);
        let org_up = self.mesh.org(e_up);
        let org_lo = self.mesh.org(e_lo);
        let dst_up = self.mesh.dst(e_up);
        let dst_lo = self.mesh.dst(e_lo);
        let p_org_up = self.mesh.position(org_up);
        let p_org_lo = self.mesh.position(org_lo);
        let p_dst_up = self.mesh.position(dst_up);
        let p_dst_lo = self.mesh.position(dst_lo);
        let event = self.event;
        let ev = self.mesh.position(event);

        if org_up == org_lo {
            // Right endpoints are the same vertex.
            return Ok(false);
        }

        let t_min_up = if p_org_up.y < p_dst_up.y { p_org_up.y } else { p_dst_up.y };
        let t_max_lo = if p_org_lo.y > p_dst_lo.y { p_org_lo.y } else { p_dst_lo.y };
        if t_min_up > t_max_lo {
            return Ok(false);
        }

        if vert_leq(p_org_up, p_org_lo) {
            if edge_sign(p_dst_lo, p_org_up, p_org_lo) > Real::ZERO {
                return Ok(false);
            }
        } else if edge_sign(p_dst_up, p_org_lo, p_org_up) < Real::ZERO {
            return Ok(false);
        }

        let mut isect = edge_intersect(p_dst_up, p_org_up, p_dst_lo, p_org_lo);

        // Keep the crossing between the event and the nearer right endpoint.
        if vert_leq(isect, ev) {
            isect = ev;
        }
        let org_min = if vert_leq(p_org_up, p_org_lo) { p_org_up } else { p_org_lo };
        if vert_leq(org_min, isect) {
            isect = org_min;
        }

        if vert_eq(isect, p_org_up) || vert_eq(isect, p_org_lo) {
            self.check_for_right_splice(reg_up)?;
            return Ok(false);
        }

        if (!vert_eq(p_dst_up, ev) && edge_sign(p_dst_up, ev, isect) >= Real::ZERO)
            || (!vert_eq(p_dst_lo, ev) && edge_sign(p_dst_lo, ev, isect) <= Real::ZERO)
        {
            // The crossing rounds to a point left of the sweep line.
            if dst_lo == event {
                // Splice dst_lo into e_up and redo the event's regions.
                self.mesh.split_edge(e_up.mirror())?;
                self.mesh.splice(e_lo.mirror(), e_up)?;
                reg_up = self.top_left_region(reg_up)?;
                let below = self.below(reg_up);
                e_up = self.e_up(below);
                self.finish_left_regions(below, Some(reg_lo))?;
                let oprev = self.mesh.oprev(e_up);
                self.add_right_edges(reg_up, oprev, e_up, Some(e_up), true)?;
                return Ok(true);
            }
            if dst_up == event {
                // Splice dst_up into e_lo and redo the event's regions.
                self.mesh.split_edge(e_lo.mirror())?;
                let up_lnext = self.mesh.lnext(e_up);
                let lo_oprev = self.mesh.oprev(e_lo);
                self.mesh.splice(up_lnext, lo_oprev)?;
                reg_lo = reg_up;
                reg_up = self.top_right_region(reg_up);
                let e = self.mesh.rprev(self.e_up(self.below(reg_up)));
                let old = self.regions[reg_lo].e_up;
                if self.mesh[old].region == Some(reg_lo) {
                    self.mesh[old].region = None;
                }
                self.regions[reg_lo].e_up = self.mesh.oprev(e_lo);
                e_lo = self.finish_left_regions(reg_lo, None)?;
                let first = self.mesh.onext(e_lo);
                let last = self.mesh.rprev(e_up);
                self.add_right_edges(reg_up, first, last, Some(e), true)?;
                return Ok(true);
            }

            // Split whichever edges pass on the wrong side of the crossing,
            // at the event position.
            if edge_sign(p_dst_up, ev, isect) >= Real::ZERO {
                let above = self.above(reg_up);
                self.set_dirty(&[above, reg_up]);
                self.mesh.split_edge(e_up.mirror())?;
                let v = self.mesh.org(e_up);
                self.mesh[v].position = ev;
            }
            if edge_sign(p_dst_lo, ev, isect) <= Real::ZERO {
                self.set_dirty(&[reg_up, reg_lo]);
                self.mesh.split_edge(e_lo.mirror())?;
                let v = self.mesh.org(e_lo);
                self.mesh[v].position = ev;
            }
            return Ok(false);
        }

        // General case: split both edges at the crossing and queue it.
        self.mesh.split_edge(e_up.mirror())?;
        self.mesh.split_edge(e_lo.mirror())?;
        let lo_oprev = self.mesh.oprev(e_lo);
        self.mesh.splice(lo_oprev, e_up)?;
        let v = self.mesh.org(e_up);
        self.mesh[v].position = isect;
        self.mesh[v].input = None;
        let handle = self.queue.insert(v, isect);
        self.mesh[v].queue_handle = Some(handle);
        let above = self.above(reg_up);
        self.set_dirty(&[above, reg_up, reg_lo]);
        Ok(false)
    }

    /// Restores the ordering invariants for every dirty region adjacent to
    /// `reg_up`, walking from the lowest dirty one upwards.
    fn walk_dirty_regions(&mut self, reg_up: RegionId) -> Result<(), MeshError> {
        let mut reg_up = reg_up;
        let mut reg_lo = self.below(reg_up);
        loop {
            while self.regions[reg_lo].dirty {
                reg_up = reg_lo;
                reg_lo = self.below(reg_lo);
            }
            if !self.regions[reg_up].dirty {
                reg_lo = reg_up;
                match self.regions.right(reg_up) {
                    Some(r) if self.regions[r].dirty => reg_up = r,
                    _ => return Ok(()),
                }
            }
            self.regions[reg_up].dirty = false;
            let mut e_up = self.e_up(reg_up);
            let mut e_lo = self.e_up(reg_lo);

            if self.mesh.dst(e_up) != self.mesh.dst(e_lo) && self.check_for_left_splice(reg_up)? {
                // A temporary edge that now crosses a real one is dropped.
                if self.regions[reg_lo].fix_upper_edge {
                    self.delete_region(reg_lo);
                    self.mesh.delete_edge(e_lo)?;
                    reg_lo = self.below(reg_up);
                    e_lo = self.e_up(reg_lo);
                } else if self.regions[reg_up].fix_upper_edge {
                    self.delete_region(reg_up);
                    self.mesh.delete_edge(e_up)?;
                    reg_up = self.above(reg_lo);
                    e_up = self.e_up(reg_up);
                }
            }

            if self.mesh.org(e_up) != self.mesh.org(e_lo) {
                let dst_up = self.mesh.dst(e_up);
                let dst_lo = self.mesh.dst(e_lo);
                if dst_up != dst_lo
                    && !self.regions[reg_up].fix_upper_edge
                    && !self.regions[reg_lo].fix_upper_edge
                    && (dst_up == self.event || dst_lo == self.event)
                {
                    if self.check_for_intersect(reg_up)? {
                        return Ok(());
                    }
                } else {
                    self.check_for_right_splice(reg_up)?;
                }
            }

            if self.mesh.org(e_up) == self.mesh.org(e_lo) && self.mesh.dst(e_up) == self.mesh.dst(e_lo) {
                // A two-edge loop; keep the lower edge.
                self.add_winding(e_lo, e_up);
                self.delete_region(reg_up);
                self.mesh.delete_edge(e_up)?;
                reg_up = self.above(reg_lo);
            }
        }
    }

    // ───────────────────────────── Events ──────────────────────────────

    /// The event has edges only to its left. Connects it to the closer
    /// unprocessed end of the bounding edges with a temporary edge so the
    /// region stays monotone.
    fn connect_right_vertex(&mut self, reg_up: RegionId, e_bottom_left: EdgeId) -> Result<(), MeshError> {
        let mut reg_up = reg_up;
        let mut e_bottom_left = e_bottom_left;
        let mut e_top_left = self.mesh.onext(e_bottom_left);
        let reg_lo = self.below(reg_up);
        let e_up = self.e_up(reg_up);
        let e_lo = self.e_up(reg_lo);
        let mut degenerate = false;

        if self.mesh.dst(e_up) != self.mesh.dst(e_lo) {
            self.check_for_intersect(reg_up)?;
        }

        // The bounding edges may now pass through the event.
        let ev = self.mesh.position(self.event);
        if vert_eq(self.mesh.org_pos(e_up), ev) {
            let oprev = self.mesh.oprev(e_top_left);
            self.mesh.splice(oprev, e_up)?;
            reg_up = self.top_left_region(reg_up)?;
            let below = self.below(reg_up);
            e_top_left = self.e_up(below);
            self.finish_left_regions(below, Some(reg_lo))?;
            degenerate = true;
        }
        if vert_eq(self.mesh.org_pos(e_lo), ev) {
            let oprev = self.mesh.oprev(e_lo);
            self.mesh.splice(e_bottom_left, oprev)?;
            e_bottom_left = self.finish_left_regions(reg_lo, None)?;
            degenerate = true;
        }
        if degenerate {
            let first = self.mesh.onext(e_bottom_left);
            return self.add_right_edges(reg_up, first, e_top_left, Some(e_top_left), true);
        }

        let target = if vert_leq(self.mesh.org_pos(e_lo), self.mesh.org_pos(e_up)) {
            self.mesh.oprev(e_lo)
        } else {
            e_up
        };
        let lprev = self.mesh.lprev(e_bottom_left);
        let e_new = self.mesh.connect(lprev, target)?;

        // No clean-up yet: e_new must be marked temporary first.
        let onext = self.mesh.onext(e_new);
        self.add_right_edges(reg_up, e_new, onext, Some(onext), false)?;
        if let Some(r) = self.mesh[e_new.mirror()].region {
            self.regions[r].fix_upper_edge = true;
        }
        self.walk_dirty_regions(reg_up)
    }

    /// The event lies on the upper edge of `reg_up`, or on one of its ends.
    fn connect_left_degenerate(&mut self, reg_up: RegionId, v_event: VertexId) -> Result<(), MeshError> {
        let Some(v_edge) = self.mesh[v_event].edge else {
            return Ok(());
        };
        let e = self.e_up(reg_up);
        let ev = self.mesh.position(v_event);

        if vert_eq(self.mesh.org_pos(e), ev) {
            // e.org is still queued; merge the event into it.
            self.mesh.splice(e, v_edge)?;
            return Ok(());
        }

        if !vert_eq(self.mesh.dst_pos(e), ev) {
            // The event is in the middle of e: split e there.
            self.mesh.split_edge(e.mirror())?;
            if self.regions[reg_up].fix_upper_edge {
                let unused = self.mesh.onext(e);
                self.mesh.delete_edge(unused)?;
                self.regions[reg_up].fix_upper_edge = false;
            }
            self.mesh.splice(v_edge, e)?;
            return self.sweep_event(v_event);
        }

        // The event coincides with e.dst, already processed. Splice in the
        // extra right-going edges.
        let reg_up = self.top_right_region(reg_up);
        let reg = self.below(reg_up);
        let mut e_top_right = self.e_up(reg).mirror();
        let e_last = self.mesh.onext(e_top_right);
        if self.regions[reg].fix_upper_edge {
            self.delete_region(reg);
            self.mesh.delete_edge(e_top_right)?;
            e_top_right = self.mesh.oprev(e_last);
        }
        self.mesh.splice(v_edge, e_top_right)?;
        let e_top_left = if self.mesh.edge_goes_left(e_last) {
            Some(e_last)
        } else {
            None
        };
        let first = self.mesh.onext(e_top_right);
        self.add_right_edges(reg_up, first, e_last, e_top_left, true)
    }

    /// The event has edges only to its right.
    fn connect_left_vertex(&mut self, v_event: VertexId) -> Result<(), MeshError> {
        let Some(an_edge) = self.mesh[v_event].edge else {
            return Ok(());
        };
        let Some(reg_up) = self.regions.find(self.mesh, self.event, an_edge.mirror()) else {
            return Ok(());
        };
        let Some(reg_lo) = self.regions.left(reg_up) else {
            return Ok(());
        };
        let e_up = self.e_up(reg_up);
        let e_lo = self.e_up(reg_lo);

        if edge_sign(self.mesh.dst_pos(e_up), self.mesh.position(v_event), self.mesh.org_pos(e_up)) == Real::ZERO {
            return self.connect_left_degenerate(reg_up, v_event);
        }

        // Connect to the closer of e_lo.dst and e_up.dst.
        let reg = if vert_leq(self.mesh.dst_pos(e_lo), self.mesh.dst_pos(e_up)) {
            reg_up
        } else {
            reg_lo
        };

        if self.regions[reg_up].inside || self.regions[reg].fix_upper_edge {
            let e_new = if reg == reg_up {
                let up_lnext = self.mesh.lnext(e_up);
                self.mesh.connect(an_edge.mirror(), up_lnext)?
            } else {
                let lo_dnext = self.mesh.dnext(e_lo);
                self.mesh.connect(lo_dnext, an_edge)?.mirror()
            };
            if self.regions[reg].fix_upper_edge {
                self.fix_upper_edge(reg, e_new)?;
            } else {
                let r = self.add_region_below(reg_up, e_new)?;
                self.compute_winding(r);
            }
            self.sweep_event(v_event)
        } else {
            // Outside: no edge needed, just open regions for the new edges.
            self.add_right_edges(reg_up, an_edge, an_edge, None, true)
        }
    }

    fn sweep_event(&mut self, v_event: VertexId) -> Result<(), MeshError> {
        self.event = v_event;
        let Some(start) = self.mesh[v_event].edge else {
            return Ok(());
        };

        // Find an edge ending a region, i.e. one going left.
        let mut e = start;
        let region = loop {
            if let Some(r) = self.mesh[e].region {
                break r;
            }
            e = self.mesh.onext(e);
            if e == start {
                return self.connect_left_vertex(v_event);
            }
        };

        let reg_up = self.top_left_region(region)?;
        let reg = self.below(reg_up);
        let e_top_left = self.e_up(reg);
        let e_bottom_left = self.finish_left_regions(reg, None)?;

        if self.mesh.onext(e_bottom_left) == e_top_left {
            self.connect_right_vertex(reg_up, e_bottom_left)
        } else {
            let first = self.mesh.onext(e_bottom_left);
            self.add_right_edges(reg_up, first, e_top_left, Some(e_top_left), true)
        }
    }

    // ─────────────────────────── Setup/teardown ────────────────────────

    fn init_queue(&mut self) {
        self.queue.clear();
        for v in self.mesh.vertex_ids() {
            let position = self.mesh.position(v);
            let handle = self.queue.insert(v, position);
            self.mesh[v].queue_handle = Some(handle);
        }
        self.queue.init();
    }

    /// Drops zero-length edges and contours of fewer than three edges.
    fn remove_degenerate_edges(&mut self) -> Result<(), MeshError> {
        for e in self.mesh.edge_ids() {
            if !self.mesh.contains_edge(e) {
                continue;
            }
            let mut e = e;
            let mut e_lnext = self.mesh.lnext(e);

            if vert_eq(self.mesh.org_pos(e), self.mesh.dst_pos(e)) && self.mesh.lnext(e_lnext) != e {
                // Zero-length edge in a contour of three or more edges.
                self.mesh.splice(e_lnext, e)?;
                self.mesh.delete_edge(e)?;
                e = e_lnext;
                e_lnext = self.mesh.lnext(e);
            }
            if self.mesh.lnext(e_lnext) == e {
                if e_lnext != e && e_lnext != e.mirror() {
                    self.mesh.delete_edge(e_lnext)?;
                }
                self.mesh.delete_edge(e)?;
            }
        }
        Ok(())
    }

    fn done_regions(&mut self) {
        while let Some(r) = self.regions.leftmost() {
            let region = &self.regions[r];
            if !region.sentinel && !region.fix_upper_edge {
                debug!("region {:?} still open after the sweep", r);
            }
            self.delete_region(r);
        }
    }

    /// Deletes faces bounded by only two edges, folding the winding of the
    /// deleted edge into its twin.
    fn remove_degenerate_faces(&mut self) -> Result<(), MeshError> {
        for f in self.mesh.face_ids() {
            if !self.mesh.contains_face(f) {
                continue;
            }
            let e = self.mesh[f].edge;
            let lnext = self.mesh.lnext(e);
            if lnext != e && self.mesh.lnext(lnext) == e {
                let onext = self.mesh.onext(e);
                self.add_winding(onext, e);
                self.mesh.delete_edge(e)?;
            }
        }
        Ok(())
    }
}
