// Copyright 2025 Lars Brubaker
// License: SGI Free Software License B (MIT-compatible)
//
// Half-edge mesh.
//
// Vertices, edge pairs and faces each live in their own `Pool`, so every
// reference is a generation-checked handle. A half-edge and its mirror
// share one pool slot; `EdgeId::mirror` flips between them without touching
// storage.
//
// The Euler operators keep two invariants as postconditions: every
// half-edge has exactly one mirror, and both the `onext` ring around each
// vertex and the `lnext` ring around each face are closed cycles.

mod monotone;

use core::ops::{Index, IndexMut};

use crate::active_region::RegionId;
use crate::error::MeshError;
use crate::geom::vert_leq;
use crate::pool::{Handle, Pool};
use crate::priorityq::QueueHandle;
use crate::vector::Point;

pub type VertexId = Handle<Vertex>;
pub type FaceId = Handle<Face>;

/// One directed half of an edge pair.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub struct EdgeId {
    pair: Handle<EdgePair>,
    side: u8,
}

impl EdgeId {
    /// The same edge with the opposite orientation.
    #[inline]
    pub fn mirror(self) -> EdgeId {
        EdgeId {
            pair: self.pair,
            side: self.side ^ 1,
        }
    }

    #[inline]
    fn dangling() -> EdgeId {
        EdgeId {
            pair: Handle::dangling(),
            side: 0,
        }
    }
}

#[derive(Copy, Clone, Debug)]
pub struct Vertex {
    /// Position in the sweep frame.
    pub position: Point,
    /// Some half-edge leaving this vertex; `None` while the vertex is bare.
    pub edge: Option<EdgeId>,
    /// Index of the input point this vertex was loaded from.
    pub input: Option<u32>,
    pub(crate) queue_handle: Option<QueueHandle>,
}

#[derive(Copy, Clone, Debug)]
pub struct HalfEdge {
    pub org: VertexId,
    /// Next edge CCW around the origin.
    pub onext: EdgeId,
    /// Next edge CCW around the left face.
    pub lnext: EdgeId,
    pub lface: Option<FaceId>,
    /// Change in winding number when crossing from the right face to the left.
    pub winding: i32,
    pub(crate) region: Option<RegionId>,
}

#[derive(Copy, Clone, Debug)]
pub struct Face {
    pub edge: EdgeId,
    pub inside: bool,
}

#[derive(Copy, Clone, Debug)]
pub struct EdgePair {
    halves: [HalfEdge; 2],
}

#[derive(Default)]
pub struct Mesh {
    vertices: Pool<Vertex>,
    edges: Pool<EdgePair>,
    faces: Pool<Face>,
}

impl Index<VertexId> for Mesh {
    type Output = Vertex;
    #[inline]
    fn index(&self, v: VertexId) -> &Vertex {
        &self.vertices[v]
    }
}

impl IndexMut<VertexId> for Mesh {
    #[inline]
    fn index_mut(&mut self, v: VertexId) -> &mut Vertex {
        &mut self.vertices[v]
    }
}

impl Index<EdgeId> for Mesh {
    type Output = HalfEdge;
    #[inline]
    fn index(&self, e: EdgeId) -> &HalfEdge {
        &self.edges[e.pair].halves[e.side as usize]
    }
}

impl IndexMut<EdgeId> for Mesh {
    #[inline]
    fn index_mut(&mut self, e: EdgeId) -> &mut HalfEdge {
        &mut self.edges[e.pair].halves[e.side as usize]
    }
}

impl Index<FaceId> for Mesh {
    type Output = Face;
    #[inline]
    fn index(&self, f: FaceId) -> &Face {
        &self.faces[f]
    }
}

impl IndexMut<FaceId> for Mesh {
    #[inline]
    fn index_mut(&mut self, f: FaceId) -> &mut Face {
        &mut self.faces[f]
    }
}

impl Mesh {
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes everything while keeping the pools' storage.
    pub fn clear(&mut self) {
        self.vertices.clear();
        self.edges.clear();
        self.faces.clear();
    }

    // ─────────────────────── Iteration and sizes ───────────────────────

    pub fn vertices(&self) -> impl Iterator<Item = (VertexId, &Vertex)> + '_ {
        self.vertices.iter()
    }

    /// One half-edge per live pair, in pool order.
    pub fn edges(&self) -> impl Iterator<Item = EdgeId> + '_ {
        self.edges.iter().map(|(pair, _)| EdgeId { pair, side: 0 })
    }

    pub fn faces(&self) -> impl Iterator<Item = (FaceId, &Face)> + '_ {
        self.faces.iter()
    }

    pub fn vertex_ids(&self) -> Vec<VertexId> {
        self.vertices.handles()
    }

    pub fn edge_ids(&self) -> Vec<EdgeId> {
        self.edges().collect()
    }

    pub fn face_ids(&self) -> Vec<FaceId> {
        self.faces.handles()
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    #[inline]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    #[inline]
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    #[inline]
    pub fn vertex_max_count(&self) -> usize {
        self.vertices.max_count()
    }

    #[inline]
    pub fn edge_max_count(&self) -> usize {
        self.edges.max_count()
    }

    #[inline]
    pub fn face_max_count(&self) -> usize {
        self.faces.max_count()
    }

    #[inline]
    pub fn contains_vertex(&self, v: VertexId) -> bool {
        self.vertices.contains(v)
    }

    #[inline]
    pub fn contains_edge(&self, e: EdgeId) -> bool {
        self.edges.contains(e.pair)
    }

    #[inline]
    pub fn contains_face(&self, f: FaceId) -> bool {
        self.faces.contains(f)
    }

    // ─────────────────────────── Navigation ────────────────────────────

    #[inline]
    pub fn org(&self, e: EdgeId) -> VertexId {
        self[e].org
    }

    #[inline]
    pub fn dst(&self, e: EdgeId) -> VertexId {
        self[e.mirror()].org
    }

    #[inline]
    pub fn onext(&self, e: EdgeId) -> EdgeId {
        self[e].onext
    }

    #[inline]
    pub fn lnext(&self, e: EdgeId) -> EdgeId {
        self[e].lnext
    }

    /// Previous edge CCW around the origin.
    #[inline]
    pub fn oprev(&self, e: EdgeId) -> EdgeId {
        self[e.mirror()].lnext
    }

    /// Previous edge around the left face.
    #[inline]
    pub fn lprev(&self, e: EdgeId) -> EdgeId {
        self[e].onext.mirror()
    }

    #[inline]
    pub fn rprev(&self, e: EdgeId) -> EdgeId {
        self[e.mirror()].onext
    }

    #[inline]
    pub fn dnext(&self, e: EdgeId) -> EdgeId {
        self.rprev(e).mirror()
    }

    #[inline]
    pub fn lface(&self, e: EdgeId) -> Option<FaceId> {
        self[e].lface
    }

    #[inline]
    pub fn rface(&self, e: EdgeId) -> Option<FaceId> {
        self[e.mirror()].lface
    }

    #[inline]
    pub fn position(&self, v: VertexId) -> Point {
        self[v].position
    }

    #[inline]
    pub fn org_pos(&self, e: EdgeId) -> Point {
        self.position(self[e].org)
    }

    #[inline]
    pub fn dst_pos(&self, e: EdgeId) -> Point {
        self.position(self.dst(e))
    }

    #[inline]
    pub fn edge_goes_left(&self, e: EdgeId) -> bool {
        vert_leq(self.dst_pos(e), self.org_pos(e))
    }

    #[inline]
    pub fn edge_goes_right(&self, e: EdgeId) -> bool {
        vert_leq(self.org_pos(e), self.dst_pos(e))
    }

    /// Number of edges leaving `v`.
    pub fn vertex_degree(&self, v: VertexId) -> usize {
        let Some(start) = self[v].edge else {
            return 0;
        };
        let mut count = 0;
        let mut e = start;
        loop {
            count += 1;
            e = self[e].onext;
            if e == start {
                break;
            }
        }
        count
    }

    /// Number of edges around the face.
    pub fn face_degree(&self, f: FaceId) -> usize {
        let start = self[f].edge;
        let mut count = 0;
        let mut e = start;
        loop {
            count += 1;
            e = self[e].lnext;
            if e == start {
                break;
            }
        }
        count
    }

    // ──────────────────────── Vertex bookkeeping ───────────────────────

    /// Allocates a vertex with no incident edges.
    pub fn make_vertex(&mut self, position: Point) -> Result<VertexId, MeshError> {
        Ok(self.vertices.alloc(Vertex {
            position,
            edge: None,
            input: None,
            queue_handle: None,
        })?)
    }

    /// Releases an isolated vertex.
    ///
    /// Panics if the vertex still has incident edges; the caller must
    /// detach them first.
    pub fn kill_vertex(&mut self, v: VertexId) {
        assert!(
            self[v].edge.is_none(),
            "kill_vertex: {:?} still has incident edges",
            v
        );
        self.vertices.free(v);
    }

    // ───────────────────────── Internal helpers ────────────────────────

    /// Room for the items an operator is about to create, claimed before
    /// any link is touched so a failure leaves the mesh as it was.
    fn reserve(&mut self, edges: usize, vertices: usize, faces: usize) -> Result<(), MeshError> {
        self.edges.reserve(edges)?;
        self.vertices.reserve(vertices)?;
        self.faces.reserve(faces)?;
        Ok(())
    }

    fn splice_rings(&mut self, a: EdgeId, b: EdgeId) {
        let a_onext = self[a].onext;
        let b_onext = self[b].onext;
        self[a_onext.mirror()].lnext = b;
        self[b_onext.mirror()].lnext = a;
        self[a].onext = b_onext;
        self[b].onext = a_onext;
    }

    /// A fresh pair forming its own onext rings and one two-edge loop.
    /// Origins and faces are left for the caller to attach.
    fn alloc_edge_pair(&mut self) -> Result<EdgeId, MeshError> {
        let half = HalfEdge {
            org: Handle::dangling(),
            onext: EdgeId::dangling(),
            lnext: EdgeId::dangling(),
            lface: None,
            winding: 0,
            region: None,
        };
        let pair = self.edges.alloc(EdgePair {
            halves: [half; 2],
        })?;
        let e = EdgeId { pair, side: 0 };
        let sym = e.mirror();
        self[e].onext = e;
        self[e].lnext = sym;
        self[sym].onext = sym;
        self[sym].lnext = e;
        Ok(e)
    }

    fn set_vertex_ring(&mut self, v: VertexId, e_orig: EdgeId) {
        self[v].edge = Some(e_orig);
        let mut e = e_orig;
        loop {
            self[e].org = v;
            e = self[e].onext;
            if e == e_orig {
                break;
            }
        }
    }

    fn set_face_ring(&mut self, f: FaceId, e_orig: EdgeId) {
        self[f].edge = e_orig;
        let mut e = e_orig;
        loop {
            self[e].lface = Some(f);
            e = self[e].lnext;
            if e == e_orig {
                break;
            }
        }
    }

    fn new_vertex_on(&mut self, e_orig: EdgeId, position: Point) -> Result<VertexId, MeshError> {
        let v = self.make_vertex(position)?;
        self.set_vertex_ring(v, e_orig);
        Ok(v)
    }

    /// New face for the loop through `e_orig`; inherits `inside` from
    /// `like`, the face being split.
    fn new_face_on(&mut self, e_orig: EdgeId, like: Option<FaceId>) -> Result<FaceId, MeshError> {
        let inside = like.map_or(false, |f| self[f].inside);
        let f = self.faces.alloc(Face {
            edge: e_orig,
            inside,
        })?;
        self.set_face_ring(f, e_orig);
        Ok(f)
    }

    /// Frees `v`, moving its edges to `new_org` when given.
    fn retire_vertex(&mut self, v: VertexId, new_org: Option<VertexId>) {
        if let (Some(new_org), Some(start)) = (new_org, self[v].edge) {
            let mut e = start;
            loop {
                self[e].org = new_org;
                e = self[e].onext;
                if e == start {
                    break;
                }
            }
        }
        self.vertices.free(v);
    }

    /// Frees `f`, moving its loop to `new_lface`.
    fn retire_face(&mut self, f: FaceId, new_lface: Option<FaceId>) {
        let start = self[f].edge;
        let mut e = start;
        loop {
            self[e].lface = new_lface;
            e = self[e].lnext;
            if e == start {
                break;
            }
        }
        self.faces.free(f);
    }

    // ───────────────────────── Euler operators ─────────────────────────

    /// Creates a loop of one edge pair between two new vertices, with one
    /// new face on both sides.
    pub fn make_edge(&mut self) -> Result<EdgeId, MeshError> {
        self.reserve(1, 2, 1)?;
        let e = self.alloc_edge_pair()?;
        self.new_vertex_on(e, Point::origin())?;
        self.new_vertex_on(e.mirror(), Point::origin())?;
        self.new_face_on(e, None)?;
        Ok(e)
    }

    /// Exchanges `e_org.onext` and `e_dst.onext`.
    ///
    /// If the origins differ the two vertices are merged, keeping
    /// `e_org`'s; if they are the same the vertex is split in two, with a new
    /// vertex at `e_dst`. Faces merge or split the same way, the new face
    /// going to `e_dst`'s loop.
    pub fn splice(&mut self, e_org: EdgeId, e_dst: EdgeId) -> Result<(), MeshError> {
        if e_org == e_dst {
            return Ok(());
        }

        let org_vertex = self[e_org].org;
        let dst_vertex = self[e_dst].org;
        let joining_vertices = dst_vertex != org_vertex;
        let org_face = self[e_org].lface;
        let dst_face = self[e_dst].lface;
        let joining_loops = dst_face != org_face;
        self.reserve(0, usize::from(!joining_vertices), usize::from(!joining_loops))?;

        if joining_vertices {
            self.retire_vertex(dst_vertex, Some(org_vertex));
        }
        if joining_loops {
            if let Some(f) = dst_face {
                self.retire_face(f, org_face);
            }
        }

        self.splice_rings(e_dst, e_org);

        if !joining_vertices {
            let position = self[org_vertex].position;
            self.new_vertex_on(e_dst, position)?;
            self[org_vertex].edge = Some(e_org);
        }
        if !joining_loops {
            self.new_face_on(e_dst, org_face)?;
            if let Some(f) = org_face {
                self[f].edge = e_org;
            }
        }
        Ok(())
    }

    /// Removes the pair `e_del`, merging the faces on its two sides or
    /// splitting the loop in two, and freeing endpoints left isolated.
    pub fn delete_edge(&mut self, e_del: EdgeId) -> Result<(), MeshError> {
        let e_del_sym = e_del.mirror();

        // First detach the origin.
        let lface = self[e_del].lface;
        let rface = self[e_del_sym].lface;
        let joining_loops = lface != rface;
        let splits_loop = !joining_loops && self[e_del].onext != e_del;
        self.reserve(0, 0, usize::from(splits_loop))?;

        if joining_loops {
            if let Some(f) = lface {
                self.retire_face(f, rface);
            }
        }

        if self[e_del].onext == e_del {
            let org = self[e_del].org;
            self.retire_vertex(org, None);
        } else {
            let oprev = self.oprev(e_del);
            if let Some(rf) = self.rface(e_del) {
                self[rf].edge = oprev;
            }
            let onext = self[e_del].onext;
            let org = self[e_del].org;
            self[org].edge = Some(onext);

            self.splice_rings(e_del, oprev);
            if !joining_loops {
                let lf = self[e_del].lface;
                self.new_face_on(e_del, lf)?;
            }
        }

        // Then the destination.
        if self[e_del_sym].onext == e_del_sym {
            let org = self[e_del_sym].org;
            self.retire_vertex(org, None);
            if let Some(f) = self[e_del_sym].lface {
                self.retire_face(f, None);
            }
        } else {
            let oprev = self.oprev(e_del_sym);
            if let Some(lf) = self[e_del].lface {
                self[lf].edge = oprev;
            }
            let onext = self[e_del_sym].onext;
            let org = self[e_del_sym].org;
            self[org].edge = Some(onext);
            self.splice_rings(e_del_sym, oprev);
        }

        self.edges.free(e_del.pair);
        Ok(())
    }

    /// Adds a pair `e_new` with `e_new.org == e_org.dst` leading to a new
    /// vertex, so that `e_new` follows `e_org` in the left face.
    pub fn add_edge_vertex(&mut self, e_org: EdgeId) -> Result<EdgeId, MeshError> {
        self.reserve(1, 1, 0)?;
        let e_new = self.alloc_edge_pair()?;
        let e_new_sym = e_new.mirror();

        let lnext = self[e_org].lnext;
        self.splice_rings(e_new, lnext);

        let dst = self.dst(e_org);
        self[e_new].org = dst;
        let position = self[dst].position;
        self.new_vertex_on(e_new_sym, position)?;

        let lface = self[e_org].lface;
        self[e_new].lface = lface;
        self[e_new_sym].lface = lface;
        Ok(e_new)
    }

    /// Splits `e_org` at a new vertex. Afterwards `e_org` ends at the new
    /// vertex and the returned edge runs from it to the old destination,
    /// carrying the same winding.
    pub fn split_edge(&mut self, e_org: EdgeId) -> Result<EdgeId, MeshError> {
        let temp = self.add_edge_vertex(e_org)?;
        let e_new = temp.mirror();
        let sym = e_org.mirror();

        // Disconnect e_org from its old destination and hang it on e_new.org.
        let sym_oprev = self.oprev(sym);
        self.splice_rings(sym, sym_oprev);
        self.splice_rings(sym, e_new);

        let new_org = self[e_new].org;
        self[sym].org = new_org;
        let new_dst = self.dst(e_new);
        self[new_dst].edge = Some(e_new.mirror());
        let rface = self.rface(e_org);
        self[e_new.mirror()].lface = rface;
        self[e_new].winding = self[e_org].winding;
        self[e_new.mirror()].winding = self[sym].winding;
        Ok(e_new)
    }

    /// Adds a pair from `e_org.dst` to `e_dst.org`. When both lie on the same
    /// loop it is split, the new face going to the returned edge's left;
    /// otherwise the two loops are joined.
    pub fn connect(&mut self, e_org: EdgeId, e_dst: EdgeId) -> Result<EdgeId, MeshError> {
        let org_face = self[e_org].lface;
        let dst_face = self[e_dst].lface;
        let joining_loops = dst_face != org_face;
        self.reserve(1, 0, usize::from(!joining_loops))?;

        let e_new = self.alloc_edge_pair()?;
        let e_new_sym = e_new.mirror();
        if joining_loops {
            if let Some(f) = dst_face {
                self.retire_face(f, org_face);
            }
        }

        let lnext = self[e_org].lnext;
        self.splice_rings(e_new, lnext);
        self.splice_rings(e_new_sym, e_dst);

        let from = self.dst(e_org);
        let to = self[e_dst].org;
        self[e_new].org = from;
        self[e_new_sym].org = to;
        self[e_new].lface = org_face;
        self[e_new_sym].lface = org_face;

        if let Some(f) = org_face {
            self[f].edge = e_new_sym;
        }
        if !joining_loops {
            self.new_face_on(e_new, org_face)?;
        }
        Ok(e_new)
    }

    // ───────────────────────────── Checks ──────────────────────────────

    /// Asserts the structural invariants of the whole mesh.
    #[cfg(any(test, feature = "debug-checks"))]
    pub fn check(&self) {
        let limit = 2 * self.edge_count() + 1;

        for (f, face) in self.faces.iter() {
            let mut e = face.edge;
            let mut steps = 0;
            loop {
                let sym = e.mirror();
                assert_ne!(sym, e);
                assert_eq!(sym.mirror(), e);
                let lnext = self[e].lnext;
                assert_eq!(self[lnext].onext.mirror(), e, "lnext/onext mismatch at {e:?}");
                let onext = self[e].onext;
                assert_eq!(self[onext.mirror()].lnext, e, "onext/lnext mismatch at {e:?}");
                assert_eq!(self[e].lface, Some(f), "edge {e:?} not on face {f:?}");
                steps += 1;
                assert!(steps <= limit, "face {f:?} loop does not close");
                e = lnext;
                if e == face.edge {
                    break;
                }
            }
        }

        for (v, vertex) in self.vertices.iter() {
            let Some(start) = vertex.edge else {
                continue;
            };
            let mut e = start;
            let mut steps = 0;
            loop {
                assert_eq!(self[e].org, v, "edge {e:?} not leaving {v:?}");
                steps += 1;
                assert!(steps <= limit, "vertex {v:?} ring does not close");
                e = self[e].onext;
                if e == start {
                    break;
                }
            }
        }

        for e in self.edges() {
            for half in [e, e.mirror()] {
                assert!(self.contains_vertex(self[half].org), "{half:?} has a dead origin");
                let lnext = self[half].lnext;
                assert_eq!(self[lnext].onext.mirror(), half);
                if let Some(f) = self[half].lface {
                    assert!(self.contains_face(f), "{half:?} has a dead face");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector::point;

    fn triangle(mesh: &mut Mesh) -> EdgeId {
        // Same construction as contour loading: one edge, then two splits.
        let e = mesh.make_edge().unwrap();
        mesh.splice(e, e.mirror()).unwrap();
        mesh.split_edge(e).unwrap();
        mesh.split_edge(e).unwrap();
        e
    }

    #[test]
    fn make_edge_creates_single_edge() {
        let mut mesh = Mesh::new();
        let e = mesh.make_edge().unwrap();
        assert_eq!(mesh.vertex_count(), 2);
        assert_eq!(mesh.face_count(), 1);
        assert_eq!(mesh.edge_count(), 1);
        assert_ne!(mesh.org(e), mesh.dst(e));
        assert_eq!(mesh.lface(e), mesh.rface(e));
        mesh.check();
    }

    #[test]
    fn mirror_is_an_involution() {
        let mut mesh = Mesh::new();
        let a = mesh.make_edge().unwrap();
        let b = mesh.make_edge().unwrap();
        let c = mesh.connect(a, b).unwrap();
        for e in [a, b, c] {
            assert_eq!(e.mirror().mirror(), e);
            assert_ne!(e.mirror(), e);
        }
    }

    #[test]
    fn splice_closes_a_loop_on_one_vertex() {
        let mut mesh = Mesh::new();
        let e = mesh.make_edge().unwrap();
        mesh.splice(e, e.mirror()).unwrap();
        // Both ends merged into one vertex; the loop splits into two faces.
        assert_eq!(mesh.vertex_count(), 1);
        assert_eq!(mesh.face_count(), 2);
        assert_eq!(mesh.org(e), mesh.dst(e));
        mesh.check();
    }

    #[test]
    fn triangle_has_closed_rings() {
        let mut mesh = Mesh::new();
        let e = triangle(&mut mesh);
        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.edge_count(), 3);
        assert_eq!(mesh.face_count(), 2);
        let f = mesh.lface(e).unwrap();
        assert_eq!(mesh.face_degree(f), 3);
        for (v, _) in mesh.vertices() {
            assert_eq!(mesh.vertex_degree(v), 2);
        }
        mesh.check();
    }

    #[test]
    fn failed_splice_leaves_the_mesh_untouched() {
        let mut mesh = Mesh::new();
        let a = mesh.make_edge().unwrap();
        let b = mesh.make_edge().unwrap();
        // Different origins and loops: both are merged, nothing allocated.
        mesh.splice(a, b).unwrap();
        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.face_count(), 1);

        // Splitting them again needs a new vertex.
        mesh.vertices.set_limit(Some(3));
        assert!(matches!(mesh.splice(a, b), Err(MeshError::OutOfMemory(_))));
        mesh.check();
        assert_eq!(mesh.org(a), mesh.org(b));
        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.face_count(), 1);

        mesh.vertices.set_limit(None);
        mesh.splice(a, b).unwrap();
        mesh.check();
        assert_ne!(mesh.org(a), mesh.org(b));
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.face_count(), 2);
    }

    #[test]
    fn failed_delete_leaves_the_mesh_untouched() {
        let mut mesh = Mesh::new();
        let e = triangle(&mut mesh);
        let spur = mesh.add_edge_vertex(mesh.oprev(e).mirror()).unwrap();
        let counts = (mesh.vertex_count(), mesh.edge_count(), mesh.face_count());

        // Detaching the spur's origin briefly splits its loop in two.
        mesh.faces.set_limit(Some(mesh.face_count()));
        assert!(mesh.delete_edge(spur).is_err());
        mesh.check();
        assert!(mesh.contains_edge(spur));
        assert_eq!((mesh.vertex_count(), mesh.edge_count(), mesh.face_count()), counts);

        mesh.faces.set_limit(None);
        mesh.delete_edge(spur).unwrap();
        mesh.check();
        assert_eq!(mesh.vertex_count(), counts.0 - 1);
        assert_eq!(mesh.edge_count(), counts.1 - 1);
        assert_eq!(mesh.face_count(), counts.2);
    }

    #[test]
    fn failed_connect_allocates_nothing() {
        let mut mesh = Mesh::new();
        let e = triangle(&mut mesh);
        let counts = (mesh.vertex_count(), mesh.edge_count(), mesh.face_count());
        mesh.faces.set_limit(Some(mesh.face_count()));
        // A chord across the triangle's face splits it.
        let lnext = mesh.lnext(e);
        assert!(mesh.connect(e, mesh.lnext(lnext)).is_err());
        mesh.check();
        assert_eq!((mesh.vertex_count(), mesh.edge_count(), mesh.face_count()), counts);
    }

    #[test]
    fn rotational_cycle_length_matches_degree() {
        let mut mesh = Mesh::new();
        let e = triangle(&mut mesh);
        // A diagonal-free triangle; add a dangling edge at e.org.
        let spur = mesh.add_edge_vertex(mesh.oprev(e).mirror()).unwrap();
        let hub = mesh.org(spur);
        assert_eq!(mesh.vertex_degree(hub), 3);
        let start = mesh[hub].edge.unwrap();
        let mut e = start;
        for _ in 0..3 {
            e = mesh.onext(e);
        }
        assert_eq!(e, start);
        mesh.check();
    }

    #[test]
    fn split_edge_preserves_winding() {
        let mut mesh = Mesh::new();
        let e = mesh.make_edge().unwrap();
        mesh[e].winding = 1;
        mesh[e.mirror()].winding = -1;
        let e_new = mesh.split_edge(e).unwrap();
        assert_eq!(mesh[e_new].winding, 1);
        assert_eq!(mesh[e_new.mirror()].winding, -1);
        assert_eq!(mesh.dst(e), mesh.org(e_new));
        assert_eq!(mesh.vertex_count(), 3);
        mesh.check();
    }

    #[test]
    fn connect_splits_a_face_and_delete_rejoins_it() {
        let mut mesh = Mesh::new();
        let e = triangle(&mut mesh);
        // Make a quad by splitting one side, then cut it along a diagonal.
        mesh.split_edge(e).unwrap();
        let f = mesh.lface(e).unwrap();
        assert_eq!(mesh.face_degree(f), 4);
        let lnext = mesh.lnext(e);
        let diag = mesh.connect(lnext, e).unwrap();
        assert_eq!(mesh.face_count(), 3);
        assert_ne!(mesh.lface(diag), mesh.rface(diag));
        mesh.check();

        mesh.delete_edge(diag).unwrap();
        assert_eq!(mesh.face_count(), 2);
        assert!(!mesh.contains_edge(diag));
        mesh.check();
    }

    #[test]
    fn deleting_an_isolated_edge_frees_everything() {
        let mut mesh = Mesh::new();
        let e = mesh.make_edge().unwrap();
        mesh.delete_edge(e).unwrap();
        assert_eq!(mesh.vertex_count(), 0);
        assert_eq!(mesh.edge_count(), 0);
        assert_eq!(mesh.face_count(), 0);
    }

    #[test]
    fn vertex_pool_reuses_killed_slots() {
        let mut mesh = Mesh::new();
        mesh.make_edge().unwrap();
        let before = mesh.vertex_count();
        let v = mesh.make_vertex(point(1.0, 2.0)).unwrap();
        let capacity = mesh.vertex_max_count();
        mesh.kill_vertex(v);
        assert!(!mesh.contains_vertex(v));
        assert_eq!(mesh.vertex_count(), before);
        let w = mesh.make_vertex(point(3.0, 4.0)).unwrap();
        assert_eq!(mesh.vertex_count(), before + 1);
        assert_eq!(mesh.vertex_max_count(), capacity);
        assert_eq!(w.index(), v.index());
    }

    #[test]
    #[should_panic(expected = "still has incident edges")]
    fn killing_a_connected_vertex_panics() {
        let mut mesh = Mesh::new();
        let e = mesh.make_edge().unwrap();
        let v = mesh.org(e);
        mesh.kill_vertex(v);
    }

    #[test]
    fn clear_empties_without_shrinking() {
        let mut mesh = Mesh::new();
        triangle(&mut mesh);
        let capacity = mesh.edge_max_count();
        mesh.clear();
        assert_eq!(mesh.vertex_count(), 0);
        assert_eq!(mesh.edges().count(), 0);
        assert_eq!(mesh.edge_max_count(), capacity);
    }
}
