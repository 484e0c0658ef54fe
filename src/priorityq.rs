// Copyright 2025 Lars Brubaker
// License: SGI Free Software License B (MIT-compatible)
//
// Event queue for the sweep.
//
// A two-phase priority queue:
//   Phase 1 (pre-init): inserts go into a key array that `init` sorts once.
//   Phase 2 (post-init): inserts go into an indexed binary min-heap.
// Both phases hand out handles that support deletion.
//
// Events are ordered by `vert_leq` on their sweep-frame position. Equal
// positions come out in insertion order, so the whole order is total and
// does not depend on the sort algorithm.

use core::cmp::Ordering;

use crate::geom::{vert_eq, vert_leq};
use crate::mesh::VertexId;
use crate::vector::Point;

/// Where a queued vertex lives, for deletion.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum QueueHandle {
    Sorted(u32),
    Heap(u32),
}

#[derive(Copy, Clone, Debug)]
struct Entry {
    key: Point,
    seq: u32,
    vertex: VertexId,
}

fn entry_cmp(a: &Entry, b: &Entry) -> Ordering {
    if vert_eq(a.key, b.key) {
        a.seq.cmp(&b.seq)
    } else if vert_leq(a.key, b.key) {
        Ordering::Less
    } else {
        Ordering::Greater
    }
}

#[inline]
fn entry_leq(a: &Entry, b: &Entry) -> bool {
    entry_cmp(a, b) != Ordering::Greater
}

#[derive(Copy, Clone, Debug)]
struct HeapSlot {
    entry: Entry,
    /// Position in `nodes` while live.
    node: usize,
    live: bool,
}

/// Indexed binary min-heap; `nodes[1..]` holds slot indices.
#[derive(Default)]
struct Heap {
    nodes: Vec<u32>,
    slots: Vec<HeapSlot>,
    free_list: Vec<u32>,
}

impl Heap {
    fn clear(&mut self) {
        self.nodes.clear();
        self.nodes.push(0);
        self.slots.clear();
        self.free_list.clear();
    }

    #[inline]
    fn size(&self) -> usize {
        self.nodes.len().saturating_sub(1)
    }

    #[inline]
    fn entry_at(&self, node: usize) -> &Entry {
        &self.slots[self.nodes[node] as usize].entry
    }

    #[inline]
    fn place(&mut self, node: usize, handle: u32) {
        self.nodes[node] = handle;
        self.slots[handle as usize].node = node;
    }

    fn float_down(&mut self, mut curr: usize) {
        let handle = self.nodes[curr];
        let entry = self.slots[handle as usize].entry;
        let size = self.size();
        loop {
            let mut child = curr << 1;
            if child > size {
                break;
            }
            if child < size && entry_leq(self.entry_at(child + 1), self.entry_at(child)) {
                child += 1;
            }
            if entry_leq(&entry, self.entry_at(child)) {
                break;
            }
            let moved = self.nodes[child];
            self.place(curr, moved);
            curr = child;
        }
        self.place(curr, handle);
    }

    fn float_up(&mut self, mut curr: usize) {
        let handle = self.nodes[curr];
        let entry = self.slots[handle as usize].entry;
        while curr > 1 {
            let parent = curr >> 1;
            if entry_leq(self.entry_at(parent), &entry) {
                break;
            }
            let moved = self.nodes[parent];
            self.place(curr, moved);
            curr = parent;
        }
        self.place(curr, handle);
    }

    fn insert(&mut self, entry: Entry) -> u32 {
        if self.nodes.is_empty() {
            self.nodes.push(0);
        }
        let node = self.nodes.len();
        let slot = HeapSlot {
            entry,
            node,
            live: true,
        };
        let handle = match self.free_list.pop() {
            Some(h) => {
                self.slots[h as usize] = slot;
                h
            }
            None => {
                self.slots.push(slot);
                (self.slots.len() - 1) as u32
            }
        };
        self.nodes.push(handle);
        self.float_up(node);
        handle
    }

    fn release(&mut self, handle: u32) -> Entry {
        let slot = &mut self.slots[handle as usize];
        slot.live = false;
        self.free_list.push(handle);
        slot.entry
    }

    fn minimum(&self) -> Option<&Entry> {
        if self.size() == 0 {
            return None;
        }
        Some(self.entry_at(1))
    }

    fn extract_min(&mut self) -> Option<Entry> {
        if self.size() == 0 {
            return None;
        }
        let min = self.nodes[1];
        let last = self.nodes.pop()?;
        if self.size() > 0 {
            self.place(1, last);
            self.float_down(1);
        }
        Some(self.release(min))
    }

    fn delete(&mut self, handle: u32) -> Option<Entry> {
        let slot = self.slots.get(handle as usize)?;
        if !slot.live {
            return None;
        }
        let curr = slot.node;
        let last = self.nodes.pop()?;
        if curr < self.nodes.len() {
            self.place(curr, last);
            if curr > 1 && !entry_leq(self.entry_at(curr >> 1), self.entry_at(curr)) {
                self.float_up(curr);
            } else {
                self.float_down(curr);
            }
        }
        Some(self.release(handle))
    }
}

/// The sweep's event queue.
#[derive(Default)]
pub struct EventQueue {
    heap: Heap,
    /// Pre-init entries; `None` once deleted or extracted.
    keys: Vec<Option<Entry>>,
    /// Indices into `keys`, sorted so the minimum is last.
    order: Vec<u32>,
    initialized: bool,
    next_seq: u32,
}

impl EventQueue {
    pub fn new() -> Self {
        let mut queue = EventQueue::default();
        queue.heap.clear();
        queue
    }

    /// Empties the queue and returns it to the pre-init phase.
    pub fn clear(&mut self) {
        self.heap.clear();
        self.keys.clear();
        self.order.clear();
        self.initialized = false;
        self.next_seq = 0;
    }

    pub fn insert(&mut self, vertex: VertexId, key: Point) -> QueueHandle {
        let entry = Entry {
            key,
            seq: self.next_seq,
            vertex,
        };
        self.next_seq = self.next_seq.wrapping_add(1);

        if self.initialized {
            return QueueHandle::Heap(self.heap.insert(entry));
        }
        self.keys.push(Some(entry));
        QueueHandle::Sorted((self.keys.len() - 1) as u32)
    }

    /// Sorts the pre-init entries. Later inserts go to the heap.
    pub fn init(&mut self) {
        if self.initialized {
            return;
        }
        self.order = (0..self.keys.len() as u32).collect();
        let keys = &self.keys;
        // Descending, so the minimum can be popped from the end.
        self.order.sort_by(|&a, &b| match (&keys[a as usize], &keys[b as usize]) {
            (Some(ka), Some(kb)) => entry_cmp(kb, ka),
            (None, Some(_)) => Ordering::Less,
            (Some(_), None) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        });
        self.initialized = true;
        self.trim();
    }

    fn trim(&mut self) {
        while let Some(&i) = self.order.last() {
            if self.keys[i as usize].is_some() {
                break;
            }
            self.order.pop();
        }
    }

    fn sorted_min(&self) -> Option<&Entry> {
        let &i = self.order.last()?;
        self.keys[i as usize].as_ref()
    }

    /// True when the heap holds the overall minimum.
    fn heap_first(&self) -> Option<bool> {
        match (self.sorted_min(), self.heap.minimum()) {
            (None, None) => None,
            (Some(_), None) => Some(false),
            (None, Some(_)) => Some(true),
            (Some(s), Some(h)) => Some(entry_leq(h, s)),
        }
    }

    /// The vertex with the smallest key, without removing it.
    pub fn minimum(&self) -> Option<VertexId> {
        match self.heap_first()? {
            true => self.heap.minimum().map(|e| e.vertex),
            false => self.sorted_min().map(|e| e.vertex),
        }
    }

    pub fn extract_min(&mut self) -> Option<VertexId> {
        if self.heap_first()? {
            return self.heap.extract_min().map(|e| e.vertex);
        }
        let i = self.order.pop()?;
        let entry = self.keys[i as usize].take();
        self.trim();
        entry.map(|e| e.vertex)
    }

    /// Removes a queued vertex. Stale handles are ignored.
    pub fn delete(&mut self, handle: QueueHandle) {
        match handle {
            QueueHandle::Heap(h) => {
                self.heap.delete(h);
            }
            QueueHandle::Sorted(i) => {
                if let Some(slot) = self.keys.get_mut(i as usize) {
                    *slot = None;
                }
                self.trim();
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.sorted_min().is_none() && self.heap.size() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::Mesh;
    use crate::scalar::Scalar;
    use crate::vector::point;

    fn vertices(mesh: &mut Mesh, coords: &[(f64, f64)]) -> Vec<(VertexId, Point)> {
        coords
            .iter()
            .map(|&(x, y)| {
                let p = point(x, y);
                (mesh.make_vertex(p).unwrap(), p)
            })
            .collect()
    }

    #[test]
    fn pre_init_inserts_come_out_sorted() {
        let mut mesh = Mesh::new();
        let vs = vertices(&mut mesh, &[(5.0, 0.0), (2.0, 0.0), (8.0, 0.0), (2.0, -1.0)]);
        let mut q = EventQueue::new();
        for &(v, p) in &vs {
            q.insert(v, p);
        }
        q.init();
        let order: Vec<_> = core::iter::from_fn(|| q.extract_min()).collect();
        assert_eq!(order, vec![vs[3].0, vs[1].0, vs[0].0, vs[2].0]);
        assert!(q.is_empty());
    }

    #[test]
    fn equal_keys_come_out_in_insertion_order() {
        let mut mesh = Mesh::new();
        let vs = vertices(&mut mesh, &[(1.0, 1.0), (1.0, 1.0), (1.0, 1.0)]);
        let mut q = EventQueue::new();
        for &(v, p) in vs.iter().rev() {
            q.insert(v, p);
        }
        q.init();
        assert_eq!(q.extract_min(), Some(vs[2].0));
        assert_eq!(q.extract_min(), Some(vs[1].0));
        assert_eq!(q.extract_min(), Some(vs[0].0));
    }

    #[test]
    fn delete_from_both_phases() {
        let mut mesh = Mesh::new();
        let vs = vertices(&mut mesh, &[(10.0, 0.0), (5.0, 0.0), (7.0, 0.0), (6.0, 0.0), (1.0, 0.0)]);
        let mut q = EventQueue::new();
        let h0 = q.insert(vs[0].0, vs[0].1);
        q.insert(vs[1].0, vs[1].1);
        q.insert(vs[2].0, vs[2].1);
        q.init();
        let h3 = q.insert(vs[3].0, vs[3].1);
        q.insert(vs[4].0, vs[4].1);
        q.delete(h0);
        q.delete(h3);
        assert_eq!(q.minimum(), Some(vs[4].0));
        let order: Vec<_> = core::iter::from_fn(|| q.extract_min()).collect();
        assert_eq!(order, vec![vs[4].0, vs[1].0, vs[2].0]);
    }

    #[test]
    fn heap_and_sorted_phases_interleave() {
        let mut mesh = Mesh::new();
        let coords: Vec<(f64, f64)> = (0..20).map(|i| (((i * 7) % 20) as f64, 0.0)).collect();
        let vs = vertices(&mut mesh, &coords);
        let mut q = EventQueue::new();
        for &(v, p) in &vs[..10] {
            q.insert(v, p);
        }
        q.init();
        for &(v, p) in &vs[10..] {
            q.insert(v, p);
        }
        let mut last = f64::NEG_INFINITY;
        let mut count = 0;
        while let Some(v) = q.extract_min() {
            let x = mesh[v].position.x.to_f64();
            assert!(x >= last);
            last = x;
            count += 1;
        }
        assert_eq!(count, 20);
    }

    #[test]
    fn clear_resets_to_the_sorting_phase() {
        let mut mesh = Mesh::new();
        let vs = vertices(&mut mesh, &[(3.0, 0.0), (1.0, 0.0)]);
        let mut q = EventQueue::new();
        q.insert(vs[0].0, vs[0].1);
        q.init();
        q.clear();
        assert!(q.is_empty());
        assert!(matches!(q.insert(vs[1].0, vs[1].1), QueueHandle::Sorted(0)));
    }
}
