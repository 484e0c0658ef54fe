// Copyright 2025 Lars Brubaker
// License: SGI Free Software License B (MIT-compatible)
//
// Slot arena with generation-checked handles.
//
// Freed slots go on a free list and are handed out again by the next
// allocation. Each slot carries a generation counter that is bumped on
// free, so a handle kept past the death of its item is detected instead of
// silently aliasing whatever reuses the slot.

use core::fmt;
use core::hash::{Hash, Hasher};
use core::marker::PhantomData;
use core::ops::{Index, IndexMut};

use crate::error::PoolError;

/// A typed reference into a `Pool<T>`.
pub struct Handle<T> {
    index: u32,
    generation: u32,
    marker: PhantomData<fn() -> T>,
}

impl<T> Handle<T> {
    #[inline]
    fn new(index: u32, generation: u32) -> Self {
        Handle {
            index,
            generation,
            marker: PhantomData,
        }
    }

    /// A handle that never resolves. Only used as a placeholder while a
    /// structure is being linked up.
    #[inline]
    pub(crate) fn dangling() -> Self {
        Handle::new(u32::MAX, u32::MAX)
    }

    #[inline]
    pub fn index(self) -> usize {
        self.index as usize
    }

    #[inline]
    pub fn generation(self) -> u32 {
        self.generation
    }
}

impl<T> Clone for Handle<T> {
    #[inline]
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Handle<T> {}

impl<T> PartialEq for Handle<T> {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index && self.generation == other.generation
    }
}

impl<T> Eq for Handle<T> {}

impl<T> Hash for Handle<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.index.hash(state);
        self.generation.hash(state);
    }
}

impl<T> fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}@{}", self.index, self.generation)
    }
}

struct Slot<T> {
    generation: u32,
    value: Option<T>,
}

pub struct Pool<T> {
    slots: Vec<Slot<T>>,
    free_list: Vec<u32>,
    len: usize,
    limit: Option<usize>,
}

impl<T> Pool<T> {
    pub fn new() -> Self {
        Pool {
            slots: Vec::new(),
            free_list: Vec::new(),
            len: 0,
            limit: None,
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Pool {
            slots: Vec::with_capacity(capacity),
            free_list: Vec::new(),
            len: 0,
            limit: None,
        }
    }

    /// Caps the number of live items; `alloc` fails once it is reached.
    pub fn set_limit(&mut self, limit: Option<usize>) {
        self.limit = limit;
    }

    /// Makes room so that the next `additional` calls to `alloc` cannot
    /// fail.
    pub fn reserve(&mut self, additional: usize) -> Result<(), PoolError> {
        if let Some(limit) = self.limit {
            if self.len + additional > limit {
                return Err(PoolError::OutOfMemory(self.len));
            }
        }
        let fresh = additional.saturating_sub(self.free_list.len());
        if fresh == 0 {
            return Ok(());
        }
        if self.slots.len() + fresh >= u32::MAX as usize {
            return Err(PoolError::OutOfMemory(self.len));
        }
        self.slots
            .try_reserve(fresh)
            .map_err(|_| PoolError::OutOfMemory(self.len))?;
        self.free_list
            .try_reserve(self.slots.len() + fresh - self.free_list.len())
            .map_err(|_| PoolError::OutOfMemory(self.len))?;
        Ok(())
    }

    /// Stores `value`, reusing a freed slot when one is available.
    pub fn alloc(&mut self, value: T) -> Result<Handle<T>, PoolError> {
        if self.limit.map_or(false, |limit| self.len >= limit) {
            return Err(PoolError::OutOfMemory(self.len));
        }
        if let Some(index) = self.free_list.pop() {
            let slot = &mut self.slots[index as usize];
            slot.value = Some(value);
            self.len += 1;
            return Ok(Handle::new(index, slot.generation));
        }

        let index = match u32::try_from(self.slots.len()) {
            Ok(i) if i != u32::MAX => i,
            _ => return Err(PoolError::OutOfMemory(self.len)),
        };
        self.slots
            .try_reserve(1)
            .map_err(|_| PoolError::OutOfMemory(self.len))?;
        self.free_list
            .try_reserve(self.slots.len() + 1 - self.free_list.len())
            .map_err(|_| PoolError::OutOfMemory(self.len))?;
        self.slots.push(Slot {
            generation: 0,
            value: Some(value),
        });
        self.len += 1;
        Ok(Handle::new(index, 0))
    }

    /// Releases the slot behind `handle`, returning its value. Stale handles
    /// return `None` and leave the pool untouched.
    pub fn free(&mut self, handle: Handle<T>) -> Option<T> {
        let slot = self.slots.get_mut(handle.index())?;
        if slot.generation != handle.generation {
            return None;
        }
        let value = slot.value.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free_list.push(handle.index);
        self.len -= 1;
        Some(value)
    }

    #[inline]
    pub fn get(&self, handle: Handle<T>) -> Option<&T> {
        let slot = self.slots.get(handle.index())?;
        if slot.generation != handle.generation {
            return None;
        }
        slot.value.as_ref()
    }

    #[inline]
    pub fn get_mut(&mut self, handle: Handle<T>) -> Option<&mut T> {
        let slot = self.slots.get_mut(handle.index())?;
        if slot.generation != handle.generation {
            return None;
        }
        slot.value.as_mut()
    }

    #[inline]
    pub fn contains(&self, handle: Handle<T>) -> bool {
        self.get(handle).is_some()
    }

    /// Number of live items.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of slots, live or free. Only grows when the free list is empty.
    #[inline]
    pub fn max_count(&self) -> usize {
        self.slots.len()
    }

    /// Drops every item but keeps the slots for reuse. Outstanding handles
    /// become stale.
    pub fn clear(&mut self) {
        self.free_list.clear();
        for (index, slot) in self.slots.iter_mut().enumerate().rev() {
            if slot.value.take().is_some() {
                slot.generation = slot.generation.wrapping_add(1);
            }
            self.free_list.push(index as u32);
        }
        self.len = 0;
    }

    /// Live items in slot order.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            slots: self.slots.iter().enumerate(),
            remaining: self.len,
        }
    }

    /// Snapshot of the live handles, for passes that mutate the pool while
    /// walking it.
    pub fn handles(&self) -> Vec<Handle<T>> {
        self.iter().map(|(h, _)| h).collect()
    }
}

impl<T> Default for Pool<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Index<Handle<T>> for Pool<T> {
    type Output = T;

    #[inline]
    fn index(&self, handle: Handle<T>) -> &T {
        match self.get(handle) {
            Some(value) => value,
            None => panic!(
                "stale handle {:?} into pool of {}",
                handle,
                core::any::type_name::<T>()
            ),
        }
    }
}

impl<T> IndexMut<Handle<T>> for Pool<T> {
    #[inline]
    fn index_mut(&mut self, handle: Handle<T>) -> &mut T {
        if !self.contains(handle) {
            panic!(
                "stale handle {:?} into pool of {}",
                handle,
                core::any::type_name::<T>()
            );
        }
        match self.slots[handle.index()].value.as_mut() {
            Some(value) => value,
            None => unreachable!(),
        }
    }
}

pub struct Iter<'a, T> {
    slots: core::iter::Enumerate<core::slice::Iter<'a, Slot<T>>>,
    remaining: usize,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = (Handle<T>, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        for (index, slot) in self.slots.by_ref() {
            if let Some(value) = slot.value.as_ref() {
                self.remaining -= 1;
                return Some((Handle::new(index as u32, slot.generation), value));
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alloc_and_free_reuses_the_slot() {
        let mut pool: Pool<u32> = Pool::new();
        let a = pool.alloc(1).unwrap();
        let b = pool.alloc(2).unwrap();
        assert_ne!(a, b);
        assert_eq!(pool.free(a), Some(1));
        let c = pool.alloc(3).unwrap();
        assert_eq!(c.index(), a.index());
        assert_ne!(c, a, "reused slot must carry a new generation");
        assert_eq!(pool.max_count(), 2);
        assert_eq!(pool.len(), 2);
    }

    #[test]
    fn stale_handles_do_not_resolve() {
        let mut pool: Pool<&str> = Pool::new();
        let a = pool.alloc("a").unwrap();
        pool.free(a);
        let _b = pool.alloc("b").unwrap();
        assert!(pool.get(a).is_none());
        assert!(!pool.contains(a));
        assert_eq!(pool.free(a), None);
        assert_eq!(pool.len(), 1);
    }

    #[test]
    #[should_panic(expected = "stale handle")]
    fn indexing_with_a_stale_handle_panics() {
        let mut pool: Pool<i32> = Pool::new();
        let a = pool.alloc(7).unwrap();
        pool.free(a);
        let _ = pool[a];
    }

    #[test]
    fn clear_keeps_storage() {
        let mut pool: Pool<i32> = Pool::with_capacity(4);
        let handles: Vec<_> = (0..4).map(|i| pool.alloc(i).unwrap()).collect();
        pool.clear();
        assert!(pool.is_empty());
        assert_eq!(pool.max_count(), 4);
        assert!(handles.iter().all(|&h| !pool.contains(h)));
        let h = pool.alloc(9).unwrap();
        assert_eq!(h.index(), 0, "lowest slot is reused first after clear");
        assert_eq!(pool.max_count(), 4);
    }

    #[test]
    fn limit_caps_live_items() {
        let mut pool: Pool<u8> = Pool::new();
        pool.set_limit(Some(2));
        let a = pool.alloc(1).unwrap();
        pool.alloc(2).unwrap();
        assert_eq!(pool.alloc(3), Err(PoolError::OutOfMemory(2)));
        assert_eq!(pool.reserve(1), Err(PoolError::OutOfMemory(2)));
        pool.free(a);
        assert!(pool.reserve(1).is_ok());
        assert!(pool.reserve(2).is_err());
        pool.alloc(4).unwrap();
        assert_eq!(pool.len(), 2);
    }

    #[test]
    fn reserve_makes_room_up_front() {
        let mut pool: Pool<u64> = Pool::new();
        pool.reserve(5).unwrap();
        assert!(pool.slots.capacity() >= 5);
        assert_eq!(pool.max_count(), 0);
        for i in 0..5 {
            pool.alloc(i).unwrap();
        }
        assert_eq!(pool.len(), 5);
    }

    #[test]
    fn iter_visits_live_items_in_slot_order() {
        let mut pool: Pool<char> = Pool::new();
        let a = pool.alloc('a').unwrap();
        pool.alloc('b').unwrap();
        pool.alloc('c').unwrap();
        pool.free(a);
        let seen: Vec<char> = pool.iter().map(|(_, &c)| c).collect();
        assert_eq!(seen, vec!['b', 'c']);
        // Restartable.
        assert_eq!(pool.iter().count(), 2);
        assert_eq!(pool.handles().len(), 2);
    }
}
