//! Append-only, ID-indexed storage for context-owned IR objects.
//!
//! Nothing allocated in an [`Arena`] is freed before the arena itself is
//! dropped, so an ID handed out once stays valid for the owner's lifetime.

use serde::{Deserialize, Serialize};
use std::marker::PhantomData;
use std::ops::{Index, IndexMut};

/// Opaque ID types used as arena keys.
pub trait ArenaId: Copy {
    /// Creates an ID from a raw index.
    fn from_raw(index: u32) -> Self;

    /// Returns the raw index.
    fn as_raw(self) -> u32;
}

/// Dense storage addressed by `I`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Arena<I: ArenaId, T> {
    items: Vec<T>,
    #[serde(skip)]
    _marker: PhantomData<I>,
}

impl<I: ArenaId, T> Default for Arena<I, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I: ArenaId, T> Arena<I, T> {
    /// Creates an empty arena.
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            _marker: PhantomData,
        }
    }

    /// Stores `item` and returns its ID.
    pub fn alloc(&mut self, item: T) -> I {
        let id = I::from_raw(self.items.len() as u32);
        self.items.push(item);
        id
    }

    /// Returns the item for `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id` was not allocated by this arena.
    pub fn get(&self, id: I) -> &T {
        &self.items[id.as_raw() as usize]
    }

    /// Returns the item for `id` mutably.
    ///
    /// # Panics
    ///
    /// Panics if `id` was not allocated by this arena.
    pub fn get_mut(&mut self, id: I) -> &mut T {
        &mut self.items[id.as_raw() as usize]
    }

    /// Returns the item for `id`, or `None` if it is out of range.
    pub fn try_get(&self, id: I) -> Option<&T> {
        self.items.get(id.as_raw() as usize)
    }

    /// Number of items allocated so far.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if nothing has been allocated.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterates over `(ID, &T)` pairs in allocation order.
    pub fn iter(&self) -> impl Iterator<Item = (I, &T)> {
        self.items
            .iter()
            .enumerate()
            .map(|(i, item)| (I::from_raw(i as u32), item))
    }
}

impl<I: ArenaId, T> Index<I> for Arena<I, T> {
    type Output = T;

    fn index(&self, id: I) -> &T {
        self.get(id)
    }
}

impl<I: ArenaId, T> IndexMut<I> for Arena<I, T> {
    fn index_mut(&mut self, id: I) -> &mut T {
        self.get_mut(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::{ModuleId, NamespaceId};

    #[test]
    fn alloc_hands_out_sequential_ids() {
        let mut arena: Arena<ModuleId, &str> = Arena::new();
        let a = arena.alloc("adder");
        let b = arena.alloc("mux");
        assert_eq!(a.as_raw(), 0);
        assert_eq!(b.as_raw(), 1);
        assert_eq!(arena[b], "mux");
    }

    #[test]
    fn index_mut_updates_in_place() {
        let mut arena: Arena<NamespaceId, String> = Arena::new();
        let id = arena.alloc("global".to_string());
        arena[id].push_str("_ns");
        assert_eq!(arena[id], "global_ns");
    }

    #[test]
    fn try_get_out_of_range() {
        let arena: Arena<ModuleId, u8> = Arena::default();
        assert!(arena.is_empty());
        assert!(arena.try_get(ModuleId::from_raw(0)).is_none());
    }

    #[test]
    fn iter_in_allocation_order() {
        let mut arena: Arena<ModuleId, u32> = Arena::new();
        arena.alloc(7);
        arena.alloc(9);
        let pairs: Vec<_> = arena.iter().map(|(id, v)| (id.as_raw(), *v)).collect();
        assert_eq!(pairs, vec![(0, 7), (1, 9)]);
        assert_eq!(arena.len(), 2);
    }

    #[test]
    #[should_panic]
    fn get_out_of_range_panics() {
        let arena: Arena<ModuleId, u8> = Arena::new();
        let _ = arena.get(ModuleId::from_raw(3));
    }
}
