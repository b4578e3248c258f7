//! Insertion-order index over a definition's instances.
//!
//! A doubly-linked list keyed by [`WireableId`]: `first`/`last` ends plus a
//! predecessor/successor link per member. Appending and unlinking are O(1),
//! and iteration visits surviving instances in the order they were added.

use crate::wireable::WireableId;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy)]
struct Link {
    prev: Option<WireableId>,
    next: Option<WireableId>,
}

/// Ordered membership of instances.
#[derive(Debug, Clone, Default)]
pub struct InstanceOrder {
    first: Option<WireableId>,
    last: Option<WireableId>,
    links: HashMap<WireableId, Link>,
}

impl InstanceOrder {
    /// Creates an empty order.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `id` at the end.
    ///
    /// # Panics
    ///
    /// Panics if `id` is already a member.
    pub fn append(&mut self, id: WireableId) {
        assert!(
            !self.links.contains_key(&id),
            "instance {id} is already in the iteration order"
        );
        match self.last {
            None => {
                debug_assert!(self.first.is_none());
                self.first = Some(id);
            }
            Some(last) => {
                let tail = self.link_mut(last);
                debug_assert!(tail.next.is_none());
                tail.next = Some(id);
            }
        }
        self.links.insert(
            id,
            Link {
                prev: self.last,
                next: None,
            },
        );
        self.last = Some(id);
    }

    /// Unlinks `id`, joining its neighbours.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not a member.
    pub fn remove(&mut self, id: WireableId) {
        let Link { prev, next } = self
            .links
            .remove(&id)
            .unwrap_or_else(|| panic!("instance {id} is not in the iteration order"));
        match prev {
            Some(p) => self.link_mut(p).next = next,
            None => self.first = next,
        }
        match next {
            Some(n) => self.link_mut(n).prev = prev,
            None => self.last = prev,
        }
    }

    fn link_mut(&mut self, id: WireableId) -> &mut Link {
        self.links
            .get_mut(&id)
            .unwrap_or_else(|| panic!("iteration order corrupted around {id}"))
    }

    /// The oldest surviving member.
    pub fn first(&self) -> Option<WireableId> {
        self.first
    }

    /// The newest member.
    pub fn last(&self) -> Option<WireableId> {
        self.last
    }

    /// The member after `id`, or `None` at the end.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not a member.
    pub fn next(&self, id: WireableId) -> Option<WireableId> {
        self.links
            .get(&id)
            .unwrap_or_else(|| panic!("instance {id} is not in the iteration order"))
            .next
    }

    /// Returns `true` if `id` is a member.
    pub fn contains(&self, id: WireableId) -> bool {
        self.links.contains_key(&id)
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.links.len()
    }

    /// Returns `true` if there are no members.
    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    /// Walks the members front to back.
    pub fn iter(&self) -> OrderIter<'_> {
        OrderIter {
            order: self,
            cursor: self.first,
        }
    }
}

/// Iterator returned by [`InstanceOrder::iter`].
pub struct OrderIter<'a> {
    order: &'a InstanceOrder,
    cursor: Option<WireableId>,
}

impl Iterator for OrderIter<'_> {
    type Item = WireableId;

    fn next(&mut self) -> Option<WireableId> {
        let current = self.cursor?;
        self.cursor = self.order.next(current);
        Some(current)
    }
}
