//! Memo of resolved `parent.segment` selections within one definition.

use crate::wireable::WireableId;
use std::collections::HashMap;

/// Maps `(parent, segment)` to the select created for it, so that selecting
/// the same path twice returns the same wireable.
#[derive(Debug, Clone, Default)]
pub struct SelCache {
    entries: HashMap<(WireableId, String), WireableId>,
}

impl SelCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up a previous selection.
    pub fn get(&self, parent: WireableId, segment: &str) -> Option<WireableId> {
        self.entries.get(&(parent, segment.to_string())).copied()
    }

    /// Records a selection.
    pub fn insert(&mut self, parent: WireableId, segment: &str, child: WireableId) {
        self.entries.insert((parent, segment.to_string()), child);
    }

    /// Drops every entry whose parent or child is in `removed`.
    pub fn purge(&mut self, removed: &[WireableId]) {
        self.entries
            .retain(|(parent, _), child| !removed.contains(parent) && !removed.contains(child));
    }

    /// Number of cached selections.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
