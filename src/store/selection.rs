//! Documents the user opted into for summarization.

use std::collections::BTreeSet;

use crate::models::DocumentId;

/// Set of selected document identifiers, iterated in lexicographic order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionSet {
    ids: BTreeSet<DocumentId>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip membership; returns whether the id is selected afterwards.
    pub fn toggle(&mut self, id: &DocumentId) -> bool {
        if self.ids.remove(id) {
            false
        } else {
            self.ids.insert(id.clone());
            true
        }
    }

    /// Add an id; returns false if it was already selected.
    pub fn insert(&mut self, id: &DocumentId) -> bool {
        self.ids.insert(id.clone())
    }

    pub fn remove(&mut self, id: &DocumentId) -> bool {
        self.ids.remove(id)
    }

    pub fn contains(&self, id: &DocumentId) -> bool {
        self.ids.contains(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &DocumentId> {
        self.ids.iter()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
