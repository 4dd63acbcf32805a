//! Row selection state.

use std::collections::HashSet;
use std::hash::Hash;

/// Checkbox state of the "select all" header cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectAllState {
    Unchecked,
    Indeterminate,
    Checked,
}

/// Set of selected row ids. Order independent.
#[derive(Debug, Clone)]
pub struct Selection<K> {
    selected: HashSet<K>,
}

impl<K: Eq + Hash + Clone> Selection<K> {
    pub fn new() -> Self {
        Self {
            selected: HashSet::new(),
        }
    }

    pub fn is_selected(&self, id: &K) -> bool {
        self.selected.contains(id)
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// Toggles an id. Returns whether it is now selected.
    pub fn toggle(&mut self, id: K) -> bool {
        if self.selected.remove(&id) {
            false
        } else {
            self.selected.insert(id);
            true
        }
    }

    /// Replaces the selection with `ids`.
    pub fn select_only(&mut self, ids: impl IntoIterator<Item = K>) {
        self.selected = ids.into_iter().collect();
    }

    pub fn clear(&mut self) {
        self.selected.clear();
    }

    /// Selected ids in unspecified order.
    pub fn ids(&self) -> Vec<K> {
        self.selected.iter().cloned().collect()
    }

    /// Header checkbox state relative to the visible row count.
    pub fn select_all_state(&self, row_count: usize) -> SelectAllState {
        let selected = self.len();
        if row_count > 0 && selected == row_count {
            SelectAllState::Checked
        } else if selected > 0 && selected < row_count {
            SelectAllState::Indeterminate
        } else {
            SelectAllState::Unchecked
        }
    }
}

impl<K: Ord + Clone> Selection<K> {
    /// Selected ids, sorted.
    pub fn sorted_ids(&self) -> Vec<K> {
        let mut ids: Vec<_> = self.selected.iter().cloned().collect();
        ids.sort();
        ids
    }
}

impl<K: Eq + Hash + Clone> Default for Selection<K> {
    fn default() -> Self {
        Self::new()
    }
}
