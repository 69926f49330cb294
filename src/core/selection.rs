// MangaShelf - core/selection.rs
//
// Batch selection over a displayed view. Shared by the library grid and the
// file-system browser.
// Core layer: pure state, no I/O.

use crate::util::constants::{MERGE_NEEDS_TWO_MESSAGE, MIN_MERGE_SELECTION};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Batch actions available while selection mode is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BatchAction {
    MarkRead,
    Merge,
    Delete,
}

impl BatchAction {
    pub fn label(&self) -> &'static str {
        match self {
            BatchAction::MarkRead => "Mark as Read",
            BatchAction::Merge => "Merge Selected",
            BatchAction::Delete => "Delete",
        }
    }
}

/// Why a batch action was refused. Shown to the user; never an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchRejection {
    /// Nothing is selected. The action is silently ignored.
    NothingSelected,

    /// A merge needs at least `MIN_MERGE_SELECTION` entries.
    MergeNeedsTwo,
}

impl BatchRejection {
    /// User-facing message, or `None` when the rejection is silent.
    pub fn message(&self) -> Option<&'static str> {
        match self {
            BatchRejection::NothingSelected => None,
            BatchRejection::MergeNeedsTwo => Some(MERGE_NEEDS_TWO_MESSAGE),
        }
    }
}

/// Selection mode flag plus the set of selected identifiers.
///
/// Entering or leaving selection mode always clears the set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    active: bool,
    ids: BTreeSet<String>,
}

impl Selection {
    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }

    pub fn enter(&mut self) {
        self.active = true;
        self.ids.clear();
    }

    pub fn exit(&mut self) {
        self.active = false;
        self.ids.clear();
    }

    pub fn toggle_mode(&mut self) {
        if self.active {
            self.exit();
        } else {
            self.enter();
        }
    }

    /// Flip membership of one identifier. Returns true if it is now selected.
    pub fn toggle(&mut self, id: &str) -> bool {
        if self.ids.remove(id) {
            false
        } else {
            self.ids.insert(id.to_string());
            true
        }
    }

    /// Replace the selection with exactly the visible identifiers.
    pub fn select_all<'a, I>(&mut self, visible: I)
    where
        I: IntoIterator<Item = &'a str>,
    {
        self.ids = visible.into_iter().map(str::to_string).collect();
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    /// "Select All" / "Deselect All" button: when everything visible is
    /// already selected (by count), deselect; otherwise select all visible.
    pub fn toggle_all(&mut self, visible: &[&str]) {
        if self.ids.len() == visible.len() {
            self.ids.clear();
        } else {
            self.select_all(visible.iter().copied());
        }
    }

    /// Drop identifiers that are not in the current view.
    /// Returns the number of identifiers removed.
    pub fn retain_visible(&mut self, visible: &[&str]) -> usize {
        let before = self.ids.len();
        let keep: BTreeSet<&str> = visible.iter().copied().collect();
        self.ids.retain(|id| keep.contains(id.as_str()));
        before - self.ids.len()
    }

    /// Check whether `action` may run on the current selection.
    pub fn check_batch(&self, action: BatchAction) -> Result<(), BatchRejection> {
        if self.ids.is_empty() {
            return Err(BatchRejection::NothingSelected);
        }
        if action == BatchAction::Merge && self.ids.len() < MIN_MERGE_SELECTION {
            return Err(BatchRejection::MergeNeedsTwo);
        }
        Ok(())
    }

    /// Selected identifiers in the order they appear in `order`.
    pub fn selected_in_order<'a, I>(&self, order: I) -> Vec<String>
    where
        I: IntoIterator<Item = &'a str>,
    {
        order
            .into_iter()
            .filter(|id| self.ids.contains(*id))
            .map(str::to_string)
            .collect()
    }
}
