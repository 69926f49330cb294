// MangaShelf - core/merge.rs
//
// Library merge model: fold source entries into a target entry as chapters
// and drop the sources from the collection.
// Core layer: pure functions over a borrowed snapshot; the caller replaces
// its collection with the returned one.

use crate::core::model::{Chapter, LibraryEntry};
use chrono::NaiveDate;
use std::collections::HashSet;

/// Result of a successful merge.
#[derive(Debug, Clone, PartialEq)]
pub struct MergeOutcome {
    /// The new collection: original minus sources and old target, with the
    /// updated target appended last.
    pub library: Vec<LibraryEntry>,

    /// The updated target, for callers holding a separate "selected entry".
    pub target: LibraryEntry,
}

/// Merge `source_ids` into `target_id` as new chapters.
///
/// Sources are resolved in the order their ids are supplied; unknown ids are
/// skipped and repeated ids resolve once. The target id is never treated as
/// its own source. Each resolved source becomes one unread chapter numbered
/// after the target's current chapter count, dated `today`, carrying the
/// source's id, title and size label.
///
/// Returns `None` (and leaves everything untouched) when the target cannot be
/// resolved or no source resolves.
pub fn merge_entries(
    library: &[LibraryEntry],
    target_id: &str,
    source_ids: &[String],
    today: NaiveDate,
) -> Option<MergeOutcome> {
    let Some(target) = library.iter().find(|e| e.id == target_id) else {
        tracing::debug!(target = target_id, "Merge skipped: target not in library");
        return None;
    };

    let mut seen: HashSet<&str> = HashSet::new();
    let mut sources: Vec<&LibraryEntry> = Vec::with_capacity(source_ids.len());
    for id in source_ids {
        if id == target_id {
            tracing::warn!(target = target_id, "Target listed as its own merge source; ignored");
            continue;
        }
        if !seen.insert(id.as_str()) {
            continue;
        }
        match library.iter().find(|e| &e.id == id) {
            Some(source) => sources.push(source),
            None => tracing::debug!(source = %id, "Merge source not in library; skipped"),
        }
    }

    if sources.is_empty() {
        tracing::debug!(target = target_id, "Merge skipped: no sources resolved");
        return None;
    }

    let base = target.chapters.len();
    let mut updated = target.clone();
    updated
        .chapters
        .extend(sources.iter().enumerate().map(|(index, source)| Chapter {
            id: source.id.clone(),
            number: chapter_number(base + index + 1),
            title: source.title.clone(),
            date: today,
            read: false,
            size: Some(source.file_size.clone()),
        }));

    let consumed: HashSet<&str> = sources.iter().map(|s| s.id.as_str()).collect();
    let mut merged: Vec<LibraryEntry> = library
        .iter()
        .filter(|e| e.id != target_id && !consumed.contains(e.id.as_str()))
        .cloned()
        .collect();
    merged.push(updated.clone());

    tracing::info!(
        target = target_id,
        sources = sources.len(),
        chapters = updated.chapters.len(),
        "Merged entries into target"
    );

    Some(MergeOutcome {
        library: merged,
        target: updated,
    })
}

/// Saturates instead of wrapping.
fn chapter_number(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

/// Source ids for a merge dialog: every candidate except the chosen target,
/// in candidate order.
pub fn merge_sources(candidates: &[String], target_id: &str) -> Vec<String> {
    candidates
        .iter()
        .filter(|id| *id != target_id)
        .cloned()
        .collect()
}

/// The target a merge dialog preselects: the first candidate.
pub fn default_merge_target(candidates: &[LibraryEntry]) -> Option<&str> {
    candidates.first().map(|e| e.id.as_str())
}

/// Entries that can be added as chapters of `current_id`: everything except
/// the current entry whose title contains `search` (case-insensitive).
pub fn chapter_source_candidates<'a>(
    library: &'a [LibraryEntry],
    current_id: &str,
    search: &str,
) -> Vec<&'a LibraryEntry> {
    let needle = search.to_lowercase();
    library
        .iter()
        .filter(|e| e.id != current_id && e.title.to_lowercase().contains(&needle))
        .collect()
}
