// MangaShelf - core/filter.rs
//
// Composable filter engine for library entries.
// All active filters are AND-combined, applied in a fixed order:
// adult gate, status, minimum chapters, format set, title search.
// Core layer: pure logic, no I/O or UI dependencies.

use crate::core::model::{Format, LibraryEntry, ReadingStatus};
use crate::core::sort::{self, SortRule};
use crate::util::error::FilterError;
use regex::Regex;
use std::collections::HashSet;

/// Complete filter state. All fields are AND-combined when applied.
#[derive(Debug, Clone, Default)]
pub struct LibraryFilter {
    /// Show entries tagged as adult content. Off by default.
    pub show_adult: bool,

    /// Only entries with this status. None = any status.
    pub status: Option<ReadingStatus>,

    /// Only entries with at least this many chapters. 0 = no threshold.
    pub min_chapters: usize,

    /// Formats to include (empty = all).
    pub formats: HashSet<Format>,

    /// Substring title search (case-insensitive). Empty = no filter.
    pub text_search: String,

    /// Compiled title regex. None = no regex filter.
    pub title_regex: Option<Regex>,
}

impl LibraryFilter {
    /// Returns true if no predicate can exclude an entry.
    pub fn is_empty(&self) -> bool {
        self.show_adult
            && self.status.is_none()
            && self.min_chapters == 0
            && self.formats.is_empty()
            && self.text_search.is_empty()
            && self.title_regex.is_none()
    }

    /// Set the title regex, compiling it. An empty pattern clears it.
    pub fn set_regex(&mut self, pattern: &str) -> Result<(), FilterError> {
        if pattern.is_empty() {
            self.title_regex = None;
            return Ok(());
        }
        let regex = Regex::new(pattern).map_err(|e| FilterError::InvalidRegex {
            pattern: pattern.to_string(),
            source: e,
        })?;
        self.title_regex = Some(regex);
        Ok(())
    }
}

/// Apply filters to a slice of entries, returning indices of matching entries
/// in collection order.
pub fn apply_filters(entries: &[LibraryEntry], filter: &LibraryFilter) -> Vec<usize> {
    if filter.is_empty() {
        return (0..entries.len()).collect();
    }

    let text_lower = filter.text_search.to_lowercase();

    entries
        .iter()
        .enumerate()
        .filter(|(_, entry)| matches_all(entry, filter, &text_lower))
        .map(|(idx, _)| idx)
        .collect()
}

/// Filter, then stable-sort: the displayed list of the library view.
pub fn derive_view(
    entries: &[LibraryEntry],
    filter: &LibraryFilter,
    rules: &[SortRule],
) -> Vec<usize> {
    let mut indices = apply_filters(entries, filter);
    sort::sort_indices(entries, &mut indices, rules);
    tracing::trace!(
        total = entries.len(),
        visible = indices.len(),
        "Library view derived"
    );
    indices
}

/// Check if a single entry matches all active filters.
fn matches_all(entry: &LibraryEntry, filter: &LibraryFilter, text_lower: &str) -> bool {
    // Adult-content gate
    if !filter.show_adult && entry.is_adult() {
        return false;
    }

    // Publication status
    if let Some(status) = filter.status {
        if entry.status != Some(status) {
            return false;
        }
    }

    // Minimum chapter count
    if entry.chapters.len() < filter.min_chapters {
        return false;
    }

    // Format set
    if !filter.formats.is_empty() && !filter.formats.contains(&entry.format) {
        return false;
    }

    // Title search (case-insensitive substring)
    if !text_lower.is_empty() && !entry.title.to_lowercase().contains(text_lower) {
        return false;
    }

    if let Some(ref regex) = filter.title_regex {
        if !regex.is_match(&entry.title) {
            return false;
        }
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::{Chapter, TagCategory};
    use crate::core::sort::{SortDirection, SortField};
    use chrono::NaiveDate;

    fn make_entry(id: &str, title: &str, format: Format, chapters: u32) -> LibraryEntry {
        let mut e = LibraryEntry::new(id, title, format);
        for n in 1..=chapters {
            e.chapters.push(Chapter {
                id: format!("{id}-{n}"),
                number: n,
                title: format!("Chapter {n}"),
                date: NaiveDate::from_ymd_opt(2023, 10, 25).unwrap(),
                read: false,
                size: None,
            });
        }
        e
    }

    fn sample() -> Vec<LibraryEntry> {
        let mut adult = make_entry("2", "Cyberpunk Drifter", Format::Zip, 5);
        adult.tags.insert(TagCategory::General, "R18");
        adult.status = Some(ReadingStatus::PlanToRead);
        let mut reading = make_entry("1", "Sakura Blooming Days", Format::Cbz, 12);
        reading.status = Some(ReadingStatus::Reading);
        let mut forest = make_entry("3", "The Silent Forest", Format::Pdf, 8);
        forest.status = Some(ReadingStatus::Completed);
        vec![reading, adult, forest, make_entry("4", "Azure Blue Skies", Format::Folder, 0)]
    }

    #[test]
    fn test_adult_entries_hidden_by_default() {
        let entries = sample();
        let result = apply_filters(&entries, &LibraryFilter::default());
        assert_eq!(result, vec![0, 2, 3]);

        let filter = LibraryFilter {
            show_adult: true,
            ..Default::default()
        };
        assert_eq!(apply_filters(&entries, &filter), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_status_filter() {
        let entries = sample();
        let filter = LibraryFilter {
            status: Some(ReadingStatus::Reading),
            ..Default::default()
        };
        assert_eq!(apply_filters(&entries, &filter), vec![0]);
    }

    #[test]
    fn test_min_chapters_and_formats() {
        let entries = sample();
        let filter = LibraryFilter {
            show_adult: true,
            min_chapters: 6,
            formats: [Format::Cbz, Format::Pdf, Format::Zip].into_iter().collect(),
            ..Default::default()
        };
        assert_eq!(apply_filters(&entries, &filter), vec![0, 2]);
    }

    #[test]
    fn test_text_search_case_insensitive() {
        let entries = sample();
        let filter = LibraryFilter {
            text_search: "FOREST".to_string(),
            ..Default::default()
        };
        assert_eq!(apply_filters(&entries, &filter), vec![2]);
    }

    #[test]
    fn test_regex_filter_and_invalid_regex() {
        let entries = sample();
        let mut filter = LibraryFilter::default();
        filter.set_regex(r"^(The|Azure)\b").unwrap();
        assert_eq!(apply_filters(&entries, &filter), vec![2, 3]);
        assert!(filter.set_regex("[invalid").is_err());
        filter.set_regex("").unwrap();
        assert!(filter.title_regex.is_none());
    }

    #[test]
    fn test_empty_result_is_valid() {
        let entries = sample();
        let filter = LibraryFilter {
            text_search: "no such title".to_string(),
            ..Default::default()
        };
        assert!(apply_filters(&entries, &filter).is_empty());
    }

    #[test]
    fn test_filter_is_subset_and_idempotent() {
        let entries = sample();
        let filter = LibraryFilter {
            min_chapters: 1,
            text_search: "s".to_string(),
            ..Default::default()
        };
        let first = apply_filters(&entries, &filter);
        assert!(first.iter().all(|&i| i < entries.len()));

        let subset: Vec<LibraryEntry> = first.iter().map(|&i| entries[i].clone()).collect();
        let second = apply_filters(&subset, &filter);
        assert_eq!(second, (0..subset.len()).collect::<Vec<_>>());
    }

    #[test]
    fn test_derive_view_filters_then_sorts() {
        let entries = sample();
        let rules = [SortRule::new(SortField::Title, SortDirection::Asc)];
        let view = derive_view(&entries, &LibraryFilter::default(), &rules);
        let titles: Vec<&str> = view.iter().map(|&i| entries[i].title.as_str()).collect();
        assert_eq!(
            titles,
            vec!["Azure Blue Skies", "Sakura Blooming Days", "The Silent Forest"]
        );
    }
}
