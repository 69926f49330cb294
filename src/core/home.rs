// MangaShelf - core/home.rs
//
// Derived lists for the home and history views.

use crate::core::model::{LibraryEntry, ReadingStatus};
use crate::util::constants::{CONTINUE_READING_LIMIT, HISTORY_LIMIT, RECENTLY_ADDED_LIMIT};
use std::cmp::Reverse;

/// Entries currently being read, in collection order.
pub fn continue_reading(entries: &[LibraryEntry]) -> Vec<&LibraryEntry> {
    entries
        .iter()
        .filter(|e| e.status == Some(ReadingStatus::Reading))
        .take(CONTINUE_READING_LIMIT)
        .collect()
}

/// Newest additions first; undated entries last.
pub fn recently_added(entries: &[LibraryEntry]) -> Vec<&LibraryEntry> {
    let mut sorted: Vec<&LibraryEntry> = entries.iter().collect();
    // Option orders None before Some, so reversing puts undated entries last.
    sorted.sort_by_key(|e| Reverse(e.date_added));
    sorted.truncate(RECENTLY_ADDED_LIMIT);
    sorted
}

/// Entries that have been opened, in collection order.
pub fn reading_history(entries: &[LibraryEntry]) -> Vec<&LibraryEntry> {
    entries
        .iter()
        .filter(|e| e.last_opened.is_some())
        .take(HISTORY_LIMIT)
        .collect()
}

/// Headline numbers for the home view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LibraryStats {
    pub total: usize,
    pub reading: usize,
    pub completed: usize,
    pub planned: usize,
    pub chapters: usize,
    pub unread: usize,
}

impl LibraryStats {
    pub fn collect(entries: &[LibraryEntry]) -> Self {
        entries.iter().fold(Self::default(), |mut acc, e| {
            acc.total += 1;
            match e.status {
                Some(ReadingStatus::Reading) => acc.reading += 1,
                Some(ReadingStatus::Completed) => acc.completed += 1,
                Some(ReadingStatus::PlanToRead) => acc.planned += 1,
                None => {}
            }
            acc.chapters += e.chapter_count();
            acc.unread += e.unread_count();
            acc
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::Format;
    use chrono::NaiveDate;

    fn make(id: &str, status: Option<ReadingStatus>, added: Option<u32>) -> LibraryEntry {
        let mut e = LibraryEntry::new(id, id, Format::Cbz);
        e.status = status;
        e.date_added = added.and_then(|d| NaiveDate::from_ymd_opt(2023, 1, d));
        e
    }

    #[test]
    fn test_continue_reading_limit() {
        let entries: Vec<LibraryEntry> = (0..6)
            .map(|i| make(&i.to_string(), Some(ReadingStatus::Reading), None))
            .chain(std::iter::once(make("x", Some(ReadingStatus::Completed), None)))
            .collect();
        let list = continue_reading(&entries);
        assert_eq!(list.len(), CONTINUE_READING_LIMIT);
        assert_eq!(list[0].id, "0");
    }

    #[test]
    fn test_recently_added_orders_newest_first() {
        let entries = vec![make("a", None, Some(3)), make("b", None, None), make("c", None, Some(9))];
        let ids: Vec<&str> = recently_added(&entries).iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
    }

    #[test]
    fn test_history_and_stats() {
        let mut opened = make("a", Some(ReadingStatus::Reading), None);
        opened.last_opened = Some("2 hours ago".to_string());
        let entries = vec![opened, make("b", Some(ReadingStatus::PlanToRead), None)];
        assert_eq!(reading_history(&entries).len(), 1);

        let stats = LibraryStats::collect(&entries);
        assert_eq!(stats.total, 2);
        assert_eq!(stats.reading, 1);
        assert_eq!(stats.planned, 1);
        assert_eq!(stats.completed, 0);
    }
}
