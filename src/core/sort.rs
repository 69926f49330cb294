// MangaShelf - core/sort.rs
//
// Multi-key sort for the library view.
// Rules are evaluated in order; the first non-equal comparison decides.
// Core layer: pure logic, no I/O or UI dependencies.

use crate::core::model::LibraryEntry;
use crate::util::error::FilterError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Field a sort rule compares on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    Title,
    DateAdded,
    Rating,
    ChapterCount,
}

impl SortField {
    pub fn label(&self) -> &'static str {
        match self {
            SortField::Title => "Title",
            SortField::DateAdded => "Date Added",
            SortField::Rating => "Rating",
            SortField::ChapterCount => "Chapters",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

/// One (field, direction) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortRule {
    pub field: SortField,
    pub direction: SortDirection,
}

impl SortRule {
    pub fn new(field: SortField, direction: SortDirection) -> Self {
        Self { field, direction }
    }
}

/// The library view's initial ordering: newest first, then by title.
pub fn default_rules() -> Vec<SortRule> {
    vec![
        SortRule::new(SortField::DateAdded, SortDirection::Desc),
        SortRule::new(SortField::Title, SortDirection::Asc),
    ]
}

/// Compare two entries under `rules`.
pub fn compare_entries(a: &LibraryEntry, b: &LibraryEntry, rules: &[SortRule]) -> Ordering {
    for rule in rules {
        let ord = compare_field(a, b, rule.field);
        let ord = match rule.direction {
            SortDirection::Asc => ord,
            SortDirection::Desc => ord.reverse(),
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }
    Ordering::Equal
}

/// Missing values compare as the type's zero value.
fn compare_field(a: &LibraryEntry, b: &LibraryEntry, field: SortField) -> Ordering {
    match field {
        SortField::Title => a.title.to_lowercase().cmp(&b.title.to_lowercase()),
        SortField::DateAdded => date_or_epoch(a).cmp(&date_or_epoch(b)),
        SortField::Rating => a.rating.total_cmp(&b.rating),
        SortField::ChapterCount => a.chapters.len().cmp(&b.chapters.len()),
    }
}

fn date_or_epoch(entry: &LibraryEntry) -> NaiveDate {
    // NaiveDate::default() is 1970-01-01.
    entry.date_added.unwrap_or_default()
}

/// Stable in-place sort of `indices` (into `entries`) under `rules`.
pub fn sort_indices(entries: &[LibraryEntry], indices: &mut [usize], rules: &[SortRule]) {
    if rules.is_empty() {
        return;
    }
    indices.sort_by(|&a, &b| compare_entries(&entries[a], &entries[b], rules));
}

/// Parse a comma-separated rule list such as `"title:asc,rating:desc"`.
///
/// The direction defaults to ascending when omitted.
pub fn parse_sort_rules(input: &str) -> Result<Vec<SortRule>, FilterError> {
    input
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(parse_rule)
        .collect()
}

fn parse_rule(part: &str) -> Result<SortRule, FilterError> {
    let (field_str, dir_str) = match part.split_once(':') {
        Some((f, d)) => (f.trim(), Some(d.trim())),
        None => (part, None),
    };

    let field = match field_str.to_ascii_lowercase().replace('-', "_").as_str() {
        "title" => SortField::Title,
        "date_added" | "dateadded" | "date" | "added" => SortField::DateAdded,
        "rating" => SortField::Rating,
        "chapters" | "chapter_count" => SortField::ChapterCount,
        _ => {
            return Err(FilterError::InvalidSortRule {
                rule: part.to_string(),
                reason: format!("unknown field '{field_str}'"),
            })
        }
    };

    let direction = match dir_str.map(str::to_ascii_lowercase).as_deref() {
        None | Some("asc") | Some("ascending") => SortDirection::Asc,
        Some("desc") | Some("descending") => SortDirection::Desc,
        Some(other) => {
            return Err(FilterError::InvalidSortRule {
                rule: part.to_string(),
                reason: format!("unknown direction '{other}'"),
            })
        }
    };

    Ok(SortRule { field, direction })
}
