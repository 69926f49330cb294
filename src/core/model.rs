// MangaShelf - core/model.rs
//
// Core data model types. Pure data definitions with no I/O, no UI,
// no platform dependencies.
//
// These types are the shared vocabulary across all layers. The JSON shape
// (camelCase keys, upper-case formats, "Plan to Read") matches the
// collection files produced by earlier front-ends so they load unchanged.

use crate::util::constants::ADULT_TAG;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

// =============================================================================
// Library Entry
// =============================================================================

/// One title in the collection: a series, a volume, or a loose archive.
///
/// Entries flow through filtering, sorting, selection and merging. Merging
/// consumes entries: a source entry becomes a chapter of the target and
/// disappears from the collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LibraryEntry {
    /// Identifier, unique within a collection.
    pub id: String,

    /// Display title.
    pub title: String,

    /// Synopsis text.
    #[serde(default)]
    pub description: String,

    /// Cover image location (URL or file path).
    #[serde(default)]
    pub cover_url: String,

    /// Human-readable size label, e.g. "1.2 GB".
    #[serde(default)]
    pub file_size: String,

    /// Container format of the underlying media.
    pub format: Format,

    /// Location of the media on disk.
    #[serde(default)]
    pub path: String,

    /// User rating, 0.0 to 5.0.
    #[serde(default)]
    pub rating: f32,

    /// Calendar date the entry was added. `None` sorts as the epoch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_added: Option<NaiveDate>,

    /// Series the entry belongs to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub series: Option<String>,

    /// Categorised tags.
    #[serde(default)]
    pub tags: TagSet,

    /// Chapters in stored order.
    #[serde(default)]
    pub chapters: Vec<Chapter>,

    /// Most recently read chapter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_read_chapter_id: Option<String>,

    /// Publication/reading status.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ReadingStatus>,

    /// Free-form "last opened" label, e.g. "2 hours ago".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_opened: Option<String>,
}

impl LibraryEntry {
    /// Minimal entry with empty metadata. Used by importers and tests.
    pub fn new(id: impl Into<String>, title: impl Into<String>, format: Format) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: String::new(),
            cover_url: String::new(),
            file_size: String::new(),
            format,
            path: String::new(),
            rating: 0.0,
            date_added: None,
            series: None,
            tags: TagSet::default(),
            chapters: Vec::new(),
            last_read_chapter_id: None,
            status: None,
            last_opened: None,
        }
    }

    /// True when the entry carries the adult-content tag.
    pub fn is_adult(&self) -> bool {
        self.tags.contains(TagCategory::General, ADULT_TAG)
    }

    pub fn chapter_count(&self) -> usize {
        self.chapters.len()
    }

    /// Number of chapters not yet marked read.
    pub fn unread_count(&self) -> usize {
        self.chapters.iter().filter(|c| !c.read).count()
    }

    pub fn chapter(&self, chapter_id: &str) -> Option<&Chapter> {
        self.chapters.iter().find(|c| c.id == chapter_id)
    }

    /// Mark every chapter as read.
    pub fn mark_all_read(&mut self) {
        for chapter in &mut self.chapters {
            chapter.read = true;
        }
    }
}

/// Find an entry by identifier.
pub fn find_entry<'a>(entries: &'a [LibraryEntry], id: &str) -> Option<&'a LibraryEntry> {
    entries.iter().find(|e| e.id == id)
}

// =============================================================================
// Chapter
// =============================================================================

/// A readable unit inside an entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chapter {
    /// Identifier. Not guaranteed unique across entries: merged chapters
    /// reuse the identifier of the entry they were created from.
    pub id: String,

    /// Chapter number, unique within its entry.
    pub number: u32,

    pub title: String,

    /// Release or import date.
    pub date: NaiveDate,

    #[serde(default)]
    pub read: bool,

    /// Human-readable size label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
}

// =============================================================================
// Format
// =============================================================================

/// Container format of an entry's media.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Format {
    Cbz,
    Zip,
    Pdf,
    Folder,
}

impl Format {
    /// Returns all variants in display order.
    pub fn all() -> &'static [Format] {
        &[Format::Cbz, Format::Zip, Format::Pdf, Format::Folder]
    }

    pub fn label(&self) -> &'static str {
        match self {
            Format::Cbz => "CBZ",
            Format::Zip => "ZIP",
            Format::Pdf => "PDF",
            Format::Folder => "FOLDER",
        }
    }

    /// Map a file extension (without the dot, any case) to an archive format.
    /// Folders have no extension and are never returned here.
    pub fn from_extension(ext: &str) -> Option<Format> {
        match ext.to_ascii_lowercase().as_str() {
            "cbz" => Some(Format::Cbz),
            "zip" => Some(Format::Zip),
            "pdf" => Some(Format::Pdf),
            _ => None,
        }
    }
}

impl std::fmt::Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Format {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "folder" | "dir" => Ok(Format::Folder),
            other => Format::from_extension(other).ok_or_else(|| {
                format!("unknown format '{s}' (expected cbz, zip, pdf or folder)")
            }),
        }
    }
}

// =============================================================================
// Reading status
// =============================================================================

/// Where the reader is with an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReadingStatus {
    Reading,
    Completed,
    #[serde(rename = "Plan to Read")]
    PlanToRead,
}

impl ReadingStatus {
    pub fn all() -> &'static [ReadingStatus] {
        &[
            ReadingStatus::Reading,
            ReadingStatus::Completed,
            ReadingStatus::PlanToRead,
        ]
    }

    pub fn label(&self) -> &'static str {
        match self {
            ReadingStatus::Reading => "Reading",
            ReadingStatus::Completed => "Completed",
            ReadingStatus::PlanToRead => "Plan to Read",
        }
    }
}

impl std::fmt::Display for ReadingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ReadingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalised: String = s
            .trim()
            .to_ascii_lowercase()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect();
        match normalised.as_str() {
            "reading" => Ok(ReadingStatus::Reading),
            "completed" | "complete" => Ok(ReadingStatus::Completed),
            "plantoread" | "planned" => Ok(ReadingStatus::PlanToRead),
            _ => Err(format!(
                "unknown status '{s}' (expected reading, completed or plan-to-read)"
            )),
        }
    }
}

// =============================================================================
// Tags
// =============================================================================

/// The closed set of tag categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TagCategory {
    Authors,
    Characters,
    General,
    Series,
}

impl TagCategory {
    pub fn all() -> &'static [TagCategory] {
        &[
            TagCategory::Authors,
            TagCategory::Characters,
            TagCategory::General,
            TagCategory::Series,
        ]
    }

    pub fn label(&self) -> &'static str {
        match self {
            TagCategory::Authors => "authors",
            TagCategory::Characters => "characters",
            TagCategory::General => "general",
            TagCategory::Series => "series",
        }
    }
}

impl std::fmt::Display for TagCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for TagCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "author" | "authors" => Ok(TagCategory::Authors),
            "character" | "characters" => Ok(TagCategory::Characters),
            "general" | "genre" => Ok(TagCategory::General),
            "series" => Ok(TagCategory::Series),
            _ => Err(format!(
                "unknown tag category '{s}' (expected authors, characters, general or series)"
            )),
        }
    }
}

/// Fixed-key record of tag lists, one per `TagCategory`.
///
/// Lists keep insertion order; uniqueness within a list is maintained by
/// `insert`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TagSet {
    pub authors: Vec<String>,
    pub characters: Vec<String>,
    pub general: Vec<String>,
    pub series: Vec<String>,
}

impl TagSet {
    pub fn get(&self, category: TagCategory) -> &[String] {
        match category {
            TagCategory::Authors => &self.authors,
            TagCategory::Characters => &self.characters,
            TagCategory::General => &self.general,
            TagCategory::Series => &self.series,
        }
    }

    fn get_mut(&mut self, category: TagCategory) -> &mut Vec<String> {
        match category {
            TagCategory::Authors => &mut self.authors,
            TagCategory::Characters => &mut self.characters,
            TagCategory::General => &mut self.general,
            TagCategory::Series => &mut self.series,
        }
    }

    pub fn contains(&self, category: TagCategory, tag: &str) -> bool {
        self.get(category).iter().any(|t| t == tag)
    }

    /// Append `tag` unless already present. Returns true if it was added.
    pub fn insert(&mut self, category: TagCategory, tag: &str) -> bool {
        if self.contains(category, tag) {
            return false;
        }
        self.get_mut(category).push(tag.to_string());
        true
    }

    /// Remove `tag`. Returns true if it was present.
    pub fn remove(&mut self, category: TagCategory, tag: &str) -> bool {
        let list = self.get_mut(category);
        let before = list.len();
        list.retain(|t| t != tag);
        list.len() != before
    }

    pub fn len(&self, category: TagCategory) -> usize {
        self.get(category).len()
    }
}
