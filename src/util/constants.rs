// MangaShelf - util/constants.rs
//
// Single source of truth for all named constants, limits, and defaults.
// Every configurable value is validated against the bounds declared here.

// =============================================================================
// Application metadata
// =============================================================================

/// Application display name.
pub const APP_NAME: &str = "MangaShelf";

/// Application identifier used for config/data directories.
pub const APP_ID: &str = "MangaShelf";

/// Current application version (updated by release script).
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

// =============================================================================
// Library limits
// =============================================================================

/// Maximum size of a library JSON file in bytes.
pub const MAX_LIBRARY_FILE_SIZE: u64 = 32 * 1024 * 1024; // 32 MB

/// Hard upper bound on the number of entries held in one collection.
/// Entries beyond this are dropped at load time with a warning.
pub const MAX_LIBRARY_ENTRIES: usize = 50_000;

/// Tag in the `general` category that marks adult-only content.
pub const ADULT_TAG: &str = "R18";

/// Minimum number of selected entries a batch merge accepts.
pub const MIN_MERGE_SELECTION: usize = 2;

/// Message shown when a batch merge is attempted with too few entries.
pub const MERGE_NEEDS_TWO_MESSAGE: &str = "Please select at least 2 items to merge.";

/// Highest rating an entry may carry.
pub const MAX_RATING: f32 = 5.0;

/// Maximum length (in characters) of a single tag.
pub const MAX_TAG_LENGTH: usize = 64;

/// Maximum number of tags per tag category.
pub const MAX_TAGS_PER_CATEGORY: usize = 100;

/// Word budget requested from the synopsis generator.
pub const SYNOPSIS_MAX_WORDS: usize = 100;

// =============================================================================
// View defaults
// =============================================================================

/// Number of "continue reading" cards on the home view.
pub const CONTINUE_READING_LIMIT: usize = 4;

/// Number of "recently added" cards on the home view.
pub const RECENTLY_ADDED_LIMIT: usize = 6;

/// Maximum number of entries listed in the reading history.
pub const HISTORY_LIMIT: usize = 50;

/// Default sort order for the library view.
pub const DEFAULT_SORT: &str = "date_added:desc,title:asc";

// =============================================================================
// Reader
// =============================================================================

/// Number of pages presented per chapter.
pub const PAGES_PER_CHAPTER: usize = 16;

/// Taps at or left of this fraction of the width turn back a page.
pub const READER_PREV_ZONE: f32 = 0.3;

/// Taps at or right of this fraction of the width turn forward a page.
pub const READER_NEXT_ZONE: f32 = 0.7;

// =============================================================================
// File-system browsing
// =============================================================================

/// Default recursion depth for media scans.
pub const DEFAULT_BROWSE_MAX_DEPTH: usize = 8;

/// Hard upper bound on media scan depth.
pub const ABSOLUTE_MAX_BROWSE_DEPTH: usize = 32;

/// Default maximum number of items returned by a listing or scan.
pub const DEFAULT_BROWSE_MAX_ITEMS: usize = 2_000;

/// Minimum sensible value for the browse item limit.
pub const MIN_BROWSE_MAX_ITEMS: usize = 1;

/// Hard upper bound on the browse item limit.
pub const ABSOLUTE_MAX_BROWSE_ITEMS: usize = 100_000;

/// File patterns recognised as importable comic archives.
pub const MEDIA_INCLUDE_PATTERNS: &[&str] = &["*.cbz", "*.zip", "*.pdf", "*.CBZ", "*.ZIP", "*.PDF"];

/// Names and patterns never descended into or imported.
pub const MEDIA_EXCLUDE_PATTERNS: &[&str] = &[".git", "node_modules", "*.tmp", "*.part"];

// =============================================================================
// Logging
// =============================================================================

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

// =============================================================================
// Configuration
// =============================================================================

/// Configuration file name.
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Default library file name (stored in the platform data directory).
pub const LIBRARY_FILE_NAME: &str = "library.json";
