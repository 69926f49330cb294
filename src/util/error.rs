// MangaShelf - util/error.rs
//
// Typed error hierarchy with context-preserving error chains.
// No string-based error propagation: every failure keeps its cause so
// diagnostic logging can walk the chain.
//
// Merge and selection preconditions are not errors: they are
// silent no-ops or user-facing rejections.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Top-level error type for all MangaShelf operations.
/// Errors are categorised by the subsystem that produced them.
#[derive(Debug)]
pub enum ShelfError {
    /// Library loading or saving failed.
    Library(LibraryError),

    /// File-system browsing failed.
    Browse(BrowseError),

    /// Filter construction failed.
    Filter(FilterError),

    /// Metadata validation or generation failed.
    Metadata(MetadataError),

    /// Export operation failed.
    Export(ExportError),

    /// Configuration loading or validation failed.
    Config(ConfigError),
}

impl fmt::Display for ShelfError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Library(e) => write!(f, "Library error: {e}"),
            Self::Browse(e) => write!(f, "Browse error: {e}"),
            Self::Filter(e) => write!(f, "Filter error: {e}"),
            Self::Metadata(e) => write!(f, "Metadata error: {e}"),
            Self::Export(e) => write!(f, "Export error: {e}"),
            Self::Config(e) => write!(f, "Configuration error: {e}"),
        }
    }
}

impl std::error::Error for ShelfError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Library(e) => Some(e),
            Self::Browse(e) => Some(e),
            Self::Filter(e) => Some(e),
            Self::Metadata(e) => Some(e),
            Self::Export(e) => Some(e),
            Self::Config(e) => Some(e),
        }
    }
}

// ---------------------------------------------------------------------------
// Library errors
// ---------------------------------------------------------------------------

/// Errors related to loading and saving a collection.
#[derive(Debug)]
pub enum LibraryError {
    /// Library JSON could not be parsed.
    JsonParse {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// Library could not be serialised.
    JsonWrite {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// Library file exceeds the maximum allowed size.
    FileTooLarge {
        path: PathBuf,
        size: u64,
        max_size: u64,
    },

    /// Two entries in one collection share an identifier.
    DuplicateId { id: String },

    /// Maximum number of entries exceeded.
    TooManyEntries { count: usize, max: usize },

    /// I/O error reading or writing a library file.
    Io { path: PathBuf, source: io::Error },
}

impl fmt::Display for LibraryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::JsonParse { path, source } => {
                write!(f, "Failed to parse library '{}': {source}", path.display())
            }
            Self::JsonWrite { path, source } => {
                write!(
                    f,
                    "Failed to serialise library for '{}': {source}",
                    path.display()
                )
            }
            Self::FileTooLarge {
                path,
                size,
                max_size,
            } => write!(
                f,
                "Library '{}' is {size} bytes, exceeds maximum of {max_size} bytes",
                path.display()
            ),
            Self::DuplicateId { id } => {
                write!(f, "Duplicate entry ID '{id}'; later occurrence skipped")
            }
            Self::TooManyEntries { count, max } => {
                write!(f, "Too many library entries ({count}), maximum is {max}")
            }
            Self::Io { path, source } => {
                write!(f, "I/O error on library '{}': {source}", path.display())
            }
        }
    }
}

impl std::error::Error for LibraryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::JsonParse { source, .. } => Some(source),
            Self::JsonWrite { source, .. } => Some(source),
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<LibraryError> for ShelfError {
    fn from(e: LibraryError) -> Self {
        Self::Library(e)
    }
}

// ---------------------------------------------------------------------------
// Browse errors
// ---------------------------------------------------------------------------

/// Errors related to file-system browsing and media scans.
#[derive(Debug)]
pub enum BrowseError {
    /// The browse root does not exist or is not accessible.
    RootNotFound { path: PathBuf },

    /// The browse root is not a directory.
    NotADirectory { path: PathBuf },

    /// Permission denied accessing the root path.
    PermissionDenied { path: PathBuf, source: io::Error },

    /// Walkdir traversal error on the root itself.
    Traversal {
        path: PathBuf,
        source: walkdir::Error,
    },
}

impl fmt::Display for BrowseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RootNotFound { path } => {
                write!(f, "Browse path '{}' does not exist", path.display())
            }
            Self::NotADirectory { path } => {
                write!(f, "Browse path '{}' is not a directory", path.display())
            }
            Self::PermissionDenied { path, source } => {
                write!(
                    f,
                    "Permission denied accessing '{}': {source}",
                    path.display()
                )
            }
            Self::Traversal { path, source } => {
                write!(f, "Error traversing '{}': {source}", path.display())
            }
        }
    }
}

impl std::error::Error for BrowseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::PermissionDenied { source, .. } => Some(source),
            Self::Traversal { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<BrowseError> for ShelfError {
    fn from(e: BrowseError) -> Self {
        Self::Browse(e)
    }
}

// ---------------------------------------------------------------------------
// Filter errors
// ---------------------------------------------------------------------------

/// Errors related to filter operations.
#[derive(Debug)]
pub enum FilterError {
    /// User-provided regex is invalid.
    InvalidRegex {
        pattern: String,
        source: regex::Error,
    },

    /// A sort rule string could not be understood.
    InvalidSortRule { rule: String, reason: String },
}

impl fmt::Display for FilterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidRegex { pattern, source } => {
                write!(f, "Invalid filter regex '{pattern}': {source}")
            }
            Self::InvalidSortRule { rule, reason } => {
                write!(f, "Invalid sort rule '{rule}': {reason}")
            }
        }
    }
}

impl std::error::Error for FilterError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidRegex { source, .. } => Some(source),
            Self::InvalidSortRule { .. } => None,
        }
    }
}

impl From<FilterError> for ShelfError {
    fn from(e: FilterError) -> Self {
        Self::Filter(e)
    }
}

// ---------------------------------------------------------------------------
// Metadata errors
// ---------------------------------------------------------------------------

/// Errors raised while editing an entry's metadata.
#[derive(Debug)]
pub enum MetadataError {
    /// Title is empty after trimming.
    EmptyTitle { id: String },

    /// Rating is outside 0.0..=MAX_RATING or not finite.
    InvalidRating { value: f32, max: f32 },

    /// A tag exceeds the maximum length.
    TagTooLong { tag: String, max_length: usize },

    /// A category already holds the maximum number of tags.
    TooManyTags { category: &'static str, max: usize },

    /// The text-generation collaborator failed.
    GenerationFailed { reason: String },
}

impl fmt::Display for MetadataError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyTitle { id } => write!(f, "Entry '{id}': title must not be empty"),
            Self::InvalidRating { value, max } => {
                write!(f, "Rating {value} is out of range (0-{max})")
            }
            Self::TagTooLong { tag, max_length } => write!(
                f,
                "Tag '{tag}' is {} characters, exceeds maximum of {max_length}",
                tag.chars().count()
            ),
            Self::TooManyTags { category, max } => {
                write!(f, "Tag category '{category}' is full (maximum {max} tags)")
            }
            Self::GenerationFailed { reason } => {
                write!(f, "Synopsis generation failed: {reason}")
            }
        }
    }
}

impl std::error::Error for MetadataError {}

impl From<MetadataError> for ShelfError {
    fn from(e: MetadataError) -> Self {
        Self::Metadata(e)
    }
}

// ---------------------------------------------------------------------------
// Export errors
// ---------------------------------------------------------------------------

/// Errors related to export operations.
#[derive(Debug)]
pub enum ExportError {
    /// I/O error writing the export file.
    Io { path: PathBuf, source: io::Error },

    /// CSV serialisation error.
    Csv { path: PathBuf, source: csv::Error },

    /// JSON serialisation error.
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "Export I/O error '{}': {source}", path.display())
            }
            Self::Csv { path, source } => {
                write!(f, "CSV export error '{}': {source}", path.display())
            }
            Self::Json { path, source } => {
                write!(f, "JSON export error '{}': {source}", path.display())
            }
        }
    }
}

impl std::error::Error for ExportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Csv { source, .. } => Some(source),
            Self::Json { source, .. } => Some(source),
        }
    }
}

impl From<ExportError> for ShelfError {
    fn from(e: ExportError) -> Self {
        Self::Export(e)
    }
}

// ---------------------------------------------------------------------------
// Config errors
// ---------------------------------------------------------------------------

/// Errors related to configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    /// TOML parsing failed.
    TomlParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// A config value is out of the allowed range.
    ValueOutOfRange {
        field: String,
        value: String,
        expected: String,
    },

    /// I/O error reading config file.
    Io { path: PathBuf, source: io::Error },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TomlParse { path, source } => {
                write!(f, "Config parse error '{}': {source}", path.display())
            }
            Self::ValueOutOfRange {
                field,
                value,
                expected,
            } => write!(
                f,
                "Config '{field}' = '{value}' is out of range. Expected: {expected}"
            ),
            Self::Io { path, source } => {
                write!(f, "Config I/O error '{}': {source}", path.display())
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::TomlParse { source, .. } => Some(source),
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<ConfigError> for ShelfError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}
