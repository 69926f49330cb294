// MangaShelf - app/library_mgr.rs
//
// Loads collections from their sources: the sample collection embedded in
// the binary, or a JSON file on disk. Saves collections atomically.
//
// Validation is non-fatal where possible: duplicate ids and entries beyond
// the size cap are dropped and reported alongside the loaded collection.

use crate::core::model::LibraryEntry;
use crate::platform::fs;
use crate::util::constants;
use crate::util::error::LibraryError;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Sample collection shipped with the binary.
const SAMPLE_LIBRARY_JSON: &str = include_str!("../../assets/sample_library.json");

/// A loaded collection plus the non-fatal problems found while loading it.
pub type Loaded = (Vec<LibraryEntry>, Vec<LibraryError>);

/// Where a collection comes from.
pub trait LibrarySource {
    /// Load the full collection.
    ///
    /// `Err` means nothing usable could be read; problems with individual
    /// entries are returned in the second tuple element instead.
    fn load(&self) -> Result<Loaded, LibraryError>;

    /// Short human-readable name for logs and status lines.
    fn describe(&self) -> String;
}

/// The embedded sample collection.
#[derive(Debug, Clone, Copy, Default)]
pub struct SampleLibrary;

impl LibrarySource for SampleLibrary {
    fn load(&self) -> Result<Loaded, LibraryError> {
        parse_library(SAMPLE_LIBRARY_JSON, Path::new("<sample>"))
    }

    fn describe(&self) -> String {
        "sample library".to_string()
    }
}

/// A collection stored as a JSON array on disk.
#[derive(Debug, Clone)]
pub struct JsonLibrary {
    pub path: PathBuf,
}

impl JsonLibrary {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl LibrarySource for JsonLibrary {
    /// A missing file is an empty collection, so a new library can be
    /// started with `--save`.
    fn load(&self) -> Result<Loaded, LibraryError> {
        let size = match fs::file_size(&self.path) {
            Ok(size) => size,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = %self.path.display(), "Library file not found; starting empty");
                return Ok((Vec::new(), Vec::new()));
            }
            Err(e) => {
                return Err(LibraryError::Io {
                    path: self.path.clone(),
                    source: e,
                })
            }
        };

        if size > constants::MAX_LIBRARY_FILE_SIZE {
            return Err(LibraryError::FileTooLarge {
                path: self.path.clone(),
                size,
                max_size: constants::MAX_LIBRARY_FILE_SIZE,
            });
        }

        let content = std::fs::read_to_string(&self.path).map_err(|e| LibraryError::Io {
            path: self.path.clone(),
            source: e,
        })?;

        parse_library(&content, &self.path)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Parse and validate a collection from JSON text.
///
/// Later entries reusing an id are dropped; entries past
/// `MAX_LIBRARY_ENTRIES` are truncated. Both are reported as errors in the
/// returned list.
pub fn parse_library(content: &str, path: &Path) -> Result<Loaded, LibraryError> {
    let parsed: Vec<LibraryEntry> =
        serde_json::from_str(content).map_err(|e| LibraryError::JsonParse {
            path: path.to_path_buf(),
            source: e,
        })?;

    let mut errors = Vec::new();
    let mut seen: HashSet<String> = HashSet::with_capacity(parsed.len());
    let mut entries = Vec::with_capacity(parsed.len());

    for entry in parsed {
        if !seen.insert(entry.id.clone()) {
            tracing::warn!(id = %entry.id, path = %path.display(), "Duplicate entry id, skipping");
            errors.push(LibraryError::DuplicateId { id: entry.id });
            continue;
        }
        entries.push(entry);
    }

    if entries.len() > constants::MAX_LIBRARY_ENTRIES {
        tracing::warn!(
            count = entries.len(),
            max = constants::MAX_LIBRARY_ENTRIES,
            "Too many library entries, truncating"
        );
        errors.push(LibraryError::TooManyEntries {
            count: entries.len(),
            max: constants::MAX_LIBRARY_ENTRIES,
        });
        entries.truncate(constants::MAX_LIBRARY_ENTRIES);
    }

    tracing::info!(
        path = %path.display(),
        entries = entries.len(),
        problems = errors.len(),
        "Library loaded"
    );

    Ok((entries, errors))
}

/// Write a collection to `path` as pretty JSON, atomically.
pub fn save_library(entries: &[LibraryEntry], path: &Path) -> Result<(), LibraryError> {
    let json = serde_json::to_string_pretty(entries).map_err(|e| LibraryError::JsonWrite {
        path: path.to_path_buf(),
        source: e,
    })?;

    fs::write_atomic(path, json.as_bytes()).map_err(|e| LibraryError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;

    tracing::info!(path = %path.display(), entries = entries.len(), "Library saved");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::{find_entry, Format, ReadingStatus};

    #[test]
    fn test_sample_library_loads_cleanly() {
        let (entries, errors) = SampleLibrary.load().unwrap();
        assert_eq!(entries.len(), 12);
        assert!(errors.is_empty());

        let drifter = find_entry(&entries, "2").unwrap();
        assert!(drifter.is_adult());
        assert_eq!(drifter.status, Some(ReadingStatus::PlanToRead));
        assert_eq!(drifter.format, Format::Zip);

        // Chapters are stored newest first.
        let sakura = find_entry(&entries, "1").unwrap();
        assert_eq!(sakura.chapters[0].number, 12);
        assert_eq!(sakura.unread_count(), 9);
    }

    #[test]
    fn test_duplicate_ids_are_skipped() {
        let json = r#"[
            {"id": "a", "title": "First", "format": "CBZ"},
            {"id": "a", "title": "Second", "format": "ZIP"},
            {"id": "b", "title": "Third", "format": "PDF"}
        ]"#;
        let (entries, errors) = parse_library(json, Path::new("dup.json")).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].title, "First");
        assert!(matches!(&errors[..], [LibraryError::DuplicateId { id }] if id == "a"));
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        let result = parse_library("{not json", Path::new("bad.json"));
        assert!(matches!(result, Err(LibraryError::JsonParse { .. })));
    }

    #[test]
    fn test_missing_file_is_empty_library() {
        let dir = tempfile::tempdir().unwrap();
        let source = JsonLibrary::new(dir.path().join("absent.json"));
        let (entries, errors) = source.load().unwrap();
        assert!(entries.is_empty());
        assert!(errors.is_empty());
    }

    #[test]
    fn test_oversized_file_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("huge.json");
        let file = std::fs::File::create(&path).unwrap();
        file.set_len(constants::MAX_LIBRARY_FILE_SIZE + 1).unwrap();
        let result = JsonLibrary::new(&path).load();
        assert!(matches!(result, Err(LibraryError::FileTooLarge { .. })));
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("library.json");
        let (entries, _) = SampleLibrary.load().unwrap();

        save_library(&entries, &path).unwrap();
        let (loaded, errors) = JsonLibrary::new(&path).load().unwrap();
        assert!(errors.is_empty());
        assert_eq!(loaded, entries);
    }
}
