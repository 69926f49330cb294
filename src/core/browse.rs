// MangaShelf - core/browse.rs
//
// File-system browsing and media import.
//
// Architecture note: this module uses `walkdir` for directory traversal as an
// OS abstraction (similar to using std::path::Path). It reads only file
// *metadata* (size, kind), never file contents; archives are catalogued, not
// opened.
//
// Resource bounds:
//   - Per-entry I/O errors are non-fatal and collected as warnings.
//   - max_items and max_depth are clamped to named-constant upper bounds.
//   - Exclude patterns short-circuit directory descent via filter_entry.

use crate::core::model::{Format, LibraryEntry};
use crate::core::selection::Selection;
use crate::util::constants;
use crate::util::error::BrowseError;
use chrono::NaiveDate;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

// =============================================================================
// Types
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ItemKind {
    Folder,
    File,
}

/// One row of a directory listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowseItem {
    /// Stable identifier: the full path as text.
    pub id: String,
    /// File or folder name.
    pub name: String,
    pub kind: ItemKind,
    /// Size label ("12 KB", or "Folder" for directories).
    pub size_label: String,
    pub size: u64,
    pub path: PathBuf,
}

impl BrowseItem {
    /// Archive format for files, FOLDER for directories, `None` for anything
    /// that is not a comic container.
    pub fn media_format(&self) -> Option<Format> {
        match self.kind {
            ItemKind::Folder => Some(Format::Folder),
            ItemKind::File => self
                .path
                .extension()
                .and_then(|e| e.to_str())
                .and_then(Format::from_extension),
        }
    }
}

/// Batch actions offered by the browser while selection mode is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrowseAction {
    /// Add the selected items to the library.
    Import,
    /// Search the selected folders for comic archives.
    Scan,
}

/// Limits and patterns for listings and scans.
#[derive(Debug, Clone)]
pub struct BrowseConfig {
    /// Maximum recursion depth for media scans.
    pub max_depth: usize,

    /// Maximum number of items returned.
    pub max_items: usize,

    /// Filename globs a scanned file must match.
    pub include_patterns: Vec<String>,

    /// Globs matched against filenames and directory names; matching
    /// directories are not descended into.
    pub exclude_patterns: Vec<String>,
}

impl Default for BrowseConfig {
    fn default() -> Self {
        Self {
            max_depth: constants::DEFAULT_BROWSE_MAX_DEPTH,
            max_items: constants::DEFAULT_BROWSE_MAX_ITEMS,
            include_patterns: constants::MEDIA_INCLUDE_PATTERNS
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
            exclude_patterns: constants::MEDIA_EXCLUDE_PATTERNS
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
        }
    }
}

// =============================================================================
// Listing
// =============================================================================

/// Check that `root` exists and is a directory.
fn check_root(root: &Path) -> Result<(), BrowseError> {
    match std::fs::metadata(root) {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(BrowseError::NotADirectory {
            path: root.to_path_buf(),
        }),
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            Err(BrowseError::PermissionDenied {
                path: root.to_path_buf(),
                source: e,
            })
        }
        Err(_) => Err(BrowseError::RootNotFound {
            path: root.to_path_buf(),
        }),
    }
}

/// Unreadable entries are skipped; the walk carries on.
fn traversal_warning(root: &Path, e: walkdir::Error) -> String {
    let path = e.path().unwrap_or(root).to_path_buf();
    BrowseError::Traversal { path, source: e }.to_string()
}

/// List the immediate children of `root`: folders first, then files, each
/// group in case-insensitive name order.
///
/// Returns the items plus non-fatal warnings (unreadable entries, truncation).
pub fn list_directory(
    root: &Path,
    config: &BrowseConfig,
) -> Result<(Vec<BrowseItem>, Vec<String>), BrowseError> {
    check_root(root)?;

    let exclude_pats = compile_patterns(&config.exclude_patterns, "exclude");
    let max_items = config.max_items.min(constants::ABSOLUTE_MAX_BROWSE_ITEMS);
    let mut items = Vec::new();
    let mut warnings = Vec::new();

    for entry_result in walkdir::WalkDir::new(root)
        .min_depth(1)
        .max_depth(1)
        .follow_links(false)
    {
        let entry = match entry_result {
            Ok(e) => e,
            Err(e) => {
                warnings.push(traversal_warning(root, e));
                continue;
            }
        };

        let Some(name) = entry.file_name().to_str() else {
            warnings.push(format!(
                "Skipping '{}': non-UTF-8 name",
                entry.path().display()
            ));
            continue;
        };
        if exclude_pats.iter().any(|p| p.matches(name)) {
            continue;
        }

        let item = if entry.file_type().is_dir() {
            BrowseItem {
                id: entry.path().display().to_string(),
                name: name.to_string(),
                kind: ItemKind::Folder,
                size_label: "Folder".to_string(),
                size: 0,
                path: entry.path().to_path_buf(),
            }
        } else {
            let size = match entry.metadata() {
                Ok(m) => m.len(),
                Err(e) => {
                    warnings.push(format!(
                        "Cannot read metadata for '{}': {e}",
                        entry.path().display()
                    ));
                    0
                }
            };
            file_item(entry.path(), name, size)
        };
        items.push(item);
    }

    items.sort_by(|a, b| {
        a.kind
            .cmp(&b.kind)
            .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
    });

    if items.len() > max_items {
        warnings.push(format!(
            "'{}' holds {} items; only the first {max_items} are listed.",
            root.display(),
            items.len()
        ));
        items.truncate(max_items);
    }

    tracing::debug!(
        root = %root.display(),
        items = items.len(),
        warnings = warnings.len(),
        "Directory listed"
    );

    Ok((items, warnings))
}

fn file_item(path: &Path, name: &str, size: u64) -> BrowseItem {
    BrowseItem {
        id: path.display().to_string(),
        name: name.to_string(),
        kind: ItemKind::File,
        size_label: format_size(size),
        size,
        path: path.to_path_buf(),
    }
}

// =============================================================================
// Media scan
// =============================================================================

/// Recursively find comic archives under `root`.
///
/// Returns `Err` only if the root itself is invalid; unreadable entries are
/// reported as warnings.
pub fn scan_for_media(
    root: &Path,
    config: &BrowseConfig,
) -> Result<(Vec<BrowseItem>, Vec<String>), BrowseError> {
    check_root(root)?;

    let max_depth = config.max_depth.min(constants::ABSOLUTE_MAX_BROWSE_DEPTH);
    let max_items = config.max_items.min(constants::ABSOLUTE_MAX_BROWSE_ITEMS);
    let include_pats = compile_patterns(&config.include_patterns, "include");
    let exclude_pats = compile_patterns(&config.exclude_patterns, "exclude");

    tracing::debug!(root = %root.display(), max_depth, max_items, "Media scan starting");

    let mut found = Vec::new();
    let mut warnings = Vec::new();

    let walker = walkdir::WalkDir::new(root)
        .max_depth(max_depth)
        .follow_links(false)
        .into_iter()
        .filter_entry(|e| {
            if e.depth() == 0 || !e.file_type().is_dir() {
                return true;
            }
            let name = e.file_name().to_str().unwrap_or("");
            !is_excluded_component(name, &exclude_pats)
        });

    for entry_result in walker {
        let entry = match entry_result {
            Ok(e) => e,
            Err(e) => {
                let msg = traversal_warning(root, e);
                tracing::debug!(warning = %msg, "Scan warning");
                warnings.push(msg);
                continue;
            }
        };

        if entry.file_type().is_dir() {
            continue;
        }

        let Some(name) = entry.file_name().to_str() else {
            warnings.push(format!(
                "Skipping '{}': non-UTF-8 filename",
                entry.path().display()
            ));
            continue;
        };

        if exclude_pats.iter().any(|p| p.matches(name)) {
            continue;
        }
        if !include_pats.is_empty() && !include_pats.iter().any(|p| p.matches(name)) {
            continue;
        }

        if found.len() >= max_items {
            warnings.push(format!(
                "Scan stopped after {max_items} archives. Raise [browse] max_items to see more."
            ));
            break;
        }

        let size = entry.metadata().map(|m| m.len()).unwrap_or(0);
        found.push(file_item(entry.path(), name, size));
    }

    tracing::info!(
        root = %root.display(),
        found = found.len(),
        warnings = warnings.len(),
        "Media scan complete"
    );

    Ok((found, warnings))
}

/// Total size of the files under `dir`, bounded by the scan depth limit.
/// Unreadable entries count as zero.
pub fn dir_size(dir: &Path) -> u64 {
    walkdir::WalkDir::new(dir)
        .max_depth(constants::ABSOLUTE_MAX_BROWSE_DEPTH)
        .follow_links(false)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .filter_map(|e| e.metadata().ok())
        .map(|m| m.len())
        .sum()
}

// =============================================================================
// Import
// =============================================================================

/// Items of `items` whose ids are in `selection`, in listing order.
pub fn selected_items<'a>(items: &'a [BrowseItem], selection: &Selection) -> Vec<&'a BrowseItem> {
    items.iter().filter(|i| selection.contains(&i.id)).collect()
}

/// Turn browse items into new library entries. Items that are not comic
/// containers are skipped with a warning.
pub fn import_items(items: &[&BrowseItem], today: NaiveDate) -> (Vec<LibraryEntry>, Vec<String>) {
    let mut entries = Vec::new();
    let mut warnings = Vec::new();

    for item in items {
        let Some(format) = item.media_format() else {
            warnings.push(format!("'{}' is not a comic archive or folder; skipped", item.name));
            continue;
        };

        let title = match item.kind {
            ItemKind::Folder => item.name.clone(),
            ItemKind::File => item
                .path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or(&item.name)
                .to_string(),
        };
        let size = match item.kind {
            ItemKind::Folder => dir_size(&item.path),
            ItemKind::File => item.size,
        };

        let mut entry = LibraryEntry::new(item.id.clone(), title, format);
        entry.path = item.path.display().to_string();
        entry.file_size = format_size(size);
        entry.date_added = Some(today);
        entries.push(entry);
    }

    tracing::debug!(imported = entries.len(), skipped = warnings.len(), "Items imported");
    (entries, warnings)
}

/// Append imported entries whose ids are not already in the collection.
/// Returns the new collection and how many entries were added.
pub fn merge_imported(
    library: &[LibraryEntry],
    imported: Vec<LibraryEntry>,
) -> (Vec<LibraryEntry>, usize) {
    let mut known: HashSet<String> = library.iter().map(|e| e.id.clone()).collect();
    let mut merged = library.to_vec();
    let mut added = 0;
    for entry in imported {
        if known.insert(entry.id.clone()) {
            merged.push(entry);
            added += 1;
        } else {
            tracing::debug!(id = %entry.id, "Already in library; import skipped");
        }
    }
    (merged, added)
}

/// Human-readable size label: "512 B", "12 KB", "850 MB", "1.2 GB".
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];
    if bytes < 1024 {
        return format!("{bytes} B");
    }
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if value >= 10.0 {
        format!("{:.0} {}", value, UNITS[unit])
    } else {
        let label = format!("{value:.1}");
        let label = label.strip_suffix(".0").unwrap_or(&label);
        format!("{label} {}", UNITS[unit])
    }
}

// =============================================================================
// Glob helpers
// =============================================================================

/// Compile glob pattern strings; invalid patterns are logged and skipped.
fn compile_patterns(patterns: &[String], kind: &str) -> Vec<glob::Pattern> {
    patterns
        .iter()
        .filter_map(|p| match glob::Pattern::new(p) {
            Ok(compiled) => Some(compiled),
            Err(e) => {
                tracing::warn!(pattern = p, kind, error = %e, "Invalid glob pattern, skipping");
                None
            }
        })
        .collect()
}

/// Literal (wildcard-free) exclude patterns name directories to skip.
fn is_excluded_component(dir_name: &str, exclude_pats: &[glob::Pattern]) -> bool {
    exclude_pats.iter().any(|p| {
        let s = p.as_str();
        !s.contains('*') && !s.contains('?') && !s.contains('[') && p.matches(dir_name)
    })
}
