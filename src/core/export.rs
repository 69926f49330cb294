// MangaShelf - core/export.rs
//
// CSV and JSON export of library entries (usually the filtered, sorted view).
// Core layer: writes to any Write trait object.

use crate::core::model::LibraryEntry;
use crate::util::error::ExportError;
use std::io::Write;
use std::path::Path;

/// Export entries to CSV, one row per entry.
///
/// Writes: id, title, format, status, rating, date_added, chapters, unread,
/// file_size, path
pub fn export_csv<W: Write>(
    entries: &[&LibraryEntry],
    writer: W,
    export_path: &Path,
) -> Result<usize, ExportError> {
    let csv_err = |e: csv::Error| ExportError::Csv {
        path: export_path.to_path_buf(),
        source: e,
    };
    let mut csv_writer = csv::Writer::from_writer(writer);

    csv_writer
        .write_record([
            "id",
            "title",
            "format",
            "status",
            "rating",
            "date_added",
            "chapters",
            "unread",
            "file_size",
            "path",
        ])
        .map_err(csv_err)?;

    let mut count = 0;
    for entry in entries {
        let added = entry
            .date_added
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default();

        csv_writer
            .write_record([
                entry.id.as_str(),
                entry.title.as_str(),
                entry.format.label(),
                entry.status.map(|s| s.label()).unwrap_or(""),
                &entry.rating.to_string(),
                &added,
                &entry.chapter_count().to_string(),
                &entry.unread_count().to_string(),
                entry.file_size.as_str(),
                entry.path.as_str(),
            ])
            .map_err(csv_err)?;
        count += 1;
    }

    csv_writer.flush().map_err(|e| ExportError::Io {
        path: export_path.to_path_buf(),
        source: e,
    })?;

    tracing::debug!(path = %export_path.display(), rows = count, "CSV export written");
    Ok(count)
}

/// Export entries to JSON (pretty-printed array in library file layout).
pub fn export_json<W: Write>(
    entries: &[&LibraryEntry],
    writer: W,
    export_path: &Path,
) -> Result<usize, ExportError> {
    serde_json::to_writer_pretty(writer, entries).map_err(|e| ExportError::Json {
        path: export_path.to_path_buf(),
        source: e,
    })?;
    tracing::debug!(path = %export_path.display(), entries = entries.len(), "JSON export written");
    Ok(entries.len())
}
