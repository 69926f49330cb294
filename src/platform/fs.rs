// MangaShelf - platform/fs.rs
//
// Filesystem helpers shared by the library store and exporters.

use std::io;
use std::path::Path;

/// Write `bytes` to `path` atomically: write a sibling temp file, then rename.
///
/// A crash between write and rename loses the new content but never
/// corrupts the previous file (rename is atomic on all supported platforms).
/// Missing parent directories are created.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let mut tmp_name = path.file_name().unwrap_or_default().to_os_string();
    tmp_name.push(".tmp");
    let tmp = path.with_file_name(tmp_name);

    std::fs::write(&tmp, bytes)?;
    if let Err(e) = std::fs::rename(&tmp, path) {
        // Best-effort cleanup; the original error is the one worth reporting.
        let _ = std::fs::remove_file(&tmp);
        return Err(e);
    }

    tracing::debug!(path = %path.display(), bytes = bytes.len(), "File written atomically");
    Ok(())
}

/// Size of the file at `path` in bytes.
pub fn file_size(path: &Path) -> io::Result<u64> {
    std::fs::metadata(path).map(|m| m.len())
}
