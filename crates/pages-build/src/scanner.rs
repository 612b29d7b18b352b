/// Source scanning: enumerate every regular file under the functions directory
use crate::error::BuildError;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// A regular file found under the scan root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Path on disk
    pub path: PathBuf,
    /// Path relative to the scan root, `/`-separated
    pub relative: String,
}

/// Walks `root` depth-first, entries sorted by file name
///
/// Symlinks are neither followed nor reported, so link cycles cannot occur.
/// Any unreadable entry aborts the scan.
pub fn scan(root: &Path) -> Result<Vec<SourceFile>, BuildError> {
    let mut files = Vec::new();

    for entry in WalkDir::new(root).follow_links(false).sort_by_file_name() {
        let entry = entry.map_err(|source| BuildError::Scan {
            path: source
                .path()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| root.to_path_buf()),
            source,
        })?;

        if !entry.file_type().is_file() {
            continue;
        }

        let relative = relative_url_path(root, entry.path());
        debug!("Found {}", relative);
        files.push(SourceFile {
            path: entry.into_path(),
            relative,
        });
    }

    Ok(files)
}

fn relative_url_path(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .components()
        .map(|component| component.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
