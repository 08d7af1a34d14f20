//! Header discovery under the configured root directories.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::config::{ExtractConfig, HeaderOrder};
use crate::lower::scope::normalize_path;

/// Collect every header under the configured roots.
///
/// Paths are absolute and lexically normalized. Hidden directories are skipped. With
/// [`HeaderOrder::Sorted`] the result is sorted and free of duplicates, which keeps the synthetic unit (and so
/// node order) stable across runs.
pub fn collect_headers(config: &ExtractConfig) -> Vec<PathBuf> {
    let mut headers = Vec::new();
    for root in &config.roots {
        let root = PathBuf::from(normalize_path(&root.to_string_lossy()));
        if !root.is_dir() {
            warn!(root = %root.display(), "root is not a directory, skipping");
            continue;
        }
        discover_headers(&root, &config.header_extensions, &mut headers);
    }
    if config.header_order == HeaderOrder::Sorted {
        headers.sort();
        headers.dedup();
    }
    debug!(count = headers.len(), "discovered headers");
    headers
}

fn discover_headers(dir: &Path, extensions: &[String], out: &mut Vec<PathBuf>) {
    let Ok(entries) = fs::read_dir(dir) else {
        warn!(dir = %dir.display(), "cannot read directory");
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        // Symlinked directories are not followed, so link cycles cannot recurse forever.
        let is_dir = entry.file_type().is_ok_and(|t| t.is_dir());
        if is_dir {
            let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
            if !name.starts_with('.') {
                discover_headers(&path, extensions, out);
            }
        } else if is_header(&path, extensions) {
            out.push(path);
        }
    }
}

fn is_header(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| extensions.iter().any(|h| h.eq_ignore_ascii_case(ext)))
}
