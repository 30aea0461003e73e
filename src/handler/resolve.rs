//! URL path resolution module
//!
//! Maps a request path onto the filesystem without ever leaving the root.

use std::path::{Component, Path, PathBuf};

use percent_encoding::percent_decode_str;
use tokio::fs;

use crate::error::{Result, ServeError};
use crate::logger;

/// Turn a URL path into a relative filesystem path.
///
/// Segments are percent-decoded. Empty and `.` segments are skipped, `..`
/// removes the previous segment, and climbing above the root is refused.
pub fn relative_path(url_path: &str) -> Result<PathBuf> {
    let mut segments: Vec<String> = Vec::new();

    for raw in url_path.split('/') {
        let decoded = percent_decode_str(raw)
            .decode_utf8()
            .map_err(|_| ServeError::NotFound)?;

        match decoded.as_ref() {
            "" | "." => {}
            ".." => {
                if segments.pop().is_none() {
                    return Err(ServeError::NotFound);
                }
            }
            segment => {
                if !is_plain_segment(segment) {
                    return Err(ServeError::NotFound);
                }
                segments.push(segment.to_string());
            }
        }
    }

    Ok(segments.iter().collect())
}

/// A segment must name exactly one normal path component
fn is_plain_segment(segment: &str) -> bool {
    if segment.contains(['/', '\\', '\0']) {
        return false;
    }
    let mut components = Path::new(segment).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

/// Canonicalize `path` and require it to stay under `root`.
///
/// `root` must already be canonical. Symlinks pointing outside the root
/// are treated as missing.
pub async fn confine(root: &Path, path: &Path) -> Result<PathBuf> {
    let canonical = fs::canonicalize(path)
        .await
        .map_err(|_| ServeError::NotFound)?;

    if !canonical.starts_with(root) {
        logger::log_warning(&format!(
            "Path escape blocked: {} -> {}",
            path.display(),
            canonical.display()
        ));
        return Err(ServeError::NotFound);
    }
    Ok(canonical)
}

/// Resolve a request path to an existing filesystem path under `root`
pub async fn resolve(root: &Path, url_path: &str) -> Result<PathBuf> {
    let relative = relative_path(url_path)?;
    confine(root, &root.join(relative)).await
}
