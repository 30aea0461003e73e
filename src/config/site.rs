// Site description module
// Immutable per-process view of what is served and how

use std::path::{Path, PathBuf};

use super::types::Config;
use crate::error::{Result, ServeError};
use crate::http::{HeaderSet, MimeTable};

/// Everything a request handler needs to know about the served tree.
///
/// Built once at startup and shared by reference; never mutated afterwards.
#[derive(Debug, Clone)]
pub struct Site {
    root: PathBuf,
    pub mime: MimeTable,
    pub headers: HeaderSet,
    pub index_files: Vec<String>,
    pub directory_listing: bool,
}

impl Site {
    /// Site rooted at `root` with the default MIME table and header set
    pub fn new(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref();
        let root = root.canonicalize().map_err(|source| ServeError::Root {
            path: root.to_path_buf(),
            source,
        })?;
        if !root.is_dir() {
            return Err(ServeError::Root {
                source: std::io::Error::other("not a directory"),
                path: root,
            });
        }

        Ok(Self {
            root,
            mime: MimeTable::default(),
            headers: HeaderSet::cross_origin_isolation(),
            index_files: vec!["index.html".to_string(), "index.htm".to_string()],
            directory_listing: true,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let mut site = Self::new(config.root_dir())?;
        site.index_files.clone_from(&config.http.index_files);
        site.directory_listing = config.http.directory_listing;
        Ok(site)
    }

    /// Canonical, absolute root directory
    pub fn root(&self) -> &Path {
        &self.root
    }
}
