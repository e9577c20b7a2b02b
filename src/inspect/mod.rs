// src/inspect/mod.rs

//! Read-only queries against the CVS metadata on disk.

pub mod entries;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::trace;

use crate::fs::FileSystem;
use entries::EntryKind;

/// Name of the per-directory metadata directory.
pub const METADATA_DIR: &str = "CVS";
/// File inside [`METADATA_DIR`] listing the directory's tracked entries.
pub const ENTRIES_FILE: &str = "Entries";

/// Answers "is this path already under CVS?" from `CVS/Entries` files.
///
/// Never errors: missing or unreadable metadata means "not tracked".
#[derive(Debug, Clone)]
pub struct RepositoryInspector {
    fs: Arc<dyn FileSystem>,
    root: PathBuf,
}

impl RepositoryInspector {
    pub fn new(fs: Arc<dyn FileSystem>, root: impl Into<PathBuf>) -> Self {
        Self {
            fs,
            root: root.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Whether the watched root is a CVS checkout at all.
    pub fn is_repository(&self) -> bool {
        self.has_metadata(&self.root)
    }

    /// Whether `dir` already carries its own `CVS/` directory.
    pub fn has_metadata(&self, dir: &Path) -> bool {
        self.fs.is_dir(&dir.join(METADATA_DIR))
    }

    /// Whether `path` has an entry of the right kind in its parent's
    /// `CVS/Entries`.
    pub fn is_tracked(&self, path: &Path) -> bool {
        let (Some(dir), Some(name)) = (path.parent(), path.file_name()) else {
            return false;
        };
        if !self.has_metadata(dir) {
            return false;
        }

        let entries_path = dir.join(METADATA_DIR).join(ENTRIES_FILE);
        let contents = match self.fs.read_to_string(&entries_path) {
            Ok(contents) => contents,
            Err(err) => {
                trace!(path = %entries_path.display(), error = %err, "entries unreadable; treating as untracked");
                return false;
            }
        };

        let kind = if self.fs.is_dir(path) {
            EntryKind::Directory
        } else {
            EntryKind::File
        };
        entries::contains(&contents, &name.to_string_lossy(), kind)
    }
}
