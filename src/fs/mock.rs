// src/fs/mock.rs

use super::FileSystem;
use anyhow::{anyhow, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone)]
pub enum MockEntry {
    File(String),
    Dir,
    Symlink(PathBuf),
}

/// In-memory filesystem keyed by absolute path.
///
/// Clones share the same tree, so a test can hand one clone to the engine
/// and keep mutating the other (e.g. to simulate the CVS client rewriting
/// `CVS/Entries`).
#[derive(Debug, Clone, Default)]
pub struct MockFileSystem {
    entries: Arc<Mutex<HashMap<PathBuf, MockEntry>>>,
}

impl MockFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create or overwrite a file, creating parent directories implicitly.
    pub fn add_file(&self, path: impl AsRef<Path>, content: impl Into<String>) {
        let path = path.as_ref();
        let mut entries = self.entries.lock().unwrap();
        Self::ensure_parents(&mut entries, path);
        entries.insert(path.to_path_buf(), MockEntry::File(content.into()));
    }

    /// Create a directory (and its parents).
    pub fn add_dir(&self, path: impl AsRef<Path>) {
        let path = path.as_ref();
        let mut entries = self.entries.lock().unwrap();
        Self::ensure_parents(&mut entries, path);
        entries.insert(path.to_path_buf(), MockEntry::Dir);
    }

    /// Create a symlink at `path` pointing to `target`.
    pub fn add_symlink(&self, path: impl AsRef<Path>, target: impl AsRef<Path>) {
        let path = path.as_ref();
        let mut entries = self.entries.lock().unwrap();
        Self::ensure_parents(&mut entries, path);
        entries.insert(
            path.to_path_buf(),
            MockEntry::Symlink(target.as_ref().to_path_buf()),
        );
    }

    /// Append one line to a file, creating it if needed.
    pub fn append_line(&self, path: impl AsRef<Path>, line: &str) {
        let path = path.as_ref();
        let mut entries = self.entries.lock().unwrap();
        Self::ensure_parents(&mut entries, path);
        let mut content = match entries.get(path) {
            Some(MockEntry::File(existing)) => existing.clone(),
            _ => String::new(),
        };
        content.push_str(line);
        content.push('\n');
        entries.insert(path.to_path_buf(), MockEntry::File(content));
    }

    /// Remove a single entry (children are left alone).
    pub fn remove(&self, path: impl AsRef<Path>) {
        self.entries.lock().unwrap().remove(path.as_ref());
    }

    fn ensure_parents(entries: &mut HashMap<PathBuf, MockEntry>, path: &Path) {
        for ancestor in path.ancestors().skip(1) {
            if ancestor.as_os_str().is_empty() {
                break;
            }
            entries
                .entry(ancestor.to_path_buf())
                .or_insert(MockEntry::Dir);
        }
    }

    /// Follow symlinks (bounded, to survive loops) and return the final entry.
    fn resolve(&self, path: &Path) -> Option<MockEntry> {
        let entries = self.entries.lock().unwrap();
        let mut current = path.to_path_buf();
        for _ in 0..8 {
            match entries.get(&current)? {
                MockEntry::Symlink(target) => current = target.clone(),
                other => return Some(other.clone()),
            }
        }
        None
    }
}

impl FileSystem for MockFileSystem {
    fn read_to_string(&self, path: &Path) -> Result<String> {
        match self.resolve(path) {
            Some(MockEntry::File(content)) => Ok(content),
            Some(_) => Err(anyhow!("Is a directory: {:?}", path)),
            None => Err(anyhow!("File not found: {:?}", path)),
        }
    }

    fn exists(&self, path: &Path) -> bool {
        self.resolve(path).is_some()
    }

    fn is_dir(&self, path: &Path) -> bool {
        matches!(self.resolve(path), Some(MockEntry::Dir))
    }

    fn is_symlink(&self, path: &Path) -> bool {
        let entries = self.entries.lock().unwrap();
        matches!(entries.get(path), Some(MockEntry::Symlink(_)))
    }
}
