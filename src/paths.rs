// src/paths.rs

//! Path arithmetic relative to the watched root.
//!
//! Everything handed to the CVS client is relative to the root (the client
//! always runs with the root as its working directory), so the conversion
//! here is the single gate that keeps foreign paths away from it.

use std::fmt;
use std::path::{Component, Path, PathBuf};

/// A path under the watched root, with its root-relative form precomputed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TrackedPath {
    absolute: PathBuf,
    relative: String,
}

impl TrackedPath {
    /// Returns `None` unless `path` lies strictly below `root`.
    pub fn new(root: &Path, path: &Path) -> Option<Self> {
        let relative = relative_str(root, path)?;
        Some(Self {
            absolute: path.to_path_buf(),
            relative,
        })
    }

    pub fn absolute(&self) -> &Path {
        &self.absolute
    }

    /// Path relative to the watched root with forward slashes, never empty.
    pub fn relative(&self) -> &str {
        &self.relative
    }
}

impl fmt::Display for TrackedPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.absolute.display())
    }
}

/// Convert `path` into a string relative to `root`, with forward slashes.
///
/// Returns `None` if `path` is not below `root` or *is* `root`: the root
/// itself is never a valid operand. Any `..` (or other non-name component)
/// after the root also yields `None`, since it may point outside the tree.
pub fn relative_str(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    if !rel.components().all(|c| matches!(c, Component::Normal(_))) {
        return None;
    }
    let s = rel.to_string_lossy().replace('\\', "/");
    let s = s.trim_end_matches('/');
    if s.is_empty() {
        return None;
    }
    Some(s.to_string())
}

/// Directories between `root` (exclusive) and `path` (exclusive), root-first.
///
/// For `/etc/a/b/c` under `/etc` this is `[/etc/a, /etc/a/b]`. A path that is
/// not below `root` has no ancestors to track.
pub fn ancestor_dirs(root: &Path, path: &Path) -> Vec<PathBuf> {
    if relative_str(root, path).is_none() {
        return Vec::new();
    }

    let mut dirs: Vec<PathBuf> = path
        .ancestors()
        .skip(1)
        .take_while(|dir| *dir != root)
        .map(Path::to_path_buf)
        .collect();
    dirs.reverse();
    dirs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_paths_under_root() {
        let root = Path::new("/etc");
        assert_eq!(
            relative_str(root, Path::new("/etc/ssh/sshd_config")).as_deref(),
            Some("ssh/sshd_config")
        );
        assert_eq!(relative_str(root, Path::new("/etc")), None);
        assert_eq!(relative_str(root, Path::new("/etcetera/x")), None);
        assert_eq!(relative_str(root, Path::new("/var/etc/x")), None);
    }

    #[test]
    fn parent_components_never_resolve_below_root() {
        let root = Path::new("/etc");
        let escaping = Path::new("/etc/../root/.ssh/authorized_keys");
        assert_eq!(relative_str(root, escaping), None);
        assert_eq!(relative_str(root, Path::new("/etc/ssh/../../x")), None);
        assert!(ancestor_dirs(root, escaping).is_empty());
        assert!(TrackedPath::new(root, escaping).is_none());
    }

    #[test]
    fn ancestors_are_root_first() {
        let dirs = ancestor_dirs(Path::new("/etc"), Path::new("/etc/a/b/c"));
        assert_eq!(dirs, vec![PathBuf::from("/etc/a"), PathBuf::from("/etc/a/b")]);
    }

    #[test]
    fn file_directly_under_root_has_no_ancestors() {
        assert!(ancestor_dirs(Path::new("/etc"), Path::new("/etc/hosts")).is_empty());
        assert!(ancestor_dirs(Path::new("/etc"), Path::new("/usr/x/y")).is_empty());
    }

    #[test]
    fn tracked_path_rejects_root_itself() {
        assert!(TrackedPath::new(Path::new("/etc"), Path::new("/etc")).is_none());
        let p = TrackedPath::new(Path::new("/etc"), Path::new("/etc/foo.conf")).unwrap();
        assert_eq!(p.relative(), "foo.conf");
        assert_eq!(p.to_string(), "/etc/foo.conf");
    }
}
