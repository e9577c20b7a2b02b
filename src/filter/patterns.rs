// src/filter/patterns.rs

use std::fmt;
use std::path::Path;

use anyhow::{Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};

/// Compiled exclusion globs.
///
/// Patterns are shell-style and matched against the *full* path, e.g.
/// `/etc/*.secret`. As with `fnmatch` without `FNM_PATHNAME`, `*` may cross
/// directory separators.
#[derive(Clone)]
pub struct ExcludeSet {
    patterns: Vec<String>,
    set: GlobSet,
}

impl fmt::Debug for ExcludeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExcludeSet")
            .field("patterns", &self.patterns)
            .finish_non_exhaustive()
    }
}

impl Default for ExcludeSet {
    fn default() -> Self {
        Self {
            patterns: Vec::new(),
            set: GlobSet::empty(),
        }
    }
}

impl ExcludeSet {
    pub fn new(patterns: &[String]) -> Result<Self> {
        Ok(Self {
            patterns: patterns.to_vec(),
            set: build_globset(patterns)?,
        })
    }

    pub fn is_match(&self, path: &str) -> bool {
        self.set.is_match(path)
    }

    pub fn is_match_path(&self, path: &Path) -> bool {
        self.is_match(&path.to_string_lossy())
    }
}

/// Build a GlobSet from simple string patterns.
fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pat in patterns {
        let glob = Glob::new(pat).with_context(|| format!("invalid glob pattern: {pat}"))?;
        builder.add(glob);
    }
    Ok(builder.build()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(patterns: &[&str]) -> ExcludeSet {
        let owned: Vec<String> = patterns.iter().map(|s| s.to_string()).collect();
        ExcludeSet::new(&owned).unwrap()
    }

    #[test]
    fn literal_and_wildcard_patterns() {
        let ex = set(&["/etc/mtab", "/etc/*.secret"]);
        assert!(ex.is_match("/etc/mtab"));
        assert!(ex.is_match("/etc/ldap.secret"));
        assert!(!ex.is_match("/etc/mtab.conf"));
        assert!(!ex.is_match("/etc/hosts"));
    }

    #[test]
    fn star_crosses_directories() {
        let ex = set(&["/etc/*.secret"]);
        assert!(ex.is_match("/etc/ssl/private/key.secret"));
    }

    #[test]
    fn empty_set_matches_nothing() {
        assert!(!ExcludeSet::default().is_match("/etc/hosts"));
    }
}
