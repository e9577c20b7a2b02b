#![allow(dead_code)]

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use cvskeeper::config::{ConfigFile, RawConfigFile};
use cvskeeper::filter::{ActionTag, ResourceRecord};

/// Builder for `ConfigFile` to simplify test setup.
///
/// Starts from the built-in defaults but with an empty exclude list.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        let mut config = RawConfigFile::default();
        config.keeper.exclude.clear();
        Self { config }
    }

    pub fn root(mut self, root: &str) -> Self {
        self.config.keeper.root = PathBuf::from(root);
        self
    }

    pub fn exclude(mut self, pattern: &str) -> Self {
        self.config.keeper.exclude.push(pattern.to_string());
        self
    }

    pub fn updated_resources(mut self, val: bool) -> Self {
        self.config.keeper.updated_resources = val;
        self
    }

    pub fn binary(mut self, binary: &str) -> Self {
        self.config.cvs.binary = binary.to_string();
        self
    }

    pub fn cvswrapper(mut self, path: &str) -> Self {
        self.config.cvs.cvswrapper = Some(PathBuf::from(path));
        self
    }

    pub fn umask(mut self, umask: &str) -> Self {
        self.config.cvs.umask = umask.to_string();
        self
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// In-memory stand-in for a run-engine resource.
#[derive(Debug, Clone)]
pub struct FakeResource {
    name: String,
    path: Option<PathBuf>,
    action: ActionTag,
    updated: bool,
    skip: bool,
    skip_checks: Arc<AtomicUsize>,
}

impl FakeResource {
    /// A `file[...]` resource with action `create`, not updated.
    pub fn file(path: &str) -> Self {
        Self {
            name: format!("file[{path}]"),
            path: Some(PathBuf::from(path)),
            action: ActionTag::name("create"),
            updated: false,
            skip: false,
            skip_checks: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// A resource without a path, e.g. `service[sshd]`.
    pub fn pathless(name: &str) -> Self {
        Self {
            name: name.to_string(),
            path: None,
            ..Self::file("/")
        }
    }

    pub fn named(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    pub fn action(mut self, action: ActionTag) -> Self {
        self.action = action;
        self
    }

    pub fn updated(mut self, val: bool) -> Self {
        self.updated = val;
        self
    }

    pub fn skipped(mut self) -> Self {
        self.skip = true;
        self
    }

    /// How many times the skip predicate was consulted.
    pub fn skip_checks(&self) -> usize {
        self.skip_checks.load(Ordering::SeqCst)
    }
}

impl fmt::Display for FakeResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl ResourceRecord for FakeResource {
    fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn action(&self) -> &ActionTag {
        &self.action
    }

    fn updated(&self) -> bool {
        self.updated
    }

    fn should_skip(&self, _action: &ActionTag) -> bool {
        self.skip_checks.fetch_add(1, Ordering::SeqCst);
        self.skip
    }
}
