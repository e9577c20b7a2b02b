// src/config/model.rs

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::filter::ExcludeSet;

/// Top-level configuration as read from a TOML file.
///
/// ```toml
/// [keeper]
/// root = "/etc"
/// exclude = ["/etc/mtab", "/etc/ldap.secret"]
/// updated_resources = false
///
/// [cvs]
/// binary = "cvs"
/// umask = "077"
/// cvswrapper = "/var/cache/chef/cvswrapper"
/// ```
///
/// All sections are optional and have reasonable defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawConfigFile {
    /// What to track and how to describe it, from `[keeper]`.
    #[serde(default)]
    pub keeper: KeeperSection,

    /// How to invoke the CVS client, from `[cvs]`.
    #[serde(default)]
    pub cvs: CvsSection,
}

/// Validated configuration.
///
/// Constructed through `TryFrom<RawConfigFile>` (see `validate.rs`), which
/// compiles the exclusion globs and parses the umask once up front.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    keeper: KeeperSection,
    cvs: CvsSection,
    exclude: ExcludeSet,
    umask: u32,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(
        keeper: KeeperSection,
        cvs: CvsSection,
        exclude: ExcludeSet,
        umask: u32,
    ) -> Self {
        Self {
            keeper,
            cvs,
            exclude,
            umask,
        }
    }

    pub fn keeper(&self) -> &KeeperSection {
        &self.keeper
    }

    pub fn cvs(&self) -> &CvsSection {
        &self.cvs
    }

    /// Watched root, e.g. `/etc`.
    pub fn root(&self) -> &Path {
        &self.keeper.root
    }

    /// Compiled `[keeper].exclude` patterns.
    pub fn exclude(&self) -> &ExcludeSet {
        &self.exclude
    }

    /// Parsed `[cvs].umask`.
    pub fn umask(&self) -> u32 {
        self.umask
    }
}

/// `[keeper]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct KeeperSection {
    /// Directory tree kept under version control.
    #[serde(default = "default_root")]
    pub root: PathBuf,

    /// Shell-style globs matched against full paths; matches are never tracked.
    #[serde(default = "default_exclude")]
    pub exclude: Vec<String>,

    /// Append the list of updated resources to `after` commit messages.
    #[serde(default)]
    pub updated_resources: bool,

    /// Environment variable naming the human behind a privilege escalation.
    #[serde(default = "default_acting_user_env")]
    pub acting_user_env: String,
}

fn default_root() -> PathBuf {
    PathBuf::from("/etc")
}

fn default_exclude() -> Vec<String> {
    vec!["/etc/mtab".to_string(), "/etc/ldap.secret".to_string()]
}

fn default_acting_user_env() -> String {
    "SUDO_USER".to_string()
}

impl Default for KeeperSection {
    fn default() -> Self {
        Self {
            root: default_root(),
            exclude: default_exclude(),
            updated_resources: false,
            acting_user_env: default_acting_user_env(),
        }
    }
}

/// `[cvs]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct CvsSection {
    /// CVS client executable.
    #[serde(default = "default_binary")]
    pub binary: String,

    /// Octal file-creation mask applied while the client runs.
    #[serde(default = "default_umask")]
    pub umask: String,

    /// Optional `CVS_RSH` wrapper script; only used if it exists.
    #[serde(default)]
    pub cvswrapper: Option<PathBuf>,
}

fn default_binary() -> String {
    "cvs".to_string()
}

fn default_umask() -> String {
    "077".to_string()
}

impl Default for CvsSection {
    fn default() -> Self {
        Self {
            binary: default_binary(),
            umask: default_umask(),
            cvswrapper: None,
        }
    }
}
