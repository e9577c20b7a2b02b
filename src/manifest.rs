// src/manifest.rs

//! File-based description of one configuration run, for `cvskeeper replay`.
//!
//! ```toml
//! [run]
//! node = "web01"
//!
//! [[resource]]
//! name = "template[/etc/motd]"
//! path = "/etc/motd"
//! action = "create"
//! updated = true
//! ```

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::info;

use crate::errors::{KeeperError, Result};
use crate::filter::{ActionTag, ResourceRecord};
use crate::handler::RunIdentity;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RunManifest {
    #[serde(default)]
    pub run: RunSection,

    #[serde(default, rename = "resource")]
    pub resources: Vec<ManifestResource>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RunSection {
    #[serde(default)]
    pub node: Option<String>,
}

/// One resource as recorded by the run engine.
#[derive(Debug, Clone, Deserialize)]
pub struct ManifestResource {
    /// Display name, e.g. `template[/etc/motd]`.
    pub name: String,

    #[serde(default)]
    pub path: Option<PathBuf>,

    #[serde(default)]
    pub action: ActionTag,

    #[serde(default)]
    pub updated: bool,

    /// Result of the resource's guards (`only_if` / `not_if`).
    #[serde(default)]
    pub skip: bool,
}

impl fmt::Display for ManifestResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl ResourceRecord for ManifestResource {
    fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn action(&self) -> &ActionTag {
        &self.action
    }

    fn updated(&self) -> bool {
        self.updated
    }

    fn should_skip(&self, action: &ActionTag) -> bool {
        if self.skip {
            info!(resource = %self.name, action = %action, "skipped due to guard");
        }
        self.skip
    }
}

impl RunManifest {
    pub fn identity(&self) -> RunIdentity {
        RunIdentity {
            node: self.run.node.clone(),
        }
    }
}

pub fn load_manifest(path: impl AsRef<Path>) -> Result<RunManifest> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|e| {
        KeeperError::ConfigError(format!("reading manifest {}: {e}", path.display()))
    })?;
    let manifest: RunManifest = toml::from_str(&contents)?;
    Ok(manifest)
}
