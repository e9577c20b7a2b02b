// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{KeeperError, Result};

/// Load a configuration file from a given path and return the raw `RawConfigFile`.
///
/// This only performs TOML deserialization; it does **not** perform semantic
/// validation. Use [`load_and_validate`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let config: RawConfigFile = toml::from_str(&contents)?;

    Ok(config)
}

/// Load a configuration file from path and run validation.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let raw_config = load_from_path(&path)?;
    let config = ConfigFile::try_from(raw_config)?;
    Ok(config)
}

/// Resolve the configuration for a run.
///
/// - An explicitly given path must exist and validate.
/// - Without one, [`default_config_path`] is used when it exists.
/// - Otherwise built-in defaults apply.
pub fn load_or_default(explicit: Option<&Path>) -> Result<ConfigFile> {
    if let Some(path) = explicit {
        if !path.exists() {
            return Err(KeeperError::ConfigError(format!(
                "config file {} does not exist",
                path.display()
            )));
        }
        return load_and_validate(path);
    }

    let fallback = default_config_path();
    if fallback.exists() {
        debug!(path = %fallback.display(), "loading default config file");
        return load_and_validate(&fallback);
    }

    debug!("no config file found; using built-in defaults");
    ConfigFile::try_from(RawConfigFile::default())
}

/// Location of the system-wide config file.
pub fn default_config_path() -> PathBuf {
    PathBuf::from("/etc/cvskeeper.toml")
}
