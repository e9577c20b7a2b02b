// src/errors.rs

//! Crate-wide error type and result alias.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum KeeperError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// The VCS client exited non-zero. Display mirrors the raw client output
    /// so operators can read it directly from the log line.
    #[error("CVS error: {stderr}\n{stdout}")]
    VcsCommand {
        command: String,
        status: i32,
        stdout: String,
        stderr: String,
    },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, KeeperError>;
