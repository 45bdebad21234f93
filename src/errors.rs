// src/errors.rs

//! Crate-wide error aliases and helpers.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LesswatchError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// A path pattern could not be expanded into concrete paths.
    #[error("cannot expand pattern '{pattern}': {reason}")]
    PatternExpansion { pattern: String, reason: String },

    /// A path could not be statted or listed.
    #[error("filesystem error at {path:?}: {source:#}")]
    Filesystem {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    /// The OS-level watch subscription for a directory failed.
    #[error("cannot watch {path:?}: {source}")]
    WatchAttach {
        path: PathBuf,
        #[source]
        source: notify::Error,
    },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl LesswatchError {
    pub fn filesystem(path: impl Into<PathBuf>, source: anyhow::Error) -> Self {
        LesswatchError::Filesystem {
            path: path.into(),
            source,
        }
    }
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, LesswatchError>;
