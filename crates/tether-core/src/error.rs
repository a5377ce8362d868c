use std::path::PathBuf;
use thiserror::Error;

/// Core error type for tether operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to read config at {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config at {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("No tether config found under {root}")]
    ConfigNotFound { root: PathBuf },

    #[error("Entry factory failed: {0}")]
    EntryFactory(String),

    #[error("Failed to bind dev server on {addr}: {source}")]
    ServerBind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot resolve {package} package")]
    CliNotFound { package: String },

    #[error("Command `{name}` is not provided by the host CLI")]
    CommandNotFound { name: String },

    #[error("{0}")]
    Other(String),
}

impl Error {
    #[must_use]
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
