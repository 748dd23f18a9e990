//! Error types
//!
//! Asset and storage errors are recovered where they happen (placeholder
//! sprite, default record) and only logged. `EngineError` is the one error
//! that crosses the tick API; once raised the engine stops ticking.

use thiserror::Error;

/// Failures reading or writing persisted records
#[derive(Error, Debug)]
pub enum StorageError {
    /// Backend (LocalStorage, filesystem) is not reachable
    #[error("storage backend unavailable: {0}")]
    Unavailable(String),

    /// Filesystem read/write failure
    #[error("storage io error for key {key}: {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    /// Stored payload could not be encoded or decoded
    #[error("malformed record under key {key}: {source}")]
    Malformed {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Failures loading sprite assets
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AssetError {
    #[error("failed to load asset {path}: {reason}")]
    LoadFailed { path: String, reason: String },

    #[error("asset {path} is empty")]
    Empty { path: String },
}

/// Fatal errors raised by the loop driver
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    /// Run state failed a post-tick consistency check
    #[error("run state corrupted: {0}")]
    CorruptState(String),

    /// The engine already faulted and refuses to tick again
    #[error("engine halted after fatal error: {0}")]
    Halted(String),
}
