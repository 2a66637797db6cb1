// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the host bindings

use thiserror::Error;

/// Result type for host binding operations
pub type Result<T> = std::result::Result<T, HostError>;

/// Errors that can cross the native/script boundary
#[derive(Debug, Error)]
pub enum HostError {
    /// Type error (wrong argument shape)
    #[error("TypeError: {0}")]
    TypeError(String),

    /// Range error (value out of range)
    #[error("RangeError: {0}")]
    RangeError(String),

    /// The timer pool has no free slots
    #[error("no free timer slots")]
    ResourceExhausted,

    /// The OS refused to start a worker thread
    #[error("failed to create timer thread: {0}")]
    ThreadCreation(#[source] std::io::Error),

    /// An error raised by a script callback during a fire
    #[error("{0}")]
    Callback(String),

    /// File system error, carrying the failed operation and path
    #[error("{op} failed for '{path}': {source}")]
    Fs {
        /// Operation name as the script sees it (e.g. `readFileSync`)
        op: &'static str,
        /// Path handed in by the script
        path: String,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// YAML parse or emit error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// File watcher error
    #[error("watch error: {0}")]
    Watch(#[from] notify::Error),

    /// Network error from the request module
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Generic error with message
    #[error("{0}")]
    Generic(String),
}

impl HostError {
    /// Create a new TypeError
    pub fn type_error(msg: impl Into<String>) -> Self {
        Self::TypeError(msg.into())
    }

    /// Create a new RangeError
    pub fn range_error(msg: impl Into<String>) -> Self {
        Self::RangeError(msg.into())
    }

    /// Create a filesystem error tagged with the failing operation and path
    pub fn fs(op: &'static str, path: impl Into<String>, source: std::io::Error) -> Self {
        Self::Fs {
            op,
            path: path.into(),
            source,
        }
    }
}
