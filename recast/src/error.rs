//! Library error type.
//!
//! Deferred rewrites are not errors: they surface as `Skipped` diagnostics.
//! Only reading and writing files, decoding units and parsing configuration
//! can fail.

use std::path::PathBuf;
use thiserror::Error;

/// Errors returned by the I/O and configuration layers.
#[derive(Debug, Error)]
pub enum RecastError {
    /// Reading or writing a file failed.
    #[error("I/O error on {path}: {source}")]
    Io {
        /// File involved.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// A unit file is not a valid serialized tree.
    #[error("invalid unit file {path}: {source}")]
    Json {
        /// File involved.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: serde_json::Error,
    },

    /// A configuration file could not be parsed.
    #[error("invalid configuration in {path}: {source}")]
    Config {
        /// File involved.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: toml::de::Error,
    },
}

/// Result alias for fallible library operations.
pub type Result<T> = std::result::Result<T, RecastError>;
