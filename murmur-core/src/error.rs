//! Error types for murmur-core.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise while loading or decoding target descriptors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Underlying I/O failure, annotated with the path being read.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON decode error on load; includes file path and serde_json's line/column.
    #[error("failed to parse target descriptor {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The descriptor filename does not end with `-targets.json`, so no
    /// artifact prefix can be derived from it.
    #[error("descriptor {path} must be named <prefix>{suffix}")]
    DescriptorName { path: PathBuf, suffix: &'static str },

    /// A target name containing `:`; `name:branch` would be ambiguous.
    #[error("target name '{name}' in {path} must not contain ':'")]
    InvalidName { path: PathBuf, name: String },

    /// A `name:branch` override that does not split into exactly two parts.
    #[error("invalid branch override '{0}': expected name:branch")]
    InvalidOverride(String),
}

/// Convenience constructor for [`CoreError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> CoreError {
    CoreError::Io {
        path: path.into(),
        source,
    }
}
