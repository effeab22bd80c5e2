//! Error types for murmur-render.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise from rendering and scaffolding.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Tera template engine error.
    #[error("template engine error: {0}")]
    Tera(#[from] tera::Error),

    /// Filesystem error while reading a template or writing a scaffold.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The scaffold template for an app does not exist.
    #[error("no template for app '{app}' at {path}")]
    TemplateNotFound { app: String, path: PathBuf },

    /// Scaffolding would overwrite an existing source file.
    #[error("{path} already exists")]
    AlreadyExists { path: PathBuf },

    /// `team/app/env` argument did not have three non-empty parts.
    #[error("invalid scope '{0}': team/app/env must be specified")]
    InvalidScope(String),

    /// The rendering engine could not be started.
    #[error("unable to run `{command}` for {file}: {source}")]
    Spawn {
        file: PathBuf,
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// The rendering engine exited non-zero.
    #[error("`{command}` failed for {file}: {stderr}")]
    Process {
        file: PathBuf,
        command: String,
        stderr: String,
    },
}

pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> RenderError {
    RenderError::Io {
        path: path.into(),
        source,
    }
}
