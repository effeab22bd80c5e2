//! Error types for murmur-sync.

use std::path::PathBuf;

use thiserror::Error;

use murmur_locator::LocateError;
use murmur_render::RenderError;

/// All errors that can arise from clone / write / commit operations.
///
/// Per-target variants carry the target identity (`name:branch`) so a strict
/// run reports which destination stopped it.
#[derive(Debug, Error)]
pub enum SyncError {
    /// An error from the rendering stage of `generate`.
    #[error("render error: {0}")]
    Render(#[from] RenderError),

    /// An error resolving input files.
    #[error("{0}")]
    Locate(#[from] LocateError),

    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Artifact glob could not be built or walked.
    #[error("unable to match artifacts with {pattern}: {message}")]
    Glob { pattern: String, message: String },

    /// Write target directory is absent; it is never auto-created.
    #[error("destination directory {path} does not exist")]
    MissingDestination { path: PathBuf },

    /// Copying an artifact into a repo failed.
    #[error("unable to copy {src} to {dest}: {source}")]
    Copy {
        src: PathBuf,
        dest: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Clone directory already present and overwrite not requested.
    #[error(
        "repository {target} will not be re-cloned: {path} exists (specify --overwrite to overwrite existing repos)"
    )]
    CloneDirExists { target: String, path: PathBuf },

    /// Commit requested for a destination with no working copy.
    #[error("repository {target} not cloned: {path} does not exist")]
    NotCloned { target: String, path: PathBuf },

    /// An external command could not be started.
    #[error("unable to run `{command}` for {target}: {source}")]
    Spawn {
        target: String,
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// A `git` step (clone, add, diff, commit, push) failed.
    #[error("unable to {op} repository {target} ({command} in {dir}): {stderr}")]
    Git {
        op: &'static str,
        target: String,
        command: String,
        dir: PathBuf,
        stderr: String,
    },

    /// The user commit script exited non-zero.
    #[error("commit script {script} failed for {target}: {stderr}")]
    Script {
        target: String,
        script: PathBuf,
        stderr: String,
    },

    /// A non-strict run finished with failed targets.
    #[error("{} target(s) failed: {}", .failed.len(), .failed.join(", "))]
    Incomplete { failed: Vec<String> },
}

/// Convenience constructor for [`SyncError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> SyncError {
    SyncError::Io {
        path: path.into(),
        source,
    }
}
