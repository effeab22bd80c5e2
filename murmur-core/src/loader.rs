//! Target descriptor loading.
//!
//! A descriptor is a JSON array of [`Target`] records stored in a file named
//! `<prefix>-targets.json`. Loading decorates every record with the
//! descriptor's directory, filename, and prefix so that later stages can find
//! the artifacts rendered next to it.

use std::path::{Path, PathBuf};

use crate::error::{io_err, CoreError};
use crate::types::{Target, DESCRIPTOR_SUFFIX};

/// Artifact prefix for a descriptor filename, or `None` when the name does not
/// end with [`DESCRIPTOR_SUFFIX`].
pub fn descriptor_prefix(filename: &str) -> Option<&str> {
    filename.strip_suffix(DESCRIPTOR_SUFFIX)
}

/// Directory a descriptor lives in; `.` for a bare filename.
pub fn descriptor_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Parse one descriptor file.
///
/// Returns `CoreError::DescriptorName` if the filename lacks the suffix,
/// `CoreError::Parse` (with path + line context) if the JSON is malformed,
/// and `CoreError::InvalidName` if a target name contains `:`.
pub fn load_file(path: &Path) -> Result<Vec<Target>, CoreError> {
    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let prefix = descriptor_prefix(&filename)
        .ok_or_else(|| CoreError::DescriptorName {
            path: path.to_path_buf(),
            suffix: DESCRIPTOR_SUFFIX,
        })?
        .to_string();

    let contents = std::fs::read_to_string(path).map_err(|e| io_err(path, e))?;
    let mut targets: Vec<Target> = serde_json::from_str(&contents).map_err(|e| {
        CoreError::Parse {
            path: path.to_path_buf(),
            source: e,
        }
    })?;

    if let Some(bad) = targets.iter().find(|t| t.name.contains(':')) {
        return Err(CoreError::InvalidName {
            path: path.to_path_buf(),
            name: bad.name.clone(),
        });
    }

    let dir = descriptor_dir(path);
    for target in &mut targets {
        target.dir = dir.clone();
        target.filename = filename.clone();
        target.prefix = prefix.clone();
    }
    Ok(targets)
}

/// Load every descriptor in `files`, in order.
///
/// A file that fails to load is logged and skipped; the rest still load.
pub fn load_targets<P: AsRef<Path>>(files: &[P]) -> Vec<Target> {
    let mut targets = Vec::new();
    for file in files {
        let file = file.as_ref();
        match load_file(file) {
            Ok(loaded) => {
                tracing::debug!("loaded {} target(s) from {}", loaded.len(), file.display());
                targets.extend(loaded);
            }
            Err(err) => {
                tracing::error!("unable to read target file {}: {err}", file.display());
            }
        }
    }
    targets
}
