//! Read-only unified diff of what `repos write` would change.

use std::collections::HashSet;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use similar::TextDiff;

use murmur_core::{Target, TargetKey};

use crate::config::SyncConfig;
use crate::error::{io_err, SyncError};
use crate::writer::{existing_destination, plan_target};

/// A single artifact whose destination differs from its source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDiff {
    pub key: TargetKey,
    pub path: PathBuf,
    pub unified_diff: String,
}

/// Compare every planned copy against the destination on disk.
///
/// Nothing is written. Missing destination roots fail exactly as in write.
/// Files are compared byte for byte, as write does, so a line-ending change
/// alone shows up here.
pub fn diff_targets(config: &SyncConfig, targets: &[Target]) -> Result<Vec<FileDiff>, SyncError> {
    let mut seen = HashSet::new();
    let mut diffs = Vec::new();
    for target in targets {
        if !seen.insert(target) {
            continue;
        }
        let base = config.base_for(target.is_local());
        let dest_root = existing_destination(config, target)?;
        for copy in plan_target(target, &dest_root, config.match_mode)? {
            let incoming = read_bytes(&copy.src)?.unwrap_or_default();
            let existing = read_bytes(&copy.dest)?;
            if existing.as_deref() == Some(incoming.as_slice()) {
                continue;
            }
            let incoming = String::from_utf8_lossy(&incoming);
            let existing = String::from_utf8_lossy(existing.as_deref().unwrap_or_default());

            let relative = display_relative(&copy.dest, base);
            let old_header = format!("a/{relative}");
            let new_header = format!("b/{relative}");
            let unified = TextDiff::from_lines(existing.as_ref(), incoming.as_ref())
                .unified_diff()
                .header(&old_header, &new_header)
                .context_radius(3)
                .to_string();

            diffs.push(FileDiff {
                key: target.key(),
                path: copy.dest,
                unified_diff: unified,
            });
        }
    }
    Ok(diffs)
}

fn read_bytes(path: &Path) -> Result<Option<Vec<u8>>, SyncError> {
    match std::fs::read(path) {
        Ok(bytes) => Ok(Some(bytes)),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
        Err(err) => Err(io_err(path, err)),
    }
}

fn display_relative(path: &Path, base: &Path) -> String {
    let relative = path.strip_prefix(base).unwrap_or(path);
    relative
        .components()
        .filter(|c| !matches!(c, std::path::Component::CurDir))
        .collect::<PathBuf>()
        .display()
        .to_string()
}
