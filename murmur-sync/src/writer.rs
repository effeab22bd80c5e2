//! Artifact copying into destination working copies.
//!
//! ## Copy protocol
//!
//! 1. Glob the target's artifacts per type tag (see [`MatchMode`]).
//! 2. SHA-256 the source and any existing destination file.
//! 3. Identical digests → `Unchanged`, nothing touched.
//! 4. Dry run → `WouldWrite`, nothing touched.
//! 5. Stream the source into `<dest>.murmur.tmp`, then rename over `<dest>`.

use std::collections::HashSet;
use std::fs::File;
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};

use glob::Pattern;
use sha2::{Digest, Sha256};

use murmur_core::{Target, TargetKey};

use crate::config::{MatchMode, SyncConfig};
use crate::error::{io_err, SyncError};

/// Suffix of the in-flight copy written next to each destination.
pub const TMP_SUFFIX: &str = ".murmur.tmp";

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

/// Outcome of copying a single artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteResult {
    /// Destination created or replaced.
    Written { src: PathBuf, dest: PathBuf },
    /// Destination already held identical bytes.
    Unchanged { src: PathBuf, dest: PathBuf },
    /// Dry run: the destination would have been written.
    WouldWrite { src: PathBuf, dest: PathBuf },
}

impl WriteResult {
    pub fn dest(&self) -> &Path {
        match self {
            WriteResult::Written { dest, .. }
            | WriteResult::Unchanged { dest, .. }
            | WriteResult::WouldWrite { dest, .. } => dest,
        }
    }
}

/// All copies made for one target record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteReport {
    pub key: TargetKey,
    pub dest_root: PathBuf,
    pub writes: Vec<WriteResult>,
}

/// One artifact and where it lands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedCopy {
    pub src: PathBuf,
    pub dest: PathBuf,
}

// ---------------------------------------------------------------------------
// Matching
// ---------------------------------------------------------------------------

/// Artifacts of `kind` next to the target's descriptor, sorted.
pub fn matching_artifacts(
    target: &Target,
    kind: &str,
    mode: MatchMode,
) -> Result<Vec<PathBuf>, SyncError> {
    let name = match mode {
        MatchMode::Prefix => format!("{}-{}.json", Pattern::escape(&target.prefix), Pattern::escape(kind)),
        MatchMode::App => format!("*-{}-{}.json", Pattern::escape(&target.app), Pattern::escape(kind)),
    };
    let dir = Pattern::escape(&target.dir.to_string_lossy());
    let pattern = if dir.is_empty() {
        name
    } else {
        format!("{}/{name}", dir.trim_end_matches('/'))
    };

    let paths = glob::glob(&pattern).map_err(|e| SyncError::Glob {
        pattern: pattern.clone(),
        message: e.to_string(),
    })?;
    let mut found = Vec::new();
    for entry in paths {
        let path = entry.map_err(|e| SyncError::Glob {
            pattern: pattern.clone(),
            message: e.to_string(),
        })?;
        if path.is_file() {
            found.push(path);
        }
    }
    found.sort();
    tracing::debug!("{pattern}: {} match(es)", found.len());
    Ok(found)
}

/// Destination file name: the first `-<app>-` infix collapses to `-`,
/// otherwise a leading `<app>-` is dropped.
///
/// `x-billing-datasources.json` → `x-datasources.json`,
/// `billing-datasources.json` → `datasources.json`.
pub fn dest_filename(name: &str, app: &str) -> String {
    if app.is_empty() {
        return name.to_string();
    }
    let infix = format!("-{app}-");
    if let Some(at) = name.find(&infix) {
        return format!("{}-{}", &name[..at], &name[at + infix.len()..]);
    }
    match name.strip_prefix(&format!("{app}-")) {
        Some(rest) => rest.to_string(),
        None => name.to_string(),
    }
}

/// Every copy `target` calls for, rooted at `dest_root`.
pub fn plan_target(
    target: &Target,
    dest_root: &Path,
    mode: MatchMode,
) -> Result<Vec<PlannedCopy>, SyncError> {
    let mut plan = Vec::new();
    for kind in &target.types {
        for src in matching_artifacts(target, kind, mode)? {
            let Some(file_name) = src.file_name() else {
                continue;
            };
            let file_name = dest_filename(&file_name.to_string_lossy(), &target.app);
            plan.push(PlannedCopy {
                dest: dest_root.join(kind).join(file_name),
                src,
            });
        }
    }
    Ok(plan)
}

/// `<base>/<clone_dir>/<path>`, required to exist already.
pub(crate) fn existing_destination(config: &SyncConfig, target: &Target) -> Result<PathBuf, SyncError> {
    let root = target.destination_root(config.base_for(target.is_local()));
    if root.is_dir() {
        Ok(root)
    } else {
        Err(SyncError::MissingDestination { path: root })
    }
}

// ---------------------------------------------------------------------------
// Writing
// ---------------------------------------------------------------------------

/// Copy every target's artifacts into its destination.
///
/// Exact duplicate records are written once. Local targets resolve against
/// the work dir. The first missing destination or failed copy aborts.
pub fn write_targets(config: &SyncConfig, targets: &[Target]) -> Result<Vec<WriteReport>, SyncError> {
    let mut seen = HashSet::new();
    let mut reports = Vec::new();
    for target in targets {
        if !seen.insert(target) {
            continue;
        }
        reports.push(write_target(config, target)?);
    }
    Ok(reports)
}

fn write_target(config: &SyncConfig, target: &Target) -> Result<WriteReport, SyncError> {
    let dest_root = existing_destination(config, target)?;
    tracing::info!(
        "writing {} artifact type(s) for {} into {}",
        target.types.len(),
        target.key(),
        dest_root.display()
    );

    let mut writes = Vec::new();
    for copy in plan_target(target, &dest_root, config.match_mode)? {
        writes.push(copy_artifact(&copy.src, &copy.dest, config.dry_run)?);
    }
    Ok(WriteReport {
        key: target.key(),
        dest_root,
        writes,
    })
}

/// Hash-gated, temp-file-and-rename copy of `src` to `dest`.
pub fn copy_artifact(src: &Path, dest: &Path, dry_run: bool) -> Result<WriteResult, SyncError> {
    let copy_err = |source: io::Error| SyncError::Copy {
        src: src.to_path_buf(),
        dest: dest.to_path_buf(),
        source,
    };

    let src_digest = file_digest(src).map_err(copy_err)?;
    let dest_digest = match file_digest(dest) {
        Ok(d) => Some(d),
        Err(e) if e.kind() == ErrorKind::NotFound => None,
        Err(e) => return Err(copy_err(e)),
    };

    if dest_digest.as_deref() == Some(src_digest.as_str()) {
        tracing::debug!("unchanged: {}", dest.display());
        return Ok(WriteResult::Unchanged {
            src: src.to_path_buf(),
            dest: dest.to_path_buf(),
        });
    }

    if dry_run {
        tracing::info!("[dry-run] would write: {}", dest.display());
        return Ok(WriteResult::WouldWrite {
            src: src.to_path_buf(),
            dest: dest.to_path_buf(),
        });
    }

    if let Some(parent) = dest.parent() {
        std::fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
    }

    let tmp = PathBuf::from(format!("{}{TMP_SUFFIX}", dest.display()));
    if let Err(e) = stream_copy(src, &tmp) {
        let _ = std::fs::remove_file(&tmp);
        return Err(copy_err(e));
    }
    if let Err(e) = std::fs::rename(&tmp, dest) {
        let _ = std::fs::remove_file(&tmp);
        return Err(copy_err(e));
    }

    tracing::info!("wrote: {}", dest.display());
    Ok(WriteResult::Written {
        src: src.to_path_buf(),
        dest: dest.to_path_buf(),
    })
}

fn stream_copy(src: &Path, dest: &Path) -> io::Result<()> {
    let mut reader = File::open(src)?;
    let mut writer = File::create(dest)?;
    io::copy(&mut reader, &mut writer)?;
    writer.sync_all()
}

fn file_digest(path: &Path) -> io::Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    io::copy(&mut file, &mut hasher)?;
    Ok(hex::encode(hasher.finalize()))
}

/// Delete `*.murmur.tmp` leftovers of an interrupted write anywhere under
/// `dir`. Returns how many were removed.
pub fn remove_stale_temp_files(dir: &Path) -> Result<usize, SyncError> {
    let pattern = format!(
        "{}/**/*{TMP_SUFFIX}",
        Pattern::escape(dir.to_string_lossy().trim_end_matches('/'))
    );
    let paths = glob::glob(&pattern).map_err(|e| SyncError::Glob {
        pattern: pattern.clone(),
        message: e.to_string(),
    })?;

    let mut removed = 0;
    for entry in paths {
        let path = entry.map_err(|e| SyncError::Glob {
            pattern: pattern.clone(),
            message: e.to_string(),
        })?;
        if !path.is_file() {
            continue;
        }
        tracing::warn!("removing stale temporary file {}", path.display());
        std::fs::remove_file(&path).map_err(|e| io_err(&path, e))?;
        removed += 1;
    }
    Ok(removed)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::fs;

    use rstest::rstest;
    use tempfile::TempDir;

    use super::*;

    #[rstest]
    #[case("x-billing-datasources.json", "billing", "x-datasources.json")]
    #[case("billing-datasources.json", "billing", "datasources.json")]
    #[case("a-billing-b-billing-c.json", "billing", "a-b-billing-c.json")]
    #[case("other-datasources.json", "billing", "other-datasources.json")]
    #[case("x-billing-datasources.json", "", "x-billing-datasources.json")]
    fn destination_names(#[case] name: &str, #[case] app: &str, #[case] expected: &str) {
        assert_eq!(dest_filename(name, app), expected);
    }

    fn descriptor_target(dir: &Path) -> Target {
        Target {
            name: "svc".into(),
            branch: "main".into(),
            repo: "org/svc".into(),
            path: "out".into(),
            app: "billing".into(),
            types: vec!["datasources".into()],
            dir: dir.to_path_buf(),
            filename: "team-targets.json".into(),
            prefix: "team".into(),
        }
    }

    #[test]
    fn match_modes_select_different_artifacts() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path();
        fs::write(dir.join("team-datasources.json"), "{}").unwrap();
        fs::write(dir.join("x-billing-datasources.json"), "{}").unwrap();
        fs::write(dir.join("y-billing-datasources.json"), "{}").unwrap();
        fs::write(dir.join("x-billing-connections.json"), "{}").unwrap();
        let t = descriptor_target(dir);

        let by_prefix = matching_artifacts(&t, "datasources", MatchMode::Prefix).unwrap();
        assert_eq!(by_prefix, vec![dir.join("team-datasources.json")]);

        let by_app = matching_artifacts(&t, "datasources", MatchMode::App).unwrap();
        assert_eq!(
            by_app,
            vec![dir.join("x-billing-datasources.json"), dir.join("y-billing-datasources.json")]
        );
    }

    #[test]
    fn glob_metacharacters_in_dir_are_literal() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("weird[1]");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("team-datasources.json"), "{}").unwrap();

        let found = matching_artifacts(&descriptor_target(&dir), "datasources", MatchMode::Prefix).unwrap();
        assert_eq!(found.len(), 1);
    }

    #[test]
    fn copy_is_hash_gated() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("src.json");
        let dest = tmp.path().join("nested/dest.json");
        fs::write(&src, r#"{"a":1}"#).unwrap();

        let first = copy_artifact(&src, &dest, false).unwrap();
        assert!(matches!(first, WriteResult::Written { .. }));
        assert_eq!(fs::read(&dest).unwrap(), fs::read(&src).unwrap());
        assert!(!tmp.path().join("nested/dest.json.murmur.tmp").exists());

        let second = copy_artifact(&src, &dest, false).unwrap();
        assert!(matches!(second, WriteResult::Unchanged { .. }));
    }

    #[test]
    fn dry_run_touches_nothing() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("src.json");
        let dest = tmp.path().join("nested/dest.json");
        fs::write(&src, "{}").unwrap();

        let result = copy_artifact(&src, &dest, true).unwrap();
        assert_eq!(result.dest(), dest.as_path());
        assert!(matches!(result, WriteResult::WouldWrite { .. }));
        assert!(!tmp.path().join("nested").exists());
    }

    #[test]
    fn missing_source_names_both_paths() {
        let tmp = TempDir::new().unwrap();
        let err = copy_artifact(&tmp.path().join("gone.json"), &tmp.path().join("d.json"), false)
            .unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("gone.json") && msg.contains("d.json"), "{msg}");
    }

    #[test]
    fn missing_destination_root_is_fatal() {
        let tmp = TempDir::new().unwrap();
        let cfg = SyncConfig::new(tmp.path().join("repos"), tmp.path());
        let err = write_targets(&cfg, &[descriptor_target(tmp.path())]).unwrap_err();
        match err {
            SyncError::MissingDestination { path } => {
                assert_eq!(path, tmp.path().join("repos/svc:main/out"));
            }
            other => panic!("expected MissingDestination, got {other:?}"),
        }
    }

    #[test]
    fn duplicate_records_are_written_once() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("team-datasources.json"), "{}").unwrap();
        fs::create_dir_all(tmp.path().join("repos/svc:main/out")).unwrap();
        let cfg = SyncConfig::new(tmp.path().join("repos"), tmp.path());
        let t = descriptor_target(tmp.path());

        let reports = write_targets(&cfg, &[t.clone(), t]).unwrap();
        assert_eq!(reports.len(), 1);
        assert_eq!(
            reports[0].writes[0].dest(),
            tmp.path().join("repos/svc:main/out/datasources/team-datasources.json")
        );
    }

    #[test]
    fn stale_temp_files_are_removed_recursively() {
        let tmp = TempDir::new().unwrap();
        let nested = tmp.path().join("out/datasources");
        fs::create_dir_all(&nested).unwrap();
        fs::write(tmp.path().join("top.json.murmur.tmp"), "partial").unwrap();
        fs::write(nested.join("datasources.json.murmur.tmp"), "partial").unwrap();
        fs::write(nested.join("datasources.json"), "{}").unwrap();

        assert_eq!(remove_stale_temp_files(tmp.path()).unwrap(), 2);
        assert!(!nested.join("datasources.json.murmur.tmp").exists());
        assert!(nested.join("datasources.json").exists());
        assert_eq!(remove_stale_temp_files(tmp.path()).unwrap(), 0);
    }
}
