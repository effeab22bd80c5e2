//! `murmur generate`: render → clone → write → (commit).

use std::collections::HashSet;
use std::io;

use murmur_core::{apply_branch_overrides, load_targets, CommandRunner, Target, TargetKey};
use murmur_locator::{LocateError, Locator};
use murmur_render::{render_files, JsonnetOptions, RenderOutcome};

use crate::error::SyncError;
use crate::repos::Synchronizer;
use crate::report::{ensure_complete, TargetReport};
use crate::writer::WriteReport;

/// Knobs for one generate run beyond the [`crate::SyncConfig`].
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    pub jsonnet: JsonnetOptions,
    /// `name:branch` overrides applied before deduplication.
    pub overrides: Vec<String>,
    /// Run the commit stage after writing.
    pub commit: bool,
}

/// Everything each stage did.
#[derive(Debug, Default)]
pub struct GenerateResult {
    pub rendered: Vec<RenderOutcome>,
    pub cloned: Vec<TargetReport>,
    pub written: Vec<WriteReport>,
    pub committed: Vec<TargetReport>,
}

impl GenerateResult {
    /// `SyncError::Incomplete` naming every destination that failed to clone
    /// or commit.
    pub fn ensure_complete(&self) -> Result<(), SyncError> {
        let mut seen = HashSet::new();
        let reports: Vec<TargetReport> = self
            .cloned
            .iter()
            .chain(&self.committed)
            .filter(|r| r.outcome.is_failed() && seen.insert(r.key.clone()))
            .cloned()
            .collect();
        ensure_complete(&reports)
    }
}

/// Render every located source, then clone, write and optionally commit
/// every located descriptor's targets.
///
/// An empty source set skips rendering; an empty descriptor set ends the run.
/// Both are errors in strict mode.
///
/// Outside strict mode a destination that fails to clone is left out of
/// write and commit while the others carry on; call
/// [`GenerateResult::ensure_complete`] once the result has been reported.
pub fn generate<R: CommandRunner>(
    sync: &Synchronizer<R>,
    sources: &Locator,
    descriptors: &Locator,
    opts: &GenerateOptions,
) -> Result<GenerateResult, SyncError> {
    let strict = sync.config().strict;
    let mut result = GenerateResult::default();

    if let Some(files) = locate_all(sources, strict)? {
        result.rendered = render_files(sync.runner(), &opts.jsonnet, &files)?;
    }

    let Some(files) = locate_all(descriptors, strict)? else {
        return Ok(result);
    };
    let targets = apply_branch_overrides(&load_targets(&files), &opts.overrides);
    tracing::info!("{} target(s) from {} descriptor(s)", targets.len(), files.len());

    result.cloned = sync.clone_repos(&targets)?;
    let targets = without_failed(targets, &result.cloned);

    result.written = sync.write_repos(&targets)?;

    if opts.commit {
        result.committed = sync.commit_repos(&targets)?;
    }
    Ok(result)
}

fn without_failed(targets: Vec<Target>, cloned: &[TargetReport]) -> Vec<Target> {
    let failed: HashSet<&TargetKey> = cloned
        .iter()
        .filter(|r| r.outcome.is_failed())
        .map(|r| &r.key)
        .collect();
    if failed.is_empty() {
        return targets;
    }
    targets
        .into_iter()
        .filter(|t| {
            let keep = !failed.contains(&t.key());
            if !keep {
                tracing::warn!("skipping write and commit for {}: clone failed", t.key());
            }
            keep
        })
        .collect()
}

fn locate_all(locator: &Locator, strict: bool) -> Result<Option<Vec<std::path::PathBuf>>, SyncError> {
    match locator.locate(&[], io::empty()) {
        Ok(files) => Ok(Some(files)),
        Err(e @ LocateError::NoMatches { .. }) if strict => Err(e.into()),
        Err(LocateError::NoMatches { .. }) => Ok(None),
        Err(e) => Err(e.into()),
    }
}
