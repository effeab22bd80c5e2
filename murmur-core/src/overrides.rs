//! `name:branch` overrides applied on top of loaded targets.

use std::str::FromStr;

use crate::error::CoreError;
use crate::types::Target;

/// A parsed `name:branch` override.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchOverride {
    pub name: String,
    pub branch: String,
}

impl FromStr for BranchOverride {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(':').collect();
        match parts.as_slice() {
            [name, branch] if !name.is_empty() && !branch.is_empty() => Ok(Self {
                name: (*name).to_string(),
                branch: (*branch).to_string(),
            }),
            _ => Err(CoreError::InvalidOverride(s.to_string())),
        }
    }
}

/// Parse override strings, logging and dropping the malformed ones.
pub fn parse_overrides<S: AsRef<str>>(raw: &[S]) -> Vec<BranchOverride> {
    raw.iter()
        .filter_map(|s| match s.as_ref().parse::<BranchOverride>() {
            Ok(o) => Some(o),
            Err(err) => {
                tracing::warn!("ignoring branch override: {err}");
                None
            }
        })
        .collect()
}

/// Return a copy of `targets` with every override applied.
///
/// An override updates the branch of *every* target whose name matches, not
/// just the first. Later overrides for the same name win. Must run before
/// deduplication so the new branches take part in `(name, branch)` identity.
pub fn apply_branch_overrides<S: AsRef<str>>(targets: &[Target], raw: &[S]) -> Vec<Target> {
    let overrides = parse_overrides(raw);
    let mut out = targets.to_vec();
    for o in &overrides {
        let mut hits = 0usize;
        for target in out.iter_mut().filter(|t| t.name == o.name) {
            target.branch = o.branch.clone();
            hits += 1;
        }
        if hits == 0 {
            tracing::warn!("branch override {}:{} matched no targets", o.name, o.branch);
        } else {
            tracing::info!(
                "branch override {}:{} applied to {hits} target(s)",
                o.name,
                o.branch
            );
        }
    }
    out
}
