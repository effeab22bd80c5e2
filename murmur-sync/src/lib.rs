//! # murmur-sync
//!
//! Repository synchronization: clone destination repos, copy rendered
//! artifacts into them, and commit the result.
//!
//! Build a [`Synchronizer`] from a [`SyncConfig`] and a
//! [`murmur_core::CommandRunner`], then call [`Synchronizer::clone_repos`],
//! [`Synchronizer::write_repos`] and [`Synchronizer::commit_repos`] in turn,
//! or [`generate`] to run the whole pipeline. [`diff_targets`] previews a
//! write without touching disk.

pub mod config;
pub mod diff;
pub mod error;
pub mod git;
pub mod pipeline;
pub mod report;
pub mod repos;
pub mod writer;

pub use config::{MatchMode, SyncConfig, DEFAULT_COMMIT_MSG};
pub use diff::{diff_targets, FileDiff};
pub use error::SyncError;
pub use pipeline::{generate, GenerateOptions, GenerateResult};
pub use report::{ensure_complete, Outcome, RepoSummary, SkipReason, TargetReport};
pub use repos::Synchronizer;
pub use writer::{write_targets, WriteReport, WriteResult};
