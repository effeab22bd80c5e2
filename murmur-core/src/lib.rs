//! murmur core library: routing-rule model, descriptor loading, branch
//! overrides, and the external process capability.
//!
//! Public API surface:
//! - [`types`]: [`Target`], [`TargetKey`], deduplication
//! - [`loader`]: `<prefix>-targets.json` parsing
//! - [`overrides`]: `name:branch` overrides
//! - [`process`]: [`CommandRunner`] seam for `git`, `jsonnet`, scripts
//! - [`error`]: [`CoreError`]

pub mod error;
pub mod loader;
pub mod overrides;
pub mod process;
pub mod types;

pub use error::CoreError;
pub use loader::{load_file, load_targets};
pub use overrides::{apply_branch_overrides, BranchOverride};
pub use process::{CommandOutput, CommandRunner, CommandSpec, StdoutMode, SystemRunner};
pub use types::{unique_destinations, Target, TargetKey, DESCRIPTOR_SUFFIX, LOCAL_REPO};
