//! # murmur-render
//!
//! Source rendering and scaffolding.
//!
//! - [`jsonnet`] runs the external `jsonnet` engine over located sources
//!   through a [`murmur_core::CommandRunner`].
//! - [`scaffold`] creates new `<app>.jsonnet` sources from Tera templates kept
//!   in `<datadir>/tmpl/`.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::path::{Path, PathBuf};
//! use murmur_core::SystemRunner;
//! use murmur_render::{render_files, JsonnetOptions};
//!
//! let opts = JsonnetOptions::new(None, Path::new("/tmp/out"), false);
//! let files = vec![PathBuf::from("ops/billing/prod/billing.jsonnet")];
//! if let Ok(outcomes) = render_files(&SystemRunner, &opts, &files) {
//!     println!("{} rendered", outcomes.len());
//! }
//! ```

pub mod context;
pub mod error;
pub mod jsonnet;
pub mod scaffold;

pub use context::ScaffoldScope;
pub use error::RenderError;
pub use jsonnet::{render_files, JsonnetOptions, RenderOutcome};
pub use scaffold::{create_at, render_scaffold};
