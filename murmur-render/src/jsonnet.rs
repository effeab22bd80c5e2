//! External `jsonnet` invocation.
//!
//! Each source is rendered by running `jsonnet <args> <basename>` inside the
//! source's own directory so relative imports resolve. Stdout passes through;
//! stderr is captured for diagnostics.

use std::path::{Path, PathBuf};

use murmur_core::{CommandRunner, CommandSpec};

use crate::error::RenderError;

/// Default engine executable.
pub const JSONNET_PROGRAM: &str = "jsonnet";

/// Multi-file output flag; bare, it is completed with the destination dir.
pub const MULTI_FLAG: &str = "-m";

/// How to invoke the rendering engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonnetOptions {
    pub program: String,
    pub args: Vec<String>,
    /// Abort on the first failed render instead of warning and continuing.
    pub strict: bool,
}

impl JsonnetOptions {
    /// Build options from a user argument string.
    ///
    /// `None` or a bare `-m` becomes `-m <destdir>`; anything else is split
    /// on whitespace and passed as-is.
    pub fn new(raw_args: Option<&str>, destdir: &Path, strict: bool) -> Self {
        let args = match raw_args.map(str::trim) {
            None | Some("") | Some(MULTI_FLAG) => {
                vec![MULTI_FLAG.to_string(), destdir.to_string_lossy().into_owned()]
            }
            Some(raw) => raw.split_whitespace().map(str::to_string).collect(),
        };
        Self {
            program: JSONNET_PROGRAM.to_string(),
            args,
            strict,
        }
    }

    /// The command that renders `file`.
    pub fn command_for(&self, file: &Path) -> CommandSpec {
        let dir = match file.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let base = file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        CommandSpec::new(&self.program)
            .args(self.args.iter().cloned())
            .arg(base)
            .current_dir(dir)
            .inherit_stdout()
    }
}

/// Outcome of rendering one source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderOutcome {
    Rendered { file: PathBuf },
    /// Non-strict failure: logged, run continued.
    Failed { file: PathBuf, stderr: String },
}

/// Render every file in order.
///
/// In strict mode the first failure is returned as `RenderError::Process`;
/// otherwise it is logged with its stderr and recorded as
/// [`RenderOutcome::Failed`].
pub fn render_files<R: CommandRunner>(
    runner: &R,
    opts: &JsonnetOptions,
    files: &[PathBuf],
) -> Result<Vec<RenderOutcome>, RenderError> {
    let mut outcomes = Vec::with_capacity(files.len());
    for file in files {
        let cmd = opts.command_for(file);
        tracing::info!(
            "rendering {} ({cmd} in {})",
            file.display(),
            cmd.dir().map(|d| d.display().to_string()).unwrap_or_default()
        );

        let (stderr, spawn_err) = match runner.run(&cmd) {
            Ok(out) if out.success() => {
                outcomes.push(RenderOutcome::Rendered { file: file.clone() });
                continue;
            }
            Ok(out) => (out.stderr, None),
            Err(e) => (e.to_string(), Some(e)),
        };

        if opts.strict {
            return Err(match spawn_err {
                Some(source) => RenderError::Spawn {
                    file: file.clone(),
                    command: cmd.to_string(),
                    source,
                },
                None => RenderError::Process {
                    file: file.clone(),
                    command: cmd.to_string(),
                    stderr,
                },
            });
        }
        tracing::warn!("render failed: {cmd} ({}): {}", file.display(), stderr.trim());
        outcomes.push(RenderOutcome::Failed {
            file: file.clone(),
            stderr,
        });
    }
    Ok(outcomes)
}
