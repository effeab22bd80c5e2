//! Input file resolution for `murmur-locator`.
//!
//! [`Locator::locate`] turns command-line arguments into the set of files a
//! command works on. Sources are checked in priority order: explicit paths,
//! a newline-delimited list on stdin (`-`), then a recursive scan of the data
//! directory. The result is narrowed by the [`Scope`] path filter.
//!
//! ```text
//! <datadir>/
//!   <team>/<app>/<env>/
//!     <app>.jsonnet
//!     <prefix>-targets.json
//!     <prefix>-<app>-<type>.json
//! ```

use std::io::BufRead;
use std::path::{Component, Path, PathBuf};

use glob::{MatchOptions, Pattern};
use thiserror::Error;
use walkdir::WalkDir;

/// Scope component meaning "no restriction".
pub const ANY: &str = "*";

/// Positional argument that switches input to a list read from stdin.
pub const STDIN_SENTINEL: &str = "-";

/// Suffix of target descriptor files.
pub const TARGETS_SUFFIX: &str = "targets.json";

/// Suffix of renderable sources.
pub const JSONNET_SUFFIX: &str = ".jsonnet";

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors from file resolution.
#[derive(Debug, Error)]
pub enum LocateError {
    #[error("unable to read file list from stdin: {0}")]
    Stdin(#[source] std::io::Error),

    #[error("unable to search for files: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("invalid filter pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    #[error("no files matched (dir: {dir}, suffix: {suffix}, filter: {filter})")]
    NoMatches {
        dir: String,
        suffix: String,
        filter: String,
    },
}

// ---------------------------------------------------------------------------
// Scope
// ---------------------------------------------------------------------------

/// Team / app / environment restriction, or an explicit path filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scope {
    pub team: String,
    pub app: String,
    pub env: String,
    /// Explicit filter; always wins over team/app/env.
    pub filter: Option<String>,
}

impl Default for Scope {
    fn default() -> Self {
        Self {
            team: ANY.to_string(),
            app: ANY.to_string(),
            env: ANY.to_string(),
            filter: None,
        }
    }
}

impl Scope {
    fn is_narrowed(&self) -> bool {
        self.team != ANY || self.app != ANY || self.env != ANY
    }

    /// The path filter to apply, if any.
    ///
    /// Team/app/env collapse to `team/app/env` when any of them is narrowed.
    /// An explicit filter overrides them, with a warning when both are set.
    pub fn effective_filter(&self) -> Option<String> {
        let explicit = self.filter.as_deref().filter(|f| !f.is_empty());
        match (explicit, self.is_narrowed()) {
            (Some(filter), true) => {
                tracing::warn!("filter '{filter}' is specified, ignoring team/app/env");
                Some(filter.to_string())
            }
            (Some(filter), false) => Some(filter.to_string()),
            (None, true) => Some(format!("{}/{}/{}", self.team, self.app, self.env)),
            (None, false) => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Locator
// ---------------------------------------------------------------------------

/// Resolves input files for one command.
#[derive(Debug, Clone)]
pub struct Locator {
    /// Directory scanned when no files are given; also the filter root.
    pub dir: Option<PathBuf>,
    /// Filename suffix collected by the scan.
    pub suffix: String,
    pub scope: Scope,
}

impl Locator {
    pub fn new(dir: Option<PathBuf>, suffix: impl Into<String>, scope: Scope) -> Self {
        Self {
            dir,
            suffix: suffix.into(),
            scope,
        }
    }

    /// Resolve the working file set.
    ///
    /// `stdin` is only read when the first argument is [`STDIN_SENTINEL`].
    /// Returns `LocateError::NoMatches` if nothing survives; callers decide
    /// whether that is fatal.
    pub fn locate<R: BufRead>(&self, args: &[String], stdin: R) -> Result<Vec<PathBuf>, LocateError> {
        let mut files = match args.first().map(String::as_str) {
            Some(STDIN_SENTINEL) => {
                tracing::debug!("reading list of files from stdin");
                read_list(stdin)?
            }
            Some(first) if !first.is_empty() => {
                tracing::debug!("reading list of files from the command line");
                args.iter().map(PathBuf::from).collect()
            }
            _ => match &self.dir {
                Some(dir) => {
                    tracing::debug!("searching {} for *{}", dir.display(), self.suffix);
                    find_files(dir, &self.suffix)?
                }
                None => Vec::new(),
            },
        };

        let filter = self.scope.effective_filter();
        if let Some(filter) = &filter {
            let root = self.dir.clone().unwrap_or_default();
            files = filter_files(&files, &root, filter)?;
        }

        if files.is_empty() {
            let dir = self
                .dir
                .as_ref()
                .map(|d| d.display().to_string())
                .unwrap_or_default();
            tracing::warn!(
                "no matching files (dir: {dir}, suffix: {}, filter: {})",
                self.suffix,
                filter.as_deref().unwrap_or("")
            );
            return Err(LocateError::NoMatches {
                dir,
                suffix: self.suffix.clone(),
                filter: filter.unwrap_or_default(),
            });
        }

        tracing::debug!("located {} file(s)", files.len());
        Ok(files)
    }
}

// ---------------------------------------------------------------------------
// Building blocks
// ---------------------------------------------------------------------------

/// Newline-delimited path list; blank lines are skipped.
pub fn read_list<R: BufRead>(reader: R) -> Result<Vec<PathBuf>, LocateError> {
    let mut list = Vec::new();
    for line in reader.lines() {
        let line = line.map_err(LocateError::Stdin)?;
        let line = line.trim();
        if !line.is_empty() {
            list.push(PathBuf::from(line));
        }
    }
    Ok(list)
}

/// Recursively collect files under `dir` whose name ends with `suffix`.
///
/// Results are in file-name order per directory so runs are deterministic.
pub fn find_files(dir: &Path, suffix: &str) -> Result<Vec<PathBuf>, LocateError> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry?;
        if entry.file_type().is_dir() {
            continue;
        }
        if entry.file_name().to_string_lossy().ends_with(suffix) {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

/// Keep the files directly inside `<root>/<filter>/`.
///
/// `filter` may contain glob syntax; `*` never crosses a `/`. `root` is
/// matched literally. Relative `root` and `files` are both taken relative to
/// the current directory, so an absolute data directory still matches
/// relative file arguments.
pub fn filter_files(files: &[PathBuf], root: &Path, filter: &str) -> Result<Vec<PathBuf>, LocateError> {
    let base = std::env::current_dir().unwrap_or_default();
    filter_files_from(files, root, filter, &base)
}

/// [`filter_files`] with relative paths anchored at `base` instead of the
/// current directory. Returned paths are the caller's, unchanged.
pub fn filter_files_from(
    files: &[PathBuf],
    root: &Path,
    filter: &str,
    base: &Path,
) -> Result<Vec<PathBuf>, LocateError> {
    let root = clean_path(&base.join(root));
    let root = root.to_string_lossy();
    let pattern = if root.is_empty() {
        format!("{}/*", filter.trim_end_matches('/'))
    } else {
        format!(
            "{}/{}/*",
            Pattern::escape(root.trim_end_matches('/')),
            filter.trim_matches('/')
        )
    };
    tracing::debug!("filtering files with {pattern}");

    let compiled = Pattern::new(&pattern).map_err(|source| LocateError::Pattern {
        pattern: pattern.clone(),
        source,
    })?;
    let options = MatchOptions {
        case_sensitive: true,
        require_literal_separator: true,
        require_literal_leading_dot: false,
    };

    Ok(files
        .iter()
        .filter(|f| compiled.matches_path_with(&clean_path(&base.join(f)), options))
        .cloned()
        .collect())
}

/// Lexically drop `.` components so `./a/b` and `a/b` compare equal.
pub fn clean_path(path: &Path) -> PathBuf {
    path.components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn scope(team: &str, app: &str, env: &str, filter: Option<&str>) -> Scope {
        Scope {
            team: team.into(),
            app: app.into(),
            env: env.into(),
            filter: filter.map(Into::into),
        }
    }

    #[rstest]
    #[case(scope("*", "*", "*", None), None)]
    #[case(scope("ops", "*", "*", None), Some("ops/*/*"))]
    #[case(scope("ops", "billing", "prod", None), Some("ops/billing/prod"))]
    #[case(scope("*", "*", "*", Some("a/b")), Some("a/b"))]
    #[case(scope("ops", "*", "*", Some("a/b")), Some("a/b"))]
    #[case(scope("*", "*", "*", Some("")), None)]
    fn effective_filter_precedence(#[case] scope: Scope, #[case] expected: Option<&str>) {
        assert_eq!(scope.effective_filter().as_deref(), expected);
    }

    #[test]
    fn clean_path_strips_cur_dir() {
        assert_eq!(clean_path(Path::new("./a/./b")), PathBuf::from("a/b"));
        assert_eq!(clean_path(Path::new(".")), PathBuf::new());
    }

    #[test]
    fn read_list_skips_blank_lines() {
        let input = "a/x-targets.json\n\n  b/y-targets.json  \n";
        let list = read_list(input.as_bytes()).unwrap();
        assert_eq!(
            list,
            vec![PathBuf::from("a/x-targets.json"), PathBuf::from("b/y-targets.json")]
        );
    }

    #[test]
    fn filter_matches_only_direct_children() {
        let files = vec![
            PathBuf::from("./data/ops/billing/prod/billing-targets.json"),
            PathBuf::from("data/ops/billing/prod/nested/deep-targets.json"),
            PathBuf::from("data/ops/billing/dev/billing-targets.json"),
        ];
        let kept = filter_files(&files, Path::new("./data"), "ops/billing/prod").unwrap();
        assert_eq!(kept, vec![files[0].clone()]);
    }

    #[test]
    fn filter_star_does_not_cross_separators() {
        let files = vec![
            PathBuf::from("ops/billing/prod/a-targets.json"),
            PathBuf::from("ops/api/prod/b-targets.json"),
            PathBuf::from("ops/api/prod/x/c-targets.json"),
        ];
        let kept = filter_files(&files, Path::new("."), "ops/*/prod").unwrap();
        assert_eq!(kept, files[..2].to_vec());
    }

    #[test]
    fn relative_files_match_an_absolute_root() {
        let files = vec![
            PathBuf::from("ops/billing/prod/billing-targets.json"),
            PathBuf::from("/srv/data/ops/billing/prod/abs-targets.json"),
            PathBuf::from("ops/billing/dev/billing-targets.json"),
        ];
        let kept = filter_files_from(
            &files,
            Path::new("/srv/data"),
            "ops/billing/prod",
            Path::new("/srv/data"),
        )
        .unwrap();
        assert_eq!(kept, files[..2].to_vec(), "paths come back as given");
    }

    #[test]
    fn relative_root_is_anchored_like_the_files() {
        let files = vec![PathBuf::from("/work/data/ops/a/prod/a-targets.json")];
        let kept = filter_files_from(&files, Path::new("data"), "ops/*/prod", Path::new("/work")).unwrap();
        assert_eq!(kept, files);
    }

    #[test]
    fn explicit_args_are_used_verbatim() {
        let locator = Locator::new(None, TARGETS_SUFFIX, Scope::default());
        let args = vec!["one-targets.json".to_string(), "two-targets.json".to_string()];
        let files = locator.locate(&args, std::io::empty()).unwrap();
        assert_eq!(files.len(), 2);
        assert_eq!(files[1], PathBuf::from("two-targets.json"));
    }

    #[test]
    fn dash_reads_from_stdin() {
        let locator = Locator::new(None, TARGETS_SUFFIX, Scope::default());
        let args = vec![STDIN_SENTINEL.to_string()];
        let files = locator
            .locate(&args, "a-targets.json\nb-targets.json\n".as_bytes())
            .unwrap();
        assert_eq!(files.len(), 2);
    }

    #[test]
    fn nothing_to_search_is_no_matches() {
        let locator = Locator::new(None, TARGETS_SUFFIX, Scope::default());
        let err = locator.locate(&[], std::io::empty()).unwrap_err();
        assert!(matches!(err, LocateError::NoMatches { .. }));
    }
}
