//! `git` command construction.
//!
//! Builders only; execution goes through [`murmur_core::CommandRunner`] in
//! the synchronizer. Every command that can carry the auth token registers it
//! as a secret so it prints as `***`.

use std::path::Path;

use murmur_core::{CommandSpec, Target};

const GIT: &str = "git";

/// Remote URL for `repo` on `host`, with `token` embedded when present.
///
/// `https://github.com` + `org/svc` → `https://<token>@github.com/org/svc.git`.
/// A host without a scheme (a local mirror path) never embeds the token.
pub fn remote_url(host: &str, repo: &str, token: Option<&str>) -> String {
    let host = host.trim_end_matches('/');
    match (host.split_once("://"), token) {
        (Some((scheme, rest)), Some(token)) => format!("{scheme}://{token}@{rest}/{repo}.git"),
        _ => format!("{host}/{repo}.git"),
    }
}

/// `git clone --depth 1 --branch <branch> <url> <clone_dir>`, run in the repo root.
pub fn clone_cmd(repo_dir: &Path, target: &Target, host: &str, token: Option<&str>) -> CommandSpec {
    CommandSpec::new(GIT)
        .args(["clone", "--depth", "1", "--branch"])
        .arg(target.branch.clone())
        .arg(remote_url(host, &target.repo, token))
        .arg(target.clone_dir())
        .current_dir(repo_dir)
        .secret(token.unwrap_or_default())
}

/// `git add .`
pub fn add_all_cmd(clone_dir: &Path) -> CommandSpec {
    CommandSpec::new(GIT).args(["add", "."]).current_dir(clone_dir)
}

/// `git diff --cached --quiet`; exit 0 means nothing staged.
pub fn staged_diff_cmd(clone_dir: &Path) -> CommandSpec {
    CommandSpec::new(GIT)
        .args(["diff", "--cached", "--quiet"])
        .current_dir(clone_dir)
}

/// `git commit -am <msg>`
pub fn commit_cmd(clone_dir: &Path, msg: &str) -> CommandSpec {
    CommandSpec::new(GIT)
        .args(["commit", "-am", msg])
        .current_dir(clone_dir)
        .inherit_stdout()
}

/// `git push`
pub fn push_cmd(clone_dir: &Path, token: Option<&str>) -> CommandSpec {
    CommandSpec::new(GIT)
        .arg("push")
        .current_dir(clone_dir)
        .secret(token.unwrap_or_default())
}

/// The user commit script, run inside the working copy.
pub fn script_cmd(script: &Path, clone_dir: &Path) -> CommandSpec {
    CommandSpec::new(script.to_string_lossy().into_owned())
        .current_dir(clone_dir)
        .inherit_stdout()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn svc() -> Target {
        Target {
            name: "svc".into(),
            branch: "main".into(),
            repo: "org/svc".into(),
            ..Target::default()
        }
    }

    #[test]
    fn url_embeds_token_after_scheme() {
        assert_eq!(
            remote_url("https://github.com", "org/svc", Some("t0k")),
            "https://t0k@github.com/org/svc.git"
        );
        assert_eq!(
            remote_url("https://github.com/", "org/svc", None),
            "https://github.com/org/svc.git"
        );
    }

    #[test]
    fn url_for_plain_path_host_ignores_token() {
        assert_eq!(
            remote_url("/srv/mirrors", "org/svc", Some("t0k")),
            "/srv/mirrors/org/svc.git"
        );
    }

    #[test]
    fn clone_is_shallow_single_branch_into_clone_dir() {
        let cmd = clone_cmd(Path::new("/repos"), &svc(), "https://github.com", Some("t0k"));
        assert_eq!(
            cmd.to_string(),
            "git clone --depth 1 --branch main https://***@github.com/org/svc.git svc:main"
        );
        assert_eq!(cmd.dir(), Some(Path::new("/repos")));
        assert!(cmd.args.iter().any(|a| a.contains("t0k")), "real URL keeps the token");
    }

    #[test]
    fn commit_uses_message_verbatim() {
        let cmd = commit_cmd(Path::new("/repos/svc:main"), "murmur commit");
        assert_eq!(cmd.args, vec!["commit", "-am", "murmur commit"]);
    }

    #[test]
    fn script_runs_in_clone_dir() {
        let cmd = script_cmd(Path::new("/opt/commit.sh"), Path::new("/repos/svc:main"));
        assert_eq!(cmd.program, "/opt/commit.sh");
        assert_eq!(cmd.cwd, Some(PathBuf::from("/repos/svc:main")));
        assert!(cmd.args.is_empty());
    }
}
