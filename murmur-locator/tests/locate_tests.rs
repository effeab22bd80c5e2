use std::fs;
use std::path::{Path, PathBuf};

use murmur_locator::{
    find_files, LocateError, Locator, Scope, JSONNET_SUFFIX, TARGETS_SUFFIX,
};
use tempfile::TempDir;

fn touch(root: &Path, rel: &str) -> PathBuf {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, "[]").unwrap();
    path
}

fn data_tree() -> TempDir {
    let tmp = TempDir::new().unwrap();
    touch(tmp.path(), "ops/billing/prod/billing-targets.json");
    touch(tmp.path(), "ops/billing/prod/billing.jsonnet");
    touch(tmp.path(), "ops/billing/dev/billing-targets.json");
    touch(tmp.path(), "web/api/prod/api-targets.json");
    touch(tmp.path(), "web/api/prod/api-web-datasources.json");
    tmp
}

#[test]
fn scan_collects_by_suffix_in_sorted_order() {
    let tmp = data_tree();
    let files = find_files(tmp.path(), TARGETS_SUFFIX).unwrap();
    let rel: Vec<_> = files
        .iter()
        .map(|f| f.strip_prefix(tmp.path()).unwrap().to_path_buf())
        .collect();
    assert_eq!(
        rel,
        vec![
            PathBuf::from("ops/billing/dev/billing-targets.json"),
            PathBuf::from("ops/billing/prod/billing-targets.json"),
            PathBuf::from("web/api/prod/api-targets.json"),
        ]
    );

    let sources = find_files(tmp.path(), JSONNET_SUFFIX).unwrap();
    assert_eq!(sources.len(), 1);
}

#[test]
fn team_app_env_scope_narrows_scan() {
    let tmp = data_tree();
    let scope = Scope {
        team: "ops".into(),
        env: "prod".into(),
        ..Scope::default()
    };
    let locator = Locator::new(Some(tmp.path().to_path_buf()), TARGETS_SUFFIX, scope);
    let files = locator.locate(&[], std::io::empty()).unwrap();
    assert_eq!(files.len(), 1);
    assert!(files[0].ends_with("ops/billing/prod/billing-targets.json"));
}

#[test]
fn explicit_filter_overrides_team() {
    let tmp = data_tree();
    let scope = Scope {
        team: "ops".into(),
        filter: Some("web/api/prod".into()),
        ..Scope::default()
    };
    let locator = Locator::new(Some(tmp.path().to_path_buf()), TARGETS_SUFFIX, scope);
    let files = locator.locate(&[], std::io::empty()).unwrap();
    assert_eq!(files.len(), 1);
    assert!(files[0].ends_with("web/api/prod/api-targets.json"));
}

#[test]
fn filter_with_no_hits_is_no_matches() {
    let tmp = data_tree();
    let scope = Scope {
        team: "nobody".into(),
        ..Scope::default()
    };
    let locator = Locator::new(Some(tmp.path().to_path_buf()), TARGETS_SUFFIX, scope);
    let err = locator.locate(&[], std::io::empty()).unwrap_err();
    match err {
        LocateError::NoMatches { filter, suffix, .. } => {
            assert_eq!(filter, "nobody/*/*");
            assert_eq!(suffix, TARGETS_SUFFIX);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn filter_also_applies_to_stdin_lists() {
    let tmp = data_tree();
    let listed = format!(
        "{}\n{}\n",
        tmp.path().join("ops/billing/prod/billing-targets.json").display(),
        tmp.path().join("web/api/prod/api-targets.json").display(),
    );
    let scope = Scope {
        app: "api".into(),
        ..Scope::default()
    };
    let locator = Locator::new(Some(tmp.path().to_path_buf()), TARGETS_SUFFIX, scope);
    let files = locator
        .locate(&["-".to_string()], listed.as_bytes())
        .unwrap();
    assert_eq!(files.len(), 1);
    assert!(files[0].ends_with("web/api/prod/api-targets.json"));
}

#[test]
fn relative_args_match_an_absolute_datadir() {
    let cwd = std::env::current_dir().unwrap();
    let scope = Scope {
        team: "ops".into(),
        ..Scope::default()
    };
    let locator = Locator::new(Some(cwd), TARGETS_SUFFIX, scope);
    let args = vec![
        "ops/billing/prod/billing-targets.json".to_string(),
        "web/api/prod/api-targets.json".to_string(),
    ];
    let files = locator.locate(&args, std::io::empty()).unwrap();
    assert_eq!(files, vec![PathBuf::from("ops/billing/prod/billing-targets.json")]);
}

#[test]
fn relative_stdin_list_matches_an_absolute_datadir() {
    let cwd = std::env::current_dir().unwrap();
    let scope = Scope {
        filter: Some("web/api/prod".into()),
        ..Scope::default()
    };
    let locator = Locator::new(Some(cwd), TARGETS_SUFFIX, scope);
    let listed = "ops/billing/prod/billing-targets.json\n./web/api/prod/api-targets.json\n";
    let files = locator
        .locate(&["-".to_string()], listed.as_bytes())
        .unwrap();
    assert_eq!(files, vec![PathBuf::from("./web/api/prod/api-targets.json")]);
}
