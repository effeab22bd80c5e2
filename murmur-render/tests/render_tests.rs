use std::fs;
use std::path::{Path, PathBuf};

use murmur_core::SystemRunner;
use murmur_render::{create_at, render_files, JsonnetOptions, RenderOutcome, ScaffoldScope};
use tempfile::TempDir;

#[test]
fn scaffold_then_locate_layout() {
    let data = TempDir::new().expect("datadir");
    let tmpl = data.path().join("tmpl");
    fs::create_dir_all(&tmpl).expect("mkdir tmpl");
    fs::write(
        tmpl.join("billing.jsonnet.tmpl"),
        "local team = '{{ TEAM }}';\n{ ['{{ APP }}-{{ ENV }}.json']: { team: team } }\n",
    )
    .expect("write template");

    let scope: ScaffoldScope = "ops/billing/prod".parse().expect("scope");
    let created = create_at(data.path(), &scope).expect("create");

    assert_eq!(created, data.path().join("ops/billing/prod/billing.jsonnet"));
    let body = fs::read_to_string(&created).expect("read");
    assert!(body.contains("local team = 'ops';"));
    assert!(body.contains("['billing-prod.json']"));
}

/// A stand-in engine: records its cwd and arguments, fails on `bad.jsonnet`.
#[cfg(unix)]
fn fake_engine(dir: &Path) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join("fake-jsonnet");
    fs::write(
        &path,
        "#!/bin/sh\n\
         for last in \"$@\"; do :; done\n\
         if [ \"$last\" = bad.jsonnet ]; then echo 'STATIC ERROR: bad' >&2; exit 1; fi\n\
         echo \"$PWD $*\" >> \"$LOG\"\n",
    )
    .expect("write engine");
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).expect("chmod");
    path
}

#[test]
#[cfg(unix)]
fn real_process_renders_in_source_dir() {
    let work = TempDir::new().expect("work");
    let src_dir = work.path().join("ops/billing/prod");
    fs::create_dir_all(&src_dir).expect("mkdir");
    let good = src_dir.join("billing.jsonnet");
    let bad = src_dir.join("bad.jsonnet");
    fs::write(&good, "{}").expect("write good");
    fs::write(&bad, "{").expect("write bad");

    let log = work.path().join("engine.log");
    std::env::set_var("LOG", &log);

    let mut opts = JsonnetOptions::new(None, Path::new("/out"), false);
    opts.program = fake_engine(work.path()).to_string_lossy().into_owned();

    let outcomes = render_files(&SystemRunner, &opts, &[bad.clone(), good.clone()]).expect("render");
    match &outcomes[0] {
        RenderOutcome::Failed { file, stderr } => {
            assert_eq!(file, &bad);
            assert!(stderr.contains("STATIC ERROR"));
        }
        other => panic!("expected failure, got {other:?}"),
    }
    assert!(matches!(outcomes[1], RenderOutcome::Rendered { .. }));

    let logged = fs::read_to_string(&log).expect("read log");
    assert!(logged.contains("-m /out billing.jsonnet"), "log: {logged}");
    assert!(logged.contains("ops/billing/prod"), "log: {logged}");
}
