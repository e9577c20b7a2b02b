// tests/run_events.rs

mod common;
use crate::common::builders::{ConfigFileBuilder, FakeResource};
use crate::common::fake_cvs::{cvs_checkout, track_dir, track_file, Harness};
use crate::common::{completed, init_tracing};

use cvskeeper::errors::KeeperError;
use cvskeeper::filter::ActionTag;
use cvskeeper::fs::mock::MockFileSystem;
use cvskeeper::handler::{CallbackOutcome, RunEventHandler, RunIdentity};

fn identity() -> RunIdentity {
    RunIdentity {
        node: Some("web01".to_string()),
    }
}

fn checkout() -> MockFileSystem {
    let fs = MockFileSystem::new();
    cvs_checkout(&fs, "/etc");
    fs
}

#[tokio::test]
async fn run_start_adds_and_commits_new_file() {
    init_tracing();
    let fs = checkout();
    fs.add_file("/etc/foo.conf", "key = value\n");
    let cfg = ConfigFileBuilder::new().build();
    let mut h = Harness::new(&cfg, fs, None);

    let resources = vec![FakeResource::file("/etc/foo.conf")];
    let report = completed(h.handler.on_run_start(&resources, identity()).await);

    assert_eq!(h.log.kinds(), vec!["add", "commit"]);
    assert_eq!(h.log.adds(), vec![vec!["foo.conf".to_string()]]);
    let commits = h.log.commits();
    assert_eq!(commits[0].0, vec!["foo.conf".to_string()]);
    assert_eq!(commits[0].1, "- Initial add from automated run on web01");
    assert_eq!(report.files_added, vec!["foo.conf".to_string()]);
    assert!(report.committed.is_empty());
}

#[tokio::test]
async fn run_completion_commits_updated_tracked_file() {
    init_tracing();
    let fs = checkout();
    fs.add_file("/etc/bar.conf", "old\n");
    track_file(&fs, "/etc/bar.conf");
    let cfg = ConfigFileBuilder::new().build();
    let mut h = Harness::new(&cfg, fs, None);

    let before = vec![FakeResource::file("/etc/bar.conf")];
    h.handler.on_run_start(&before, identity()).await;
    h.log.clear();

    let after = vec![FakeResource::file("/etc/bar.conf").updated(true)];
    let report = completed(h.handler.on_run_complete(&after).await);

    assert_eq!(h.log.count("add"), 0);
    let commits = h.log.commits();
    assert_eq!(commits.len(), 1);
    assert_eq!(commits[0].0, vec!["bar.conf".to_string()]);
    assert_eq!(commits[0].1, "- Changes after automated run on web01");
    assert_eq!(report.committed, vec!["bar.conf".to_string()]);
    assert!(!h.handler.has_active_run());
}

#[tokio::test]
async fn run_start_snapshots_tracked_files_as_before() {
    let fs = checkout();
    fs.add_file("/etc/hosts", "127.0.0.1 localhost\n");
    track_file(&fs, "/etc/hosts");
    let cfg = ConfigFileBuilder::new().build();
    let mut h = Harness::new(&cfg, fs, Some("alice"));

    let resources = vec![FakeResource::file("/etc/hosts")];
    completed(h.handler.on_run_start(&resources, identity()).await);

    assert_eq!(h.log.kinds(), vec!["status", "commit"]);
    assert_eq!(
        h.log.commits()[0].1,
        "- Changes before automated run on web01 (on behalf of alice)"
    );
}

#[tokio::test]
async fn excluded_paths_never_reach_cvs() {
    let fs = checkout();
    fs.add_file("/etc/ldap.secret", "hunter2\n");
    fs.add_file("/etc/motd", "hi\n");
    let cfg = ConfigFileBuilder::new().exclude("/etc/*.secret").build();
    let mut h = Harness::new(&cfg, fs, None);

    let start = vec![
        FakeResource::file("/etc/ldap.secret"),
        FakeResource::file("/etc/motd"),
    ];
    h.handler.on_run_start(&start, identity()).await;
    let end = vec![
        FakeResource::file("/etc/ldap.secret").updated(true),
        FakeResource::file("/etc/motd").updated(true),
    ];
    h.handler.on_run_complete(&end).await;

    let paths = h.log.all_paths();
    assert!(paths.iter().any(|p| p == "motd"));
    assert!(!paths.iter().any(|p| p.contains("ldap.secret")));
}

#[tokio::test]
async fn nested_directories_are_added_outermost_first_once() {
    let fs = checkout();
    fs.add_file("/etc/app/conf.d/a.conf", "a\n");
    fs.add_file("/etc/app/conf.d/b.conf", "b\n");
    let cfg = ConfigFileBuilder::new().build();
    let mut h = Harness::new(&cfg, fs, None);

    let resources = vec![
        FakeResource::file("/etc/app/conf.d/a.conf"),
        FakeResource::file("/etc/app/conf.d/b.conf"),
    ];
    let report = completed(h.handler.on_run_start(&resources, identity()).await);

    assert_eq!(h.log.kinds(), vec!["add", "status", "add", "commit"]);
    let adds = h.log.adds();
    assert_eq!(adds[0], vec!["app".to_string(), "app/conf.d".to_string()]);
    assert_eq!(
        adds[1],
        vec!["app/conf.d/a.conf".to_string(), "app/conf.d/b.conf".to_string()]
    );
    // The refresh query is issued bare.
    assert!(h.log.ops()[1].paths().is_empty());
    assert_eq!(report.dirs_added.len(), 2);
}

#[tokio::test]
async fn already_tracked_directories_are_not_re_added() {
    let fs = checkout();
    fs.add_file("/etc/ssh/sshd_config", "Port 22\n");
    track_dir(&fs, "/etc/ssh");
    let cfg = ConfigFileBuilder::new().build();
    let mut h = Harness::new(&cfg, fs, None);

    let resources = vec![FakeResource::file("/etc/ssh/sshd_config")];
    h.handler.on_run_start(&resources, identity()).await;

    assert_eq!(h.log.adds(), vec![vec!["ssh/sshd_config".to_string()]]);
}

#[tokio::test]
async fn second_reconcile_issues_no_adds() {
    let fs = checkout();
    fs.add_file("/etc/app/app.conf", "x\n");
    fs.add_file("/etc/motd", "hi\n");
    let cfg = ConfigFileBuilder::new().build();
    let mut h = Harness::new(&cfg, fs, None);
    let resources = vec![
        FakeResource::file("/etc/app/app.conf"),
        FakeResource::file("/etc/motd"),
    ];

    h.handler.on_run_start(&resources, identity()).await;
    assert!(h.log.count("add") > 0);
    h.log.clear();

    let report = completed(h.handler.on_run_start(&resources, identity()).await);
    assert_eq!(h.log.count("add"), 0);
    assert!(report.files_added.is_empty());
    assert!(report.dirs_added.is_empty());
    assert_eq!(h.log.count("commit"), 1);
}

#[tokio::test]
async fn new_file_at_completion_is_added_under_new_files_message() {
    let fs = checkout();
    let cfg = ConfigFileBuilder::new().build();
    let mut h = Harness::new(&cfg, fs.clone(), None);

    let start = vec![FakeResource::file("/etc/new.conf")];
    // The file does not exist yet when the run starts.
    completed(h.handler.on_run_start(&start, identity()).await);
    assert!(h.log.ops().is_empty());

    fs.add_file("/etc/new.conf", "created by run\n");
    let end = vec![FakeResource::file("/etc/new.conf").updated(true)];
    let report = completed(h.handler.on_run_complete(&end).await);

    assert_eq!(h.log.kinds(), vec!["add", "commit"]);
    assert_eq!(
        h.log.commits()[0].1,
        "- New files added after automated run on web01"
    );
    assert_eq!(report.files_added, vec!["new.conf".to_string()]);
    assert!(report.committed.is_empty());
}

#[tokio::test]
async fn resource_summary_is_appended_when_enabled() {
    let fs = checkout();
    fs.add_file("/etc/bar.conf", "x\n");
    track_file(&fs, "/etc/bar.conf");
    let cfg = ConfigFileBuilder::new().updated_resources(true).build();
    let mut h = Harness::new(&cfg, fs, Some("alice"));

    let start = vec![FakeResource::file("/etc/bar.conf")];
    h.handler.on_run_start(&start, identity()).await;
    h.log.clear();

    let end = vec![
        FakeResource::file("/etc/bar.conf")
            .named("template[/etc/bar.conf]")
            .updated(true),
        FakeResource::pathless("service[sshd]").updated(true),
        FakeResource::file("/etc/untouched.conf"),
    ];
    h.handler.on_run_complete(&end).await;

    assert_eq!(
        h.log.commits()[0].1,
        "- Changes after automated run on web01 (on behalf of alice)\n\n\
         Updated resources:\n\
         * template[/etc/bar.conf]\n\
         * service[sshd]"
    );
}

#[tokio::test]
async fn not_a_checkout_disables_both_callbacks() {
    let fs = MockFileSystem::new();
    fs.add_file("/etc/foo.conf", "x\n");
    let cfg = ConfigFileBuilder::new().build();
    let mut h = Harness::new(&cfg, fs, None);

    let resources = vec![FakeResource::file("/etc/foo.conf").updated(true)];
    let start = h.handler.on_run_start(&resources, identity()).await;
    let end = h.handler.on_run_complete(&resources).await;

    assert!(matches!(start, CallbackOutcome::Skipped));
    assert!(matches!(end, CallbackOutcome::Skipped));
    assert!(h.log.ops().is_empty());
}

#[tokio::test]
async fn completion_without_start_is_a_noop() {
    let fs = checkout();
    fs.add_file("/etc/foo.conf", "x\n");
    let cfg = ConfigFileBuilder::new().build();
    let mut h = Harness::new(&cfg, fs, None);

    let resources = vec![FakeResource::file("/etc/foo.conf").updated(true)];
    let end = h.handler.on_run_complete(&resources).await;

    assert!(matches!(end, CallbackOutcome::Skipped));
    assert!(h.log.ops().is_empty());
}

#[tokio::test]
async fn symlinks_vanished_files_and_deletes_are_ignored() {
    let fs = checkout();
    fs.add_file("/etc/real.conf", "x\n");
    track_file(&fs, "/etc/real.conf");
    fs.add_symlink("/etc/link.conf", "/etc/real.conf");
    let cfg = ConfigFileBuilder::new().build();
    let mut h = Harness::new(&cfg, fs, None);

    let resources = vec![
        FakeResource::file("/etc/link.conf").updated(true),
        FakeResource::file("/etc/gone.conf").updated(true),
        FakeResource::file("/etc/real.conf")
            .action(ActionTag::List(vec![ActionTag::name("delete")]))
            .updated(true),
    ];
    h.handler.on_run_start(&resources, identity()).await;
    h.handler.on_run_complete(&resources).await;

    assert!(h.log.ops().is_empty());
}

#[tokio::test]
async fn skip_predicate_is_consulted_once_per_callback() {
    let fs = checkout();
    fs.add_file("/etc/guarded.conf", "x\n");
    let cfg = ConfigFileBuilder::new().build();
    let mut h = Harness::new(&cfg, fs, None);

    let guarded = FakeResource::file("/etc/guarded.conf").skipped();
    let resources = vec![guarded.clone()];
    h.handler.on_run_start(&resources, identity()).await;

    assert_eq!(guarded.skip_checks(), 1);
    assert!(h.log.ops().is_empty());
}

#[tokio::test]
async fn drift_is_reported_but_not_enforced() {
    let fs = checkout();
    fs.add_file("/etc/hosts", "x\n");
    track_file(&fs, "/etc/hosts");
    let cfg = ConfigFileBuilder::new().build();
    let mut h = Harness::with_cvs(&cfg, fs, None, |sim| {
        sim.with_status_output("File: hosts            \tStatus: Needs Merge\n")
    });

    let resources = vec![FakeResource::file("/etc/hosts")];
    let report = completed(h.handler.on_run_start(&resources, identity()).await);

    assert_eq!(report.drifted, vec!["hosts".to_string()]);
    assert_eq!(report.committed, vec!["hosts".to_string()]);
}

#[tokio::test]
async fn cvs_failures_are_contained_in_the_callback() {
    let fs = checkout();
    fs.add_file("/etc/foo.conf", "x\n");
    let cfg = ConfigFileBuilder::new().build();
    let mut h = Harness::with_cvs(&cfg, fs, None, |sim| sim.failing_on("commit"));

    let resources = vec![FakeResource::file("/etc/foo.conf").updated(true)];
    let start = h.handler.on_run_start(&resources, identity()).await;

    match start {
        CallbackOutcome::Failed(KeeperError::VcsCommand { stderr, .. }) => {
            assert!(stderr.contains("simulated failure"));
        }
        other => panic!("expected VcsCommand failure, got {other:?}"),
    }
    // The run context survives a failed start, so completion still runs.
    assert!(h.handler.has_active_run());
    let end = h.handler.on_run_complete(&resources).await;
    assert!(end.is_failed());
}

#[tokio::test]
async fn parent_dir_components_cannot_escape_the_root() {
    let fs = checkout();
    fs.add_file("/root/.ssh/authorized_keys", "ssh-ed25519 AAAA\n");
    let cfg = ConfigFileBuilder::new().build();
    let mut h = Harness::new(&cfg, fs, None);

    let resources = vec![
        FakeResource::file("/etc/../root/.ssh/authorized_keys").updated(true),
        FakeResource::file("/etc/ssh/../../root/.profile").updated(true),
    ];
    let start = h.handler.on_run_start(&resources, identity()).await;
    let end = h.handler.on_run_complete(&resources).await;

    assert!(completed(start).is_noop());
    assert!(matches!(end, CallbackOutcome::Skipped));
    assert!(h.log.ops().is_empty());
}

#[tokio::test]
async fn new_file_at_completion_carries_resource_summary() {
    let fs = checkout();
    let cfg = ConfigFileBuilder::new().updated_resources(true).build();
    let mut h = Harness::new(&cfg, fs.clone(), Some("alice"));

    let start = vec![FakeResource::file("/etc/new.conf")];
    completed(h.handler.on_run_start(&start, identity()).await);

    fs.add_file("/etc/new.conf", "created by run\n");
    let end = vec![
        FakeResource::file("/etc/new.conf")
            .named("template[/etc/new.conf]")
            .updated(true),
        FakeResource::pathless("service[nginx]").updated(true),
    ];
    completed(h.handler.on_run_complete(&end).await);

    let commits = h.log.commits();
    assert_eq!(commits.len(), 1);
    assert_eq!(commits[0].0, vec!["new.conf".to_string()]);
    assert_eq!(
        commits[0].1,
        "- New files added after automated run on web01 (on behalf of alice)\n\n\
         Updated resources:\n\
         * template[/etc/new.conf]\n\
         * service[nginx]"
    );
}
