mod helpers;

use gitpanel::AppError;
use gitpanel::git::{CommitMessage, Repository};
use gitpanel::session::{
    Action, CheckoutOutcome, OperationError, PendingSwitch, Session, SwitchResolution, TaskOutput,
};
use helpers::{FailingLister, FakeLister, FakeRunner};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

fn session_with(runner: FakeRunner, lister: FakeLister) -> (Session, Arc<FakeRunner>, Arc<FakeLister>) {
    let runner = Arc::new(runner);
    let lister = Arc::new(lister);
    let repo = Repository::with_runner("/tmp/unused", runner.clone());
    let session = Session::new(Arc::new(repo), lister.clone());
    (session, runner, lister)
}

fn dirty_runner() -> FakeRunner {
    FakeRunner::new()
        .respond(&["--no-pager", "diff", "--cached"], "", true)
        .respond(&["--no-pager", "diff"], "M\tsrc/lib.rs\n", true)
        .respond(&["branch", "--show-current"], "main\n", true)
}

#[tokio::test]
async fn test_refused_operations_run_no_git() {
    let (mut session, runner, _) = session_with(FakeRunner::new(), FakeLister::new(&["main"]));
    let cancel = CancellationToken::new();

    let err = session.fetch_and_pull(&cancel).await.unwrap_err();
    assert!(matches!(err, AppError::Operation(OperationError::NoBranchSelected)));

    let err = session
        .commit_and_push(&CommitMessage::new("work", ""), &cancel)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Operation(OperationError::NoLocalChanges)));

    let err = session.add_branch("bad..name", &cancel).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    assert!(runner.calls().is_empty());
}

#[tokio::test]
async fn test_refresh_is_idempotent() {
    let (mut session, _, lister) = session_with(
        FakeRunner::new().respond(&["branch", "--show-current"], "dev\n", true),
        FakeLister::new(&["main", "dev", "feature/x"]),
    );
    let cancel = CancellationToken::new();

    let first = session.refresh_branches(&cancel).await.unwrap().to_vec();
    let second = session.refresh_branches(&cancel).await.unwrap().to_vec();

    assert_eq!(first, vec!["main", "dev", "feature/x"]);
    assert_eq!(first, second);
    assert_eq!(lister.calls(), 2);
    assert_eq!(session.selected(), Some("dev"));
}

#[tokio::test]
async fn test_failed_refresh_keeps_old_list() {
    let runner = Arc::new(FakeRunner::new());
    let repo = Repository::with_runner("/tmp/unused", runner.clone());
    let mut session = Session::new(Arc::new(repo), Arc::new(FailingLister));
    session.apply(TaskOutput::Branches {
        names: vec!["main".to_string()],
        current: None,
    });

    let err = session.refresh_branches(&CancellationToken::new()).await.unwrap_err();

    assert!(matches!(err, AppError::GitHub(_)));
    assert_eq!(session.branches(), ["main".to_string()]);
}

#[tokio::test]
async fn test_selection_falls_back_when_branch_disappears() {
    let (mut session, _, _) = session_with(FakeRunner::new(), FakeLister::new(&["main", "dev"]));
    session.select("gone");

    session.refresh_branches(&CancellationToken::new()).await.unwrap();

    assert_eq!(session.selected(), Some("main"));
}

#[tokio::test]
async fn test_get_changes_stages_then_classifies() {
    let (mut session, runner, _) = session_with(
        FakeRunner::new().respond(
            &["--no-pager", "diff", "--cached"],
            "A\tnew.txt\nM\tsrc/main.rs\nD\told.txt\n",
            true,
        ),
        FakeLister::new(&[]),
    );

    let report = session.get_changes(&CancellationToken::new()).await.unwrap();

    assert!(report.succeeded());
    assert_eq!(runner.commands()[0], "add .");
    assert_eq!(session.changes().added, vec!["new.txt"]);
    assert_eq!(session.changes().modified, vec!["src/main.rs"]);
    assert_eq!(session.changes().deleted, vec!["old.txt"]);
}

#[tokio::test]
async fn test_commit_runs_add_commit_push_in_order() {
    let (mut session, runner, _) = session_with(
        FakeRunner::new().respond(&["--no-pager", "diff", "--cached"], "M\ta.txt\n", true),
        FakeLister::new(&[]),
    );
    let cancel = CancellationToken::new();
    session.select("main");
    session.get_changes(&cancel).await.unwrap();
    let before = runner.calls().len();

    let report = session
        .commit_and_push(&CommitMessage::new("Fix bug", "first\n\nsecond"), &cancel)
        .await
        .unwrap();

    assert!(report.succeeded());
    assert_eq!(
        runner.commands()[before..],
        [
            "add .",
            "commit -m Fix bug -m first -m second",
            "push origin main",
        ]
    );
    assert!(session.changes().is_empty());
}

#[tokio::test]
async fn test_commit_failure_still_attempts_push() {
    let (mut session, runner, _) = session_with(
        FakeRunner::new()
            .respond(&["--no-pager", "diff", "--cached"], "M\ta.txt\n", true)
            .respond(&["commit"], "", false),
        FakeLister::new(&[]),
    );
    let cancel = CancellationToken::new();
    session.select("main");
    session.get_changes(&cancel).await.unwrap();

    let report = session
        .commit_and_push(&CommitMessage::new("Fix", ""), &cancel)
        .await
        .unwrap();

    assert!(!report.succeeded());
    assert_eq!(report.outcomes.len(), 3);
    assert!(runner.ran("push origin main"));
}

#[tokio::test]
async fn test_fetch_and_pull_uses_selected_branch() {
    let (mut session, runner, _) = session_with(FakeRunner::new(), FakeLister::new(&[]));
    session.select("dev");

    session.fetch_and_pull(&CancellationToken::new()).await.unwrap();

    assert_eq!(runner.commands(), ["fetch origin dev", "pull origin dev"]);
}

#[tokio::test]
async fn test_delete_stops_after_local_failure() {
    let (mut session, runner, lister) = session_with(
        FakeRunner::new().respond(&["branch", "-d"], "", false),
        FakeLister::new(&["main", "feature"]),
    );

    let report = session
        .remove_branch("feature", &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(report.outcomes.len(), 1);
    assert_eq!(report.aborted_at, Some(0));
    assert_eq!(report.skipped, ["git push origin --delete feature"]);
    assert!(!runner.ran("push origin --delete feature"));
    assert_eq!(lister.calls(), 1);
}

#[tokio::test]
async fn test_add_branch_publishes_and_refreshes() {
    let (mut session, runner, lister) =
        session_with(FakeRunner::new(), FakeLister::new(&["main", "topic"]));

    session.add_branch("topic", &CancellationToken::new()).await.unwrap();

    assert_eq!(runner.commands(), ["branch topic", "push origin topic"]);
    assert_eq!(lister.calls(), 1);
    assert_eq!(session.branches(), ["main".to_string(), "topic".to_string()]);
}

#[tokio::test]
async fn test_clean_checkout_switches_immediately() {
    let (mut session, runner, _) = session_with(FakeRunner::new(), FakeLister::new(&[]));
    session.select("main");

    let outcome = session
        .request_checkout("dev", &CancellationToken::new())
        .await
        .unwrap();

    assert!(matches!(outcome, CheckoutOutcome::CheckedOut(_)));
    assert!(runner.ran("checkout dev"));
    assert_eq!(session.selected(), Some("dev"));
}

#[tokio::test]
async fn test_checkout_of_head_branch_is_noop_even_when_selection_differs() {
    let (mut session, runner, _) = session_with(
        FakeRunner::new().respond(&["branch", "--show-current"], "wip\n", true),
        FakeLister::new(&[]),
    );
    session.select("main");

    let outcome = session
        .request_checkout("wip", &CancellationToken::new())
        .await
        .unwrap();

    assert!(matches!(outcome, CheckoutOutcome::AlreadySelected));
    assert_eq!(runner.commands(), ["branch --show-current"]);
    assert_eq!(session.selected(), Some("wip"));
}

#[tokio::test]
async fn test_checkout_of_selected_branch_runs_when_head_elsewhere() {
    let (mut session, runner, _) = session_with(
        FakeRunner::new().respond(&["branch", "--show-current"], "wip\n", true),
        FakeLister::new(&[]),
    );
    session.select("main");

    let outcome = session
        .request_checkout("main", &CancellationToken::new())
        .await
        .unwrap();

    assert!(matches!(outcome, CheckoutOutcome::CheckedOut(_)));
    assert!(runner.ran("checkout main"));
    assert_eq!(session.selected(), Some("main"));
}

#[tokio::test]
async fn test_pending_switch_names_head_not_selection() {
    let (mut session, _, _) = session_with(
        FakeRunner::new()
            .respond(&["--no-pager", "diff", "--cached"], "M\tREADME.md\n", true)
            .respond(&["branch", "--show-current"], "wip\n", true),
        FakeLister::new(&[]),
    );
    session.select("main");

    let outcome = session
        .request_checkout("dev", &CancellationToken::new())
        .await
        .unwrap();

    let CheckoutOutcome::NeedsConfirmation(switch) = outcome else {
        panic!("expected a pending switch");
    };
    assert_eq!(switch.from, "wip");
    assert_eq!(switch.to, "dev");
}

#[tokio::test]
async fn test_detached_head_falls_back_to_selection() {
    let (mut session, _, _) = session_with(
        FakeRunner::new().respond(&["--no-pager", "diff", "--cached"], "M\tREADME.md\n", true),
        FakeLister::new(&[]),
    );
    session.select("main");

    let outcome = session
        .request_checkout("dev", &CancellationToken::new())
        .await
        .unwrap();

    assert!(matches!(outcome, CheckoutOutcome::NeedsConfirmation(ref s) if s.from == "main"));
}

#[tokio::test]
async fn test_dirty_checkout_waits_for_decision() {
    let (mut session, runner, _) = session_with(dirty_runner(), FakeLister::new(&[]));
    session.select("main");
    let cancel = CancellationToken::new();

    let outcome = session.request_checkout("dev", &cancel).await.unwrap();

    let expected = PendingSwitch {
        from: "main".to_string(),
        to: "dev".to_string(),
    };
    assert!(matches!(outcome, CheckoutOutcome::NeedsConfirmation(ref s) if *s == expected));
    assert_eq!(session.pending_switch(), Some(&expected));
    assert!(!runner.ran("checkout dev"));
    assert_eq!(session.selected(), Some("main"));

    let before = runner.calls().len();
    let reports = session.resolve_switch(SwitchResolution::Cancel, &cancel).await.unwrap();
    assert!(reports.is_empty());
    assert_eq!(runner.calls().len(), before);
    assert!(session.pending_switch().is_none());
    assert_eq!(session.selected(), Some("main"));
}

#[tokio::test]
async fn test_bring_stashes_switches_and_applies() {
    let (mut session, runner, _) = session_with(dirty_runner(), FakeLister::new(&[]));
    session.select("main");
    let cancel = CancellationToken::new();
    session.request_checkout("dev", &cancel).await.unwrap();
    let before = runner.calls().len();

    session.resolve_switch(SwitchResolution::Bring, &cancel).await.unwrap();

    assert_eq!(runner.commands()[before..], ["stash", "checkout dev", "stash apply"]);
    assert_eq!(session.selected(), Some("dev"));
}

#[tokio::test]
async fn test_leave_parks_changes_under_source_branch() {
    let (mut session, runner, _) = session_with(dirty_runner(), FakeLister::new(&[]));
    session.select("main");
    let cancel = CancellationToken::new();
    session.request_checkout("dev", &cancel).await.unwrap();
    let before = runner.calls().len();

    session.resolve_switch(SwitchResolution::Leave, &cancel).await.unwrap();

    let commands = runner.commands();
    assert_eq!(
        commands[before],
        "stash push --include-untracked -m gitpanel-parked:main"
    );
    assert_eq!(commands[before + 1], "checkout dev");
    assert_eq!(session.selected(), Some("dev"));
}

#[tokio::test]
async fn test_failed_checkout_after_park_pops_work_back() {
    let (mut session, runner, _) = session_with(
        dirty_runner()
            .respond(&["checkout"], "", false)
            .respond(
                &["stash", "list"],
                "stash@{0}\0On main: gitpanel-parked:main\n",
                true,
            ),
        FakeLister::new(&[]),
    );
    session.select("main");
    let cancel = CancellationToken::new();
    session.request_checkout("ghost", &cancel).await.unwrap();
    let before = runner.calls().len();

    let reports = session.resolve_switch(SwitchResolution::Leave, &cancel).await.unwrap();

    assert_eq!(reports.len(), 2);
    assert!(!reports[0].succeeded());
    assert_eq!(
        runner.commands()[before..],
        [
            "stash push --include-untracked -m gitpanel-parked:main",
            "checkout ghost",
            "stash list --format=%gd%x00%s",
            "stash pop stash@{0}",
        ]
    );
    assert_eq!(session.selected(), Some("main"));
}

#[tokio::test]
async fn test_failed_park_keeps_branch() {
    let (mut session, runner, _) = session_with(
        dirty_runner().respond(&["stash", "push"], "", false),
        FakeLister::new(&[]),
    );
    session.select("main");
    let cancel = CancellationToken::new();
    session.request_checkout("dev", &cancel).await.unwrap();

    let reports = session.resolve_switch(SwitchResolution::Leave, &cancel).await.unwrap();

    assert!(!reports[0].succeeded());
    assert!(!runner.ran("checkout dev"));
    assert_eq!(session.selected(), Some("main"));
}

#[tokio::test]
async fn test_completed_task_replaces_branch_list() {
    let (mut session, _, _) = session_with(FakeRunner::new(), FakeLister::new(&[]));
    session.select("main");

    let reports = session.apply(TaskOutput::Completed {
        action: Action::FetchAndPull,
        reports: Vec::new(),
        branches: Some(vec!["main".to_string(), "dev".to_string()]),
    });

    assert!(reports.is_empty());
    assert_eq!(session.branches().len(), 2);
    assert_eq!(session.selected(), Some("main"));
}
