//! Pipelines for every git operation the panel offers.
//!
//! Each function is pure: it only assembles argument vectors and failure
//! policies. Branch names are expected to be validated by the caller.

use crate::git::pipeline::{Pipeline, Step};

/// Stash message prefix used to park changes on the branch they were made on
pub const PARK_MARKER: &str = "gitpanel-parked:";

/// A commit summary plus an optional multi-line description
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitMessage {
    pub summary: String,
    pub description: String,
}

impl CommitMessage {
    pub fn new(summary: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            summary: summary.into(),
            description: description.into(),
        }
    }

    /// A message without a summary cannot be committed
    pub fn has_summary(&self) -> bool {
        !self.summary.trim().is_empty()
    }

    /// One `-m` for the summary, then one per non-blank description line
    pub fn to_args(&self) -> Vec<String> {
        let mut args = vec!["-m".to_string(), self.summary.trim().to_string()];
        for line in self.description.lines() {
            if line.trim().is_empty() {
                continue;
            }
            args.push("-m".to_string());
            args.push(line.trim_end().to_string());
        }
        args
    }
}

/// Message given to a stash that parks work on `branch`
pub fn park_message(branch: &str) -> String {
    format!("{}{}", PARK_MARKER, branch)
}

pub fn checkout(branch: &str) -> Pipeline {
    Pipeline::new(format!("Checkout {}", branch)).then(Step::new(["checkout", branch]))
}

/// Stage everything, commit, push. Every step runs even if an earlier one fails.
pub fn commit_and_push(remote: &str, branch: &str, message: &CommitMessage) -> Pipeline {
    let mut commit = vec!["commit".to_string()];
    commit.extend(message.to_args());

    Pipeline::new(format!("Commit & push to {}", branch))
        .then(Step::new(["add", "."]))
        .then(Step::new(commit))
        .then(Step::new(["push", remote, branch]))
}

pub fn fetch_and_pull(remote: &str, branch: &str) -> Pipeline {
    Pipeline::new(format!("Fetch & pull {}", branch))
        .then(Step::new(["fetch", remote, branch]))
        .then(Step::new(["pull", remote, branch]))
}

/// Create a local branch and publish it
pub fn create_branch(remote: &str, branch: &str) -> Pipeline {
    Pipeline::new(format!("Add branch {}", branch))
        .then(Step::new(["branch", branch]))
        .then(Step::new(["push", remote, branch]))
}

/// Delete a branch locally, then on the remote only if the local delete worked.
/// `-d` refuses to drop unmerged work.
pub fn delete_branch(remote: &str, branch: &str) -> Pipeline {
    Pipeline::new(format!("Remove branch {}", branch))
        .then(Step::new(["branch", "-d", branch]).abort_on_failure())
        .then(Step::new(["push", remote, "--delete", branch]))
}

/// Stage everything and report the staged name-status diff as the last step's stdout
pub fn detect_changes() -> Pipeline {
    Pipeline::new("Get changes")
        .then(Step::new(["add", "."]))
        .then(Step::new([
            "--no-pager",
            "diff",
            "--cached",
            "--no-renames",
            "--name-status",
        ]))
}

/// Staged then unstaged name-status; any stdout at all means pending changes
pub fn pending_changes_probe() -> Pipeline {
    Pipeline::new("Check for local changes")
        .then(Step::new([
            "--no-pager",
            "diff",
            "--cached",
            "--no-renames",
            "--name-status",
        ]))
        .then(Step::new(["--no-pager", "diff", "--no-renames", "--name-status"]))
}

/// Carry uncommitted work over to `target`
pub fn bring_changes(target: &str) -> Pipeline {
    Pipeline::new(format!("Bring changes to {}", target))
        .then(Step::new(["stash"]))
        .then(Step::new(["checkout", target]))
        .then(Step::new(["stash", "apply"]))
}

/// Park uncommitted work under a marker for `current`, then switch to `target`
pub fn leave_changes(current: &str, target: &str) -> Pipeline {
    let message = park_message(current);
    Pipeline::new(format!("Leave changes on {}", current))
        .then(
            Step::new(["stash", "push", "--include-untracked", "-m", message.as_str()])
                .abort_on_failure(),
        )
        .then(Step::new(["checkout", target]))
}

/// Pop a stash created by [`leave_changes`]
pub fn restore_parked(stash_index: &str) -> Pipeline {
    Pipeline::new("Restore parked changes").then(Step::new(["stash", "pop", stash_index]))
}

pub fn list_stashes() -> Pipeline {
    Pipeline::new("List stashes").then(Step::new(["stash", "list", "--format=%gd%x00%s"]))
}

pub fn current_branch() -> Pipeline {
    Pipeline::new("Current branch").then(Step::new(["branch", "--show-current"]))
}

pub fn remote_url(remote: &str) -> Pipeline {
    Pipeline::new("Remote URL").then(Step::new(["remote", "get-url", remote]))
}
