#![allow(dead_code)]

use async_trait::async_trait;
use gitpanel::GitResult;
use gitpanel::git::{CommandOutput, CommandRunner};
use gitpanel::github::{BranchLister, GitHubError};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Mutex;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

/// Run git in `dir` and return trimmed stdout, panicking on failure
pub fn git(dir: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .expect("Failed to run git");
    assert!(
        output.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

/// Helper to create a test git repository on `main` with one commit
pub fn create_test_repo() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let repo_path = temp_dir.path().join("work");
    fs::create_dir(&repo_path).expect("Failed to create work dir");

    git(&repo_path, &["init"]);
    git(&repo_path, &["symbolic-ref", "HEAD", "refs/heads/main"]);
    git(&repo_path, &["config", "user.name", "Test User"]);
    git(&repo_path, &["config", "user.email", "test@example.com"]);
    git(&repo_path, &["config", "commit.gpgsign", "false"]);

    create_commit(&repo_path, "README.md", "# test\n", "Initial commit");

    (temp_dir, repo_path)
}

/// Like [`create_test_repo`], with a bare `origin` that already has `main`
pub fn create_test_repo_with_origin() -> (TempDir, PathBuf, PathBuf) {
    let (temp_dir, repo_path) = create_test_repo();
    let origin = temp_dir.path().join("origin.git");

    git(temp_dir.path(), &["init", "--bare", "origin.git"]);
    git(&origin, &["symbolic-ref", "HEAD", "refs/heads/main"]);
    git(&repo_path, &["remote", "add", "origin", origin.to_str().unwrap()]);
    git(&repo_path, &["push", "origin", "main"]);

    (temp_dir, repo_path, origin)
}

/// Helper to create a commit
pub fn create_commit(repo_path: &Path, file: &str, content: &str, message: &str) {
    fs::write(repo_path.join(file), content).expect("Failed to write file");
    git(repo_path, &["add", file]);
    git(repo_path, &["commit", "-m", message]);
}

/// Runner that records every argv and answers from a script.
///
/// A scripted answer applies to any invocation whose args start with its
/// prefix; unscripted commands succeed with empty output.
#[derive(Default)]
pub struct FakeRunner {
    calls: Mutex<Vec<Vec<String>>>,
    script: Vec<(Vec<String>, CommandOutput)>,
}

impl FakeRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(mut self, prefix: &[&str], stdout: &str, success: bool) -> Self {
        let output = CommandOutput {
            stdout: stdout.to_string(),
            stderr: if success { String::new() } else { "error: scripted failure".to_string() },
            exit_code: if success { 0 } else { 1 },
            success,
        };
        self.script
            .push((prefix.iter().map(|s| s.to_string()).collect(), output));
        self
    }

    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().unwrap().clone()
    }

    /// Every recorded call joined with spaces
    pub fn commands(&self) -> Vec<String> {
        self.calls().iter().map(|args| args.join(" ")).collect()
    }

    pub fn ran(&self, command: &str) -> bool {
        self.commands().iter().any(|c| c == command)
    }
}

#[async_trait]
impl CommandRunner for FakeRunner {
    async fn run(&self, args: &[String], _cancel: &CancellationToken) -> GitResult<CommandOutput> {
        self.calls.lock().unwrap().push(args.to_vec());

        let scripted = self
            .script
            .iter()
            .find(|(prefix, _)| args.starts_with(prefix))
            .map(|(_, output)| output.clone());

        Ok(scripted.unwrap_or(CommandOutput {
            success: true,
            ..Default::default()
        }))
    }
}

/// Branch source answering with a fixed list
pub struct FakeLister {
    names: Vec<String>,
    calls: Mutex<usize>,
}

impl FakeLister {
    pub fn new(names: &[&str]) -> Self {
        Self {
            names: names.iter().map(|s| s.to_string()).collect(),
            calls: Mutex::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

#[async_trait]
impl BranchLister for FakeLister {
    async fn list_branches(&self) -> Result<Vec<String>, GitHubError> {
        *self.calls.lock().unwrap() += 1;
        Ok(self.names.clone())
    }
}

/// Branch source that always fails with an HTTP status
pub struct FailingLister;

#[async_trait]
impl BranchLister for FailingLister {
    async fn list_branches(&self) -> Result<Vec<String>, GitHubError> {
        Err(GitHubError::Status {
            status: 503,
            message: "unavailable".to_string(),
        })
    }
}
