use crate::audit::AuditLogger;
use crate::error::{GitError, GitResult};
use crate::git::executor::{CommandRunner, GitExecutor};
use crate::git::operations;
use crate::git::parser::{self, ChangeSet, StashEntry};
use crate::git::pipeline::{self, Pipeline, PipelineReport};
use std::env;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

const DEFAULT_REMOTE: &str = "origin";

/// A git working tree plus the runner used to drive it
#[derive(Clone)]
pub struct Repository {
    path: PathBuf,
    runner: Arc<dyn CommandRunner>,
    remote: String,
    audit: Option<AuditLogger>,
}

impl fmt::Debug for Repository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Repository")
            .field("path", &self.path)
            .field("remote", &self.remote)
            .field("audit", &self.audit.is_some())
            .finish()
    }
}

impl Repository {
    /// Detect git repository from current working directory
    pub fn discover() -> GitResult<Self> {
        let current_dir = env::current_dir().map_err(GitError::IoError)?;
        Self::discover_from(&current_dir)
    }

    /// Detect git repository starting from a specific directory
    pub fn discover_from<P: AsRef<Path>>(start_path: P) -> GitResult<Self> {
        let mut current = start_path.as_ref().to_path_buf();

        loop {
            // `.git` is a directory in a normal clone and a file in a worktree
            if current.join(".git").exists() {
                return Ok(Self::new(current));
            }

            if !current.pop() {
                return Err(GitError::NotARepository);
            }
        }
    }

    /// Create a Repository for a known working tree, driven by the real git binary
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let runner = Arc::new(GitExecutor::new(&path));
        Self::with_runner(path, runner)
    }

    /// Create a Repository driven by an arbitrary runner
    pub fn with_runner<P: AsRef<Path>>(path: P, runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            runner,
            remote: DEFAULT_REMOTE.to_string(),
            audit: None,
        }
    }

    /// Replace the runner, keeping everything else
    pub fn set_runner(&mut self, runner: Arc<dyn CommandRunner>) {
        self.runner = runner;
    }

    pub fn with_remote(mut self, remote: impl Into<String>) -> Self {
        self.remote = remote.into();
        self
    }

    /// Record every executed step in an audit history
    pub fn with_audit(mut self, audit: AuditLogger) -> Self {
        self.audit = Some(audit);
        self
    }

    /// Get the repository path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Name of the remote that push, fetch and pull talk to
    pub fn remote(&self) -> &str {
        &self.remote
    }

    /// Run a pipeline in this repository
    pub async fn run(&self, pipeline: &Pipeline, cancel: &CancellationToken) -> GitResult<PipelineReport> {
        let report = pipeline::run_pipeline(self.runner.as_ref(), pipeline, cancel).await?;

        if let Some(ref audit) = self.audit
            && let Err(e) = audit.record(&self.path, &report)
        {
            log::warn!("failed to write audit history: {}", e);
        }

        Ok(report)
    }

    /// Stage everything and classify the staged changes
    pub async fn local_changes(&self, cancel: &CancellationToken) -> GitResult<(ChangeSet, PipelineReport)> {
        let report = self.run(&operations::detect_changes(), cancel).await?;
        let changes = parser::parse_name_status(report.last_stdout());
        log::info!(
            "local changes: {} added, {} modified, {} deleted",
            changes.added.len(),
            changes.modified.len(),
            changes.deleted.len()
        );
        Ok((changes, report))
    }

    /// True if either the index or the working tree differs from HEAD
    pub async fn has_pending_changes(&self, cancel: &CancellationToken) -> GitResult<bool> {
        let report = self.run(&operations::pending_changes_probe(), cancel).await?;
        Ok(!report.combined_stdout().trim().is_empty())
    }

    /// Get the current branch name, `None` when HEAD is detached
    pub async fn current_branch(&self, cancel: &CancellationToken) -> GitResult<Option<String>> {
        let report = self.run(&operations::current_branch(), cancel).await?;
        let branch = report.last_stdout().trim();
        if !report.succeeded() || branch.is_empty() {
            Ok(None)
        } else {
            Ok(Some(branch.to_string()))
        }
    }

    /// Newest stash holding work parked on `branch`
    pub async fn parked_stash(&self, branch: &str, cancel: &CancellationToken) -> GitResult<Option<StashEntry>> {
        let report = self.run(&operations::list_stashes(), cancel).await?;
        if !report.succeeded() {
            return Ok(None);
        }
        Ok(parser::parse_stash_list(report.last_stdout())
            .into_iter()
            .find(|stash| stash.is_parked_for(branch)))
    }

    /// URL of the configured remote, if it exists
    pub async fn remote_url(&self, cancel: &CancellationToken) -> GitResult<Option<String>> {
        let report = self.run(&operations::remote_url(&self.remote), cancel).await?;
        let url = report.last_stdout().trim();
        if !report.succeeded() || url.is_empty() {
            Ok(None)
        } else {
            Ok(Some(url.to_string()))
        }
    }
}
