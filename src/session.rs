//! UI-independent state and operations of the panel.
//!
//! Every user action goes through three stages: a `plan_*` method checks
//! preconditions and produces a [`Task`] without touching any process, the
//! task is executed (inline or on the worker), and [`Session::apply`] folds
//! the [`TaskOutput`] back into the session state.

use crate::error::{AppResult, GitError, GitResult};
use crate::git::operations::{self, CommitMessage};
use crate::git::parser::ChangeSet;
use crate::git::pipeline::{Pipeline, PipelineReport};
use crate::git::repository::Repository;
use crate::github::client::BranchLister;
use crate::security::validate_branch_name;
use std::sync::Arc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// Precondition failures, raised before any process is spawned
#[derive(Debug, Error, PartialEq)]
pub enum OperationError {
    #[error("Commit summary is empty")]
    EmptySummary,

    #[error("No local changes recorded; get changes first")]
    NoLocalChanges,

    #[error("No branch selected")]
    NoBranchSelected,

    #[error("No branch switch is waiting for a decision")]
    NoPendingSwitch,

    #[error("Local changes on '{from}' must be brought or left before switching to '{to}'")]
    SwitchNeedsResolution { from: String, to: String },
}

/// A checkout held back because the working tree has uncommitted work
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingSwitch {
    pub from: String,
    pub to: String,
}

/// How to resolve a [`PendingSwitch`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitchResolution {
    /// Stash, switch, and re-apply the work on the target
    Bring,
    /// Park the work on the current branch, then switch
    Leave,
    /// Stay where we are
    Cancel,
}

/// Result of [`Session::request_checkout`]
#[derive(Debug)]
pub enum CheckoutOutcome {
    AlreadySelected,
    CheckedOut(Vec<PipelineReport>),
    NeedsConfirmation(PendingSwitch),
}

/// Pipelines whose completion changes session state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    CommitAndPush,
    FetchAndPull,
    AddBranch(String),
    RemoveBranch(String),
    Bring(PendingSwitch),
    Leave(PendingSwitch),
}

impl Action {
    fn refreshes_branch_list(&self) -> bool {
        matches!(self, Action::AddBranch(_) | Action::RemoveBranch(_))
    }
}

/// One unit of external work
#[derive(Debug, Clone)]
pub enum Task {
    RefreshBranches,
    GetChanges,
    /// `selected` names the source branch only when HEAD is detached
    Checkout { selected: Option<String>, target: String },
    Run { action: Action, pipeline: Pipeline },
}

impl Task {
    /// Short description for the status bar
    pub fn label(&self) -> String {
        match self {
            Task::RefreshBranches => "Refreshing branches".to_string(),
            Task::GetChanges => "Getting changes".to_string(),
            Task::Checkout { target, .. } => format!("Checking out {}", target),
            Task::Run { pipeline, .. } => pipeline.name.clone(),
        }
    }

    /// Run the task against the repository and branch source in `ctx`
    pub async fn execute(self, ctx: &TaskContext, cancel: &CancellationToken) -> AppResult<TaskOutput> {
        match self {
            Task::RefreshBranches => {
                let names = ctx.list_branches(cancel).await?;
                let current = ctx.repo.current_branch(cancel).await.unwrap_or_else(|e| {
                    log::warn!("could not read the current branch: {}", e);
                    None
                });
                Ok(TaskOutput::Branches { names, current })
            }
            Task::GetChanges => {
                let (changes, report) = ctx.repo.local_changes(cancel).await?;
                Ok(TaskOutput::Changes { changes, report })
            }
            Task::Checkout { selected, target } => {
                let head = ctx.repo.current_branch(cancel).await?;
                if head.as_deref() == Some(target.as_str()) {
                    return Ok(TaskOutput::AlreadyOn(target));
                }

                if ctx.repo.has_pending_changes(cancel).await? {
                    let from = head.or(selected).unwrap_or_else(|| "HEAD".to_string());
                    log::info!("pending changes on {}, asking before switching to {}", from, target);
                    return Ok(TaskOutput::NeedsConfirmation(PendingSwitch { from, to: target }));
                }

                let report = ctx.repo.run(&operations::checkout(&target), cancel).await?;
                let switched = report.succeeded();
                let mut reports = vec![report];
                if switched && let Some(restored) = ctx.restore_parked(&target, cancel).await? {
                    reports.push(restored);
                }
                Ok(TaskOutput::CheckedOut {
                    target,
                    switched,
                    reports,
                })
            }
            Task::Run { action, pipeline } => {
                let report = ctx.repo.run(&pipeline, cancel).await?;
                let mut reports = vec![report];

                if let Action::Leave(ref switch) = action {
                    let restored = if checked_out(&reports[0]) {
                        ctx.restore_parked(&switch.to, cancel).await?
                    } else if parked(&reports[0]) {
                        log::warn!("checkout of {} failed, taking back the work parked on {}", switch.to, switch.from);
                        ctx.pop_parked(&switch.from, cancel).await?
                    } else {
                        None
                    };
                    reports.extend(restored);
                }

                let branches = if action.refreshes_branch_list() {
                    match ctx.list_branches(cancel).await {
                        Ok(names) => Some(names),
                        Err(e) => {
                            log::warn!("branch list refresh failed: {}", e);
                            None
                        }
                    }
                } else {
                    None
                };

                Ok(TaskOutput::Completed {
                    action,
                    reports,
                    branches,
                })
            }
        }
    }
}

/// True when the report contains a checkout step that exited zero
fn checked_out(report: &PipelineReport) -> bool {
    report
        .outcomes
        .iter()
        .any(|o| o.command.starts_with("git checkout ") && o.output.success)
}

/// True when the report's park step ran and exited zero
fn parked(report: &PipelineReport) -> bool {
    report
        .outcomes
        .first()
        .is_some_and(|o| o.command.starts_with("git stash push ") && o.output.success)
}

/// What a finished [`Task`] produced
#[derive(Debug)]
pub enum TaskOutput {
    Branches {
        names: Vec<String>,
        current: Option<String>,
    },
    Changes {
        changes: ChangeSet,
        report: PipelineReport,
    },
    /// HEAD was already on the branch; nothing ran
    AlreadyOn(String),
    CheckedOut {
        target: String,
        switched: bool,
        reports: Vec<PipelineReport>,
    },
    NeedsConfirmation(PendingSwitch),
    Completed {
        action: Action,
        reports: Vec<PipelineReport>,
        branches: Option<Vec<String>>,
    },
}

/// Shared handles a task needs; cheap to clone into a spawned task
#[derive(Clone)]
pub struct TaskContext {
    pub repo: Arc<Repository>,
    pub lister: Arc<dyn BranchLister>,
    pub restore_parked: bool,
}

impl TaskContext {
    async fn list_branches(&self, cancel: &CancellationToken) -> AppResult<Vec<String>> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(GitError::Cancelled("list branches".to_string()).into()),
            names = self.lister.list_branches() => Ok(names?),
        }
    }

    /// Pop the newest stash parked on `branch`, if restoring is enabled
    async fn restore_parked(&self, branch: &str, cancel: &CancellationToken) -> GitResult<Option<PipelineReport>> {
        if !self.restore_parked {
            return Ok(None);
        }
        self.pop_parked(branch, cancel).await
    }

    /// Pop the newest stash parked on `branch`
    async fn pop_parked(&self, branch: &str, cancel: &CancellationToken) -> GitResult<Option<PipelineReport>> {
        match self.repo.parked_stash(branch, cancel).await? {
            Some(stash) => {
                log::info!("restoring changes parked on {} ({})", branch, stash.index);
                let report = self
                    .repo
                    .run(&operations::restore_parked(&stash.index), cancel)
                    .await?;
                Ok(Some(report))
            }
            None => Ok(None),
        }
    }
}

/// Transient panel state plus the handles needed to act on it
pub struct Session {
    ctx: TaskContext,
    branches: Vec<String>,
    selected: Option<String>,
    changes: ChangeSet,
    pending: Option<PendingSwitch>,
}

impl Session {
    pub fn new(repo: Arc<Repository>, lister: Arc<dyn BranchLister>) -> Self {
        Self {
            ctx: TaskContext {
                repo,
                lister,
                restore_parked: true,
            },
            branches: Vec::new(),
            selected: None,
            changes: ChangeSet::default(),
            pending: None,
        }
    }

    pub fn with_restore_parked(mut self, restore: bool) -> Self {
        self.ctx.restore_parked = restore;
        self
    }

    pub fn context(&self) -> &TaskContext {
        &self.ctx
    }

    pub fn repo(&self) -> &Repository {
        &self.ctx.repo
    }

    pub fn branches(&self) -> &[String] {
        &self.branches
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn changes(&self) -> &ChangeSet {
        &self.changes
    }

    pub fn pending_switch(&self) -> Option<&PendingSwitch> {
        self.pending.as_ref()
    }

    /// Select a branch without checking it out
    pub fn select(&mut self, branch: impl Into<String>) {
        self.selected = Some(branch.into());
    }

    /// Select whatever HEAD points at
    pub async fn select_current_branch(&mut self, cancel: &CancellationToken) -> AppResult<Option<&str>> {
        if let Some(current) = self.ctx.repo.current_branch(cancel).await? {
            self.selected = Some(current);
        }
        Ok(self.selected())
    }

    pub fn plan_refresh(&self) -> Task {
        Task::RefreshBranches
    }

    pub fn plan_get_changes(&self) -> Task {
        Task::GetChanges
    }

    pub fn plan_commit(&self, message: &CommitMessage) -> Result<Task, OperationError> {
        if !message.has_summary() {
            return Err(OperationError::EmptySummary);
        }
        if self.changes.is_empty() {
            return Err(OperationError::NoLocalChanges);
        }
        let branch = self.selected.as_deref().ok_or(OperationError::NoBranchSelected)?;

        Ok(Task::Run {
            action: Action::CommitAndPush,
            pipeline: operations::commit_and_push(self.ctx.repo.remote(), branch, message),
        })
    }

    pub fn plan_fetch_and_pull(&self) -> Result<Task, OperationError> {
        let branch = self.selected.as_deref().ok_or(OperationError::NoBranchSelected)?;
        Ok(Task::Run {
            action: Action::FetchAndPull,
            pipeline: operations::fetch_and_pull(self.ctx.repo.remote(), branch),
        })
    }

    pub fn plan_add_branch(&self, name: &str) -> AppResult<Task> {
        let name = name.trim();
        validate_branch_name(name)?;
        Ok(Task::Run {
            action: Action::AddBranch(name.to_string()),
            pipeline: operations::create_branch(self.ctx.repo.remote(), name),
        })
    }

    pub fn plan_remove_branch(&self, name: &str) -> AppResult<Task> {
        let name = name.trim();
        validate_branch_name(name)?;
        Ok(Task::Run {
            action: Action::RemoveBranch(name.to_string()),
            pipeline: operations::delete_branch(self.ctx.repo.remote(), name),
        })
    }

    /// Whether HEAD is already on `target` is decided when the task runs
    pub fn plan_checkout(&self, target: &str) -> AppResult<Task> {
        validate_branch_name(target)?;
        Ok(Task::Checkout {
            selected: self.selected.clone(),
            target: target.to_string(),
        })
    }

    /// Consume the pending switch. `Cancel` yields no task.
    pub fn plan_resolution(&mut self, resolution: SwitchResolution) -> Result<Option<Task>, OperationError> {
        let switch = self.pending.take().ok_or(OperationError::NoPendingSwitch)?;

        let task = match resolution {
            SwitchResolution::Cancel => {
                log::info!("switch from {} to {} cancelled", switch.from, switch.to);
                return Ok(None);
            }
            SwitchResolution::Bring => Task::Run {
                pipeline: operations::bring_changes(&switch.to),
                action: Action::Bring(switch),
            },
            SwitchResolution::Leave => Task::Run {
                pipeline: operations::leave_changes(&switch.from, &switch.to),
                action: Action::Leave(switch),
            },
        };
        Ok(Some(task))
    }

    /// Fold a finished task into the session, returning the reports to show
    pub fn apply(&mut self, output: TaskOutput) -> Vec<PipelineReport> {
        match output {
            TaskOutput::Branches { names, current } => {
                self.replace_branches(names, current);
                Vec::new()
            }
            TaskOutput::Changes { changes, report } => {
                self.changes = changes;
                vec![report]
            }
            TaskOutput::AlreadyOn(target) => {
                self.selected = Some(target);
                Vec::new()
            }
            TaskOutput::CheckedOut {
                target,
                switched,
                reports,
            } => {
                if switched {
                    log::info!("checked out {}", target);
                    self.selected = Some(target);
                }
                reports
            }
            TaskOutput::NeedsConfirmation(switch) => {
                self.pending = Some(switch);
                Vec::new()
            }
            TaskOutput::Completed {
                action,
                reports,
                branches,
            } => {
                match &action {
                    Action::CommitAndPush => self.changes = ChangeSet::default(),
                    Action::Bring(switch) | Action::Leave(switch) => {
                        if reports.first().is_some_and(checked_out) {
                            self.selected = Some(switch.to.clone());
                        }
                    }
                    Action::FetchAndPull | Action::AddBranch(_) | Action::RemoveBranch(_) => {}
                }
                if let Some(names) = branches {
                    self.replace_branches(names, None);
                }
                reports
            }
        }
    }

    /// Replace the list wholesale and repair the selection
    fn replace_branches(&mut self, names: Vec<String>, current: Option<String>) {
        self.branches = names;

        let selection_valid = self
            .selected
            .as_ref()
            .is_some_and(|s| self.branches.contains(s));

        if !selection_valid {
            self.selected = current
                .filter(|c| self.branches.contains(c))
                .or_else(|| self.branches.first().cloned());
        }
    }

    async fn execute(&mut self, task: Task, cancel: &CancellationToken) -> AppResult<Vec<PipelineReport>> {
        let output = task.execute(&self.ctx, cancel).await?;
        Ok(self.apply(output))
    }

    /// Replace the branch list from the remote. On failure the old list stays.
    pub async fn refresh_branches(&mut self, cancel: &CancellationToken) -> AppResult<&[String]> {
        self.execute(self.plan_refresh(), cancel).await?;
        Ok(&self.branches)
    }

    pub async fn get_changes(&mut self, cancel: &CancellationToken) -> AppResult<PipelineReport> {
        let mut reports = self.execute(self.plan_get_changes(), cancel).await?;
        Ok(reports.remove(0))
    }

    pub async fn commit_and_push(
        &mut self,
        message: &CommitMessage,
        cancel: &CancellationToken,
    ) -> AppResult<PipelineReport> {
        let task = self.plan_commit(message)?;
        let mut reports = self.execute(task, cancel).await?;
        Ok(reports.remove(0))
    }

    pub async fn fetch_and_pull(&mut self, cancel: &CancellationToken) -> AppResult<PipelineReport> {
        let task = self.plan_fetch_and_pull()?;
        let mut reports = self.execute(task, cancel).await?;
        Ok(reports.remove(0))
    }

    pub async fn add_branch(&mut self, name: &str, cancel: &CancellationToken) -> AppResult<PipelineReport> {
        let task = self.plan_add_branch(name)?;
        let mut reports = self.execute(task, cancel).await?;
        Ok(reports.remove(0))
    }

    pub async fn remove_branch(&mut self, name: &str, cancel: &CancellationToken) -> AppResult<PipelineReport> {
        let task = self.plan_remove_branch(name)?;
        let mut reports = self.execute(task, cancel).await?;
        Ok(reports.remove(0))
    }

    pub async fn request_checkout(&mut self, target: &str, cancel: &CancellationToken) -> AppResult<CheckoutOutcome> {
        let task = self.plan_checkout(target)?;
        self.pending = None;

        let output = task.execute(&self.ctx, cancel).await?;
        let already_on = matches!(output, TaskOutput::AlreadyOn(_));
        let reports = self.apply(output);
        if already_on {
            return Ok(CheckoutOutcome::AlreadySelected);
        }
        match self.pending.clone() {
            Some(switch) => Ok(CheckoutOutcome::NeedsConfirmation(switch)),
            None => Ok(CheckoutOutcome::CheckedOut(reports)),
        }
    }

    pub async fn resolve_switch(
        &mut self,
        resolution: SwitchResolution,
        cancel: &CancellationToken,
    ) -> AppResult<Vec<PipelineReport>> {
        match self.plan_resolution(resolution)? {
            Some(task) => self.execute(task, cancel).await,
            None => Ok(Vec::new()),
        }
    }
}
