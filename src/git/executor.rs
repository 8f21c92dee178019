use crate::error::{GitError, GitResult};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::{Output, Stdio};
use std::time::Duration;
use tokio::process::Command;
use tokio_util::sync::CancellationToken;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Result of executing a git command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
    pub success: bool,
}

impl CommandOutput {
    fn from_output(output: Output) -> Self {
        Self {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            exit_code: output.status.code().unwrap_or(-1),
            success: output.status.success(),
        }
    }
}

/// Anything that can run a git argument vector.
///
/// Implementations must not interpret `args` through a shell. A non-zero exit
/// status is reported in [`CommandOutput`], not as an error; errors are kept
/// for failures to run the command at all (spawn, timeout, cancellation).
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, args: &[String], cancel: &CancellationToken) -> GitResult<CommandOutput>;
}

/// Executes git commands within a repository
#[derive(Debug, Clone)]
pub struct GitExecutor {
    repo_path: PathBuf,
    timeout: Duration,
}

impl GitExecutor {
    /// Create a new GitExecutor for the given repository path
    pub fn new<P: AsRef<Path>>(repo_path: P) -> Self {
        Self {
            repo_path: repo_path.as_ref().to_path_buf(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Set the per-command timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Get the repository path
    pub fn repo_path(&self) -> &Path {
        &self.repo_path
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[async_trait]
impl CommandRunner for GitExecutor {
    async fn run(&self, args: &[String], cancel: &CancellationToken) -> GitResult<CommandOutput> {
        if args.is_empty() {
            return Err(GitError::CommandFailed("Empty command".to_string()));
        }

        let display = args.join(" ");
        log::debug!("git {}", display);

        // stdin is closed, so credential prompts must fail instead of hanging
        let child = Command::new("git")
            .args(args)
            .current_dir(&self.repo_path)
            .env("GIT_TERMINAL_PROMPT", "0")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| GitError::SpawnFailed(e.to_string()))?;

        // Dropping the wait future drops the child, which kills it
        let output = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                log::warn!("git {} cancelled", display);
                return Err(GitError::Cancelled(display));
            }
            result = tokio::time::timeout(self.timeout, child.wait_with_output()) => match result {
                Ok(output) => output?,
                Err(_) => {
                    log::warn!("git {} timed out after {:?}", display, self.timeout);
                    return Err(GitError::Timeout {
                        command: display,
                        seconds: self.timeout.as_secs(),
                    });
                }
            },
        };

        let output = CommandOutput::from_output(output);
        if !output.success {
            log::debug!("git {} exited with {}", display, output.exit_code);
        }
        Ok(output)
    }
}
