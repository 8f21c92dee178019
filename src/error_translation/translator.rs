use crate::error::{AppError, GitError};
use crate::git::pipeline::{PipelineReport, StepOutcome};
use crate::github::client::GitHubError;

#[derive(Debug, Clone)]
pub struct UserFriendlyError {
    pub simple_message: String,
    pub suggestion: Option<String>,
    pub raw_error: String,
}

pub struct ErrorTranslator;

impl ErrorTranslator {
    /// Translate an AppError into a user-friendly error message
    pub fn translate_app_error(error: &AppError) -> UserFriendlyError {
        match error {
            AppError::Git(git_err) => Self::translate(git_err),
            AppError::GitHub(gh_err) => Self::translate_github(gh_err),
            AppError::Config(config_err) => UserFriendlyError {
                simple_message: "Configuration error occurred.".to_string(),
                suggestion: Some("Check your config file at ~/.config/gitpanel/config.toml".to_string()),
                raw_error: config_err.to_string(),
            },
            AppError::Validation(err) => UserFriendlyError {
                simple_message: "That branch name is not allowed.".to_string(),
                suggestion: Some("Use letters, digits, '-', '_', '.' and '/' only.".to_string()),
                raw_error: err.to_string(),
            },
            AppError::Operation(op_err) => UserFriendlyError {
                simple_message: op_err.to_string(),
                suggestion: None,
                raw_error: op_err.to_string(),
            },
            AppError::Io(io_err) => UserFriendlyError {
                simple_message: "I/O error occurred.".to_string(),
                suggestion: Some("Check file permissions and disk space".to_string()),
                raw_error: io_err.to_string(),
            },
        }
    }

    /// Translate a GitError into a user-friendly error message
    pub fn translate(error: &GitError) -> UserFriendlyError {
        let raw_error = error.to_string();

        let (simple_message, suggestion) = match error {
            GitError::Timeout { .. } => (
                "Git took too long and was stopped.".to_string(),
                Some("Check your network connection, or raise git.timeout_seconds".to_string()),
            ),
            GitError::Cancelled(_) => ("Operation cancelled.".to_string(), None),
            GitError::SpawnFailed(_) => (
                "Could not run git.".to_string(),
                Some("Make sure git is installed and on your PATH".to_string()),
            ),
            _ => Self::match_error_patterns(&raw_error),
        };

        UserFriendlyError {
            simple_message,
            suggestion,
            raw_error,
        }
    }

    fn translate_github(error: &GitHubError) -> UserFriendlyError {
        let (simple_message, suggestion) = match error {
            GitHubError::Status { status: 401, .. } => (
                "GitHub rejected the token.".to_string(),
                Some("Set a valid token in $GITHUB_TOKEN or the config file".to_string()),
            ),
            GitHubError::Status { status: 404, .. } => (
                "Repository not found on GitHub.".to_string(),
                Some("Check the owner/name, and that the token can see private repositories".to_string()),
            ),
            GitHubError::Status { status: 403, .. } => (
                "GitHub refused the request (rate limit or permissions).".to_string(),
                Some("Authenticate with a token or wait for the rate limit to reset".to_string()),
            ),
            GitHubError::Network(_) => (
                "Could not reach GitHub.".to_string(),
                Some("Check your network connection and github.api_url".to_string()),
            ),
            GitHubError::NotConfigured(_) => (
                "GitHub repository not configured.".to_string(),
                Some("Pass --owner/--name, set github.owner/repo in the config, or add an origin remote".to_string()),
            ),
            GitHubError::TooManyPages(_) => (
                "GitHub returned more branches than the panel will page through.".to_string(),
                None,
            ),
            _ => ("Unexpected response from GitHub.".to_string(), None),
        };

        UserFriendlyError {
            simple_message,
            suggestion,
            raw_error: error.to_string(),
        }
    }

    /// Explain a step that exited non-zero; `None` for successful steps
    pub fn translate_step(outcome: &StepOutcome) -> Option<UserFriendlyError> {
        if outcome.output.success {
            return None;
        }

        let raw_error = if outcome.output.stderr.trim().is_empty() {
            outcome.output.stdout.trim().to_string()
        } else {
            outcome.output.stderr.trim().to_string()
        };
        let (simple_message, suggestion) = Self::match_error_patterns(&raw_error);

        Some(UserFriendlyError {
            simple_message,
            suggestion,
            raw_error,
        })
    }

    /// Explanations for every failed step of a report
    pub fn diagnose(report: &PipelineReport) -> Vec<UserFriendlyError> {
        report.outcomes.iter().filter_map(Self::translate_step).collect()
    }

    /// Match common git error patterns and provide user-friendly messages
    fn match_error_patterns(error_text: &str) -> (String, Option<String>) {
        let lower = error_text.to_lowercase();

        // No upstream branch
        if lower.contains("no upstream") || lower.contains("does not have an upstream") {
            return (
                "No remote branch is configured for tracking.".to_string(),
                Some("Publish the branch first: git push -u origin <branch-name>".to_string()),
            );
        }

        // Safe delete refused
        if lower.contains("not fully merged") {
            return (
                "The branch has commits that are not merged anywhere else.".to_string(),
                Some("Merge it first; the remote branch was left untouched".to_string()),
            );
        }

        if lower.contains("conflict") {
            return (
                "There are conflicts that need to be resolved.".to_string(),
                Some("Fix conflicts in the listed files, then get changes and commit.".to_string()),
            );
        }

        if lower.contains("nothing to commit") || lower.contains("working tree clean") {
            return (
                "No changes to commit - working directory is clean.".to_string(),
                None,
            );
        }

        // Checkout of a branch that exists nowhere
        if lower.contains("pathspec") && lower.contains("did not match") {
            return (
                "Branch or path not found.".to_string(),
                Some("Fetch first, or refresh the branch list".to_string()),
            );
        }

        if lower.contains("couldn't find remote ref") || lower.contains("unknown revision") {
            return (
                "The branch does not exist on the remote.".to_string(),
                Some("Push the branch first, or pick a branch from the refreshed list".to_string()),
            );
        }

        if lower.contains("already exists") {
            return (
                "A branch with that name already exists.".to_string(),
                Some("Use a different name or remove the existing branch first.".to_string()),
            );
        }

        if lower.contains("not a git repository") {
            return (
                "Current directory is not a git repository.".to_string(),
                Some("Run gitpanel from inside a clone, or pass --repo".to_string()),
            );
        }

        if lower.contains("authentication failed")
            || lower.contains("permission denied")
            || lower.contains("could not read username")
        {
            return (
                "Authentication failed - check your credentials.".to_string(),
                Some("Verify your SSH keys or credential helper.".to_string()),
            );
        }

        if lower.contains("does not appear to be a git repository") || lower.contains("repository not found") {
            return (
                "Remote repository not found.".to_string(),
                Some("Check the remote URL with: git remote -v".to_string()),
            );
        }

        if lower.contains("would be overwritten") {
            return (
                "Operation would overwrite uncommitted changes.".to_string(),
                Some("Commit first, or switch again and choose bring or leave".to_string()),
            );
        }

        if lower.contains("non-fast-forward") || lower.contains("fetch first") || lower.contains("diverged") {
            return (
                "Local and remote branches have diverged.".to_string(),
                Some("Fetch & pull, then push again".to_string()),
            );
        }

        if lower.contains("no local changes to save") {
            return ("There was nothing to stash.".to_string(), None);
        }

        if lower.contains("no stash entries found") {
            return ("There was no stash to apply.".to_string(), None);
        }

        (error_text.to_string(), None)
    }
}
