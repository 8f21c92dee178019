use std::io;
use thiserror::Error;

use crate::config::settings::ConfigError;
use crate::github::client::GitHubError;
use crate::security::validator::ValidationError;
use crate::session::OperationError;

/// Errors that can occur while running git
#[derive(Debug, Error)]
pub enum GitError {
    #[error("Not a git repository")]
    NotARepository,

    #[error("Failed to execute git: {0}")]
    SpawnFailed(String),

    #[error("Git command failed: {0}")]
    CommandFailed(String),

    #[error("Command 'git {command}' timed out after {seconds}s")]
    Timeout { command: String, seconds: u64 },

    #[error("Command 'git {0}' was cancelled")]
    Cancelled(String),

    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
}

/// Anything a panel operation can fail with.
///
/// Module errors convert through `From` and stay reachable as the source.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Git error: {0}")]
    Git(#[from] GitError),

    #[error("GitHub error: {0}")]
    GitHub(#[from] GitHubError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid input: {0}")]
    Validation(#[from] ValidationError),

    #[error("{0}")]
    Operation(#[from] OperationError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

pub type GitResult<T> = std::result::Result<T, GitError>;
pub type AppResult<T> = std::result::Result<T, AppError>;
