use gitpanel::config::ConfigError;
use gitpanel::error::{AppError, AppResult, GitError};
use gitpanel::github::GitHubError;
use gitpanel::security::ValidationError;
use gitpanel::session::OperationError;
use std::error::Error;

/// Test that GitError converts to AppError::Git
#[test]
fn test_git_error_converts_to_app_error() {
    let app_err: AppError = GitError::NotARepository.into();
    assert!(matches!(app_err, AppError::Git(_)));
}

#[test]
fn test_config_error_converts_to_app_error() {
    let app_err: AppError = ConfigError::DirectoryNotFound.into();
    assert!(matches!(app_err, AppError::Config(_)));
}

#[test]
fn test_github_error_converts_to_app_error() {
    let app_err: AppError = GitHubError::Status {
        status: 401,
        message: "Bad credentials".to_string(),
    }
    .into();
    assert!(matches!(app_err, AppError::GitHub(_)));
}

#[test]
fn test_validation_error_converts_to_app_error() {
    let app_err: AppError = ValidationError::EmptyBranchName.into();
    assert!(matches!(app_err, AppError::Validation(_)));
}

#[test]
fn test_operation_error_converts_to_app_error() {
    let app_err: AppError = OperationError::EmptySummary.into();
    assert!(matches!(app_err, AppError::Operation(OperationError::EmptySummary)));
}

#[test]
fn test_io_error_converts_to_app_error() {
    let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
    let app_err: AppError = io_err.into();
    assert!(matches!(app_err, AppError::Io(_)));
}

/// Test that error source chain is preserved
#[test]
fn test_error_source_preserved() {
    let app_err: AppError = GitError::CommandFailed("test error".to_string()).into();

    let source = app_err.source().expect("wrapped errors keep their source");
    assert!(source.to_string().contains("test error"));
}

#[test]
fn test_operation_errors_read_as_plain_sentences() {
    let app_err: AppError = OperationError::NoBranchSelected.into();
    let display = app_err.to_string();

    assert_eq!(display, OperationError::NoBranchSelected.to_string());
    assert!(!display.contains("Operation"));
}

#[test]
fn test_app_error_git_display() {
    let app_err: AppError = GitError::Timeout {
        command: "push origin main".to_string(),
        seconds: 30,
    }
    .into();

    let display = app_err.to_string();
    assert!(display.contains("Git error"));
    assert!(display.contains("push origin main"));
    assert!(display.contains("30s"));
}

#[test]
fn test_app_error_github_display() {
    let app_err: AppError = GitHubError::Status {
        status: 404,
        message: "Not Found".to_string(),
    }
    .into();

    let display = app_err.to_string();
    assert!(display.contains("GitHub error"));
    assert!(display.contains("404"));
    assert!(display.contains("Not Found"));
}

#[test]
fn test_question_mark_operator() {
    fn may_fail() -> Result<(), GitError> {
        Err(GitError::NotARepository)
    }

    fn outer() -> AppResult<()> {
        may_fail()?;
        Ok(())
    }

    assert!(matches!(outer(), Err(AppError::Git(GitError::NotARepository))));
}

#[test]
fn test_mixed_errors_through_one_result() {
    fn step(n: u8) -> AppResult<()> {
        match n {
            0 => Err(ValidationError::LeadingDash("-x".to_string()).into()),
            1 => Err(OperationError::NoLocalChanges.into()),
            _ => Err(ConfigError::InvalidValue("ui.tick_rate_ms".to_string()).into()),
        }
    }

    assert!(matches!(step(0), Err(AppError::Validation(_))));
    assert!(matches!(step(1), Err(AppError::Operation(_))));
    assert!(matches!(step(2), Err(AppError::Config(_))));
}

#[test]
fn test_app_error_debug() {
    let app_err: AppError = GitError::Cancelled("fetch origin main".to_string()).into();
    let debug = format!("{:?}", app_err);
    assert!(debug.contains("Cancelled"));
}
