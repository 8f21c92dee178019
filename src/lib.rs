pub mod audit;
pub mod cli;
pub mod config;
pub mod error;
pub mod error_translation;
pub mod git;
pub mod github;
pub mod logging;
pub mod security;
pub mod session;
pub mod ui;
pub mod worker;

// Re-export commonly used types for convenience
pub use error::{AppError, AppResult, GitError, GitResult};
pub use git::Repository;
pub use session::{Session, Task, TaskContext, TaskOutput};
