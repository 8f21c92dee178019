pub mod executor;
pub mod operations;
pub mod parser;
pub mod pipeline;
pub mod repository;

// Re-export commonly used types
pub use executor::{CommandOutput, CommandRunner, GitExecutor};
pub use operations::CommitMessage;
pub use parser::{
    ChangeEntry, ChangeKind, ChangeSet, StashEntry, parse_name_status, parse_stash_list,
};
pub use pipeline::{FailurePolicy, Pipeline, PipelineReport, Step, StepOutcome, run_pipeline};
pub use repository::Repository;
