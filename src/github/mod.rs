pub mod client;
pub mod remote;
pub mod types;

pub use client::{BranchLister, GitHubClient, GitHubError, UnconfiguredLister, extract_branch_names, next_page_link};
pub use remote::parse_github_remote;
pub use types::{Branch, RepoCoordinates};
