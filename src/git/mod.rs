//! Git operations: staged diff collection via git2, commits via the git CLI.

pub mod commit;
pub mod staged;

pub use commit::commit_with_message;
pub use staged::{discover_repo, has_staged_changes, repo_root, staged_diff};
