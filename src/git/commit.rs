//! Commit creation through the system `git` binary.
//!
//! Runs the system git, so the user's hooks, signing config, and editor apply.

use std::path::Path;
use std::process::Command;

use tracing::debug;

use crate::error::GitError;

/// Commit the staged changes with `message` and return git's exit code.
///
/// With `edit`, git opens the configured editor on the message first. Stdio
/// is inherited so the editor and hook output reach the terminal.
pub fn commit_with_message(root: &Path, message: &str, edit: bool) -> Result<i32, GitError> {
    if which::which("git").is_err() {
        return Err(GitError::GitNotInstalled);
    }

    let mut cmd = Command::new("git");
    cmd.current_dir(root).args(["commit", "-m", message]);
    if edit {
        cmd.arg("--edit");
    }

    debug!("Running git commit in {} (edit={})", root.display(), edit);
    let status = cmd.status().map_err(GitError::CommitSpawnFailed)?;
    Ok(status.code().unwrap_or(-1))
}
