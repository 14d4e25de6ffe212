//! Repository discovery and staged diff collection using git2.

use std::path::{Path, PathBuf};

use git2::{Diff, DiffFormat, DiffOptions, ErrorCode, Repository, Tree};
use tracing::debug;

use crate::error::GitError;

/// Find the repository enclosing `start`.
pub fn discover_repo(start: &Path) -> Result<Repository, GitError> {
    Repository::discover(start).map_err(GitError::NotARepository)
}

/// The root of the repository's working tree.
pub fn repo_root(repo: &Repository) -> Result<PathBuf, GitError> {
    repo.workdir()
        .map(Path::to_path_buf)
        .ok_or(GitError::NoWorkTree)
}

/// Resolve the HEAD tree, distinguishing empty-repo errors from real failures.
///
/// Returns `Ok(None)` for repos with no commits (unborn branch / not found),
/// so staged files are compared against the empty tree.
fn resolve_head_tree(repo: &Repository) -> Result<Option<Tree<'_>>, GitError> {
    let head_ref = match repo.head() {
        Ok(r) => r,
        Err(e) if e.code() == ErrorCode::UnbornBranch || e.code() == ErrorCode::NotFound => {
            return Ok(None);
        }
        Err(e) => return Err(GitError::DiffFailed(e)),
    };

    let tree = head_ref.peel_to_tree().map_err(GitError::DiffFailed)?;
    Ok(Some(tree))
}

/// Diff between HEAD and the index, i.e. what `git commit` would record.
fn staged(repo: &Repository) -> Result<Diff<'_>, GitError> {
    let head_tree = resolve_head_tree(repo)?;
    let mut opts = DiffOptions::new();
    opts.minimal(true);
    repo.diff_tree_to_index(head_tree.as_ref(), None, Some(&mut opts))
        .map_err(GitError::DiffFailed)
}

/// Whether anything is staged for commit.
pub fn has_staged_changes(repo: &Repository) -> Result<bool, GitError> {
    let diff = staged(repo)?;
    Ok(diff.deltas().len() > 0)
}

/// The staged changes as unified patch text, without colour.
pub fn staged_diff(repo: &Repository) -> Result<String, GitError> {
    let diff = staged(repo)?;

    let mut text = String::new();
    diff.print(DiffFormat::Patch, |_delta, _hunk, line| {
        let origin = line.origin();
        if origin == '+' || origin == '-' || origin == ' ' {
            text.push(origin);
        }
        text.push_str(&String::from_utf8_lossy(line.content()));
        true
    })
    .map_err(GitError::DiffFailed)?;

    debug!(
        "Collected staged diff: {} files, {} bytes",
        diff.deltas().len(),
        text.len()
    );
    Ok(text)
}
