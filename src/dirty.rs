use git2::{Repository, Status, StatusOptions};

use crate::errors::GitverResult;

/// Reports whether the working tree is dirty in the describe sense.
///
/// Dirty means at least one tracked path is added, changed, removed,
/// missing, modified, or conflicting. Untracked files do not count: a
/// repository whose only anomaly is untracked files is clean, matching the
/// dirty-suffix convention of describe-style tooling rather than a strict
/// clean-tree notion.
pub fn is_dirty(repository: &Repository) -> GitverResult<bool> {
    let mut status_options = StatusOptions::new();
    status_options.include_untracked(false);
    status_options.include_ignored(false);

    let statuses = repository.statuses(Some(&mut status_options))?;

    let tracked_changes = Status::INDEX_NEW
        | Status::INDEX_MODIFIED
        | Status::INDEX_DELETED
        | Status::INDEX_RENAMED
        | Status::INDEX_TYPECHANGE
        | Status::WT_MODIFIED
        | Status::WT_DELETED
        | Status::WT_RENAMED
        | Status::WT_TYPECHANGE
        | Status::CONFLICTED;

    Ok(statuses
        .iter()
        .any(|entry| entry.status().intersects(tracked_changes)))
}
