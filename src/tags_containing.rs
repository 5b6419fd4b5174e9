use git2::{Oid, Repository};
use tracing::debug;

use crate::errors::GitverResult;

/// Lists the names of tags whose tagged commit contains `commit_id`, i.e.
/// the tag points at the commit itself or at one of its descendants.
///
/// Names come back with the `refs/tags/` prefix stripped, sorted lexically.
/// A tag that fails to peel to a commit is logged and skipped.
pub fn tags_containing(repository: &Repository, commit_id: Oid) -> GitverResult<Vec<String>> {
    let mut names: Vec<String> = Vec::new();

    repository.tag_foreach(|ref_target, ref_name| {
        let ref_path = String::from_utf8_lossy(ref_name).into_owned();
        match tag_contains(repository, ref_target, commit_id) {
            Ok(true) => {
                names.push(
                    ref_path
                        .strip_prefix("refs/tags/")
                        .unwrap_or(&ref_path)
                        .to_string(),
                );
            }
            Ok(false) => {}
            Err(err) => debug!("failed to check tag ref [{ref_path}]: {err}"),
        }
        true
    })?;

    names.sort();
    Ok(names)
}

fn tag_contains(
    repository: &Repository,
    ref_target: Oid,
    commit_id: Oid,
) -> Result<bool, git2::Error> {
    let tagged_commit = repository.find_object(ref_target, None)?.peel_to_commit()?;
    if tagged_commit.id() == commit_id {
        return Ok(true);
    }
    repository.graph_descendant_of(tagged_commit.id(), commit_id)
}
