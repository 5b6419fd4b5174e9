use git2::{Oid, Repository};
use tracing::debug;

use crate::errors::GitverResult;
use crate::tag_index::TagIndex;
use crate::walker::find_first_matching;

/// The nearest tagged ancestor of a commit, possibly the commit itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClosestTag {
    pub commit_id: Oid,
    pub tag_name: String,
}

/// Finds the nearest tagged ancestor of `start`.
///
/// When `start` itself appears in the index the search short-circuits
/// without any traversal. `Ok(None)` means no commit in the ancestry
/// carries a tag; whether that is fatal is the caller's decision. When a
/// commit carries several tags, the most recent one is reported.
pub fn find_closest_tag(
    repository: &Repository,
    start: Oid,
    index: &TagIndex,
) -> GitverResult<Option<ClosestTag>> {
    if let Some(tag) = index.first(start) {
        debug!("commit [{start}] is itself tagged [{}]", tag.name);
        return Ok(Some(ClosestTag {
            commit_id: start,
            tag_name: tag.name.clone(),
        }));
    }

    if index.is_empty() {
        return Ok(None);
    }

    let found = find_first_matching(repository, start, |oid| index.contains(oid))?;
    if let Some(commit_id) = found
        && let Some(tag) = index.first(commit_id)
    {
        debug!("closest tag to [{start}] is [{}] on [{commit_id}]", tag.name);
        return Ok(Some(ClosestTag {
            commit_id,
            tag_name: tag.name.clone(),
        }));
    }

    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tag_index::build_tag_index;
    use crate::test_repo::TestRepo;

    #[test]
    fn test_start_commit_itself_tagged() {
        let test_repo = TestRepo::new();
        let head = test_repo.head_id();
        test_repo.tag_annotated("v1.0", head, 1_000);

        let index = build_tag_index(&test_repo.repo, false, "*");
        let closest = find_closest_tag(&test_repo.repo, head, &index)
            .unwrap()
            .unwrap();
        assert_eq!(closest.commit_id, head);
        assert_eq!(closest.tag_name, "v1.0");
    }

    #[test]
    fn test_tag_on_ancestor_is_found() {
        let test_repo = TestRepo::new();
        let root = test_repo.head_id();
        test_repo.tag_annotated("v1.0", root, 1_000);
        test_repo.commit("second");
        let head = test_repo.commit("third");

        let index = build_tag_index(&test_repo.repo, false, "*");
        let closest = find_closest_tag(&test_repo.repo, head, &index)
            .unwrap()
            .unwrap();
        assert_eq!(closest.commit_id, root);
        assert_eq!(closest.tag_name, "v1.0");
    }

    #[test]
    fn test_no_tag_anywhere_in_ancestry() {
        let test_repo = TestRepo::new();
        let head = test_repo.commit("second");

        let index = build_tag_index(&test_repo.repo, false, "*");
        let closest = find_closest_tag(&test_repo.repo, head, &index).unwrap();
        assert!(closest.is_none());
    }

    #[test]
    fn test_most_recent_tag_reported_for_multi_tagged_commit() {
        let test_repo = TestRepo::new();
        let root = test_repo.head_id();
        test_repo.tag_annotated("old", root, 1_000);
        test_repo.tag_annotated("new", root, 2_000);
        let head = test_repo.commit("second");

        let index = build_tag_index(&test_repo.repo, false, "*");
        let closest = find_closest_tag(&test_repo.repo, head, &index)
            .unwrap()
            .unwrap();
        assert_eq!(closest.tag_name, "new");
    }

    #[test]
    fn test_tag_not_reachable_from_start_is_ignored() {
        let test_repo = TestRepo::new();
        let root = test_repo.head_id();
        let side = test_repo.commit_with_parents("side branch", &[root]);
        test_repo.tag_annotated("side-tag", side, 1_000);
        let head = test_repo.commit_with_parents("mainline", &[root]);

        let index = build_tag_index(&test_repo.repo, false, "*");
        let closest = find_closest_tag(&test_repo.repo, head, &index).unwrap();
        assert!(closest.is_none());
    }
}
