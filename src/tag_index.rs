use std::cmp::Ordering;
use std::collections::HashMap;

use git2::{ObjectType, Oid, Repository, Tag};
use tracing::{debug, warn};

use crate::errors::{GitverError, GitverResult};
use crate::pattern::compile_match_pattern;

/// Upper bound on tag-of-tag dereferencing. A well-formed repository cannot
/// contain a tag cycle, but a corrupt one must not hang the walk.
const MAX_TAG_CHAIN_DEPTH: usize = 32;

/// A tag resolved to the terminal commit of its chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTag {
    /// Display name: the ref path with the `refs/tags/` prefix stripped.
    pub name: String,
    /// Tagger date of the outermost tag in the chain, in epoch seconds.
    /// Lightweight tags carry none.
    pub tagged_at: Option<i64>,
}

/// Mapping from commit id to the tags identifying it, most recent first.
///
/// Entries reflect the repository at the moment of construction; build a
/// fresh index per query rather than reusing one across repository changes.
#[derive(Debug, Default)]
pub struct TagIndex {
    commits_to_tags: HashMap<Oid, Vec<ResolvedTag>>,
}

impl TagIndex {
    pub fn contains(&self, commit_id: Oid) -> bool {
        self.commits_to_tags.contains_key(&commit_id)
    }

    /// All tags on `commit_id`, most recent first.
    pub fn tags_for(&self, commit_id: Oid) -> Option<&[ResolvedTag]> {
        self.commits_to_tags.get(&commit_id).map(Vec::as_slice)
    }

    /// The most recent tag on `commit_id`.
    pub fn first(&self, commit_id: Oid) -> Option<&ResolvedTag> {
        self.commits_to_tags
            .get(&commit_id)
            .and_then(|tags| tags.first())
    }

    pub fn is_empty(&self) -> bool {
        self.commits_to_tags.is_empty()
    }

    /// Number of distinct tagged commits.
    pub fn len(&self) -> usize {
        self.commits_to_tags.len()
    }
}

/// Scans all tag refs and builds a commit-to-tags index.
///
/// Refs whose full path does not match `match_pattern` (a `*`/`?` glob) are
/// skipped. Annotated tags are dereferenced through tag-of-tag chains to
/// their terminal commit and dated by the outermost tag; lightweight tags
/// participate only when `include_lightweight_tags` is set and carry no
/// date. A tag that fails to resolve is logged and skipped, and a failure to
/// enumerate tags at all yields an empty index; neither aborts the query.
pub fn build_tag_index(
    repository: &Repository,
    include_lightweight_tags: bool,
    match_pattern: &str,
) -> TagIndex {
    let regex = match compile_match_pattern(match_pattern) {
        Ok(regex) => regex,
        Err(err) => {
            warn!("unusable tag match pattern [{match_pattern}]: {err}");
            return TagIndex::default();
        }
    };

    let mut commits_to_tags: HashMap<Oid, Vec<ResolvedTag>> = HashMap::new();

    let enumeration = repository.tag_foreach(|ref_target, ref_name| {
        let ref_path = String::from_utf8_lossy(ref_name).into_owned();
        if !regex.is_match(&ref_path) {
            debug!("skipping tag ref [{ref_path}]: does not match [{match_pattern}]");
            return true;
        }

        match resolve_tag_ref(repository, ref_target, &ref_path, include_lightweight_tags) {
            Ok(Some((commit_id, tag))) => {
                commits_to_tags.entry(commit_id).or_default().push(tag);
            }
            Ok(None) => {}
            Err(err) => warn!("skipping tag ref [{ref_path}]: {err}"),
        }
        true
    });

    if let Err(err) = enumeration {
        warn!("unable to enumerate tag refs: {err}");
        return TagIndex::default();
    }

    for tags in commits_to_tags.values_mut() {
        tags.sort_by(recency_order);
    }

    TagIndex { commits_to_tags }
}

/// Resolves one tag ref to its terminal commit, or `None` when a lightweight
/// tag is excluded by configuration.
fn resolve_tag_ref(
    repository: &Repository,
    ref_target: Oid,
    ref_path: &str,
    include_lightweight_tags: bool,
) -> GitverResult<Option<(Oid, ResolvedTag)>> {
    let name = ref_path
        .strip_prefix("refs/tags/")
        .unwrap_or(ref_path)
        .to_string();

    match repository.find_tag(ref_target) {
        Ok(tag) => {
            // The outermost tag's date orders the index even when the chain
            // runs through further tag objects.
            let tagged_at = tag.tagger().map(|tagger| tagger.when().seconds());
            let commit_id = dereference_chain(&tag, ref_path)?;
            Ok(Some((commit_id, ResolvedTag { name, tagged_at })))
        }
        Err(_) => {
            // Not a tag object, so the ref points straight at its target: a
            // lightweight tag.
            if !include_lightweight_tags {
                debug!("skipping lightweight tag [{ref_path}]");
                return Ok(None);
            }
            let commit = repository.find_commit(ref_target)?;
            Ok(Some((
                commit.id(),
                ResolvedTag {
                    name,
                    tagged_at: None,
                },
            )))
        }
    }
}

/// Follows a tag-of-tag chain to its terminal commit. A chain ending at any
/// other object kind cannot key the index and is rejected.
fn dereference_chain(tag: &Tag<'_>, ref_path: &str) -> GitverResult<Oid> {
    let mut target = tag.target()?;
    for _ in 0..MAX_TAG_CHAIN_DEPTH {
        match target.kind() {
            Some(ObjectType::Commit) => return Ok(target.id()),
            Some(ObjectType::Tag) => {
                target = match target.into_tag() {
                    Ok(inner) => inner.target()?,
                    Err(_) => {
                        return Err(git2::Error::from_str(
                            "object advertised as a tag could not be read",
                        )
                        .into());
                    }
                };
            }
            other => {
                return Err(git2::Error::from_str(&format!(
                    "tag chain ends at a {} object instead of a commit",
                    other.map(|kind| kind.str()).unwrap_or("unknown")
                ))
                .into());
            }
        }
    }

    Err(GitverError::TagChainTooDeep {
        ref_path: ref_path.to_string(),
        limit: MAX_TAG_CHAIN_DEPTH,
    })
}

/// Most recent first; undated (lightweight) entries after dated ones; ties
/// broken by lexical tag name so the order is deterministic.
fn recency_order(a: &ResolvedTag, b: &ResolvedTag) -> Ordering {
    match (a.tagged_at, b.tagged_at) {
        (Some(a_date), Some(b_date)) => b_date.cmp(&a_date).then_with(|| a.name.cmp(&b.name)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.name.cmp(&b.name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_repo::TestRepo;

    #[test]
    fn test_annotated_tag_maps_to_its_commit() {
        let test_repo = TestRepo::new();
        let head = test_repo.head_id();
        test_repo.tag_annotated("v1.0", head, 1_000);

        let index = build_tag_index(&test_repo.repo, false, "*");
        assert_eq!(index.len(), 1);
        assert_eq!(index.first(head).unwrap().name, "v1.0");
        assert_eq!(index.first(head).unwrap().tagged_at, Some(1_000));
    }

    #[test]
    fn test_lightweight_tags_excluded_by_default() {
        let test_repo = TestRepo::new();
        let head = test_repo.head_id();
        test_repo.tag_lightweight("v1.0-light", head);

        let index = build_tag_index(&test_repo.repo, false, "*");
        assert!(index.is_empty());
        assert!(!index.contains(head));
    }

    #[test]
    fn test_lightweight_tags_included_when_requested() {
        let test_repo = TestRepo::new();
        let head = test_repo.head_id();
        test_repo.tag_lightweight("v1.0-light", head);

        let index = build_tag_index(&test_repo.repo, true, "*");
        let tag = index.first(head).unwrap();
        assert_eq!(tag.name, "v1.0-light");
        assert_eq!(tag.tagged_at, None);
    }

    #[test]
    fn test_pattern_filters_refs() {
        let test_repo = TestRepo::new();
        let head = test_repo.head_id();
        test_repo.tag_annotated("v1.0", head, 1_000);
        test_repo.tag_annotated("release-1.0", head, 2_000);

        let index = build_tag_index(&test_repo.repo, false, "v*");
        let tags = index.tags_for(head).unwrap();
        assert_eq!(tags.len(), 1);
        assert_eq!(tags[0].name, "v1.0");
    }

    #[test]
    fn test_tag_of_tag_resolves_to_terminal_commit() {
        let test_repo = TestRepo::new();
        let head = test_repo.head_id();
        let inner = test_repo.tag_annotated("inner", head, 1_000);
        test_repo.tag_of_tag("outer", inner, 2_000);

        let index = build_tag_index(&test_repo.repo, false, "outer");
        let tag = index.first(head).unwrap();
        assert_eq!(tag.name, "outer");
        // Outermost tag's date, not the inner one's.
        assert_eq!(tag.tagged_at, Some(2_000));
    }

    #[test]
    fn test_tag_chain_beyond_dereference_bound_is_skipped() {
        let test_repo = TestRepo::new();
        let head = test_repo.head_id();
        let mut chain = test_repo.tag_annotated("chain-0", head, 1_000);
        for depth in 1..=40 {
            chain = test_repo.tag_of_tag(&format!("chain-{}", depth), chain, 1_000 + depth as i64);
        }

        // 40 levels of dereferencing exceed the bound; the tag is skipped.
        let index = build_tag_index(&test_repo.repo, false, "chain-40");
        assert!(index.is_empty());

        // A chain within the bound still resolves to the terminal commit.
        let index = build_tag_index(&test_repo.repo, false, "chain-5");
        assert_eq!(index.first(head).unwrap().name, "chain-5");
    }

    #[test]
    fn test_annotated_tag_of_non_commit_is_skipped() {
        let test_repo = TestRepo::new();
        let head = test_repo.head_id();
        let tree_id = test_repo.repo.find_commit(head).unwrap().tree_id();
        test_repo.tag_annotated("on-a-tree", tree_id, 1_000);

        let index = build_tag_index(&test_repo.repo, false, "*");
        assert!(index.is_empty());
    }

    #[test]
    fn test_multiple_tags_sorted_most_recent_first() {
        let test_repo = TestRepo::new();
        let head = test_repo.head_id();
        test_repo.tag_annotated("older", head, 1_000);
        test_repo.tag_annotated("newest", head, 3_000);
        test_repo.tag_annotated("middle", head, 2_000);

        let index = build_tag_index(&test_repo.repo, false, "*");
        let names: Vec<&str> = index
            .tags_for(head)
            .unwrap()
            .iter()
            .map(|tag| tag.name.as_str())
            .collect();
        assert_eq!(names, vec!["newest", "middle", "older"]);
    }

    #[test]
    fn test_undated_tags_sort_after_dated_ones() {
        let test_repo = TestRepo::new();
        let head = test_repo.head_id();
        test_repo.tag_lightweight("zz-light", head);
        test_repo.tag_annotated("v1.0", head, 1_000);
        test_repo.tag_lightweight("aa-light", head);

        let index = build_tag_index(&test_repo.repo, true, "*");
        let names: Vec<&str> = index
            .tags_for(head)
            .unwrap()
            .iter()
            .map(|tag| tag.name.as_str())
            .collect();
        assert_eq!(names, vec!["v1.0", "aa-light", "zz-light"]);
    }

    #[test]
    fn test_same_date_ties_break_lexically() {
        let test_repo = TestRepo::new();
        let head = test_repo.head_id();
        test_repo.tag_annotated("beta", head, 1_000);
        test_repo.tag_annotated("alpha", head, 1_000);

        let index = build_tag_index(&test_repo.repo, false, "*");
        let names: Vec<&str> = index
            .tags_for(head)
            .unwrap()
            .iter()
            .map(|tag| tag.name.as_str())
            .collect();
        assert_eq!(names, vec!["alpha", "beta"]);
    }

    #[test]
    fn test_tags_on_different_commits_index_separately() {
        let test_repo = TestRepo::new();
        let first = test_repo.head_id();
        let second = test_repo.commit("second");
        test_repo.tag_annotated("v1.0", first, 1_000);
        test_repo.tag_annotated("v2.0", second, 2_000);

        let index = build_tag_index(&test_repo.repo, false, "*");
        assert_eq!(index.len(), 2);
        assert_eq!(index.first(first).unwrap().name, "v1.0");
        assert_eq!(index.first(second).unwrap().name, "v2.0");
    }
}
