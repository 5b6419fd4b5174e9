use git2::{Oid, Repository};
use tracing::debug;

use crate::closest_tag::find_closest_tag;
use crate::distance::distance_between;
use crate::errors::{GitverError, GitverResult};
use crate::tag_index::build_tag_index;

/// Controls which commit is described and which tags participate.
#[derive(Debug, Clone)]
pub struct DescribeOptions {
    /// Revision expression naming the commit to describe.
    pub commitish: String,
    /// Whether lightweight tags participate alongside annotated ones.
    pub include_lightweight_tags: bool,
    /// Glob over tag names, anchored against the full ref path; `*` and `?`
    /// are the only wildcards.
    pub match_pattern: String,
}

impl Default for DescribeOptions {
    fn default() -> Self {
        Self {
            commitish: "HEAD".to_string(),
            include_lightweight_tags: false,
            match_pattern: "*".to_string(),
        }
    }
}

/// The nearest reachable tag and the corrected commit count to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Description {
    pub tag_name: String,
    pub distance: usize,
    /// The commit that was described.
    pub commit_id: Oid,
    /// The commit the tag identifies; equals `commit_id` at distance 0.
    pub tagged_commit_id: Oid,
}

/// Resolves a revision expression to a commit id.
///
/// Failure here is fatal to a describe query; there is nothing to walk
/// without a starting commit.
pub fn resolve_commit(repository: &Repository, revision: &str) -> GitverResult<Oid> {
    let commit = repository
        .revparse_single(revision)
        .and_then(|object| object.peel_to_commit())
        .map_err(|source| GitverError::RevisionNotFound {
            revision: revision.to_string(),
            source,
        })?;
    debug!("resolved [{revision}] to commit [{}]", commit.id());
    Ok(commit.id())
}

/// Describes a commit: the nearest tag reachable through parent edges plus
/// the corrected number of commits separating the two.
///
/// The tag index is built fresh for every call so the answer reflects the
/// repository as it stands. `Ok(None)` means no matching tag is reachable
/// from the resolved commit; the caller decides whether that is an error.
pub fn describe(
    repository: &Repository,
    options: &DescribeOptions,
) -> GitverResult<Option<Description>> {
    let start = resolve_commit(repository, &options.commitish)?;
    let index = build_tag_index(
        repository,
        options.include_lightweight_tags,
        &options.match_pattern,
    );

    let Some(closest) = find_closest_tag(repository, start, &index)? else {
        debug!("no tag reachable from [{start}]");
        return Ok(None);
    };

    let distance = distance_between(repository, start, closest.commit_id)?;
    Ok(Some(Description {
        tag_name: closest.tag_name,
        distance,
        commit_id: start,
        tagged_commit_id: closest.commit_id,
    }))
}
