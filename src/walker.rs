use std::collections::{HashSet, VecDeque};

use git2::{Oid, Repository};

use crate::errors::GitverResult;

/// Walks the commit graph breadth-first from `start` along parent edges and
/// returns the first commit satisfying `predicate`, in visitation order.
///
/// The queue is seeded with `start` itself, so the predicate sees the start
/// commit first. Parents are enqueued in the order the repository reports
/// them, which keeps results reproducible for a given repository state.
/// Breadth-first is a "nearest" heuristic, not a guaranteed shortest path
/// across divergent merge topologies; that matches what describe-style
/// tooling is expected to produce.
pub fn find_first_matching<P>(
    repository: &Repository,
    start: Oid,
    mut predicate: P,
) -> GitverResult<Option<Oid>>
where
    P: FnMut(Oid) -> bool,
{
    let mut visited: HashSet<Oid> = HashSet::new();
    let mut queue: VecDeque<Oid> = VecDeque::new();
    queue.push_back(start);

    while let Some(oid) = queue.pop_front() {
        if !visited.insert(oid) {
            continue;
        }

        if predicate(oid) {
            return Ok(Some(oid));
        }

        let commit = repository.find_commit(oid)?;
        for parent in commit.parent_ids() {
            if !visited.contains(&parent) {
                queue.push_back(parent);
            }
        }
    }

    Ok(None)
}

/// Collects the full transitive parent closure of `start`, excluding
/// `start` itself.
pub fn collect_ancestors(repository: &Repository, start: Oid) -> GitverResult<HashSet<Oid>> {
    let mut ancestors: HashSet<Oid> = HashSet::new();
    let mut queue: VecDeque<Oid> = VecDeque::new();
    queue.push_back(start);

    while let Some(oid) = queue.pop_front() {
        let commit = repository.find_commit(oid)?;
        for parent in commit.parent_ids() {
            if ancestors.insert(parent) {
                queue.push_back(parent);
            }
        }
    }

    Ok(ancestors)
}
