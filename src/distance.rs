use std::collections::{HashSet, VecDeque};

use git2::{Oid, Repository};

use crate::errors::{GitverError, GitverResult};
use crate::walker::collect_ancestors;

/// Counts the commits separating `child` from `ancestor`.
///
/// A naive breadth-first count over-counts whenever a merge commit
/// reintroduces history the ancestor already owns: the side branch and the
/// ancestor's own lineage share commits that would each be counted once.
/// When the walk reaches `ancestor`, its full parent closure is computed and
/// every commit shared with the commits counted so far is subtracted back
/// out, then the closure is merged into the visited set so the remaining
/// walk skips it.
///
/// `ancestor` must be reachable from `child`; otherwise the call fails with
/// both endpoints named instead of returning a misleading count.
pub fn distance_between(
    repository: &Repository,
    child: Oid,
    ancestor: Oid,
) -> GitverResult<usize> {
    if child == ancestor {
        return Ok(0);
    }

    let mut counted: HashSet<Oid> = HashSet::new();
    let mut queue: VecDeque<Oid> = VecDeque::new();
    queue.push_back(child);

    let mut distance: i64 = 0;
    let mut ancestor_reached = false;

    while let Some(oid) = queue.pop_front() {
        if !counted.insert(oid) {
            continue;
        }

        if oid == ancestor {
            let ancestor_history = collect_ancestors(repository, ancestor)?;
            // Commits reachable from both the walk so far and the ancestor's
            // own history were counted once too many.
            distance -= counted.intersection(&ancestor_history).count() as i64;
            counted.extend(ancestor_history);
            ancestor_reached = true;
            continue;
        }

        let commit = repository.find_commit(oid)?;
        for parent in commit.parent_ids() {
            if !counted.contains(&parent) {
                queue.push_back(parent);
            }
        }
        distance += 1;
    }

    if !ancestor_reached {
        return Err(GitverError::AncestorUnreachable { child, ancestor });
    }

    debug_assert!(distance >= 0);
    Ok(distance as usize)
}
