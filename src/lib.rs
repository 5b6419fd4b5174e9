//! Nearest-tag and commit-distance queries over a git commit history.
//!
//! Given a starting revision, the crate finds the nearest tag reachable
//! through parent edges and counts the commits separating the two, the
//! computation behind describe-style version strings. The repository is a
//! read-only data source accessed through [`git2`]; nothing here writes
//! objects or touches the network.

pub mod closest_tag;
pub mod describe;
pub mod dirty;
pub mod distance;
pub mod errors;
pub mod pattern;
pub mod tag_index;
pub mod tags_containing;
pub mod test_repo;
pub mod walker;

pub use closest_tag::{ClosestTag, find_closest_tag};
pub use describe::{DescribeOptions, Description, describe, resolve_commit};
pub use dirty::is_dirty;
pub use distance::distance_between;
pub use errors::{GitverError, GitverResult};
pub use tag_index::{ResolvedTag, TagIndex, build_tag_index};
pub use tags_containing::tags_containing;
