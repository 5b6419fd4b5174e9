use git2::Error as Git2Error;
use git2::Oid;
use regex::Error as RegexError;
use std::fmt;

#[derive(Debug)]
pub enum GitverError {
    GitError(Git2Error),
    PatternError(RegexError),
    /// The starting revision expression could not be resolved to a commit.
    RevisionNotFound {
        revision: String,
        source: Git2Error,
    },
    /// Distance was requested against an ancestor the child cannot reach.
    AncestorUnreachable {
        child: Oid,
        ancestor: Oid,
    },
    /// A tag-of-tag chain exceeded the dereference bound without reaching a
    /// commit, which a well-formed repository cannot produce.
    TagChainTooDeep {
        ref_path: String,
        limit: usize,
    },
}

impl From<Git2Error> for GitverError {
    fn from(error: Git2Error) -> Self {
        GitverError::GitError(error)
    }
}

impl From<RegexError> for GitverError {
    fn from(error: RegexError) -> Self {
        GitverError::PatternError(error)
    }
}

impl fmt::Display for GitverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GitverError::GitError(e) => write!(f, "Git error: {}", e),
            GitverError::PatternError(e) => write!(f, "Invalid tag match pattern: {}", e),
            GitverError::RevisionNotFound { revision, source } => {
                write!(f, "Unable to resolve revision '{}': {}", revision, source)
            }
            GitverError::AncestorUnreachable { child, ancestor } => {
                write!(
                    f,
                    "Commit {} is not reachable from {}, cannot compute distance",
                    ancestor, child
                )
            }
            GitverError::TagChainTooDeep { ref_path, limit } => {
                write!(
                    f,
                    "Tag '{}' did not dereference to a commit within {} steps",
                    ref_path, limit
                )
            }
        }
    }
}

impl std::error::Error for GitverError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GitverError::GitError(e) => Some(e),
            GitverError::PatternError(e) => Some(e),
            GitverError::RevisionNotFound { source, .. } => Some(source),
            _ => None,
        }
    }
}

pub type GitverResult<T> = Result<T, GitverError>;
