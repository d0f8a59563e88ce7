//! Outcome types shared by the push and release decision engines.

use std::fmt;

use crate::github::DispatchRequest;
use crate::types::RepoId;

/// Source and destination of relayed documentation changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayTargets {
    /// Repository whose pushes and releases are watched.
    pub source: RepoId,
    /// Repository that receives the `repository_dispatch` events.
    pub target: RepoId,
}

impl RelayTargets {
    pub fn new(source: RepoId, target: RepoId) -> Self {
        Self { source, target }
    }
}

/// What to do with an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Send this dispatch downstream.
    Dispatch(DispatchRequest),
    /// Nothing to relay.
    Skip(SkipReason),
}

impl Decision {
    pub fn is_dispatch(&self) -> bool {
        matches!(self, Decision::Dispatch(_))
    }
}

/// The first predicate an event failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Push to a ref other than the stable release branch.
    NotStableBranch { git_ref: String },
    /// Push to a repository other than the watched source.
    ForeignRepository { full_name: String },
    /// No commit in the push touched a documentation path.
    NoDocChanges,
    /// Release action other than `released`.
    IgnoredAction { action: String },
    Draft,
    Prerelease,
    /// Tag is not a clean stable semantic version.
    UnstableTag { tag: String },
    /// Tag is older than the published stable version.
    OlderThanStable { tag: String, stable: String },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::NotStableBranch { git_ref } => {
                write!(f, "{git_ref} is not the stable branch")
            }
            SkipReason::ForeignRepository { full_name } => {
                write!(f, "{full_name} is not the source repository")
            }
            SkipReason::NoDocChanges => f.write_str("no documentation changes"),
            SkipReason::IgnoredAction { action } => write!(f, "release action {action} ignored"),
            SkipReason::Draft => f.write_str("draft release"),
            SkipReason::Prerelease => f.write_str("prerelease"),
            SkipReason::UnstableTag { tag } => write!(f, "{tag} is not a stable version"),
            SkipReason::OlderThanStable { tag, stable } => {
                write!(f, "{tag} is older than stable {stable}")
            }
        }
    }
}
