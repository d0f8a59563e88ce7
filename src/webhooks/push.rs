//! Decision engine for `push` events.
//!
//! A push is relayed when it lands on the current stable release branch of
//! the source repository and touches documentation.

use crate::github::DispatchRequest;
use crate::version::VersionInfo;

use super::decision::{Decision, RelayTargets, SkipReason};
use super::events::PushEvent;

/// Folder name a changed path must contain to count as a docs change.
pub const DOCS_FOLDER: &str = "docs";

/// Returns true if any commit in the push added, modified or removed a path
/// containing `folder`.
///
/// This is a plain substring match, so `adocs/readme.md` also counts.
pub fn touches_folder(event: &PushEvent, folder: &str) -> bool {
    event
        .commits
        .iter()
        .any(|commit| commit.paths().any(|path| path.contains(folder)))
}

/// Decides whether a push should be relayed.
pub fn decide_push(event: &PushEvent, stable: &VersionInfo, targets: &RelayTargets) -> Decision {
    if event.git_ref != stable.branch_ref() {
        return Decision::Skip(SkipReason::NotStableBranch {
            git_ref: event.git_ref.clone(),
        });
    }

    if event.repository.full_name != targets.source.full_name() {
        return Decision::Skip(SkipReason::ForeignRepository {
            full_name: event.repository.full_name.clone(),
        });
    }

    if !touches_folder(event, DOCS_FOLDER) {
        return Decision::Skip(SkipReason::NoDocChanges);
    }

    Decision::Dispatch(DispatchRequest::new(
        targets.target.clone(),
        event.after.clone(),
    ))
}
