//! Decision engine for `release` events.
//!
//! Tags look like `v14.0.0-nightly.20210504`, `v13.0.0-beta.21` or `v10.4.5`.
//! Only published, stable tags at least as new as the version on the package
//! registry are relayed. The registry publish can lag the GitHub release by a
//! minute or two, so a tag equal to or newer than the cached version passes.

use semver::Version;

use crate::github::DispatchRequest;
use crate::types::Sha;

use super::decision::{Decision, RelayTargets, SkipReason};
use super::events::ReleaseEvent;

/// The release action that marks a release as published and not a prerelease.
pub const RELEASED_ACTION: &str = "released";

/// Parses a tag as a clean stable version.
///
/// A single leading `v` is stripped. The rest must be a semantic version with
/// no pre-release or build suffix that prints back exactly as written, so
/// `12.0.6` passes while `12.0.6-beta.1`, `12.0.6+build` and `012.0.6` do not.
pub fn stable_tag_version(tag: &str) -> Option<Version> {
    let stripped = tag.strip_prefix('v').unwrap_or(tag);
    let version = Version::parse(stripped).ok()?;

    let clean = version.pre.is_empty()
        && version.build.is_empty()
        && version.to_string() == stripped;
    clean.then_some(version)
}

/// Decides whether a release should be relayed.
pub fn decide_release(event: &ReleaseEvent, stable: &Version, targets: &RelayTargets) -> Decision {
    let release = &event.release;

    if event.action != RELEASED_ACTION {
        return Decision::Skip(SkipReason::IgnoredAction {
            action: event.action.clone(),
        });
    }

    if release.draft {
        return Decision::Skip(SkipReason::Draft);
    }

    if release.prerelease {
        return Decision::Skip(SkipReason::Prerelease);
    }

    let Some(version) = stable_tag_version(&release.tag_name) else {
        return Decision::Skip(SkipReason::UnstableTag {
            tag: release.tag_name.clone(),
        });
    };

    if version < *stable {
        return Decision::Skip(SkipReason::OlderThanStable {
            tag: release.tag_name.clone(),
            stable: stable.to_string(),
        });
    }

    Decision::Dispatch(DispatchRequest::new(
        targets.target.clone(),
        Sha::new(&release.target_commitish),
    ))
}
