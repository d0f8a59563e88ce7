//! GitHub webhook event payloads.
//!
//! Only the fields the relay's decisions read are modelled. Everything else in
//! GitHub's payload is ignored by serde, so new fields on GitHub's side never
//! break parsing.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::Sha;

/// The webhook event types the relay has a pipeline for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Push,
    Release,
}

impl EventKind {
    /// The value GitHub sends in `X-GitHub-Event` for this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Push => "push",
            EventKind::Release => "release",
        }
    }

    /// Maps an `X-GitHub-Event` header value to a kind, case-sensitively.
    pub fn from_header(value: &str) -> Option<Self> {
        match value {
            "push" => Some(EventKind::Push),
            "release" => Some(EventKind::Release),
            _ => None,
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A `push` event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushEvent {
    /// The full ref that was pushed, e.g. `refs/heads/12-x-y`.
    #[serde(rename = "ref")]
    pub git_ref: String,

    pub repository: Repository,

    #[serde(default)]
    pub commits: Vec<Commit>,

    /// The SHA of the most recent commit on the ref after the push.
    pub after: Sha,
}

/// The subset of a repository object the relay reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repository {
    /// `owner/name`.
    pub full_name: String,
}

/// A commit inside a push, with the paths it touched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    #[serde(default)]
    pub added: Vec<String>,
    #[serde(default)]
    pub modified: Vec<String>,
    #[serde(default)]
    pub removed: Vec<String>,
}

impl Commit {
    /// Iterates over every path the commit added, modified or removed.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.modified
            .iter()
            .chain(&self.added)
            .chain(&self.removed)
            .map(String::as_str)
    }
}

/// A `release` event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseEvent {
    /// `published`, `released`, `prereleased`, `created`, ...
    pub action: String,
    pub release: Release,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Release {
    #[serde(default)]
    pub draft: bool,
    #[serde(default)]
    pub prerelease: bool,
    pub tag_name: String,
    /// Branch name or commit SHA the tag was created from.
    pub target_commitish: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn event_kind_from_header_is_case_sensitive() {
        assert_eq!(EventKind::from_header("push"), Some(EventKind::Push));
        assert_eq!(EventKind::from_header("release"), Some(EventKind::Release));
        assert_eq!(EventKind::from_header("Push"), None);
        assert_eq!(EventKind::from_header("pull_request"), None);
        assert_eq!(EventKind::from_header(""), None);
    }

    #[test]
    fn push_event_parses_github_payload() {
        let body = json!({
            "ref": "refs/heads/12-x-y",
            "before": "0000000000000000000000000000000000000000",
            "after": "9f1b2c3d4e5f60718293a4b5c6d7e8f901234567",
            "repository": { "full_name": "electron/electron", "name": "electron" },
            "pusher": { "name": "octocat" },
            "commits": [
                { "id": "9f1b2c3", "added": ["docs/api/app.md"], "modified": [], "removed": [] }
            ]
        });

        let event: PushEvent = serde_json::from_value(body).unwrap();

        assert_eq!(event.git_ref, "refs/heads/12-x-y");
        assert_eq!(event.repository.full_name, "electron/electron");
        assert_eq!(event.after.as_str(), "9f1b2c3d4e5f60718293a4b5c6d7e8f901234567");
        assert_eq!(event.commits.len(), 1);
        assert_eq!(event.commits[0].added, vec!["docs/api/app.md"]);
    }

    #[test]
    fn push_event_tolerates_missing_file_lists() {
        let body = json!({
            "ref": "refs/heads/main",
            "after": "abc",
            "repository": { "full_name": "electron/electron" },
            "commits": [{ "id": "abc" }]
        });

        let event: PushEvent = serde_json::from_value(body).unwrap();
        assert_eq!(event.commits[0].paths().count(), 0);
    }

    #[test]
    fn push_event_requires_repository() {
        let body = json!({ "ref": "refs/heads/main", "after": "abc", "commits": [] });
        assert!(serde_json::from_value::<PushEvent>(body).is_err());
    }

    #[test]
    fn commit_paths_cover_all_lists() {
        let commit = Commit {
            added: vec!["a".into()],
            modified: vec!["m".into()],
            removed: vec!["r".into()],
        };
        let mut paths: Vec<_> = commit.paths().collect();
        paths.sort();
        assert_eq!(paths, vec!["a", "m", "r"]);
    }

    #[test]
    fn release_event_parses_github_payload() {
        let body = json!({
            "action": "released",
            "release": {
                "id": 1,
                "tag_name": "v12.0.7",
                "target_commitish": "12-x-y",
                "draft": false,
                "prerelease": false,
                "name": "electron v12.0.7"
            },
            "repository": { "full_name": "electron/electron" }
        });

        let event: ReleaseEvent = serde_json::from_value(body).unwrap();

        assert_eq!(event.action, "released");
        assert_eq!(event.release.tag_name, "v12.0.7");
        assert_eq!(event.release.target_commitish, "12-x-y");
        assert!(!event.release.draft);
        assert!(!event.release.prerelease);
    }
}
