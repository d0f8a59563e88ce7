//! Shared test fixtures and in-memory fakes for the relay's capabilities.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use crate::github::{DispatchRequest, DocsDispatcher, GitHubApiError};
use crate::types::{RepoId, Sha};
use crate::version::{VersionError, VersionSource};
use crate::webhooks::{Commit, PushEvent, RelayTargets, Release, ReleaseEvent, Repository};

/// `after` of every push built by [`push_event`].
pub const PUSH_AFTER_SHA: &str = "9f1b2c3d4e5f60718293a4b5c6d7e8f901234567";

/// The commit [`RecordingDispatcher`] resolves every tag to.
pub const RESOLVED_TAG_SHA: &str = "0123456789abcdef0123456789abcdef01234567";

/// electron/electron relayed to electron/electronjs.org-new.
pub fn relay_targets() -> RelayTargets {
    RelayTargets::new(
        RepoId::new("electron", "electron"),
        RepoId::new("electron", "electronjs.org-new"),
    )
}

pub fn push_event(git_ref: &str, full_name: &str, commits: Vec<Commit>) -> PushEvent {
    PushEvent {
        git_ref: git_ref.to_string(),
        repository: Repository {
            full_name: full_name.to_string(),
        },
        commits,
        after: Sha::new(PUSH_AFTER_SHA),
    }
}

/// A published, non-draft, non-prerelease release cut from its major's branch.
pub fn release_event(action: &str, tag: &str) -> ReleaseEvent {
    let major = tag
        .trim_start_matches('v')
        .split('.')
        .next()
        .unwrap_or_default();

    ReleaseEvent {
        action: action.to_string(),
        release: Release {
            draft: false,
            prerelease: false,
            tag_name: tag.to_string(),
            target_commitish: format!("{major}-x-y"),
        },
    }
}

/// A [`VersionSource`] that returns a settable version and counts lookups.
#[derive(Debug)]
pub struct FakeVersionSource {
    version: Mutex<String>,
    lookups: AtomicUsize,
    fail_next: AtomicBool,
}

impl FakeVersionSource {
    pub fn new(version: &str) -> Self {
        Self {
            version: Mutex::new(version.to_string()),
            lookups: AtomicUsize::new(0),
            fail_next: AtomicBool::new(false),
        }
    }

    /// How many times `latest_version` has been called, failures included.
    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }

    pub fn set_version(&self, version: &str) {
        *self.version.lock().unwrap() = version.to_string();
    }

    /// Makes the next lookup fail.
    pub fn fail_next(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }
}

impl VersionSource for FakeVersionSource {
    async fn latest_version(&self) -> Result<String, VersionError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);

        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(VersionError::Unavailable("registry unreachable".into()));
        }

        Ok(self.version.lock().unwrap().clone())
    }
}

/// A [`DocsDispatcher`] that records what it was asked to do.
#[derive(Debug, Default)]
pub struct RecordingDispatcher {
    sent: Mutex<Vec<DispatchRequest>>,
    resolved_tags: Mutex<Vec<(String, String)>>,
    fail_dispatches: AtomicBool,
}

impl RecordingDispatcher {
    /// Dispatches sent so far, in order.
    pub fn sent(&self) -> Vec<DispatchRequest> {
        self.sent.lock().unwrap().clone()
    }

    /// `(repo, tag)` pairs passed to `commit_for_tag`.
    pub fn resolved_tags(&self) -> Vec<(String, String)> {
        self.resolved_tags.lock().unwrap().clone()
    }

    /// Makes every subsequent dispatch fail.
    pub fn fail_dispatches(&self) {
        self.fail_dispatches.store(true, Ordering::SeqCst);
    }
}

impl DocsDispatcher for RecordingDispatcher {
    async fn send_dispatch(&self, request: &DispatchRequest) -> Result<(), GitHubApiError> {
        if self.fail_dispatches.load(Ordering::SeqCst) {
            return Err(GitHubApiError::permanent_without_source(
                "Bad credentials (HTTP 401)",
            ));
        }

        self.sent.lock().unwrap().push(request.clone());
        Ok(())
    }

    async fn commit_for_tag(&self, repo: &RepoId, tag: &str) -> Result<Sha, GitHubApiError> {
        self.resolved_tags
            .lock()
            .unwrap()
            .push((repo.full_name(), tag.to_string()));
        Ok(Sha::new(RESOLVED_TAG_SHA))
    }
}
