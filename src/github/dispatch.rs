//! The downstream notification and the capability that sends it.

use std::future::Future;

use serde::Serialize;

use crate::types::{RepoId, Sha};

use super::error::GitHubApiError;

/// `event_type` of every dispatch the relay sends.
pub const DOC_CHANGES_EVENT: &str = "doc_changes";

/// A "documentation changed at `sha`" notification for `target`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchRequest {
    pub target: RepoId,
    pub sha: Sha,
}

impl DispatchRequest {
    pub fn new(target: RepoId, sha: Sha) -> Self {
        Self { target, sha }
    }

    /// The JSON body of `POST /repos/{owner}/{repo}/dispatches`.
    pub fn body(&self) -> DispatchBody<'_> {
        DispatchBody {
            event_type: DOC_CHANGES_EVENT,
            client_payload: ClientPayload {
                sha: self.sha.as_str(),
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DispatchBody<'a> {
    event_type: &'static str,
    client_payload: ClientPayload<'a>,
}

#[derive(Debug, Serialize)]
struct ClientPayload<'a> {
    sha: &'a str,
}

/// Outbound GitHub operations the webhook handlers need.
///
/// # Example (fake for testing)
///
/// ```ignore
/// struct Recorder(Mutex<Vec<DispatchRequest>>);
///
/// impl DocsDispatcher for Recorder {
///     async fn send_dispatch(&self, request: &DispatchRequest) -> Result<(), GitHubApiError> {
///         self.0.lock().unwrap().push(request.clone());
///         Ok(())
///     }
///
///     async fn commit_for_tag(&self, _repo: &RepoId, _tag: &str) -> Result<Sha, GitHubApiError> {
///         Ok(Sha::new("0123456789abcdef0123456789abcdef01234567"))
///     }
/// }
/// ```
pub trait DocsDispatcher {
    /// Sends a `repository_dispatch` event.
    fn send_dispatch(
        &self,
        request: &DispatchRequest,
    ) -> impl Future<Output = Result<(), GitHubApiError>> + Send;

    /// Resolves the commit a release tag points at.
    fn commit_for_tag(
        &self,
        repo: &RepoId,
        tag: &str,
    ) -> impl Future<Output = Result<Sha, GitHubApiError>> + Send;
}
