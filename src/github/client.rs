//! Octocrab-backed implementation of [`DocsDispatcher`].
//!
//! - `repository_dispatch` goes through the REST API
//! - tag to commit resolution goes through GraphQL, since the REST release
//!   object only carries `target_commitish`
//!
//! Every attempt is bounded by a timeout and transient failures are retried.

use std::future::Future;
use std::time::Duration;

use octocrab::Octocrab;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::types::{RepoId, Sha};

use super::dispatch::{DispatchRequest, DocsDispatcher};
use super::error::GitHubApiError;
use super::retry::{RetryConfig, retry_with_backoff};

/// Default bound on a single GitHub request.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// GraphQL query for the commit a release tag points at.
const TAG_COMMIT_QUERY: &str = r#"
query($owner: String!, $repo: String!, $tagName: String!) {
    repository(owner: $owner, name: $repo) {
        release(tagName: $tagName) {
            tagCommit {
                oid
            }
        }
    }
}
"#;

#[derive(Debug, Deserialize)]
struct GraphQlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct TagCommitData {
    repository: Option<TagCommitRepository>,
}

#[derive(Debug, Deserialize)]
struct TagCommitRepository {
    release: Option<TagCommitRelease>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TagCommitRelease {
    tag_commit: Option<TagCommit>,
}

#[derive(Debug, Deserialize)]
struct TagCommit {
    oid: String,
}

/// A GitHub API client for sending dispatches and resolving tags.
#[derive(Clone)]
pub struct OctocrabClient {
    client: Octocrab,
    retry: RetryConfig,
    timeout: Duration,
}

impl OctocrabClient {
    pub fn new(client: Octocrab, retry: RetryConfig, timeout: Duration) -> Self {
        Self {
            client,
            retry,
            timeout,
        }
    }

    /// Creates a client authenticated with a personal or installation token.
    pub fn from_token(token: impl Into<String>, timeout: Duration) -> Result<Self, octocrab::Error> {
        let client = Octocrab::builder().personal_token(token.into()).build()?;
        Ok(Self::new(client, RetryConfig::DEFAULT, timeout))
    }

    pub fn inner(&self) -> &Octocrab {
        &self.client
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn post_dispatch(&self, request: &DispatchRequest) -> Result<(), GitHubApiError> {
        let url = format!(
            "/repos/{}/{}/dispatches",
            request.target.owner, request.target.repo
        );

        let response = self
            .client
            ._post(url, Some(&request.body()))
            .await
            .map_err(GitHubApiError::from_octocrab)?;

        // 204 No Content on success; errors carry GitHub's JSON message.
        octocrab::map_github_error(response)
            .await
            .map_err(GitHubApiError::from_octocrab)?;

        Ok(())
    }

    async fn query_tag_commit(&self, repo: &RepoId, tag: &str) -> Result<Sha, GitHubApiError> {
        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct Variables<'a> {
            owner: &'a str,
            repo: &'a str,
            tag_name: &'a str,
        }

        let variables = Variables {
            owner: &repo.owner,
            repo: &repo.repo,
            tag_name: tag,
        };

        let response: GraphQlResponse<TagCommitData> = self
            .client
            .graphql(&serde_json::json!({
                "query": TAG_COMMIT_QUERY,
                "variables": variables,
            }))
            .await
            .map_err(GitHubApiError::from_octocrab)?;

        extract_tag_commit(response, repo, tag)
    }
}

/// Runs one attempt of `operation`, failing transiently on timeout.
async fn with_timeout<T>(
    timeout: Duration,
    operation: impl Future<Output = Result<T, GitHubApiError>>,
) -> Result<T, GitHubApiError> {
    match tokio::time::timeout(timeout, operation).await {
        Ok(result) => result,
        Err(_) => Err(GitHubApiError::transient_without_source(format!(
            "request timed out after {}s",
            timeout.as_secs()
        ))),
    }
}

/// Pulls the commit id out of a tag query response.
fn extract_tag_commit(
    response: GraphQlResponse<TagCommitData>,
    repo: &RepoId,
    tag: &str,
) -> Result<Sha, GitHubApiError> {
    if let Some(first) = response.errors.first() {
        return Err(GitHubApiError::permanent_without_source(format!(
            "GraphQL error resolving {tag} in {repo}: {}",
            first.message
        )));
    }

    response
        .data
        .and_then(|d| d.repository)
        .and_then(|r| r.release)
        .and_then(|r| r.tag_commit)
        .map(|c| Sha::new(c.oid))
        .ok_or_else(|| {
            GitHubApiError::permanent_without_source(format!("release {tag} not found in {repo}"))
        })
}

impl DocsDispatcher for OctocrabClient {
    async fn send_dispatch(&self, request: &DispatchRequest) -> Result<(), GitHubApiError> {
        retry_with_backoff(self.retry, "repository_dispatch", || {
            with_timeout(self.timeout, self.post_dispatch(request))
        })
        .await?;

        info!(
            target_repo = %request.target,
            sha = %request.sha,
            "Sent repository_dispatch"
        );
        Ok(())
    }

    async fn commit_for_tag(&self, repo: &RepoId, tag: &str) -> Result<Sha, GitHubApiError> {
        let sha = retry_with_backoff(self.retry, "tag_commit", || {
            with_timeout(self.timeout, self.query_tag_commit(repo, tag))
        })
        .await?;

        debug!(repo = %repo, tag, sha = %sha, "Resolved release tag");
        Ok(sha)
    }
}

impl std::fmt::Debug for OctocrabClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OctocrabClient")
            .field("retry", &self.retry)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::GitHubErrorKind;

    fn repo() -> RepoId {
        RepoId::new("electron", "electron")
    }

    fn parse(json: &str) -> GraphQlResponse<TagCommitData> {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn extracts_oid() {
        let response = parse(
            r#"{"data":{"repository":{"release":{"tagCommit":{"oid":"0123456789abcdef0123456789abcdef01234567"}}}}}"#,
        );

        let sha = extract_tag_commit(response, &repo(), "v12.0.7").unwrap();
        assert_eq!(sha.as_str(), "0123456789abcdef0123456789abcdef01234567");
    }

    #[test]
    fn missing_release_is_permanent() {
        let response = parse(r#"{"data":{"repository":{"release":null}}}"#);

        let err = extract_tag_commit(response, &repo(), "v99.0.0").unwrap_err();
        assert_eq!(err.kind, GitHubErrorKind::Permanent);
        assert!(err.message.contains("v99.0.0"));
    }

    #[test]
    fn graphql_errors_are_reported() {
        let response = parse(
            r#"{"data":null,"errors":[{"type":"NOT_FOUND","message":"Could not resolve to a Repository"}]}"#,
        );

        let err = extract_tag_commit(response, &repo(), "v12.0.7").unwrap_err();
        assert!(err.message.contains("Could not resolve to a Repository"));
    }

    #[tokio::test(start_paused = true)]
    async fn slow_request_times_out() {
        let result: Result<(), _> = with_timeout(Duration::from_millis(10), async {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(())
        })
        .await;

        let err = result.unwrap_err();
        assert_eq!(err.kind, GitHubErrorKind::Transient);
        assert!(err.message.contains("timed out"));
    }

    #[tokio::test]
    async fn fast_request_passes_through() {
        let result = with_timeout(Duration::from_secs(1), async { Ok(7) }).await;
        assert_eq!(result.unwrap(), 7);
    }
}
