//! GitHub API client for the relay's outbound calls.
//!
//! Key features:
//! - `repository_dispatch` via REST, tag to commit resolution via GraphQL
//! - Per-request timeout
//! - Exponential backoff retry for transient failures
//! - Distinguishes transient vs permanent errors

mod client;
mod dispatch;
mod error;
mod retry;

pub use client::{DEFAULT_TIMEOUT, OctocrabClient};
pub use dispatch::{DOC_CHANGES_EVENT, DispatchBody, DispatchRequest, DocsDispatcher};
pub use error::{GitHubApiError, GitHubErrorKind};
pub use retry::{RetryConfig, retry_with_backoff};
