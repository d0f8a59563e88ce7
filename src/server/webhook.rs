//! Webhook endpoint handlers.
//!
//! Each handler admits the delivery through its gates, parses the raw body,
//! asks the decision engine whether to relay, and sends the dispatch if so.
//! Deliveries that are admitted always get 200, whether or not anything was
//! relayed. Failures talking to the registry or GitHub surface as 502.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::{debug, error, info, warn};

use super::AppState;
use super::pipeline::{Delivery, HEADER_EVENT, admit, gates_for};
use crate::github::{DispatchRequest, DocsDispatcher, GitHubApiError};
use crate::version::{VersionError, VersionSource};
use crate::webhooks::{
    Decision, EventKind, EventMismatch, PushEvent, ReleaseEvent, decide_push, decide_release,
};

/// Response body when a dispatch was sent.
pub const HANDLED: &str = "Handled";
/// Response body when the event did not warrant a dispatch.
pub const UNHANDLED: &str = "Unhandled";

/// Errors that can occur when processing a webhook.
#[derive(Debug, Error)]
pub enum WebhookError {
    /// A secret is configured and the delivery is unsigned.
    #[error("missing signature in payload")]
    MissingSignature,

    /// The signature does not match the body.
    #[error("invalid signature")]
    InvalidSignature,

    /// The delivery's event type does not belong on this route.
    #[error(transparent)]
    EventMismatch(#[from] EventMismatch),

    /// The combined route received an event it has no pipeline for.
    #[error("unsupported event: {}", .0.as_deref().unwrap_or("none"))]
    UnsupportedEvent(Option<String>),

    /// Invalid JSON body.
    #[error("invalid JSON body: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// The stable version could not be resolved.
    #[error(transparent)]
    VersionLookup(#[from] VersionError),

    /// Sending the dispatch or resolving the release commit failed.
    #[error(transparent)]
    GitHub(#[from] GitHubApiError),
}

impl WebhookError {
    pub fn status(&self) -> StatusCode {
        match self {
            WebhookError::MissingSignature
            | WebhookError::InvalidSignature
            | WebhookError::EventMismatch(_)
            | WebhookError::UnsupportedEvent(_)
            | WebhookError::InvalidJson(_) => StatusCode::BAD_REQUEST,
            WebhookError::VersionLookup(_) | WebhookError::GitHub(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for WebhookError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, "Webhook processing failed");
        }
        (status, self.to_string()).into_response()
    }
}

type WebhookResult = Result<(StatusCode, &'static str), WebhookError>;

/// `POST /webhook/push`.
pub async fn push_handler<D, S>(
    State(app_state): State<AppState<D, S>>,
    headers: HeaderMap,
    body: Bytes,
) -> WebhookResult
where
    D: DocsDispatcher + Send + Sync + 'static,
    S: VersionSource + Send + Sync + 'static,
{
    handle_push(&app_state, Delivery::new(&headers, &body)).await
}

/// `POST /webhook/release`.
pub async fn release_handler<D, S>(
    State(app_state): State<AppState<D, S>>,
    headers: HeaderMap,
    body: Bytes,
) -> WebhookResult
where
    D: DocsDispatcher + Send + Sync + 'static,
    S: VersionSource + Send + Sync + 'static,
{
    handle_release(&app_state, Delivery::new(&headers, &body)).await
}

/// `POST /webhook`: picks the pipeline from `X-GitHub-Event`.
pub async fn webhook_handler<D, S>(
    State(app_state): State<AppState<D, S>>,
    headers: HeaderMap,
    body: Bytes,
) -> WebhookResult
where
    D: DocsDispatcher + Send + Sync + 'static,
    S: VersionSource + Send + Sync + 'static,
{
    let delivery = Delivery::new(&headers, &body);
    let event = delivery.header(HEADER_EVENT);

    match event.and_then(EventKind::from_header) {
        Some(EventKind::Push) => handle_push(&app_state, delivery).await,
        Some(EventKind::Release) => handle_release(&app_state, delivery).await,
        None => {
            warn!(
                delivery_id = delivery.delivery_id(),
                event = event.unwrap_or("none"),
                "No pipeline for event"
            );
            Err(WebhookError::UnsupportedEvent(event.map(str::to_string)))
        }
    }
}

async fn handle_push<D, S>(app_state: &AppState<D, S>, delivery: Delivery<'_>) -> WebhookResult
where
    D: DocsDispatcher + Send + Sync,
    S: VersionSource + Send + Sync,
{
    admit(
        &gates_for(EventKind::Push),
        &delivery,
        app_state.webhook_secret(),
    )?;

    let event: PushEvent = serde_json::from_slice(delivery.body)?;
    let stable = app_state.versions().latest().await?;

    debug!(
        delivery_id = delivery.delivery_id(),
        git_ref = %event.git_ref,
        stable_branch = stable.branch(),
        "Evaluating push"
    );

    let decision = decide_push(&event, &stable, app_state.targets());
    relay(app_state, &delivery, decision).await
}

async fn handle_release<D, S>(app_state: &AppState<D, S>, delivery: Delivery<'_>) -> WebhookResult
where
    D: DocsDispatcher + Send + Sync,
    S: VersionSource + Send + Sync,
{
    admit(
        &gates_for(EventKind::Release),
        &delivery,
        app_state.webhook_secret(),
    )?;

    let event: ReleaseEvent = serde_json::from_slice(delivery.body)?;
    let stable = app_state.versions().latest().await?;

    debug!(
        delivery_id = delivery.delivery_id(),
        action = %event.action,
        tag = %event.release.tag_name,
        stable_version = %stable.version(),
        "Evaluating release"
    );

    let decision = match decide_release(&event, stable.version(), app_state.targets()) {
        Decision::Dispatch(request) => {
            let request = resolve_release_commit(app_state, request, &event).await?;
            Decision::Dispatch(request)
        }
        skip => skip,
    };

    relay(app_state, &delivery, decision).await
}

/// Replaces a branch-name `target_commitish` with the commit the tag points at.
async fn resolve_release_commit<D, S>(
    app_state: &AppState<D, S>,
    mut request: DispatchRequest,
    event: &ReleaseEvent,
) -> Result<DispatchRequest, WebhookError>
where
    D: DocsDispatcher + Send + Sync,
{
    if request.sha.is_full_hex() {
        return Ok(request);
    }

    let source = &app_state.targets().source;
    let tag = &event.release.tag_name;
    debug!(
        tag = %tag,
        commitish = %request.sha,
        "target_commitish is not a commit, resolving tag"
    );

    request.sha = app_state.github().commit_for_tag(source, tag).await?;
    Ok(request)
}

async fn relay<D, S>(
    app_state: &AppState<D, S>,
    delivery: &Delivery<'_>,
    decision: Decision,
) -> WebhookResult
where
    D: DocsDispatcher + Send + Sync,
{
    match decision {
        Decision::Dispatch(request) => {
            app_state.github().send_dispatch(&request).await?;
            info!(
                delivery_id = delivery.delivery_id(),
                target_repo = %request.target,
                sha = %request.sha,
                "Relayed documentation change"
            );
            Ok((StatusCode::OK, HANDLED))
        }
        Decision::Skip(reason) => {
            debug!(
                delivery_id = delivery.delivery_id(),
                reason = %reason,
                "Nothing to relay"
            );
            Ok((StatusCode::OK, UNHANDLED))
        }
    }
}
