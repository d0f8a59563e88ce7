//! HTTP server for the docs relay.
//!
//! # Endpoints
//!
//! - `GET /` - Static acknowledgement
//! - `POST /webhook/push` - `push` deliveries
//! - `POST /webhook/release` - `release` deliveries
//! - `POST /webhook` - either, routed by `X-GitHub-Event`
//!
//! Every other path or method is a 404.

use std::sync::Arc;

use axum::http::StatusCode;

use crate::github::DocsDispatcher;
use crate::version::{VersionCache, VersionSource};
use crate::webhooks::RelayTargets;

pub mod pipeline;
pub mod webhook;

pub use pipeline::{Delivery, Gate, admit, gates_for};
pub use webhook::{
    HANDLED, UNHANDLED, WebhookError, push_handler, release_handler, webhook_handler,
};

/// Body of `GET /`.
pub const ROOT_BODY: &str = "There's nothing here!";

/// Shared application state.
///
/// Passed to all handlers via Axum's `State` extractor. `D` sends dispatches
/// and `S` looks up the stable version, so tests can swap both for fakes.
pub struct AppState<D, S> {
    inner: Arc<AppStateInner<D, S>>,
}

struct AppStateInner<D, S> {
    /// Webhook secret for HMAC-SHA256 signature verification. `None`
    /// disables verification.
    webhook_secret: Option<Vec<u8>>,

    targets: RelayTargets,

    versions: VersionCache<S>,

    github: D,
}

impl<D, S> Clone for AppState<D, S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<D, S> AppState<D, S> {
    pub fn new(
        webhook_secret: Option<Vec<u8>>,
        targets: RelayTargets,
        versions: VersionCache<S>,
        github: D,
    ) -> Self {
        AppState {
            inner: Arc::new(AppStateInner {
                webhook_secret,
                targets,
                versions,
                github,
            }),
        }
    }

    pub fn webhook_secret(&self) -> Option<&[u8]> {
        self.inner.webhook_secret.as_deref()
    }

    pub fn targets(&self) -> &RelayTargets {
        &self.inner.targets
    }

    pub fn versions(&self) -> &VersionCache<S> {
        &self.inner.versions
    }

    pub fn github(&self) -> &D {
        &self.inner.github
    }
}

/// `GET /`.
pub async fn root_handler() -> (StatusCode, &'static str) {
    (StatusCode::OK, ROOT_BODY)
}

async fn not_found() -> StatusCode {
    StatusCode::NOT_FOUND
}

/// Builds the axum Router with all endpoints.
pub fn build_router<D, S>(app_state: AppState<D, S>) -> axum::Router
where
    D: DocsDispatcher + Send + Sync + 'static,
    S: VersionSource + Send + Sync + 'static,
{
    use axum::routing::{get, post};

    axum::Router::new()
        .route("/", get(root_handler).fallback(not_found))
        .route(
            "/webhook",
            post(webhook_handler::<D, S>).fallback(not_found),
        )
        .route(
            "/webhook/push",
            post(push_handler::<D, S>).fallback(not_found),
        )
        .route(
            "/webhook/release",
            post(release_handler::<D, S>).fallback(not_found),
        )
        .fallback(not_found)
        .with_state(app_state)
}
