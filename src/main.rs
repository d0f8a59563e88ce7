use std::net::SocketAddr;

use anyhow::Context;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use docs_relay::config::Config;
use docs_relay::github::OctocrabClient;
use docs_relay::server::{AppState, build_router};
use docs_relay::version::{NpmRegistry, VersionCache};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "docs_relay=debug,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::new();
    tracing::debug!(?config, "Loaded configuration");

    if config.webhook_secret().is_none() {
        tracing::warn!("SECRET is not set, webhook signatures will not be verified");
    }

    let registry = NpmRegistry::new(
        &config.npm_registry,
        &config.npm_package,
        config.dispatch_timeout(),
    )
    .context("building npm registry client")?;
    let versions = VersionCache::new(registry, config.version_ttl());

    let github = OctocrabClient::from_token(config.github_token(), config.dispatch_timeout())
        .context("building GitHub client")?;

    let app_state = AppState::new(
        config.webhook_secret().map(<[u8]>::to_vec),
        config.relay_targets(),
        versions,
        github,
    );
    let app = build_router(app_state).layer(TraceLayer::new_for_http());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!(
        source_repo = %config.source_repo,
        target_repo = %config.target_repo,
        "listening on {}",
        addr
    );

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    axum::serve(listener, app).await?;

    Ok(())
}
