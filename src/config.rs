//! Process configuration, read from flags or the environment.

use std::time::Duration;

use clap::Parser;

use crate::types::RepoId;
use crate::version::npm::DEFAULT_REGISTRY;
use crate::webhooks::RelayTargets;

pub const DEFAULT_SOURCE_REPO: &str = "electron/electron";
pub const DEFAULT_TARGET_REPO: &str = "electron/electronjs.org-new";
pub const DEFAULT_NPM_PACKAGE: &str = "electron";

#[derive(Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// Port the webhook server listens on
    #[arg(short, long, env, default_value_t = 3000)]
    pub port: u16,

    /// Shared webhook secret. When unset, signature verification is skipped.
    #[arg(long, env)]
    secret: Option<String>,

    /// Token used for repository_dispatch and GraphQL calls
    #[arg(long, env)]
    github_token: String,

    /// Repository whose pushes and releases are watched (owner/name)
    #[arg(long, env, default_value = DEFAULT_SOURCE_REPO)]
    pub source_repo: RepoId,

    /// Repository that receives doc_changes dispatches (owner/name)
    #[arg(long, env, default_value = DEFAULT_TARGET_REPO)]
    pub target_repo: RepoId,

    /// npm package whose latest version defines the stable release line
    #[arg(long, env, default_value = DEFAULT_NPM_PACKAGE)]
    pub npm_package: String,

    /// npm registry base URL
    #[arg(long, env, default_value = DEFAULT_REGISTRY)]
    pub npm_registry: String,

    /// Seconds the stable version is cached before it is looked up again
    #[arg(long, env, default_value_t = 300)]
    pub version_ttl_secs: u64,

    /// Seconds before an outbound GitHub or registry request is abandoned
    #[arg(long, env, default_value_t = 10)]
    pub dispatch_timeout_secs: u64,
}

impl Config {
    /// Loads `.env` if present, then parses flags and environment.
    pub fn new() -> Self {
        dotenvy::dotenv().ok();
        Config::parse()
    }

    /// The webhook secret, or `None` when verification is disabled.
    ///
    /// An empty `SECRET=` counts as unset.
    pub fn webhook_secret(&self) -> Option<&[u8]> {
        self.secret
            .as_deref()
            .filter(|s| !s.is_empty())
            .map(str::as_bytes)
    }

    pub fn github_token(&self) -> &str {
        &self.github_token
    }

    pub fn relay_targets(&self) -> RelayTargets {
        RelayTargets::new(self.source_repo.clone(), self.target_repo.clone())
    }

    pub fn version_ttl(&self) -> Duration {
        Duration::from_secs(self.version_ttl_secs)
    }

    pub fn dispatch_timeout(&self) -> Duration {
        Duration::from_secs(self.dispatch_timeout_secs)
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("port", &self.port)
            .field("secret", &self.secret.as_ref().map(|_| "<redacted>"))
            .field("source_repo", &self.source_repo)
            .field("target_repo", &self.target_repo)
            .field("npm_package", &self.npm_package)
            .field("npm_registry", &self.npm_registry)
            .field("version_ttl_secs", &self.version_ttl_secs)
            .field("dispatch_timeout_secs", &self.dispatch_timeout_secs)
            .finish_non_exhaustive()
    }
}
