//! Latest stable version resolution with a time-based cache.
//!
//! The relay needs to know which release line is current: push events only
//! matter on the current stable branch, and release events only matter when
//! they are at least as new as the published stable version.
//!
//! - [`VersionSource`] looks the version up (the npm registry in production)
//! - [`VersionCache`] keeps the last answer for a TTL and refreshes on demand
//! - [`VersionInfo`] pairs the version with its derived branch name

use std::future::Future;
use std::time::Duration;

use semver::Version;
use thiserror::Error;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, info, warn};

pub mod npm;

pub use npm::NpmRegistry;

/// Default cache lifetime for the stable version.
pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);

/// Errors from resolving the latest stable version.
#[derive(Debug, Error)]
pub enum VersionError {
    /// The registry could not be reached or returned an unreadable body.
    #[error("version lookup failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The registry answered with a non-success status.
    #[error("registry returned HTTP {status} for package {package}")]
    Status { package: String, status: u16 },

    /// The published version is not valid semver.
    #[error("registry returned invalid version {version:?}: {source}")]
    InvalidVersion {
        version: String,
        #[source]
        source: semver::Error,
    },

    /// The source could not produce a version for another reason.
    #[error("version lookup failed: {0}")]
    Unavailable(String),
}

/// The latest stable version and the release branch it lives on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionInfo {
    version: Version,
    branch: String,
}

impl VersionInfo {
    /// Builds the info for `version`, deriving its branch name.
    pub fn new(version: Version) -> Self {
        let branch = derive_branch(&version.to_string());
        Self { version, branch }
    }

    /// Parses a published version string.
    pub fn parse(version: &str) -> Result<Self, VersionError> {
        let parsed = Version::parse(version.trim()).map_err(|source| VersionError::InvalidVersion {
            version: version.to_string(),
            source,
        })?;
        Ok(Self::new(parsed))
    }

    pub fn version(&self) -> &Version {
        &self.version
    }

    /// Release branch name, e.g. `12-x-y` for `12.0.6`.
    pub fn branch(&self) -> &str {
        &self.branch
    }

    /// The full git ref of the release branch.
    pub fn branch_ref(&self) -> String {
        format!("refs/heads/{}", self.branch)
    }
}

/// Replaces a trailing `.MINOR.PATCH` with `-x-y`.
///
/// Strings that do not end in two numeric components are returned unchanged,
/// so a pre-release like `13.0.0-beta.2` keeps its own name.
pub fn derive_branch(version: &str) -> String {
    let mut parts = version.rsplitn(3, '.');
    let (Some(patch), Some(minor), Some(rest)) = (parts.next(), parts.next(), parts.next())
    else {
        return version.to_string();
    };

    let numeric = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    if numeric(patch) && numeric(minor) && !rest.is_empty() {
        format!("{rest}-x-y")
    } else {
        version.to_string()
    }
}

/// Looks up the latest published stable version string.
///
/// # Example (fake for testing)
///
/// ```ignore
/// struct Fixed(&'static str);
///
/// impl VersionSource for Fixed {
///     async fn latest_version(&self) -> Result<String, VersionError> {
///         Ok(self.0.to_string())
///     }
/// }
/// ```
pub trait VersionSource {
    fn latest_version(&self) -> impl Future<Output = Result<String, VersionError>> + Send;
}

#[derive(Debug, Clone)]
struct Cached {
    info: VersionInfo,
    refreshed_at: Instant,
}

/// Caches the result of a [`VersionSource`] for a fixed TTL.
///
/// The lock is held while a refresh is in flight, so concurrent requests that
/// find the cache stale wait for one lookup instead of each issuing their own.
/// A failed refresh leaves the previous value in place for the next attempt.
#[derive(Debug)]
pub struct VersionCache<S> {
    source: S,
    ttl: Duration,
    state: Mutex<Option<Cached>>,
}

impl<S: VersionSource> VersionCache<S> {
    pub fn new(source: S, ttl: Duration) -> Self {
        Self {
            source,
            ttl,
            state: Mutex::new(None),
        }
    }

    pub fn with_default_ttl(source: S) -> Self {
        Self::new(source, DEFAULT_TTL)
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Returns the latest stable version, refreshing it if the cached value
    /// is missing or older than the TTL.
    pub async fn latest(&self) -> Result<VersionInfo, VersionError> {
        let mut state = self.state.lock().await;

        if let Some(cached) = state.as_ref() {
            if cached.refreshed_at.elapsed() <= self.ttl {
                return Ok(cached.info.clone());
            }
        }

        debug!(ttl_secs = self.ttl.as_secs(), "Refreshing stable version");

        let raw = match self.source.latest_version().await {
            Ok(raw) => raw,
            Err(e) => {
                warn!(error = %e, "Stable version lookup failed, keeping cached value");
                return Err(e);
            }
        };
        let info = VersionInfo::parse(&raw)?;

        if state.as_ref().map(|c| &c.info) != Some(&info) {
            info!(
                version = %info.version(),
                branch = info.branch(),
                "Stable version updated"
            );
        }

        *state = Some(Cached {
            info: info.clone(),
            refreshed_at: Instant::now(),
        });

        Ok(info)
    }
}
