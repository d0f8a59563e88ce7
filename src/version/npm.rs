//! npm registry lookup for the latest published version of a package.

use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use super::{VersionError, VersionSource};

/// Public npm registry.
pub const DEFAULT_REGISTRY: &str = "https://registry.npmjs.org";

/// Reads the `latest` dist-tag of a package from an npm registry.
#[derive(Debug, Clone)]
pub struct NpmRegistry {
    client: reqwest::Client,
    base_url: String,
    package: String,
}

#[derive(Debug, Deserialize)]
struct LatestManifest {
    version: String,
}

impl NpmRegistry {
    /// Creates a lookup for `package` against `base_url`, bounding each
    /// request by `timeout`.
    pub fn new(
        base_url: impl Into<String>,
        package: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, VersionError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into(),
            package: package.into(),
        })
    }

    pub fn package(&self) -> &str {
        &self.package
    }

    /// URL of the package's `latest` manifest.
    pub fn latest_url(&self) -> String {
        format!(
            "{}/{}/latest",
            self.base_url.trim_end_matches('/'),
            self.package
        )
    }
}

impl VersionSource for NpmRegistry {
    async fn latest_version(&self) -> Result<String, VersionError> {
        let url = self.latest_url();
        debug!(url = %url, "Fetching latest published version");

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(VersionError::Status {
                package: self.package.clone(),
                status: status.as_u16(),
            });
        }

        let manifest: LatestManifest = response.json().await?;
        Ok(manifest.version)
    }
}
