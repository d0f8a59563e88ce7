//! Docs Relay - relays documentation changes from a source repository to the
//! site that renders them.
//!
//! GitHub sends `push` and `release` webhooks; when a push lands docs changes
//! on the current stable branch, or a stable release at least as new as the
//! published one goes out, the relay fires a `doc_changes`
//! `repository_dispatch` at the docs site repository.

pub mod config;
pub mod github;
pub mod server;
pub mod types;
pub mod version;
pub mod webhooks;

#[cfg(test)]
pub(crate) mod test_utils;
