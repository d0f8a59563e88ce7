//! Webhook handling for GitHub events.
//!
//! This module provides:
//! - Signature verification for webhook payloads (HMAC-SHA256)
//! - Event classification against the route's expected event type
//! - Typed `push` and `release` payloads
//! - The decision engines that turn events into dispatches

pub mod classifier;
pub mod decision;
pub mod events;
pub mod push;
pub mod release;
pub mod signature;

pub use classifier::{EventMismatch, classify};
pub use decision::{Decision, RelayTargets, SkipReason};
pub use events::{Commit, EventKind, PushEvent, Release, ReleaseEvent, Repository};
pub use push::{DOCS_FOLDER, decide_push, touches_folder};
pub use release::{decide_release, stable_tag_version};
pub use signature::{
    SignatureError, Verification, compute_signature, format_signature_header, verify_request,
    verify_signature,
};
