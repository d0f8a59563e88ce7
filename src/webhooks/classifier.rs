//! Gate that admits a delivery only on the route for its event type.

use thiserror::Error;

use super::events::EventKind;

/// The declared event type does not belong on this route.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("expected {expected} event, received {}", received.as_deref().unwrap_or("none"))]
pub struct EventMismatch {
    pub expected: EventKind,
    pub received: Option<String>,
}

/// Checks the `X-GitHub-Event` header against the event a route handles.
///
/// Comparison is exact and case-sensitive. A missing header never matches.
pub fn classify(event_header: Option<&str>, expected: EventKind) -> Result<(), EventMismatch> {
    match event_header {
        Some(value) if value == expected.as_str() => Ok(()),
        other => Err(EventMismatch {
            expected,
            received: other.map(str::to_string),
        }),
    }
}
