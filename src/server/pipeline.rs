//! Ordered admission gates that run before a webhook body is parsed.
//!
//! Each route is a list of [`Gate`]s. [`admit`] evaluates them in order and
//! stops at the first rejection, which becomes the response.

use axum::http::HeaderMap;
use tracing::{debug, warn};

use crate::webhooks::{EventKind, SignatureError, Verification, classify, verify_request};

use super::webhook::WebhookError;

/// Header name for GitHub event type.
pub const HEADER_EVENT: &str = "x-github-event";
/// Header name for GitHub delivery ID.
pub const HEADER_DELIVERY: &str = "x-github-delivery";
/// Header name for GitHub signature.
pub const HEADER_SIGNATURE: &str = "x-hub-signature-256";

/// One admission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gate {
    /// `X-GitHub-Event` must equal this kind.
    ExpectEvent(EventKind),
    /// `X-Hub-Signature-256` must match the raw body, if a secret is set.
    VerifySignature,
}

/// The gates for a route handling `kind`, in evaluation order.
pub fn gates_for(kind: EventKind) -> [Gate; 2] {
    [Gate::ExpectEvent(kind), Gate::VerifySignature]
}

/// What the gates can see of a request.
#[derive(Debug, Clone, Copy)]
pub struct Delivery<'a> {
    pub headers: &'a HeaderMap,
    /// Body bytes exactly as received.
    pub body: &'a [u8],
}

impl<'a> Delivery<'a> {
    pub fn new(headers: &'a HeaderMap, body: &'a [u8]) -> Self {
        Self { headers, body }
    }

    pub fn header(&self, name: &str) -> Option<&'a str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// The delivery id for log correlation, or `-` when GitHub did not send one.
    pub fn delivery_id(&self) -> &'a str {
        self.header(HEADER_DELIVERY).unwrap_or("-")
    }
}

/// Runs `gates` in order against `delivery`.
pub fn admit(
    gates: &[Gate],
    delivery: &Delivery<'_>,
    secret: Option<&[u8]>,
) -> Result<(), WebhookError> {
    for gate in gates {
        match gate {
            Gate::ExpectEvent(kind) => {
                classify(delivery.header(HEADER_EVENT), *kind).inspect_err(|e| {
                    warn!(delivery_id = delivery.delivery_id(), error = %e, "Event rejected");
                })?;
            }
            Gate::VerifySignature => {
                let outcome = verify_request(
                    delivery.body,
                    delivery.header(HEADER_SIGNATURE),
                    secret,
                );
                match outcome {
                    Ok(Verification::Verified) => {}
                    Ok(Verification::Skipped) => {
                        debug!(
                            delivery_id = delivery.delivery_id(),
                            "No secret configured, skipping signature check"
                        );
                    }
                    Err(e) => {
                        warn!(delivery_id = delivery.delivery_id(), error = %e, "Signature rejected");
                        return Err(match e {
                            SignatureError::Missing => WebhookError::MissingSignature,
                            SignatureError::Invalid => WebhookError::InvalidSignature,
                        });
                    }
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::webhooks::{compute_signature, format_signature_header};

    fn headers(pairs: &[(&'static str, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(*name, value.parse().unwrap());
        }
        map
    }

    fn signed(body: &[u8], secret: &[u8]) -> String {
        format_signature_header(&compute_signature(body, secret))
    }

    #[test]
    fn gates_run_classifier_first() {
        assert_eq!(
            gates_for(EventKind::Push),
            [Gate::ExpectEvent(EventKind::Push), Gate::VerifySignature]
        );
    }

    #[test]
    fn valid_delivery_is_admitted() {
        let body = br#"{"ref":"refs/heads/main"}"#;
        let map = headers(&[
            (HEADER_EVENT, "push"),
            (HEADER_SIGNATURE, &signed(body, b"secret")),
        ]);

        let result = admit(
            &gates_for(EventKind::Push),
            &Delivery::new(&map, body),
            Some(b"secret"),
        );
        assert!(result.is_ok());
    }

    #[test]
    fn wrong_event_stops_before_signature() {
        // No signature header: if the signature gate ran it would report
        // MissingSignature instead.
        let map = headers(&[(HEADER_EVENT, "release")]);

        let result = admit(
            &gates_for(EventKind::Push),
            &Delivery::new(&map, b"{}"),
            Some(b"secret"),
        );
        assert!(matches!(result, Err(WebhookError::EventMismatch(_))));
    }

    #[test]
    fn missing_signature_rejected_when_secret_set() {
        let map = headers(&[(HEADER_EVENT, "push")]);

        let result = admit(
            &gates_for(EventKind::Push),
            &Delivery::new(&map, b"{}"),
            Some(b"secret"),
        );
        assert!(matches!(result, Err(WebhookError::MissingSignature)));
    }

    #[test]
    fn bad_signature_rejected() {
        let map = headers(&[
            (HEADER_EVENT, "release"),
            (HEADER_SIGNATURE, &signed(b"other body", b"secret")),
        ]);

        let result = admit(
            &gates_for(EventKind::Release),
            &Delivery::new(&map, b"{}"),
            Some(b"secret"),
        );
        assert!(matches!(result, Err(WebhookError::InvalidSignature)));
    }

    #[test]
    fn no_secret_admits_unsigned() {
        let map = headers(&[(HEADER_EVENT, "push")]);

        let result = admit(&gates_for(EventKind::Push), &Delivery::new(&map, b"{}"), None);
        assert!(result.is_ok());
    }

    #[test]
    fn delivery_id_defaults_to_dash() {
        let map = HeaderMap::new();
        assert_eq!(Delivery::new(&map, b"").delivery_id(), "-");

        let map = headers(&[(HEADER_DELIVERY, "72d3162e-cc78-11e3-81ab-4c9367dc0958")]);
        assert_eq!(
            Delivery::new(&map, b"").delivery_id(),
            "72d3162e-cc78-11e3-81ab-4c9367dc0958"
        );
    }
}
