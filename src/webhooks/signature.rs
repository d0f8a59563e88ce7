//! GitHub webhook signature verification using HMAC-SHA256.
//!
//! GitHub signs webhook payloads using HMAC-SHA256 with a shared secret.
//! The signature is provided in the `X-Hub-Signature-256` header as `sha256=<hex>`.
//!
//! Verification must run against the exact bytes received on the wire. Parsing
//! the body as JSON and serializing it again can reorder keys or change
//! whitespace, which would make valid deliveries fail.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

/// Why a delivery failed signature verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SignatureError {
    /// A secret is configured but the request carried no signature header.
    #[error("missing signature in payload")]
    Missing,

    /// The signature header does not match the payload.
    #[error("invalid signature")]
    Invalid,
}

/// Outcome of a successful verification step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verification {
    /// The signature matched the configured secret.
    Verified,
    /// No secret is configured, so the check was not performed.
    Skipped,
}

/// Computes the HMAC-SHA256 signature of a payload using the given secret.
pub fn compute_signature(payload: &[u8], secret: &[u8]) -> Vec<u8> {
    let mut mac = HmacSha256::new_from_slice(secret).expect("HMAC can take key of any size");
    mac.update(payload);
    mac.finalize().into_bytes().to_vec()
}

/// Formats a signature as a GitHub-style header value.
///
/// Returns a string in the format "sha256=<hex>".
pub fn format_signature_header(signature: &[u8]) -> String {
    format!("sha256={}", hex::encode(signature))
}

/// Verifies a GitHub webhook signature against the payload and secret.
///
/// The expected header value is rebuilt from the payload and compared with
/// the received one byte for byte in constant time. A length mismatch is a
/// failure, as is any difference in case of the hex digits.
///
/// # Examples
///
/// ```
/// use docs_relay::webhooks::{verify_signature, compute_signature, format_signature_header};
///
/// let payload = b"Hello, World!";
/// let secret = b"my-secret-key";
///
/// let header = format_signature_header(&compute_signature(payload, secret));
///
/// assert!(verify_signature(payload, &header, secret));
/// assert!(!verify_signature(payload, &header, b"wrong-secret"));
/// ```
pub fn verify_signature(payload: &[u8], signature_header: &str, secret: &[u8]) -> bool {
    let expected = format_signature_header(&compute_signature(payload, secret));

    // ct_eq on slices of different lengths returns false without leaking where
    // the contents diverge.
    expected
        .as_bytes()
        .ct_eq(signature_header.as_bytes())
        .into()
}

/// Runs the verification step of the webhook pipeline.
///
/// * `payload` - The raw webhook payload bytes
/// * `signature_header` - The `X-Hub-Signature-256` header, if present
/// * `secret` - The configured webhook secret; `None` disables verification
pub fn verify_request(
    payload: &[u8],
    signature_header: Option<&str>,
    secret: Option<&[u8]>,
) -> Result<Verification, SignatureError> {
    let Some(secret) = secret else {
        return Ok(Verification::Skipped);
    };

    let header = signature_header.ok_or(SignatureError::Missing)?;

    if verify_signature(payload, header, secret) {
        Ok(Verification::Verified)
    } else {
        Err(SignatureError::Invalid)
    }
}
