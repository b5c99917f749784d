//! sw-signature
//!
//! Inbound change-signal authentication: HMAC-SHA256 over the exact raw
//! request bytes, base64-encoded, compared in constant time.
//!
//! # Invariants
//! - The MAC always covers the literal body bytes as received. Never verify a
//!   re-serialized copy; key order and whitespace change the digest.
//! - Verification fails closed: absent header, absent body, empty secret or
//!   length mismatch all return `false`. Nothing here panics or errors.
//! - An empty body is treated like an absent one and rejected, even under a
//!   correct signature. No catalog notification is ever empty.
//! - Pure. No IO, no clock, no logging.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Compute the base64 HMAC-SHA256 of `body` under `secret`.
///
/// Returns `None` for an empty secret: a signature without a key proves nothing.
pub fn sign(secret: &[u8], body: &[u8]) -> Option<String> {
    if secret.is_empty() {
        return None;
    }
    let mut mac = <HmacSha256 as Mac>::new_from_slice(secret).ok()?;
    mac.update(body);
    Some(BASE64.encode(mac.finalize().into_bytes()))
}

/// Verify a claimed signature against the raw body.
///
/// `claimed` is the header value as received (`None` when the header is absent).
pub fn verify(raw_body: Option<&[u8]>, claimed: Option<&str>, secret: &[u8]) -> bool {
    let (Some(body), Some(claimed)) = (raw_body, claimed) else {
        return false;
    };
    let claimed = claimed.trim();
    if body.is_empty() || claimed.is_empty() {
        return false;
    }
    let Some(computed) = sign(secret, body) else {
        return false;
    };
    // constant_time_eq returns false on length mismatch without early exit on content.
    constant_time_eq::constant_time_eq(claimed.as_bytes(), computed.as_bytes())
}

/// Shared-secret holder for the inbound endpoint.
///
/// **The secret is redacted in `Debug` output.**
#[derive(Clone)]
pub struct SignatureVerifier {
    secret: Vec<u8>,
}

impl SignatureVerifier {
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    pub fn verify(&self, raw_body: &[u8], claimed: Option<&str>) -> bool {
        verify(Some(raw_body), claimed, &self.secret)
    }

    pub fn sign(&self, body: &[u8]) -> Option<String> {
        sign(&self.secret, body)
    }
}

impl std::fmt::Debug for SignatureVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignatureVerifier")
            .field("secret", &"<REDACTED>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_is_base64_of_32_byte_digest() {
        let sig = sign(b"s3cr3t", br#"{"a":1}"#).unwrap();
        let raw = BASE64.decode(&sig).unwrap();
        assert_eq!(raw.len(), 32);
    }

    #[test]
    fn empty_secret_cannot_sign() {
        assert!(sign(b"", b"body").is_none());
        assert!(!verify(Some(&b"body"[..]), Some("anything"), b""));
    }

    #[test]
    fn debug_redacts_secret() {
        let v = SignatureVerifier::new("hunter2-very-secret");
        let dbg = format!("{v:?}");
        assert!(!dbg.contains("hunter2"));
        assert!(dbg.contains("REDACTED"));
    }
}
