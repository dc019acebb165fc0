//! # Bearer Token Service
//!
//! Issues and verifies signed bearer tokens binding a user id to a fixed
//! lifetime, using a symmetric secret held in process configuration.
//!
//! ## Token Format
//!
//! ```text
//! base64url(JSON claims) "." base64url(HMAC-SHA256(payload))
//! ```
//!
//! The claims carry the user id plus issued-at/expires-at instants in unix
//! seconds. Validity is purely a function of the signature and the expiry —
//! there is no revocation list, so a token remains valid until it expires
//! or the signing secret changes.

use std::sync::Arc;
use std::time::Duration;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use rand_core::RngCore;
use serde::{Deserialize, Serialize};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

const MIN_SECRET_LEN: usize = 32;

/// Fixed token lifetime: one hour from issuance.
pub const TOKEN_TTL: Duration = Duration::from_secs(60 * 60);

/// Errors from token issuance and verification.
///
/// The API layer collapses every verification failure into the same
/// generic 401; these variants exist for server-side logs and tests.
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("token secret is too short (min {MIN_SECRET_LEN} bytes)")]
    SecretTooShort,

    #[error("invalid token format")]
    InvalidFormat,

    #[error("token signature is invalid")]
    InvalidSignature,

    #[error("token is expired")]
    Expired,

    #[error("failed to decode token payload")]
    PayloadDecode,

    #[error("failed to parse token payload")]
    PayloadParse,
}

/// Decoded token claims.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    pub user_id: i64,
    /// Issuance instant, unix seconds.
    pub issued_at: i64,
    /// Expiry instant, unix seconds. Always `issued_at` + the service TTL.
    pub expires_at: i64,
}

impl TokenClaims {
    /// Whether the claims are expired at the given reference instant.
    pub fn is_expired(&self, reference_secs: i64) -> bool {
        reference_secs >= self.expires_at
    }
}

/// Symmetric signing secret for bearer tokens.
///
/// Custom `Debug` redacts the key material to prevent credential leakage
/// in logs.
#[derive(Clone)]
pub struct TokenSecret(Arc<[u8]>);

impl TokenSecret {
    /// Wrap raw secret bytes.
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(Arc::from(bytes.into()))
    }

    /// Generate a fresh 32-byte secret from the OS RNG.
    ///
    /// Tokens signed with a generated secret are not verifiable after a
    /// restart; callers should warn when falling back to this.
    pub fn generate() -> Self {
        let mut bytes = [0u8; MIN_SECRET_LEN];
        rand_core::OsRng.fill_bytes(&mut bytes);
        Self(Arc::from(bytes.to_vec()))
    }

    /// Length of the secret in bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the secret is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl std::fmt::Debug for TokenSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("TokenSecret").field(&"[REDACTED]").finish()
    }
}

/// Issues and verifies bearer tokens.
///
/// Purely functional given the secret: no external call, database lookup,
/// or token blacklist. Cloning shares the underlying secret.
#[derive(Clone)]
pub struct TokenService {
    secret: TokenSecret,
    ttl: Duration,
}

impl TokenService {
    /// Create a token service over the given secret.
    ///
    /// Rejects secrets shorter than 32 bytes — an HMAC key below the hash
    /// output size weakens the construction.
    pub fn new(secret: TokenSecret, ttl: Duration) -> Result<Self, TokenError> {
        if secret.len() < MIN_SECRET_LEN {
            return Err(TokenError::SecretTooShort);
        }
        Ok(Self { secret, ttl })
    }

    /// The configured token lifetime.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issue a signed token for `user_id`, expiring `ttl` after `issued_at`.
    pub fn issue(&self, user_id: i64, issued_at: DateTime<Utc>) -> Result<String, TokenError> {
        let issued_secs = issued_at.timestamp();
        let claims = TokenClaims {
            user_id,
            issued_at: issued_secs,
            expires_at: issued_secs.saturating_add(self.ttl.as_secs() as i64),
        };
        let payload = serde_json::to_vec(&claims).map_err(|_| TokenError::PayloadParse)?;
        let payload_b64 = URL_SAFE_NO_PAD.encode(payload);
        let signature = self.sign(payload_b64.as_bytes())?;
        let signature_b64 = URL_SAFE_NO_PAD.encode(signature);
        Ok(format!("{payload_b64}.{signature_b64}"))
    }

    /// Verify a token against the secret and the given reference instant.
    ///
    /// Fails when the token is malformed, the signature does not match, or
    /// the encoded expiry has passed. The signature is checked before the
    /// payload is decoded, so claims from a forged token are never parsed.
    pub fn verify(
        &self,
        token: &str,
        reference: DateTime<Utc>,
    ) -> Result<TokenClaims, TokenError> {
        let (payload_b64, signature_b64) = token
            .split_once('.')
            .ok_or(TokenError::InvalidFormat)?;

        let signature = URL_SAFE_NO_PAD
            .decode(signature_b64)
            .map_err(|_| TokenError::InvalidFormat)?;

        let mut mac = HmacSha256::new_from_slice(self.secret.as_bytes())
            .map_err(|_| TokenError::InvalidSignature)?;
        mac.update(payload_b64.as_bytes());
        mac.verify_slice(&signature)
            .map_err(|_| TokenError::InvalidSignature)?;

        let payload = URL_SAFE_NO_PAD
            .decode(payload_b64)
            .map_err(|_| TokenError::PayloadDecode)?;

        let claims: TokenClaims =
            serde_json::from_slice(&payload).map_err(|_| TokenError::PayloadParse)?;

        if claims.is_expired(reference.timestamp()) {
            return Err(TokenError::Expired);
        }

        Ok(claims)
    }

    fn sign(&self, bytes: &[u8]) -> Result<Vec<u8>, TokenError> {
        let mut mac = HmacSha256::new_from_slice(self.secret.as_bytes())
            .map_err(|_| TokenError::InvalidSignature)?;
        mac.update(bytes);
        Ok(mac.finalize().into_bytes().to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn test_secret() -> TokenSecret {
        TokenSecret::new(b"0123456789abcdef0123456789abcdef".to_vec())
    }

    fn test_service() -> TokenService {
        TokenService::new(test_secret(), TOKEN_TTL).expect("valid service")
    }

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    // ── Construction ─────────────────────────────────────────────

    #[test]
    fn rejects_short_secret() {
        let result = TokenService::new(TokenSecret::new(b"too-short".to_vec()), TOKEN_TTL);
        assert!(matches!(result, Err(TokenError::SecretTooShort)));
    }

    #[test]
    fn generated_secret_meets_minimum_length() {
        let secret = TokenSecret::generate();
        assert!(secret.len() >= 32);
        assert!(TokenService::new(secret, TOKEN_TTL).is_ok());
    }

    #[test]
    fn secret_debug_is_redacted() {
        let debug = format!("{:?}", test_secret());
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("0123456789"));
    }

    // ── Issue / verify ───────────────────────────────────────────

    #[test]
    fn issue_and_verify_roundtrip() {
        let service = test_service();
        let token = service.issue(42, at(1_000)).expect("issue token");
        let claims = service.verify(&token, at(1_001)).expect("verify token");
        assert_eq!(claims.user_id, 42);
        assert_eq!(claims.issued_at, 1_000);
        assert_eq!(claims.expires_at, 1_000 + TOKEN_TTL.as_secs() as i64);
    }

    #[test]
    fn expiry_is_one_hour_after_issuance() {
        let service = test_service();
        let token = service.issue(1, at(0)).expect("issue token");
        // One second before expiry: valid. At expiry: rejected.
        assert!(service.verify(&token, at(3_599)).is_ok());
        assert!(matches!(
            service.verify(&token, at(3_600)),
            Err(TokenError::Expired)
        ));
    }

    #[test]
    fn rejects_expired_token() {
        let service = test_service();
        let token = service.issue(1, at(1_000)).expect("issue token");
        assert!(matches!(
            service.verify(&token, at(10_000)),
            Err(TokenError::Expired)
        ));
    }

    #[test]
    fn rejects_token_signed_with_different_secret() {
        let issuer = test_service();
        let verifier = TokenService::new(
            TokenSecret::new(b"another-secret-another-secret-xx".to_vec()),
            TOKEN_TTL,
        )
        .expect("valid service");

        let token = issuer.issue(1, at(0)).expect("issue token");
        assert!(matches!(
            verifier.verify(&token, at(1)),
            Err(TokenError::InvalidSignature)
        ));
    }

    #[test]
    fn rejects_tampered_payload() {
        let service = test_service();
        let token = service.issue(1, at(0)).expect("issue token");
        let (payload, signature) = token.split_once('.').expect("token split");
        let mut chars: Vec<char> = payload.chars().collect();
        chars[0] = if chars[0] == 'A' { 'B' } else { 'A' };
        let tampered_payload: String = chars.into_iter().collect();
        let tampered = format!("{tampered_payload}.{signature}");

        assert!(matches!(
            service.verify(&tampered, at(1)),
            Err(TokenError::InvalidSignature)
        ));
    }

    #[test]
    fn rejects_malformed_tokens() {
        let service = test_service();
        for bad in ["", "no-dot-here", "only.", "!!!.%%%"] {
            assert!(service.verify(bad, at(0)).is_err(), "accepted: {bad:?}");
        }
    }

    #[test]
    fn ttl_is_exposed() {
        assert_eq!(test_service().ttl(), TOKEN_TTL);
    }
}
