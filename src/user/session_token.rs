//! Stateless, signed session tokens.
//!
//! A token is `<payload>.<signature>`, both segments base64url without
//! padding. The payload is the JSON `{"user_id": .., "iat": ..}` and the
//! signature is HMAC-SHA256 over `session.<payload>` keyed by the server
//! secret. Nothing is stored server side: the token is the session.

use anyhow::{anyhow, Result};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Domain separation for this class of signed values.
const TOKEN_CONTEXT: &[u8] = b"session";

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SessionTokenError {
    #[error("Session token signature is invalid")]
    InvalidSignature,
    #[error("Session token payload is malformed")]
    MalformedPayload,
    #[error("Session token has expired")]
    Expired,
}

#[derive(Serialize, Deserialize)]
struct SessionPayload {
    user_id: usize,
    /// Issued at, unix seconds.
    iat: i64,
}

#[derive(Clone)]
pub struct SessionTokenCodec {
    mac: HmacSha256,
    max_age_secs: i64,
}

impl std::fmt::Debug for SessionTokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionTokenCodec")
            .field("max_age_secs", &self.max_age_secs)
            .finish_non_exhaustive()
    }
}

impl SessionTokenCodec {
    pub fn new(secret: &str, max_age: chrono::Duration) -> Result<Self> {
        let mac = HmacSha256::new_from_slice(secret.as_bytes())
            .map_err(|err| anyhow!("Invalid session secret: {}", err))?;
        Ok(SessionTokenCodec {
            mac,
            max_age_secs: max_age.num_seconds(),
        })
    }

    fn keyed_mac(&self, payload_segment: &str) -> HmacSha256 {
        let mut mac = self.mac.clone();
        mac.update(TOKEN_CONTEXT);
        mac.update(b".");
        mac.update(payload_segment.as_bytes());
        mac
    }

    pub fn encode(&self, user_id: usize) -> String {
        self.encode_at(user_id, chrono::Utc::now().timestamp())
    }

    pub fn encode_at(&self, user_id: usize, issued_at: i64) -> String {
        let payload = SessionPayload {
            user_id,
            iat: issued_at,
        };
        // Serializing two integers cannot fail.
        let json = serde_json::to_vec(&payload).unwrap_or_default();
        self.sign(&json)
    }

    fn sign(&self, payload_json: &[u8]) -> String {
        let payload_segment = URL_SAFE_NO_PAD.encode(payload_json);
        let signature = self.keyed_mac(&payload_segment).finalize().into_bytes();
        format!("{}.{}", payload_segment, URL_SAFE_NO_PAD.encode(signature))
    }

    pub fn decode(&self, token: &str) -> Result<usize, SessionTokenError> {
        self.decode_at(token, chrono::Utc::now().timestamp())
    }

    /// Verifies `token` and returns the user id it was issued for. Whether
    /// that user still exists is up to the caller.
    pub fn decode_at(&self, token: &str, now: i64) -> Result<usize, SessionTokenError> {
        let (payload_segment, signature_segment) = token
            .rsplit_once('.')
            .ok_or(SessionTokenError::InvalidSignature)?;
        let signature = URL_SAFE_NO_PAD
            .decode(signature_segment)
            .map_err(|_| SessionTokenError::InvalidSignature)?;
        self.keyed_mac(payload_segment)
            .verify_slice(&signature)
            .map_err(|_| SessionTokenError::InvalidSignature)?;

        let payload_json = URL_SAFE_NO_PAD
            .decode(payload_segment)
            .map_err(|_| SessionTokenError::MalformedPayload)?;
        let payload: SessionPayload = serde_json::from_slice(&payload_json)
            .map_err(|_| SessionTokenError::MalformedPayload)?;

        if now.saturating_sub(payload.iat) > self.max_age_secs {
            return Err(SessionTokenError::Expired);
        }
        Ok(payload.user_id)
    }
}
