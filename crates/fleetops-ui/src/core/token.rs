//! Offline inspection of bearer credentials.
//!
//! # Design
//! - Only the payload segment is read; the signature belongs to the backend.
//! - Malformed and expired credentials are both "invalid" to callers.
//! - Time is passed in explicitly so the wasm clock stays out of the core.

use std::fmt;

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::core::error::{CredentialError, DecodeError};

/// Opaque signed bearer token issued by the backend.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Credential(String);

impl Credential {
    /// Wrap a raw token string.
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Raw token, for the `Authorization` header.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

/// Claims embedded in a credential.
#[derive(Clone, Debug, PartialEq)]
pub struct TokenClaims {
    /// Expiry instant, seconds since the epoch.
    pub expires_at_epoch_seconds: i64,
    /// Every claim in the payload, `exp` included.
    pub claims: Map<String, Value>,
}

impl TokenClaims {
    /// Whether the credential is still live at `now_ms` (epoch milliseconds).
    #[must_use]
    pub const fn is_live_at(&self, now_ms: i64) -> bool {
        self.expires_at_epoch_seconds.saturating_mul(1000) > now_ms
    }
}

/// Decode the claims of a credential without verifying its signature.
///
/// # Errors
///
/// Returns [`DecodeError`] when the token is not three dot-separated segments,
/// the payload is not base64url JSON, or `exp` is missing or not integral.
pub fn decode(credential: &Credential) -> Result<TokenClaims, DecodeError> {
    let segments: Vec<&str> = credential.expose().split('.').collect();
    if segments.len() != 3 {
        return Err(DecodeError::Segments {
            found: segments.len(),
        });
    }
    let payload = segments[1].trim_end_matches('=');
    let bytes = URL_SAFE_NO_PAD
        .decode(payload)
        .map_err(|source| DecodeError::Base64 { source })?;
    let claims: Map<String, Value> =
        serde_json::from_slice(&bytes).map_err(|err| DecodeError::Claims {
            detail: err.to_string(),
        })?;
    let expires_at_epoch_seconds = claims
        .get("exp")
        .and_then(expiry_seconds)
        .ok_or(DecodeError::MissingExpiry)?;
    Ok(TokenClaims {
        expires_at_epoch_seconds,
        claims,
    })
}

/// Decode and check expiry against `now_ms` (epoch milliseconds).
///
/// # Errors
///
/// Returns [`CredentialError::Decode`] for malformed credentials and
/// [`CredentialError::Expired`] when the expiry is at or before `now_ms`.
pub fn validate(credential: &Credential, now_ms: i64) -> Result<TokenClaims, CredentialError> {
    let claims = decode(credential)?;
    if !claims.is_live_at(now_ms) {
        return Err(CredentialError::Expired {
            expires_at: claims.expires_at_epoch_seconds,
        });
    }
    Ok(claims)
}

/// Whether the credential decodes and has not expired at `now_ms`.
#[must_use]
pub fn is_valid(credential: &Credential, now_ms: i64) -> bool {
    validate(credential, now_ms).is_ok()
}

#[allow(clippy::cast_possible_truncation)]
fn expiry_seconds(value: &Value) -> Option<i64> {
    if let Some(seconds) = value.as_i64() {
        return Some(seconds);
    }
    value
        .as_f64()
        .filter(|seconds| seconds.is_finite() && seconds.fract() == 0.0)
        .map(|seconds| seconds as i64)
}
