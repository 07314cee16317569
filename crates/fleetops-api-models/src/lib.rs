#![forbid(unsafe_code)]
#![deny(
    warnings,
    dead_code,
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]
//! Shared HTTP DTOs for the Fleetops auth API.
//!
//! The backend speaks loosely shaped JSON. Everything the client relies on is
//! decoded through the `decode_*` helpers here so a missing or mistyped field
//! surfaces as a [`MalformedResponseError`] at the boundary instead of leaking
//! half-populated values into session state.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Role assigned to self-registered accounts when the form leaves it blank.
pub const DEFAULT_REGISTER_ROLE: &str = "driver";

/// Raised when a 2xx response body does not match the expected schema.
#[derive(Debug, Error)]
pub enum MalformedResponseError {
    /// Body could not be parsed into the expected shape.
    #[error("malformed response body")]
    Json {
        /// Endpoint whose response failed to decode.
        endpoint: &'static str,
        /// Underlying parse failure.
        #[source]
        source: serde_json::Error,
    },
    /// A required field was absent or blank.
    #[error("response field missing or empty")]
    MissingField {
        /// Endpoint whose response failed validation.
        endpoint: &'static str,
        /// Field that failed validation.
        field: &'static str,
    },
}

/// Backend user identifier. The API emits integers today but string ids are
/// accepted so a backend migration does not lock users out.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(untagged)]
pub enum UserId {
    /// Numeric primary key.
    Numeric(i64),
    /// Opaque string identifier.
    Text(String),
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Numeric(id) => write!(f, "{id}"),
            Self::Text(id) => f.write_str(id),
        }
    }
}

/// User profile as returned by login and profile endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserProfile {
    /// Backend identifier.
    pub id: UserId,
    /// Login email address.
    pub email: String,
    /// Display name, when the backend provides one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Raw role string exactly as the server sent it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// Any additional server fields, preserved verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl UserProfile {
    /// Raw role string, empty when the server omitted it.
    #[must_use]
    pub fn raw_role(&self) -> &str {
        self.role.as_deref().unwrap_or_default()
    }

    fn validate(&self, endpoint: &'static str) -> Result<(), MalformedResponseError> {
        if self.email.trim().is_empty() {
            return Err(MalformedResponseError::MissingField {
                endpoint,
                field: "email",
            });
        }
        Ok(())
    }
}

/// Body of `POST /auth/login`.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoginRequest {
    /// Account email.
    pub email: String,
    /// Plaintext password, sent over TLS only.
    pub password: String,
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Successful `POST /auth/login` payload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoginResponse {
    /// Signed bearer credential.
    #[serde(alias = "token")]
    pub access_token: String,
    /// Profile of the authenticated user.
    pub user: UserProfile,
}

/// Body of `POST /auth/register`.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RegisterRequest {
    /// Display name.
    pub name: String,
    /// Account email.
    pub email: String,
    /// Plaintext password.
    pub password: String,
    /// Requested role; the backend treats it as a raw string.
    #[serde(default = "default_register_role")]
    pub role: String,
}

impl RegisterRequest {
    /// First required field that is blank, if any.
    #[must_use]
    pub fn missing_field(&self) -> Option<&'static str> {
        if self.name.trim().is_empty() {
            Some("name")
        } else if self.email.trim().is_empty() {
            Some("email")
        } else if self.password.is_empty() {
            Some("password")
        } else {
            None
        }
    }
}

impl fmt::Debug for RegisterRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisterRequest")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("role", &self.role)
            .finish()
    }
}

fn default_register_role() -> String {
    DEFAULT_REGISTER_ROLE.to_string()
}

/// Opaque successful registration payload.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RegisterResponse {
    /// Confirmation message, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Remaining fields, untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Error payload attached to non-2xx responses.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorBody {
    /// Human-readable failure reason.
    #[serde(default)]
    pub error: Option<String>,
}

/// Decode and validate a login response body.
///
/// # Errors
///
/// Returns [`MalformedResponseError`] when the body is not JSON of the
/// expected shape, the token is blank, or the user has no email.
pub fn decode_login_response(body: &str) -> Result<LoginResponse, MalformedResponseError> {
    const ENDPOINT: &str = "/auth/login";
    let response: LoginResponse =
        serde_json::from_str(body).map_err(|source| MalformedResponseError::Json {
            endpoint: ENDPOINT,
            source,
        })?;
    if response.access_token.trim().is_empty() {
        return Err(MalformedResponseError::MissingField {
            endpoint: ENDPOINT,
            field: "access_token",
        });
    }
    response.user.validate(ENDPOINT)?;
    Ok(response)
}

/// Decode and validate a profile response body.
///
/// # Errors
///
/// Returns [`MalformedResponseError`] when the body is not a user profile.
pub fn decode_profile(body: &str) -> Result<UserProfile, MalformedResponseError> {
    const ENDPOINT: &str = "/auth/profile";
    let profile: UserProfile =
        serde_json::from_str(body).map_err(|source| MalformedResponseError::Json {
            endpoint: ENDPOINT,
            source,
        })?;
    profile.validate(ENDPOINT)?;
    Ok(profile)
}

/// Decode a registration response body. An empty body is accepted.
///
/// # Errors
///
/// Returns [`MalformedResponseError`] when a non-empty body is not a JSON object.
pub fn decode_register_response(body: &str) -> Result<RegisterResponse, MalformedResponseError> {
    if body.trim().is_empty() {
        return Ok(RegisterResponse::default());
    }
    serde_json::from_str(body).map_err(|source| MalformedResponseError::Json {
        endpoint: "/auth/register",
        source,
    })
}

/// Extract the `error` message from a failure body, if there is a usable one.
#[must_use]
pub fn error_message(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|payload| payload.error)
        .filter(|message| !message.trim().is_empty())
}
