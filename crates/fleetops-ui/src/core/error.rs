//! Error types for the auth core.
//!
//! # Design
//! - Constant messages, context carried in fields.
//! - Credential and storage failures never escape the session boundary; they
//!   collapse to an anonymous session.
//! - Login and register failures render their `Display` text straight into the
//!   form, so those messages are user-facing.

use fleetops_api_models::{MalformedResponseError, error_message};
use thiserror::Error;

/// Fallback text when a login fails without a usable backend message.
pub const GENERIC_LOGIN_FAILURE: &str = "Login failed";
/// Fallback text when a registration fails without a usable backend message.
pub const GENERIC_REGISTER_FAILURE: &str = "Registration failed";

/// Credential could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// Token did not have header, payload and signature segments.
    #[error("credential is not a three-part token")]
    Segments {
        /// Number of segments found.
        found: usize,
    },
    /// Payload segment was not base64url.
    #[error("credential payload is not base64url")]
    Base64 {
        /// Underlying decode failure.
        #[source]
        source: base64::DecodeError,
    },
    /// Payload was not a JSON claims object.
    #[error("credential payload is not a claims object")]
    Claims {
        /// Parser diagnostic.
        detail: String,
    },
    /// Claims carried no integral `exp`.
    #[error("credential has no expiry claim")]
    MissingExpiry,
}

/// Credential is unusable for a session.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CredentialError {
    /// Malformed credential.
    #[error("credential could not be decoded")]
    Decode(#[from] DecodeError),
    /// Well-formed credential past its expiry.
    #[error("credential expired")]
    Expired {
        /// Expiry instant in epoch seconds.
        expires_at: i64,
    },
}

/// Persistence failures surfaced by the token store.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Backend refused a write (quota, private mode).
    #[error("storage write failed")]
    Write {
        /// Key being written.
        key: &'static str,
        /// Backend diagnostic.
        detail: String,
    },
    /// Identity could not be encoded for persistence.
    #[error("identity could not be serialized")]
    Encode {
        /// Underlying encoder failure.
        #[source]
        source: serde_json::Error,
    },
    /// Persisted identity JSON did not parse.
    #[error("persisted identity is corrupt")]
    CorruptIdentity {
        /// Underlying parse failure.
        #[source]
        source: serde_json::Error,
    },
}

/// Failures reported by the auth backend transport.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Non-2xx response other than an auth failure.
    #[error("backend rejected the request")]
    Rejected {
        /// HTTP status.
        status: u16,
        /// `error` field from the payload, if present.
        message: Option<String>,
    },
    /// 401 response, or 422 to a request carrying a bearer credential.
    #[error("backend reported an authentication failure")]
    Unauthorized {
        /// `error` field from the payload, if present.
        message: Option<String>,
    },
    /// Request never produced a response.
    #[error("backend unreachable")]
    Transport {
        /// Transport diagnostic.
        detail: String,
    },
    /// 2xx response that failed schema validation.
    #[error("backend response was malformed")]
    Malformed(#[from] MalformedResponseError),
    /// Request was aborted by the caller.
    #[error("request aborted")]
    Aborted,
    /// Request exceeded the configured timeout.
    #[error("request timed out")]
    TimedOut {
        /// Timeout that elapsed, in milliseconds.
        after_ms: u32,
    },
}

impl BackendError {
    /// Whether the backend considers the caller unauthenticated.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized { .. })
    }

    /// Classify an HTTP response. Returns `None` for 2xx statuses.
    #[must_use]
    pub fn from_response(status: u16, body: &str) -> Option<Self> {
        Self::classify(status, body, &[401])
    }

    /// Classify the response to a request that carried a bearer credential.
    /// The backend answers 422 for a token it cannot verify, so that counts
    /// as an authentication failure too.
    #[must_use]
    pub fn from_credentialed_response(status: u16, body: &str) -> Option<Self> {
        Self::classify(status, body, &[401, 422])
    }

    fn classify(status: u16, body: &str, auth_failures: &[u16]) -> Option<Self> {
        if (200..300).contains(&status) {
            return None;
        }
        let message = error_message(body);
        Some(if auth_failures.contains(&status) {
            Self::Unauthorized { message }
        } else {
            Self::Rejected { status, message }
        })
    }

    fn into_rejection(self) -> Result<(u16, String), Self> {
        match self {
            Self::Rejected {
                status,
                message: Some(message),
            } => Ok((status, message)),
            Self::Unauthorized {
                message: Some(message),
            } => Ok((401, message)),
            other => Err(other),
        }
    }
}

/// Login did not produce a session.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoginError {
    /// Backend refused the credentials and said why.
    #[error("{message}")]
    Rejected {
        /// HTTP status.
        status: u16,
        /// Backend-provided reason.
        message: String,
    },
    /// Anything else the backend or transport did wrong.
    #[error("{}", GENERIC_LOGIN_FAILURE)]
    Failed,
    /// Request aborted by the caller before completing.
    #[error("Login cancelled")]
    Cancelled,
    /// A logout or newer login happened while this one was in flight.
    #[error("Login superseded")]
    Superseded,
}

impl LoginError {
    /// Text shown under the login form.
    #[must_use]
    pub fn message(&self) -> String {
        self.to_string()
    }
}

impl From<BackendError> for LoginError {
    fn from(err: BackendError) -> Self {
        match err.into_rejection() {
            Ok((status, message)) => Self::Rejected { status, message },
            Err(BackendError::Aborted) => Self::Cancelled,
            Err(_) => Self::Failed,
        }
    }
}

/// Registration did not succeed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegisterError {
    /// Required form field left blank; never sent to the backend.
    #[error("Missing fields")]
    MissingField {
        /// Blank field name.
        field: &'static str,
    },
    /// Backend refused the registration and said why.
    #[error("{message}")]
    Rejected {
        /// HTTP status.
        status: u16,
        /// Backend-provided reason.
        message: String,
    },
    /// Anything else the backend or transport did wrong.
    #[error("{}", GENERIC_REGISTER_FAILURE)]
    Failed,
    /// Request aborted by the caller before completing.
    #[error("Registration cancelled")]
    Cancelled,
}

impl RegisterError {
    /// Text shown under the registration form.
    #[must_use]
    pub fn message(&self) -> String {
        self.to_string()
    }
}

impl From<BackendError> for RegisterError {
    fn from(err: BackendError) -> Self {
        match err.into_rejection() {
            Ok((status, message)) => Self::Rejected { status, message },
            Err(BackendError::Aborted) => Self::Cancelled,
            Err(_) => Self::Failed,
        }
    }
}

/// Logging could not be initialised.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// A global subscriber was already installed.
    #[error("failed to install tracing subscriber")]
    Install {
        /// Diagnostic from `tracing-subscriber`.
        detail: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_error_prefers_backend_message() {
        let err = LoginError::from(BackendError::Unauthorized {
            message: Some("Invalid credentials".to_string()),
        });
        assert_eq!(err.to_string(), "Invalid credentials");
    }

    #[test]
    fn login_error_falls_back_to_generic_text() {
        let err = LoginError::from(BackendError::Rejected {
            status: 500,
            message: None,
        });
        assert_eq!(err.to_string(), GENERIC_LOGIN_FAILURE);
        let err = LoginError::from(BackendError::Transport {
            detail: "connection refused".to_string(),
        });
        assert_eq!(err.to_string(), GENERIC_LOGIN_FAILURE);
    }

    #[test]
    fn aborts_cancel_but_timeouts_fail() {
        assert_eq!(
            LoginError::from(BackendError::TimedOut { after_ms: 10 }),
            LoginError::Failed
        );
        assert_eq!(LoginError::from(BackendError::Aborted), LoginError::Cancelled);
        assert_eq!(
            RegisterError::from(BackendError::Aborted),
            RegisterError::Cancelled
        );
    }

    #[test]
    fn register_error_messages_match_backend_wording() {
        let err = RegisterError::from(BackendError::Rejected {
            status: 400,
            message: Some("Email already registered".to_string()),
        });
        assert_eq!(err.to_string(), "Email already registered");
        assert_eq!(
            RegisterError::from(BackendError::Transport {
                detail: String::new()
            })
            .to_string(),
            GENERIC_REGISTER_FAILURE
        );
        assert_eq!(
            RegisterError::MissingField { field: "email" }.to_string(),
            "Missing fields"
        );
    }

    #[test]
    fn responses_are_classified_by_status() {
        assert!(BackendError::from_response(200, "").is_none());
        assert!(BackendError::from_response(201, "{}").is_none());
        let err = BackendError::from_response(401, r#"{"error":"Invalid credentials"}"#);
        assert!(matches!(
            err,
            Some(BackendError::Unauthorized { message: Some(ref m) }) if m == "Invalid credentials"
        ));
        let err = BackendError::from_response(500, "<html>oops</html>");
        assert!(matches!(
            err,
            Some(BackendError::Rejected {
                status: 500,
                message: None
            })
        ));
    }

    #[test]
    fn unverifiable_bearer_tokens_count_as_auth_failures() {
        let body = r#"{"msg":"Signature verification failed"}"#;
        let err = BackendError::from_credentialed_response(422, body);
        assert!(err.as_ref().is_some_and(BackendError::is_unauthorized));
        assert!(
            BackendError::from_credentialed_response(401, "")
                .as_ref()
                .is_some_and(BackendError::is_unauthorized)
        );
        assert!(BackendError::from_credentialed_response(200, "{}").is_none());
        assert!(matches!(
            BackendError::from_response(422, ""),
            Some(BackendError::Rejected { status: 422, .. })
        ));
    }

    #[test]
    fn generic_failures_render_the_shared_fallback_text() {
        assert_eq!(LoginError::Failed.message(), GENERIC_LOGIN_FAILURE);
        assert_eq!(RegisterError::Failed.message(), GENERIC_REGISTER_FAILURE);
    }
}
