//! The signed-in user as the client knows it.

use fleetops_api_models::{UserId, UserProfile};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::core::role::Role;

/// Authenticated user profile with a normalized role.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    /// Backend identifier.
    pub id: UserId,
    /// Login email.
    pub email: String,
    /// Display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Canonical role.
    pub role: Role,
    /// Other server fields, carried through untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Identity {
    /// Build an identity from a wire profile, normalizing the role.
    #[must_use]
    pub fn from_profile(profile: UserProfile) -> Self {
        let role = Role::normalize(profile.raw_role());
        Self {
            id: profile.id,
            email: profile.email,
            name: profile.name,
            role,
            extra: profile.extra,
        }
    }

    /// Name to show in the shell, falling back to the email.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(&self.email)
    }
}

/// Whether normalizing `profile` changes the role string it carries.
#[must_use]
pub fn role_needs_rewrite(profile: &UserProfile) -> bool {
    Role::normalize(profile.raw_role()).as_str() != profile.raw_role()
}
