//! Canonical user roles.
//!
//! Servers have sent `admin`, `ADMIN` and `Admin` for the same role. Every
//! role string entering the client goes through [`Role::normalize`] so route
//! checks compare canonical values only.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Role attached to an identity.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Role {
    /// Full access.
    Admin,
    /// Operations oversight.
    Manager,
    /// Field staff.
    Driver,
    /// Anything the server sent that is not a known role. Fails every
    /// role-restricted check.
    Unknown(String),
}

impl Role {
    /// The three roles allowed into the dashboard shell.
    #[must_use]
    pub const fn staff() -> [Self; 3] {
        [Self::Admin, Self::Manager, Self::Driver]
    }

    /// Map a raw role string to its canonical form, case-insensitively.
    /// Unrecognized input is kept verbatim in [`Role::Unknown`].
    #[must_use]
    pub fn normalize(raw: &str) -> Self {
        if raw.eq_ignore_ascii_case("admin") {
            Self::Admin
        } else if raw.eq_ignore_ascii_case("manager") {
            Self::Manager
        } else if raw.eq_ignore_ascii_case("driver") {
            Self::Driver
        } else {
            Self::Unknown(raw.to_string())
        }
    }

    /// Canonical string form.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Admin => "Admin",
            Self::Manager => "Manager",
            Self::Driver => "Driver",
            Self::Unknown(raw) => raw,
        }
    }

    /// Lowercase path segment used in dashboard URLs.
    #[must_use]
    pub fn slug(&self) -> String {
        self.as_str().to_lowercase()
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for Role {
    fn from(raw: &str) -> Self {
        Self::normalize(raw)
    }
}

impl Serialize for Role {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Role {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::normalize(&raw))
    }
}
