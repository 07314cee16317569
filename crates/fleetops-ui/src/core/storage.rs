//! Persisted session cache.
//!
//! # Design
//! - Two string entries under fixed keys: the credential and the serialized identity.
//! - The key/value backend is a trait so the browser adapter stays out of the core.
//! - `clear` is idempotent and infallible.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use fleetops_api_models::UserProfile;
use tracing::warn;

use crate::core::error::StorageError;
use crate::core::identity::{Identity, role_needs_rewrite};
use crate::core::token::Credential;

/// Storage key for the bearer credential.
pub const TOKEN_KEY: &str = "fleetops.auth.token";
/// Storage key for the serialized identity.
pub const IDENTITY_KEY: &str = "fleetops.auth.user";

/// Minimal string key/value persistence.
pub trait KeyValueStore {
    /// Read a value.
    fn get(&self, key: &'static str) -> Option<String>;
    /// Write a value, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Write`] when the backend refuses the write.
    fn set(&self, key: &'static str, value: &str) -> Result<(), StorageError>;
    /// Remove a value; missing keys are ignored.
    fn remove(&self, key: &'static str);
}

/// In-memory backend. Clones share the same map.
#[derive(Clone, Debug, Default)]
pub struct MemoryStorage {
    entries: Rc<RefCell<HashMap<&'static str, String>>>,
    reject_writes: Rc<Cell<bool>>,
}

impl MemoryStorage {
    /// Empty storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent writes fail, as a full browser quota would.
    pub fn reject_writes(&self, reject: bool) {
        self.reject_writes.set(reject);
    }

    /// Whether nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl KeyValueStore for MemoryStorage {
    fn get(&self, key: &'static str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }

    fn set(&self, key: &'static str, value: &str) -> Result<(), StorageError> {
        if self.reject_writes.get() {
            return Err(StorageError::Write {
                key,
                detail: "quota exceeded".to_string(),
            });
        }
        self.entries.borrow_mut().insert(key, value.to_string());
        Ok(())
    }

    fn remove(&self, key: &'static str) {
        self.entries.borrow_mut().remove(key);
    }
}

/// Session entries read back from storage.
#[derive(Clone, Debug, PartialEq)]
pub struct StoredSession {
    /// Saved credential.
    pub credential: Credential,
    /// Saved identity, role already normalized.
    pub identity: Identity,
    /// The persisted role string was not canonical and should be rewritten.
    pub stale_role: bool,
}

/// Reads and writes the session entries.
#[derive(Clone, Debug)]
pub struct TokenStore<S> {
    backend: S,
}

impl<S: KeyValueStore> TokenStore<S> {
    /// Wrap a backend.
    #[must_use]
    pub const fn new(backend: S) -> Self {
        Self { backend }
    }

    /// Underlying backend.
    #[must_use]
    pub const fn backend(&self) -> &S {
        &self.backend
    }

    /// Persist both entries, overwriting what was there.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] when either write fails; a partial write is
    /// rolled back.
    pub fn save(&self, credential: &Credential, identity: &Identity) -> Result<(), StorageError> {
        let encoded =
            serde_json::to_string(identity).map_err(|source| StorageError::Encode { source })?;
        self.backend.set(TOKEN_KEY, credential.expose())?;
        if let Err(err) = self.backend.set(IDENTITY_KEY, &encoded) {
            self.backend.remove(TOKEN_KEY);
            return Err(err);
        }
        Ok(())
    }

    /// Read both entries. `Ok(None)` unless both are present.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::CorruptIdentity`] when the identity entry is
    /// not a valid profile.
    pub fn load(&self) -> Result<Option<StoredSession>, StorageError> {
        let Some(token) = self.backend.get(TOKEN_KEY) else {
            return Ok(None);
        };
        let Some(raw_identity) = self.backend.get(IDENTITY_KEY) else {
            return Ok(None);
        };
        let profile: UserProfile = serde_json::from_str(&raw_identity)
            .map_err(|source| StorageError::CorruptIdentity { source })?;
        let stale_role = role_needs_rewrite(&profile);
        Ok(Some(StoredSession {
            credential: Credential::new(token),
            identity: Identity::from_profile(profile),
            stale_role,
        }))
    }

    /// Rewrite only the identity entry.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] when the identity cannot be encoded or written.
    pub fn save_identity(&self, identity: &Identity) -> Result<(), StorageError> {
        let encoded =
            serde_json::to_string(identity).map_err(|source| StorageError::Encode { source })?;
        self.backend.set(IDENTITY_KEY, &encoded)
    }

    /// Remove both entries.
    pub fn clear(&self) {
        self.backend.remove(TOKEN_KEY);
        self.backend.remove(IDENTITY_KEY);
    }

    /// Persist, logging instead of failing; the in-memory session stays usable.
    pub(crate) fn save_or_warn(&self, credential: &Credential, identity: &Identity) {
        if let Err(err) = self.save(credential, identity) {
            warn!(error = %err, "session could not be persisted");
        }
    }
}
