//! Session state machine.
//!
//! # Design
//! - `Bootstrapping` is entered once at construction and left by `restore`.
//! - Every transition that drops the session bumps a generation counter; a
//!   login or profile refresh that started under an older generation is
//!   discarded on completion, so a logout always wins over in-flight work.
//! - Storage failures are logged and never block the in-memory transition.

use fleetops_api_models::{LoginResponse, UserProfile};
use tracing::{debug, info, warn};

use crate::core::error::{BackendError, LoginError};
use crate::core::identity::Identity;
use crate::core::role::Role;
use crate::core::storage::{KeyValueStore, TokenStore};
use crate::core::token::{self, Credential};

/// Lifecycle phase of the client session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AuthPhase {
    /// Restoring from storage; nothing is decided yet.
    Bootstrapping,
    /// No usable session.
    Anonymous,
    /// An identity is published.
    Authenticated,
}

/// Snapshot of what the client believes about authentication.
#[derive(Clone, Debug, PartialEq)]
pub struct Session {
    identity: Option<Identity>,
    is_loading: bool,
}

impl Session {
    /// Build a snapshot.
    #[must_use]
    pub const fn new(identity: Option<Identity>, is_loading: bool) -> Self {
        Self {
            identity,
            is_loading,
        }
    }

    /// Initial snapshot before restore completes.
    #[must_use]
    pub const fn bootstrapping() -> Self {
        Self::new(None, true)
    }

    /// Resolved snapshot with nobody signed in.
    #[must_use]
    pub const fn anonymous() -> Self {
        Self::new(None, false)
    }

    /// Resolved snapshot for `identity`.
    #[must_use]
    pub const fn authenticated(identity: Identity) -> Self {
        Self::new(Some(identity), false)
    }

    /// Published identity.
    #[must_use]
    pub const fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    /// Role of the published identity.
    #[must_use]
    pub fn role(&self) -> Option<&Role> {
        self.identity.as_ref().map(|identity| &identity.role)
    }

    /// Whether an identity is published.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.identity.is_some()
    }

    /// Whether the initial restore is still running.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.is_loading
    }
}

/// Generation marker captured when async work starts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SessionTicket {
    generation: u64,
}

/// Owns the session and its persistence.
#[derive(Debug)]
pub struct AuthSession<S> {
    store: TokenStore<S>,
    phase: AuthPhase,
    identity: Option<Identity>,
    credential: Option<Credential>,
    generation: u64,
}

impl<S: KeyValueStore> AuthSession<S> {
    /// New session in [`AuthPhase::Bootstrapping`].
    #[must_use]
    pub const fn new(store: TokenStore<S>) -> Self {
        Self {
            store,
            phase: AuthPhase::Bootstrapping,
            identity: None,
            credential: None,
            generation: 0,
        }
    }

    /// Current phase.
    #[must_use]
    pub const fn phase(&self) -> AuthPhase {
        self.phase
    }

    /// Published identity.
    #[must_use]
    pub const fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    /// Active credential, for authorizing backend calls.
    #[must_use]
    pub const fn credential(&self) -> Option<&Credential> {
        self.credential.as_ref()
    }

    /// Persistence handle.
    #[must_use]
    pub const fn store(&self) -> &TokenStore<S> {
        &self.store
    }

    /// Snapshot for observers.
    #[must_use]
    pub fn session(&self) -> Session {
        Session::new(
            self.identity.clone(),
            self.phase == AuthPhase::Bootstrapping,
        )
    }

    /// Ticket for async work that must not outlive the current session.
    #[must_use]
    pub const fn ticket(&self) -> SessionTicket {
        SessionTicket {
            generation: self.generation,
        }
    }

    /// Restore the persisted session, leaving `Bootstrapping` for good.
    ///
    /// A missing, malformed or expired credential, or a corrupt identity,
    /// all end anonymous with storage cleared. Calls after the first are no-ops.
    pub fn restore(&mut self, now_ms: i64) -> AuthPhase {
        if self.phase != AuthPhase::Bootstrapping {
            debug!(phase = ?self.phase, "restore already ran");
            return self.phase;
        }
        match self.store.load() {
            Ok(None) => {
                debug!("no persisted session");
                self.drop_session();
            }
            Err(err) => {
                warn!(error = %err, "persisted session unreadable; clearing");
                self.drop_session();
            }
            Ok(Some(stored)) => match token::validate(&stored.credential, now_ms) {
                Err(err) => {
                    debug!(reason = %err, "persisted credential rejected");
                    self.drop_session();
                }
                Ok(_) => {
                    if stored.stale_role {
                        debug!(role = %stored.identity.role, "rewriting persisted role");
                        if let Err(err) = self.store.save_identity(&stored.identity) {
                            warn!(error = %err, "normalized identity could not be persisted");
                        }
                    }
                    self.identity = Some(stored.identity);
                    self.credential = Some(stored.credential);
                }
            },
        }
        self.phase = if self.identity.is_some() {
            AuthPhase::Authenticated
        } else {
            AuthPhase::Anonymous
        };
        self.phase
    }

    /// Start a login. Invalidates any login already in flight.
    pub const fn begin_login(&mut self) -> SessionTicket {
        self.generation = self.generation.wrapping_add(1);
        self.ticket()
    }

    /// Finish a login started with `ticket`.
    ///
    /// # Errors
    ///
    /// Returns [`LoginError::Superseded`] when a logout or newer login happened
    /// in the meantime, otherwise the backend failure mapped to a display
    /// message. The session is unchanged on every error path.
    pub fn complete_login(
        &mut self,
        ticket: SessionTicket,
        result: Result<LoginResponse, BackendError>,
    ) -> Result<Identity, LoginError> {
        if ticket != self.ticket() {
            warn!("discarding login that completed after the session changed");
            return Err(LoginError::Superseded);
        }
        let response = result.map_err(|err| {
            debug!(error = %err, "login rejected");
            LoginError::from(err)
        })?;
        let identity = Identity::from_profile(response.user);
        let credential = Credential::new(response.access_token);
        self.store.save_or_warn(&credential, &identity);
        info!(user = %identity.id, role = %identity.role, "signed in");
        self.identity = Some(identity.clone());
        self.credential = Some(credential);
        self.phase = AuthPhase::Authenticated;
        Ok(identity)
    }

    /// Replace the identity with a fresher profile for the same session.
    /// Returns `false` when the session changed since `ticket` was taken.
    pub fn apply_profile(&mut self, ticket: SessionTicket, profile: UserProfile) -> bool {
        if ticket != self.ticket() || self.phase != AuthPhase::Authenticated {
            debug!("discarding stale profile");
            return false;
        }
        let identity = Identity::from_profile(profile);
        if let Err(err) = self.store.save_identity(&identity) {
            warn!(error = %err, "refreshed identity could not be persisted");
        }
        self.identity = Some(identity);
        true
    }

    /// Sign out. Safe to call in any phase, any number of times.
    pub fn logout(&mut self) {
        if self.phase == AuthPhase::Authenticated {
            info!("signed out");
        }
        self.drop_session();
        self.phase = AuthPhase::Anonymous;
    }

    /// The backend no longer accepts the credential.
    pub fn expire(&mut self) {
        if self.phase == AuthPhase::Authenticated {
            info!("session expired");
        }
        self.drop_session();
        self.phase = AuthPhase::Anonymous;
    }

    /// Expire only if the session is still the one `ticket` was taken from.
    pub fn expire_if_current(&mut self, ticket: SessionTicket) -> bool {
        if ticket != self.ticket() {
            return false;
        }
        self.expire();
        true
    }

    fn drop_session(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        self.store.clear();
        self.identity = None;
        self.credential = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::storage::{IDENTITY_KEY, MemoryStorage, TOKEN_KEY};
    use crate::core::token::fixtures::token_expiring_at;
    use fleetops_api_models::UserId;
    use serde_json::Map;

    const NOW_MS: i64 = 1_700_000_000_000;
    const NOW_S: i64 = NOW_MS / 1000;

    fn profile(role: &str) -> UserProfile {
        UserProfile {
            id: UserId::Numeric(4),
            email: "ops@example.com".to_string(),
            name: Some("Ops".to_string()),
            role: Some(role.to_string()),
            extra: Map::new(),
        }
    }

    fn seeded(storage: &MemoryStorage, credential: &Credential, raw_identity: &str) {
        storage.set(TOKEN_KEY, credential.expose()).expect("writes");
        storage.set(IDENTITY_KEY, raw_identity).expect("writes");
    }

    fn session_over(storage: &MemoryStorage) -> AuthSession<MemoryStorage> {
        AuthSession::new(TokenStore::new(storage.clone()))
    }

    fn login_response(role: &str) -> LoginResponse {
        LoginResponse {
            access_token: token_expiring_at(NOW_S + 3600).expose().to_string(),
            user: profile(role),
        }
    }

    #[test]
    fn starts_loading_and_restore_resolves_once() {
        let storage = MemoryStorage::new();
        let mut auth = session_over(&storage);
        assert!(auth.session().is_loading());
        assert_eq!(auth.restore(NOW_MS), AuthPhase::Anonymous);
        assert!(!auth.session().is_loading());
        assert_eq!(auth.restore(NOW_MS), AuthPhase::Anonymous);
    }

    #[test]
    fn restore_publishes_valid_session_and_heals_role() {
        let storage = MemoryStorage::new();
        seeded(
            &storage,
            &token_expiring_at(NOW_S + 60),
            r#"{"id":4,"email":"ops@example.com","role":"admin"}"#,
        );
        let mut auth = session_over(&storage);
        assert_eq!(auth.restore(NOW_MS), AuthPhase::Authenticated);
        let session = auth.session();
        assert!(session.is_authenticated());
        assert_eq!(session.role(), Some(&Role::Admin));
        let persisted = storage.get(IDENTITY_KEY).expect("identity kept");
        assert!(persisted.contains(r#""role":"Admin""#));
    }

    #[test]
    fn expired_credential_restores_anonymous_and_clears_storage() {
        let storage = MemoryStorage::new();
        seeded(
            &storage,
            &token_expiring_at(NOW_S - 1),
            r#"{"id":4,"email":"ops@example.com","role":"Admin"}"#,
        );
        let mut auth = session_over(&storage);
        assert_eq!(auth.restore(NOW_MS), AuthPhase::Anonymous);
        assert!(!auth.session().is_authenticated());
        assert!(storage.is_empty());
    }

    #[test]
    fn token_without_identity_restores_anonymous_and_clears_storage() {
        let storage = MemoryStorage::new();
        storage
            .set(TOKEN_KEY, token_expiring_at(NOW_S + 60).expose())
            .expect("writes");
        let mut auth = session_over(&storage);
        assert_eq!(auth.restore(NOW_MS), AuthPhase::Anonymous);
        assert_eq!(auth.session(), Session::anonymous());
        assert!(storage.is_empty());
    }

    #[test]
    fn identity_without_token_restores_anonymous_and_clears_storage() {
        let storage = MemoryStorage::new();
        storage
            .set(
                IDENTITY_KEY,
                r#"{"id":4,"email":"ops@example.com","role":"Admin"}"#,
            )
            .expect("writes");
        let mut auth = session_over(&storage);
        assert_eq!(auth.restore(NOW_MS), AuthPhase::Anonymous);
        assert_eq!(auth.session(), Session::anonymous());
        assert!(storage.is_empty());
    }

    #[test]
    fn corrupt_identity_fails_closed() {
        let storage = MemoryStorage::new();
        seeded(&storage, &token_expiring_at(NOW_S + 60), "{oops");
        let mut auth = session_over(&storage);
        assert_eq!(auth.restore(NOW_MS), AuthPhase::Anonymous);
        assert!(storage.is_empty());
    }

    #[test]
    fn malformed_credential_fails_closed() {
        let storage = MemoryStorage::new();
        seeded(
            &storage,
            &Credential::new("not-a-token"),
            r#"{"id":4,"email":"ops@example.com","role":"Admin"}"#,
        );
        let mut auth = session_over(&storage);
        assert_eq!(auth.restore(NOW_MS), AuthPhase::Anonymous);
        assert!(storage.is_empty());
    }

    #[test]
    fn login_persists_normalized_identity() {
        let storage = MemoryStorage::new();
        let mut auth = session_over(&storage);
        auth.restore(NOW_MS);
        let ticket = auth.begin_login();
        let identity = auth
            .complete_login(ticket, Ok(login_response("MANAGER")))
            .expect("signs in");
        assert_eq!(identity.role, Role::Manager);
        assert_eq!(auth.phase(), AuthPhase::Authenticated);
        let stored = auth.store().load().expect("loads").expect("present");
        assert_eq!(stored.identity, identity);
        assert!(!stored.stale_role);
    }

    #[test]
    fn failed_login_leaves_session_untouched() {
        let storage = MemoryStorage::new();
        let mut auth = session_over(&storage);
        auth.restore(NOW_MS);
        let ticket = auth.begin_login();
        let err = auth
            .complete_login(
                ticket,
                Err(BackendError::Unauthorized {
                    message: Some("Invalid credentials".to_string()),
                }),
            )
            .expect_err("rejected");
        assert_eq!(err.to_string(), "Invalid credentials");
        assert_eq!(auth.phase(), AuthPhase::Anonymous);
        assert!(storage.is_empty());
    }

    #[test]
    fn login_survives_storage_failure_in_memory() {
        let storage = MemoryStorage::new();
        storage.reject_writes(true);
        let mut auth = session_over(&storage);
        auth.restore(NOW_MS);
        let ticket = auth.begin_login();
        auth.complete_login(ticket, Ok(login_response("driver")))
            .expect("signs in");
        assert_eq!(auth.phase(), AuthPhase::Authenticated);
        assert!(storage.is_empty());
    }

    #[test]
    fn logout_during_login_wins() {
        let storage = MemoryStorage::new();
        let mut auth = session_over(&storage);
        auth.restore(NOW_MS);
        let ticket = auth.begin_login();
        auth.logout();
        let err = auth
            .complete_login(ticket, Ok(login_response("admin")))
            .expect_err("superseded");
        assert_eq!(err, LoginError::Superseded);
        assert_eq!(auth.session(), Session::anonymous());
        assert!(storage.is_empty());
    }

    #[test]
    fn newer_login_supersedes_older() {
        let storage = MemoryStorage::new();
        let mut auth = session_over(&storage);
        auth.restore(NOW_MS);
        let first = auth.begin_login();
        let second = auth.begin_login();
        auth.complete_login(second, Ok(login_response("driver")))
            .expect("second wins");
        assert_eq!(
            auth.complete_login(first, Ok(login_response("admin"))),
            Err(LoginError::Superseded)
        );
        assert_eq!(auth.session().role(), Some(&Role::Driver));
    }

    #[test]
    fn logout_is_idempotent() {
        let storage = MemoryStorage::new();
        let mut auth = session_over(&storage);
        auth.restore(NOW_MS);
        let ticket = auth.begin_login();
        auth.complete_login(ticket, Ok(login_response("admin")))
            .expect("signs in");

        auth.logout();
        let once = (auth.phase(), auth.session());
        auth.logout();
        assert_eq!((auth.phase(), auth.session()), once);
        assert_eq!(once.0, AuthPhase::Anonymous);
        assert!(storage.is_empty());
    }

    #[test]
    fn stale_profile_refresh_is_discarded() {
        let storage = MemoryStorage::new();
        let mut auth = session_over(&storage);
        auth.restore(NOW_MS);
        let login = auth.begin_login();
        auth.complete_login(login, Ok(login_response("driver")))
            .expect("signs in");

        let ticket = auth.ticket();
        assert!(auth.apply_profile(ticket, profile("manager")));
        assert_eq!(auth.session().role(), Some(&Role::Manager));

        auth.logout();
        assert!(!auth.apply_profile(ticket, profile("admin")));
        assert!(!auth.session().is_authenticated());
        assert!(!auth.expire_if_current(ticket));
    }

    #[test]
    fn expire_drops_the_session() {
        let storage = MemoryStorage::new();
        let mut auth = session_over(&storage);
        auth.restore(NOW_MS);
        let login = auth.begin_login();
        auth.complete_login(login, Ok(login_response("admin")))
            .expect("signs in");
        let ticket = auth.ticket();
        assert!(auth.expire_if_current(ticket));
        assert_eq!(auth.phase(), AuthPhase::Anonymous);
        assert!(auth.credential().is_none());
        assert!(storage.is_empty());
    }
}
