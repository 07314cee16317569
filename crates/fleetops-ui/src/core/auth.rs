//! Async auth flows over a shared [`AuthSession`].
//!
//! # Design
//! - The backend is a trait so flows run against gloo-net in the browser and
//!   against fakes in native tests.
//! - No `RefCell` borrow is held across an `.await`; logout can always run
//!   while a request is pending.
//! - Observers are notified after the borrow is released.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use async_trait::async_trait;
use fleetops_api_models::{
    LoginRequest, LoginResponse, RegisterRequest, RegisterResponse, UserProfile,
};
use tracing::debug;

use crate::core::error::{BackendError, LoginError, RegisterError};
use crate::core::identity::Identity;
use crate::core::session::{AuthPhase, AuthSession, Session};
use crate::core::storage::KeyValueStore;
use crate::core::token::Credential;

/// Backend authentication endpoints.
#[async_trait(?Send)]
pub trait AuthBackend {
    /// `POST /auth/login`.
    async fn login(&self, request: &LoginRequest) -> Result<LoginResponse, BackendError>;
    /// `POST /auth/register`.
    async fn register(&self, request: &RegisterRequest) -> Result<RegisterResponse, BackendError>;
    /// `GET /auth/profile` for the holder of `credential`.
    async fn profile(&self, credential: &Credential) -> Result<UserProfile, BackendError>;
}

type Listener = Rc<dyn Fn(&Session)>;

/// Shared, cloneable handle to the application's session.
pub struct AuthHandle<S> {
    inner: Rc<RefCell<AuthSession<S>>>,
    listeners: Rc<RefCell<Vec<Listener>>>,
}

impl<S> Clone for AuthHandle<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
            listeners: Rc::clone(&self.listeners),
        }
    }
}

impl<S> PartialEq for AuthHandle<S> {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<S> fmt::Debug for AuthHandle<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthHandle")
            .field("listeners", &self.listeners.borrow().len())
            .finish_non_exhaustive()
    }
}

impl<S: KeyValueStore> AuthHandle<S> {
    /// Wrap a session.
    #[must_use]
    pub fn new(session: AuthSession<S>) -> Self {
        Self {
            inner: Rc::new(RefCell::new(session)),
            listeners: Rc::new(RefCell::new(Vec::new())),
        }
    }

    /// Register an observer called after every state change.
    pub fn subscribe(&self, listener: impl Fn(&Session) + 'static) {
        self.listeners.borrow_mut().push(Rc::new(listener));
    }

    /// Current snapshot.
    #[must_use]
    pub fn session(&self) -> Session {
        self.inner.borrow().session()
    }

    /// Current phase.
    #[must_use]
    pub fn phase(&self) -> AuthPhase {
        self.inner.borrow().phase()
    }

    /// Active credential.
    #[must_use]
    pub fn credential(&self) -> Option<Credential> {
        self.inner.borrow().credential().cloned()
    }

    /// Restore from storage; see [`AuthSession::restore`].
    pub fn restore(&self, now_ms: i64) -> Session {
        self.update(|auth| {
            auth.restore(now_ms);
        })
    }

    /// Sign in through `backend`.
    ///
    /// # Errors
    ///
    /// Returns [`LoginError`] carrying a display message; the session is
    /// unchanged on failure.
    pub async fn login<B>(
        &self,
        backend: &B,
        email: &str,
        password: &str,
    ) -> Result<Identity, LoginError>
    where
        B: AuthBackend + ?Sized,
    {
        let ticket = self.inner.borrow_mut().begin_login();
        let request = LoginRequest {
            email: email.trim().to_string(),
            password: password.to_string(),
        };
        let result = backend.login(&request).await;
        let outcome = self.inner.borrow_mut().complete_login(ticket, result);
        if outcome.is_ok() {
            self.notify();
        }
        outcome
    }

    /// Create an account. Never touches the session.
    ///
    /// # Errors
    ///
    /// Returns [`RegisterError::MissingField`] for blank required fields
    /// without calling the backend, otherwise the mapped backend failure.
    pub async fn register<B>(
        &self,
        backend: &B,
        request: &RegisterRequest,
    ) -> Result<RegisterResponse, RegisterError>
    where
        B: AuthBackend + ?Sized,
    {
        if let Some(field) = request.missing_field() {
            return Err(RegisterError::MissingField { field });
        }
        backend.register(request).await.map_err(RegisterError::from)
    }

    /// Revalidate the identity with the backend. A 401 expires the session.
    ///
    /// # Errors
    ///
    /// Returns the backend failure; the session is only changed for
    /// authentication failures.
    pub async fn refresh_profile<B>(&self, backend: &B) -> Result<(), BackendError>
    where
        B: AuthBackend + ?Sized,
    {
        let (ticket, credential) = {
            let auth = self.inner.borrow();
            match auth.credential() {
                Some(credential) => (auth.ticket(), credential.clone()),
                None => return Ok(()),
            }
        };
        match backend.profile(&credential).await {
            Ok(profile) => {
                let applied = self.inner.borrow_mut().apply_profile(ticket, profile);
                if applied {
                    self.notify();
                }
                Ok(())
            }
            Err(err) => {
                if err.is_unauthorized() && self.inner.borrow_mut().expire_if_current(ticket) {
                    debug!("profile refresh rejected the credential");
                    self.notify();
                }
                Err(err)
            }
        }
    }

    /// Sign out; idempotent.
    pub fn logout(&self) -> Session {
        self.update(AuthSession::logout)
    }

    fn update(&self, apply: impl FnOnce(&mut AuthSession<S>)) -> Session {
        let snapshot = {
            let mut auth = self.inner.borrow_mut();
            apply(&mut *auth);
            auth.session()
        };
        self.publish(&snapshot);
        snapshot
    }

    fn notify(&self) {
        let snapshot = self.session();
        self.publish(&snapshot);
    }

    fn publish(&self, snapshot: &Session) {
        let listeners: Vec<Listener> = self.listeners.borrow().clone();
        for listener in listeners {
            listener(snapshot);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::role::Role;
    use crate::core::storage::{MemoryStorage, TokenStore};
    use crate::core::token::fixtures::token_expiring_at;
    use fleetops_api_models::UserId;
    use serde_json::Map;
    use std::cell::{Cell, RefCell};
    use std::collections::VecDeque;
    use tokio::sync::oneshot;

    const NOW_MS: i64 = 1_700_000_000_000;
    const NOW_S: i64 = NOW_MS / 1000;

    fn profile(role: &str) -> UserProfile {
        UserProfile {
            id: UserId::Numeric(9),
            email: "a@b.com".to_string(),
            name: None,
            role: Some(role.to_string()),
            extra: Map::new(),
        }
    }

    fn login_ok(role: &str) -> Result<LoginResponse, BackendError> {
        Ok(LoginResponse {
            access_token: token_expiring_at(NOW_S + 3600).expose().to_string(),
            user: profile(role),
        })
    }

    #[derive(Default)]
    struct FakeBackend {
        logins: RefCell<VecDeque<Result<LoginResponse, BackendError>>>,
        profiles: RefCell<VecDeque<Result<UserProfile, BackendError>>>,
        registers: RefCell<VecDeque<Result<RegisterResponse, BackendError>>>,
        gate: RefCell<Option<oneshot::Receiver<()>>>,
        calls: Cell<usize>,
    }

    impl FakeBackend {
        fn with_login(result: Result<LoginResponse, BackendError>) -> Self {
            let backend = Self::default();
            backend.logins.borrow_mut().push_back(result);
            backend
        }
    }

    #[async_trait(?Send)]
    impl AuthBackend for FakeBackend {
        async fn login(&self, _request: &LoginRequest) -> Result<LoginResponse, BackendError> {
            self.calls.set(self.calls.get() + 1);
            let gate = self.gate.borrow_mut().take();
            if let Some(gate) = gate {
                let _ = gate.await;
            }
            self.logins
                .borrow_mut()
                .pop_front()
                .unwrap_or(Err(BackendError::Aborted))
        }

        async fn register(
            &self,
            _request: &RegisterRequest,
        ) -> Result<RegisterResponse, BackendError> {
            self.calls.set(self.calls.get() + 1);
            self.registers.borrow_mut().pop_front().unwrap_or_else(|| {
                Err(BackendError::Rejected {
                    status: 400,
                    message: Some("Email already registered".to_string()),
                })
            })
        }

        async fn profile(&self, _credential: &Credential) -> Result<UserProfile, BackendError> {
            self.calls.set(self.calls.get() + 1);
            self.profiles
                .borrow_mut()
                .pop_front()
                .unwrap_or(Err(BackendError::Aborted))
        }
    }

    fn handle(storage: &MemoryStorage) -> AuthHandle<MemoryStorage> {
        let handle = AuthHandle::new(AuthSession::new(TokenStore::new(storage.clone())));
        handle.restore(NOW_MS);
        handle
    }

    #[tokio::test(flavor = "current_thread")]
    async fn login_rejection_surfaces_backend_message() {
        let storage = MemoryStorage::new();
        let auth = handle(&storage);
        let backend = FakeBackend::with_login(Err(BackendError::Unauthorized {
            message: Some("Invalid credentials".to_string()),
        }));
        let err = auth
            .login(&backend, "a@b.com", "bad")
            .await
            .expect_err("rejected");
        assert_eq!(err.to_string(), "Invalid credentials");
        assert_eq!(auth.phase(), AuthPhase::Anonymous);
        assert!(storage.is_empty());
    }

    #[tokio::test(flavor = "current_thread")]
    async fn successful_login_notifies_observers() {
        let storage = MemoryStorage::new();
        let auth = handle(&storage);
        let seen = Rc::new(RefCell::new(Vec::new()));
        {
            let seen = Rc::clone(&seen);
            auth.subscribe(move |session| seen.borrow_mut().push(session.clone()));
        }
        let backend = FakeBackend::with_login(login_ok("admin"));
        let identity = auth
            .login(&backend, " a@b.com ", "pw")
            .await
            .expect("signs in");
        assert_eq!(identity.role, Role::Admin);
        assert_eq!(seen.borrow().len(), 1);
        assert!(seen.borrow()[0].is_authenticated());
        assert!(!storage.is_empty());
    }

    #[tokio::test(flavor = "current_thread")]
    async fn logout_while_login_pending_wins() {
        let storage = MemoryStorage::new();
        let auth = handle(&storage);
        let backend = FakeBackend::with_login(login_ok("admin"));
        let (release, gate) = oneshot::channel();
        *backend.gate.borrow_mut() = Some(gate);

        let pending = auth.login(&backend, "a@b.com", "pw");
        let interrupt = async {
            tokio::task::yield_now().await;
            auth.logout();
            let _ = release.send(());
        };
        let (outcome, ()) = tokio::join!(pending, interrupt);

        assert_eq!(outcome, Err(LoginError::Superseded));
        assert_eq!(auth.session(), Session::anonymous());
        assert!(storage.is_empty());
    }

    #[tokio::test(flavor = "current_thread")]
    async fn register_validates_before_calling_backend() {
        let storage = MemoryStorage::new();
        let auth = handle(&storage);
        let backend = FakeBackend::default();
        let request = RegisterRequest {
            name: "Ada".to_string(),
            email: String::new(),
            password: "pw".to_string(),
            role: "driver".to_string(),
        };
        assert_eq!(
            auth.register(&backend, &request).await,
            Err(RegisterError::MissingField { field: "email" })
        );
        assert_eq!(backend.calls.get(), 0);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn register_failure_does_not_touch_session() {
        let storage = MemoryStorage::new();
        let auth = handle(&storage);
        let backend = FakeBackend::with_login(login_ok("driver"));
        auth.login(&backend, "a@b.com", "pw").await.expect("signs in");
        let before = auth.session();

        let request = RegisterRequest {
            name: "Ada".to_string(),
            email: "ada@b.com".to_string(),
            password: "pw".to_string(),
            role: "driver".to_string(),
        };
        let err = auth
            .register(&backend, &request)
            .await
            .expect_err("duplicate");
        assert_eq!(err.to_string(), "Email already registered");
        assert_eq!(auth.session(), before);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn successful_register_leaves_session_unchanged() {
        let storage = MemoryStorage::new();
        let auth = handle(&storage);
        let notified = Rc::new(Cell::new(0_usize));
        {
            let notified = Rc::clone(&notified);
            auth.subscribe(move |_| notified.set(notified.get() + 1));
        }
        let backend = FakeBackend::default();
        backend.registers.borrow_mut().push_back(Ok(RegisterResponse {
            message: Some("User Ada registered successfully".to_string()),
            extra: Map::new(),
        }));
        let before = auth.session();

        let request = RegisterRequest {
            name: "Ada".to_string(),
            email: "ada@b.com".to_string(),
            password: "pw".to_string(),
            role: "driver".to_string(),
        };
        let response = auth
            .register(&backend, &request)
            .await
            .expect("registers");
        assert_eq!(
            response.message.as_deref(),
            Some("User Ada registered successfully")
        );
        assert_eq!(auth.session(), before);
        assert_eq!(auth.phase(), AuthPhase::Anonymous);
        assert_eq!(notified.get(), 0);
        assert!(storage.is_empty());
    }

    #[tokio::test(flavor = "current_thread")]
    async fn profile_refresh_updates_identity() {
        let storage = MemoryStorage::new();
        let auth = handle(&storage);
        let backend = FakeBackend::with_login(login_ok("driver"));
        auth.login(&backend, "a@b.com", "pw").await.expect("signs in");
        backend.profiles.borrow_mut().push_back(Ok(profile("MANAGER")));

        auth.refresh_profile(&backend).await.expect("refreshes");
        assert_eq!(auth.session().role(), Some(&Role::Manager));
    }

    #[tokio::test(flavor = "current_thread")]
    async fn unauthorized_profile_refresh_expires_session() {
        let storage = MemoryStorage::new();
        let auth = handle(&storage);
        let backend = FakeBackend::with_login(login_ok("driver"));
        auth.login(&backend, "a@b.com", "pw").await.expect("signs in");
        backend
            .profiles
            .borrow_mut()
            .push_back(Err(BackendError::Unauthorized { message: None }));

        let err = auth.refresh_profile(&backend).await.expect_err("401");
        assert!(err.is_unauthorized());
        assert_eq!(auth.phase(), AuthPhase::Anonymous);
        assert!(storage.is_empty());
    }

    #[tokio::test(flavor = "current_thread")]
    async fn transport_failure_on_refresh_keeps_session() {
        let storage = MemoryStorage::new();
        let auth = handle(&storage);
        let backend = FakeBackend::with_login(login_ok("driver"));
        auth.login(&backend, "a@b.com", "pw").await.expect("signs in");
        backend
            .profiles
            .borrow_mut()
            .push_back(Err(BackendError::Transport {
                detail: "offline".to_string(),
            }));

        assert!(auth.refresh_profile(&backend).await.is_err());
        assert_eq!(auth.phase(), AuthPhase::Authenticated);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn refresh_without_session_is_a_no_op() {
        let storage = MemoryStorage::new();
        let auth = handle(&storage);
        let backend = FakeBackend::default();
        auth.refresh_profile(&backend).await.expect("no-op");
        assert_eq!(backend.calls.get(), 0);
    }

    #[test]
    fn handles_compare_by_identity() {
        let storage = MemoryStorage::new();
        let a = handle(&storage);
        let b = handle(&storage);
        assert_eq!(a, a.clone());
        assert_ne!(a, b);
    }
}
