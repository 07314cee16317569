//! Shared contexts for the API client and the auth session.
//!
//! # Design
//! - One API client and one session handle per app boot.
//! - Contexts compare by pointer so providers never re-render consumers on
//!   their own.

use std::rc::Rc;

use crate::app::preferences::LocalStorageStore;
use crate::core::auth::AuthHandle;
use crate::core::config::ClientConfig;
use crate::core::session::AuthSession;
use crate::core::storage::TokenStore;
use crate::services::api::ApiClient;

/// Shared API client context for UI services.
#[derive(Clone)]
pub(crate) struct ApiCtx {
    pub(crate) client: Rc<ApiClient>,
}

impl ApiCtx {
    pub(crate) fn new(config: ClientConfig) -> Self {
        Self {
            client: Rc::new(ApiClient::new(config)),
        }
    }
}

impl PartialEq for ApiCtx {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.client, &other.client)
    }
}

/// Session handle injected into the component tree.
pub(crate) type AuthCtx = AuthHandle<LocalStorageStore>;

pub(crate) fn new_auth_ctx() -> AuthCtx {
    AuthHandle::new(AuthSession::new(TokenStore::new(LocalStorageStore)))
}
