//! REST client for the auth endpoints.
//!
//! # Design
//! - Every request carries its own `AbortController`, tracked by the client
//!   that issued it until it settles.
//! - A `gloo_timers` timeout aborts the request and reports `TimedOut`.
//! - Status classification and body validation live in the DOM-free core.

use std::cell::Cell;
use std::rc::Rc;

use async_trait::async_trait;
use fleetops_api_models::{
    LoginRequest, LoginResponse, RegisterRequest, RegisterResponse, UserProfile,
    decode_login_response, decode_profile, decode_register_response,
};
use gloo_net::http::{Request, Response};
use gloo_timers::callback::Timeout;
use web_sys::AbortController;

use crate::core::auth::AuthBackend;
use crate::core::config::ClientConfig;
use crate::core::error::BackendError;
use crate::core::inflight::{AbortHandle, InflightRequests};
use crate::core::token::Credential;

const LOGIN_PATH: &str = "/auth/login";
const REGISTER_PATH: &str = "/auth/register";
const PROFILE_PATH: &str = "/auth/profile";

type Classifier = fn(u16, &str) -> Option<BackendError>;

impl AbortHandle for AbortController {
    fn abort(&self) {
        Self::abort(self);
    }
}

#[derive(Debug)]
pub(crate) struct ApiClient {
    config: ClientConfig,
    inflight: InflightRequests<AbortController>,
}

impl ApiClient {
    pub(crate) fn new(config: ClientConfig) -> Self {
        Self {
            config,
            inflight: InflightRequests::new(),
        }
    }

    /// Client sharing this configuration but tracking its own requests, so a
    /// view can cancel what it started without touching anyone else's calls.
    pub(crate) fn scoped(&self) -> Self {
        Self::new(self.config.clone())
    }

    /// Abort every request this client still has in flight; their callers see
    /// `Aborted`.
    pub(crate) fn cancel_inflight(&self) {
        self.inflight.cancel_all();
    }

    async fn send(&self, request: Request, classify: Classifier) -> Result<String, BackendError> {
        let controller = AbortController::new().map_err(|err| BackendError::Transport {
            detail: format!("{err:?}"),
        })?;
        let signal = controller.signal();
        let id = self.inflight.track(controller.clone());

        let timed_out = Rc::new(Cell::new(false));
        let timeout_ms = self.config.request_timeout_ms;
        let timer = {
            let timed_out = Rc::clone(&timed_out);
            let controller = controller.clone();
            Timeout::new(timeout_ms, move || {
                timed_out.set(true);
                controller.abort();
            })
        };

        let result = read_response(request.abort_signal(Some(&signal))).await;
        drop(timer);
        self.inflight.settle(id);

        let (status, body) = result.map_err(|detail| {
            if timed_out.get() {
                BackendError::TimedOut {
                    after_ms: timeout_ms,
                }
            } else if signal.aborted() {
                BackendError::Aborted
            } else {
                BackendError::Transport { detail }
            }
        })?;
        classify(status, &body).map_or(Ok(body), Err)
    }

    fn url(&self, path: &str) -> String {
        self.config.endpoint(path)
    }
}

async fn read_response(request: Request) -> Result<(u16, String), String> {
    let response: Response = request.send().await.map_err(|err| err.to_string())?;
    let status = response.status();
    let body = response.text().await.map_err(|err| err.to_string())?;
    Ok((status, body))
}

fn encode_error(err: &gloo_net::Error) -> BackendError {
    BackendError::Transport {
        detail: err.to_string(),
    }
}

#[async_trait(?Send)]
impl AuthBackend for ApiClient {
    async fn login(&self, request: &LoginRequest) -> Result<LoginResponse, BackendError> {
        let request = Request::post(&self.url(LOGIN_PATH))
            .json(request)
            .map_err(|err| encode_error(&err))?;
        let body = self.send(request, BackendError::from_response).await?;
        Ok(decode_login_response(&body)?)
    }

    async fn register(&self, request: &RegisterRequest) -> Result<RegisterResponse, BackendError> {
        let request = Request::post(&self.url(REGISTER_PATH))
            .json(request)
            .map_err(|err| encode_error(&err))?;
        let body = self.send(request, BackendError::from_response).await?;
        Ok(decode_register_response(&body)?)
    }

    async fn profile(&self, credential: &Credential) -> Result<UserProfile, BackendError> {
        let request = Request::get(&self.url(PROFILE_PATH))
            .header("Authorization", &format!("Bearer {}", credential.expose()));
        let body = self
            .send(request, BackendError::from_credentialed_response)
            .await?;
        Ok(decode_profile(&body)?)
    }
}
