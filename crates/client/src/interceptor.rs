//! Transparent session refresh on `401 Unauthorized`.
//!
//! A logical request makes at most three network calls, strictly in order:
//! the original attempt, one refresh, one replay. The replay goes through
//! [`ReauthInterceptor::send`], which has no refresh path, so a second
//! refresh for the same request cannot be expressed.

use serde_json::Value;
use tokio::sync::{Mutex, broadcast};

use hrdesk_auth::{RefreshTokenRequest, SessionCredentials, TokenKey, TokenStore};
use hrdesk_core::ApiEnvelope;

use crate::config::DEFAULT_LOGIN_PATH;
use crate::dispatcher::Dispatcher;
use crate::error::ApiError;
use crate::request::ApiRequest;

pub const REFRESH_TOKEN_PATH: &str = "/auth/refresh-token";

const EVENT_CAPACITY: usize = 16;

/// Session-level side effects observed by the embedding UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// Credentials were wiped; the user must sign in again.
    LoginRequired { redirect_to: String },
}

/// Which attempt of a logical request is being sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Attempt {
    Initial,
    Replay,
}

impl Attempt {
    fn as_str(&self) -> &'static str {
        match self {
            Attempt::Initial => "initial",
            Attempt::Replay => "replay",
        }
    }
}

/// Outcome of the 401 handling step.
enum Recovery {
    /// A fresh access token is in the store; replay once.
    Replay,
    /// The session is gone; surface the original failure.
    Expired,
}

type ExpiryHook = Box<dyn Fn() + Send + Sync>;

pub struct ReauthInterceptor<D, S> {
    dispatcher: D,
    tokens: S,
    refresh_gate: Mutex<()>,
    events: broadcast::Sender<SessionEvent>,
    login_path: String,
    on_expired: Option<ExpiryHook>,
}

impl<D, S> ReauthInterceptor<D, S>
where
    D: Dispatcher,
    S: TokenStore,
{
    pub fn new(dispatcher: D, tokens: S) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            dispatcher,
            tokens,
            refresh_gate: Mutex::new(()),
            events,
            login_path: DEFAULT_LOGIN_PATH.to_string(),
            on_expired: None,
        }
    }

    pub fn with_login_path(mut self, login_path: impl Into<String>) -> Self {
        self.login_path = login_path.into();
        self
    }

    /// Run `hook` whenever the session is wiped, before `LoginRequired` is sent.
    pub fn on_session_expired(mut self, hook: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_expired = Some(Box::new(hook));
        self
    }

    pub fn tokens(&self) -> &S {
        &self.tokens
    }

    pub fn dispatcher(&self) -> &D {
        &self.dispatcher
    }

    /// Subscribe to session events. Events sent before subscribing are not replayed.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// Run one logical request.
    ///
    /// Non-401 outcomes are returned unchanged. On 401 the session is
    /// refreshed once and the request replayed once; the replay's outcome is
    /// final, whatever it is.
    pub async fn execute(&self, request: &ApiRequest) -> Result<Value, ApiError> {
        let (bearer, result) = self.send(request, Attempt::Initial).await;

        let original = match result {
            Err(err) if err.is_unauthorized() => err,
            other => return other,
        };

        match self.recover(bearer.as_deref()).await {
            Recovery::Replay => self.send(request, Attempt::Replay).await.1,
            Recovery::Expired => Err(original),
        }
    }

    /// One dispatch with whatever access token the store holds right now.
    async fn send(&self, request: &ApiRequest, attempt: Attempt) -> (Option<String>, Result<Value, ApiError>) {
        let bearer = self.tokens.get(TokenKey::AccessToken);
        tracing::debug!(
            method = %request.method,
            path = %request.path,
            attempt = attempt.as_str(),
            "sending request"
        );
        let result = self.dispatcher.dispatch(request, bearer.as_deref()).await;
        (bearer, result)
    }

    /// Obtain a usable access token after `rejected` was refused.
    ///
    /// Refreshes are serialized. A caller that waited on the gate and finds a
    /// different access token in the store skips its own refresh: another
    /// request already rotated the pair.
    async fn recover(&self, rejected: Option<&str>) -> Recovery {
        let _gate = self.refresh_gate.lock().await;

        let current = self.tokens.get(TokenKey::AccessToken);
        if current.is_some() && current.as_deref() != rejected {
            tracing::debug!("access token rotated concurrently; replaying without refresh");
            return Recovery::Replay;
        }

        let Some(refresh_token) = self.tokens.get(TokenKey::RefreshToken) else {
            self.expire_session("no refresh token");
            return Recovery::Expired;
        };

        match self.refresh(refresh_token).await {
            Ok(credentials) => {
                self.tokens.store(&credentials);
                tracing::info!(
                    access_token = %hrdesk_observability::redact(&credentials.access_token),
                    "session refreshed"
                );
                Recovery::Replay
            }
            Err(err) => {
                tracing::warn!(error = %err, "session refresh failed");
                self.expire_session("refresh rejected");
                Recovery::Expired
            }
        }
    }

    async fn refresh(&self, refresh_token: String) -> Result<SessionCredentials, ApiError> {
        let request = ApiRequest::post(REFRESH_TOKEN_PATH).json(&RefreshTokenRequest { refresh_token })?;
        let body = self.dispatcher.dispatch(&request, None).await?;
        let envelope: ApiEnvelope<SessionCredentials> = serde_json::from_value(body)?;
        Ok(envelope.into_data())
    }

    /// Wipe credentials and announce that a new login is needed.
    ///
    /// Never blocks; having no subscribers is fine.
    fn expire_session(&self, reason: &str) {
        self.tokens.clear_all();
        if let Some(hook) = &self.on_expired {
            hook();
        }
        tracing::info!(reason, redirect_to = %self.login_path, "session expired");
        let _ = self.events.send(SessionEvent::LoginRequired {
            redirect_to: self.login_path.clone(),
        });
    }
}
