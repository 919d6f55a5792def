//! Cached, self-reauthenticating API client.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::broadcast;

use anyhow::Context;
use hrdesk_auth::{FileTokenStore, TokenStore};
use hrdesk_core::ApiEnvelope;

use crate::cache::{CacheKey, QueryCache};
use crate::config::ClientConfig;
use crate::dispatcher::{Dispatcher, HttpDispatcher};
use crate::endpoint::Endpoint;
use crate::error::ApiError;
use crate::interceptor::{ReauthInterceptor, SessionEvent};
use crate::request::ApiRequest;

/// Entry point for every catalog operation.
///
/// Queries go through the tag cache, mutations invalidate it; both go
/// through the [`ReauthInterceptor`]. The cache is emptied whenever the
/// interceptor gives up on the session.
pub struct ApiClient<D, S> {
    interceptor: ReauthInterceptor<D, S>,
    cache: Arc<QueryCache>,
}

/// Client as used by a desktop shell: real HTTP, tokens on disk.
pub type HttpApiClient = ApiClient<HttpDispatcher, FileTokenStore>;

impl HttpApiClient {
    pub fn from_config(config: &ClientConfig) -> anyhow::Result<Self> {
        let tokens = FileTokenStore::open(&config.token_path)
            .with_context(|| format!("failed to open token store at {:?}", config.token_path))?;
        let dispatcher = HttpDispatcher::new(config).context("failed to initialize HTTP dispatcher")?;
        tracing::info!(base_url = %config.base_url, "api client ready");
        Ok(ApiClient::new(dispatcher, tokens).with_login_path(config.login_path.clone()))
    }
}

impl<D, S> ApiClient<D, S>
where
    D: Dispatcher,
    S: TokenStore,
{
    pub fn new(dispatcher: D, tokens: S) -> Self {
        let cache = Arc::new(QueryCache::new());
        let expired = Arc::clone(&cache);
        let interceptor = ReauthInterceptor::new(dispatcher, tokens).on_session_expired(move || expired.clear());
        Self { interceptor, cache }
    }

    pub fn with_login_path(mut self, login_path: impl Into<String>) -> Self {
        self.interceptor = self.interceptor.with_login_path(login_path);
        self
    }

    pub fn tokens(&self) -> &S {
        self.interceptor.tokens()
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    /// Session events (e.g. "login required") for the embedding UI.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.interceptor.subscribe()
    }

    /// Run a query endpoint, serving a fresh cached result when one exists.
    pub async fn query(&self, endpoint: &Endpoint, request: ApiRequest) -> Result<Value, ApiError> {
        debug_assert!(endpoint.is_query(), "{} is not a query", endpoint.name);
        let key = CacheKey::new(endpoint.name, &request);
        self.cache
            .get_or_fetch(key, endpoint.provides(), || self.interceptor.execute(&request))
            .await
    }

    /// Run a mutation endpoint; on success its tags are invalidated.
    pub async fn mutate(&self, endpoint: &Endpoint, request: ApiRequest) -> Result<Value, ApiError> {
        debug_assert!(!endpoint.is_query(), "{} is not a mutation", endpoint.name);
        let value = self.interceptor.execute(&request).await?;
        self.cache.invalidate(endpoint.invalidates());
        tracing::debug!(endpoint = endpoint.name, "mutation applied");
        Ok(value)
    }

    /// Send `request` once, without a bearer and without reauthentication.
    pub(crate) async fn dispatch_unauthenticated(&self, request: &ApiRequest) -> Result<Value, ApiError> {
        self.interceptor.dispatcher().dispatch(request, None).await
    }

    /// Query whose payload sits in the envelope's `data`.
    pub(crate) async fn query_data<T: DeserializeOwned>(
        &self,
        endpoint: &Endpoint,
        request: ApiRequest,
    ) -> Result<T, ApiError> {
        let value = self.query(endpoint, request).await?;
        unwrap_envelope(value)
    }

    /// Mutation whose payload sits in the envelope's `data`.
    pub(crate) async fn mutate_data<T: DeserializeOwned>(
        &self,
        endpoint: &Endpoint,
        request: ApiRequest,
    ) -> Result<T, ApiError> {
        let value = self.mutate(endpoint, request).await?;
        unwrap_envelope(value)
    }

    /// Mutation answered with a bare (non-enveloped) body.
    pub(crate) async fn mutate_plain<T: DeserializeOwned>(
        &self,
        endpoint: &Endpoint,
        request: ApiRequest,
    ) -> Result<T, ApiError> {
        let value = self.mutate(endpoint, request).await?;
        Ok(serde_json::from_value(value)?)
    }
}

pub(crate) fn unwrap_envelope<T: DeserializeOwned>(value: Value) -> Result<T, ApiError> {
    let envelope: ApiEnvelope<T> = serde_json::from_value(value)?;
    Ok(envelope.into_data())
}
