//! Leaf-level HTTP I/O.

use std::sync::Arc;

use serde_json::Value;
use uuid::Uuid;

use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::request::ApiRequest;

/// Performs exactly one backend call.
///
/// `bearer` is attached as `Authorization: Bearer <token>` when present and
/// omitted otherwise. Implementations never retry.
#[async_trait::async_trait]
pub trait Dispatcher: Send + Sync {
    async fn dispatch(&self, request: &ApiRequest, bearer: Option<&str>) -> Result<Value, ApiError>;
}

#[async_trait::async_trait]
impl<D> Dispatcher for Arc<D>
where
    D: Dispatcher + ?Sized,
{
    async fn dispatch(&self, request: &ApiRequest, bearer: Option<&str>) -> Result<Value, ApiError> {
        (**self).dispatch(request, bearer).await
    }
}

/// `reqwest`-backed dispatcher.
#[derive(Debug, Clone)]
pub struct HttpDispatcher {
    http: reqwest::Client,
    base_url: String,
}

impl HttpDispatcher {
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| ApiError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: config.base_url.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait::async_trait]
impl Dispatcher for HttpDispatcher {
    async fn dispatch(&self, request: &ApiRequest, bearer: Option<&str>) -> Result<Value, ApiError> {
        let request_id = Uuid::now_v7();
        let url = format!("{}{}", self.base_url, request.path);

        let mut req = self.http.request(request.method.into(), &url);
        if !request.query.is_empty() {
            req = req.query(&request.query);
        }
        if let Some(body) = &request.body {
            req = req.json(body);
        }
        if let Some(token) = bearer {
            req = req.bearer_auth(token);
        }

        let redacted = bearer.map(hrdesk_observability::redact);
        tracing::debug!(
            %request_id,
            method = %request.method,
            path = %request.path,
            authenticated = bearer.is_some(),
            token = redacted.as_deref(),
            "dispatching request"
        );

        let resp = req.send().await.map_err(|e| {
            tracing::warn!(%request_id, path = %request.path, error = %e, "request failed before a response");
            ApiError::Network(e.to_string())
        })?;

        let status = resp.status();
        let bytes = resp
            .bytes()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        tracing::debug!(%request_id, path = %request.path, status = status.as_u16(), "response received");

        if !status.is_success() {
            let message = error_message(&bytes);
            tracing::info!(
                %request_id,
                method = %request.method,
                path = %request.path,
                status = status.as_u16(),
                message = message.as_deref(),
                "request rejected"
            );
            return Err(ApiError::api(status.as_u16(), message));
        }

        decode_body(&bytes)
    }
}

/// Empty bodies decode as `null`.
fn decode_body(bytes: &[u8]) -> Result<Value, ApiError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }
    serde_json::from_slice(bytes).map_err(|e| ApiError::Parse(e.to_string()))
}

/// `message` field of a JSON error body, if any.
fn error_message(bytes: &[u8]) -> Option<String> {
    serde_json::from_slice::<Value>(bytes)
        .ok()?
        .get("message")?
        .as_str()
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_body_is_null() {
        assert_eq!(decode_body(b"").unwrap(), Value::Null);
        assert_eq!(decode_body(b"  \n").unwrap(), Value::Null);
    }

    #[test]
    fn malformed_body_is_a_parse_error() {
        assert!(matches!(decode_body(b"<html>"), Err(ApiError::Parse(_))));
    }

    #[test]
    fn error_message_is_extracted_when_present() {
        assert_eq!(
            error_message(br#"{"success":false,"message":"Invalid credentials"}"#),
            Some("Invalid credentials".to_string())
        );
        assert_eq!(error_message(b"Bad Gateway"), None);
        assert_eq!(error_message(br#"{"message":42}"#), None);
    }
}
