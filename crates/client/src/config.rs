//! Client configuration.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080/api";
pub const DEFAULT_LOGIN_PATH: &str = "/login";

pub const ENV_API_URL: &str = "HRDESK_API_URL";
pub const ENV_TOKEN_FILE: &str = "HRDESK_TOKEN_FILE";
pub const ENV_REQUEST_TIMEOUT: &str = "HRDESK_REQUEST_TIMEOUT_SECS";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Backend root; endpoint paths are appended verbatim.
    pub base_url: String,
    /// Where the persisted session tokens live.
    pub token_path: PathBuf,
    /// `None` leaves the transport default in place.
    pub request_timeout: Option<Duration>,
    /// Navigation target announced when the session cannot be recovered.
    pub login_path: String,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>, token_path: impl Into<PathBuf>) -> Self {
        Self {
            base_url: normalize_base_url(base_url.into()),
            token_path: token_path.into(),
            request_timeout: None,
            login_path: DEFAULT_LOGIN_PATH.to_string(),
        }
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    pub fn with_login_path(mut self, login_path: impl Into<String>) -> Self {
        self.login_path = login_path.into();
        self
    }

    /// Read the configuration from `HRDESK_*` environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ClientConfig::from_env`] with an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let base_url = lookup(ENV_API_URL)
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            anyhow::bail!("{ENV_API_URL} must be an http(s) URL, got '{base_url}'");
        }

        let token_path = match lookup(ENV_TOKEN_FILE).filter(|v| !v.trim().is_empty()) {
            Some(path) => PathBuf::from(path),
            None => default_token_path()?,
        };

        let mut config = Self::new(base_url, token_path);

        if let Some(raw) = lookup(ENV_REQUEST_TIMEOUT) {
            let secs: u64 = raw
                .trim()
                .parse()
                .with_context(|| format!("{ENV_REQUEST_TIMEOUT} must be a whole number of seconds, got '{raw}'"))?;
            if secs == 0 {
                anyhow::bail!("{ENV_REQUEST_TIMEOUT} must be greater than zero");
            }
            config.request_timeout = Some(Duration::from_secs(secs));
        }

        Ok(config)
    }
}

/// `{data_dir}/hrdesk/session.json`.
pub fn default_token_path() -> anyhow::Result<PathBuf> {
    let mut dir = dirs::data_dir()
        .or_else(|| {
            dirs::home_dir().map(|mut h| {
                h.push(".local");
                h.push("share");
                h
            })
        })
        .context("failed to resolve OS app data directory - tried data_dir() and home_dir()/.local/share")?;

    dir.push("hrdesk");
    dir.push("session.json");
    Ok(dir)
}

fn normalize_base_url(mut url: String) -> String {
    while url.ends_with('/') {
        url.pop();
    }
    url
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_unset() {
        let cfg = ClientConfig::from_lookup(lookup(&[(ENV_TOKEN_FILE, "/tmp/s.json")])).unwrap();
        assert_eq!(cfg.base_url, DEFAULT_BASE_URL);
        assert_eq!(cfg.token_path, PathBuf::from("/tmp/s.json"));
        assert_eq!(cfg.request_timeout, None);
        assert_eq!(cfg.login_path, "/login");
    }

    #[test]
    fn reads_overrides() {
        let cfg = ClientConfig::from_lookup(lookup(&[
            (ENV_API_URL, "https://hr.example.com/api/"),
            (ENV_TOKEN_FILE, "/tmp/s.json"),
            (ENV_REQUEST_TIMEOUT, "15"),
        ]))
        .unwrap();
        assert_eq!(cfg.base_url, "https://hr.example.com/api");
        assert_eq!(cfg.request_timeout, Some(Duration::from_secs(15)));
    }

    #[test]
    fn rejects_bad_values() {
        let bad_timeout = ClientConfig::from_lookup(lookup(&[
            (ENV_TOKEN_FILE, "/tmp/s.json"),
            (ENV_REQUEST_TIMEOUT, "soon"),
        ]));
        assert!(bad_timeout.is_err());

        let bad_url = ClientConfig::from_lookup(lookup(&[
            (ENV_API_URL, "localhost:8080"),
            (ENV_TOKEN_FILE, "/tmp/s.json"),
        ]));
        assert!(bad_url.is_err());
    }
}
