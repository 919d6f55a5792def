//! Durable, process-wide storage of the session tokens.
//!
//! The store is the single source of truth for credentials: request-issuing
//! code reads it right before every dispatch. Implementations never fail;
//! persistence problems are logged and the operation degrades to a no-op.

use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, RwLock};

use anyhow::Context;
use tempfile::NamedTempFile;

use crate::SessionCredentials;

/// Keys held by the Token Store.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum TokenKey {
    AccessToken,
    RefreshToken,
}

impl TokenKey {
    /// Persisted key name.
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKey::AccessToken => "accessToken",
            TokenKey::RefreshToken => "refreshToken",
        }
    }
}

/// Key/value credential storage (`get`/`set`/`clear`).
pub trait TokenStore: Send + Sync {
    fn get(&self, key: TokenKey) -> Option<String>;
    fn set(&self, key: TokenKey, value: String);
    fn clear(&self, key: TokenKey);

    /// Both tokens, if both are present.
    fn credentials(&self) -> Option<SessionCredentials> {
        Some(SessionCredentials::new(
            self.get(TokenKey::AccessToken)?,
            self.get(TokenKey::RefreshToken)?,
        ))
    }

    fn store(&self, credentials: &SessionCredentials) {
        self.set(TokenKey::AccessToken, credentials.access_token.clone());
        self.set(TokenKey::RefreshToken, credentials.refresh_token.clone());
    }

    fn clear_all(&self) {
        self.clear(TokenKey::AccessToken);
        self.clear(TokenKey::RefreshToken);
    }
}

impl<S> TokenStore for Arc<S>
where
    S: TokenStore + ?Sized,
{
    fn get(&self, key: TokenKey) -> Option<String> {
        (**self).get(key)
    }

    fn set(&self, key: TokenKey, value: String) {
        (**self).set(key, value)
    }

    fn clear(&self, key: TokenKey) {
        (**self).clear(key)
    }

    fn credentials(&self) -> Option<SessionCredentials> {
        (**self).credentials()
    }

    fn store(&self, credentials: &SessionCredentials) {
        (**self).store(credentials)
    }

    fn clear_all(&self) {
        (**self).clear_all()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// In-memory
// ─────────────────────────────────────────────────────────────────────────────

/// In-memory Token Store for tests and embedders that persist elsewhere.
#[derive(Debug, Default)]
pub struct InMemoryTokenStore {
    inner: RwLock<HashMap<TokenKey, String>>,
}

impl InMemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_credentials(credentials: &SessionCredentials) -> Self {
        let store = Self::new();
        store.store(credentials);
        store
    }
}

impl TokenStore for InMemoryTokenStore {
    fn get(&self, key: TokenKey) -> Option<String> {
        let map = self.inner.read().ok()?;
        map.get(&key).cloned()
    }

    fn set(&self, key: TokenKey, value: String) {
        if let Ok(mut map) = self.inner.write() {
            map.insert(key, value);
        }
    }

    fn clear(&self, key: TokenKey) {
        if let Ok(mut map) = self.inner.write() {
            map.remove(&key);
        }
    }

    fn credentials(&self) -> Option<SessionCredentials> {
        let map = self.inner.read().ok()?;
        Some(SessionCredentials::new(
            map.get(&TokenKey::AccessToken)?.clone(),
            map.get(&TokenKey::RefreshToken)?.clone(),
        ))
    }

    fn store(&self, credentials: &SessionCredentials) {
        if let Ok(mut map) = self.inner.write() {
            map.insert(TokenKey::AccessToken, credentials.access_token.clone());
            map.insert(TokenKey::RefreshToken, credentials.refresh_token.clone());
        }
    }

    fn clear_all(&self) {
        if let Ok(mut map) = self.inner.write() {
            map.clear();
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// File-backed
// ─────────────────────────────────────────────────────────────────────────────

/// JSON-file Token Store surviving process restarts.
///
/// The file is re-read on every `get`, so a token written by another process
/// (or another client instance) is picked up by the next request. Writes go
/// through a process-local lock, land in a sibling temp file and are renamed
/// over the session file. Readers take no lock: a rename is atomic, so they
/// see either the previous or the next complete file.
#[derive(Debug)]
pub struct FileTokenStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileTokenStore {
    /// Open (or prepare) the store at `path`, creating parent directories.
    pub fn open(path: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create token directory at {:?}", parent))?;
        }
        if path.exists() {
            // Surface a corrupt file at startup rather than on the first request.
            read_map(&path)?;
        }
        Ok(Self {
            path,
            write_lock: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> HashMap<String, String> {
        match read_map(&self.path) {
            Ok(map) => map,
            Err(err) => {
                tracing::warn!(path = %self.path.display(), "failed to read token file: {err:#}");
                HashMap::new()
            }
        }
    }

    fn update(&self, f: impl FnOnce(&mut HashMap<String, String>)) {
        let _guard = match self.write_lock.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let mut map = self.load();
        f(&mut map);
        if let Err(err) = write_map(&self.path, &map) {
            tracing::error!(path = %self.path.display(), "failed to persist tokens: {err:#}");
        }
    }
}

impl TokenStore for FileTokenStore {
    fn get(&self, key: TokenKey) -> Option<String> {
        self.load().remove(key.as_str())
    }

    fn credentials(&self) -> Option<SessionCredentials> {
        let mut map = self.load();
        Some(SessionCredentials::new(
            map.remove(TokenKey::AccessToken.as_str())?,
            map.remove(TokenKey::RefreshToken.as_str())?,
        ))
    }

    fn store(&self, credentials: &SessionCredentials) {
        self.update(|map| {
            map.insert(
                TokenKey::AccessToken.as_str().to_string(),
                credentials.access_token.clone(),
            );
            map.insert(
                TokenKey::RefreshToken.as_str().to_string(),
                credentials.refresh_token.clone(),
            );
        });
    }

    fn clear_all(&self) {
        self.update(|map| {
            map.remove(TokenKey::AccessToken.as_str());
            map.remove(TokenKey::RefreshToken.as_str());
        });
    }

    fn set(&self, key: TokenKey, value: String) {
        self.update(|map| {
            map.insert(key.as_str().to_string(), value);
        });
    }

    fn clear(&self, key: TokenKey) {
        self.update(|map| {
            map.remove(key.as_str());
        });
    }
}

fn read_map(path: &Path) -> anyhow::Result<HashMap<String, String>> {
    if !path.exists() {
        return Ok(HashMap::new());
    }
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read token file {}", path.display()))?;
    if contents.trim().is_empty() {
        return Ok(HashMap::new());
    }
    serde_json::from_str(&contents)
        .with_context(|| format!("failed to parse token file {}", path.display()))
}

fn write_map(path: &Path, map: &HashMap<String, String>) -> anyhow::Result<()> {
    let contents = serde_json::to_string_pretty(map).context("failed to serialize tokens")?;

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    // Created 0600 on unix.
    let mut tmp = NamedTempFile::new_in(dir)
        .with_context(|| format!("failed to create temp file in {}", dir.display()))?;
    tmp.write_all(contents.as_bytes())
        .with_context(|| format!("failed to write to {}", tmp.path().display()))?;
    tmp.persist(path)
        .with_context(|| format!("failed to replace {}", path.display()))?;
    Ok(())
}
