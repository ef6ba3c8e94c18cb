//! Signing key set retrieval and caching.
//!
//! The issuer publishes its public keys as a JWKS document. [`KeySetCache`]
//! keeps one copy of it for the whole process, refetching when the copy is
//! older than the configured TTL or when a token names a key id the copy
//! does not contain.

use crate::error::{AuthError, KeySetError};
use async_trait::async_trait;
use jsonwebtoken::jwk::{Jwk, JwkSet};
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, RwLock};

/// Somewhere a key set can be loaded from.
#[async_trait]
pub trait KeySource: Send + Sync {
    async fn fetch(&self) -> Result<JwkSet, KeySetError>;

    /// Short description for log lines (URL or file name).
    fn describe(&self) -> String;
}

/// Fetches the key set from the issuer's JWKS endpoint.
pub struct HttpKeySource {
    client: reqwest::Client,
    url: String,
}

impl HttpKeySource {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, KeySetError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| KeySetError::Client(e.to_string()))?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl KeySource for HttpKeySource {
    async fn fetch(&self) -> Result<JwkSet, KeySetError> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| KeySetError::Fetch {
                url: self.url.clone(),
                reason: e.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(KeySetError::Status {
                url: self.url.clone(),
                status: response.status().as_u16(),
            });
        }

        response
            .json::<JwkSet>()
            .await
            .map_err(|e| KeySetError::Parse(e.to_string()))
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}

/// A fixed key set, read once from JSON or a local file.
#[derive(Clone)]
pub struct StaticKeySource {
    keys: JwkSet,
    origin: String,
}

impl StaticKeySource {
    pub fn new(keys: JwkSet) -> Self {
        Self {
            keys,
            origin: "static".to_string(),
        }
    }

    pub fn from_json(json: &str) -> Result<Self, KeySetError> {
        let keys = serde_json::from_str(json).map_err(|e| KeySetError::Parse(e.to_string()))?;
        Ok(Self::new(keys))
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, KeySetError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let mut source = Self::from_json(&content)?;
        source.origin = path.display().to_string();
        Ok(source)
    }
}

#[async_trait]
impl KeySource for StaticKeySource {
    async fn fetch(&self) -> Result<JwkSet, KeySetError> {
        Ok(self.keys.clone())
    }

    fn describe(&self) -> String {
        self.origin.clone()
    }
}

struct CachedKeys {
    keys: Arc<JwkSet>,
    fetched_at: Instant,
    generation: u64,
}

impl CachedKeys {
    fn is_fresh(&self, ttl: Duration) -> bool {
        self.fetched_at.elapsed() < ttl
    }
}

/// Cached set plus the bookkeeping for fetch attempts, successful or not.
#[derive(Default)]
struct KeyState {
    current: Option<CachedKeys>,
    attempts: u64,
    last_attempt: Option<Instant>,
}

impl KeyState {
    fn keys(&self) -> Option<Arc<JwkSet>> {
        self.current.as_ref().map(|c| c.keys.clone())
    }
}

/// Process-wide key set cache.
///
/// Readers share an `RwLock`. Refreshes are serialized by `refresh_lock`;
/// every fetch attempt, failed ones included, bumps `attempts`, so a task
/// that queued behind another task's attempt takes that outcome instead of
/// fetching again. No fetch starts within `min_refresh` of the last attempt.
pub struct KeySetCache {
    source: Arc<dyn KeySource>,
    ttl: Duration,
    min_refresh: Duration,
    state: RwLock<KeyState>,
    refresh_lock: Mutex<()>,
}

impl KeySetCache {
    pub fn new(source: Arc<dyn KeySource>, ttl: Duration) -> Self {
        Self {
            source,
            ttl,
            min_refresh: Duration::ZERO,
            state: RwLock::new(KeyState::default()),
            refresh_lock: Mutex::new(()),
        }
    }

    /// Minimum time between two fetches triggered by lookups.
    pub fn with_min_refresh(mut self, min_refresh: Duration) -> Self {
        self.min_refresh = min_refresh;
        self
    }

    /// Fetch the key set now. Used at startup so the first request does not
    /// pay for the round trip.
    pub async fn preload(&self) -> Result<usize, KeySetError> {
        let _guard = self.refresh_lock.lock().await;
        let keys = self.fetch_and_record().await?;
        Ok(keys.keys.len())
    }

    /// Find the key with id `kid`, refreshing the set if it is stale or the
    /// id is unknown.
    pub async fn key(&self, kid: &str) -> Result<Jwk, AuthError> {
        let observed = {
            let state = self.state.read().await;
            if let Some(entry) = state.current.as_ref() {
                if entry.is_fresh(self.ttl) {
                    if let Some(jwk) = entry.keys.find(kid) {
                        return Ok(jwk.clone());
                    }
                }
            }
            state.attempts
        };

        let keys = self.refresh(observed).await.ok_or(AuthError::UnknownKey)?;
        match keys.find(kid) {
            Some(jwk) => Ok(jwk.clone()),
            None => {
                tracing::debug!(kid = %kid, "no key with this id in the key set");
                Err(AuthError::UnknownKey)
            }
        }
    }

    /// Number of successful fetches so far.
    pub async fn generation(&self) -> u64 {
        self.state.read().await.current.as_ref().map_or(0, |c| c.generation)
    }

    /// Refresh unless another task attempted one since `observed` or the
    /// last attempt is too recent. Returns the newest set available, falling
    /// back to a stale copy when the fetch fails.
    async fn refresh(&self, observed: u64) -> Option<Arc<JwkSet>> {
        let _guard = self.refresh_lock.lock().await;

        {
            let state = self.state.read().await;
            if state.attempts != observed {
                return state.keys();
            }
            let recent = state
                .last_attempt
                .is_some_and(|at| at.elapsed() < self.min_refresh);
            if recent {
                tracing::debug!(
                    source = %self.source.describe(),
                    "key set fetched recently, not refetching"
                );
                return state.keys();
            }
        }

        match self.fetch_and_record().await {
            Ok(keys) => Some(keys),
            Err(e) => {
                tracing::warn!(
                    source = %self.source.describe(),
                    error = %e,
                    "key set refresh failed"
                );
                self.state.read().await.keys()
            }
        }
    }

    /// Fetch once and record the attempt. Callers hold `refresh_lock`.
    async fn fetch_and_record(&self) -> Result<Arc<JwkSet>, KeySetError> {
        let result = self.source.fetch().await;

        let mut state = self.state.write().await;
        state.attempts += 1;
        state.last_attempt = Some(Instant::now());

        let keys = Arc::new(result?);
        let generation = state.current.as_ref().map_or(0, |c| c.generation) + 1;
        tracing::info!(
            source = %self.source.describe(),
            keys = keys.keys.len(),
            generation,
            "loaded signing key set"
        );
        state.current = Some(CachedKeys {
            keys: keys.clone(),
            fetched_at: Instant::now(),
            generation,
        });
        Ok(keys)
    }
}
