//! Resolution orchestrator: credential record in, cached SDK config out.

use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use sdkcache_core::{CacheConfig, ConfigError};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::credentials::AwsCredentialConfig;
use crate::error::AwsError;
use crate::key::{config_identifier, derive_key};
use crate::record::CredentialRecord;
use crate::store::ConfigCache;

/// The two external collaborators of the cache.
///
/// `resolve_credentials` turns raw input into a normalized config and
/// `load_config` performs the (usually network-bound) SDK resolution. Both
/// errors are passed through the cache unchanged and never cached.
#[async_trait]
pub trait ConfigSource: Send + Sync + 'static {
    /// The resolved, cheaply cloneable config handed to callers.
    type Config: Clone + Send + Sync + 'static;

    /// Parse and validate a raw record.
    fn resolve_credentials(
        &self,
        record: &CredentialRecord,
    ) -> Result<AwsCredentialConfig, AwsError> {
        AwsCredentialConfig::from_record(record)
    }

    /// Build a config from normalized credentials.
    async fn load_config(&self, creds: &AwsCredentialConfig) -> Result<Self::Config, AwsError>;
}

/// Public entry point: resolves records to configs through a [`ConfigCache`].
pub struct ConfigResolver<S: ConfigSource> {
    source: S,
    cache: Arc<ConfigCache<S::Config>>,
}

impl<S: ConfigSource> ConfigResolver<S> {
    /// Create a resolver with its own cache and start the janitor when a
    /// tokio runtime is available.
    pub fn new(source: S, config: &CacheConfig) -> Result<Self, ConfigError> {
        let cache = Arc::new(ConfigCache::from_config(config)?);
        cache.start_janitor();
        Ok(Self::with_cache(source, cache))
    }

    /// Create a resolver around an existing cache. The janitor is left as is.
    pub fn with_cache(source: S, cache: Arc<ConfigCache<S::Config>>) -> Self {
        Self { source, cache }
    }

    pub fn cache(&self) -> &Arc<ConfigCache<S::Config>> {
        &self.cache
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Resolve `record` to a config, loading it on a cache miss.
    ///
    /// Returns [`AwsError::Cancelled`] if `cancel` fires before the load
    /// completes; nothing is cached in that case. Errors from the
    /// collaborators are returned unchanged.
    pub async fn resolve(
        &self,
        cancel: &CancellationToken,
        record: &CredentialRecord,
    ) -> Result<S::Config, AwsError> {
        if cancel.is_cancelled() {
            return Err(AwsError::Cancelled);
        }

        let config_id = config_identifier(record);
        let key = derive_key(record);
        let (config_id, short_key) = (config_id.as_str(), key.short());

        self.cache
            .get_or_insert_with(&key, move || async move {
                debug!(config_id = %config_id, cache_key = %short_key, "creating new AWS config");
                let started = Instant::now();

                let result = tokio::select! {
                    biased;
                    _ = cancel.cancelled() => Err(AwsError::Cancelled),
                    result = self.load(record) => result,
                };

                let duration_ms = started.elapsed().as_millis() as u64;
                match &result {
                    Ok(_) => debug!(
                        config_id = %config_id,
                        cache_key = %short_key,
                        duration_ms,
                        "AWS config created successfully"
                    ),
                    Err(AwsError::Cancelled) => debug!(
                        config_id = %config_id,
                        cache_key = %short_key,
                        duration_ms,
                        "AWS config resolution cancelled"
                    ),
                    Err(e) => error!(
                        config_id = %config_id,
                        cache_key = %short_key,
                        duration_ms,
                        error = %e,
                        "failed to create AWS config"
                    ),
                }
                result
            })
            .await
    }

    async fn load(&self, record: &CredentialRecord) -> Result<S::Config, AwsError> {
        let creds = self.source.resolve_credentials(record)?;
        self.source.load_config(&creds).await
    }

    /// Resolve a config and run `op` with it.
    ///
    /// If `op` fails with an authentication error the cached config is
    /// invalidated so the next call resolves fresh credentials.
    pub async fn with_config<T, F, Fut>(
        &self,
        cancel: &CancellationToken,
        record: &CredentialRecord,
        op: F,
    ) -> Result<T, AwsError>
    where
        F: FnOnce(S::Config) -> Fut,
        Fut: Future<Output = Result<T, AwsError>>,
    {
        let config = self.resolve(cancel, record).await?;
        let result = op(config).await;
        if let Err(e) = &result {
            if e.is_auth_failure() {
                warn!(
                    config_id = %config_identifier(record),
                    error = %e,
                    "authentication failed with cached AWS config, invalidating"
                );
                self.invalidate(record);
            }
        }
        result
    }

    /// Drop the cached config for `record`. Returns whether one was cached.
    pub fn invalidate(&self, record: &CredentialRecord) -> bool {
        let key = derive_key(record);
        let removed = self.cache.remove(&key);
        if removed {
            debug!(config_id = %config_identifier(record), cache_key = %key.short(), "AWS config removed from cache");
        } else {
            debug!(config_id = %config_identifier(record), cache_key = %key.short(), "AWS config not found in cache");
        }
        removed
    }

    /// Custom endpoint configured on `record`, if it parses and has one.
    pub fn endpoint_for(&self, record: &CredentialRecord) -> Option<String> {
        let creds = self.source.resolve_credentials(record).ok()?;
        creds.has_custom_endpoint().then_some(creds.endpoint)
    }

    /// Stop the janitor and clear the cache. Safe to call repeatedly.
    pub fn shutdown(&self) {
        self.cache.stop_janitor();
        let count = self.cache.clear();
        info!(phase = "shutdown", config_count = count, "AWS config cache cleared");
    }

    /// Number of cached configs.
    pub fn size(&self) -> usize {
        self.cache.len()
    }
}
