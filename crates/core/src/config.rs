use std::env;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Default idle time before a cached SDK config is dropped (10 minutes).
pub const DEFAULT_TTL_SECS: u64 = 600;

/// Default upper bound on cached SDK configs.
pub const DEFAULT_MAX_ENTRIES: usize = 100;

/// Smallest TTL accepted; the janitor scans every TTL/5.
pub const MIN_TTL_SECS: u64 = 5;

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

/// Read a profiled env var: tries {PROFILE}_{KEY} first, falls back to {KEY}.
fn profiled_env_opt(profile: &str, key: &str) -> Option<String> {
    if !profile.is_empty() {
        let prefixed = format!("{}_{}", profile, key);
        if let Some(v) = env_opt(&prefixed) {
            return Some(v);
        }
    }
    env_opt(key)
}

fn profiled_env_u64(profile: &str, key: &str, default: u64) -> u64 {
    profiled_env_opt(profile, key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn profiled_env_usize(profile: &str, key: &str, default: usize) -> usize {
    profiled_env_opt(profile, key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn profiled_env_bool(profile: &str, key: &str, default: bool) -> bool {
    match profiled_env_opt(profile, key) {
        Some(v) => matches!(v.as_str(), "true" | "1"),
        None => default,
    }
}

// ── Top-level config ──────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Active profile name (empty = default).
    pub profile: String,
    pub cache: CacheConfig,
}

impl Config {
    /// Build config from environment variables (call `load_dotenv()` first).
    /// Profile is read from `SDKCACHE_PROFILE`. When set (e.g. `PROD`), every
    /// key is first looked up as `{PROFILE}_{KEY}`, falling back to `{KEY}`.
    pub fn from_env() -> Self {
        let profile = env_or("SDKCACHE_PROFILE", "").to_uppercase();
        Self::for_profile(&profile)
    }

    /// Build config for a specific named profile (empty string = default).
    pub fn for_profile(profile: &str) -> Self {
        let p = profile.to_uppercase();
        Self {
            cache: CacheConfig::from_env_profiled(&p),
            profile: p,
        }
    }

    pub fn profile_label(&self) -> &str {
        if self.profile.is_empty() { "default" } else { &self.profile }
    }

    /// Print a summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Config loaded (profile: {}):", self.profile_label());
        self.cache.log_summary();
    }
}

// ── AWS config cache ──────────────────────────────────────────

/// Knobs for the AWS SDK config cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Idle time in seconds after which an entry is evicted.
    pub ttl_secs: u64,
    /// Maximum number of cached configs.
    pub max_entries: usize,
    /// Resolve the credential chain eagerly when loading a config.
    pub verify_credentials: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: DEFAULT_TTL_SECS,
            max_entries: DEFAULT_MAX_ENTRIES,
            verify_credentials: true,
        }
    }
}

impl CacheConfig {
    /// Build for a specific named profile.
    ///
    /// Unparseable numbers fall back to the defaults.
    pub fn from_env_profiled(profile: &str) -> Self {
        Self {
            ttl_secs: profiled_env_u64(profile, "AWS_CONFIG_CACHE_TTL_SECS", DEFAULT_TTL_SECS),
            max_entries: profiled_env_usize(
                profile,
                "AWS_CONFIG_CACHE_MAX_ENTRIES",
                DEFAULT_MAX_ENTRIES,
            ),
            verify_credentials: profiled_env_bool(
                profile,
                "AWS_CONFIG_CACHE_VERIFY_CREDENTIALS",
                true,
            ),
        }
    }

    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }

    /// How often the janitor scans: a fifth of the TTL.
    pub fn scan_interval(&self) -> Duration {
        self.ttl() / 5
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ttl_secs < MIN_TTL_SECS {
            return Err(ConfigError::InvalidValue {
                key: "AWS_CONFIG_CACHE_TTL_SECS",
                reason: format!("must be at least {MIN_TTL_SECS} seconds, got {}", self.ttl_secs),
            });
        }
        if self.max_entries == 0 {
            return Err(ConfigError::InvalidValue {
                key: "AWS_CONFIG_CACHE_MAX_ENTRIES",
                reason: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }

    pub fn log_summary(&self) {
        tracing::info!(
            "  aws cache:   ttl={}s, scan_every={}s, max_entries={}, verify_credentials={}",
            self.ttl_secs,
            self.scan_interval().as_secs(),
            self.max_entries,
            self.verify_credentials
        );
    }
}
