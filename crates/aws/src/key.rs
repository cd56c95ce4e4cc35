//! Cache key derivation.
//!
//! A [`CacheKey`] is the SHA-256 hex digest of the credential fields joined
//! with NUL bytes. Raw secrets are hashed, never kept, so the first few
//! characters of a key are safe to log.

use std::fmt;

use sha2::{Digest, Sha256};

use crate::credentials::ADVANCED_KEY_AUTH_METHOD;
use crate::record::CredentialRecord;

/// NUL never appears in a legitimate credential field.
const SEPARATOR: &str = "\0";

/// Namespace tag, first part of every key.
const NAMESPACE: &str = "aws";

/// Length of the key prefix used in log lines.
const SHORT_KEY_LEN: usize = 8;

/// Opaque, fixed-length cache key (64 lowercase hex chars).
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey(String);

impl CacheKey {
    /// Full hex digest.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First 8 characters, for logging.
    pub fn short(&self) -> &str {
        short_key(&self.0)
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CacheKey({}…)", self.short())
    }
}

impl AsRef<str> for CacheKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Derive the cache key for a credential record.
///
/// Part order: namespace, region, access key id, secret, profile flag,
/// session-token presence flag (+ token), connection-id presence flag (+ id),
/// then every advanced key and value in supplied order. The presence flags
/// keep a token-only record distinct from an id-only record with the same
/// string. Advanced option order is significant.
pub fn derive_key(record: &CredentialRecord) -> CacheKey {
    let mut parts: Vec<&str> = Vec::with_capacity(9 + record.advanced.len() * 2);
    parts.push(NAMESPACE);
    parts.push(&record.region);
    parts.push(&record.access_key_id);
    parts.push(&record.secret_access_key);
    parts.push(if record.is_profile { "true" } else { "false" });

    push_optional(&mut parts, record.session_token.as_deref());
    push_optional(&mut parts, record.connection_id.as_deref());

    for opt in &record.advanced {
        parts.push(&opt.key);
        parts.push(&opt.value);
    }

    let digest = Sha256::digest(parts.join(SEPARATOR).as_bytes());
    CacheKey(format!("{digest:x}"))
}

fn push_optional<'a>(parts: &mut Vec<&'a str>, value: Option<&'a str>) {
    match value {
        Some(v) => {
            parts.push("1");
            parts.push(v);
        }
        None => parts.push("0"),
    }
}

/// Truncate a key to its first 8 characters.
pub fn short_key(key: &str) -> &str {
    key.get(..SHORT_KEY_LEN).unwrap_or(key)
}

/// Short non-secret identifier for logs: `region:auth_method`.
pub fn config_identifier(record: &CredentialRecord) -> String {
    let auth_method = record
        .advanced_value(ADVANCED_KEY_AUTH_METHOD)
        .unwrap_or("default");
    format!("{}:{}", record.region, auth_method)
}
