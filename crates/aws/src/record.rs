//! Raw connection credentials as handed over by the surrounding layers.
//!
//! A [`CredentialRecord`] is never stored by the cache. It is used only to
//! derive a [`CacheKey`](crate::key::CacheKey) and to feed the credential
//! parser on a cache miss.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A free-form key/value option attached to a connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdvancedOption {
    pub key: String,
    pub value: String,
}

impl AdvancedOption {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Credentials for one database connection backed by AWS.
///
/// Field mapping from the connection form:
/// - `region` is the Hostname field
/// - `access_key_id` is the Username field
/// - `secret_access_key` is the Password field
/// - `session_token` is the access token field
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialRecord {
    pub region: String,
    pub access_key_id: String,
    pub secret_access_key: String,
    #[serde(default)]
    pub is_profile: bool,
    #[serde(default)]
    pub session_token: Option<String>,
    #[serde(default)]
    pub connection_id: Option<String>,
    /// Advanced options in the order the user supplied them.
    #[serde(default)]
    pub advanced: Vec<AdvancedOption>,
}

impl CredentialRecord {
    pub fn new(
        region: impl Into<String>,
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
    ) -> Self {
        Self {
            region: region.into(),
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
            ..Self::default()
        }
    }

    pub fn with_session_token(mut self, token: impl Into<String>) -> Self {
        self.session_token = Some(token.into());
        self
    }

    pub fn with_connection_id(mut self, id: impl Into<String>) -> Self {
        self.connection_id = Some(id.into());
        self
    }

    pub fn with_profile(mut self, is_profile: bool) -> Self {
        self.is_profile = is_profile;
        self
    }

    /// Append an advanced option. Order is significant for cache keys.
    pub fn with_advanced(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.advanced.push(AdvancedOption::new(key, value));
        self
    }

    /// Value of the first advanced option named `key` with a non-empty value.
    pub fn advanced_value(&self, key: &str) -> Option<&str> {
        self.advanced
            .iter()
            .find(|opt| opt.key == key && !opt.value.is_empty())
            .map(|opt| opt.value.as_str())
    }
}

// Secrets never reach logs through `{:?}`.
impl fmt::Debug for CredentialRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialRecord")
            .field("region", &self.region)
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"[REDACTED]")
            .field("is_profile", &self.is_profile)
            .field(
                "session_token",
                &self.session_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("connection_id", &self.connection_id)
            .field("advanced", &self.advanced)
            .finish()
    }
}
