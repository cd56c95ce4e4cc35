//! Parsing and validation of connection credentials into an AWS auth setup.

use std::fmt;
use std::str::FromStr;

use aws_credential_types::Credentials;
use serde::{Deserialize, Serialize};

use crate::error::AwsError;
use crate::record::CredentialRecord;

/// Advanced option selecting the [`AuthMethod`].
pub const ADVANCED_KEY_AUTH_METHOD: &str = "Auth Method";

/// Advanced option naming the shared-config profile for profile auth.
pub const ADVANCED_KEY_PROFILE_NAME: &str = "Profile Name";

/// Advanced option with a custom endpoint (LocalStack, MinIO, ...).
pub const ADVANCED_KEY_ENDPOINT: &str = "Endpoint";

/// Provider name reported by static credentials.
const STATIC_PROVIDER_NAME: &str = "sdkcache-static";

/// How the SDK should obtain credentials.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthMethod {
    /// Explicit access key + secret key.
    Static,
    /// Named profile from the shared config files.
    Profile,
    /// Instance / task role.
    Iam,
    /// `AWS_ACCESS_KEY_ID` / `AWS_SECRET_ACCESS_KEY`.
    Env,
    /// The SDK default chain.
    #[default]
    Default,
}

impl AuthMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Static => "static",
            Self::Profile => "profile",
            Self::Iam => "iam",
            Self::Env => "env",
            Self::Default => "default",
        }
    }
}

impl fmt::Display for AuthMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AuthMethod {
    type Err = AwsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "static" => Ok(Self::Static),
            "profile" => Ok(Self::Profile),
            "iam" => Ok(Self::Iam),
            "env" => Ok(Self::Env),
            "default" => Ok(Self::Default),
            other => Err(AwsError::InvalidAuthMethod(other.to_string())),
        }
    }
}

/// Normalized AWS settings extracted from a [`CredentialRecord`].
#[derive(Clone, PartialEq, Eq)]
pub struct AwsCredentialConfig {
    pub region: String,
    pub auth_method: AuthMethod,
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: String,
    pub profile_name: String,
    pub endpoint: String,
}

impl AwsCredentialConfig {
    /// Parse and validate a record.
    ///
    /// Whitespace around region, keys and token is trimmed. The auth method
    /// defaults to [`AuthMethod::Default`] and is case-insensitive.
    pub fn from_record(record: &CredentialRecord) -> Result<Self, AwsError> {
        let auth_method = match record.advanced_value(ADVANCED_KEY_AUTH_METHOD) {
            Some(raw) if !raw.trim().is_empty() => raw.parse()?,
            _ => AuthMethod::Default,
        };

        let config = Self {
            region: record.region.trim().to_string(),
            auth_method,
            access_key_id: record.access_key_id.trim().to_string(),
            secret_access_key: record.secret_access_key.trim().to_string(),
            session_token: record
                .session_token
                .as_deref()
                .map(str::trim)
                .unwrap_or_default()
                .to_string(),
            profile_name: record
                .advanced_value(ADVANCED_KEY_PROFILE_NAME)
                .unwrap_or_default()
                .to_string(),
            endpoint: record
                .advanced_value(ADVANCED_KEY_ENDPOINT)
                .unwrap_or_default()
                .to_string(),
        };

        config.validate()?;
        Ok(config)
    }

    /// Check that the fields required by the auth method are present.
    pub fn validate(&self) -> Result<(), AwsError> {
        if self.region.is_empty() {
            return Err(AwsError::RegionRequired);
        }

        match self.auth_method {
            AuthMethod::Static => {
                if self.access_key_id.is_empty() || self.secret_access_key.is_empty() {
                    return Err(AwsError::StaticCredentialsRequired);
                }
            }
            AuthMethod::Profile => {
                if self.profile_name.is_empty() {
                    return Err(AwsError::ProfileNameRequired);
                }
            }
            AuthMethod::Iam | AuthMethod::Env | AuthMethod::Default => {}
        }

        Ok(())
    }

    /// Static credentials for [`AuthMethod::Static`]; `None` for every method
    /// that defers to the SDK's own provider chain.
    pub fn static_credentials(&self) -> Option<Credentials> {
        if !self.is_static_auth() {
            return None;
        }
        let token = (!self.session_token.is_empty()).then(|| self.session_token.clone());
        Some(Credentials::new(
            &self.access_key_id,
            &self.secret_access_key,
            token,
            None,
            STATIC_PROVIDER_NAME,
        ))
    }

    pub fn has_custom_endpoint(&self) -> bool {
        !self.endpoint.is_empty()
    }

    pub fn is_static_auth(&self) -> bool {
        self.auth_method == AuthMethod::Static
    }

    pub fn is_profile_auth(&self) -> bool {
        self.auth_method == AuthMethod::Profile
    }
}

impl fmt::Debug for AwsCredentialConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AwsCredentialConfig")
            .field("region", &self.region)
            .field("auth_method", &self.auth_method)
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"[REDACTED]")
            .field("has_session_token", &!self.session_token.is_empty())
            .field("profile_name", &self.profile_name)
            .field("endpoint", &self.endpoint)
            .finish()
    }
}
