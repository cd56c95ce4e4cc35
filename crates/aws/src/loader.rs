//! Production [`ConfigSource`] backed by `aws-config`.

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_credential_types::provider::ProvideCredentials;
use aws_types::region::Region;
use aws_types::SdkConfig;
use sdkcache_core::CacheConfig;
use tracing::{debug, error};

use crate::credentials::AwsCredentialConfig;
use crate::error::AwsError;
use crate::resolver::ConfigSource;

/// Loads an [`SdkConfig`] for normalized credentials.
///
/// - `static` installs the access key pair (plus session token) directly
/// - `profile` selects the named shared-config profile
/// - `iam`, `env` and `default` defer to the SDK default chain
///
/// With `verify_credentials` on, the credential provider is resolved once
/// during loading so a broken chain fails here instead of on the first
/// service call, and never ends up in the cache.
#[derive(Debug, Clone)]
pub struct SdkConfigSource {
    verify_credentials: bool,
}

impl Default for SdkConfigSource {
    fn default() -> Self {
        Self {
            verify_credentials: true,
        }
    }
}

impl SdkConfigSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &CacheConfig) -> Self {
        Self {
            verify_credentials: config.verify_credentials,
        }
    }

    pub fn verify_credentials(mut self, verify: bool) -> Self {
        self.verify_credentials = verify;
        self
    }

    async fn verify(config: &SdkConfig) -> Result<(), AwsError> {
        let provider = config
            .credentials_provider()
            .ok_or(AwsError::InvalidCredentials)?;
        provider
            .provide_credentials()
            .await
            .map(|_| ())
            .map_err(|e| AwsError::from_credentials_error(&e))
    }
}

#[async_trait]
impl ConfigSource for SdkConfigSource {
    type Config = SdkConfig;

    async fn load_config(&self, creds: &AwsCredentialConfig) -> Result<SdkConfig, AwsError> {
        let mut loader =
            aws_config::defaults(BehaviorVersion::latest()).region(Region::new(creds.region.clone()));

        if let Some(static_creds) = creds.static_credentials() {
            loader = loader.credentials_provider(static_creds);
        }
        if creds.is_profile_auth() && !creds.profile_name.is_empty() {
            loader = loader.profile_name(&creds.profile_name);
        }
        if creds.has_custom_endpoint() {
            loader = loader.endpoint_url(&creds.endpoint);
        }

        let config = loader.load().await;

        if self.verify_credentials {
            if let Err(e) = Self::verify(&config).await {
                error!(
                    region = %creds.region,
                    auth_method = %creds.auth_method,
                    error = %e,
                    "failed to load AWS configuration"
                );
                return Err(e);
            }
        }

        // Never log key material, only its shape.
        debug!(
            region = %creds.region,
            auth_method = %creds.auth_method,
            has_endpoint = creds.has_custom_endpoint(),
            has_profile_name = !creds.profile_name.is_empty(),
            "AWS configuration loaded successfully"
        );

        Ok(config)
    }
}
