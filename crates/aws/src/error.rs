//! AWS error taxonomy.
//!
//! Three families share one enum:
//! - input errors, raised while parsing a [`CredentialRecord`](crate::CredentialRecord)
//! - resolution errors, raised while loading or using an SDK config
//! - [`AwsError::Cancelled`], raised when the caller's token fires first
//!
//! The cache never wraps these; whatever the collaborator returned is what the
//! caller sees.

use std::error::Error as StdError;

use aws_credential_types::provider::error::CredentialsError;

#[derive(Debug, thiserror::Error)]
pub enum AwsError {
    // ── Input ────────────────────────────────────────────────────
    #[error("AWS region is required (set via Hostname field)")]
    RegionRequired,

    #[error("static auth requires access key (Username) and secret key (Password)")]
    StaticCredentialsRequired,

    #[error("profile auth requires a profile name (set via 'Profile Name' advanced option)")]
    ProfileNameRequired,

    #[error("invalid auth method '{0}': must be one of: static, profile, iam, env, default")]
    InvalidAuthMethod(String),

    // ── Resolution ───────────────────────────────────────────────
    #[error("access denied: check IAM permissions for this operation")]
    AccessDenied,

    #[error("invalid AWS credentials: check access key and secret key")]
    InvalidCredentials,

    #[error("AWS credentials have expired: refresh session token or re-authenticate")]
    ExpiredCredentials,

    #[error("resource not found: check the resource name and region")]
    ResourceNotFound,

    #[error("AWS service temporarily unavailable: try again later")]
    ServiceUnavailable,

    #[error("request throttled: too many requests, try again later")]
    Throttling,

    #[error("connection failed: check network connectivity and endpoint: {0}")]
    ConnectionFailed(String),

    #[error("invalid or inaccessible region: check the region name")]
    InvalidRegion,

    #[error("invalid AWS configuration: {0}")]
    InvalidConfiguration(String),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("AWS error [{code}]: {message}")]
    Service { code: String, message: String },

    #[error("credential provider error: {0}")]
    Provider(String),

    // ── Cancellation ─────────────────────────────────────────────
    #[error("AWS config resolution was cancelled")]
    Cancelled,
}

/// Message fragments that indicate a network-level failure.
const CONNECTION_PATTERNS: &[&str] = &[
    "connection refused",
    "no such host",
    "dial tcp",
    "dns error",
    "i/o timeout",
    "timed out",
    "network is unreachable",
    "connection reset",
    "EOF",
];

impl AwsError {
    /// Map an AWS API error code (e.g. `ThrottlingException`) to an error.
    ///
    /// Callers pull `code` and `message` off the service error's metadata.
    /// Unknown codes become [`AwsError::Service`] carrying both.
    pub fn from_error_code(code: &str, message: &str) -> Self {
        match code {
            "AccessDeniedException" | "AccessDenied" | "UnauthorizedAccess" => Self::AccessDenied,
            "InvalidSignatureException"
            | "SignatureDoesNotMatch"
            | "UnrecognizedClientException"
            | "InvalidClientTokenId"
            | "IncompleteSignature" => Self::InvalidCredentials,
            "ExpiredTokenException" | "ExpiredToken" | "TokenRefreshRequired" => {
                Self::ExpiredCredentials
            }

            "ResourceNotFoundException" | "TableNotFoundException" | "ItemNotFoundException" => {
                Self::ResourceNotFound
            }

            "ThrottlingException"
            | "Throttling"
            | "ProvisionedThroughputExceededException"
            | "RequestLimitExceeded"
            | "TooManyRequestsException" => Self::Throttling,

            "ServiceUnavailable" | "InternalServerError" | "InternalError" | "ServiceException" => {
                Self::ServiceUnavailable
            }

            "ValidationException" | "ValidationError" => Self::Validation(message.to_string()),
            "InvalidParameterValue" | "InvalidParameterException" => {
                Self::Validation(format!("invalid parameter: {message}"))
            }
            "MissingRequiredParameterException" => {
                Self::Validation(format!("missing required parameter: {message}"))
            }

            "InvalidRegion" | "RegionDisabledException" => Self::InvalidRegion,

            _ => Self::Service {
                code: code.to_string(),
                message: message.to_string(),
            },
        }
    }

    /// Map a credential-chain failure raised while loading a config.
    pub fn from_credentials_error(err: &CredentialsError) -> Self {
        let message = error_chain(err);
        match err {
            CredentialsError::CredentialsNotLoaded(_) => Self::InvalidCredentials,
            CredentialsError::ProviderTimedOut(_) => Self::ConnectionFailed(message),
            CredentialsError::InvalidConfiguration(_) => Self::InvalidConfiguration(message),
            _ => Self::from_message(message),
        }
    }

    /// Classify a free-form error message, falling back to [`AwsError::Provider`].
    pub fn from_message(message: String) -> Self {
        if message.contains("no credentials") || message.contains("NoCredentialProviders") {
            return Self::InvalidCredentials;
        }
        if message.contains("ExpiredToken") {
            return Self::ExpiredCredentials;
        }
        if is_connection_message(&message) {
            return Self::ConnectionFailed(message);
        }
        Self::Provider(message)
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Malformed or incomplete credential input; retrying will not help.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::RegionRequired
                | Self::StaticCredentialsRequired
                | Self::ProfileNameRequired
                | Self::InvalidAuthMethod(_)
        )
    }

    /// The resolved credentials were rejected; a cached config is stale.
    pub fn is_auth_failure(&self) -> bool {
        matches!(
            self,
            Self::AccessDenied | Self::InvalidCredentials | Self::ExpiredCredentials
        )
    }

    pub fn is_access_denied(&self) -> bool {
        matches!(self, Self::AccessDenied)
    }

    pub fn is_invalid_credentials(&self) -> bool {
        matches!(self, Self::InvalidCredentials)
    }

    pub fn is_resource_not_found(&self) -> bool {
        matches!(self, Self::ResourceNotFound)
    }

    pub fn is_throttling(&self) -> bool {
        matches!(self, Self::Throttling)
    }

    pub fn is_connection_error(&self) -> bool {
        match self {
            Self::ConnectionFailed(_) => true,
            Self::Provider(msg) | Self::Service { message: msg, .. } => is_connection_message(msg),
            _ => false,
        }
    }

    /// Throttling, service unavailability and connection errors are retryable.
    /// Cancellation is not: the caller chose to stop.
    pub fn is_retryable(&self) -> bool {
        self.is_throttling()
            || matches!(self, Self::ServiceUnavailable)
            || self.is_connection_error()
    }
}

fn is_connection_message(message: &str) -> bool {
    CONNECTION_PATTERNS
        .iter()
        .any(|pattern| message.contains(pattern))
}

/// Render an error and its sources as `outer: inner: root`.
fn error_chain(err: &dyn StdError) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}
