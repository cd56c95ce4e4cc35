//! Cached AWS SDK configuration for database connections.
//!
//! Resolving an AWS credential chain can take several network round trips,
//! so [`ConfigResolver`] keeps resolved configs in a [`ConfigCache`] keyed by
//! a SHA-256 digest of the connection's credentials. Entries expire after an
//! idle TTL (background janitor) and the cache is bounded by an LRU limit.
//!
//! Credential mapping from a connection form:
//! - Hostname is the region (e.g. `us-west-2`)
//! - Username / Password are the access key id / secret key (static auth)
//! - the access token is the session token
//! - advanced options carry `Auth Method`, `Profile Name` and `Endpoint`

pub mod credentials;
pub mod error;
pub mod key;
pub mod loader;
pub mod record;
pub mod regions;
pub mod resolver;
pub mod store;

pub use credentials::{AuthMethod, AwsCredentialConfig};
pub use error::AwsError;
pub use key::{config_identifier, derive_key, CacheKey};
pub use loader::SdkConfigSource;
pub use record::{AdvancedOption, CredentialRecord};
pub use regions::{is_known_region, regions};
pub use resolver::{ConfigResolver, ConfigSource};
pub use store::ConfigCache;

/// Resolver wired to the real AWS SDK.
pub type AwsConfigResolver = ConfigResolver<SdkConfigSource>;
