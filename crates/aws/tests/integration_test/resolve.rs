//! Cache hits, invalidation, error pass-through and capacity via the resolver.

use sdkcache_aws::credentials::ADVANCED_KEY_AUTH_METHOD;
use sdkcache_aws::{derive_key, AwsConfigResolver, AwsError, CredentialRecord, SdkConfigSource};
use sdkcache_core::CacheConfig;
use tokio_util::sync::CancellationToken;

use crate::support::*;

#[tokio::test]
async fn test_cache_hit_avoids_reload() {
    let resolver = resolver(StubSource::new());
    let cancel = CancellationToken::new();

    let c1 = resolver.resolve(&cancel, &record()).await.unwrap();
    assert_eq!(resolver.source().loads(), 1);

    let again = resolver.resolve(&cancel, &record()).await.unwrap();
    assert_eq!(again, c1);
    assert_eq!(resolver.source().loads(), 1);

    // Only the region changes: new key, new load.
    let east = record_in("us-east-1");
    assert_ne!(derive_key(&east), derive_key(&record()));
    let c2 = resolver.resolve(&cancel, &east).await.unwrap();
    assert_eq!(c2.region, "us-east-1");
    assert_eq!(resolver.source().loads(), 2);
    assert_eq!(resolver.size(), 2);

    resolver.shutdown();
}

#[tokio::test]
async fn test_invalidate_removes_exactly_one_entry() {
    let resolver = resolver(StubSource::new());
    let cancel = CancellationToken::new();

    resolver.resolve(&cancel, &record()).await.unwrap();
    resolver.resolve(&cancel, &record_in("eu-west-1")).await.unwrap();
    assert_eq!(resolver.size(), 2);

    assert!(resolver.invalidate(&record()));
    assert_eq!(resolver.size(), 1);

    // Unknown record: no error, nothing removed.
    assert!(!resolver.invalidate(&record_in("ap-south-1")));
    assert_eq!(resolver.size(), 1);

    let fresh = resolver.resolve(&cancel, &record()).await.unwrap();
    assert_eq!(fresh.generation, 3);
    assert_eq!(resolver.source().loads(), 3);
}

#[tokio::test]
async fn test_load_errors_pass_through_and_are_not_cached() {
    let resolver = resolver(StubSource::new().failing_first(1));
    let cancel = CancellationToken::new();

    let err = resolver.resolve(&cancel, &record()).await.unwrap_err();
    assert!(matches!(err, AwsError::ServiceUnavailable));
    assert!(err.is_retryable());
    assert!(!err.is_cancelled());
    assert_eq!(resolver.size(), 0);

    // No negative caching: the next call retries the full resolution.
    let cfg = resolver.resolve(&cancel, &record()).await.unwrap();
    assert_eq!(cfg.generation, 2);
    assert_eq!(resolver.size(), 1);
}

#[tokio::test]
async fn test_input_errors_pass_through() {
    let resolver = resolver(StubSource::new());
    let cancel = CancellationToken::new();

    let record = record().with_advanced(ADVANCED_KEY_AUTH_METHOD, "profile");
    let err = resolver.resolve(&cancel, &record).await.unwrap_err();

    assert!(matches!(err, AwsError::ProfileNameRequired));
    assert!(err.is_input_error());
    assert_eq!(resolver.source().loads(), 0);
    assert_eq!(resolver.size(), 0);
}

#[tokio::test]
async fn test_overflow_evicts_least_recently_used() {
    let config = CacheConfig {
        max_entries: 3,
        ..CacheConfig::default()
    };
    let resolver = resolver_with(StubSource::new(), config);
    let cancel = CancellationToken::new();

    let regions = ["us-east-1", "us-east-2", "us-west-1"];
    for region in regions {
        resolver.resolve(&cancel, &record_in(region)).await.unwrap();
    }
    // Touch the oldest so us-east-2 becomes least recently used.
    resolver.resolve(&cancel, &record_in("us-east-1")).await.unwrap();

    resolver.resolve(&cancel, &record_in("us-west-2")).await.unwrap();

    assert_eq!(resolver.size(), 3);
    let cache = resolver.cache();
    assert!(!cache.contains(&derive_key(&record_in("us-east-2"))));
    assert!(cache.contains(&derive_key(&record_in("us-east-1"))));
    assert!(cache.contains(&derive_key(&record_in("us-west-1"))));
    assert!(cache.contains(&derive_key(&record_in("us-west-2"))));
    assert_eq!(resolver.source().loads(), 4);
}

#[tokio::test]
async fn test_session_token_and_connection_id_split_entries() {
    let resolver = resolver(StubSource::new());
    let cancel = CancellationToken::new();

    let records: Vec<CredentialRecord> = vec![
        record(),
        record().with_session_token("token-1"),
        record().with_session_token("token-2"),
        record().with_connection_id("conn-1"),
    ];
    for r in &records {
        resolver.resolve(&cancel, r).await.unwrap();
    }

    assert_eq!(resolver.size(), records.len());
    assert_eq!(resolver.source().loads(), records.len());
}

#[tokio::test]
async fn test_sdk_source_caches_static_config() {
    let resolver = AwsConfigResolver::new(SdkConfigSource::new(), &CacheConfig::default()).unwrap();
    let cancel = CancellationToken::new();
    let record = record().with_advanced(ADVANCED_KEY_AUTH_METHOD, "static");

    let first = resolver.resolve(&cancel, &record).await.unwrap();
    let second = resolver.resolve(&cancel, &record).await.unwrap();

    assert_eq!(first.region().map(|r| r.to_string()).as_deref(), Some("us-west-2"));
    assert_eq!(second.region(), first.region());
    assert_eq!(resolver.size(), 1);

    resolver.shutdown();
    assert_eq!(resolver.size(), 0);
}
