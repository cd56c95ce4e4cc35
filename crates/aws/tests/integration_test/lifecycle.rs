//! Janitor expiry and shutdown.

use std::time::Duration;

use sdkcache_core::CacheConfig;
use tokio_util::sync::CancellationToken;

use crate::support::*;

fn short_ttl() -> CacheConfig {
    CacheConfig {
        ttl_secs: 60,
        ..CacheConfig::default()
    }
}

#[tokio::test]
async fn test_shutdown_is_idempotent() {
    let resolver = resolver(StubSource::new());
    let cancel = CancellationToken::new();
    assert!(resolver.cache().janitor_running());

    resolver.resolve(&cancel, &record()).await.unwrap();
    resolver.resolve(&cancel, &record_in("eu-west-1")).await.unwrap();
    assert_eq!(resolver.size(), 2);

    resolver.shutdown();
    assert_eq!(resolver.size(), 0);
    assert!(!resolver.cache().janitor_running());

    resolver.shutdown();
    assert_eq!(resolver.size(), 0);
    assert!(!resolver.cache().janitor_running());

    // A stopped janitor stays stopped.
    assert!(!resolver.cache().start_janitor());
}

#[tokio::test(start_paused = true)]
async fn test_janitor_expires_idle_entries() {
    let resolver = resolver_with(StubSource::new(), short_ttl());
    let cancel = CancellationToken::new();
    assert_eq!(resolver.cache().scan_interval(), Duration::from_secs(12));

    resolver.resolve(&cancel, &record()).await.unwrap();
    assert_eq!(resolver.size(), 1);

    // First scan past the TTL lands at 72s.
    tokio::time::sleep(Duration::from_secs(75)).await;
    assert_eq!(resolver.size(), 0);

    let cfg = resolver.resolve(&cancel, &record()).await.unwrap();
    assert_eq!(cfg.generation, 2);
    assert_eq!(resolver.source().loads(), 2);

    resolver.shutdown();
}

#[tokio::test(start_paused = true)]
async fn test_recent_access_keeps_entry_alive() {
    let resolver = resolver_with(StubSource::new(), short_ttl());
    let cancel = CancellationToken::new();

    resolver.resolve(&cancel, &record()).await.unwrap();
    tokio::time::sleep(Duration::from_secs(50)).await;

    // A hit refreshes the idle clock.
    resolver.resolve(&cancel, &record()).await.unwrap();
    tokio::time::sleep(Duration::from_secs(30)).await;

    assert_eq!(resolver.size(), 1);
    assert_eq!(resolver.source().loads(), 1);

    resolver.shutdown();
}

#[tokio::test(start_paused = true)]
async fn test_stopped_janitor_leaves_entries_in_place() {
    let resolver = resolver_with(StubSource::new(), short_ttl());
    let cancel = CancellationToken::new();

    assert!(resolver.cache().stop_janitor());
    resolver.resolve(&cancel, &record()).await.unwrap();

    tokio::time::sleep(Duration::from_secs(120)).await;
    assert_eq!(resolver.size(), 1);

    // Manual sweeps still work without the janitor.
    assert_eq!(resolver.cache().evict_expired(), 1);
    assert_eq!(resolver.size(), 0);
}
