//! Concurrent misses, parallel resolution and cancellation.

use std::sync::Arc;
use std::time::Duration;

use sdkcache_aws::{derive_key, AwsError};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::support::*;

const LOAD_DELAY: Duration = Duration::from_millis(200);

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_misses_store_one_entry() {
    const N: usize = 16;
    let resolver = Arc::new(resolver(StubSource::new().with_delay(Duration::from_millis(50))));

    let mut handles = Vec::with_capacity(N);
    for _ in 0..N {
        let resolver = resolver.clone();
        handles.push(tokio::spawn(async move {
            resolver.resolve(&CancellationToken::new(), &record()).await
        }));
    }

    let mut results = Vec::with_capacity(N);
    for handle in handles {
        results.push(handle.await.unwrap().unwrap());
    }

    let loads = resolver.source().loads();
    assert!((1..=N).contains(&loads), "loads = {loads}");
    assert_eq!(resolver.size(), 1);

    let stored = resolver.cache().get(&derive_key(&record())).unwrap();
    assert!(results.iter().all(|cfg| *cfg == stored));
}

#[tokio::test(start_paused = true)]
async fn test_same_key_racers_compute_but_store_once() {
    const N: usize = 8;
    let resolver = Arc::new(resolver(StubSource::new().with_delay(LOAD_DELAY)));

    let handles: Vec<_> = (0..N)
        .map(|_| {
            let resolver = resolver.clone();
            tokio::spawn(async move { resolver.resolve(&CancellationToken::new(), &record()).await })
        })
        .collect();

    let mut results = Vec::with_capacity(N);
    for handle in handles {
        results.push(handle.await.unwrap().unwrap());
    }

    // Every task missed before any load finished, so all of them computed.
    assert_eq!(resolver.source().loads(), N);
    assert_eq!(resolver.size(), 1);

    let first = &results[0];
    assert!(results.iter().all(|cfg| cfg == first));
}

#[tokio::test(start_paused = true)]
async fn test_different_keys_resolve_in_parallel() {
    let regions = ["us-east-1", "us-east-2", "us-west-1", "us-west-2", "eu-west-1", "eu-north-1"];
    let resolver = Arc::new(resolver(StubSource::new().with_delay(LOAD_DELAY)));
    let started = Instant::now();

    let handles: Vec<_> = regions
        .iter()
        .map(|region| {
            let resolver = resolver.clone();
            let record = record_in(region);
            tokio::spawn(async move { resolver.resolve(&CancellationToken::new(), &record).await })
        })
        .collect();

    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    // Serialized loads would take regions.len() * LOAD_DELAY.
    assert!(started.elapsed() < LOAD_DELAY * 2, "elapsed {:?}", started.elapsed());
    assert_eq!(resolver.size(), regions.len());
}

#[tokio::test(start_paused = true)]
async fn test_cancellation_does_not_poison_cache() {
    let resolver = Arc::new(resolver(StubSource::new().with_delay(Duration::from_secs(10))));
    let cancel = CancellationToken::new();

    let task = {
        let resolver = resolver.clone();
        let cancel = cancel.clone();
        tokio::spawn(async move { resolver.resolve(&cancel, &record()).await })
    };

    tokio::time::sleep(Duration::from_secs(1)).await;
    cancel.cancel();

    let err = task.await.unwrap().unwrap_err();
    assert!(matches!(err, AwsError::Cancelled));
    assert!(err.is_cancelled());
    assert!(!err.is_retryable());
    assert_eq!(resolver.size(), 0);
    assert_eq!(resolver.source().loads(), 1);

    // A fresh token resolves normally afterwards.
    let cfg = resolver
        .resolve(&CancellationToken::new(), &record())
        .await
        .unwrap();
    assert_eq!(cfg.generation, 2);
    assert_eq!(resolver.size(), 1);
}
