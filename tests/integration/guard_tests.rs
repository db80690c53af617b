//! Execution budget guard integration tests

use rowsweep::{
    BudgetExtension, BudgetHost, ExecutionBudgetGuard, MemoryCache, NoopBudgetHost, Result,
    SharedCache,
};
use async_trait::async_trait;
use tokio_test::assert_ok;
use serde_json::json;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Host that counts renewal requests and grants them
struct CountingHost {
    calls: AtomicUsize,
}

#[async_trait]
impl BudgetHost for CountingHost {
    async fn extend_budget(&self, _increment: Duration) -> Result<BudgetExtension> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(BudgetExtension::Extended)
    }
}

/// Repeated guard invocations never fail and only touch the host and cache
#[tokio::test]
async fn test_guard_is_idempotent() {
    let host = Arc::new(CountingHost {
        calls: AtomicUsize::new(0),
    });
    let cache = Arc::new(MemoryCache::new(8).unwrap());
    let guard = ExecutionBudgetGuard::new(host.clone(), cache.clone());

    for _ in 0..10 {
        let report = guard.breathe().await;
        assert!(report.budget_extended);
        assert!(report.cache_flushed);
    }

    assert_eq!(host.calls.load(Ordering::SeqCst), 10);
    assert_eq!(cache.stats().flushes, 10);
}

/// An unsupported host is a silent no-op, not an error
#[tokio::test]
async fn test_unsupported_host_is_silent() {
    let guard = ExecutionBudgetGuard::new(
        Arc::new(NoopBudgetHost),
        Arc::new(MemoryCache::new(8).unwrap()),
    );
    let report = guard.breathe().await;
    assert!(!report.budget_extended);
    assert!(report.cache_flushed);
}

/// Guard invocations empty the shared cache between chunks
#[tokio::test]
async fn test_guard_flushes_cache_contents() {
    let cache = Arc::new(MemoryCache::new(8).unwrap());
    cache.put("stale:aggregate", json!({"count": 100}));
    assert_eq!(cache.len(), 1);

    let guard = ExecutionBudgetGuard::new(Arc::new(NoopBudgetHost), cache.clone());
    guard.breathe().await;

    assert!(cache.is_empty());
    assert!(cache.get("stale:aggregate").is_none());
}

/// The cache trait object can be flushed directly too
#[tokio::test]
async fn test_shared_cache_trait_object() {
    let cache: Arc<dyn SharedCache> = Arc::new(MemoryCache::new(8).unwrap());
    tokio_test::assert_ok!(cache.flush_all().await);
}
