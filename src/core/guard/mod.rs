//! Execution budget guard
//!
//! Datasets processed by the cursor and the bulk executor are far larger than
//! a single request/process execution budget, so every unit of work renews
//! its own survival budget and flushes the shared cache to keep peak memory
//! bounded. Both actions are hygiene, not correctness: failures are logged
//! and swallowed, which [`ExecutionBudgetGuard::breathe`] makes visible by
//! returning a report instead of a `Result`.

mod memory_cache;

pub use memory_cache::{CacheStats, MemoryCache};

use crate::config::DEFAULT_BUDGET_INCREMENT_SECS;
use crate::utils::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Outcome of a budget renewal request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BudgetExtension {
    /// The host extended the remaining wall-clock allowance
    Extended,
    /// The host does not support budget extension; a silent no-op
    Unsupported,
}

/// The calling runtime's execution-time ceiling
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BudgetHost: Send + Sync {
    /// Request that the remaining execution allowance grow by `increment`
    async fn extend_budget(&self, increment: Duration) -> Result<BudgetExtension>;
}

/// A process- or host-wide cache that may hold stale aggregates after bulk
/// mutation
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SharedCache: Send + Sync {
    /// Invalidate the whole cache
    ///
    /// Invalidation is deliberately coarse; scoped invalidation is a known
    /// limitation of the engine, not a requirement.
    async fn flush_all(&self) -> Result<()>;
}

/// Budget host for environments without an execution ceiling
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopBudgetHost;

#[async_trait]
impl BudgetHost for NoopBudgetHost {
    async fn extend_budget(&self, _increment: Duration) -> Result<BudgetExtension> {
        Ok(BudgetExtension::Unsupported)
    }
}

/// What a single guard invocation actually accomplished
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuardReport {
    /// Whether the host granted a budget extension
    pub budget_extended: bool,
    /// Whether the shared cache flush succeeded
    pub cache_flushed: bool,
}

/// Renews the execution budget and flushes the shared cache after each unit
/// of work
pub struct ExecutionBudgetGuard {
    host: Arc<dyn BudgetHost>,
    cache: Arc<dyn SharedCache>,
    increment: Duration,
}

impl ExecutionBudgetGuard {
    /// Create a guard with the default 30-second renewal increment
    pub fn new(host: Arc<dyn BudgetHost>, cache: Arc<dyn SharedCache>) -> Self {
        Self {
            host,
            cache,
            increment: Duration::from_secs(DEFAULT_BUDGET_INCREMENT_SECS),
        }
    }

    /// Override the renewal increment
    pub fn with_increment(mut self, increment: Duration) -> Self {
        self.increment = increment;
        self
    }

    /// Renew the execution budget and flush the shared cache
    ///
    /// Never fails: host and cache errors are logged at debug level and
    /// reported as `false` in the returned [`GuardReport`]. Safe to call any
    /// number of times.
    pub async fn breathe(&self) -> GuardReport {
        let budget_extended = match self.host.extend_budget(self.increment).await {
            Ok(BudgetExtension::Extended) => true,
            Ok(BudgetExtension::Unsupported) => false,
            Err(e) => {
                debug!("budget renewal failed (ignored): {}", e);
                false
            }
        };

        let cache_flushed = match self.cache.flush_all().await {
            Ok(()) => true,
            Err(e) => {
                debug!("cache flush failed (ignored): {}", e);
                false
            }
        };

        GuardReport {
            budget_extended,
            cache_flushed,
        }
    }
}
