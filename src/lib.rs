//! # rowsweep
//!
//! Bounded-memory batch iteration and chunked bulk mutation over relational
//! stores.
//!
//! ## Features
//!
//! - **Bounded memory**: cursors pull fixed-size batches of identifiers via
//!   offset/limit pagination; only one batch is in flight at a time
//! - **Budget renewal**: an execution budget guard renews the host's
//!   wall-clock allowance and flushes the shared cache after every batch and
//!   chunk, so 100k+ row sweeps survive request-scoped runtimes
//! - **Best-effort bulk deletion**: per-item failures are recorded, never
//!   fatal; chunks are independent
//! - **Progress reporting**: opt-in percentage/processed/total callbacks
//! - **Explicit wiring**: the connection adapter is injected at construction
//!   time; there is no ambient global connection
//! - **SQLite and PostgreSQL** backends behind cargo features
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use futures::TryStreamExt;
//! use rowsweep::{
//!     BulkDeleter, ContentDeleter, ContentFilter, CursorGenerator, Database,
//!     DatabaseConfig, ExecutionBudgetGuard, MemoryCache, NoopBudgetHost,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Arc::new(Database::new(&DatabaseConfig::default()).await?);
//!     let guard = Arc::new(ExecutionBudgetGuard::new(
//!         Arc::new(NoopBudgetHost),
//!         Arc::new(MemoryCache::new(1024)?),
//!     ));
//!
//!     // Drain a cursor over trashed content, one batch of 100 ids at a
//!     // time (the default batch size; pass `Some(n)` to override).
//!     let cursor = CursorGenerator::new(db.clone(), guard.clone());
//!     let filter = ContentFilter::new().with_status("trash");
//!     let batches: Vec<Vec<i64>> = cursor.content_ids(filter, None)?.try_collect().await?;
//!     let ids: Vec<i64> = batches.into_iter().flatten().collect();
//!
//!     // Hard-delete them in chunks of 100.
//!     let deleter = ContentDeleter::new(db, true);
//!     let outcome = BulkDeleter::new(guard)
//!         .delete_in_batches(&deleter, &ids, 100)
//!         .await?;
//!     println!(
//!         "deleted {}, failed {}",
//!         outcome.succeeded.len(),
//!         outcome.failed.len()
//!     );
//!     Ok(())
//! }
//! ```

#![warn(clippy::all)]

pub mod config;
pub mod core;
pub mod storage;
pub mod utils;

// Re-export main types
pub use config::{DatabaseConfig, EngineConfig};
pub use utils::error::{Result, SweepError};

pub use core::cancel::CancelToken;
pub use core::cursor::{
    CommentFilter, ContentFilter, CursorGenerator, IdBatchStream, RowBatchStream,
};
pub use core::executor::{
    BulkDeleter, CommentDeleter, ContentDeleter, DeleteDisposition, FailedMutation, ItemDeleter,
    MutationOutcome,
};
pub use core::guard::{
    BudgetExtension, BudgetHost, CacheStats, ExecutionBudgetGuard, GuardReport, MemoryCache,
    NoopBudgetHost, SharedCache,
};
pub use core::progress::{ProgressSink, run_with_progress};
pub use storage::adapter::{ConnectionAdapter, RecordId, SqlParam, TableNames, TableRow};
pub use storage::database::Database;

/// Current version of the crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
/// Name of the crate
pub const NAME: &str = env!("CARGO_PKG_NAME");
