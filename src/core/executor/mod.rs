//! Bulk mutation executor
//!
//! Consumes a flat identifier list, partitions it into contiguous chunks, and
//! performs the destructive operation per item. Best-effort bulk semantics:
//! one item's failure never prevents the rest of its chunk or subsequent
//! chunks from being attempted. The execution budget guard runs once per
//! chunk, not per identifier.

mod types;


pub use types::{DeleteDisposition, FailedMutation, MutationOutcome};

use crate::core::cancel::CancelToken;
use crate::core::guard::ExecutionBudgetGuard;
use crate::storage::adapter::{ConnectionAdapter, RecordId, SqlParam};
use crate::utils::error::{Result, SweepError};
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tracing::{info, warn};

/// Status value for soft-deleted content
const TRASH_STATUS: &str = "trash";

/// A destructive per-item operation
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ItemDeleter: Send + Sync {
    /// Delete one record
    async fn delete(&self, id: RecordId) -> Result<DeleteDisposition>;

    /// Target-kind label used in logs
    fn target(&self) -> &str;
}

/// Deletes content items
///
/// With `force` the row is removed outright; without it the row is moved to
/// trash status (already-trashed rows count as `Missing`).
pub struct ContentDeleter {
    adapter: Arc<dyn ConnectionAdapter>,
    force: bool,
}

impl ContentDeleter {
    pub fn new(adapter: Arc<dyn ConnectionAdapter>, force: bool) -> Self {
        Self { adapter, force }
    }
}

#[async_trait]
impl ItemDeleter for ContentDeleter {
    async fn delete(&self, id: RecordId) -> Result<DeleteDisposition> {
        let posts = self.adapter.tables().posts();
        let affected = if self.force {
            let sql = format!("DELETE FROM {posts} WHERE id = ?");
            self.adapter.execute(&sql, &[SqlParam::Int(id)]).await?
        } else {
            let sql =
                format!("UPDATE {posts} SET post_status = ? WHERE id = ? AND post_status <> ?");
            self.adapter
                .execute(
                    &sql,
                    &[
                        SqlParam::Text(TRASH_STATUS.to_string()),
                        SqlParam::Int(id),
                        SqlParam::Text(TRASH_STATUS.to_string()),
                    ],
                )
                .await?
        };
        if affected > 0 {
            Ok(DeleteDisposition::Deleted)
        } else {
            Ok(DeleteDisposition::Missing)
        }
    }

    fn target(&self) -> &str {
        "content"
    }
}

/// Deletes discussion items (always a hard delete)
pub struct CommentDeleter {
    adapter: Arc<dyn ConnectionAdapter>,
}

impl CommentDeleter {
    pub fn new(adapter: Arc<dyn ConnectionAdapter>) -> Self {
        Self { adapter }
    }
}

#[async_trait]
impl ItemDeleter for CommentDeleter {
    async fn delete(&self, id: RecordId) -> Result<DeleteDisposition> {
        let comments = self.adapter.tables().comments();
        let sql = format!("DELETE FROM {comments} WHERE id = ?");
        let affected = self.adapter.execute(&sql, &[SqlParam::Int(id)]).await?;
        if affected > 0 {
            Ok(DeleteDisposition::Deleted)
        } else {
            Ok(DeleteDisposition::Missing)
        }
    }

    fn target(&self) -> &str {
        "comment"
    }
}

/// Chunked, guard-paced bulk deletion
pub struct BulkDeleter {
    guard: Arc<ExecutionBudgetGuard>,
    cancel: CancelToken,
}

impl BulkDeleter {
    /// Create an executor paced by `guard`
    pub fn new(guard: Arc<ExecutionBudgetGuard>) -> Self {
        Self {
            guard,
            cancel: CancelToken::new(),
        }
    }

    /// Thread a cancellation token through this executor
    ///
    /// Cancellation is observed between chunks; a cancelled run returns the
    /// partial outcome with `cancelled` set rather than an error.
    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Delete `ids` in chunks of at most `chunk_size`
    ///
    /// Within a chunk, identifiers are attempted in input order; a failed
    /// item is recorded and processing continues. An empty list returns an
    /// empty outcome without invoking the guard. The guard runs exactly once
    /// per processed chunk.
    pub async fn delete_in_batches<D>(
        &self,
        deleter: &D,
        ids: &[RecordId],
        chunk_size: usize,
    ) -> Result<MutationOutcome>
    where
        D: ItemDeleter + ?Sized,
    {
        if chunk_size == 0 {
            return Err(SweepError::Validation(
                "chunk_size must be greater than 0".to_string(),
            ));
        }

        let mut outcome = MutationOutcome::begin();
        if ids.is_empty() {
            outcome.completed_at = Utc::now();
            return Ok(outcome);
        }

        for chunk in ids.chunks(chunk_size) {
            if self.cancel.is_cancelled() {
                outcome.cancelled = true;
                info!(
                    "{} bulk delete cancelled after {} chunks",
                    deleter.target(),
                    outcome.chunks_processed
                );
                break;
            }

            for &id in chunk {
                match deleter.delete(id).await {
                    Ok(DeleteDisposition::Deleted) => outcome.succeeded.push(id),
                    Ok(DeleteDisposition::Missing) => {
                        outcome.failed.push(FailedMutation {
                            id,
                            reason: "no matching record".to_string(),
                        });
                    }
                    Err(e) => {
                        warn!("failed to delete {} {}: {}", deleter.target(), id, e);
                        outcome.failed.push(FailedMutation {
                            id,
                            reason: e.to_string(),
                        });
                    }
                }
            }

            outcome.chunks_processed += 1;
            self.guard.breathe().await;
        }

        outcome.completed_at = Utc::now();
        info!(
            "{} bulk delete finished: {} succeeded, {} failed, {} chunks",
            deleter.target(),
            outcome.succeeded.len(),
            outcome.failed.len(),
            outcome.chunks_processed
        );
        Ok(outcome)
    }

    /// Delete content items in chunks
    pub async fn delete_content_in_batches(
        &self,
        adapter: Arc<dyn ConnectionAdapter>,
        ids: &[RecordId],
        chunk_size: usize,
        force: bool,
    ) -> Result<MutationOutcome> {
        let deleter = ContentDeleter::new(adapter, force);
        self.delete_in_batches(&deleter, ids, chunk_size).await
    }

    /// Delete discussion items in chunks
    pub async fn delete_comments_in_batches(
        &self,
        adapter: Arc<dyn ConnectionAdapter>,
        ids: &[RecordId],
        chunk_size: usize,
    ) -> Result<MutationOutcome> {
        let deleter = CommentDeleter::new(adapter);
        self.delete_in_batches(&deleter, ids, chunk_size).await
    }
}
