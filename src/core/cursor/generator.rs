//! Lazy batch streams over the record store

use super::filter::{CommentFilter, ContentFilter};
use crate::config::{DEFAULT_BATCH_SIZE, EngineConfig};
use crate::core::cancel::CancelToken;
use crate::core::guard::ExecutionBudgetGuard;
use crate::storage::adapter::{
    ConnectionAdapter, RecordId, SqlParam, TableRow, validate_identifier, validate_where_fragment,
};
use crate::utils::error::{Result, SweepError};
use async_stream::try_stream;
use futures::Stream;
use std::pin::Pin;
use std::sync::Arc;
use tracing::debug;

/// Content type used for attachment/media rows
const ATTACHMENT_TYPE: &str = "attachment";

/// A lazy sequence of identifier batches
pub type IdBatchStream = Pin<Box<dyn Stream<Item = Result<Vec<RecordId>>> + Send>>;

/// A lazy sequence of full-row batches (the all-columns variant)
pub type RowBatchStream = Pin<Box<dyn Stream<Item = Result<Vec<TableRow>>> + Send>>;

/// Produces lazy batch sequences over a filter
///
/// Each pull issues a self-contained `SELECT ... ORDER BY <id> ASC LIMIT
/// OFFSET` query; the offset advances by the batch size after every yield.
/// A short batch is still yielded and one more pull confirms termination.
/// The sequence terminates without yielding on the first empty pull.
///
/// After every yielded batch the [`ExecutionBudgetGuard`] runs, so consumers
/// on the read path get budget renewal and cache flushing for free.
pub struct CursorGenerator {
    adapter: Arc<dyn ConnectionAdapter>,
    guard: Arc<ExecutionBudgetGuard>,
    cancel: CancelToken,
    batch_size: usize,
}

impl CursorGenerator {
    /// Create a generator over the given adapter and guard
    ///
    /// The default batch size is 100; override it per call or via
    /// [`Self::with_config`].
    pub fn new(adapter: Arc<dyn ConnectionAdapter>, guard: Arc<ExecutionBudgetGuard>) -> Self {
        Self {
            adapter,
            guard,
            cancel: CancelToken::new(),
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    /// Adopt tuning from an [`EngineConfig`]
    pub fn with_config(mut self, config: &EngineConfig) -> Result<Self> {
        config.validate()?;
        self.batch_size = config.batch_size;
        Ok(self)
    }

    /// Thread a cancellation token through every stream this generator builds
    ///
    /// Cancellation ends a stream cleanly before its next pull; batches
    /// already yielded remain valid.
    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Batch size used when an entry point is called without an override
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Resolve a per-call batch size override against the configured default
    fn resolve_batch_size(&self, batch_size: Option<usize>) -> Result<usize> {
        match batch_size {
            Some(0) => Err(SweepError::Validation(
                "batch_size must be greater than 0".to_string(),
            )),
            Some(size) => Ok(size),
            None => Ok(self.batch_size),
        }
    }

    /// Identifier batches of content items matching `filter`
    pub fn content_ids(
        &self,
        filter: ContentFilter,
        batch_size: Option<usize>,
    ) -> Result<IdBatchStream> {
        let batch_size = self.resolve_batch_size(batch_size)?;
        let (where_clause, params) = filter.to_where();
        Ok(self.id_stream(
            self.adapter.tables().posts(),
            "id".to_string(),
            where_clause,
            params,
            batch_size,
        ))
    }

    /// Identifier batches of attachment/media items
    pub fn attachment_ids(&self, batch_size: Option<usize>) -> Result<IdBatchStream> {
        self.content_ids(ContentFilter::new().with_type(ATTACHMENT_TYPE), batch_size)
    }

    /// Identifier batches of discussion items matching `filter`
    pub fn comment_ids(
        &self,
        filter: CommentFilter,
        batch_size: Option<usize>,
    ) -> Result<IdBatchStream> {
        let batch_size = self.resolve_batch_size(batch_size)?;
        let (where_clause, params) = filter.to_where();
        Ok(self.id_stream(
            self.adapter.tables().comments(),
            "id".to_string(),
            where_clause,
            params,
            batch_size,
        ))
    }

    /// Identifier batches from an arbitrary table
    ///
    /// `where_fragment` is a raw SQL predicate under the caller's control;
    /// values inside it should be bound through `params`.
    pub fn table_ids(
        &self,
        table: &str,
        id_column: &str,
        where_fragment: Option<&str>,
        params: Vec<SqlParam>,
        batch_size: Option<usize>,
    ) -> Result<IdBatchStream> {
        let batch_size = self.resolve_batch_size(batch_size)?;
        validate_identifier(table)?;
        validate_identifier(id_column)?;
        if let Some(fragment) = where_fragment {
            validate_where_fragment(fragment)?;
        }
        Ok(self.id_stream(
            table.to_string(),
            id_column.to_string(),
            where_fragment.map(str::to_string),
            params,
            batch_size,
        ))
    }

    /// Full-row batches from an arbitrary table (the all-columns variant)
    ///
    /// Trades memory for convenience; prefer [`Self::table_ids`] and
    /// re-fetching rows per item where possible.
    pub fn table_rows(
        &self,
        table: &str,
        id_column: &str,
        where_fragment: Option<&str>,
        params: Vec<SqlParam>,
        batch_size: Option<usize>,
    ) -> Result<RowBatchStream> {
        let batch_size = self.resolve_batch_size(batch_size)?;
        validate_identifier(table)?;
        validate_identifier(id_column)?;
        if let Some(fragment) = where_fragment {
            validate_where_fragment(fragment)?;
        }

        let sql = build_select(table, id_column, where_fragment, Projection::AllColumns);
        let adapter = Arc::clone(&self.adapter);
        let guard = Arc::clone(&self.guard);
        let cancel = self.cancel.clone();

        Ok(Box::pin(try_stream! {
            let mut offset: usize = 0;
            loop {
                if cancel.is_cancelled() {
                    debug!("row cursor cancelled at offset {}", offset);
                    break;
                }
                let mut page_params = params.clone();
                page_params.push(SqlParam::Int(batch_size as i64));
                page_params.push(SqlParam::Int(offset as i64));
                let rows = adapter.fetch_rows(&sql, &page_params).await?;
                if rows.is_empty() {
                    break;
                }
                debug!("yielding {} rows at offset {}", rows.len(), offset);
                yield rows;
                offset += batch_size;
                guard.breathe().await;
            }
        }))
    }

    /// Count of content items matching `filter` (for progress totals)
    pub async fn count_content(&self, filter: &ContentFilter) -> Result<u64> {
        let (where_clause, params) = filter.to_where();
        self.count(
            &self.adapter.tables().posts(),
            where_clause.as_deref(),
            params,
        )
        .await
    }

    /// Count of discussion items matching `filter`
    pub async fn count_comments(&self, filter: &CommentFilter) -> Result<u64> {
        let (where_clause, params) = filter.to_where();
        self.count(
            &self.adapter.tables().comments(),
            where_clause.as_deref(),
            params,
        )
        .await
    }

    /// Count of rows in an arbitrary table matching a raw WHERE fragment
    pub async fn count_table(
        &self,
        table: &str,
        where_fragment: Option<&str>,
        params: Vec<SqlParam>,
    ) -> Result<u64> {
        validate_identifier(table)?;
        if let Some(fragment) = where_fragment {
            validate_where_fragment(fragment)?;
        }
        self.count(table, where_fragment, params).await
    }

    async fn count(
        &self,
        table: &str,
        where_clause: Option<&str>,
        params: Vec<SqlParam>,
    ) -> Result<u64> {
        let sql = match where_clause {
            Some(clause) => format!("SELECT COUNT(*) FROM {table} WHERE {clause}"),
            None => format!("SELECT COUNT(*) FROM {table}"),
        };
        let count = self.adapter.fetch_scalar(&sql, &params).await?;
        Ok(count.unwrap_or(0).max(0) as u64)
    }

    fn id_stream(
        &self,
        table: String,
        id_column: String,
        where_clause: Option<String>,
        params: Vec<SqlParam>,
        batch_size: usize,
    ) -> IdBatchStream {
        let sql = build_select(
            &table,
            &id_column,
            where_clause.as_deref(),
            Projection::IdOnly,
        );
        let adapter = Arc::clone(&self.adapter);
        let guard = Arc::clone(&self.guard);
        let cancel = self.cancel.clone();

        Box::pin(try_stream! {
            let mut offset: usize = 0;
            loop {
                if cancel.is_cancelled() {
                    debug!("id cursor over {} cancelled at offset {}", table, offset);
                    break;
                }
                let mut page_params = params.clone();
                page_params.push(SqlParam::Int(batch_size as i64));
                page_params.push(SqlParam::Int(offset as i64));
                let ids = adapter.fetch_id_column(&sql, &page_params).await?;
                if ids.is_empty() {
                    break;
                }
                debug!("yielding {} ids from {} at offset {}", ids.len(), table, offset);
                yield ids;
                // Offset advances by batch size, not by row count; rows
                // already returned are never re-matched in ascending order.
                offset += batch_size;
                guard.breathe().await;
            }
        })
    }
}

enum Projection {
    IdOnly,
    AllColumns,
}

fn build_select(
    table: &str,
    id_column: &str,
    where_clause: Option<&str>,
    projection: Projection,
) -> String {
    let columns = match projection {
        Projection::IdOnly => id_column,
        Projection::AllColumns => "*",
    };
    match where_clause {
        Some(clause) => format!(
            "SELECT {columns} FROM {table} WHERE {clause} ORDER BY {id_column} ASC LIMIT ? OFFSET ?"
        ),
        None => format!(
            "SELECT {columns} FROM {table} ORDER BY {id_column} ASC LIMIT ? OFFSET ?"
        ),
    }
}
