//! Bulk mutation executor integration tests

use crate::common::{
    count_rows, cursor_over, memory_database, noop_guard, seed_comments, seed_posts,
};
use futures::TryStreamExt;
use rowsweep::{
    BulkDeleter, CancelToken, CommentFilter, ConnectionAdapter, ContentFilter, SqlParam,
};

/// Force deletion removes the rows outright
#[tokio::test]
async fn test_force_delete_content() {
    let db = memory_database().await;
    seed_posts(&db, 5, "post", "publish").await;

    let executor = BulkDeleter::new(noop_guard());
    let outcome = executor
        .delete_content_in_batches(db.clone(), &[1, 2, 3, 4, 5], 2, true)
        .await
        .unwrap();

    assert_eq!(outcome.succeeded, vec![1, 2, 3, 4, 5]);
    assert!(outcome.failed.is_empty());
    assert_eq!(outcome.chunks_processed, 3);
    assert_eq!(count_rows(&db, "posts").await, 0);
}

/// Without force, rows move to trash status instead of being removed
#[tokio::test]
async fn test_soft_delete_moves_to_trash() {
    let db = memory_database().await;
    seed_posts(&db, 3, "post", "publish").await;

    let executor = BulkDeleter::new(noop_guard());
    let outcome = executor
        .delete_content_in_batches(db.clone(), &[1, 2, 3], 10, false)
        .await
        .unwrap();

    assert_eq!(outcome.succeeded, vec![1, 2, 3]);
    assert_eq!(count_rows(&db, "posts").await, 3);

    let trashed = db
        .fetch_scalar(
            "SELECT COUNT(*) FROM posts WHERE post_status = ?",
            &[SqlParam::from("trash")],
        )
        .await
        .unwrap();
    assert_eq!(trashed, Some(3));
}

/// Soft-deleting an already-trashed row is recorded as a failure
#[tokio::test]
async fn test_soft_delete_already_trashed_fails() {
    let db = memory_database().await;
    seed_posts(&db, 2, "post", "trash").await;

    let executor = BulkDeleter::new(noop_guard());
    let outcome = executor
        .delete_content_in_batches(db.clone(), &[1, 2], 10, false)
        .await
        .unwrap();

    assert!(outcome.succeeded.is_empty());
    assert_eq!(outcome.failed.len(), 2);
    assert_eq!(outcome.failed[0].reason, "no matching record");
}

/// Unknown identifiers are recorded as failures without stopping the run
#[tokio::test]
async fn test_missing_ids_do_not_abort() {
    let db = memory_database().await;
    seed_posts(&db, 3, "post", "publish").await;

    let executor = BulkDeleter::new(noop_guard());
    let outcome = executor
        .delete_content_in_batches(db.clone(), &[1, 999, 2, 998, 3], 2, true)
        .await
        .unwrap();

    assert_eq!(outcome.succeeded, vec![1, 2, 3]);
    let failed_ids: Vec<i64> = outcome.failed.iter().map(|f| f.id).collect();
    assert_eq!(failed_ids, vec![999, 998]);
    assert_eq!(outcome.chunks_processed, 3);
}

/// Comment deletion is always a hard delete
#[tokio::test]
async fn test_delete_comments() {
    let db = memory_database().await;
    seed_comments(&db, 4, "spam").await;

    let executor = BulkDeleter::new(noop_guard());
    let outcome = executor
        .delete_comments_in_batches(db.clone(), &[1, 2, 3, 4], 3)
        .await
        .unwrap();

    assert_eq!(outcome.succeeded, vec![1, 2, 3, 4]);
    assert_eq!(outcome.chunks_processed, 2);
    assert_eq!(count_rows(&db, "comments").await, 0);
}

/// Drain a cursor into the executor: the whole sweep end to end
#[tokio::test]
async fn test_cursor_drained_into_bulk_delete() {
    let db = memory_database().await;
    seed_posts(&db, 12, "post", "publish").await;
    seed_comments(&db, 25, "spam").await;
    seed_comments(&db, 5, "approved").await;

    let cursor = cursor_over(&db);
    let filter = CommentFilter::new().with_status("spam");
    let batches: Vec<Vec<i64>> = cursor
        .comment_ids(filter, Some(10))
        .unwrap()
        .try_collect()
        .await
        .unwrap();
    let ids: Vec<i64> = batches.into_iter().flatten().collect();
    assert_eq!(ids.len(), 25);

    let executor = BulkDeleter::new(noop_guard());
    let outcome = executor
        .delete_comments_in_batches(db.clone(), &ids, 10)
        .await
        .unwrap();

    assert_eq!(outcome.succeeded.len(), 25);
    assert!(outcome.is_clean());
    // Approved comments survive the sweep.
    assert_eq!(count_rows(&db, "comments").await, 5);
}

/// A cancelled executor returns the partial outcome and leaves the rest of
/// the rows untouched
#[tokio::test]
async fn test_cancelled_bulk_delete_is_partial() {
    let db = memory_database().await;
    seed_posts(&db, 10, "post", "publish").await;

    let cancel = CancelToken::new();
    cancel.cancel();
    let executor = BulkDeleter::new(noop_guard()).with_cancel_token(cancel);

    let outcome = executor
        .delete_content_in_batches(db.clone(), &[1, 2, 3], 2, true)
        .await
        .unwrap();

    assert!(outcome.cancelled);
    assert!(outcome.succeeded.is_empty());
    assert_eq!(count_rows(&db, "posts").await, 10);
}

/// Re-running a sweep after deletion finds nothing left to do
#[tokio::test]
async fn test_sweep_is_convergent() {
    let db = memory_database().await;
    seed_posts(&db, 8, "post", "trash").await;

    let cursor = cursor_over(&db);
    let filter = ContentFilter::new().with_status("trash");
    let batches: Vec<Vec<i64>> = cursor
        .content_ids(filter.clone(), Some(5))
        .unwrap()
        .try_collect()
        .await
        .unwrap();
    let ids: Vec<i64> = batches.into_iter().flatten().collect();

    let executor = BulkDeleter::new(noop_guard());
    let outcome = executor
        .delete_content_in_batches(db.clone(), &ids, 5, true)
        .await
        .unwrap();
    assert_eq!(outcome.succeeded.len(), 8);

    let remaining: Vec<Vec<i64>> = cursor
        .content_ids(filter, Some(5))
        .unwrap()
        .try_collect()
        .await
        .unwrap();
    assert!(remaining.is_empty());
}
