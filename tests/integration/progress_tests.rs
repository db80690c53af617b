//! Progress reporting integration tests

use crate::common::{cursor_over, memory_database, seed_posts};
use rowsweep::{ContentFilter, ProgressSink, run_with_progress};
use std::sync::{Arc, Mutex};

/// 250 records, batch size 100, total 250: callbacks at 40%, 80%, 100%
#[tokio::test]
async fn test_progress_over_real_cursor() {
    let db = memory_database().await;
    seed_posts(&db, 250, "post", "publish").await;

    let cursor = cursor_over(&db);
    let total = cursor.count_content(&ContentFilter::new()).await.unwrap() as usize;
    assert_eq!(total, 250);

    let updates = Arc::new(Mutex::new(Vec::new()));
    let sink_updates = Arc::clone(&updates);
    let sink: ProgressSink = Box::new(move |pct, processed, total| {
        sink_updates.lock().unwrap().push((pct, processed, total));
    });

    let stream = cursor.content_ids(ContentFilter::new(), Some(100)).unwrap();
    let batch_sizes = run_with_progress(
        stream,
        |batch| async move { Ok(Some(batch.len())) },
        total,
        Some(sink),
    )
    .await
    .unwrap();

    assert_eq!(batch_sizes, vec![100, 100, 50]);
    assert_eq!(
        *updates.lock().unwrap(),
        vec![(40.0, 100, 250), (80.0, 200, 250), (100.0, 250, 250)]
    );
}

/// Processed counts increase strictly by the batch size, ending at the total
#[tokio::test]
async fn test_processed_is_monotonic() {
    let db = memory_database().await;
    seed_posts(&db, 73, "post", "publish").await;

    let cursor = cursor_over(&db);
    let processed_seen = Arc::new(Mutex::new(Vec::new()));
    let sink_seen = Arc::clone(&processed_seen);
    let sink: ProgressSink = Box::new(move |_, processed, _| {
        sink_seen.lock().unwrap().push(processed);
    });

    let stream = cursor.content_ids(ContentFilter::new(), Some(10)).unwrap();
    let _: Vec<()> = run_with_progress(
        stream,
        |_batch| async move { Ok(None) },
        73,
        Some(sink),
    )
    .await
    .unwrap();

    let seen = processed_seen.lock().unwrap();
    assert_eq!(*seen, vec![10, 20, 30, 40, 50, 60, 70, 73]);
}

/// No sink means no reporting, but results are still collected
#[tokio::test]
async fn test_results_without_sink() {
    let db = memory_database().await;
    seed_posts(&db, 30, "post", "publish").await;

    let cursor = cursor_over(&db);
    let stream = cursor.content_ids(ContentFilter::new(), Some(10)).unwrap();
    let firsts = run_with_progress(
        stream,
        |batch| async move { Ok(batch.first().copied()) },
        30,
        None,
    )
    .await
    .unwrap();

    assert_eq!(firsts, vec![1, 11, 21]);
}
