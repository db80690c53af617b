//! Progress reporting over a batch sequence
//!
//! Drains a batch stream sequentially, hands each batch to a caller
//! callback, and reports percentage/processed/total to an optional sink.
//! Progress is opt-in: a zero total or an absent sink disables reporting.

use crate::utils::error::Result;
use futures::{Stream, StreamExt, pin_mut};

/// Progress callback: `(percentage, processed, total)`
///
/// The percentage is `processed / total * 100.0`, unclamped; callers passing
/// an inaccurate total may see values outside `[0, 100]`.
pub type ProgressSink = Box<dyn FnMut(f64, usize, usize) + Send>;

/// Drain `stream`, processing each batch and reporting progress
///
/// `per_batch` runs once per batch; non-`None` return values are collected
/// into the result list in batch order. Processing is strictly sequential:
/// one batch is in flight at a time, and the result order always matches the
/// ascending-identifier batch order.
///
/// A fatal error from the stream or from `per_batch` propagates immediately;
/// effects of batches already processed stand (no rollback).
pub async fn run_with_progress<S, I, F, Fut, T>(
    stream: S,
    mut per_batch: F,
    total: usize,
    mut progress: Option<ProgressSink>,
) -> Result<Vec<T>>
where
    S: Stream<Item = Result<Vec<I>>>,
    F: FnMut(Vec<I>) -> Fut,
    Fut: Future<Output = Result<Option<T>>>,
{
    pin_mut!(stream);
    let mut results = Vec::new();
    let mut processed: usize = 0;

    while let Some(batch) = stream.next().await {
        let batch = batch?;
        let batch_len = batch.len();

        if let Some(value) = per_batch(batch).await? {
            results.push(value);
        }

        processed += batch_len;
        if total > 0 {
            if let Some(sink) = progress.as_mut() {
                let percentage = (processed as f64 / total as f64) * 100.0;
                sink(percentage, processed, total);
            }
        }
    }

    Ok(results)
}
