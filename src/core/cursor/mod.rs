//! Cursor generator
//!
//! Lazy, finite, non-restartable batch sequences over the record store,
//! advancing by offset/limit pagination in ascending primary-key order. A
//! sequence must be fully drained or simply dropped; no cursor or transaction
//! is held open between pulls, so early abandonment leaves nothing dangling.

mod filter;
mod generator;

pub use filter::{CommentFilter, ContentFilter};
pub use generator::{CursorGenerator, IdBatchStream, RowBatchStream};
