//! Core engine components
//!
//! Leaves first: cancellation, the execution budget guard, then the cursor
//! generator, progress reporter and bulk mutation executor built on top.

pub mod cancel;
pub mod cursor;
pub mod executor;
pub mod guard;
pub mod progress;
