//! Utility modules shared across the engine

pub mod error;

pub use error::{Result, SweepError};
