//! Engine configuration
//!
//! Configuration structs with validated defaults. Sizes of zero are rejected
//! rather than clamped; callers get an immediate `Validation` error.

use crate::utils::error::{Result, SweepError};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default number of identifiers pulled per cursor batch
pub const DEFAULT_BATCH_SIZE: usize = 100;

/// Default number of identifiers mutated per executor chunk
pub const DEFAULT_CHUNK_SIZE: usize = 100;

/// Default execution-budget renewal increment in seconds
pub const DEFAULT_BUDGET_INCREMENT_SECS: u64 = 30;

/// Engine-wide tuning knobs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Maximum identifiers per cursor batch
    pub batch_size: usize,
    /// Maximum identifiers per mutation chunk
    pub chunk_size: usize,
    /// Wall-clock allowance requested from the budget host after each batch/chunk
    pub budget_increment_secs: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            chunk_size: DEFAULT_CHUNK_SIZE,
            budget_increment_secs: DEFAULT_BUDGET_INCREMENT_SECS,
        }
    }
}

impl EngineConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(SweepError::Validation(
                "batch_size must be greater than 0".to_string(),
            ));
        }
        if self.chunk_size == 0 {
            return Err(SweepError::Validation(
                "chunk_size must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Budget renewal increment as a `Duration`
    pub fn budget_increment(&self) -> Duration {
        Duration::from_secs(self.budget_increment_secs)
    }
}

/// Database connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Connection URL (`sqlite:...` or `postgres:...`)
    pub url: String,
    /// Maximum pool connections
    pub max_connections: u32,
    /// Connection acquire timeout in seconds
    pub connection_timeout: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite::memory:".to_string(),
            max_connections: 5,
            connection_timeout: 30,
        }
    }
}

impl DatabaseConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.url.is_empty() {
            return Err(SweepError::Config("database url is empty".to_string()));
        }
        if self.max_connections == 0 {
            return Err(SweepError::Config(
                "max_connections must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}
