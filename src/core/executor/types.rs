//! Mutation outcome types

use crate::storage::adapter::RecordId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Result of one per-item delete attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteDisposition {
    /// The record was deleted (or moved to trash)
    Deleted,
    /// The delete matched no rows
    Missing,
}

/// A per-item failure with its reason
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailedMutation {
    /// Identifier of the record that could not be deleted
    pub id: RecordId,
    /// Human-readable failure reason
    pub reason: String,
}

/// Aggregated result of one bulk mutation invocation
///
/// Never persisted; returned once per invocation. Per-item failures never
/// abort the run, so `succeeded` and `failed` together cover every attempted
/// identifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MutationOutcome {
    /// Identifiers deleted successfully, in processing order
    pub succeeded: Vec<RecordId>,
    /// Identifiers that failed, with reasons, in processing order
    pub failed: Vec<FailedMutation>,
    /// Number of chunks fully processed
    pub chunks_processed: usize,
    /// Whether the run stopped early due to cancellation
    pub cancelled: bool,
    /// When the invocation started
    pub started_at: DateTime<Utc>,
    /// When the invocation finished
    pub completed_at: DateTime<Utc>,
}

impl MutationOutcome {
    pub(crate) fn begin() -> Self {
        let now = Utc::now();
        Self {
            succeeded: Vec::new(),
            failed: Vec::new(),
            chunks_processed: 0,
            cancelled: false,
            started_at: now,
            completed_at: now,
        }
    }

    /// Total identifiers attempted
    pub fn total_attempted(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }

    /// Whether every attempted delete succeeded
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty() && !self.cancelled
    }
}
