//! Database models for the commit log.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A row of the `commits` table: one per committed block (genesis is
/// height 0).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitRecord {
    /// Block height.
    pub height: u64,
    /// Server-side commit timestamp.
    pub committed_at: DateTime<Utc>,
    /// Number of keys written by the block.
    pub write_count: u32,
}
