use serde::{Deserialize, Serialize};

use crate::scans::repo::ScanRecord;

/// Per-user snapshot of scan history for immediate display.
///
/// Serialized into the cache as-is; the cached copy is only ever a stale
/// rendition of this same shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardSummary {
    pub total_scans: usize,
    pub average_eco_score: i32,
    pub recent_scans: Vec<ScanRecord>,
}
