use tracing::warn;
use uuid::Uuid;

use crate::cache::dashboard_key;
use crate::scans::repo::ScanRecord;
use crate::state::AppState;

use super::dto::DashboardSummary;

/// How many scans the dashboard shows in its recent list.
const RECENT_SCANS_LIMIT: usize = 3;

/// Mean sustainability score, rounded to the nearest integer.
///
/// An empty history reads as 100: a new user starts from a clean slate,
/// not a failing grade.
pub fn average_eco_score(scans: &[ScanRecord]) -> i32 {
    if scans.is_empty() {
        return 100;
    }
    let total: f64 = scans.iter().map(|s| s.sustainability_score).sum();
    (total / scans.len() as f64).round() as i32
}

/// Build the summary from a user's full scan set, in any order.
pub fn summarize(scans: &[ScanRecord]) -> DashboardSummary {
    let mut recent: Vec<ScanRecord> = scans.to_vec();
    recent.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    recent.truncate(RECENT_SCANS_LIMIT);

    DashboardSummary {
        total_scans: scans.len(),
        average_eco_score: average_eco_score(scans),
        recent_scans: recent,
    }
}

/// The empty-state summary served when nothing else is available.
pub fn empty_summary() -> DashboardSummary {
    summarize(&[])
}

/// Recompute a user's summary from the store and overwrite the cached
/// copy. Last writer wins; the cache is never merged.
pub async fn refresh_summary(state: &AppState, user_id: Uuid) -> anyhow::Result<DashboardSummary> {
    let scans = ScanRecord::list_all_by_user(&state.db, user_id).await?;
    let summary = summarize(&scans);

    match serde_json::to_string(&summary) {
        Ok(json) => {
            if let Err(e) = state.cache.put(&dashboard_key(user_id), json).await {
                warn!(error = %e, %user_id, "dashboard cache write failed");
            }
        }
        Err(e) => warn!(error = %e, %user_id, "dashboard summary serialization failed"),
    }

    Ok(summary)
}

/// The cached summary, if one exists and still parses.
pub async fn cached_summary(state: &AppState, user_id: Uuid) -> Option<DashboardSummary> {
    let raw = state
        .cache
        .get(&dashboard_key(user_id))
        .await
        .unwrap_or_else(|e| {
            warn!(error = %e, %user_id, "dashboard cache read failed");
            None
        })?;
    serde_json::from_str(&raw).ok()
}
