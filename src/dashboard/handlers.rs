use axum::{extract::State, routing::get, Json, Router};
use tracing::{instrument, warn};

use crate::{auth::jwt::AuthUser, state::AppState};

use super::dto::DashboardSummary;
use super::services::{cached_summary, empty_summary, refresh_summary};

pub fn routes() -> Router<AppState> {
    Router::new().route("/dashboard", get(get_dashboard))
}

/// The user's dashboard summary.
///
/// Fresh when the store answers, otherwise the cached copy, otherwise the
/// empty state. This endpoint never fails hard: a dashboard with stale
/// numbers beats no dashboard.
#[instrument(skip(state))]
pub async fn get_dashboard(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Json<DashboardSummary> {
    match refresh_summary(&state, user_id).await {
        Ok(summary) => Json(summary),
        Err(e) => {
            warn!(error = %e, %user_id, "dashboard fetch failed, falling back to cache");
            Json(cached_summary(&state, user_id).await.unwrap_or_else(empty_summary))
        }
    }
}
