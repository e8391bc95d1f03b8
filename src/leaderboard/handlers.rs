use std::collections::HashMap;

use axum::{extract::State, routing::get, Json, Router};
use tracing::{error, instrument, warn};
use uuid::Uuid;

use crate::{auth::jwt::AuthUser, state::AppState};

use super::aggregate::{rank_users, LeaderboardEntry};
use super::repo::{display_names, score_pairs};

pub fn routes() -> Router<AppState> {
    Router::new().route("/leaderboard", get(get_leaderboard))
}

/// Top users by average sustainability score.
///
/// Any failure along the way surfaces as an empty leaderboard; the view
/// shows its empty state instead of an error.
#[instrument(skip(state))]
pub async fn get_leaderboard(
    State(state): State<AppState>,
    AuthUser(_user_id): AuthUser,
) -> Json<Vec<LeaderboardEntry>> {
    let scores = match score_pairs(&state.db).await {
        Ok(scores) => scores,
        Err(e) => {
            error!(error = %e, "leaderboard scan query failed");
            return Json(vec![]);
        }
    };

    if scores.is_empty() {
        return Json(vec![]);
    }

    let mut ids: Vec<Uuid> = scores.iter().map(|(id, _)| *id).collect();
    ids.sort();
    ids.dedup();

    let names = match display_names(&state.db, &ids).await {
        Ok(names) => names,
        Err(e) => {
            // rank without names rather than dropping the board
            warn!(error = %e, "leaderboard profile query failed");
            HashMap::new()
        }
    };

    Json(rank_users(&scores, &names))
}
