use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use time::OffsetDateTime;
use tracing::{error, instrument, warn};

use crate::{auth::jwt::AuthUser, dashboard, state::AppState};

use super::dto::{
    DetectHealth, DetectImageRequest, HistoryQuery, LiveDetections, NewScanRequest, ScanCandidate,
};
use super::repo::ScanRecord;
use super::services::{candidate_from_response, period_cutoff, scan_error};

pub fn detect_routes() -> Router<AppState> {
    Router::new()
        .route("/detect", post(detect_food))
        .route("/detect/live", post(detect_live))
        .route("/detect/health", get(detect_health))
}

pub fn history_routes() -> Router<AppState> {
    Router::new().route("/scans", post(create_scan).get(list_scans))
}

/// Manual scan: submit one image, get back a candidate to confirm.
///
/// Detection failures degrade to placeholder candidates; the flow always
/// completes with a 200.
#[instrument(skip(state, body))]
pub async fn detect_food(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<DetectImageRequest>,
) -> Result<Json<ScanCandidate>, (StatusCode, String)> {
    if body.image.is_empty() {
        return Err((StatusCode::BAD_REQUEST, "image is required".into()));
    }

    match state.detector.detect(&body.image).await {
        Ok(response) => Ok(Json(candidate_from_response(&response))),
        Err(e) => {
            warn!(error = %e, %user_id, "detection unavailable");
            Ok(Json(scan_error()))
        }
    }
}

/// Live mode: shorter timeout, quality-filtered raw detections. A failed
/// frame yields an empty overlay, not an error.
#[instrument(skip(state, body))]
pub async fn detect_live(
    State(state): State<AppState>,
    AuthUser(_user_id): AuthUser,
    Json(body): Json<DetectImageRequest>,
) -> Result<Json<LiveDetections>, (StatusCode, String)> {
    if body.image.is_empty() {
        return Err((StatusCode::BAD_REQUEST, "image is required".into()));
    }

    let live = match state.detector.detect_live(&body.image).await {
        Ok(response) => LiveDetections {
            detections: response
                .detections
                .into_iter()
                .filter(|d| d.passes_quality())
                .collect(),
            image_info: response.image_info,
        },
        Err(e) => {
            warn!(error = %e, "live detection frame dropped");
            LiveDetections {
                detections: vec![],
                image_info: None,
            }
        }
    };

    Ok(Json(live))
}

#[instrument(skip(state))]
pub async fn detect_health(State(state): State<AppState>) -> Json<DetectHealth> {
    let endpoint = state.detector.probe().await;
    Json(DetectHealth {
        available: endpoint.is_some(),
        endpoint,
    })
}

/// Record a confirmed scan and refresh the user's cached dashboard.
#[instrument(skip(state, payload))]
pub async fn create_scan(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(mut payload): Json<NewScanRequest>,
) -> Result<(StatusCode, Json<ScanRecord>), (StatusCode, String)> {
    payload.sustainability_score = payload.sustainability_score.clamp(0.0, 100.0);

    let record = ScanRecord::insert(&state.db, user_id, &payload)
        .await
        .map_err(|e| {
            error!(error = %e, %user_id, "create scan failed");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        })?;

    // The cache is a projection; a failed refresh only delays the update
    if let Err(e) = dashboard::services::refresh_summary(&state, user_id).await {
        warn!(error = %e, %user_id, "dashboard cache refresh failed after scan");
    }

    Ok((StatusCode::CREATED, Json(record)))
}

/// A user's scan history, newest first, with optional period or explicit
/// date-range filters.
#[instrument(skip(state))]
pub async fn list_scans(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(q): Query<HistoryQuery>,
) -> Result<Json<Vec<ScanRecord>>, (StatusCode, String)> {
    let (since, until) = match q.period {
        Some(period) => (
            Some(period_cutoff(period, OffsetDateTime::now_utc().date())),
            None,
        ),
        None => (q.from, q.to),
    };

    let scans = ScanRecord::list_by_user(&state.db, user_id, since, until)
        .await
        .map_err(|e| {
            error!(error = %e, %user_id, "list scans failed");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        })?;

    Ok(Json(scans))
}
