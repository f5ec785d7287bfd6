//! Video catalog and view counter endpoints

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use showcase_common::db::models::{Video, ViewRecordRequest};
use showcase_common::ViewCountUpdate;
use tracing::{debug, info, warn};

use super::error::ApiError;
use super::types::{RecordViewBody, RecordViewResponse, ViewCountResponse};
use crate::AppState;

/// GET /api/videos
///
/// Whole catalog, newest first.
pub async fn list_videos(State(state): State<AppState>) -> Result<Json<Vec<Video>>, ApiError> {
    let videos = state.store.list_videos().await?;
    debug!("Listing {} videos", videos.len());
    Ok(Json(videos))
}

/// POST /api/videos/:id/views
///
/// Idempotent per `(video, session)`. On a new count the fresh total is
/// broadcast to `/events` subscribers. Once the increment is committed the
/// answer is `counted: true` even if re-reading the total fails.
pub async fn record_view(
    State(state): State<AppState>,
    Path(video_id): Path<String>,
    body: Result<Json<RecordViewBody>, JsonRejection>,
) -> Result<Json<RecordViewResponse>, ApiError> {
    let Json(body) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let request = ViewRecordRequest {
        video_id,
        session_id: body.session_id,
        watch_duration_seconds: body.watch_duration_seconds,
    };

    let counted = state.store.record_view(&request).await?;

    if counted {
        match state.store.view_count(&request.video_id).await {
            Ok(view_count) => {
                info!("View recorded for {} ({} total)", request.video_id, view_count);
                state
                    .bus
                    .publish(ViewCountUpdate::new(request.video_id.clone(), view_count));
            }
            Err(e) => warn!(
                "View recorded for {} but total unavailable, not broadcasting: {}",
                request.video_id, e
            ),
        }
    }

    Ok(Json(RecordViewResponse { counted }))
}

/// GET /api/videos/:id/view_count
pub async fn get_view_count(
    State(state): State<AppState>,
    Path(video_id): Path<String>,
) -> Result<Json<ViewCountResponse>, ApiError> {
    let view_count = state.store.view_count(&video_id).await?;
    Ok(Json(ViewCountResponse {
        video_id,
        view_count,
    }))
}
