use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;

use crate::{
    error::AppResult,
    models::{
        CreateVideoRequest, CurrentUser, Page, PageParams, VideoResponse, WatchEntryResponse,
        WatchRequest,
    },
    services::videos,
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct VideoFilter {
    pub genre: Option<String>,
}

/// Handler for the public video catalog
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<PageParams>,
    Query(filter): Query<VideoFilter>,
) -> AppResult<Json<Page<VideoResponse>>> {
    let params = params.normalized();
    let page = videos::list_videos(&state.db_pool, &params, filter.genre.as_deref()).await?;
    Ok(Json(page.map(|video| VideoResponse::from(&video))))
}

/// Handler for a single video lookup
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(video_id): Path<i64>,
) -> AppResult<Json<VideoResponse>> {
    let video = videos::get_video(&state.db_pool, video_id).await?;
    Ok(Json(VideoResponse::from(&video)))
}

/// Handler for publishing a new video's catalog metadata
pub async fn create(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(request): Json<CreateVideoRequest>,
) -> AppResult<(StatusCode, Json<VideoResponse>)> {
    let video = videos::create_video(&state.db_pool, user.id, request).await?;
    Ok((StatusCode::CREATED, Json(VideoResponse::from(&video))))
}

/// Handler recording the caller's watch progress on a video
pub async fn watch(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(video_id): Path<i64>,
    Json(request): Json<WatchRequest>,
) -> AppResult<Json<WatchEntryResponse>> {
    let entry =
        videos::record_watch(&state.db_pool, user.id, video_id, request.position_secs).await?;
    Ok(Json(WatchEntryResponse::from(&entry)))
}
