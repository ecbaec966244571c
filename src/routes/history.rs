use axum::{
    extract::{Query, State},
    Extension, Json,
};

use crate::{
    error::AppResult,
    models::{CurrentUser, HistoryEntry, Page, PageParams},
    services::videos,
    state::AppState,
};

/// Handler for the caller's watch history
pub async fn list(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Query(params): Query<PageParams>,
) -> AppResult<Json<Page<HistoryEntry>>> {
    let params = params.normalized();
    let page = videos::list_history(&state.db_pool, user.id, &params).await?;
    Ok(Json(page))
}
