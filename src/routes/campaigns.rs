use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;

use crate::{
    error::AppResult,
    models::{
        CampaignResponse, CampaignStatus, CreateCampaignRequest, CurrentUser, Page, PageParams,
    },
    services::campaigns,
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct CampaignFilter {
    pub status: Option<CampaignStatus>,
}

/// Handler for the campaign listing, optionally filtered by lifecycle status
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<PageParams>,
    Query(filter): Query<CampaignFilter>,
) -> AppResult<Json<Page<CampaignResponse>>> {
    let params = params.normalized();
    let page = campaigns::list_campaigns(&state.db_pool, &params, filter.status).await?;
    Ok(Json(page.map(|campaign| CampaignResponse::from(&campaign))))
}

/// Handler for a single campaign lookup
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(campaign_id): Path<i64>,
) -> AppResult<Json<CampaignResponse>> {
    let campaign = campaigns::get_campaign(&state.db_pool, campaign_id).await?;
    Ok(Json(CampaignResponse::from(&campaign)))
}

/// Handler for creating an ad campaign
pub async fn create(
    State(state): State<AppState>,
    Extension(CurrentUser(_user)): Extension<CurrentUser>,
    Json(request): Json<CreateCampaignRequest>,
) -> AppResult<(StatusCode, Json<CampaignResponse>)> {
    let campaign = campaigns::create_campaign(&state.db_pool, request).await?;
    Ok((StatusCode::CREATED, Json(CampaignResponse::from(&campaign))))
}
