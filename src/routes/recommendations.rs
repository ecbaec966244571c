use axum::{
    extract::{Query, State},
    Extension, Json,
};

use crate::{
    cached,
    db::CacheKey,
    error::AppResult,
    models::{CurrentUser, Page, PageParams, User},
    services::recommendation::{self, DishRecommendation},
    state::AppState,
};

/// Handler for the caller's scored dish recommendations.
///
/// Pages are cached per user with a short TTL; new interactions show up
/// once the cached page expires.
pub async fn dishes(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Query(params): Query<PageParams>,
) -> AppResult<Json<Page<DishRecommendation>>> {
    let params = params.normalized();
    let page = cached_recommendations(&state, &user, &params).await?;
    Ok(Json(page))
}

/// Cache-through lookup. The signature pins the page type `cached!`
/// deserializes into.
async fn cached_recommendations(
    state: &AppState,
    user: &User,
    params: &PageParams,
) -> AppResult<Page<DishRecommendation>> {
    let key = CacheKey::DishRecommendations {
        user_id: user.id,
        page: params.page,
        per_page: params.per_page,
    };

    cached!(
        state.cache,
        key,
        state.config.recommendation_cache_ttl_secs,
        recommendation::recommend_dishes(&state.db_pool, user, params)
    )
}
