use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;

use crate::{
    cached,
    db::CacheKey,
    error::AppResult,
    models::{
        CreateDishRequest, CreateRestaurantRequest, CurrentUser, DishResponse,
        InteractionRequest, InteractionResponse, Page, PageParams, RestaurantResponse,
    },
    services::restaurants,
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct RestaurantFilter {
    pub cuisine: Option<String>,
}

/// Handler for the restaurant directory
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<PageParams>,
    Query(filter): Query<RestaurantFilter>,
) -> AppResult<Json<Page<RestaurantResponse>>> {
    let params = params.normalized();
    let page =
        restaurants::list_restaurants(&state.db_pool, &params, filter.cuisine.as_deref()).await?;
    Ok(Json(page.map(|restaurant| RestaurantResponse::from(&restaurant))))
}

/// Handler for a single restaurant lookup
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(restaurant_id): Path<i64>,
) -> AppResult<Json<RestaurantResponse>> {
    let restaurant = restaurants::get_restaurant(&state.db_pool, restaurant_id).await?;
    Ok(Json(RestaurantResponse::from(&restaurant)))
}

/// Handler for registering a restaurant
pub async fn create(
    State(state): State<AppState>,
    Extension(CurrentUser(_user)): Extension<CurrentUser>,
    Json(request): Json<CreateRestaurantRequest>,
) -> AppResult<(StatusCode, Json<RestaurantResponse>)> {
    let restaurant = restaurants::create_restaurant(&state.db_pool, request).await?;
    Ok((StatusCode::CREATED, Json(RestaurantResponse::from(&restaurant))))
}

/// Handler for a restaurant's menu page, served from cache when warm
pub async fn list_dishes(
    State(state): State<AppState>,
    Path(restaurant_id): Path<i64>,
    Query(params): Query<PageParams>,
) -> AppResult<Json<Page<DishResponse>>> {
    let params = params.normalized();
    let page = cached_menu_page(&state, restaurant_id, &params).await?;
    Ok(Json(page))
}

/// Cache-through lookup. The signature pins the page type `cached!`
/// deserializes into.
async fn cached_menu_page(
    state: &AppState,
    restaurant_id: i64,
    params: &PageParams,
) -> AppResult<Page<DishResponse>> {
    let key = CacheKey::RestaurantDishes {
        restaurant_id,
        page: params.page,
        per_page: params.per_page,
    };

    cached!(
        state.cache,
        key,
        state.config.menu_cache_ttl_secs,
        restaurants::list_dishes(&state.db_pool, restaurant_id, params)
    )
}

/// Handler for adding a dish to a restaurant's menu
pub async fn create_dish(
    State(state): State<AppState>,
    Extension(CurrentUser(_user)): Extension<CurrentUser>,
    Path(restaurant_id): Path<i64>,
    Json(request): Json<CreateDishRequest>,
) -> AppResult<(StatusCode, Json<DishResponse>)> {
    let dish = restaurants::create_dish(&state.db_pool, restaurant_id, request).await?;
    Ok((StatusCode::CREATED, Json(DishResponse::from(&dish))))
}

/// Handler logging a view, like, order, or rating against a dish
pub async fn record_interaction(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(dish_id): Path<i64>,
    Json(request): Json<InteractionRequest>,
) -> AppResult<Json<InteractionResponse>> {
    let response =
        restaurants::record_interaction(&state.db_pool, user.id, dish_id, request).await?;
    Ok(Json(response))
}
