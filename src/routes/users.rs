use axum::{extract::State, http::StatusCode, Extension, Json};

use crate::{
    error::AppResult,
    models::{
        CurrentUser, RegisterRequest, RegisterResponse, UpdatePreferencesRequest, UserResponse,
    },
    services::users,
    state::AppState,
};

/// Handler for account registration
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<RegisterResponse>)> {
    let (user, api_token) = users::register(&state.db_pool, request).await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            user: UserResponse::from(&user),
            api_token,
        }),
    ))
}

/// Handler returning the authenticated user's profile
pub async fn me(Extension(CurrentUser(user)): Extension<CurrentUser>) -> Json<UserResponse> {
    Json(UserResponse::from(&user))
}

/// Handler for partial preference updates
pub async fn update_preferences(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(request): Json<UpdatePreferencesRequest>,
) -> AppResult<Json<UserResponse>> {
    let updated = users::update_preferences(&state.db_pool, user.id, request).await?;
    Ok(Json(UserResponse::from(&updated)))
}
