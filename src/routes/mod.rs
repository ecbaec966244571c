use axum::{
    http::StatusCode,
    middleware,
    routing::{get, post, put},
    Json, Router,
};
use serde_json::{json, Value};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    middleware::{auth, rate_limit, request_id},
    state::AppState,
};

pub mod campaigns;
pub mod history;
pub mod recommendations;
pub mod restaurants;
pub mod users;
pub mod videos;

/// Creates the application router with all routes and the middleware stack
pub fn create_router(state: AppState) -> Router {
    let api = public_routes()
        .merge(protected_routes(state.clone()))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit::rate_limit,
        ));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Request ids outermost so every span carries one; CORS innermost, since
    // its synthesized preflight responses need the router's default body type.
    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", api)
        .layer(
            ServiceBuilder::new()
                .layer(middleware::from_fn(request_id::request_id_middleware))
                .layer(TraceLayer::new_for_http().make_span_with(request_id::http_request_span))
                .layer(cors),
        )
        .with_state(state)
}

/// Routes that need no credentials: registration and the catalogs
fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/users", post(users::register))
        .route("/videos", get(videos::list))
        .route("/videos/:id", get(videos::get_by_id))
        .route("/restaurants", get(restaurants::list))
        .route("/restaurants/:id", get(restaurants::get_by_id))
        .route("/restaurants/:id/dishes", get(restaurants::list_dishes))
        .route("/campaigns", get(campaigns::list))
        .route("/campaigns/:id", get(campaigns::get_by_id))
}

/// Routes behind bearer-token authentication
fn protected_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/users/me", get(users::me))
        .route("/users/me/preferences", put(users::update_preferences))
        .route("/users/me/history", get(history::list))
        .route("/videos", post(videos::create))
        .route("/videos/:id/watch", post(videos::watch))
        .route("/restaurants", post(restaurants::create))
        .route("/restaurants/:id/dishes", post(restaurants::create_dish))
        .route("/dishes/:id/interactions", post(restaurants::record_interaction))
        .route("/campaigns", post(campaigns::create))
        .route("/recommendations/dishes", get(recommendations::dishes))
        .route_layer(middleware::from_fn_with_state(state, auth::require_auth))
}

/// Health check endpoint
async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}
