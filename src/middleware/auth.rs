use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use sha2::{Digest, Sha256};

use crate::{
    error::{AppError, AppResult},
    models::{CurrentUser, User},
    state::AppState,
};

/// Hex digest under which an API token is stored and looked up. Raw tokens
/// never touch the database or the logs.
pub fn token_digest(token: &str) -> String {
    Sha256::digest(token.as_bytes())
        .iter()
        .map(|byte| format!("{:02x}", byte))
        .collect()
}

/// Pulls the bearer token out of the Authorization header
fn bearer_token(request: &Request) -> AppResult<&str> {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("Missing Authorization header".to_string()))?;

    header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| AppError::Unauthorized("Expected a bearer token".to_string()))
}

/// Rejects the request unless it carries a valid API token, then attaches
/// the owning user to the request extensions as [`CurrentUser`].
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(&request)?;
    let digest = token_digest(token);

    let user = sqlx::query_as::<_, User>(
        r#"
        SELECT u.id, u.username, u.email, u.display_name, u.spice_tolerance,
               u.preferred_cuisines, u.dietary_restrictions, u.budget_cents, u.created_at
        FROM api_tokens t
        JOIN users u ON u.id = t.user_id
        WHERE t.token_digest = $1
        "#,
    )
    .bind(&digest)
    .fetch_optional(&state.db_pool)
    .await?
    .ok_or_else(|| AppError::Unauthorized("Invalid API token".to_string()))?;

    tracing::debug!(user_id = user.id, "Authenticated request");

    request.extensions_mut().insert(CurrentUser(user));

    Ok(next.run(request).await)
}
