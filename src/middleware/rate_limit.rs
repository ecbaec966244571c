use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};

use crate::{error::AppError, middleware::auth::token_digest, state::AppState};

/// Window length for the fixed-window counters
const WINDOW_SECS: i64 = 60;
/// Counter keys outlive their window so late increments still expire
const KEY_TTL_SECS: i64 = 2 * WINDOW_SECS;

/// Picks the bucket a request counts against: the token digest when the
/// caller presented one, else the forwarded client address, else a single
/// shared anonymous bucket.
fn client_bucket(request: &Request) -> String {
    if let Some(token) = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|header| header.strip_prefix("Bearer "))
    {
        let digest = token_digest(token.trim());
        return format!("tok:{}", &digest[..16]);
    }

    if let Some(forwarded) = request
        .headers()
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
    {
        return format!("ip:{}", forwarded.trim());
    }

    "anon".to_string()
}

/// Fixed-window request limiter backed by Redis INCR/EXPIRE counters.
///
/// Redis being unreachable lets traffic through: the limiter shields the
/// backend from abuse, it is not a correctness gate.
pub async fn rate_limit(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let now_secs = chrono::Utc::now().timestamp();
    let window = now_secs.div_euclid(WINDOW_SECS);
    let bucket = client_bucket(&request);
    let key = format!("ratelimit:{}:{}", bucket, window);

    match state.cache.increment_window(&key, KEY_TTL_SECS).await {
        Ok(count) if count > i64::from(state.config.rate_limit_per_minute) => {
            let retry_after_secs = (WINDOW_SECS - now_secs.rem_euclid(WINDOW_SECS)) as u64;
            tracing::warn!(bucket = %bucket, count, "Rate limit exceeded");
            Err(AppError::RateLimited { retry_after_secs })
        }
        Ok(_) => Ok(next.run(request).await),
        Err(e) => {
            tracing::warn!(error = %e, "Rate limiter unavailable, letting request through");
            Ok(next.run(request).await)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    #[test]
    fn test_bucket_prefers_token() {
        let request = Request::builder()
            .uri("/")
            .header(AUTHORIZATION, "Bearer sb_test")
            .header("x-forwarded-for", "10.0.0.1")
            .body(Body::empty())
            .unwrap();

        let bucket = client_bucket(&request);
        assert!(bucket.starts_with("tok:"));
        assert_eq!(bucket.len(), "tok:".len() + 16);
    }

    #[test]
    fn test_bucket_uses_first_forwarded_address() {
        let request = Request::builder()
            .uri("/")
            .header("x-forwarded-for", "203.0.113.9, 10.0.0.1")
            .body(Body::empty())
            .unwrap();

        assert_eq!(client_bucket(&request), "ip:203.0.113.9");
    }

    #[test]
    fn test_bucket_falls_back_to_anonymous() {
        let request = Request::builder().uri("/").body(Body::empty()).unwrap();
        assert_eq!(client_bucket(&request), "anon");
    }

    #[test]
    fn test_same_token_maps_to_same_bucket() {
        let first = Request::builder()
            .uri("/a")
            .header(AUTHORIZATION, "Bearer sb_test")
            .body(Body::empty())
            .unwrap();
        let second = Request::builder()
            .uri("/b")
            .header(AUTHORIZATION, "Bearer sb_test")
            .body(Body::empty())
            .unwrap();

        assert_eq!(client_bucket(&first), client_bucket(&second));
    }
}
