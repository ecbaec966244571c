use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    middleware::auth::token_digest,
    models::{DietaryTag, RegisterRequest, UpdatePreferencesRequest, User},
};

/// Creates an account and its initial API token in one transaction.
///
/// Returns the stored user plus the plaintext token. The token is handed to
/// the caller exactly once; only its digest is persisted.
pub async fn register(pool: &PgPool, request: RegisterRequest) -> AppResult<(User, String)> {
    let username = request.username.trim().to_string();
    let email = request.email.trim().to_lowercase();

    if username.is_empty() {
        return Err(AppError::InvalidInput("Username cannot be empty".to_string()));
    }
    if !is_plausible_email(&email) {
        return Err(AppError::InvalidInput("Email address is malformed".to_string()));
    }

    let mut tx = pool.begin().await?;

    let taken = sqlx::query_scalar::<_, i64>(
        "SELECT id FROM users WHERE username = $1 OR email = $2",
    )
    .bind(&username)
    .bind(&email)
    .fetch_optional(&mut *tx)
    .await?;

    if taken.is_some() {
        return Err(AppError::InvalidInput(
            "Username or email is already taken".to_string(),
        ));
    }

    let user = sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (username, email, display_name)
        VALUES ($1, $2, $3)
        RETURNING id, username, email, display_name, spice_tolerance,
                  preferred_cuisines, dietary_restrictions, budget_cents, created_at
        "#,
    )
    .bind(&username)
    .bind(&email)
    .bind(&request.display_name)
    .fetch_one(&mut *tx)
    .await
    .map_err(map_unique_violation)?;

    let token = format!("sb_{}", Uuid::new_v4().simple());
    sqlx::query("INSERT INTO api_tokens (user_id, token_digest) VALUES ($1, $2)")
        .bind(user.id)
        .bind(token_digest(&token))
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    tracing::info!(user_id = user.id, username = %user.username, "Account registered");

    Ok((user, token))
}

/// Applies a partial preference update; omitted fields keep their values
pub async fn update_preferences(
    pool: &PgPool,
    user_id: i64,
    request: UpdatePreferencesRequest,
) -> AppResult<User> {
    if let Some(tags) = &request.dietary_restrictions {
        for raw in tags {
            if DietaryTag::parse(raw).is_none() {
                return Err(AppError::InvalidInput(format!(
                    "Unknown dietary tag: {}",
                    raw
                )));
            }
        }
    }

    if let Some(cuisines) = &request.preferred_cuisines {
        if cuisines.iter().any(|cuisine| cuisine.trim().is_empty()) {
            return Err(AppError::InvalidInput(
                "Cuisine names cannot be empty".to_string(),
            ));
        }
    }

    if let Some(budget) = request.budget_cents {
        if budget <= 0 {
            return Err(AppError::InvalidInput("Budget must be positive".to_string()));
        }
    }

    let spice = request.spice_tolerance.map(|level| level.as_ordinal());

    let user = sqlx::query_as::<_, User>(
        r#"
        UPDATE users
        SET spice_tolerance = COALESCE($2, spice_tolerance),
            preferred_cuisines = COALESCE($3, preferred_cuisines),
            dietary_restrictions = COALESCE($4, dietary_restrictions),
            budget_cents = COALESCE($5, budget_cents)
        WHERE id = $1
        RETURNING id, username, email, display_name, spice_tolerance,
                  preferred_cuisines, dietary_restrictions, budget_cents, created_at
        "#,
    )
    .bind(user_id)
    .bind(spice)
    .bind(&request.preferred_cuisines)
    .bind(&request.dietary_restrictions)
    .bind(request.budget_cents)
    .fetch_one(pool)
    .await?;

    tracing::debug!(user_id, "Preferences updated");

    Ok(user)
}

/// Cheap structural check; real verification would need a confirmation mail
fn is_plausible_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && !domain.is_empty() && domain.contains('.')
        }
        None => false,
    }
}

/// Concurrent duplicate signups can reach the insert despite the pre-check;
/// the unique indexes report those as bad input, not as a database fault.
fn map_unique_violation(e: sqlx::Error) -> AppError {
    if e.as_database_error().is_some_and(|db| db.is_unique_violation()) {
        AppError::InvalidInput("Username or email is already taken".to_string())
    } else {
        e.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plausible_email_accepts_ordinary_addresses() {
        assert!(is_plausible_email("mika@example.com"));
        assert!(is_plausible_email("a.b+tag@sub.example.org"));
    }

    #[test]
    fn test_plausible_email_rejects_junk() {
        assert!(!is_plausible_email(""));
        assert!(!is_plausible_email("no-at-sign"));
        assert!(!is_plausible_email("@example.com"));
        assert!(!is_plausible_email("mika@"));
        assert!(!is_plausible_email("mika@localhost"));
    }

    #[derive(Debug)]
    struct DuplicateKey;

    impl std::fmt::Display for DuplicateKey {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str("duplicate key value violates unique constraint")
        }
    }

    impl std::error::Error for DuplicateKey {}

    impl sqlx::error::DatabaseError for DuplicateKey {
        fn message(&self) -> &str {
            "duplicate key value violates unique constraint"
        }

        fn kind(&self) -> sqlx::error::ErrorKind {
            sqlx::error::ErrorKind::UniqueViolation
        }

        fn as_error(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
            self
        }

        fn as_error_mut(&mut self) -> &mut (dyn std::error::Error + Send + Sync + 'static) {
            self
        }

        fn into_error(self: Box<Self>) -> Box<dyn std::error::Error + Send + Sync + 'static> {
            self
        }
    }

    #[test]
    fn test_unique_violation_reads_as_taken() {
        let err = map_unique_violation(sqlx::Error::Database(Box::new(DuplicateKey)));
        assert!(matches!(err, AppError::InvalidInput(msg) if msg.contains("taken")));
    }

    #[test]
    fn test_other_database_errors_pass_through() {
        let err = map_unique_violation(sqlx::Error::RowNotFound);
        assert!(matches!(err, AppError::Database(_)));
    }
}
