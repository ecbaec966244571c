//! Dish recommendation assembly: fetch a candidate page, aggregate the
//! caller's interaction history, score, and re-order.

pub mod scoring;

use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::{
    error::AppResult,
    models::{Dish, DishResponse, InteractionKind, Page, PageParams, User},
};

pub use scoring::{InteractionProfile, ScoreBreakdown, ScoredDish};

use scoring::rank_dishes;

/// One scored entry in a recommendation page
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DishRecommendation {
    pub dish: DishResponse,
    pub score: f64,
    pub breakdown: ScoreBreakdown,
}

/// Builds a scored recommendation page for the user.
///
/// Candidates come from an ordinary catalog page (available dishes,
/// best-rated first); the weighted-sum scorer then re-orders that page.
/// Scoring never changes which dishes are on the page, only their order.
pub async fn recommend_dishes(
    pool: &PgPool,
    user: &User,
    params: &PageParams,
) -> AppResult<Page<DishRecommendation>> {
    let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM dishes WHERE available")
        .fetch_one(pool)
        .await?;

    let candidates = sqlx::query_as::<_, Dish>(
        r#"
        SELECT id, restaurant_id, name, description, cuisine, spice_level, price_cents,
               dietary_tags, rating_avg, rating_count, available, created_at
        FROM dishes
        WHERE available
        ORDER BY rating_avg DESC, id ASC
        LIMIT $1 OFFSET $2
        "#,
    )
    .bind(params.limit())
    .bind(params.offset())
    .fetch_all(pool)
    .await?;

    let profile = load_interaction_profile(pool, user.id).await?;
    let ranked = rank_dishes(candidates, user, &profile);

    tracing::debug!(
        user_id = user.id,
        candidates = ranked.len(),
        "Recommendation page scored"
    );

    let items = ranked
        .into_iter()
        .map(|scored| DishRecommendation {
            dish: DishResponse::from(&scored.dish),
            score: scored.score,
            breakdown: scored.breakdown,
        })
        .collect();

    Ok(Page::new(items, params, total))
}

/// Row shape for the grouped interaction query
#[derive(sqlx::FromRow)]
struct InteractionRow {
    dish_id: i64,
    restaurant_id: i64,
    cuisine: String,
    kind: String,
}

/// Aggregates the user's interaction log into the signals the scorer
/// consumes. One grouped query; rating interactions feed the dish's public
/// aggregate instead, and unknown kinds are ignored.
async fn load_interaction_profile(pool: &PgPool, user_id: i64) -> AppResult<InteractionProfile> {
    let rows = sqlx::query_as::<_, InteractionRow>(
        r#"
        SELECT i.dish_id, d.restaurant_id, d.cuisine, i.kind
        FROM dish_interactions i
        JOIN dishes d ON d.id = i.dish_id
        WHERE i.user_id = $1
        GROUP BY i.dish_id, d.restaurant_id, d.cuisine, i.kind
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    let mut profile = InteractionProfile::default();

    for row in rows {
        match InteractionKind::parse(&row.kind) {
            Some(InteractionKind::Order) => {
                profile.ordered_dishes.insert(row.dish_id);
                profile.ordered_restaurants.insert(row.restaurant_id);
                profile.familiar_cuisines.insert(row.cuisine.to_lowercase());
            }
            Some(InteractionKind::Like) => {
                profile.liked_dishes.insert(row.dish_id);
                profile.familiar_cuisines.insert(row.cuisine.to_lowercase());
            }
            Some(InteractionKind::View) => {
                profile.viewed_dishes.insert(row.dish_id);
            }
            Some(InteractionKind::Rating) | None => {}
        }
    }

    Ok(profile)
}
