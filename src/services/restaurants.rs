use sqlx::PgPool;

use crate::{
    error::{AppError, AppResult},
    models::{
        CreateDishRequest, CreateRestaurantRequest, DietaryTag, Dish, DishResponse,
        InteractionKind, InteractionRequest, InteractionResponse, Page, PageParams, Restaurant,
    },
};

/// Lists restaurants alphabetically, optionally narrowed to one cuisine.
/// The filter is folded to the stored lowercase form, so `?cuisine=Italian`
/// finds restaurants created with any casing.
pub async fn list_restaurants(
    pool: &PgPool,
    params: &PageParams,
    cuisine: Option<&str>,
) -> AppResult<Page<Restaurant>> {
    let cuisine = normalized_cuisine(cuisine);

    let total = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM restaurants WHERE $1::TEXT IS NULL OR cuisine = $1",
    )
    .bind(&cuisine)
    .fetch_one(pool)
    .await?;

    let restaurants = sqlx::query_as::<_, Restaurant>(
        r#"
        SELECT id, name, cuisine, city, created_at
        FROM restaurants
        WHERE $1::TEXT IS NULL OR cuisine = $1
        ORDER BY name ASC, id ASC
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(&cuisine)
    .bind(params.limit())
    .bind(params.offset())
    .fetch_all(pool)
    .await?;

    Ok(Page::new(restaurants, params, total))
}

pub async fn get_restaurant(pool: &PgPool, restaurant_id: i64) -> AppResult<Restaurant> {
    sqlx::query_as::<_, Restaurant>(
        "SELECT id, name, cuisine, city, created_at FROM restaurants WHERE id = $1",
    )
    .bind(restaurant_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Restaurant {} not found", restaurant_id)))
}

pub async fn create_restaurant(
    pool: &PgPool,
    request: CreateRestaurantRequest,
) -> AppResult<Restaurant> {
    let name = request.name.trim().to_string();
    let cuisine = request.cuisine.trim().to_lowercase();

    if name.is_empty() {
        return Err(AppError::InvalidInput("Name cannot be empty".to_string()));
    }
    if cuisine.is_empty() {
        return Err(AppError::InvalidInput("Cuisine cannot be empty".to_string()));
    }

    let restaurant = sqlx::query_as::<_, Restaurant>(
        r#"
        INSERT INTO restaurants (name, cuisine, city)
        VALUES ($1, $2, $3)
        RETURNING id, name, cuisine, city, created_at
        "#,
    )
    .bind(&name)
    .bind(&cuisine)
    .bind(&request.city)
    .fetch_one(pool)
    .await?;

    tracing::info!(restaurant_id = restaurant.id, name = %restaurant.name, "Restaurant created");

    Ok(restaurant)
}

/// Lists a restaurant's available dishes as response DTOs, best-rated first.
/// The DTO shape is what menu pages cache, so this returns it directly.
pub async fn list_dishes(
    pool: &PgPool,
    restaurant_id: i64,
    params: &PageParams,
) -> AppResult<Page<DishResponse>> {
    // 404 for a missing restaurant rather than an empty page
    get_restaurant(pool, restaurant_id).await?;

    let total = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM dishes WHERE restaurant_id = $1 AND available",
    )
    .bind(restaurant_id)
    .fetch_one(pool)
    .await?;

    let dishes = sqlx::query_as::<_, Dish>(
        r#"
        SELECT id, restaurant_id, name, description, cuisine, spice_level, price_cents,
               dietary_tags, rating_avg, rating_count, available, created_at
        FROM dishes
        WHERE restaurant_id = $1 AND available
        ORDER BY rating_avg DESC, id ASC
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(restaurant_id)
    .bind(params.limit())
    .bind(params.offset())
    .fetch_all(pool)
    .await?;

    Ok(Page::new(dishes, params, total).map(|dish| DishResponse::from(&dish)))
}

pub async fn create_dish(
    pool: &PgPool,
    restaurant_id: i64,
    request: CreateDishRequest,
) -> AppResult<Dish> {
    let name = request.name.trim().to_string();
    if name.is_empty() {
        return Err(AppError::InvalidInput("Name cannot be empty".to_string()));
    }
    if request.price_cents <= 0 {
        return Err(AppError::InvalidInput("Price must be positive".to_string()));
    }
    for raw in &request.dietary_tags {
        if DietaryTag::parse(raw).is_none() {
            return Err(AppError::InvalidInput(format!("Unknown dietary tag: {}", raw)));
        }
    }

    let restaurant = get_restaurant(pool, restaurant_id).await?;
    let cuisine = request
        .cuisine
        .as_deref()
        .map(str::trim)
        .filter(|cuisine| !cuisine.is_empty())
        .map(str::to_lowercase)
        .unwrap_or(restaurant.cuisine);

    let dish = sqlx::query_as::<_, Dish>(
        r#"
        INSERT INTO dishes (restaurant_id, name, description, cuisine, spice_level, price_cents, dietary_tags)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING id, restaurant_id, name, description, cuisine, spice_level, price_cents,
                  dietary_tags, rating_avg, rating_count, available, created_at
        "#,
    )
    .bind(restaurant_id)
    .bind(&name)
    .bind(&request.description)
    .bind(&cuisine)
    .bind(request.spice_level.as_ordinal())
    .bind(request.price_cents)
    .bind(&request.dietary_tags)
    .fetch_one(pool)
    .await?;

    tracing::info!(dish_id = dish.id, restaurant_id, "Dish created");

    Ok(dish)
}

/// Appends one interaction to the log and, for ratings, folds the new value
/// into the dish's denormalized aggregate inside the same transaction.
pub async fn record_interaction(
    pool: &PgPool,
    user_id: i64,
    dish_id: i64,
    request: InteractionRequest,
) -> AppResult<InteractionResponse> {
    match request.kind {
        InteractionKind::Rating => {
            let rating = request.rating.ok_or_else(|| {
                AppError::InvalidInput("Rating interactions require a rating value".to_string())
            })?;
            if !(1..=5).contains(&rating) {
                return Err(AppError::InvalidInput(
                    "Rating must be between 1 and 5".to_string(),
                ));
            }
        }
        _ if request.rating.is_some() => {
            return Err(AppError::InvalidInput(
                "Only rating interactions may carry a rating value".to_string(),
            ));
        }
        _ => {}
    }

    let mut tx = pool.begin().await?;

    let dish = sqlx::query_as::<_, Dish>(
        r#"
        SELECT id, restaurant_id, name, description, cuisine, spice_level, price_cents,
               dietary_tags, rating_avg, rating_count, available, created_at
        FROM dishes
        WHERE id = $1
        FOR UPDATE
        "#,
    )
    .bind(dish_id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Dish {} not found", dish_id)))?;

    sqlx::query(
        "INSERT INTO dish_interactions (user_id, dish_id, kind, rating) VALUES ($1, $2, $3, $4)",
    )
    .bind(user_id)
    .bind(dish_id)
    .bind(request.kind.as_str())
    .bind(request.rating)
    .execute(&mut *tx)
    .await?;

    let (rating_avg, rating_count) = match (request.kind, request.rating) {
        (InteractionKind::Rating, Some(rating)) => {
            let (next_avg, next_count) = fold_rating(dish.rating_avg, dish.rating_count, rating);

            sqlx::query("UPDATE dishes SET rating_avg = $2, rating_count = $3 WHERE id = $1")
                .bind(dish_id)
                .bind(next_avg)
                .bind(next_count)
                .execute(&mut *tx)
                .await?;

            (next_avg, next_count)
        }
        _ => (dish.rating_avg, dish.rating_count),
    };

    tx.commit().await?;

    tracing::debug!(user_id, dish_id, kind = request.kind.as_str(), "Interaction recorded");

    Ok(InteractionResponse {
        dish_id,
        kind: request.kind,
        rating: request.rating,
        dish_rating_avg: rating_avg,
        dish_rating_count: rating_count,
    })
}

/// Cuisine values are stored lowercased, so filters get the same fold.
/// Blank input means no filter.
fn normalized_cuisine(cuisine: Option<&str>) -> Option<String> {
    cuisine
        .map(str::trim)
        .filter(|cuisine| !cuisine.is_empty())
        .map(str::to_lowercase)
}

/// Folds one new rating into the running average without rescanning the log
fn fold_rating(rating_avg: f64, rating_count: i32, rating: i16) -> (f64, i32) {
    let next_count = rating_count + 1;
    let next_avg =
        (rating_avg * f64::from(rating_count) + f64::from(rating)) / f64::from(next_count);
    (next_avg, next_count)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalized_cuisine_folds_case_like_the_write_path() {
        assert_eq!(normalized_cuisine(Some("Italian")), Some("italian".to_string()));
        assert_eq!(normalized_cuisine(Some("  ThAI ")), Some("thai".to_string()));
    }

    #[test]
    fn test_normalized_cuisine_treats_blank_as_unfiltered() {
        assert_eq!(normalized_cuisine(None), None);
        assert_eq!(normalized_cuisine(Some("   ")), None);
    }

    #[test]
    fn test_fold_rating_first_rating_becomes_the_average() {
        assert_eq!(fold_rating(0.0, 0, 5), (5.0, 1));
    }

    #[test]
    fn test_fold_rating_weights_by_prior_count() {
        assert_eq!(fold_rating(5.0, 1, 3), (4.0, 2));
        assert_eq!(fold_rating(4.0, 2, 1), (3.0, 3));
    }
}
