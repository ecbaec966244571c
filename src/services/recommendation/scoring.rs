//! Weighted-sum scoring for dish recommendations.
//!
//! Each signal contributes a factor in [0, 1] scaled by its weight. The
//! weights total 100, so a dish the user should love scores near 100 and a
//! dish with nothing going for it scores near 0. Signals the user never
//! expressed a preference about contribute a neutral half-weight instead of
//! punishing the dish. A dietary violation additionally subtracts a flat
//! penalty before the final clamp back into [0, 100].

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::models::{DietaryTag, Dish, User};

pub const WEIGHT_RATING: f64 = 20.0;
pub const WEIGHT_CUISINE: f64 = 20.0;
pub const WEIGHT_AFFINITY: f64 = 20.0;
pub const WEIGHT_SPICE: f64 = 15.0;
pub const WEIGHT_BUDGET: f64 = 15.0;
pub const WEIGHT_DIETARY: f64 = 10.0;

/// Flat deduction when a dish breaks one of the user's dietary restrictions
pub const DIETARY_VIOLATION_PENALTY: f64 = 100.0;

/// Factor for signals the user has not expressed a preference about
const NEUTRAL: f64 = 0.5;

/// Width of the spice scale, for normalizing ordinal distance
const SPICE_RANGE: f64 = 4.0;

/// What the user has interacted with before, aggregated once per request
#[derive(Debug, Default, Clone)]
pub struct InteractionProfile {
    pub ordered_dishes: HashSet<i64>,
    pub liked_dishes: HashSet<i64>,
    pub viewed_dishes: HashSet<i64>,
    pub ordered_restaurants: HashSet<i64>,
    /// Lowercased cuisines of dishes the user liked or ordered
    pub familiar_cuisines: HashSet<String>,
}

/// Per-signal contributions, returned alongside the final score so clients
/// can explain why a dish ranked where it did
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub rating: f64,
    pub cuisine: f64,
    pub spice: f64,
    pub budget: f64,
    pub affinity: f64,
    pub dietary: f64,
    pub penalty: f64,
}

/// A dish with its computed score, ready for ordering
#[derive(Debug, Clone)]
pub struct ScoredDish {
    pub dish: Dish,
    pub score: f64,
    pub breakdown: ScoreBreakdown,
}

/// Scores one dish against the user's preferences and history.
///
/// The returned score is clamped to [0, 100] and rounded to one decimal.
pub fn score_dish(dish: &Dish, user: &User, profile: &InteractionProfile) -> (f64, ScoreBreakdown) {
    let rating = WEIGHT_RATING * rating_factor(dish);
    let cuisine = WEIGHT_CUISINE * cuisine_factor(dish, user);
    let spice = WEIGHT_SPICE * spice_factor(dish, user);
    let budget = WEIGHT_BUDGET * budget_factor(dish, user);
    let affinity = WEIGHT_AFFINITY * affinity_factor(dish, profile);

    let (diet_factor, violated) = dietary_factor(dish, user);
    let dietary = WEIGHT_DIETARY * diet_factor;
    let penalty = if violated { DIETARY_VIOLATION_PENALTY } else { 0.0 };

    let raw = rating + cuisine + spice + budget + affinity + dietary - penalty;
    let score = (raw.clamp(0.0, 100.0) * 10.0).round() / 10.0;

    (
        score,
        ScoreBreakdown {
            rating,
            cuisine,
            spice,
            budget,
            affinity,
            dietary,
            penalty,
        },
    )
}

/// Scores a candidate set and orders it best-first.
///
/// Ties break on public rating, then on id, so repeated requests see the
/// same order.
pub fn rank_dishes(dishes: Vec<Dish>, user: &User, profile: &InteractionProfile) -> Vec<ScoredDish> {
    let mut scored: Vec<ScoredDish> = dishes
        .into_iter()
        .map(|dish| {
            let (score, breakdown) = score_dish(&dish, user, profile);
            ScoredDish { dish, score, breakdown }
        })
        .collect();

    scored.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| b.dish.rating_avg.total_cmp(&a.dish.rating_avg))
            .then_with(|| a.dish.id.cmp(&b.dish.id))
    });

    scored
}

/// Public rating normalized to [0, 1]; unrated dishes sit in the middle
fn rating_factor(dish: &Dish) -> f64 {
    if dish.rating_count == 0 {
        NEUTRAL
    } else {
        (dish.rating_avg / 5.0).clamp(0.0, 1.0)
    }
}

/// Full marks for a preferred cuisine, none otherwise; case-insensitive
fn cuisine_factor(dish: &Dish, user: &User) -> f64 {
    if user.preferred_cuisines.is_empty() {
        return NEUTRAL;
    }

    let dish_cuisine = dish.cuisine.to_lowercase();
    if user
        .preferred_cuisines
        .iter()
        .any(|cuisine| cuisine.to_lowercase() == dish_cuisine)
    {
        1.0
    } else {
        0.0
    }
}

/// Linear falloff with ordinal distance from the user's tolerance
fn spice_factor(dish: &Dish, user: &User) -> f64 {
    match user.spice_tolerance_level() {
        None => NEUTRAL,
        Some(tolerance) => {
            let distance = f64::from((dish.spice().as_ordinal() - tolerance.as_ordinal()).abs());
            1.0 - distance / SPICE_RANGE
        }
    }
}

/// Full marks within budget; over budget, linear falloff reaching zero at
/// double the budget
fn budget_factor(dish: &Dish, user: &User) -> f64 {
    match user.budget_cents {
        None => NEUTRAL,
        Some(budget) if budget <= 0 => NEUTRAL,
        Some(budget) => {
            if dish.price_cents <= budget {
                1.0
            } else {
                let overshoot =
                    f64::from(dish.price_cents - budget) / f64::from(budget);
                (1.0 - overshoot).max(0.0)
            }
        }
    }
}

/// Strongest applicable history signal. The arms are ordered by strength,
/// so the first hit is the maximum.
fn affinity_factor(dish: &Dish, profile: &InteractionProfile) -> f64 {
    if profile.ordered_dishes.contains(&dish.id) {
        1.0
    } else if profile.liked_dishes.contains(&dish.id) {
        0.8
    } else if profile.ordered_restaurants.contains(&dish.restaurant_id) {
        0.6
    } else if profile.familiar_cuisines.contains(&dish.cuisine.to_lowercase()) {
        0.4
    } else if profile.viewed_dishes.contains(&dish.id) {
        0.3
    } else {
        0.0
    }
}

/// Factor plus whether the dish violates a restriction. Every restriction
/// the user has must appear among the dish's tags.
fn dietary_factor(dish: &Dish, user: &User) -> (f64, bool) {
    let restrictions = user.dietary_tags();
    if restrictions.is_empty() {
        return (NEUTRAL, false);
    }

    let dish_tags: HashSet<DietaryTag> = dish.parsed_dietary_tags().into_iter().collect();
    if restrictions.iter().all(|tag| dish_tags.contains(tag)) {
        (1.0, false)
    } else {
        (0.0, true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn test_dish() -> Dish {
        Dish {
            id: 1,
            restaurant_id: 10,
            name: "Paneer Tikka".to_string(),
            description: None,
            cuisine: "indian".to_string(),
            spice_level: 2,
            price_cents: 1200,
            dietary_tags: vec!["vegetarian".to_string()],
            rating_avg: 4.0,
            rating_count: 12,
            available: true,
            created_at: Utc::now(),
        }
    }

    fn test_user() -> User {
        User {
            id: 7,
            username: "mika".to_string(),
            email: "mika@example.com".to_string(),
            display_name: None,
            spice_tolerance: Some(2),
            preferred_cuisines: vec!["indian".to_string()],
            dietary_restrictions: vec![],
            budget_cents: Some(1500),
            created_at: Utc::now(),
        }
    }

    fn blank_user() -> User {
        User {
            spice_tolerance: None,
            preferred_cuisines: vec![],
            dietary_restrictions: vec![],
            budget_cents: None,
            ..test_user()
        }
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn test_perfect_match_without_history() {
        // rating 20*0.8 + cuisine 20 + spice 15 + budget 15 + affinity 0
        // + dietary neutral 5 = 71
        let (score, breakdown) =
            score_dish(&test_dish(), &test_user(), &InteractionProfile::default());

        assert_eq!(score, 71.0);
        assert_close(breakdown.rating, 16.0);
        assert_close(breakdown.cuisine, 20.0);
        assert_close(breakdown.spice, 15.0);
        assert_close(breakdown.budget, 15.0);
        assert_close(breakdown.affinity, 0.0);
        assert_close(breakdown.dietary, 5.0);
        assert_close(breakdown.penalty, 0.0);
    }

    #[test]
    fn test_no_preferences_means_all_neutral() {
        // rating 16 + four neutral signals (10 + 7.5 + 7.5 + 5) = 46
        let (score, breakdown) =
            score_dish(&test_dish(), &blank_user(), &InteractionProfile::default());

        assert_eq!(score, 46.0);
        assert_close(breakdown.cuisine, 10.0);
        assert_close(breakdown.spice, 7.5);
        assert_close(breakdown.budget, 7.5);
        assert_close(breakdown.dietary, 5.0);
    }

    #[test]
    fn test_unrated_dish_gets_neutral_rating_factor() {
        let mut dish = test_dish();
        dish.rating_avg = 0.0;
        dish.rating_count = 0;

        let (_, breakdown) = score_dish(&dish, &test_user(), &InteractionProfile::default());
        assert_close(breakdown.rating, 10.0);
    }

    #[test]
    fn test_cuisine_match_is_case_insensitive() {
        let mut user = test_user();
        user.preferred_cuisines = vec!["Indian".to_string()];

        let (_, breakdown) = score_dish(&test_dish(), &user, &InteractionProfile::default());
        assert_close(breakdown.cuisine, 20.0);
    }

    #[test]
    fn test_spice_distance_falls_off_linearly() {
        let mut dish = test_dish();
        dish.spice_level = 4;
        let mut user = test_user();
        user.spice_tolerance = Some(0);

        // Maximum distance zeroes the signal
        let (_, breakdown) = score_dish(&dish, &user, &InteractionProfile::default());
        assert_close(breakdown.spice, 0.0);

        // One step off keeps three quarters of it
        user.spice_tolerance = Some(3);
        let (_, breakdown) = score_dish(&dish, &user, &InteractionProfile::default());
        assert_close(breakdown.spice, 15.0 * 0.75);
    }

    #[test]
    fn test_budget_overshoot_falls_off_linearly() {
        let mut dish = test_dish();
        dish.price_cents = 1800;

        // 300 over a 1500 budget leaves 80% of the signal
        let (_, breakdown) = score_dish(&dish, &test_user(), &InteractionProfile::default());
        assert_close(breakdown.budget, 15.0 * 0.8);

        // Double the budget or more zeroes it
        dish.price_cents = 3100;
        let (_, breakdown) = score_dish(&dish, &test_user(), &InteractionProfile::default());
        assert_close(breakdown.budget, 0.0);
    }

    #[test]
    fn test_affinity_picks_strongest_signal() {
        let dish = test_dish();

        let mut profile = InteractionProfile::default();
        profile.viewed_dishes.insert(dish.id);
        let (_, breakdown) = score_dish(&dish, &test_user(), &profile);
        assert_close(breakdown.affinity, 20.0 * 0.3);

        profile.familiar_cuisines.insert("indian".to_string());
        let (_, breakdown) = score_dish(&dish, &test_user(), &profile);
        assert_close(breakdown.affinity, 20.0 * 0.4);

        profile.ordered_restaurants.insert(dish.restaurant_id);
        let (_, breakdown) = score_dish(&dish, &test_user(), &profile);
        assert_close(breakdown.affinity, 20.0 * 0.6);

        profile.liked_dishes.insert(dish.id);
        let (_, breakdown) = score_dish(&dish, &test_user(), &profile);
        assert_close(breakdown.affinity, 20.0 * 0.8);

        profile.ordered_dishes.insert(dish.id);
        let (_, breakdown) = score_dish(&dish, &test_user(), &profile);
        assert_close(breakdown.affinity, 20.0);
    }

    #[test]
    fn test_dietary_violation_penalty_clamps_to_zero() {
        let mut dish = test_dish();
        dish.dietary_tags = vec![];
        let mut user = test_user();
        user.dietary_restrictions = vec!["vegan".to_string()];

        let (score, breakdown) = score_dish(&dish, &user, &InteractionProfile::default());

        assert_close(breakdown.dietary, 0.0);
        assert_close(breakdown.penalty, DIETARY_VIOLATION_PENALTY);
        // 16 + 20 + 15 + 15 + 0 + 0 - 100 clamps to 0
        assert_eq!(score, 0.0);
    }

    #[test]
    fn test_all_restrictions_satisfied_scores_full_dietary_weight() {
        let mut dish = test_dish();
        dish.dietary_tags = vec!["vegan".to_string(), "gluten_free".to_string()];
        let mut user = test_user();
        user.dietary_restrictions = vec!["vegan".to_string(), "gluten_free".to_string()];

        let (_, breakdown) = score_dish(&dish, &user, &InteractionProfile::default());
        assert_close(breakdown.dietary, 10.0);
        assert_close(breakdown.penalty, 0.0);
    }

    #[test]
    fn test_partial_restriction_coverage_is_still_a_violation() {
        let mut dish = test_dish();
        dish.dietary_tags = vec!["vegan".to_string()];
        let mut user = test_user();
        user.dietary_restrictions = vec!["vegan".to_string(), "nut_free".to_string()];

        let (_, breakdown) = score_dish(&dish, &user, &InteractionProfile::default());
        assert_close(breakdown.penalty, DIETARY_VIOLATION_PENALTY);
    }

    #[test]
    fn test_score_rounds_to_one_decimal() {
        let mut dish = test_dish();
        dish.rating_avg = 4.44;

        let (score, _) = score_dish(&dish, &test_user(), &InteractionProfile::default());
        // 17.76 + 20 + 15 + 15 + 5 = 72.76, rounded to 72.8
        assert_eq!(score, 72.8);
    }

    #[test]
    fn test_rank_orders_by_score_then_rating_then_id() {
        let strong = test_dish();

        let mut weak = test_dish();
        weak.id = 2;
        weak.cuisine = "nordic".to_string();

        // Same score as `strong` by construction, differing only in id
        let mut twin = strong.clone();
        twin.id = 3;

        let user = test_user();
        let ranked = rank_dishes(
            vec![weak.clone(), twin.clone(), strong.clone()],
            &user,
            &InteractionProfile::default(),
        );

        let ids: Vec<i64> = ranked.iter().map(|scored| scored.dish.id).collect();
        assert_eq!(ids, vec![1, 3, 2]);
        assert!(ranked[0].score >= ranked[2].score);
    }

    #[test]
    fn test_rank_breaks_score_ties_by_rating() {
        // Two dishes with equal scores via different routes: one unrated
        // (neutral 0.5) and one rated exactly 2.5 of 5
        let mut unrated = test_dish();
        unrated.id = 1;
        unrated.rating_avg = 0.0;
        unrated.rating_count = 0;

        let mut rated = test_dish();
        rated.id = 2;
        rated.rating_avg = 2.5;
        rated.rating_count = 8;

        let ranked = rank_dishes(
            vec![unrated, rated],
            &test_user(),
            &InteractionProfile::default(),
        );

        assert_eq!(ranked[0].score, ranked[1].score);
        // The rated dish carries the higher rating_avg, so it wins the tie
        assert_eq!(ranked[0].dish.id, 2);
    }
}
