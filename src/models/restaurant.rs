use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Ordinal heat scale shared by dishes and user tolerance settings
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum SpiceLevel {
    None,
    Mild,
    Medium,
    Hot,
    Fiery,
}

impl SpiceLevel {
    /// Ordinal used for storage and for distance math when scoring
    pub fn as_ordinal(self) -> i16 {
        match self {
            SpiceLevel::None => 0,
            SpiceLevel::Mild => 1,
            SpiceLevel::Medium => 2,
            SpiceLevel::Hot => 3,
            SpiceLevel::Fiery => 4,
        }
    }

    /// Maps a stored ordinal back to a level, clamping out-of-range values
    pub fn from_ordinal(ordinal: i16) -> Self {
        match ordinal {
            i16::MIN..=0 => SpiceLevel::None,
            1 => SpiceLevel::Mild,
            2 => SpiceLevel::Medium,
            3 => SpiceLevel::Hot,
            _ => SpiceLevel::Fiery,
        }
    }
}

impl Default for SpiceLevel {
    fn default() -> Self {
        SpiceLevel::None
    }
}

/// Dietary tags a dish can carry and a user can require
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum DietaryTag {
    Vegetarian,
    Vegan,
    GlutenFree,
    DairyFree,
    NutFree,
    Halal,
    Kosher,
}

impl DietaryTag {
    pub fn as_str(self) -> &'static str {
        match self {
            DietaryTag::Vegetarian => "vegetarian",
            DietaryTag::Vegan => "vegan",
            DietaryTag::GlutenFree => "gluten_free",
            DietaryTag::DairyFree => "dairy_free",
            DietaryTag::NutFree => "nut_free",
            DietaryTag::Halal => "halal",
            DietaryTag::Kosher => "kosher",
        }
    }

    /// Parse a stored tag string into a known tag
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "vegetarian" => Some(DietaryTag::Vegetarian),
            "vegan" => Some(DietaryTag::Vegan),
            "gluten_free" => Some(DietaryTag::GlutenFree),
            "dairy_free" => Some(DietaryTag::DairyFree),
            "nut_free" => Some(DietaryTag::NutFree),
            "halal" => Some(DietaryTag::Halal),
            "kosher" => Some(DietaryTag::Kosher),
            _ => None,
        }
    }
}

/// Restaurant row
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Restaurant {
    pub id: i64,
    pub name: String,
    pub cuisine: String,
    pub city: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Dish row, including the denormalized rating aggregate
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Dish {
    pub id: i64,
    pub restaurant_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub cuisine: String,
    pub spice_level: i16,
    pub price_cents: i32,
    pub dietary_tags: Vec<String>,
    pub rating_avg: f64,
    pub rating_count: i32,
    pub available: bool,
    pub created_at: DateTime<Utc>,
}

impl Dish {
    pub fn spice(&self) -> SpiceLevel {
        SpiceLevel::from_ordinal(self.spice_level)
    }

    /// Known dietary tags on this dish; unrecognized strings are skipped
    pub fn parsed_dietary_tags(&self) -> Vec<DietaryTag> {
        self.dietary_tags
            .iter()
            .filter_map(|raw| {
                let tag = DietaryTag::parse(raw);
                if tag.is_none() {
                    tracing::warn!(dish_id = self.id, tag = %raw, "Skipping unknown dietary tag");
                }
                tag
            })
            .collect()
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateRestaurantRequest {
    pub name: String,
    pub cuisine: String,
    pub city: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RestaurantResponse {
    pub id: i64,
    pub name: String,
    pub cuisine: String,
    pub city: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<&Restaurant> for RestaurantResponse {
    fn from(restaurant: &Restaurant) -> Self {
        Self {
            id: restaurant.id,
            name: restaurant.name.clone(),
            cuisine: restaurant.cuisine.clone(),
            city: restaurant.city.clone(),
            created_at: restaurant.created_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateDishRequest {
    pub name: String,
    pub description: Option<String>,
    /// Falls back to the restaurant's cuisine when omitted
    pub cuisine: Option<String>,
    #[serde(default)]
    pub spice_level: SpiceLevel,
    pub price_cents: i32,
    #[serde(default)]
    pub dietary_tags: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DishResponse {
    pub id: i64,
    pub restaurant_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub cuisine: String,
    pub spice_level: SpiceLevel,
    pub price_cents: i32,
    pub dietary_tags: Vec<String>,
    pub rating_avg: f64,
    pub rating_count: i32,
    pub available: bool,
}

impl From<&Dish> for DishResponse {
    fn from(dish: &Dish) -> Self {
        Self {
            id: dish.id,
            restaurant_id: dish.restaurant_id,
            name: dish.name.clone(),
            description: dish.description.clone(),
            cuisine: dish.cuisine.clone(),
            spice_level: dish.spice(),
            price_cents: dish.price_cents,
            dietary_tags: dish.dietary_tags.clone(),
            rating_avg: dish.rating_avg,
            rating_count: dish.rating_count,
            available: dish.available,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spice_ordinal_round_trip() {
        for level in [
            SpiceLevel::None,
            SpiceLevel::Mild,
            SpiceLevel::Medium,
            SpiceLevel::Hot,
            SpiceLevel::Fiery,
        ] {
            assert_eq!(SpiceLevel::from_ordinal(level.as_ordinal()), level);
        }
    }

    #[test]
    fn test_spice_from_ordinal_clamps() {
        assert_eq!(SpiceLevel::from_ordinal(-3), SpiceLevel::None);
        assert_eq!(SpiceLevel::from_ordinal(9), SpiceLevel::Fiery);
    }

    #[test]
    fn test_spice_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&SpiceLevel::Medium).unwrap(),
            "\"medium\""
        );
        let parsed: SpiceLevel = serde_json::from_str("\"fiery\"").unwrap();
        assert_eq!(parsed, SpiceLevel::Fiery);
    }

    #[test]
    fn test_dietary_tag_parse_matches_as_str() {
        for tag in [
            DietaryTag::Vegetarian,
            DietaryTag::Vegan,
            DietaryTag::GlutenFree,
            DietaryTag::DairyFree,
            DietaryTag::NutFree,
            DietaryTag::Halal,
            DietaryTag::Kosher,
        ] {
            assert_eq!(DietaryTag::parse(tag.as_str()), Some(tag));
        }
        assert_eq!(DietaryTag::parse("pescatarian"), None);
    }

    #[test]
    fn test_dish_skips_unknown_tags() {
        let dish = Dish {
            id: 1,
            restaurant_id: 1,
            name: "Falafel Wrap".to_string(),
            description: None,
            cuisine: "middle_eastern".to_string(),
            spice_level: 1,
            price_cents: 950,
            dietary_tags: vec!["vegan".to_string(), "mystery".to_string()],
            rating_avg: 4.2,
            rating_count: 11,
            available: true,
            created_at: Utc::now(),
        };

        assert_eq!(dish.parsed_dietary_tags(), vec![DietaryTag::Vegan]);
    }
}
