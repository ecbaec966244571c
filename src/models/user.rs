use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{DietaryTag, SpiceLevel};

/// Platform account row
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub display_name: Option<String>,
    /// Stored spice tolerance ordinal, absent until the user sets it
    pub spice_tolerance: Option<i16>,
    pub preferred_cuisines: Vec<String>,
    pub dietary_restrictions: Vec<String>,
    pub budget_cents: Option<i32>,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn spice_tolerance_level(&self) -> Option<SpiceLevel> {
        self.spice_tolerance.map(SpiceLevel::from_ordinal)
    }

    /// Dietary restrictions parsed to known tags; rows written before a tag
    /// was retired may carry strings we no longer recognize
    pub fn dietary_tags(&self) -> Vec<DietaryTag> {
        self.dietary_restrictions
            .iter()
            .filter_map(|raw| {
                let tag = DietaryTag::parse(raw);
                if tag.is_none() {
                    tracing::warn!(user_id = self.id, tag = %raw, "Skipping unknown dietary restriction");
                }
                tag
            })
            .collect()
    }
}

/// Authenticated user attached to the request by the auth middleware
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub display_name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub user: UserResponse,
    /// Shown exactly once; only a digest is kept server-side
    pub api_token: String,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub display_name: Option<String>,
    pub preferences: PreferencesResponse,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct PreferencesResponse {
    pub spice_tolerance: Option<SpiceLevel>,
    pub preferred_cuisines: Vec<String>,
    pub dietary_restrictions: Vec<String>,
    pub budget_cents: Option<i32>,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            display_name: user.display_name.clone(),
            preferences: PreferencesResponse {
                spice_tolerance: user.spice_tolerance_level(),
                preferred_cuisines: user.preferred_cuisines.clone(),
                dietary_restrictions: user.dietary_restrictions.clone(),
                budget_cents: user.budget_cents,
            },
            created_at: user.created_at,
        }
    }
}

/// Fields omitted from the payload keep their stored values
#[derive(Debug, Deserialize)]
pub struct UpdatePreferencesRequest {
    pub spice_tolerance: Option<SpiceLevel>,
    pub preferred_cuisines: Option<Vec<String>>,
    pub dietary_restrictions: Option<Vec<String>>,
    pub budget_cents: Option<i32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_user() -> User {
        User {
            id: 1,
            username: "mika".to_string(),
            email: "mika@example.com".to_string(),
            display_name: None,
            spice_tolerance: Some(3),
            preferred_cuisines: vec!["thai".to_string()],
            dietary_restrictions: vec!["vegan".to_string(), "lowcarb".to_string()],
            budget_cents: Some(2000),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_spice_tolerance_level() {
        assert_eq!(
            test_user().spice_tolerance_level(),
            Some(SpiceLevel::Hot)
        );

        let mut user = test_user();
        user.spice_tolerance = None;
        assert_eq!(user.spice_tolerance_level(), None);
    }

    #[test]
    fn test_dietary_tags_drop_unknown_strings() {
        assert_eq!(test_user().dietary_tags(), vec![DietaryTag::Vegan]);
    }

    #[test]
    fn test_user_response_nests_preferences() {
        let response = UserResponse::from(&test_user());
        assert_eq!(response.username, "mika");
        assert_eq!(
            response.preferences.spice_tolerance,
            Some(SpiceLevel::Hot)
        );
        assert_eq!(response.preferences.budget_cents, Some(2000));
    }
}
