use serde::{Deserialize, Serialize};

/// Ways a user can engage with a dish
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum InteractionKind {
    View,
    Like,
    Order,
    Rating,
}

impl InteractionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            InteractionKind::View => "view",
            InteractionKind::Like => "like",
            InteractionKind::Order => "order",
            InteractionKind::Rating => "rating",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "view" => Some(InteractionKind::View),
            "like" => Some(InteractionKind::Like),
            "order" => Some(InteractionKind::Order),
            "rating" => Some(InteractionKind::Rating),
            _ => None,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct InteractionRequest {
    pub kind: InteractionKind,
    /// Required for rating interactions, rejected for every other kind
    pub rating: Option<i16>,
}

#[derive(Debug, Serialize)]
pub struct InteractionResponse {
    pub dish_id: i64,
    pub kind: InteractionKind,
    pub rating: Option<i16>,
    pub dish_rating_avg: f64,
    pub dish_rating_count: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_parse_matches_as_str() {
        for kind in [
            InteractionKind::View,
            InteractionKind::Like,
            InteractionKind::Order,
            InteractionKind::Rating,
        ] {
            assert_eq!(InteractionKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(InteractionKind::parse("bookmark"), None);
    }

    #[test]
    fn test_kind_deserializes_snake_case() {
        let request: InteractionRequest =
            serde_json::from_str(r#"{"kind": "like"}"#).unwrap();
        assert_eq!(request.kind, InteractionKind::Like);
        assert_eq!(request.rating, None);
    }
}
