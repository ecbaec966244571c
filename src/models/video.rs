use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Who can see a video in the catalog
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    Public,
    Unlisted,
    Private,
}

impl Visibility {
    pub fn as_str(self) -> &'static str {
        match self {
            Visibility::Public => "public",
            Visibility::Unlisted => "unlisted",
            Visibility::Private => "private",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "public" => Some(Visibility::Public),
            "unlisted" => Some(Visibility::Unlisted),
            "private" => Some(Visibility::Private),
            _ => None,
        }
    }
}

impl Default for Visibility {
    fn default() -> Self {
        Visibility::Public
    }
}

/// Video catalog row
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Video {
    pub id: i64,
    pub uploader_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub genre: Option<String>,
    pub duration_secs: i32,
    pub visibility: String,
    pub view_count: i64,
    pub created_at: DateTime<Utc>,
}

impl Video {
    /// Stored visibility; unrecognized values are treated as private
    pub fn visibility(&self) -> Visibility {
        Visibility::parse(&self.visibility).unwrap_or(Visibility::Private)
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateVideoRequest {
    pub title: String,
    pub description: Option<String>,
    pub genre: Option<String>,
    pub duration_secs: i32,
    #[serde(default)]
    pub visibility: Visibility,
}

#[derive(Debug, Serialize)]
pub struct VideoResponse {
    pub id: i64,
    pub uploader_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub genre: Option<String>,
    pub duration_secs: i32,
    pub visibility: Visibility,
    pub view_count: i64,
    pub created_at: DateTime<Utc>,
}

impl From<&Video> for VideoResponse {
    fn from(video: &Video) -> Self {
        Self {
            id: video.id,
            uploader_id: video.uploader_id,
            title: video.title.clone(),
            description: video.description.clone(),
            genre: video.genre.clone(),
            duration_secs: video.duration_secs,
            visibility: video.visibility(),
            view_count: video.view_count,
            created_at: video.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visibility_parse_matches_as_str() {
        for visibility in [Visibility::Public, Visibility::Unlisted, Visibility::Private] {
            assert_eq!(Visibility::parse(visibility.as_str()), Some(visibility));
        }
        assert_eq!(Visibility::parse("hidden"), None);
    }

    #[test]
    fn test_unknown_stored_visibility_falls_back_to_private() {
        let video = Video {
            id: 1,
            uploader_id: 1,
            title: "Late Night Ramen Run".to_string(),
            description: None,
            genre: Some("food".to_string()),
            duration_secs: 640,
            visibility: "friends_only".to_string(),
            view_count: 0,
            created_at: Utc::now(),
        };

        assert_eq!(video.visibility(), Visibility::Private);
    }
}
