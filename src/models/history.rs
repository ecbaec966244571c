use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Watch history row; one per (user, video) pair
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct WatchEntry {
    pub id: i64,
    pub user_id: i64,
    pub video_id: i64,
    pub position_secs: i32,
    pub completed: bool,
    pub watched_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct WatchRequest {
    pub position_secs: i32,
}

#[derive(Debug, Serialize)]
pub struct WatchEntryResponse {
    pub video_id: i64,
    pub position_secs: i32,
    pub completed: bool,
    pub watched_at: DateTime<Utc>,
}

impl From<&WatchEntry> for WatchEntryResponse {
    fn from(entry: &WatchEntry) -> Self {
        Self {
            video_id: entry.video_id,
            position_secs: entry.position_secs,
            completed: entry.completed,
            watched_at: entry.watched_at,
        }
    }
}

/// History row joined with its video's title for display
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct HistoryEntry {
    pub video_id: i64,
    pub video_title: String,
    pub position_secs: i32,
    pub completed: bool,
    pub watched_at: DateTime<Utc>,
}
