use sqlx::PgPool;

use crate::{
    error::{AppError, AppResult},
    models::{
        CreateVideoRequest, HistoryEntry, Page, PageParams, Video, Visibility, WatchEntry,
    },
};

/// Lists public videos, newest first, optionally narrowed to one genre
pub async fn list_videos(
    pool: &PgPool,
    params: &PageParams,
    genre: Option<&str>,
) -> AppResult<Page<Video>> {
    let total = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM videos WHERE visibility = 'public' AND ($1::TEXT IS NULL OR genre = $1)",
    )
    .bind(genre)
    .fetch_one(pool)
    .await?;

    let videos = sqlx::query_as::<_, Video>(
        r#"
        SELECT id, uploader_id, title, description, genre, duration_secs,
               visibility, view_count, created_at
        FROM videos
        WHERE visibility = 'public' AND ($1::TEXT IS NULL OR genre = $1)
        ORDER BY created_at DESC, id DESC
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(genre)
    .bind(params.limit())
    .bind(params.offset())
    .fetch_all(pool)
    .await?;

    Ok(Page::new(videos, params, total))
}

/// Fetches one video. Private uploads are indistinguishable from missing
/// ones here; the catalog routes carry no user context.
pub async fn get_video(pool: &PgPool, video_id: i64) -> AppResult<Video> {
    let video = sqlx::query_as::<_, Video>(
        r#"
        SELECT id, uploader_id, title, description, genre, duration_secs,
               visibility, view_count, created_at
        FROM videos
        WHERE id = $1
        "#,
    )
    .bind(video_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Video {} not found", video_id)))?;

    match video.visibility() {
        Visibility::Private => Err(AppError::NotFound(format!("Video {} not found", video_id))),
        _ => Ok(video),
    }
}

/// Stores catalog metadata for a new upload
pub async fn create_video(
    pool: &PgPool,
    uploader_id: i64,
    request: CreateVideoRequest,
) -> AppResult<Video> {
    let title = request.title.trim().to_string();
    if title.is_empty() {
        return Err(AppError::InvalidInput("Title cannot be empty".to_string()));
    }
    if request.duration_secs <= 0 {
        return Err(AppError::InvalidInput(
            "Duration must be positive".to_string(),
        ));
    }

    // TODO: hand the raw upload to the transcoding pipeline once the media
    // ingestion service exists; only catalog metadata is stored for now.
    let video = sqlx::query_as::<_, Video>(
        r#"
        INSERT INTO videos (uploader_id, title, description, genre, duration_secs, visibility)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id, uploader_id, title, description, genre, duration_secs,
                  visibility, view_count, created_at
        "#,
    )
    .bind(uploader_id)
    .bind(&title)
    .bind(&request.description)
    .bind(&request.genre)
    .bind(request.duration_secs)
    .bind(request.visibility.as_str())
    .fetch_one(pool)
    .await?;

    tracing::info!(video_id = video.id, uploader_id, "Video created");

    Ok(video)
}

/// Upserts the caller's history row for a video and bumps the view count
/// the first time that (user, video) pair is seen.
///
/// Positions past the end of the video are clamped to its duration, and a
/// row once completed stays completed even if the user rewinds later.
/// Watches of the same video serialize on the video row lock, which keeps
/// the first-watch check accurate under concurrent requests.
pub async fn record_watch(
    pool: &PgPool,
    user_id: i64,
    video_id: i64,
    position_secs: i32,
) -> AppResult<WatchEntry> {
    if position_secs < 0 {
        return Err(AppError::InvalidInput(
            "Position cannot be negative".to_string(),
        ));
    }

    let mut tx = pool.begin().await?;

    let video = sqlx::query_as::<_, Video>(
        r#"
        SELECT id, uploader_id, title, description, genre, duration_secs,
               visibility, view_count, created_at
        FROM videos
        WHERE id = $1
        FOR UPDATE
        "#,
    )
    .bind(video_id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Video {} not found", video_id)))?;

    // Private uploads stay invisible to everyone but their uploader
    if video.visibility() == Visibility::Private && video.uploader_id != user_id {
        return Err(AppError::NotFound(format!("Video {} not found", video_id)));
    }

    let prior_completed = sqlx::query_scalar::<_, bool>(
        "SELECT completed FROM watch_history WHERE user_id = $1 AND video_id = $2",
    )
    .bind(user_id)
    .bind(video_id)
    .fetch_optional(&mut *tx)
    .await?;

    let outcome = fold_watch(prior_completed, position_secs, video.duration_secs);

    let entry = sqlx::query_as::<_, WatchEntry>(
        r#"
        INSERT INTO watch_history (user_id, video_id, position_secs, completed, watched_at)
        VALUES ($1, $2, $3, $4, now())
        ON CONFLICT (user_id, video_id)
        DO UPDATE SET position_secs = EXCLUDED.position_secs,
                      completed = watch_history.completed OR EXCLUDED.completed,
                      watched_at = now()
        RETURNING id, user_id, video_id, position_secs, completed, watched_at
        "#,
    )
    .bind(user_id)
    .bind(video_id)
    .bind(outcome.position_secs)
    .bind(outcome.completed)
    .fetch_one(&mut *tx)
    .await?;

    if outcome.first_watch {
        sqlx::query("UPDATE videos SET view_count = view_count + 1 WHERE id = $1")
            .bind(video_id)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;

    tracing::debug!(
        user_id,
        video_id,
        position = outcome.position_secs,
        completed = outcome.completed,
        "Watch progress recorded"
    );

    Ok(entry)
}

/// What one watch event leaves on file for a (user, video) pair
struct WatchOutcome {
    position_secs: i32,
    completed: bool,
    first_watch: bool,
}

/// Folds a watch event into the pair's stored state. Positions clamp to the
/// video's duration, completion latches on, and only a pair with no prior
/// row counts as a first watch.
fn fold_watch(
    prior_completed: Option<bool>,
    position_secs: i32,
    duration_secs: i32,
) -> WatchOutcome {
    let position = position_secs.min(duration_secs);
    WatchOutcome {
        position_secs: position,
        completed: position >= duration_secs || prior_completed.unwrap_or(false),
        first_watch: prior_completed.is_none(),
    }
}

/// Lists the caller's watch history, most recent first
pub async fn list_history(
    pool: &PgPool,
    user_id: i64,
    params: &PageParams,
) -> AppResult<Page<HistoryEntry>> {
    let total = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM watch_history WHERE user_id = $1",
    )
    .bind(user_id)
    .fetch_one(pool)
    .await?;

    let entries = sqlx::query_as::<_, HistoryEntry>(
        r#"
        SELECT h.video_id, v.title AS video_title, h.position_secs, h.completed, h.watched_at
        FROM watch_history h
        JOIN videos v ON v.id = h.video_id
        WHERE h.user_id = $1
        ORDER BY h.watched_at DESC, h.id DESC
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(user_id)
    .bind(params.limit())
    .bind(params.offset())
    .fetch_all(pool)
    .await?;

    Ok(Page::new(entries, params, total))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fold_watch_mid_video() {
        let outcome = fold_watch(None, 300, 1200);
        assert_eq!(outcome.position_secs, 300);
        assert!(!outcome.completed);
        assert!(outcome.first_watch);
    }

    #[test]
    fn test_fold_watch_clamps_past_the_end() {
        let outcome = fold_watch(None, 1500, 1200);
        assert_eq!(outcome.position_secs, 1200);
        assert!(outcome.completed);
    }

    #[test]
    fn test_fold_watch_completes_exactly_at_the_end() {
        let outcome = fold_watch(Some(false), 1200, 1200);
        assert!(outcome.completed);
        assert!(!outcome.first_watch);
    }

    #[test]
    fn test_fold_watch_completion_survives_a_rewind() {
        let outcome = fold_watch(Some(true), 45, 1200);
        assert_eq!(outcome.position_secs, 45);
        assert!(outcome.completed);
        assert!(!outcome.first_watch);
    }

    #[test]
    fn test_fold_watch_repeat_watch_is_not_first() {
        let outcome = fold_watch(Some(false), 600, 1200);
        assert!(!outcome.completed);
        assert!(!outcome.first_watch);
    }
}
