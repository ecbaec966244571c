use redis::AsyncCommands;
use redis::Client;
use std::fmt::Display;
use tokio::sync::mpsc;

use crate::error::AppError;
use crate::error::AppResult;

/// Keys for cached response pages. Paging parameters are part of the key so
/// distinct pages never overwrite each other.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    /// Scored dish recommendations for one user
    DishRecommendations { user_id: i64, page: i64, per_page: i64 },
    /// Public menu page for one restaurant
    RestaurantDishes { restaurant_id: i64, page: i64, per_page: i64 },
}

impl Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheKey::DishRecommendations { user_id, page, per_page } => {
                write!(f, "rec:{}:{}:{}", user_id, page, per_page)
            }
            CacheKey::RestaurantDishes { restaurant_id, page, per_page } => {
                write!(f, "menu:{}:{}:{}", restaurant_id, page, per_page)
            }
        }
    }
}

/// Creates a Redis client for caching and rate-limit counters
///
/// Uses connection pooling via the connection-manager feature.
pub fn create_redis_client(redis_url: &str) -> anyhow::Result<Client> {
    let client = Client::open(redis_url)?;
    Ok(client)
}

/// One write queued for the background task
struct PendingWrite {
    key: String,
    value: String,
    ttl: u64,
}

/// Cache handler for storing and retrieving data from Redis
#[derive(Clone)]
pub struct Cache {
    redis_client: Client,
    write_tx: mpsc::UnboundedSender<PendingWrite>,
}

/// Handle for gracefully shutting down the cache writer
pub struct CacheWriterHandle {
    shutdown_tx: mpsc::Sender<()>,
}

impl CacheWriterHandle {
    /// Signals the writer task to flush pending writes and stop
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(()).await;
        tracing::info!("Cache writer shutdown signal sent");
    }
}

impl Cache {
    /// Creates a new Cache instance with an async write background task
    ///
    /// The background task drains queued writes so cache population never
    /// blocks a response.
    pub async fn new(redis_client: Client) -> (Self, CacheWriterHandle) {
        let (write_tx, write_rx) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);

        let client = redis_client.clone();
        tokio::spawn(async move {
            Self::writer_task(client, write_rx, shutdown_rx).await;
        });

        let cache = Self {
            redis_client,
            write_tx,
        };

        let handle = CacheWriterHandle { shutdown_tx };

        (cache, handle)
    }

    /// Background task that processes queued cache writes
    ///
    /// Runs until a shutdown signal arrives (or every sender is dropped),
    /// then flushes whatever is still queued before exiting.
    async fn writer_task(
        client: Client,
        mut write_rx: mpsc::UnboundedReceiver<PendingWrite>,
        mut shutdown_rx: mpsc::Receiver<()>,
    ) {
        tracing::info!("Cache writer task started");

        loop {
            tokio::select! {
                entry = write_rx.recv() => {
                    match entry {
                        Some(entry) => {
                            if let Err(e) = Self::flush_entry(&client, entry).await {
                                tracing::error!(error = %e, "Failed to write to Redis cache");
                            }
                        }
                        // All senders dropped, nothing left to flush
                        None => break,
                    }
                }
                _ = shutdown_rx.recv() => {
                    let mut flushed = 0;
                    while let Ok(entry) = write_rx.try_recv() {
                        if let Err(e) = Self::flush_entry(&client, entry).await {
                            tracing::error!(error = %e, "Failed to flush cache write during shutdown");
                        } else {
                            flushed += 1;
                        }
                    }

                    tracing::info!(flushed, "Cache writer task stopped");
                    break;
                }
            }
        }
    }

    /// Writes a single entry to Redis with its TTL
    async fn flush_entry(client: &Client, entry: PendingWrite) -> AppResult<()> {
        let mut conn = client.get_multiplexed_async_connection().await?;
        let _: () = conn.set_ex(entry.key, entry.value, entry.ttl).await?;
        Ok(())
    }

    /// Retrieves a value from the cache by key
    ///
    /// Returns `None` on a miss. A stored value that no longer deserializes
    /// is surfaced as an error rather than silently recomputed.
    pub async fn get_from_cache<T: serde::de::DeserializeOwned>(
        &self,
        key: &CacheKey,
    ) -> AppResult<Option<T>> {
        let mut conn = self.redis_client.get_multiplexed_async_connection().await?;
        let cached: Option<String> = conn.get(format!("{}", key)).await?;

        match cached {
            Some(json) => {
                let data = serde_json::from_str(&json).map_err(|e| {
                    AppError::Internal(format!("Cache deserialization error: {}", e))
                })?;
                Ok(Some(data))
            }
            None => Ok(None),
        }
    }

    /// Stores a value in the cache asynchronously without blocking
    ///
    /// Serializes the value and hands it to the background writer. Returns
    /// immediately; a lost write only costs a future cache miss.
    pub fn set_in_background<T: serde::Serialize>(&self, key: &CacheKey, value: &T, ttl: u64) {
        let json = match serde_json::to_string(value) {
            Ok(j) => j,
            Err(e) => {
                tracing::error!(error = %e, "Cache serialization error");
                return;
            }
        };

        let entry = PendingWrite {
            key: format!("{}", key),
            value: json,
            ttl,
        };

        if let Err(e) = self.write_tx.send(entry) {
            tracing::error!(error = %e, "Failed to queue cache write");
        }
    }

    /// Atomically bumps a counter key, attaching a TTL the first time the
    /// key is seen in its window. Returns the post-increment count.
    pub async fn increment_window(&self, key: &str, ttl_secs: i64) -> AppResult<i64> {
        let mut conn = self.redis_client.get_multiplexed_async_connection().await?;
        let count: i64 = conn.incr(key, 1).await?;

        if count == 1 {
            let _: () = conn.expire(key, ttl_secs).await?;
        }

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_key_display_recommendations() {
        let key = CacheKey::DishRecommendations { user_id: 42, page: 1, per_page: 20 };
        assert_eq!(format!("{}", key), "rec:42:1:20");
    }

    #[test]
    fn test_cache_key_display_menu() {
        let key = CacheKey::RestaurantDishes { restaurant_id: 7, page: 3, per_page: 50 };
        assert_eq!(format!("{}", key), "menu:7:3:50");
    }

    #[test]
    fn test_cache_keys_distinct_per_page() {
        let first = CacheKey::DishRecommendations { user_id: 42, page: 1, per_page: 20 };
        let second = CacheKey::DishRecommendations { user_id: 42, page: 2, per_page: 20 };
        assert_ne!(format!("{}", first), format!("{}", second));
    }

    // Uses the macro the way the routes do, as the tail of a function whose
    // signature pins its types. Nothing listens on port 1, so the lookup
    // fails and the error must propagate instead of the computed value.
    #[tokio::test]
    async fn test_cached_lookup_failure_propagates_before_compute() {
        async fn page_of_ids(cache: &Cache) -> AppResult<Vec<i64>> {
            crate::cached!(
                cache,
                CacheKey::DishRecommendations { user_id: 1, page: 1, per_page: 20 },
                60,
                async { Ok::<_, AppError>(vec![1, 2, 3]) }
            )
        }

        let client = Client::open("redis://127.0.0.1:1/").unwrap();
        let (cache, _writer) = Cache::new(client).await;

        let result = page_of_ids(&cache).await;
        assert!(matches!(result, Err(AppError::Cache(_))));
    }
}
