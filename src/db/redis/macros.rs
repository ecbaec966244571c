/// Get-or-compute helper over the cache.
///
/// Looks the key up first and returns the cached value on a hit. On a miss
/// it runs the provided future, queues the result for a background cache
/// write, and returns it. Errors from either the cache lookup or the compute
/// step propagate with `?`, so misses are never cached.
///
/// Expands to a bare `Result`, so it must be the tail expression of a
/// function returning `AppResult`; the signature pins the value and error
/// types the expansion needs.
///
/// # Arguments
/// * `$cache`: Cache instance with `get_from_cache` and `set_in_background`.
/// * `$key`: The `CacheKey` the value lives under.
/// * `$ttl`: Time-to-live for the cached value, in seconds.
/// * `$block`: Future producing the value on a cache miss.
///
/// # Example
/// ```ignore
/// async fn cached_menu_page(
///     state: &AppState,
///     restaurant_id: i64,
///     params: &PageParams,
/// ) -> AppResult<Page<DishResponse>> {
///     let key = CacheKey::RestaurantDishes {
///         restaurant_id,
///         page: params.page,
///         per_page: params.per_page,
///     };
///
///     cached!(
///         state.cache,
///         key,
///         state.config.menu_cache_ttl_secs,
///         restaurants::list_dishes(&state.db_pool, restaurant_id, params)
///     )
/// }
/// ```
#[macro_export]
macro_rules! cached {
    ($cache:expr, $key:expr, $ttl:expr, $block:expr) => {{
        if let Some(cached) = $cache.get_from_cache(&$key).await? {
            Ok(cached)
        } else {
            let value = $block.await?;
            $cache.set_in_background(&$key, &value, $ttl);
            Ok(value)
        }
    }};
}
