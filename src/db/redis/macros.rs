/// Read-through caching around an async computation.
///
/// Looks the key up first and returns the cached value on a hit. On a miss,
/// or when the cache read itself fails, the block is awaited, its value is
/// queued for storage, and the value is returned. Cache failures are logged
/// and never fail the caller; errors from the block propagate with `?`.
///
/// # Arguments
/// * `$cache`: anything with `get_from_cache` and `set_in_background`.
/// * `$key`: the `CacheKey` to read and write.
/// * `$ttl`: time-to-live in seconds.
/// * `$block`: future computing the value on a miss.
///
/// # Example
/// ```rust,ignore
/// let observation = cached!(cache, key, 600, async move {
///     provider.current_weather(&location).await
/// });
/// ```
#[macro_export]
macro_rules! cached {
    ($cache:expr, $key:expr, $ttl:expr, $block:expr) => {{
        let hit = match $cache.get_from_cache(&$key).await {
            Ok(hit) => hit,
            Err(e) => {
                tracing::warn!(key = %$key, error = %e, "Cache read failed, falling through");
                None
            }
        };

        match hit {
            Some(cached) => {
                tracing::debug!(key = %$key, "Cache hit");
                Ok(cached)
            }
            None => {
                let value = $block.await?;
                $cache.set_in_background(&$key, &value, $ttl);
                Ok(value)
            }
        }
    }};
}
