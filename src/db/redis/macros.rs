/// Read-through caching against a [`Cache`](crate::db::Cache).
///
/// Returns the cached value for `$key` when present. Otherwise awaits
/// `$block`, hands the result to the background writer with `$ttl` seconds
/// to live, and returns it. Errors from `$block` propagate and are never cached.
///
/// ```rust,ignore
/// let books: Vec<Book> = cached!(self.cache, key, BOOK_CACHE_TTL, async move {
///     self.fetch_volumes(genre, max_results).await
/// })?;
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
