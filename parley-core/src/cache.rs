//! Response cache abstraction
//!
//! Keys are URL-shaped strings (see [`crate::cache_key`]); values are full
//! [`HttpReply`] representations including their `Cache-Control` header.

use async_trait::async_trait;
use tracing::warn;

use crate::error::Result;
use crate::http::HttpReply;

#[async_trait(?Send)]
pub trait ResponseCache {
    async fn get(&self, key: &str) -> Result<Option<HttpReply>>;

    async fn put(&self, key: &str, reply: HttpReply) -> Result<()>;

    /// Returns whether an entry was removed
    async fn delete(&self, key: &str) -> Result<bool>;
}

/// Best-effort write: failures are logged and swallowed
pub async fn put_best_effort(cache: &dyn ResponseCache, key: &str, reply: HttpReply) {
    if let Err(e) = cache.put(key, reply).await {
        warn!(key, error = %e, "cache write failed");
    }
}

/// Best-effort delete: returns whether an entry was removed, `false` on failure
pub async fn delete_best_effort(cache: &dyn ResponseCache, key: &str) -> bool {
    cache.delete(key).await.unwrap_or_else(|e| {
        warn!(key, error = %e, "cache delete failed");
        false
    })
}

/// Best-effort read: a failing cache behaves like a miss
pub async fn get_or_miss(cache: &dyn ResponseCache, key: &str) -> Option<HttpReply> {
    match cache.get(key).await {
        Ok(hit) => hit,
        Err(e) => {
            warn!(key, error = %e, "cache read failed, treating as miss");
            None
        }
    }
}
