//! Response cache over the Cloudflare Cache API

use async_trait::async_trait;
use parley::{Error, HttpReply, ResponseCache, Result};
use worker::{Cache, CacheDeletionOutcome};

use crate::http::{into_response, read_reply};

#[derive(Default)]
pub struct WorkerCache {
    cache: Cache,
}

fn cache_error(e: worker::Error) -> Error {
    Error::Cache(e.to_string())
}

#[async_trait(?Send)]
impl ResponseCache for WorkerCache {
    async fn get(&self, key: &str) -> Result<Option<HttpReply>> {
        match self.cache.get(key, false).await.map_err(cache_error)? {
            Some(mut response) => Ok(Some(read_reply(&mut response).await.map_err(cache_error)?)),
            None => Ok(None),
        }
    }

    async fn put(&self, key: &str, reply: HttpReply) -> Result<()> {
        let response = into_response(reply).map_err(cache_error)?;
        self.cache.put(key, response).await.map_err(cache_error)
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        let outcome = self.cache.delete(key, false).await.map_err(cache_error)?;
        Ok(matches!(outcome, CacheDeletionOutcome::Success))
    }
}
