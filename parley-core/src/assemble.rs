//! Shapes the outward JSON reply for a completion

use serde::{Deserialize, Serialize};

use crate::config::Settings;
use crate::error::Result;
use crate::http::HttpReply;

/// Marks whether a reply came from the cache (`HIT`) or the gateway (`MISS`)
pub const CACHE_STATUS_HEADER: &str = "X-Cache";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voice: Option<String>,
}

impl ChatResponse {
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
            voice: None,
        }
    }

    pub fn with_voice(mut self, link: Option<String>) -> Self {
        self.voice = link;
        self
    }
}

/// 200 reply carrying the completion with the configured `Cache-Control`.
/// This is exactly what gets stored in the response cache.
pub fn assemble(settings: &Settings, body: &ChatResponse) -> Result<HttpReply> {
    Ok(HttpReply::json(200, body)?.with_header("Cache-Control", settings.cache_control()))
}

pub fn mark_cache_status(reply: HttpReply, hit: bool) -> HttpReply {
    reply.with_header(CACHE_STATUS_HEADER, if hit { "HIT" } else { "MISS" })
}
