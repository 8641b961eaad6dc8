//! Speech synthesis side path: voice links, cached voice list, TTS passthrough

use async_trait::async_trait;
use tracing::{debug, info};
use url::form_urlencoded;

use crate::cache::{self, ResponseCache};
use crate::cache_key;
use crate::config::SpeechSettings;
use crate::error::{Error, Result};
use crate::http::{HttpReply, InboundRequest};

pub const SPEECH_PATH: &str = "/speech";
pub const VOICES_PATH: &str = "/voices";
pub const AUDIO_CONTENT_TYPE: &str = "audio/mpeg";

#[async_trait(?Send)]
pub trait SpeechProvider {
    /// Raw JSON voice list from the provider
    async fn list_voices(&self, settings: &SpeechSettings) -> Result<String>;

    async fn synthesize(
        &self,
        settings: &SpeechSettings,
        voice_id: &str,
        text: &str,
    ) -> Result<Vec<u8>>;
}

/// Link to this worker's `/speech` route for `text`
pub fn voice_link(origin: &str, voice_id: &str, text: &str) -> String {
    let query = form_urlencoded::Serializer::new(String::new())
        .append_pair("voice-id", voice_id)
        .append_pair("text", text)
        .finish();
    format!("{origin}{SPEECH_PATH}?{query}")
}

/// `voice-id` parameter, else the configured default
pub fn requested_voice(req: &InboundRequest, settings: &SpeechSettings) -> String {
    req.non_empty_param("voice-id")
        .unwrap_or_else(|| settings.default_voice_id.clone())
}

pub async fn handle_voices(
    provider: &dyn SpeechProvider,
    cache: &dyn ResponseCache,
    settings: &SpeechSettings,
    origin: &str,
    max_age: u32,
) -> Result<HttpReply> {
    let key = cache_key::voice_list_key(origin);
    if let Some(hit) = cache::get_or_miss(cache, &key).await {
        debug!("voice list served from cache");
        return Ok(hit);
    }

    let voices = provider.list_voices(settings).await?;
    // reject garbage before it gets cached for a day
    let _: serde_json::Value = serde_json::from_str(&voices)
        .map_err(|e| Error::ProcessingFailed(format!("invalid voice list: {e}")))?;

    let reply = HttpReply::new(200, voices)
        .with_header("Content-Type", crate::http::CONTENT_TYPE_JSON)
        .with_header("Cache-Control", format!("public, max-age={max_age}"));
    cache::put_best_effort(cache, &key, reply.clone()).await;
    info!("voice list refreshed");
    Ok(reply)
}

pub async fn handle_speech(
    provider: &dyn SpeechProvider,
    settings: &SpeechSettings,
    req: &InboundRequest,
) -> Result<HttpReply> {
    let text = req.non_empty_param("text").ok_or(Error::MissingPrompt)?;
    let voice_id = requested_voice(req, settings);
    debug!(voice_id = %voice_id, chars = text.len(), "synthesizing speech");

    let audio = provider.synthesize(settings, &voice_id, &text).await?;
    Ok(HttpReply::new(200, audio).with_header("Content-Type", AUDIO_CONTENT_TYPE))
}
